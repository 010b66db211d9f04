//! reframe-io: Browser I/O for the reframe transform pipeline.
//!
//! Handles Blob construction, object-URL lifecycle, and download
//! triggering for encoded artifacts. The pipeline itself is pure and
//! lives in `reframe-pipeline`; this crate is the only place that
//! touches browser APIs.

pub mod download;

pub use download::{DownloadError, ObjectUrl, artifact_to_blob, trigger_download, trigger_download_as};

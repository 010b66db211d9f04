//! Artifact download via Blob URLs.
//!
//! Triggers downloads by creating a `Blob` from the encoded artifact,
//! generating an object URL, and programmatically clicking a temporary
//! `<a>` element. The object URL is held by an RAII guard
//! ([`ObjectUrl`]) and revoked on every exit path, success or failure.
//!
//! All functions in this module require a browser environment
//! (`wasm32-unknown-unknown` target).

use reframe_pipeline::{OutputArtifact, download_filename};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur when triggering an artifact download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// A browser object URL that revokes itself on drop.
///
/// Revocation is best-effort: the URL may already have been revoked or
/// garbage collected, and the download it backed is unaffected either
/// way.
#[derive(Debug)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    /// Create an object URL backed by a Blob holding the artifact's
    /// bytes, tagged with its MIME type.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::JsError`] if Blob or URL creation fails.
    pub fn for_artifact(artifact: &OutputArtifact) -> Result<Self, DownloadError> {
        let blob = artifact_to_blob(artifact)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;
        Ok(Self { url })
    }

    /// The `blob:` URL string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        let _ = web_sys::Url::revoke_object_url(&self.url);
    }
}

/// Build a `Blob` from the artifact's bytes with its MIME type.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if Blob construction fails.
pub fn artifact_to_blob(artifact: &OutputArtifact) -> Result<web_sys::Blob, DownloadError> {
    let uint8_array = js_sys::Uint8Array::from(artifact.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&uint8_array);

    let opts = BlobPropertyBag::new();
    opts.set_type(artifact.mime());

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    Ok(blob)
}

/// Trigger a download of the artifact in the browser.
///
/// The filename is `edited-image-<timestamp>.<ext>` with the timestamp
/// taken from the browser clock. The object URL backing the download
/// is revoked when the guard goes out of scope, on every exit path.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (e.g., Blob creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(artifact: &OutputArtifact) -> Result<(), DownloadError> {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let now_ms = js_sys::Date::now().max(0.0) as u64;
    trigger_download_as(artifact, &download_filename(now_ms, artifact.format))
}

/// Trigger a download of the artifact under an explicit filename.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails.
pub fn trigger_download_as(
    artifact: &OutputArtifact,
    filename: &str,
) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    // The guard keeps the URL alive for the click and revokes it when
    // this function returns, whether or not anything below fails.
    let url = ObjectUrl::for_artifact(artifact)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;

    anchor.set_href(url.as_str());
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // Best-effort cleanup — the download is already initiated.
    let _ = body.remove_child(&anchor);

    Ok(())
}

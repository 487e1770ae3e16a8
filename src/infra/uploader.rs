// ============================================================
// Layer 6 - Artifact Uploader
// ============================================================
// Pushes saved artifacts to the remote object store.
//
// Request (one per file):
//   PUT <endpoint>
//   multipart/form-data
//     bucketName = <bucket>
//     files      = <file bytes, named after the local file>
//
// Response:
//   200 {"locations": ["https://...", ...]}  → first location
//   anything else                             → None
//
// Upload faults never abort the run. They are logged at warn
// level (with the store's `error` field when it sent one) and
// come back as a missing URL.

use std::{fs, path::Path, time::Duration};
use reqwest::blocking::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;

use crate::domain::traits::{ArtifactTransport, TransportResponse};
use crate::error::UploadError;

pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

// ─── HTTP transport ───────────────────────────────────────────────────────────
pub struct HttpTransport {
    client:   Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

impl ArtifactTransport for HttpTransport {
    fn put(
        &self,
        bucket:    &str,
        file_name: &str,
        payload:   Vec<u8>,
    ) -> Result<TransportResponse, UploadError> {
        let part = Part::bytes(payload).file_name(file_name.to_string());
        let form = Form::new()
            .text("bucketName", bucket.to_string())
            .part("files", part);

        let response = self.client.put(&self.endpoint).multipart(form).send()?;
        let status   = response.status().as_u16();
        let body     = response.text()?;

        Ok(TransportResponse { status, body })
    }
}

// ─── Response parsing ─────────────────────────────────────────────────────────
#[derive(Debug, Default, Deserialize)]
struct UploadReply {
    #[serde(default)]
    locations: Vec<String>,
    #[serde(default)]
    error:     Option<serde_json::Value>,
}

/// First reported location of a successful upload.
///
/// Returns the provider's error text on failure so the caller can
/// log it.
pub fn parse_upload_response(response: &TransportResponse) -> Result<String, String> {
    let reply: Option<UploadReply> = serde_json::from_str(&response.body).ok();

    if response.status != 200 {
        let detail = reply
            .and_then(|r| r.error)
            .map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|| response.body.clone());
        return Err(format!("status {}: {}", response.status, detail));
    }

    reply
        .and_then(|r| r.locations.into_iter().next())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| format!("no locations in response body: {}", response.body))
}

// ─── Uploader ─────────────────────────────────────────────────────────────────
pub struct ArtifactUploader<'a> {
    transport: &'a dyn ArtifactTransport,
    bucket:    String,
}

impl<'a> ArtifactUploader<'a> {
    pub fn new(transport: &'a dyn ArtifactTransport, bucket: impl Into<String>) -> Self {
        Self { transport, bucket: bucket.into() }
    }

    /// Upload one file; None on any failure.
    pub fn upload(&self, path: &Path) -> Option<String> {
        match self.try_upload(path) {
            Ok(response) => match parse_upload_response(&response) {
                Ok(url) => {
                    tracing::info!("Uploaded '{}' to {}", path.display(), url);
                    Some(url)
                }
                Err(reason) => {
                    tracing::warn!("Upload of '{}' rejected: {}", path.display(), reason);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Upload of '{}' failed: {}", path.display(), e);
                None
            }
        }
    }

    /// Upload model and scaler. Both are always attempted.
    pub fn upload_pair(&self, model: &Path, scaler: &Path) -> (Option<String>, Option<String>) {
        let model_url  = self.upload(model);
        let scaler_url = self.upload(scaler);
        (model_url, scaler_url)
    }

    fn try_upload(&self, path: &Path) -> Result<TransportResponse, UploadError> {
        let payload = fs::read(path).map_err(|source| UploadError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        self.transport.put(&self.bucket, &file_name, payload)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Replies by file name; records every call.
    struct FakeTransport {
        replies: Vec<(&'static str, Result<TransportResponse, &'static str>)>,
        calls:   RefCell<Vec<(String, String, usize)>>,
    }

    impl FakeTransport {
        fn new(replies: Vec<(&'static str, Result<TransportResponse, &'static str>)>) -> Self {
            Self { replies, calls: RefCell::new(Vec::new()) }
        }
    }

    impl ArtifactTransport for FakeTransport {
        fn put(&self, bucket: &str, file_name: &str, payload: Vec<u8>) -> Result<TransportResponse, UploadError> {
            self.calls.borrow_mut().push((bucket.into(), file_name.into(), payload.len()));
            match self.replies.iter().find(|(name, _)| *name == file_name) {
                Some((_, Ok(r)))  => Ok(r.clone()),
                Some((_, Err(e))) => Err(UploadError::Transport(e.to_string())),
                None              => Err(UploadError::Transport("unexpected file".into())),
            }
        }
    }

    fn ok(body: &str) -> TransportResponse {
        TransportResponse { status: 200, body: body.into() }
    }

    #[test]
    fn test_parse_first_location() {
        let r = ok(r#"{"locations":["http://x/a","http://x/b"]}"#);
        assert_eq!(parse_upload_response(&r).unwrap(), "http://x/a");
    }

    #[test]
    fn test_parse_failures() {
        assert!(parse_upload_response(&ok(r#"{"locations":[]}"#)).is_err());
        assert!(parse_upload_response(&ok("not json")).is_err());

        let denied = TransportResponse { status: 403, body: r#"{"error":"forbidden"}"#.into() };
        let err = parse_upload_response(&denied).unwrap_err();
        assert!(err.contains("forbidden"));
        assert!(err.contains("403"));
    }

    #[test]
    fn test_pair_attempts_both_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let model  = dir.path().join("model.mpk");
        let scaler = dir.path().join("scaler.json");
        fs::write(&model, b"weights").unwrap();
        fs::write(&scaler, b"{}").unwrap();

        let transport = FakeTransport::new(vec![
            ("model.mpk",   Err("connection reset")),
            ("scaler.json", Ok(ok(r#"{"locations":["http://x/scaler"]}"#))),
        ]);
        let uploader = ArtifactUploader::new(&transport, "models");
        let (m, s) = uploader.upload_pair(&model, &scaler);

        assert_eq!(m, None);
        assert_eq!(s.as_deref(), Some("http://x/scaler"));

        let calls = transport.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("models".to_string(), "model.mpk".to_string(), 7));
    }

    #[test]
    fn test_rejected_scaler_keeps_model_url() {
        let dir = tempfile::tempdir().unwrap();
        let model  = dir.path().join("model.mpk");
        let scaler = dir.path().join("scaler.json");
        fs::write(&model, b"weights").unwrap();
        fs::write(&scaler, b"{}").unwrap();

        let transport = FakeTransport::new(vec![
            ("model.mpk",   Ok(ok(r#"{"locations":["http://x/model"]}"#))),
            ("scaler.json", Ok(TransportResponse { status: 500, body: r#"{"error":"quota"}"#.into() })),
        ]);
        let uploader = ArtifactUploader::new(&transport, "models");

        assert_eq!(
            uploader.upload_pair(&model, &scaler),
            (Some("http://x/model".to_string()), None)
        );
        assert_eq!(transport.calls.borrow().len(), 2);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FakeTransport::new(vec![]);
        let uploader = ArtifactUploader::new(&transport, "models");
        assert_eq!(uploader.upload(&dir.path().join("absent.mpk")), None);
        assert!(transport.calls.borrow().is_empty());
    }
}

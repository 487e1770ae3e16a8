// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The two seams where the pipeline touches the outside world.
// The application layer only sees these traits, so a test can
// hand it an in-memory table or a fake upload endpoint.

use crate::domain::table::Table;
use crate::error::{PipelineError, UploadError};

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Anything that can produce a typed table.
///
/// Implementations:
///   - CsvSource → delimited file on disk or behind an http(s) URL
pub trait TableSource {
    fn load(&self) -> Result<Table, PipelineError>;

    /// Human-readable location, used in logs and errors.
    fn location(&self) -> &str;
}

// ─── ArtifactTransport ────────────────────────────────────────────────────────
/// Raw status and body of one upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body:   String,
}

/// Something that can push one file into a bucket.
///
/// Implementations:
///   - HttpTransport → multipart PUT against the storage API
pub trait ArtifactTransport {
    fn put(
        &self,
        bucket:    &str,
        file_name: &str,
        payload:   Vec<u8>,
    ) -> Result<TransportResponse, UploadError>;
}

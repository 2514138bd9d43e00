//! Outbound submission payloads and the artifact that comes back.

use chrono::{DateTime, TimeZone};

use super::models::FormDocument;
use super::upload::UploadedFile;

pub const FILL_ENDPOINT: &str = "/api/fill";
pub const FILL_UPLOADED_ENDPOINT: &str = "/api/fill-uploaded";
pub const VALIDATE_ENDPOINT: &str = "/api/validate-pdf";
pub const FIELDS_ENDPOINT: &str = "/api/fields";
pub const HEALTH_ENDPOINT: &str = "/health";

/// Multipart field carrying the uploaded PDF.
pub const PDF_FILE_FIELD: &str = "pdf_file";
/// Multipart field carrying the JSON form document.
pub const FORM_DATA_FIELD: &str = "form_data";

const ARTIFACT_PREFIX: &str = "visit_report";
const ARTIFACT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Template path: the document alone as a JSON body.
    Json,
    /// Uploaded-document path: file bytes plus the JSON document.
    Multipart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionRequest {
    Json { document: FormDocument },
    Multipart { file: UploadedFile, document: FormDocument },
}

impl SubmissionRequest {
    pub fn transport(&self) -> Transport {
        match self {
            SubmissionRequest::Json { .. } => Transport::Json,
            SubmissionRequest::Multipart { .. } => Transport::Multipart,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self.transport() {
            Transport::Json => FILL_ENDPOINT,
            Transport::Multipart => FILL_UPLOADED_ENDPOINT,
        }
    }

    pub fn document(&self) -> &FormDocument {
        match self {
            SubmissionRequest::Json { document } => document,
            SubmissionRequest::Multipart { document, .. } => document,
        }
    }
}

/// Binary body of a successful fill response.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
}

/// `visit_report_YYYYMMDD_HHMMSS.pdf` for the given wall-clock time.
pub fn artifact_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        ARTIFACT_PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        ARTIFACT_EXTENSION
    )
}

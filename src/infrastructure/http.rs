//! HTTP access to the PDF filling service.

use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::{multipart, Client, Response};
use serde::Deserialize;

use crate::domain::{
    Artifact, ClientError, ClientResult, FormSchema, SubmissionRequest, UploadedFile,
    ValidationReport, FIELDS_ENDPOINT, FORM_DATA_FIELD, HEALTH_ENDPOINT, PDF_FILE_FIELD,
    VALIDATE_ENDPOINT,
};

/// Message used when a failed response carries no readable error envelope.
pub const REMOTE_FALLBACK_MESSAGE: &str = "Failed to generate PDF";

/// Remote operations the client depends on.
///
/// Implementations block; callers run them off the UI loop.
pub trait FormService: Send + Sync {
    fn fetch_fields(&self) -> ClientResult<FormSchema>;
    fn health(&self) -> ClientResult<HealthStatus>;
    fn validate_pdf(&self, file: &UploadedFile) -> ClientResult<ValidationReport>;
    fn fill(&self, request: &SubmissionRequest) -> ClientResult<Artifact>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub template_exists: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
}

fn envelope_error(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .filter(|message| !message.trim().is_empty())
}

/// Extracts `error` from a JSON failure body, falling back to a generic message.
pub fn error_message_from_body(body: &[u8]) -> String {
    envelope_error(body).unwrap_or_else(|| REMOTE_FALLBACK_MESSAGE.to_string())
}

/// Parses a validation response body regardless of status code.
///
/// A bare `{"error": ...}` envelope reads as an invalid verdict carrying
/// that message.
pub fn parse_validation_body(status: u16, body: &[u8]) -> ClientResult<ValidationReport> {
    serde_json::from_slice::<ValidationReport>(body).or_else(|e| match envelope_error(body) {
        Some(message) => Ok(ValidationReport {
            valid: false,
            error: Some(message),
            ..Default::default()
        }),
        None => Err(ClientError::ValidationService(format!(
            "unreadable response (HTTP {}): {}",
            status, e
        ))),
    })
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

pub struct HttpFormService {
    client: Client,
    base_url: String,
}

impl HttpFormService {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(transport)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn pdf_part(file: &UploadedFile) -> ClientResult<multipart::Part> {
        multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("application/pdf")
            .map_err(transport)
    }

    fn reject(response: Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.bytes().unwrap_or_default();
        ClientError::RemoteRejected {
            status,
            message: error_message_from_body(&body),
        }
    }
}

impl FormService for HttpFormService {
    fn fetch_fields(&self) -> ClientResult<FormSchema> {
        let response = self.client.get(self.url(FIELDS_ENDPOINT)).send().map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::reject(response));
        }
        response.json::<FormSchema>().map_err(transport)
    }

    fn health(&self) -> ClientResult<HealthStatus> {
        let response = self.client.get(self.url(HEALTH_ENDPOINT)).send().map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::reject(response));
        }
        response.json::<HealthStatus>().map_err(transport)
    }

    fn validate_pdf(&self, file: &UploadedFile) -> ClientResult<ValidationReport> {
        let form = multipart::Form::new().part(PDF_FILE_FIELD, Self::pdf_part(file)?);
        let response = self
            .client
            .post(self.url(VALIDATE_ENDPOINT))
            .multipart(form)
            .send()
            .map_err(|e| ClientError::ValidationService(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| ClientError::ValidationService(e.to_string()))?;
        debug!("Validation response: HTTP {} ({} bytes)", status, body.len());
        parse_validation_body(status, &body)
    }

    fn fill(&self, request: &SubmissionRequest) -> ClientResult<Artifact> {
        let url = self.url(request.endpoint());
        let builder = match request {
            SubmissionRequest::Json { document } => self.client.post(&url).json(document),
            SubmissionRequest::Multipart { file, document } => {
                let form_data = document
                    .to_json()
                    .map_err(|e| ClientError::Transport(e.to_string()))?;
                let form = multipart::Form::new()
                    .part(PDF_FILE_FIELD, Self::pdf_part(file)?)
                    .text(FORM_DATA_FIELD, form_data);
                self.client.post(&url).multipart(form)
            }
        };

        info!("POST {} ({:?})", url, request.transport());
        let response = builder.send().map_err(transport)?;
        if !response.status().is_success() {
            return Err(Self::reject(response));
        }

        let bytes = response.bytes().map_err(transport)?;
        Ok(Artifact {
            bytes: bytes.to_vec(),
        })
    }
}

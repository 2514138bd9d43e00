//! Lifecycle of an optionally uploaded source PDF.

use log::{info, warn};
use serde::Deserialize;

use super::errors::{ClientError, ClientResult};

pub const GENERIC_INVALID_MESSAGE: &str = "PDF validation failed";

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }
}

/// Optional document facts reported alongside a validation verdict.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PdfInfo {
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub encrypted: Option<bool>,
    #[serde(default)]
    pub has_form_fields: Option<bool>,
}

/// Body of a `/api/validate-pdf` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub details: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub info: Option<PdfInfo>,
}

impl ValidationReport {
    /// Error messages for an invalid verdict, never empty.
    pub fn error_messages(&self) -> Vec<String> {
        let listed = [&self.errors, &self.details]
            .into_iter()
            .flatten()
            .find(|messages| !messages.is_empty())
            .cloned();

        listed
            .or_else(|| self.error.clone().map(|message| vec![message]))
            .unwrap_or_else(|| vec![GENERIC_INVALID_MESSAGE.to_string()])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationStatus {
    Validating,
    Valid { warnings: Vec<String> },
    Invalid { errors: Vec<String> },
}

/// Coarse state of the validator, for display and gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    None,
    Validating,
    Valid,
    Invalid,
}

/// Work order for one validation request.
///
/// The token identifies the selection it was issued for; results carrying an
/// older token are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationTicket {
    pub token: u64,
    pub file: UploadedFile,
}

#[derive(Debug, Default)]
pub struct UploadValidator {
    file: Option<UploadedFile>,
    status: Option<ValidationStatus>,
    generation: u64,
}

impl UploadValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn status(&self) -> Option<&ValidationStatus> {
        self.status.as_ref()
    }

    pub fn phase(&self) -> UploadPhase {
        match (&self.file, &self.status) {
            (None, _) => UploadPhase::None,
            (Some(_), Some(ValidationStatus::Valid { .. })) => UploadPhase::Valid,
            (Some(_), Some(ValidationStatus::Invalid { .. })) => UploadPhase::Invalid,
            (Some(_), _) => UploadPhase::Validating,
        }
    }

    /// Records a new selection and returns the validation work to run.
    ///
    /// `None` clears the selection. Either way any in-flight validation is
    /// superseded.
    pub fn select_file(&mut self, file: Option<UploadedFile>) -> Option<ValidationTicket> {
        self.generation += 1;
        self.status = None;

        match file {
            None => {
                self.file = None;
                None
            }
            Some(file) => {
                info!("Validating uploaded PDF {} ({} bytes)", file.name, file.bytes.len());
                self.status = Some(ValidationStatus::Validating);
                self.file = Some(file.clone());
                Some(ValidationTicket {
                    token: self.generation,
                    file,
                })
            }
        }
    }

    /// Applies the outcome of a validation request.
    ///
    /// Returns `false` when the result belongs to a superseded selection and
    /// was ignored.
    pub fn apply_validation(&mut self, token: u64, result: ClientResult<ValidationReport>) -> bool {
        if token != self.generation || self.file.is_none() {
            info!("Discarding stale validation result (token {})", token);
            return false;
        }

        self.status = Some(match result {
            Ok(report) if report.valid => {
                let warnings = report.warnings.unwrap_or_default();
                for warning in &warnings {
                    warn!("PDF validation warning: {}", warning);
                }
                ValidationStatus::Valid { warnings }
            }
            Ok(report) => {
                let errors = report.error_messages();
                warn!("Uploaded PDF rejected: {}", errors.join("; "));
                ValidationStatus::Invalid { errors }
            }
            Err(err) => {
                warn!("Validation request failed: {}", err);
                let message = ClientError::ValidationService(err.detail()).to_string();
                ValidationStatus::Invalid { errors: vec![message] }
            }
        });
        true
    }

    /// Submission gate: `Ok(None)` selects template mode, `Ok(Some(file))`
    /// the uploaded-document mode.
    pub fn gate(&self) -> ClientResult<Option<&UploadedFile>> {
        match self.phase() {
            UploadPhase::None => Ok(None),
            UploadPhase::Valid => Ok(self.file.as_ref()),
            UploadPhase::Validating | UploadPhase::Invalid => Err(ClientError::ValidationBlocked),
        }
    }

    /// Token of the current selection.
    pub fn token(&self) -> u64 {
        self.generation
    }

    /// Drops the selection made under `token` once it has been submitted.
    ///
    /// A newer selection is left alone. Returns whether anything was dropped.
    pub fn release(&mut self, token: u64) -> bool {
        if token != self.generation || self.file.is_none() {
            return false;
        }
        info!("Releasing submitted PDF (token {})", token);
        self.reset();
        true
    }

    /// Drops the selection after the form was reset.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.file = None;
        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf() -> UploadedFile {
        UploadedFile::new("visit.pdf", b"%PDF-1.4".to_vec())
    }

    fn report(json: &str) -> ValidationReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_initial_state_is_none_and_ungated() {
        let validator = UploadValidator::new();
        assert_eq!(validator.phase(), UploadPhase::None);
        assert_eq!(validator.gate(), Ok(None));
    }

    #[test]
    fn test_select_file_starts_validation() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        assert_eq!(ticket.file, pdf());
        assert_eq!(validator.phase(), UploadPhase::Validating);
        assert_eq!(validator.gate(), Err(ClientError::ValidationBlocked));
    }

    #[test]
    fn test_valid_response_keeps_warnings() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        assert!(validator.apply_validation(
            ticket.token,
            Ok(report(r#"{"valid": true, "warnings": ["low resolution"]}"#))
        ));

        assert_eq!(validator.phase(), UploadPhase::Valid);
        assert_eq!(
            validator.status(),
            Some(&ValidationStatus::Valid { warnings: vec!["low resolution".to_string()] })
        );
        assert_eq!(validator.gate(), Ok(Some(&pdf())));
    }

    #[test]
    fn test_invalid_response_keeps_errors() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        validator.apply_validation(
            ticket.token,
            Ok(report(r#"{"valid": false, "errors": ["missing signature field"]}"#)),
        );

        assert_eq!(validator.phase(), UploadPhase::Invalid);
        assert_eq!(
            validator.status(),
            Some(&ValidationStatus::Invalid { errors: vec!["missing signature field".to_string()] })
        );
        assert_eq!(validator.gate(), Err(ClientError::ValidationBlocked));
    }

    #[test]
    fn test_invalid_without_messages_uses_fallbacks() {
        assert_eq!(
            report(r#"{"valid": false}"#).error_messages(),
            vec![GENERIC_INVALID_MESSAGE.to_string()]
        );
        assert_eq!(
            report(r#"{"valid": false, "errors": [], "details": ["Page count mismatch"]}"#).error_messages(),
            vec!["Page count mismatch".to_string()]
        );
        assert_eq!(
            report(r#"{"valid": false, "error": "Invalid PDF"}"#).error_messages(),
            vec!["Invalid PDF".to_string()]
        );
    }

    #[test]
    fn test_transport_failure_becomes_invalid() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        validator.apply_validation(ticket.token, Err(ClientError::Transport("timed out".to_string())));

        match validator.status() {
            Some(ValidationStatus::Invalid { errors }) => {
                assert_eq!(errors, &vec!["Could not validate PDF: timed out".to_string()]);
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut validator = UploadValidator::new();
        let first = validator.select_file(Some(pdf())).unwrap();
        let second = validator.select_file(Some(UploadedFile::new("other.pdf", vec![1, 2]))).unwrap();

        assert!(!validator.apply_validation(first.token, Ok(report(r#"{"valid": true}"#))));
        assert_eq!(validator.phase(), UploadPhase::Validating);

        assert!(validator.apply_validation(second.token, Ok(report(r#"{"valid": false}"#))));
        assert_eq!(validator.phase(), UploadPhase::Invalid);
    }

    #[test]
    fn test_clearing_selection_returns_to_none() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        assert!(validator.select_file(None).is_none());
        assert_eq!(validator.phase(), UploadPhase::None);
        assert!(validator.status().is_none());

        // a late answer for the cleared file changes nothing
        assert!(!validator.apply_validation(ticket.token, Ok(report(r#"{"valid": true}"#))));
        assert_eq!(validator.phase(), UploadPhase::None);
    }

    #[test]
    fn test_release_only_drops_the_submitted_selection() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        validator.apply_validation(ticket.token, Ok(report(r#"{"valid": true}"#)));
        let submitted = validator.token();

        let newer = validator.select_file(Some(UploadedFile::new("newer.pdf", vec![3]))).unwrap();
        assert!(!validator.release(submitted));
        assert_eq!(validator.file().map(|file| file.name.as_str()), Some("newer.pdf"));
        assert!(validator.apply_validation(newer.token, Ok(report(r#"{"valid": true}"#))));

        assert!(validator.release(newer.token));
        assert_eq!(validator.phase(), UploadPhase::None);
    }

    #[test]
    fn test_reset_discards_in_flight_validation() {
        let mut validator = UploadValidator::new();
        let ticket = validator.select_file(Some(pdf())).unwrap();
        validator.reset();
        assert!(!validator.apply_validation(ticket.token, Ok(report(r#"{"valid": true}"#))));
        assert_eq!(validator.phase(), UploadPhase::None);
        assert!(validator.file().is_none());
    }
}

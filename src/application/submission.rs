//! Submission state machine.
//!
//! A submit runs in two halves so the blocking request can happen off the UI
//! loop: [`SubmissionController::prepare`] gathers and gates the payload and
//! enters `submitting`, [`SubmissionController::complete`] delivers the
//! artifact or surfaces the failure and leaves `submitting` again.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use log::{debug, error, info};

use crate::domain::{
    artifact_filename, Artifact, ClientError, ClientResult, FieldCollector, FieldValue,
    FormControl, SignatureCapture, SubmissionRequest, UploadValidator,
};
use crate::infrastructure::ArtifactSink;

/// Document key reserved for the signature image.
pub const SIGNATURE_KEY: &str = "signature";

/// A message that disappears on its own after `ttl`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientMessage {
    pub text: String,
    shown_at: Instant,
    ttl: Duration,
}

impl TransientMessage {
    pub fn new(text: &str, ttl: Duration, now: Instant) -> Self {
        Self {
            text: text.to_string(),
            shown_at: now,
            ttl,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// `released_upload` is set when the uploaded PDF that was sent has been
    /// dropped; a selection made while the request ran is kept.
    Saved { path: PathBuf, released_upload: bool },
    Failed(ClientError),
}

#[derive(Debug)]
pub struct SubmissionController {
    submitting: bool,
    /// Selection token of the uploaded PDF in flight, if any.
    submitted_upload: Option<u64>,
    error: Option<TransientMessage>,
    error_ttl: Duration,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl SubmissionController {
    pub fn new(error_ttl: Duration) -> Self {
        Self {
            submitting: false,
            submitted_upload: None,
            error: None,
            error_ttl,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error(&self) -> Option<&TransientMessage> {
        self.error.as_ref()
    }

    pub fn show_error(&mut self, err: &ClientError, now: Instant) {
        self.error = Some(TransientMessage::new(&err.user_message(), self.error_ttl, now));
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Drops the error once its display time is over.
    pub fn tick(&mut self, now: Instant) {
        if self.error.as_ref().is_some_and(|message| message.is_expired(now)) {
            self.error = None;
        }
    }

    /// Builds the request for one submit and enters `submitting`.
    ///
    /// Returns `Ok(None)` while a submission is already in flight. A blocked
    /// or unexportable submission shows its error and issues nothing.
    pub fn prepare(
        &mut self,
        controls: &[FormControl],
        signature: &SignatureCapture,
        upload: &UploadValidator,
    ) -> ClientResult<Option<SubmissionRequest>> {
        if self.submitting {
            debug!("Submit ignored: a submission is already in flight");
            return Ok(None);
        }

        let mut document = FieldCollector::collect(controls);
        match signature.export() {
            Ok(Some(image)) => document.insert(SIGNATURE_KEY, FieldValue::Text(image)),
            Ok(None) => {}
            Err(err) => {
                self.show_error(&err, Instant::now());
                return Err(err);
            }
        }

        let file = match upload.gate() {
            Ok(file) => file.cloned(),
            Err(err) => {
                info!("Submit blocked: uploaded PDF is {:?}", upload.phase());
                self.show_error(&err, Instant::now());
                return Err(err);
            }
        };

        let submitted_upload = file.as_ref().map(|_| upload.token());
        let request = match file {
            Some(file) => SubmissionRequest::Multipart { file, document },
            None => SubmissionRequest::Json { document },
        };

        debug!(
            "Submitting fields: {:?}",
            request.document().flatten().keys().collect::<Vec<_>>()
        );
        self.submitting = true;
        self.submitted_upload = submitted_upload;
        self.error = None;
        Ok(Some(request))
    }

    /// Finishes a submission with the service's answer.
    ///
    /// On success the artifact is saved under a timestamped name and the
    /// uploaded document that was sent is released, unless the user has
    /// picked another one since. `submitting` is cleared on every path.
    pub fn complete(
        &mut self,
        result: ClientResult<Artifact>,
        upload: &mut UploadValidator,
        sink: &dyn ArtifactSink,
        now: DateTime<Local>,
    ) -> SubmitOutcome {
        let saved = result.and_then(|artifact| sink.save(&artifact_filename(&now), &artifact.bytes));
        self.submitting = false;
        let submitted_upload = self.submitted_upload.take();

        match saved {
            Ok(path) => {
                info!("PDF generated successfully: {}", path.display());
                self.error = None;
                let released_upload = submitted_upload.is_some_and(|token| upload.release(token));
                SubmitOutcome::Saved { path, released_upload }
            }
            Err(err) => {
                error!("Submission failed: {}", err);
                self.show_error(&err, Instant::now());
                SubmitOutcome::Failed(err)
            }
        }
    }
}

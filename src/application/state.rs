//! Application state for the terminal form client.
//!
//! This module holds the interactive session: the form controls, the
//! signature pad, the upload validator and the submission controller, plus
//! the UI mode that decides how input is interpreted.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use log::info;

use super::submission::{SubmissionController, SubmitOutcome, TransientMessage};
use crate::domain::{
    default_controls, Artifact, ClientResult, ControlKind, FormControl, Point, PointerEvent,
    PointerResponse, SignatureCapture, SubmissionRequest, UploadPhase, UploadValidator,
    ValidationReport, ValidationStatus, ValidationTicket,
};
use crate::infrastructure::{ArtifactSink, FileRepository};

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigating between controls
    Normal,
    /// Typing into the selected text control
    Editing,
    /// Typing the path of a PDF to upload
    UploadPath,
    /// Waiting for the user to confirm clearing the form
    ConfirmReset,
    /// Help screen is displayed
    Help,
}

/// Blocking work the event loop runs off the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Validate(ValidationTicket),
    Submit(SubmissionRequest),
}

/// Completion of a [`Command`], delivered back to the loop.
#[derive(Debug)]
pub enum JobResult {
    Validated {
        token: u64,
        result: ClientResult<ValidationReport>,
    },
    Submitted(ClientResult<Artifact>),
}

/// Screen rectangle of the signature pad, in terminal cells.
///
/// Each cell is one logical unit wide and two tall (half blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadArea {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl PadArea {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && column < self.x + self.width
            && row < self.y + self.height
    }

    pub fn to_point(&self, column: u16, row: u16) -> Point {
        Point::new(
            column.saturating_sub(self.x) as f32 + 0.5,
            row.saturating_sub(self.y) as f32 * 2.0 + 1.0,
        )
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32 * 2)
    }
}

fn byte_index(text: &str, char_position: usize) -> usize {
    text.char_indices()
        .nth(char_position)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use visit_report::application::App;
///
/// let app = App::default();
/// assert_eq!(app.selected, 0);
/// assert!(!app.is_busy());
/// ```
#[derive(Debug)]
pub struct App {
    /// Form controls in display order
    pub controls: Vec<FormControl>,
    /// Index of the highlighted control
    pub selected: usize,
    /// Current application mode
    pub mode: AppMode,
    /// Edit buffer for the selected text control
    pub input: String,
    /// Cursor position (in characters) within the active buffer
    pub cursor_position: usize,
    /// Path typed for the upload, kept until reset or submission
    pub upload_input: String,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<TransientMessage>,
    pub signature: SignatureCapture,
    pub upload: UploadValidator,
    pub submission: SubmissionController,
    /// Where the signature pad was last drawn
    pub pad_area: Option<PadArea>,
    pixel_ratio: f32,
    message_ttl: Duration,
}

impl Default for App {
    fn default() -> Self {
        Self::new(default_controls(), 2.0, Duration::from_secs(5))
    }
}

impl App {
    pub fn new(controls: Vec<FormControl>, pixel_ratio: f32, message_ttl: Duration) -> Self {
        Self {
            controls,
            selected: 0,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            upload_input: String::new(),
            help_scroll: 0,
            status_message: None,
            signature: SignatureCapture::new(0, 0, pixel_ratio),
            upload: UploadValidator::new(),
            submission: SubmissionController::new(message_ttl),
            pad_area: None,
            pixel_ratio,
            message_ttl,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.submission.is_submitting()
    }

    pub fn selected_control(&self) -> Option<&FormControl> {
        self.controls.get(self.selected)
    }

    pub fn set_status(&mut self, text: &str) {
        self.status_message = Some(TransientMessage::new(text, self.message_ttl, Instant::now()));
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.controls.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Activates the selected control: toggles a checkbox, picks a radio
    /// option, or starts editing a text field.
    pub fn activate_selected(&mut self) {
        let selected = self.selected;
        let Some(kind) = self.controls.get(selected).map(|control| control.kind) else {
            return;
        };

        match kind {
            ControlKind::Checkbox => {
                let control = &mut self.controls[selected];
                control.checked = !control.checked;
            }
            ControlKind::Radio => {
                let group = self.controls[selected].name.clone();
                for (index, option) in self.controls.iter_mut().enumerate() {
                    if option.kind == ControlKind::Radio && option.name == group {
                        option.checked = index == selected;
                    }
                }
            }
            ControlKind::Text | ControlKind::TextArea => self.start_editing(),
        }
    }

    /// Switches to editing mode for the selected text control.
    pub fn start_editing(&mut self) {
        let Some(control) = self.controls.get(self.selected) else {
            return;
        };
        if !control.is_text() {
            return;
        }
        self.input = control.value.clone();
        self.cursor_position = self.input.chars().count();
        self.mode = AppMode::Editing;
    }

    /// Stores the edit buffer into the control and moves to the next one.
    pub fn finish_editing(&mut self) {
        if let Some(control) = self.controls.get_mut(self.selected) {
            control.value = std::mem::take(&mut self.input);
        }
        self.select_next();
        self.mode = AppMode::Normal;
        self.cursor_position = 0;
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.mode {
            AppMode::Editing => Some(&mut self.input),
            AppMode::UploadPath => Some(&mut self.upload_input),
            _ => None,
        }
    }

    fn active_limit(&self) -> Option<usize> {
        match self.mode {
            AppMode::Editing => self.selected_control().and_then(|control| control.max_length),
            _ => None,
        }
    }

    /// Inserts at the cursor, honouring the control's `max_length`.
    pub fn insert_char(&mut self, c: char) {
        let limit = self.active_limit();
        let position = self.cursor_position;
        let Some(buffer) = self.active_buffer() else {
            return;
        };
        if limit.is_some_and(|max| buffer.chars().count() >= max) {
            return;
        }
        let index = byte_index(buffer, position);
        buffer.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        let position = self.cursor_position;
        if position == 0 {
            return;
        }
        if let Some(buffer) = self.active_buffer() {
            let index = byte_index(buffer, position - 1);
            buffer.remove(index);
            self.cursor_position -= 1;
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let position = self.cursor_position;
        if let Some(buffer) = self.active_buffer() {
            if position < buffer.chars().count() {
                let index = byte_index(buffer, position);
                buffer.remove(index);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let position = self.cursor_position;
        let len = self.active_buffer().map(|buffer| buffer.chars().count()).unwrap_or(0);
        if position < len {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.active_buffer().map(|buffer| buffer.chars().count()).unwrap_or(0);
    }

    /// Opens the upload path prompt.
    pub fn start_upload_input(&mut self) {
        self.mode = AppMode::UploadPath;
        self.cursor_position = self.upload_input.chars().count();
    }

    pub fn cancel_upload_input(&mut self) {
        self.mode = AppMode::Normal;
        self.cursor_position = 0;
    }

    /// Applies the typed path as the new selection.
    ///
    /// An empty path clears the selection. Returns the validation to run for
    /// a newly selected file.
    pub fn finish_upload_input(&mut self) -> Option<Command> {
        self.mode = AppMode::Normal;
        self.cursor_position = 0;

        let path = self.upload_input.trim().to_string();
        if path.is_empty() {
            self.upload.select_file(None);
            self.set_status("Upload cleared, the built-in template will be used");
            return None;
        }

        match FileRepository::load_document(Path::new(&path)) {
            Ok(file) => self.upload.select_file(Some(file)).map(Command::Validate),
            Err(err) => {
                self.upload.select_file(None);
                self.submission.show_error(&err, Instant::now());
                None
            }
        }
    }

    /// Starts a submission; `None` when blocked or already in flight.
    pub fn submit(&mut self) -> Option<Command> {
        match self.submission.prepare(&self.controls, &self.signature, &self.upload) {
            Ok(Some(request)) => {
                self.status_message = None;
                Some(Command::Submit(request))
            }
            Ok(None) | Err(_) => None,
        }
    }

    /// Feeds the result of background work back into the session.
    pub fn apply_job(&mut self, job: JobResult, sink: &dyn ArtifactSink) {
        match job {
            JobResult::Validated { token, result } => {
                if self.upload.apply_validation(token, result)
                    && self.upload.phase() == UploadPhase::Valid
                {
                    self.set_status("PDF validated, it will be used for the report");
                }
            }
            JobResult::Submitted(result) => {
                match self.submission.complete(result, &mut self.upload, sink, Local::now()) {
                    SubmitOutcome::Saved { path, released_upload } => {
                        if released_upload {
                            self.upload_input.clear();
                        }
                        self.set_status(&format!("PDF generated successfully: {}", path.display()));
                    }
                    SubmitOutcome::Failed(_) => {}
                }
            }
        }
    }

    pub fn request_reset(&mut self) {
        self.mode = AppMode::ConfirmReset;
    }

    pub fn cancel_reset(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Clears the form, including the state native controls do not own:
    /// the upload selection and the signature pad.
    pub fn confirm_reset(&mut self) {
        for control in &mut self.controls {
            control.reset();
        }
        self.upload.reset();
        self.upload_input.clear();
        self.signature.clear();
        self.submission.clear_error();
        self.input.clear();
        self.cursor_position = 0;
        self.selected = 0;
        self.mode = AppMode::Normal;
        info!("Form reset");
        self.set_status("Form cleared");
    }

    pub fn clear_signature(&mut self) {
        self.signature.clear();
    }

    /// Tracks the on-screen pad, resizing the surface when it changes.
    pub fn set_pad_area(&mut self, area: PadArea) {
        if self.pad_area == Some(area) {
            return;
        }
        let (width, height) = area.logical_size();
        self.signature.resize(width, height, self.pixel_ratio);
        self.pad_area = Some(area);
    }

    /// Routes a pointer event at a screen cell to the signature pad.
    ///
    /// Presses outside the pad are ignored; moves outside it while drawing
    /// end the stroke.
    pub fn pointer(&mut self, event: PointerEvent, column: u16, row: u16) -> PointerResponse {
        let Some(area) = self.pad_area else {
            return PointerResponse::Ignored;
        };

        let inside = area.contains(column, row);
        let event = match event {
            PointerEvent::Down(_) if !inside => return PointerResponse::Ignored,
            PointerEvent::Down(_) => PointerEvent::Down(area.to_point(column, row)),
            PointerEvent::Move(_) if !inside => PointerEvent::Leave,
            PointerEvent::Move(_) => PointerEvent::Move(area.to_point(column, row)),
            other => other,
        };
        self.signature.handle(event)
    }

    /// Expires transient messages.
    pub fn tick(&mut self, now: Instant) {
        self.submission.tick(now);
        if self.status_message.as_ref().is_some_and(|message| message.is_expired(now)) {
            self.status_message = None;
        }
    }

    pub fn upload_summary(&self) -> String {
        match self.upload.status() {
            None => "No PDF selected, the built-in template will be used".to_string(),
            Some(ValidationStatus::Validating) => "Validating PDF...".to_string(),
            Some(ValidationStatus::Valid { warnings }) if warnings.is_empty() => {
                "PDF is valid".to_string()
            }
            Some(ValidationStatus::Valid { warnings }) => {
                format!("PDF is valid ({} warning(s))", warnings.len())
            }
            Some(ValidationStatus::Invalid { errors }) => {
                format!("PDF is invalid ({} error(s))", errors.len())
            }
        }
    }
}

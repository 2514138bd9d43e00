use crate::application::{App, AppMode, PadArea};
use crate::domain::{ControlKind, FormControl, SignatureCapture, ValidationStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Screen regions, computed the same way for rendering and for mouse hit
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub form: Rect,
    pub upload: Rect,
    pub signature: Rect,
    pub status: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(columns[1]);

    ScreenLayout {
        header: rows[0],
        form: columns[0],
        upload: right[0],
        signature: right[1],
        status: rows[2],
    }
}

fn signature_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title("Signature (drag to sign, Ctrl+L clears)")
}

/// Inner area of the signature pad for the given screen size.
pub fn pad_area(area: Rect) -> PadArea {
    let inner = signature_block().inner(screen_layout(area).signature);
    PadArea {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: inner.height,
    }
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let layout = screen_layout(f.area());

    render_header(f, app, layout.header);
    render_form(f, app, layout.form);
    render_upload(f, app, layout.upload);
    render_signature(f, &app.signature, layout.signature);
    render_status_bar(f, app, layout.status);

    match app.mode {
        AppMode::ConfirmReset => render_confirm_popup(f),
        AppMode::Help => render_help_popup(f, app.help_scroll),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "visit-report - Visit Report Form",
        Style::default().fg(Color::Cyan),
    )];
    if app.is_busy() {
        spans.push(Span::styled(
            "  | Generating PDF...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn control_line(control: &FormControl, editing: Option<&str>) -> String {
    match control.kind {
        ControlKind::Checkbox => {
            format!("[{}] {}", if control.checked { "x" } else { " " }, control.label)
        }
        ControlKind::Radio => {
            format!("({}) {}", if control.checked { "*" } else { " " }, control.label)
        }
        ControlKind::Text | ControlKind::TextArea => {
            let value = editing.unwrap_or(&control.value);
            let limit = control
                .max_length
                .map(|max| format!(" [{}/{}]", value.chars().count(), max))
                .unwrap_or_default();
            let marker = if editing.is_some() { "_" } else { "" };
            format!("{}: {}{}{}", control.label, value.replace('\n', " "), marker, limit)
        }
    }
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .controls
        .iter()
        .enumerate()
        .map(|(index, control)| {
            let editing = (app.mode == AppMode::Editing && index == app.selected)
                .then_some(app.input.as_str());
            ListItem::new(control_line(control, editing))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Form"))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_upload(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    let file_label = match (app.mode, app.upload.file()) {
        (AppMode::UploadPath, _) => format!("Path: {}_", app.upload_input),
        (_, Some(file)) => format!("File: {}", file.name),
        (_, None) => "File: none (Ctrl+U to choose)".to_string(),
    };
    lines.push(Line::from(file_label));

    let summary_style = match app.upload.status() {
        Some(ValidationStatus::Valid { .. }) => Style::default().fg(Color::Green),
        Some(ValidationStatus::Invalid { .. }) => Style::default().fg(Color::Red),
        Some(ValidationStatus::Validating) => Style::default().fg(Color::Yellow),
        None => Style::default(),
    };
    lines.push(Line::from(Span::styled(app.upload_summary(), summary_style)));

    match app.upload.status() {
        Some(ValidationStatus::Invalid { errors }) => {
            for error in errors {
                lines.push(Line::from(Span::styled(
                    format!("- {}", error),
                    Style::default().fg(Color::Red),
                )));
            }
        }
        Some(ValidationStatus::Valid { warnings }) => {
            for warning in warnings {
                lines.push(Line::from(Span::styled(
                    format!("- {}", warning),
                    Style::default().fg(Color::Yellow),
                )));
            }
        }
        _ => {}
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Uploaded PDF"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

/// Half-block rendering: each cell shows two logical rows.
fn signature_rows(signature: &SignatureCapture, width: u16, height: u16) -> Vec<Line<'static>> {
    (0..height as u32)
        .map(|row| {
            let text: String = (0..width as u32)
                .map(|column| {
                    let top = signature.is_inked(column, row * 2);
                    let bottom = signature.is_inked(column, row * 2 + 1);
                    match (top, bottom) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    }
                })
                .collect();
            Line::from(text)
        })
        .collect()
}

fn render_signature(f: &mut Frame, signature: &SignatureCapture, area: Rect) {
    let block = signature_block();
    let inner = block.inner(area);
    let width = inner.width.min(signature.width() as u16);
    let height = inner.height.min((signature.height() / 2) as u16);

    let pad = Paragraph::new(signature_rows(signature, width, height))
        .block(block)
        .style(Style::default().fg(Color::White));
    f.render_widget(pad, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some(error) = app.submission.error() {
        (error.text.clone(), Style::default().fg(Color::Red))
    } else {
        let text = match app.mode {
            AppMode::Normal => match &app.status_message {
                Some(status) => status.text.clone(),
                None => "↑↓: move | Enter/Space: edit/toggle | Ctrl+U: upload PDF | Ctrl+S: submit | Ctrl+R: clear form | F1/?: help | q: quit".to_string(),
            },
            AppMode::Editing => format!("Editing: {} (Enter to save, Esc to cancel)", app.input),
            AppMode::UploadPath => format!(
                "Upload PDF: {} (Enter to validate, empty to clear, Esc to cancel)",
                app.upload_input
            ),
            AppMode::ConfirmReset => "Clear the whole form? (y/n)".to_string(),
            AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        };
        let style = match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::UploadPath => Style::default().fg(Color::Yellow),
            AppMode::ConfirmReset => Style::default().fg(Color::Magenta),
            AppMode::Help => Style::default().fg(Color::Cyan),
        };
        (text, style)
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_confirm_popup(f: &mut Frame) {
    let popup_area = centered(f.area(), 50, 5);
    f.render_widget(Clear, popup_area);

    let popup = Paragraph::new(vec![
        Line::from("Clear the whole form, upload and signature?"),
        Line::from(""),
        Line::from("y: clear    n/Esc: keep"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Confirm")
            .style(Style::default().fg(Color::Magenta)),
    );
    f.render_widget(popup, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("visit-report Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"VISIT REPORT FORM

=== FILLING THE FORM ===
↑↓ or j/k       Move between fields
Tab/Shift+Tab   Move between fields
Enter/Space     Edit a text field, toggle a checkbox, pick a radio option
Esc             Cancel editing
Enter           Save the edited value and move to the next field

=== SIGNATURE ===
Mouse drag      Sign inside the signature pad
Ctrl+L          Clear the signature
                An empty pad sends no signature

=== UPLOADED PDF ===
Ctrl+U          Choose a PDF to fill instead of the built-in template
                The file is validated by the service first
                Submit is blocked until the PDF is valid
                An empty path removes the selection

=== SUBMITTING ===
Ctrl+S          Generate the PDF
                Saved as visit_report_YYYYMMDD_HHMMSS.pdf
                in the configured download directory
Ctrl+R          Clear the whole form (asks for confirmation)

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

q               Quit (outside of editing)"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point, PointerEvent};

    #[test]
    fn test_pad_area_inside_signature_region() {
        let screen = Rect::new(0, 0, 120, 40);
        let layout = screen_layout(screen);
        let pad = pad_area(screen);
        assert!(pad.x > layout.signature.x);
        assert!(pad.width + 2 <= layout.signature.width);
        assert!(pad.height + 2 <= layout.signature.height);
    }

    #[test]
    fn test_control_lines() {
        let checkbox = FormControl::checkbox("a", "Alpha").with_checked(true);
        assert_eq!(control_line(&checkbox, None), "[x] Alpha");

        let radio = FormControl::radio("v", "home", "Home");
        assert_eq!(control_line(&radio, None), "( ) Home");

        let text = FormControl::text("n", "Name").with_value("Dana").with_max_length(Some(10));
        assert_eq!(control_line(&text, None), "Name: Dana [4/10]");
        assert_eq!(control_line(&text, Some("Da")), "Name: Da_ [2/10]");
    }

    #[test]
    fn test_signature_rows_use_half_blocks() {
        let mut pad = SignatureCapture::new(10, 4, 1.0);
        pad.handle(PointerEvent::Down(Point::new(0.0, 0.5)));
        pad.handle(PointerEvent::Move(Point::new(10.0, 0.5)));
        pad.handle(PointerEvent::Up);

        let rows = signature_rows(&pad, 10, 2);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].to_string().contains('▀') || rows[0].to_string().contains('█'));
        assert_eq!(rows[1].to_string().trim(), "");
    }
}

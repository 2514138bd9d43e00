//! Collection of form controls into a [`FormDocument`].

use super::models::{ControlKind, FieldValue, FormControl, FormDocument};

/// Walks form controls in order and builds the structured document sent to
/// the service.
///
/// Rules per control:
/// - unnamed controls are skipped
/// - `group.sub` checkboxes become nested booleans, other checkboxes flat booleans
/// - radios contribute their value only when checked
/// - text values are trimmed and omitted when blank
pub struct FieldCollector;

impl FieldCollector {
    pub fn collect(controls: &[FormControl]) -> FormDocument {
        let mut document = FormDocument::new();

        for control in controls {
            let Some(name) = control.name.as_deref() else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            match control.kind {
                ControlKind::Checkbox => match FormDocument::split_nested(name) {
                    Some((group, sub)) => document.set_nested(group, sub, control.checked),
                    None => document.insert(name, FieldValue::Bool(control.checked)),
                },
                ControlKind::Radio => {
                    if control.checked {
                        document.insert(name, FieldValue::Text(control.value.clone()));
                    }
                }
                ControlKind::Text | ControlKind::TextArea => {
                    let value = control.value.trim();
                    if !value.is_empty() {
                        document.insert(name, FieldValue::Text(value.to_string()));
                    }
                }
            }
        }

        document
    }
}

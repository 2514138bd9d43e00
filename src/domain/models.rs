use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Separator that turns a checkbox name into a `group.sub` pair.
pub const NESTED_SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Checkbox,
    Radio,
    Text,
    TextArea,
}

/// Snapshot of a single form control.
///
/// Controls keep their own default state so a form reset can restore it,
/// the same way native inputs do.
#[derive(Debug, Clone, PartialEq)]
pub struct FormControl {
    pub name: Option<String>,
    pub kind: ControlKind,
    pub label: String,
    pub value: String,
    pub checked: bool,
    pub max_length: Option<usize>,
    default_value: String,
    default_checked: bool,
}

impl FormControl {
    fn new(name: Option<&str>, kind: ControlKind, label: &str) -> Self {
        Self {
            name: name.map(str::to_string),
            kind,
            label: label.to_string(),
            value: String::new(),
            checked: false,
            max_length: None,
            default_value: String::new(),
            default_checked: false,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::new(Some(name), ControlKind::Text, label)
    }

    pub fn textarea(name: &str, label: &str) -> Self {
        Self::new(Some(name), ControlKind::TextArea, label)
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::new(Some(name), ControlKind::Checkbox, label)
    }

    /// A radio option. Options sharing `name` form one group.
    pub fn radio(name: &str, value: &str, label: &str) -> Self {
        let mut control = Self::new(Some(name), ControlKind::Radio, label);
        control.value = value.to_string();
        control.default_value = value.to_string();
        control
    }

    /// A control without a `name`, never collected.
    pub fn unnamed(kind: ControlKind, label: &str) -> Self {
        Self::new(None, kind, label)
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    /// Marks the current value and checked state as the reset target.
    pub fn as_default(mut self) -> Self {
        self.default_value = self.value.clone();
        self.default_checked = self.checked;
        self
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ControlKind::Text | ControlKind::TextArea)
    }

    pub fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.checked = self.default_checked;
    }
}

/// Value of one entry in a [`FormDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    Group(BTreeMap<String, bool>),
}

/// Structured result of collecting a form.
///
/// Serializes as a plain JSON object. Groups are the only nesting level and
/// always hold booleans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormDocument {
    fields: BTreeMap<String, FieldValue>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `group.sub` into its parts. Names with zero or several
    /// separators, or an empty part, are flat.
    pub fn split_nested(name: &str) -> Option<(&str, &str)> {
        let (group, sub) = name.split_once(NESTED_SEPARATOR)?;
        if group.is_empty() || sub.is_empty() || sub.contains(NESTED_SEPARATOR) {
            return None;
        }
        Some((group, sub))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_nested(&self, group: &str, sub: &str) -> Option<bool> {
        match self.fields.get(group) {
            Some(FieldValue::Group(members)) => members.get(sub).copied(),
            _ => None,
        }
    }

    pub fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Sets `group.sub`, creating the group on first use. A flat value
    /// already stored under `group` is replaced by the group.
    pub fn set_nested(&mut self, group: &str, sub: &str, value: bool) {
        let entry = self
            .fields
            .entry(group.to_string())
            .or_insert_with(|| FieldValue::Group(BTreeMap::new()));
        if !matches!(entry, FieldValue::Group(_)) {
            *entry = FieldValue::Group(BTreeMap::new());
        }
        if let FieldValue::Group(members) = entry {
            members.insert(sub.to_string(), value);
        }
    }

    /// Inserts a dotted boolean path as a nested entry, anything else flat.
    pub fn insert_path(&mut self, name: &str, value: FieldValue) {
        match (Self::split_nested(name), value) {
            (Some((group, sub)), FieldValue::Bool(checked)) => self.set_nested(group, sub, checked),
            (_, value) => self.insert(name, value),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Dotted-key view of the document: groups expand to `group.sub` booleans.
    pub fn flatten(&self) -> BTreeMap<String, FieldValue> {
        let mut flat = BTreeMap::new();
        for (name, value) in &self.fields {
            match value {
                FieldValue::Group(members) => {
                    for (sub, checked) in members {
                        flat.insert(
                            format!("{}{}{}", name, NESTED_SEPARATOR, sub),
                            FieldValue::Bool(*checked),
                        );
                    }
                }
                other => {
                    flat.insert(name.clone(), other.clone());
                }
            }
        }
        flat
    }

    /// Rebuilds a document from dotted keys, the inverse of [`flatten`](Self::flatten).
    pub fn from_flat<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        let mut document = Self::new();
        for (name, value) in entries {
            document.insert_path(&name, value);
        }
        document
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_nested_requires_exactly_one_separator() {
        assert_eq!(
            FormDocument::split_nested("treatment_types.referral"),
            Some(("treatment_types", "referral"))
        );
        assert_eq!(FormDocument::split_nested("plain"), None);
        assert_eq!(FormDocument::split_nested("a.b.c"), None);
        assert_eq!(FormDocument::split_nested(".b"), None);
        assert_eq!(FormDocument::split_nested("a."), None);
    }

    #[test]
    fn test_nested_serialization() {
        let mut doc = FormDocument::new();
        doc.insert("patient_name", FieldValue::Text("Dana".to_string()));
        doc.set_nested("treatment_types", "elderly_issues", true);

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"patient_name": "Dana", "treatment_types": {"elderly_issues": true}})
        );
    }

    #[test]
    fn test_empty_document_serializes_to_empty_object() {
        assert_eq!(FormDocument::new().to_json().unwrap(), "{}");
    }

    #[test]
    fn test_group_replaces_flat_value() {
        let mut doc = FormDocument::new();
        doc.insert("attendees", FieldValue::Bool(true));
        doc.set_nested("attendees", "family", false);
        assert_eq!(doc.get_nested("attendees", "family"), Some(false));
    }

    #[test]
    fn test_flatten_expands_groups() {
        let mut doc = FormDocument::new();
        doc.insert("was_hospitalized", FieldValue::Bool(false));
        doc.set_nested("treatment_types", "liaison", true);
        doc.set_nested("treatment_types", "referral", false);

        let flat = doc.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.get("treatment_types.liaison"), Some(&FieldValue::Bool(true)));
        assert_eq!(flat.get("treatment_types.referral"), Some(&FieldValue::Bool(false)));
        assert_eq!(flat.get("was_hospitalized"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_from_flat_restores_document() {
        let mut doc = FormDocument::new();
        doc.insert("office_name", FieldValue::Text("North".to_string()));
        doc.set_nested("treatment_types", "follow_up", true);

        assert_eq!(FormDocument::from_flat(doc.flatten()), doc);
    }

    #[test]
    fn test_dotted_text_stays_flat() {
        let doc = FormDocument::from_flat(vec![(
            "version.label".to_string(),
            FieldValue::Text("v1".to_string()),
        )]);
        assert_eq!(doc.get("version.label"), Some(&FieldValue::Text("v1".to_string())));
    }

    #[test]
    fn test_control_reset_restores_defaults() {
        let mut control = FormControl::text("office_name", "Office").with_value("Main").as_default();
        control.value = "Other".to_string();
        control.reset();
        assert_eq!(control.value, "Main");

        let mut checkbox = FormControl::checkbox("from_abroad", "From abroad");
        checkbox.checked = true;
        checkbox.reset();
        assert!(!checkbox.checked);
    }
}

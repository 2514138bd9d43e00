//! Form layout: either served by `/api/fields` or the built-in visit report.

use std::collections::BTreeMap;
use serde::Deserialize;

use super::models::{FormControl, FormDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Checkbox,
    Text,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Field descriptions keyed by field name, as returned by `/api/fields`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    pub fields: BTreeMap<String, FieldSpec>,
}

/// Turns `employer_first_name` into `Employer first name`.
pub fn humanize(name: &str) -> String {
    let words = name.replace(['_', '.'], " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl FormSchema {
    /// Controls ordered by page, then name.
    pub fn controls(&self) -> Vec<FormControl> {
        let mut specs: Vec<(&String, &FieldSpec)> = self.fields.iter().collect();
        specs.sort_by(|(a_name, a), (b_name, b)| {
            a.page.unwrap_or(0).cmp(&b.page.unwrap_or(0)).then_with(|| a_name.cmp(b_name))
        });

        specs
            .into_iter()
            .map(|(name, spec)| {
                let label = match FormDocument::split_nested(name) {
                    Some((_, sub)) => humanize(sub),
                    None => humanize(name),
                };
                match (spec.kind, spec.multiline) {
                    (FieldKind::Checkbox, _) => FormControl::checkbox(name, &label),
                    (FieldKind::Text, true) => {
                        FormControl::textarea(name, &label).with_max_length(spec.max_length)
                    }
                    (FieldKind::Text, false) => {
                        FormControl::text(name, &label).with_max_length(spec.max_length)
                    }
                }
            })
            .collect()
    }
}

/// Layout used when the service does not describe its fields.
pub fn default_controls() -> Vec<FormControl> {
    vec![
        FormControl::text("visit_date_day", "Visit day").with_max_length(Some(2)),
        FormControl::text("visit_date_month", "Visit month").with_max_length(Some(2)),
        FormControl::text("visit_date_year", "Visit year").with_max_length(Some(4)),
        FormControl::text("office_name", "Office name").with_max_length(Some(50)),
        FormControl::text("social_worker_name", "Social worker").with_max_length(Some(40)),
        FormControl::text("patient_name", "Patient name").with_max_length(Some(40)),
        FormControl::text("employer_city", "Employer city").with_max_length(Some(20)),
        FormControl::radio("visit_type", "home", "Home visit"),
        FormControl::radio("visit_type", "office", "Office visit"),
        FormControl::radio("visit_type", "phone", "Phone follow-up"),
        FormControl::checkbox("was_hospitalized", "Was hospitalized"),
        FormControl::text("hospitalization_where", "Hospitalized where").with_max_length(Some(30)),
        FormControl::textarea("health_status", "Health status").with_max_length(Some(200)),
        FormControl::checkbox("treatment_types.elderly_issues", "Elderly issues"),
        FormControl::checkbox("treatment_types.caregiver_issues", "Caregiver issues"),
        FormControl::checkbox("treatment_types.liaison", "Liaison"),
        FormControl::checkbox("treatment_types.follow_up", "Follow up"),
        FormControl::checkbox("treatment_types.referral", "Referral"),
        FormControl::checkbox("treatment_types.family_report", "Family report"),
        FormControl::textarea("additional_notes", "Additional notes").with_max_length(Some(300)),
        FormControl::text("social_worker_signature_date", "Signature date").with_max_length(Some(10)),
    ]
}

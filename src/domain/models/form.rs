use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFieldType {
    Text,
    Email,
    Phone,
    Select,
    Textarea,
}

/// A guest-facing form field declared by the organizer on a link or poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

pub fn validate_schema(fields: &[CustomField]) -> Result<(), AppError> {
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(AppError::Validation("Custom field name must not be empty".into()));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(AppError::Validation(format!("Duplicate custom field '{}'", field.name)));
        }
        if field.field_type == CustomFieldType::Select && field.options.is_empty() {
            return Err(AppError::Validation(format!("Select field '{}' needs options", field.name)));
        }
    }
    Ok(())
}

/// Checks submitted values against the schema and returns only the declared keys.
pub fn validate_values(
    fields: &[CustomField],
    values: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, AppError> {
    let mut accepted = BTreeMap::new();

    for field in fields {
        let value = values.get(&field.name).map(|v| v.trim()).unwrap_or("");

        if value.is_empty() {
            if field.required {
                return Err(AppError::Validation(format!("Field '{}' is required", field.label)));
            }
            continue;
        }

        match field.field_type {
            CustomFieldType::Select if !field.options.iter().any(|o| o == value) => {
                return Err(AppError::Validation(format!("Invalid option for '{}'", field.label)));
            }
            CustomFieldType::Email if !is_valid_email(value) => {
                return Err(AppError::Validation(format!("Field '{}' must be an email address", field.label)));
            }
            _ => {}
        }

        accepted.insert(field.name.clone(), value.to_string());
    }

    Ok(accepted)
}

pub fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

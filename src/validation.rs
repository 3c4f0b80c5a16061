//! Validation service — pure per-step validators.
//!
//! Every validator is synchronous and side-effect free: it maps a step's
//! form data to a [`ValidationResult`] and never touches the gateway.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::profile::model::{BasicInfo, Location, SkillEntry};

/// Form-level errors are keyed under this name rather than a field.
pub const FORM_ERROR_KEY: &str = "form";

/// Result of validating one step's form data.
///
/// Transient: produced per call, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Field name → message. List-level errors use [`FORM_ERROR_KEY`].
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    /// A passing result with no errors.
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: BTreeMap::new(),
        }
    }

    fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate the basic-info step.
pub fn validate_basic_info(data: &BasicInfo) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if data.full_name.trim().is_empty() {
        errors.insert("full_name".to_string(), "Full name is required.".to_string());
    }
    ValidationResult::from_errors(errors)
}

/// Validate the location step. Coordinates are optional pass-through.
pub fn validate_location(data: &Location) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if data.address_text.trim().is_empty() {
        errors.insert(
            "address_text".to_string(),
            "Address is required.".to_string(),
        );
    }
    ValidationResult::from_errors(errors)
}

/// Validate the skills-offered list as a batch at step transition.
pub fn validate_skills_offered(skills: &[SkillEntry]) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if skills.is_empty() {
        errors.insert(
            FORM_ERROR_KEY.to_string(),
            "Please offer at least one skill.".to_string(),
        );
    }
    ValidationResult::from_errors(errors)
}

/// Validate the skills-needed list as a batch at step transition.
pub fn validate_skills_needed(skills: &[SkillEntry]) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if skills.is_empty() {
        errors.insert(
            FORM_ERROR_KEY.to_string(),
            "Please list at least one skill you need.".to_string(),
        );
    }
    ValidationResult::from_errors(errors)
}

/// Validate a single entry before it is added to an in-memory skills list.
///
/// Only title and description are checked here; the list itself is
/// validated as a batch when the step transitions.
pub fn validate_skill_entry(entry: &SkillEntry) -> ValidationResult {
    let mut errors = BTreeMap::new();
    if entry.title.trim().is_empty() || entry.description.trim().is_empty() {
        errors.insert(
            "current_skill".to_string(),
            "Title and description are required for each skill.".to_string(),
        );
    }
    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::model::ExchangeKind;

    fn entry(title: &str, description: &str) -> SkillEntry {
        SkillEntry {
            title: title.to_string(),
            description: description.to_string(),
            exchange_kind: ExchangeKind::Barter,
        }
    }

    #[test]
    fn basic_info_requires_full_name() {
        let result = validate_basic_info(&BasicInfo {
            full_name: "".to_string(),
            bio: "hi".to_string(),
        });
        assert!(!result.is_valid);
        assert_eq!(result.errors["full_name"], "Full name is required.");

        let result = validate_basic_info(&BasicInfo {
            full_name: "Jane Doe".to_string(),
            bio: String::new(),
        });
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn whitespace_only_name_is_rejected() {
        let result = validate_basic_info(&BasicInfo {
            full_name: "   ".to_string(),
            bio: String::new(),
        });
        assert!(!result.is_valid);
    }

    #[test]
    fn location_requires_address() {
        let result = validate_location(&Location {
            address_text: String::new(),
            latitude: None,
            longitude: None,
        });
        assert!(!result.is_valid);
        assert_eq!(result.errors["address_text"], "Address is required.");

        let result = validate_location(&Location {
            address_text: "123 Main St, Anytown, USA".to_string(),
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
        });
        assert!(result.is_valid);
    }

    #[test]
    fn location_coordinates_are_optional() {
        let result = validate_location(&Location {
            address_text: "123 Main St".to_string(),
            latitude: None,
            longitude: None,
        });
        assert!(result.is_valid);
    }

    #[test]
    fn skills_lists_must_be_non_empty() {
        let result = validate_skills_offered(&[]);
        assert!(!result.is_valid);
        assert_eq!(result.errors[FORM_ERROR_KEY], "Please offer at least one skill.");

        let result = validate_skills_needed(&[]);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors[FORM_ERROR_KEY],
            "Please list at least one skill you need."
        );

        assert!(validate_skills_offered(&[entry("Gardening", "Vegetable beds")]).is_valid);
        assert!(validate_skills_needed(&[entry("Plumbing", "Leaky tap")]).is_valid);
    }

    #[test]
    fn skill_entry_requires_title_and_description() {
        let result = validate_skill_entry(&entry("", "something"));
        assert!(!result.is_valid);
        assert_eq!(
            result.errors["current_skill"],
            "Title and description are required for each skill."
        );

        assert!(!validate_skill_entry(&entry("Tutoring", "")).is_valid);
        assert!(validate_skill_entry(&entry("Tutoring", "Math, high school")).is_valid);
    }
}

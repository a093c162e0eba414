//! Validation Framework
//!
//! Provides validation for application inputs. Requests either implement
//! [`Validatable`] by hand or derive `validator::Validate` and go through
//! [`ValidatorExt`].

mod requests;

pub use requests::*;

use ielts_domain::{AppError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Validation result containing all errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed
    pub valid: bool,
    /// Field-level errors
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Object-level errors
    pub object_errors: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            valid: true,
            field_errors: BTreeMap::new(),
            object_errors: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            field_errors: BTreeMap::new(),
            object_errors: vec![message.into()],
        }
    }

    /// Add a field-level error
    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add an object-level error
    pub fn add_object_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.object_errors.push(message.into());
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }

        for (field, errors) in other.field_errors {
            self.field_errors.entry(field).or_default().extend(errors);
        }

        self.object_errors.extend(other.object_errors);
    }

    /// Convert to AppError if invalid
    pub fn to_error(&self) -> Option<AppError> {
        if self.valid {
            return None;
        }

        let mut messages = Vec::new();

        for (field, errors) in &self.field_errors {
            for error in errors {
                messages.push(format!("{}: {}", field, error));
            }
        }

        messages.extend(self.object_errors.clone());

        Some(AppError::Validation(ValidationError::Multiple(messages)))
    }

    /// Ensure validation passed, returning error if not
    pub fn ensure_valid(&self) -> Result<(), AppError> {
        match self.to_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Trait for validatable types
pub trait Validatable {
    /// Validate the type and return a result
    fn validate_all(&self) -> ValidationResult;
}

/// Extension to convert validator errors to our format
pub trait ValidatorExt {
    fn to_validation_result(&self) -> ValidationResult;
}

impl<T: Validate> ValidatorExt for T {
    fn to_validation_result(&self) -> ValidationResult {
        match self.validate() {
            Ok(_) => ValidationResult::success(),
            Err(errors) => {
                let mut result = ValidationResult::success();

                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string());
                        result.add_field_error(field.to_string(), message);
                    }
                }

                result
            }
        }
    }
}

/// Common validation rules
pub struct ValidationRules;

impl ValidationRules {
    /// Validate a display name: non-blank after trimming and bounded in length
    pub fn validate_name(value: &str, field: &str, max: usize) -> ValidationResult {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            let mut result = ValidationResult::success();
            result.add_field_error(field, "Cannot be blank");
            return result;
        }

        Self::validate_length(trimmed, field, None, Some(max))
    }

    /// Validate a string length in characters
    pub fn validate_length(
        value: &str,
        field: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();
        let length = value.chars().count();

        if let Some(min_len) = min {
            if length < min_len {
                result.add_field_error(field, format!("Must be at least {} characters", min_len));
            }
        }

        if let Some(max_len) = max {
            if length > max_len {
                result.add_field_error(field, format!("Must be {} characters or less", max_len));
            }
        }

        result
    }

    /// Validate a list size
    pub fn validate_list_size<T>(
        list: &[T],
        field: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();

        if let Some(min_size) = min {
            if list.len() < min_size {
                result.add_field_error(field, format!("Must have at least {} items", min_size));
            }
        }

        if let Some(max_size) = max {
            if list.len() > max_size {
                result.add_field_error(field, format!("Must have {} items or less", max_size));
            }
        }

        result
    }
}

//! Request types accepted by the services

use super::{Validatable, ValidationResult, ValidationRules, ValidatorExt};
use ielts_domain::{AccountId, QuestionListType, Skill, TestReference, TestType, UserTestId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Longest accepted user test name
pub const MAX_USER_TEST_NAME_LENGTH: usize = 100;

/// Request to fill a user test with sections covering a type mix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRequest {
    pub user_test_id: UserTestId,
    /// Requested list types; repeats ask for more than one list of a type
    pub types: Vec<QuestionListType>,
}

impl AssemblyRequest {
    pub const MAX_TYPES: usize = 4;

    pub fn new(user_test_id: UserTestId, types: Vec<QuestionListType>) -> Self {
        Self {
            user_test_id,
            types,
        }
    }
}

impl Validatable for AssemblyRequest {
    fn validate_all(&self) -> ValidationResult {
        ValidationRules::validate_list_size(&self.types, "types", Some(1), Some(Self::MAX_TYPES))
    }
}

/// Request to create an empty user test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserTestRequest {
    pub account_id: AccountId,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    pub test_type: TestType,
    pub skill: Skill,
}

impl Validatable for CreateUserTestRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        result.merge(ValidationRules::validate_name(
            &self.name,
            "name",
            MAX_USER_TEST_NAME_LENGTH,
        ));
        result
    }
}

/// Request to rename a user test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameUserTestRequest {
    pub user_test_id: UserTestId,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

impl Validatable for RenameUserTestRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        result.merge(ValidationRules::validate_name(
            &self.name,
            "name",
            MAX_USER_TEST_NAME_LENGTH,
        ));
        result
    }
}

/// Request to record a finished attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResultRequest {
    pub account_id: AccountId,
    pub test: TestReference,
    pub complete_time: Duration,
}

impl Validatable for RecordResultRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if self.complete_time.is_zero() {
            result.add_field_error("complete_time", "Completion time must be greater than zero");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionListType::*;

    #[test]
    fn test_assembly_request_type_bounds() {
        let id = UserTestId::new();
        assert!(!AssemblyRequest::new(id, vec![]).validate_all().valid);
        assert!(AssemblyRequest::new(id, vec![Matching]).validate_all().valid);
        assert!(
            AssemblyRequest::new(id, vec![Matching, Matching, Complete, Diagram])
                .validate_all()
                .valid
        );
        assert!(
            !AssemblyRequest::new(id, vec![Matching, Matching, Complete, Diagram, TrueFalse])
                .validate_all()
                .valid
        );
    }

    #[test]
    fn test_create_user_test_request_rejects_blank_name() {
        let mut request = CreateUserTestRequest {
            account_id: AccountId::new(),
            name: "My reading mock".to_string(),
            test_type: TestType::Academic,
            skill: Skill::Reading,
        };
        assert!(request.validate_all().valid);

        request.name = "   ".to_string();
        let result = request.validate_all();
        assert!(!result.valid);
        assert!(result.field_errors.contains_key("name"));

        request.name = String::new();
        assert!(!request.validate_all().valid);

        request.name = "x".repeat(101);
        assert!(!request.validate_all().valid);
    }

    #[test]
    fn test_record_result_requires_elapsed_time() {
        let request = RecordResultRequest {
            account_id: AccountId::new(),
            test: TestReference::Private(UserTestId::new()),
            complete_time: Duration::ZERO,
        };
        assert!(!request.validate_all().valid);
    }
}

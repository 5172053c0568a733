//! Field-level rules for user candidates

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;

static E164_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[0-9]{1,15}$").expect("E.164 pattern is valid"));

/// Machine-readable reason a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTag {
    Required,
    E164,
    Max,
}

impl ValidationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::E164 => "e164",
            Self::Max => "max",
        }
    }

    /// Human-readable message suitable for rendering next to the field
    pub fn message(&self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::E164 => "Invalid phone number format. Please use +999999999999 format",
            Self::Max => "This field is too long",
        }
    }
}

impl std::fmt::Display for ValidationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub tag: ValidationTag,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, tag: ValidationTag) -> Self {
        Self {
            field: field.into(),
            tag,
            message: tag.message().to_string(),
        }
    }
}

/// All field violations found in one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Tag reported for a field, if it was rejected
    pub fn tag_for(&self, field: &str) -> Option<ValidationTag> {
        self.0.iter().find(|e| e.field == field).map(|e| e.tag)
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for FieldErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.tag))
            .collect();

        write!(f, "{}", parts.join(", "))
    }
}

/// Fields covered by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Phone,
    Password,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Phone => "phone",
            Self::Password => "password",
        }
    }
}

/// A candidate whose fields can be checked against the rule table
pub trait FieldSource {
    /// Value of a field, or `None` when the candidate does not carry it
    fn field(&self, field: Field) -> Option<&str>;
}

#[derive(Debug, Clone, Copy)]
enum Check {
    Required,
    MaxLength(usize),
    E164,
}

impl Check {
    fn failing_tag(&self, value: &str) -> Option<ValidationTag> {
        match self {
            Self::Required if value.trim().is_empty() => Some(ValidationTag::Required),
            Self::MaxLength(max) if value.chars().count() > *max => Some(ValidationTag::Max),
            Self::E164 if !is_e164(value) => Some(ValidationTag::E164),
            _ => None,
        }
    }
}

struct FieldRule {
    field: Field,
    checks: &'static [Check],
}

impl FieldRule {
    /// First failing check wins within a field
    fn evaluate(&self, value: &str) -> Option<FieldError> {
        self.checks
            .iter()
            .find_map(|check| check.failing_tag(value))
            .map(|tag| FieldError::new(self.field.name(), tag))
    }
}

const RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Username,
        checks: &[Check::Required, Check::MaxLength(MAX_USERNAME_LENGTH)],
    },
    FieldRule {
        field: Field::Phone,
        checks: &[Check::Required, Check::E164],
    },
    FieldRule {
        field: Field::Password,
        checks: &[Check::Required, Check::MaxLength(MAX_PASSWORD_LENGTH)],
    },
];

/// Validate every rule against a new candidate, collecting all violations.
///
/// A field the candidate does not carry is treated as empty.
pub fn validate_fields(candidate: &impl FieldSource) -> Result<(), FieldErrors> {
    let errors: Vec<FieldError> = RULES
        .iter()
        .filter_map(|rule| rule.evaluate(candidate.field(rule.field).unwrap_or("")))
        .collect();

    FieldErrors::from(errors).into_result()
}

/// Validate only the fields an update actually changes.
///
/// Absent or empty values mean "not changing" and are skipped. A value that
/// is present goes through the same checks as on create, so whitespace-only
/// input still fails `required`.
pub fn validate_changed_fields(candidate: &impl FieldSource) -> Result<(), FieldErrors> {
    let errors: Vec<FieldError> = RULES
        .iter()
        .filter_map(|rule| {
            candidate
                .field(rule.field)
                .filter(|value| !value.is_empty())
                .and_then(|value| rule.evaluate(value))
        })
        .collect();

    FieldErrors::from(errors).into_result()
}

/// `+` followed by 1 to 15 digits, no separators
pub fn is_e164(phone: &str) -> bool {
    E164_PATTERN.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Candidate {
        username: Option<&'static str>,
        phone: Option<&'static str>,
        password: Option<&'static str>,
    }

    impl FieldSource for Candidate {
        fn field(&self, field: Field) -> Option<&str> {
            match field {
                Field::Username => self.username,
                Field::Phone => self.phone,
                Field::Password => self.password,
            }
        }
    }

    fn valid() -> Candidate {
        Candidate {
            username: Some("alice"),
            phone: Some("+15551234567"),
            password: Some("secret123"),
        }
    }

    #[test]
    fn test_valid_candidate() {
        assert!(validate_fields(&valid()).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_together() {
        let errors = validate_fields(&Candidate::default()).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.tag_for("username"), Some(ValidationTag::Required));
        assert_eq!(errors.tag_for("phone"), Some(ValidationTag::Required));
        assert_eq!(errors.tag_for("password"), Some(ValidationTag::Required));
    }

    #[test]
    fn test_whitespace_username_is_required_violation() {
        let candidate = Candidate {
            username: Some("   "),
            ..valid()
        };

        let errors = validate_fields(&candidate).unwrap_err();
        assert_eq!(errors.tag_for("username"), Some(ValidationTag::Required));
    }

    #[test]
    fn test_bad_phone_and_long_username() {
        let long = Box::leak("a".repeat(51).into_boxed_str());
        let candidate = Candidate {
            username: Some(long),
            phone: Some("555 1234"),
            ..valid()
        };

        let errors = validate_fields(&candidate).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.tag_for("username"), Some(ValidationTag::Max));
        assert_eq!(errors.tag_for("phone"), Some(ValidationTag::E164));
        assert_eq!(errors.tag_for("password"), None);
    }

    #[test]
    fn test_e164() {
        assert!(is_e164("+15551234567"));
        assert!(is_e164("+1"));
        assert!(is_e164("+123456789012345"));

        assert!(!is_e164("15551234567"));
        assert!(!is_e164("+"));
        assert!(!is_e164("+1234567890123456"));
        assert!(!is_e164("+1 555 123 4567"));
        assert!(!is_e164("+1-555-1234"));
        assert!(!is_e164(""));
    }

    #[test]
    fn test_changes_skip_absent_and_empty_fields() {
        let candidate = Candidate {
            username: None,
            phone: Some(""),
            password: None,
        };

        assert!(validate_changed_fields(&candidate).is_ok());
    }

    #[test]
    fn test_changes_validate_present_fields() {
        let candidate = Candidate {
            username: None,
            phone: Some("0044123"),
            password: Some("new-password"),
        };

        let errors = validate_changed_fields(&candidate).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.tag_for("phone"), Some(ValidationTag::E164));
    }

    #[test]
    fn test_changes_reject_whitespace_only_values() {
        let candidate = Candidate {
            username: Some("   "),
            phone: None,
            password: Some("\t "),
        };

        let errors = validate_changed_fields(&candidate).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.tag_for("username"), Some(ValidationTag::Required));
        assert_eq!(errors.tag_for("password"), Some(ValidationTag::Required));
    }

    #[test]
    fn test_messages() {
        let error = FieldError::new("phone", ValidationTag::E164);
        assert_eq!(
            error.message,
            "Invalid phone number format. Please use +999999999999 format"
        );
        assert_eq!(ValidationTag::Required.message(), "This field is required");
    }

    #[test]
    fn test_field_errors_serialize_as_list() {
        let errors = FieldErrors::from(vec![FieldError::new("username", ValidationTag::Required)]);
        let json = serde_json::to_value(&errors).unwrap();

        assert_eq!(json[0]["field"], "username");
        assert_eq!(json[0]["tag"], "required");
    }
}

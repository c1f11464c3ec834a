//! Pure input validation.
//!
//! Every function here is side-effect free and returns a list of
//! human-readable error strings; an empty list means the input is valid.
//! The HTTP layer turns a non-empty list into a 422 envelope.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::role::Role;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex"));

// Simple denylist, not an HTML sanitizer. Only complete
// `<script>...</script>` blocks are removed.
static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script regex"));

/// Registration / admin user-provisioning input.
///
/// `role` stays a raw string so an unknown value surfaces as a validation
/// message rather than a deserialization failure; the service parses it
/// after validation (defaulting to verifier).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public loan-application submission input.
///
/// Numeric fields are optional so "missing" and "out of range" both land in
/// the validation error list instead of failing JSON decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub tenure: Option<i64>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub pan_card: Option<String>,
    #[serde(default)]
    pub aadhar_card: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_valid_password(password: &str) -> bool {
    password.len() >= 6
}

/// Validate registration / user-provisioning input.
pub fn validate_user_input(input: &NewUserInput) -> Vec<String> {
    let mut errors = Vec::new();

    if input.name.trim().len() < 2 {
        errors.push("Name must be at least 2 characters long".to_string());
    }

    if !is_valid_email(&input.email) {
        errors.push("Valid email is required".to_string());
    }

    if !is_valid_password(&input.password) {
        errors.push("Password must be at least 6 characters long".to_string());
    }

    if let Some(role) = &input.role {
        if Role::from_str(role).is_err() {
            errors.push("Role must be either admin or verifier".to_string());
        }
    }

    errors
}

/// Validate login input (shape only; credentials are checked elsewhere).
pub fn validate_login_input(input: &LoginInput) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_valid_email(&input.email) {
        errors.push("Valid email is required".to_string());
    }

    if input.password.is_empty() {
        errors.push("Password is required".to_string());
    }

    errors
}

/// Validate a loan-application submission.
pub fn validate_application_input(input: &LoanApplicationInput) -> Vec<String> {
    let mut errors = Vec::new();

    if input.name.trim().len() < 2 {
        errors.push("Applicant name must be at least 2 characters long".to_string());
    }

    if !is_valid_email(&input.email) {
        errors.push("Valid email is required".to_string());
    }

    if !is_valid_phone(&input.phone) {
        errors.push("Valid 10-digit phone number is required".to_string());
    }

    match input.amount {
        Some(amount) if (1_000.0..=10_000_000.0).contains(&amount) => {}
        _ => errors.push("Loan amount must be between 1,000 and 10,000,000".to_string()),
    }

    if input.purpose.trim().len() < 3 {
        errors.push("Loan purpose must be at least 3 characters long".to_string());
    }

    match input.tenure {
        Some(tenure) if (6..=84).contains(&tenure) => {}
        _ => errors.push("Loan tenure must be between 6 and 84 months".to_string()),
    }

    match input.monthly_income {
        Some(income) if income >= 10_000.0 => {}
        _ => errors.push("Monthly income must be at least 10,000".to_string()),
    }

    if input.employment_type.trim().len() < 3 {
        errors.push("Employment type is required".to_string());
    }

    errors
}

/// Trim a free-text field and strip `<script>...</script>` blocks.
///
/// A denylist pass, not an HTML sanitizer; documented limitation.
pub fn sanitize_string(input: &str) -> String {
    SCRIPT_RE.replace_all(input.trim(), "").into_owned()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn valid_application() -> LoanApplicationInput {
        LoanApplicationInput {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            amount: Some(50_000.0),
            purpose: "Home renovation".to_string(),
            tenure: Some(12),
            monthly_income: Some(20_000.0),
            employment_type: "Salaried".to_string(),
            pan_card: None,
            aadhar_card: None,
        }
    }

    #[test]
    fn valid_application_has_no_errors() {
        assert!(validate_application_input(&valid_application()).is_empty());
    }

    #[test]
    fn email_shape_is_enforced() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@c.com"));
    }

    #[test]
    fn phone_must_be_exactly_ten_digits() {
        assert!(is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123456789"));
        assert!(!is_valid_phone("12345678901"));
        assert!(!is_valid_phone("12345abcde"));
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let mut input = valid_application();
        input.amount = Some(999.0);
        assert!(!validate_application_input(&input).is_empty());
        input.amount = Some(1_000.0);
        assert!(validate_application_input(&input).is_empty());
        input.amount = Some(10_000_000.0);
        assert!(validate_application_input(&input).is_empty());
        input.amount = Some(10_000_001.0);
        assert!(!validate_application_input(&input).is_empty());
    }

    #[test]
    fn tenure_outside_range_is_rejected() {
        let mut input = valid_application();
        input.tenure = Some(5);
        assert!(!validate_application_input(&input).is_empty());
        input.tenure = Some(85);
        assert!(!validate_application_input(&input).is_empty());
        input.tenure = None;
        assert!(!validate_application_input(&input).is_empty());
    }

    #[test]
    fn missing_numeric_fields_report_each_error() {
        let input = LoanApplicationInput::default();
        let errors = validate_application_input(&input);
        assert!(errors.iter().any(|e| e.contains("Loan amount")));
        assert!(errors.iter().any(|e| e.contains("tenure")));
        assert!(errors.iter().any(|e| e.contains("Monthly income")));
    }

    #[test]
    fn unknown_role_string_is_a_validation_error() {
        let input = NewUserInput {
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            password: "secret1".to_string(),
            role: Some("superuser".to_string()),
        };
        let errors = validate_user_input(&input);
        assert_eq!(errors, vec!["Role must be either admin or verifier"]);
    }

    #[test]
    fn sanitize_strips_script_blocks() {
        assert_eq!(
            sanitize_string("hello <script>alert(1)</script>world"),
            "hello world"
        );
        assert_eq!(
            sanitize_string("  <SCRIPT src=\"x\">a</SCRIPT>padded  "),
            "padded"
        );
    }

    #[test]
    fn sanitize_leaves_unclosed_tags_alone() {
        assert_eq!(sanitize_string("<script>open"), "<script>open");
    }

    proptest! {
        #[test]
        fn sanitize_never_grows_input(s in ".{0,256}") {
            prop_assert!(sanitize_string(&s).len() <= s.trim().len());
        }

        #[test]
        fn sanitize_passes_plain_text_through(s in "[a-zA-Z0-9 ]{0,64}") {
            prop_assert_eq!(sanitize_string(&s), s.trim());
        }
    }
}

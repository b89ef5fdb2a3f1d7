//! Field validation for customer forms.
//!
//! Validation happens in the front end, before a record is handed to the
//! storage gateway. The store itself only enforces email uniqueness.

use crate::core::Customer;
use crate::error::ValidationError;
use regex::Regex;
use std::sync::OnceLock;

/// Letters and whitespace, 3 to 50 characters. Shared by name and company.
const NAME_PATTERN: &str = r"^[a-zA-Z\s]{3,50}$";

/// Local part, one or more dot-terminated labels, then a 2-4 character TLD.
const EMAIL_PATTERN: &str = r"^[A-Za-z0-9_.\-]+@([A-Za-z0-9_\-]+\.)+[A-Za-z0-9_\-]{2,4}$";

const PHONE_PATTERN: &str = r"^[0-9]{7,14}$";

/// Which pattern a field is checked against.
#[derive(Debug, Clone, Copy)]
enum FieldPattern {
    Name,
    Email,
    Phone,
}

impl FieldPattern {
    /// Returns the compiled regex for this pattern.
    #[allow(clippy::expect_used)]
    fn regex(self) -> &'static Regex {
        macro_rules! static_regex {
            ($name:ident, $pattern:expr) => {{
                static $name: OnceLock<Regex> = OnceLock::new();
                $name.get_or_init(|| Regex::new($pattern).expect("valid regex"))
            }};
        }

        match self {
            Self::Name => static_regex!(NAME_RE, NAME_PATTERN),
            Self::Email => static_regex!(EMAIL_RE, EMAIL_PATTERN),
            Self::Phone => static_regex!(PHONE_RE, PHONE_PATTERN),
        }
    }

    fn matches(self, value: &str) -> bool {
        self.regex().is_match(value)
    }
}

/// Checks that a field is not blank.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when the value is empty after
/// trimming.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Validates a customer name.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    require("name", value)?;
    if FieldPattern::Name.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::Name)
    }
}

/// Validates an email address.
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    require("email", value)?;
    if FieldPattern::Email.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

/// Validates a phone number.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    require("phone", value)?;
    if FieldPattern::Phone.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::Phone)
    }
}

/// Validates a company name.
pub fn validate_company(value: &str) -> Result<(), ValidationError> {
    require("company", value)?;
    if FieldPattern::Name.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::Company)
    }
}

/// Validates every field of a customer.
///
/// Fields are checked in form order (name, email, phone, company) and the
/// first failure is returned.
///
/// # Examples
///
/// ```
/// use crm_rs::core::{Customer, validate_customer};
///
/// let ok = Customer::new("Ana Gomez", "ana@x.com", "5551234", "Acme");
/// assert!(validate_customer(&ok).is_ok());
///
/// let bad = Customer::new("Ana Gomez", "ana@x.com", "12", "Acme");
/// assert!(validate_customer(&bad).is_err());
/// ```
pub fn validate_customer(customer: &Customer) -> Result<(), ValidationError> {
    validate_name(&customer.name)?;
    validate_email(&customer.email)?;
    validate_phone(&customer.phone)?;
    validate_company(&customer.company)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Ana Gomez" ; "two words")]
    #[test_case("Bob" ; "three letters")]
    #[test_case("Maria del Carmen" ; "several words")]
    fn test_valid_names(name: &str) {
        assert_eq!(validate_name(name), Ok(()));
    }

    #[test_case("Al", ValidationError::Name ; "too short")]
    #[test_case("Ana G.", ValidationError::Name ; "punctuation")]
    #[test_case("Ana 2", ValidationError::Name ; "digit")]
    #[test_case("José", ValidationError::Name ; "non ascii letter")]
    #[test_case("   ", ValidationError::Required { field: "name" } ; "blank")]
    fn test_invalid_names(name: &str, expected: ValidationError) {
        assert_eq!(validate_name(name), Err(expected));
    }

    #[test]
    fn test_name_length_bounds() {
        assert!(validate_name(&"a".repeat(50)).is_ok());
        assert_eq!(validate_name(&"a".repeat(51)), Err(ValidationError::Name));
    }

    #[test_case("ana@x.com" ; "simple")]
    #[test_case("ana.gomez-1@mail.acme.org" ; "dots and dashes")]
    #[test_case("a_b@x.info" ; "four letter tld")]
    fn test_valid_emails(email: &str) {
        assert_eq!(validate_email(email), Ok(()));
    }

    #[test_case("ana.x.com" ; "missing at")]
    #[test_case("ana@x" ; "missing tld")]
    #[test_case("ana@x.museum" ; "tld too long")]
    #[test_case("ana@x.c" ; "tld too short")]
    #[test_case("ana gomez@x.com" ; "space in local part")]
    fn test_invalid_emails(email: &str) {
        assert_eq!(validate_email(email), Err(ValidationError::Email));
    }

    #[test_case("5551234", true ; "seven digits")]
    #[test_case("12345678901234", true ; "fourteen digits")]
    #[test_case("555123", false ; "six digits")]
    #[test_case("123456789012345", false ; "fifteen digits")]
    #[test_case("555-1234", false ; "dash")]
    #[test_case("+5551234", false ; "plus sign")]
    fn test_phone(phone: &str, valid: bool) {
        assert_eq!(validate_phone(phone).is_ok(), valid);
    }

    #[test]
    fn test_company_uses_name_rules() {
        assert!(validate_company("Acme").is_ok());
        assert_eq!(validate_company("A1"), Err(ValidationError::Company));
        assert_eq!(
            validate_company(""),
            Err(ValidationError::Required { field: "company" })
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let customer = Customer::new("A", "not-an-email", "12", "");
        assert_eq!(validate_customer(&customer), Err(ValidationError::Name));

        let customer = Customer::new("Ana Gomez", "ana@x.com", "12", "");
        assert_eq!(validate_customer(&customer), Err(ValidationError::Phone));
    }
}

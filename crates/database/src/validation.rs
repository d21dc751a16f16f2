//! Input validation for profile fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid phone number format.
    InvalidPhoneNumber(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Number outside the accepted range.
    OutOfRange { field: String, min: u32, max: u32, actual: u32 },
    /// Empty value where one is required.
    Empty(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPhoneNumber(msg) => write!(f, "Invalid phone number: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::OutOfRange { field, min, max, actual } => {
                write!(f, "{} must be between {} and {} (got {})", field, min, max, actual)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for console_core::ConsoleError {
    fn from(err: ValidationError) -> Self {
        console_core::ConsoleError::Validation(err.to_string())
    }
}

/// Maximum allowed length for bot names.
pub const MAX_BOT_NAME_LENGTH: usize = 64;

/// Maximum allowed length for tone descriptions.
pub const MAX_TONE_LENGTH: usize = 64;

/// Maximum allowed length for model names.
pub const MAX_MODEL_LENGTH: usize = 64;

/// Maximum allowed length for the opening line of a call.
pub const MAX_BEGIN_MESSAGE_LENGTH: usize = 1000;

/// Maximum allowed length for restaurant names.
pub const MAX_RESTAURANT_NAME_LENGTH: usize = 120;

/// Maximum allowed length for addresses.
pub const MAX_ADDRESS_LENGTH: usize = 300;

/// Maximum allowed length for menu text.
pub const MAX_MENU_LENGTH: usize = 20_000;

/// Accepted seating capacity range.
pub const SEATING_CAPACITY_RANGE: (u32, u32) = (1, 10_000);

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Validate a bot name.
pub fn validate_bot_name(name: &str) -> Result<(), ValidationError> {
    validate_text("bot name", name, MAX_BOT_NAME_LENGTH)
}

/// Validate a tone description.
pub fn validate_tone(tone: &str) -> Result<(), ValidationError> {
    validate_text("tone", tone, MAX_TONE_LENGTH)
}

/// Validate a model name length.
pub fn validate_model_length(model: &str) -> Result<(), ValidationError> {
    validate_text("model", model, MAX_MODEL_LENGTH)
}

/// Validate the begin message.
pub fn validate_begin_message(message: &str) -> Result<(), ValidationError> {
    validate_text("begin message", message, MAX_BEGIN_MESSAGE_LENGTH)
}

/// Validate a restaurant name.
pub fn validate_restaurant_name(name: &str) -> Result<(), ValidationError> {
    validate_text("restaurant name", name, MAX_RESTAURANT_NAME_LENGTH)
}

/// Validate an address.
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    validate_text("address", address, MAX_ADDRESS_LENGTH)
}

/// Validate menu text.
pub fn validate_menu(menu: &str) -> Result<(), ValidationError> {
    validate_text("menu", menu, MAX_MENU_LENGTH)
}

/// Validate a seating capacity.
pub fn validate_seating_capacity(capacity: u32) -> Result<(), ValidationError> {
    let (min, max) = SEATING_CAPACITY_RANGE;
    if capacity < min || capacity > max {
        return Err(ValidationError::OutOfRange {
            field: "seating capacity".to_string(),
            min,
            max,
            actual: capacity,
        });
    }
    Ok(())
}

/// Validate a call-transfer phone number.
///
/// Accepts an optional leading `+` followed by 7 to 15 digits. Spaces,
/// dashes, dots and parentheses are ignored.
pub fn validate_phone_number(number: &str) -> Result<(), ValidationError> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Empty("call transfer number".to_string()));
    }

    let body = number.strip_prefix('+').unwrap_or(number);
    let mut digits = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' | '.' | '(' | ')' => {}
            other => {
                return Err(ValidationError::InvalidPhoneNumber(format!(
                    "invalid character '{}'",
                    other
                )))
            }
        }
    }

    if !(7..=15).contains(&digits) {
        return Err(ValidationError::InvalidPhoneNumber(format!(
            "expected 7 to 15 digits, got {}",
            digits
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone_number_valid() {
        assert!(validate_phone_number("+14155550123").is_ok());
        assert!(validate_phone_number("(415) 555-0123").is_ok());
        assert!(validate_phone_number(" +44 20 7946 0958 ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_phone_number_invalid() {
        // Empty
        assert!(matches!(
            validate_phone_number(""),
            Err(ValidationError::Empty(_))
        ));

        // Letters
        assert!(matches!(
            validate_phone_number("555-CALL-NOW"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));

        // Too short
        assert!(matches!(
            validate_phone_number("12345"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));

        // Plus sign in the middle
        assert!(matches!(
            validate_phone_number("1+4155550123"),
            Err(ValidationError::InvalidPhoneNumber(_))
        ));
    }

    #[test]
    fn test_validate_text_fields() {
        assert!(validate_bot_name("Mia").is_ok());
        assert!(validate_tone("warm and casual").is_ok());
        assert!(validate_model_length("gpt-4o").is_ok());

        assert!(matches!(
            validate_bot_name("   "),
            Err(ValidationError::Empty(_))
        ));

        let long_model = "a".repeat(100);
        assert!(matches!(
            validate_model_length(&long_model),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_seating_capacity() {
        assert!(validate_seating_capacity(40).is_ok());
        assert!(matches!(
            validate_seating_capacity(0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_seating_capacity(10_001).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidPhoneNumber("test message".to_string());
        assert_eq!(err.to_string(), "Invalid phone number: test message");

        let err = ValidationError::TooLong {
            field: "menu".to_string(),
            max: 20,
            actual: 30,
        };
        assert_eq!(err.to_string(), "menu is too long (30 chars, max 20)");
    }
}

// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing records, unknown stages, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a record ID is valid (positive integer)
pub fn validate_record_id(id_str: &str) -> Result<i64, String> {
    id_str.parse::<i64>()
        .map_err(|_| format!("Invalid record ID: '{}'. Record ID must be a number.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid record ID: {}. Record ID must be positive.", id))
            }
        })
}

/// Validate field key format (letters, numbers, underscores)
pub fn validate_field_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Field name cannot be empty".to_string());
    }
    if key == "id" {
        return Err("Field 'id' is assigned automatically".to_string());
    }
    if key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(format!("Invalid field name: '{}'. Field names can only contain letters, numbers, and underscores.", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_record_id() {
        assert_eq!(validate_record_id("1"), Ok(1));
        assert_eq!(validate_record_id("42"), Ok(42));
        assert!(validate_record_id("0").is_err());
        assert!(validate_record_id("-1").is_err());
        assert!(validate_record_id("abc").is_err());
        assert!(validate_record_id("").is_err());
    }

    #[test]
    fn test_validate_field_key() {
        assert!(validate_field_key("company_name").is_ok());
        assert!(validate_field_key("value2").is_ok());
        assert!(validate_field_key("").is_err());
        assert!(validate_field_key("id").is_err());
        assert!(validate_field_key("contact-name").is_err());
        assert!(validate_field_key("next date").is_err());
    }
}

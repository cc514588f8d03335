use validator::{ValidationError, ValidationErrors};

/// Validates that a string contains at least one non-whitespace character
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Value must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Flattens validator errors into a single human-readable message
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank_rejects_whitespace() {
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("\t\n").is_err());
    }

    #[test]
    fn test_validate_not_blank_accepts_content() {
        assert!(validate_not_blank("Italian").is_ok());
        assert!(validate_not_blank("  pasta  ").is_ok());
    }
}

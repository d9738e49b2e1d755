use crate::utils::error::{IntakeError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(IntakeError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 國碼格式：`+` 加 1 到 3 位數字
pub fn validate_country_code(field_name: &str, code: &str) -> Result<()> {
    let digits = code.strip_prefix('+').unwrap_or("");
    if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(IntakeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: code.to_string(),
            reason: "Country code must look like +91".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("submission.endpoint", "https://script.google.com/macros/s/x/exec").is_ok());
        assert!(validate_url("submission.endpoint", "http://127.0.0.1:5000/submit").is_ok());
        assert!(validate_url("submission.endpoint", "").is_err());
        assert!(validate_url("submission.endpoint", "invalid-url").is_err());
        assert!(validate_url("submission.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("submission.timeout_seconds", 30u64, 1, 600).is_ok());
        assert!(validate_range("submission.timeout_seconds", 0u64, 1, 600).is_err());
    }

    #[test]
    fn test_validate_country_code() {
        assert!(validate_country_code("submission.contact_country_code", "+91").is_ok());
        assert!(validate_country_code("submission.contact_country_code", "91").is_err());
        assert!(validate_country_code("submission.contact_country_code", "+").is_err());
        assert!(validate_country_code("submission.contact_country_code", "+9a").is_err());
    }
}

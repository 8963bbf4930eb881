//! Client-side checks of the login and register forms.
//!
//! These run before any request is made; the backend still has the final
//! word on credentials.

use crate::error::StoreError;
use crate::models::{LoginRequest, RegisterRequest};

const MIN_USERNAME_LENGTH: usize = 3;
const MIN_PASSWORD_LENGTH: usize = 6;

/// Loose address check: one `@`, something on both sides, a dot in the
/// domain that is neither its first nor last character, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn check_email(email: &str) -> Result<(), StoreError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(StoreError::Validation("Invalid email".to_string()))
    }
}

fn check_password(password: &str) -> Result<(), StoreError> {
    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )))
    }
}

pub fn login(request: &LoginRequest) -> Result<(), StoreError> {
    check_email(&request.email)?;
    check_password(&request.password)
}

pub fn register(request: &RegisterRequest) -> Result<(), StoreError> {
    if request.username.trim().chars().count() < MIN_USERNAME_LENGTH {
        return Err(StoreError::Validation("Username is too short".to_string()));
    }
    check_email(&request.email)?;
    check_password(&request.password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ada@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("ada"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ada@example"));
        assert!(!is_valid_email("ada@.com"));
        assert!(!is_valid_email("ada@@example.com"));
        assert!(!is_valid_email("ada lovelace@example.com"));
    }

    #[test]
    fn test_login_validation() {
        let ok = LoginRequest {
            email: "ada@example.com".into(),
            password: "secret1".into(),
        };
        assert!(login(&ok).is_ok());

        let short = LoginRequest {
            password: "12345".into(),
            ..ok
        };
        assert_eq!(
            login(&short).unwrap_err().to_string(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_register_validation() {
        let req = RegisterRequest {
            username: "ab".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
        };
        assert_eq!(register(&req).unwrap_err().to_string(), "Username is too short");

        let req = RegisterRequest {
            username: "ada".into(),
            ..req
        };
        assert!(register(&req).is_ok());
    }
}

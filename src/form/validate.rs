//! Local checks run before any service call

use crate::form::state::FormState;
use thiserror::Error;

/// Measured in UTF-16 code units, as a browser's `String.length` counts, so
/// the local rule agrees with what the auth backend sees.
pub const MIN_PASSWORD_LEN: usize = 6;

fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

/// One variant per rule; the message is what the user sees.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your full name.")]
    MissingName,
    #[error("Please enter your email.")]
    MissingEmail,
    #[error("Please enter a password.")]
    MissingNewPassword,
    #[error("Please enter your password.")]
    MissingPassword,
    #[error("Password should be at least 6 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
}

/// Rules apply in order; the first failure wins.
pub fn validate_sign_up(state: &FormState) -> Result<(), ValidationError> {
    if state.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if state.email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if state.password.is_empty() {
        return Err(ValidationError::MissingNewPassword);
    }
    if password_len(&state.password) < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if state.password != state.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_log_in(state: &FormState) -> Result<(), ValidationError> {
    if state.email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if state.password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(name: &str, email: &str, password: &str, confirm: &str) -> FormState {
        FormState {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn sign_up_rules_in_order() {
        assert_eq!(
            validate_sign_up(&sign_up("   ", "", "", "x")),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", " ", "", "x")),
            Err(ValidationError::MissingEmail)
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "", "x")),
            Err(ValidationError::MissingNewPassword)
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "abc12", "x")),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "abc123", "abc124")),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "abc123", "abc123")),
            Ok(())
        );
    }

    #[test]
    fn short_password_message() {
        let err = validate_sign_up(&sign_up("Jane", "jane@x.com", "abc12", "abc12")).unwrap_err();
        assert_eq!(err.to_string(), "Password should be at least 6 characters.");
    }

    #[test]
    fn password_length_counts_utf16_units() {
        // six units, more than six bytes
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "ééééé1", "ééééé1")),
            Ok(())
        );
        // three characters outside the BMP are six units
        assert_eq!(password_len("😀😀😀"), 6);
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "😀😀😀", "😀😀😀")),
            Ok(())
        );
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "😀😀", "😀😀")),
            Err(ValidationError::PasswordTooShort)
        );
    }

    #[test]
    fn whitespace_password_is_not_trimmed() {
        assert_eq!(
            validate_sign_up(&sign_up("Jane", "jane@x.com", "      ", "      ")),
            Ok(())
        );
    }

    #[test]
    fn log_in_rules() {
        let mut state = FormState::default();
        assert_eq!(validate_log_in(&state), Err(ValidationError::MissingEmail));
        state.email = "jane@x.com".into();
        let err = validate_log_in(&state).unwrap_err();
        assert_eq!(err.to_string(), "Please enter your password.");
        state.password = "x".into();
        assert_eq!(validate_log_in(&state), Ok(()));
    }
}

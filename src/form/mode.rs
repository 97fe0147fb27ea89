//! Sign-up / log-in screen mode and the fields each mode renders

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenMode {
    #[default]
    SignUp,
    LogIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

/// How one input is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub field: FormField,
    pub label: &'static str,
    pub input_type: &'static str,
    pub placeholder: &'static str,
    pub autocomplete: &'static str,
}

impl ScreenMode {
    pub fn toggled(self) -> Self {
        match self {
            ScreenMode::SignUp => ScreenMode::LogIn,
            ScreenMode::LogIn => ScreenMode::SignUp,
        }
    }

    pub fn fields(self) -> &'static [FormField] {
        match self {
            ScreenMode::SignUp => &[
                FormField::Name,
                FormField::Email,
                FormField::Password,
                FormField::ConfirmPassword,
            ],
            ScreenMode::LogIn => &[FormField::Email, FormField::Password],
        }
    }

    /// Autofill hint for the password input: a new credential on sign-up,
    /// the stored one on log-in.
    pub fn password_autocomplete(self) -> &'static str {
        match self {
            ScreenMode::SignUp => "new-password",
            ScreenMode::LogIn => "current-password",
        }
    }

    pub fn field_spec(self, field: FormField) -> FieldSpec {
        match field {
            FormField::Name => FieldSpec {
                field,
                label: "Full Name",
                input_type: "text",
                placeholder: "John Doe",
                autocomplete: "name",
            },
            FormField::Email => FieldSpec {
                field,
                label: "Email",
                input_type: "email",
                placeholder: "JohnDoe@gmail.com",
                autocomplete: "email",
            },
            FormField::Password => FieldSpec {
                field,
                label: "Password",
                input_type: "password",
                placeholder: "Example123",
                autocomplete: self.password_autocomplete(),
            },
            FormField::ConfirmPassword => FieldSpec {
                field,
                label: "Confirm Password",
                input_type: "password",
                placeholder: "Example123",
                autocomplete: "new-password",
            },
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ScreenMode::SignUp => "Sign Up on Financely.",
            ScreenMode::LogIn => "Log In on Financely.",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            ScreenMode::SignUp => "Sign Up with Email and Password",
            ScreenMode::LogIn => "Log In with Email and Password",
        }
    }

    pub fn google_label(self) -> &'static str {
        match self {
            ScreenMode::SignUp => "Sign Up with Google",
            ScreenMode::LogIn => "Log In with Google",
        }
    }

    pub fn toggle_prompt(self) -> &'static str {
        match self {
            ScreenMode::SignUp => "Already have an account? Click here to Log In.",
            ScreenMode::LogIn => "Don't have an account? Click here to Sign Up.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_sign_up_and_toggles_back_and_forth() {
        let mode = ScreenMode::default();
        assert_eq!(mode, ScreenMode::SignUp);
        assert_eq!(mode.toggled(), ScreenMode::LogIn);
        assert_eq!(mode.toggled().toggled(), ScreenMode::SignUp);
    }

    #[test]
    fn log_in_hides_name_and_confirmation() {
        assert_eq!(
            ScreenMode::LogIn.fields(),
            &[FormField::Email, FormField::Password]
        );
        assert_eq!(ScreenMode::SignUp.fields().len(), 4);
    }

    #[test]
    fn password_autofill_follows_mode() {
        assert_eq!(
            ScreenMode::SignUp.field_spec(FormField::Password).autocomplete,
            "new-password"
        );
        assert_eq!(
            ScreenMode::LogIn.field_spec(FormField::Password).autocomplete,
            "current-password"
        );
        assert_eq!(
            ScreenMode::LogIn
                .field_spec(FormField::ConfirmPassword)
                .autocomplete,
            "new-password"
        );
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&ScreenMode::LogIn).unwrap(), "\"log_in\"");
        assert_eq!(
            serde_json::to_string(&FormField::ConfirmPassword).unwrap(),
            "\"confirm_password\""
        );
    }
}

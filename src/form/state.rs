//! Form field values and the rendered view

use crate::form::mode::{FieldSpec, FormField, ScreenMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// A batch of keystrokes; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl FormState {
    pub fn apply(&mut self, update: FieldUpdate) {
        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.email {
            self.email = v;
        }
        if let Some(v) = update.password {
            self.password = v;
        }
        if let Some(v) = update.confirm_password {
            self.confirm_password = v;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Echoable value of a field; passwords are never echoed back.
    fn visible_value(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => Some(&self.name),
            FormField::Email => Some(&self.email),
            FormField::Password | FormField::ConfirmPassword => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    #[serde(flatten)]
    pub spec: FieldSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub mode: ScreenMode,
    pub title: &'static str,
    pub fields: Vec<FieldView>,
    pub submit_label: &'static str,
    pub google_label: &'static str,
    pub toggle_prompt: &'static str,
    pub loading: bool,
}

const LOADING_LABEL: &str = "Loading...";

pub fn render(mode: ScreenMode, state: &FormState, loading: bool) -> FormView {
    let fields = mode
        .fields()
        .iter()
        .map(|&field| FieldView {
            spec: mode.field_spec(field),
            value: state.visible_value(field).map(str::to_string),
        })
        .collect();

    let (submit_label, google_label) = if loading {
        (LOADING_LABEL, LOADING_LABEL)
    } else {
        (mode.submit_label(), mode.google_label())
    };

    FormView {
        mode,
        title: mode.title(),
        fields,
        submit_label,
        google_label,
        toggle_prompt: mode.toggle_prompt(),
        loading,
    }
}

//! Combined sign-up / log-in form

pub mod controller;
pub mod mode;
pub mod profile;
pub mod state;
pub mod validate;

pub use controller::{AuthForm, FormSettings, Notice, NoticeLevel, SubmitOutcome};
pub use mode::{FormField, ScreenMode};
pub use profile::{ensure_profile_document, ProfileDocument};
pub use state::{FieldUpdate, FormState, FormView};
pub use validate::ValidationError;

//! Sign-up / log-in form controller
//!
//! Owns the field values, the screen mode and the busy flag of one mounted
//! form, and runs the three sign-in flows against the service handles.

use crate::firebase::clients::ServiceClients;
use crate::firebase::config::AppConfig;
use crate::form::mode::ScreenMode;
use crate::form::profile::ensure_profile_document;
use crate::form::state::{render, FieldUpdate, FormState, FormView};
use crate::form::validate::{validate_log_in, validate_sign_up, ValidationError};
use crate::service::{AuthError, StoreError};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A toast shown to the user at the end of a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Signed in; the browser should go to `route`.
    Navigate { notice: Notice, route: String },
    /// A local rule failed; nothing was sent.
    Invalid(Notice),
    /// The service rejected the request.
    Failed(Notice),
    /// Another flow is already in flight on this form.
    Busy,
    /// The form was unmounted before the flow finished.
    Abandoned,
}

impl SubmitOutcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            SubmitOutcome::Navigate { notice, .. }
            | SubmitOutcome::Invalid(notice)
            | SubmitOutcome::Failed(notice) => Some(notice),
            SubmitOutcome::Busy | SubmitOutcome::Abandoned => None,
        }
    }
}

#[derive(Error, Debug)]
enum FlowError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub users_collection: String,
    pub landing_route: String,
}

impl FormSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            users_collection: config.users_collection.clone(),
            landing_route: config.landing_route.clone(),
        }
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Default)]
struct FormInner {
    mode: ScreenMode,
    state: FormState,
    loading: bool,
    last_notice: Option<Notice>,
}

/// Clears the busy flag when dropped, whichever way the flow ends.
struct BusyGuard {
    inner: Arc<Mutex<FormInner>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}

#[derive(Clone)]
pub struct AuthForm {
    inner: Arc<Mutex<FormInner>>,
    clients: ServiceClients,
    settings: Arc<FormSettings>,
    cancel: CancellationToken,
}

impl AuthForm {
    pub fn new(clients: ServiceClients, settings: FormSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FormInner::default())),
            clients,
            settings: Arc::new(settings),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> ScreenMode {
        self.lock().mode
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn fields(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.lock().last_notice.clone()
    }

    pub fn view(&self) -> FormView {
        let inner = self.lock();
        render(inner.mode, &inner.state, inner.loading)
    }

    pub fn update_fields(&self, update: FieldUpdate) {
        self.lock().state.apply(update);
    }

    /// Switches between sign-up and log-in. Field values are kept.
    pub fn toggle_mode(&self) -> ScreenMode {
        let mut inner = self.lock();
        inner.mode = inner.mode.toggled();
        inner.mode
    }

    /// Cancels any in-flight flow; its late result is dropped.
    pub fn unmount(&self) {
        self.cancel.cancel();
    }

    pub fn is_unmounted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Submits the form with the handler of the current mode.
    pub async fn submit(&self) -> SubmitOutcome {
        match self.mode() {
            ScreenMode::SignUp => self.submit_sign_up().await,
            ScreenMode::LogIn => self.submit_log_in().await,
        }
    }

    pub async fn submit_sign_up(&self) -> SubmitOutcome {
        let (fields, busy) = match self.begin(validate_sign_up) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let result = self
            .until_unmounted(async {
                let auth = &self.clients.auth;
                let mut identity = auth.create_account(&fields.email, &fields.password).await?;
                auth.update_display_name(&identity, &fields.name).await?;
                identity.display_name = Some(fields.name.clone());
                ensure_profile_document(
                    self.clients.db.as_ref(),
                    &self.settings.users_collection,
                    &identity,
                    &fields.name,
                )
                .await?;
                Ok::<(), FlowError>(())
            })
            .await;

        self.finish(result, busy, "Account created successfully!", "Signup error")
    }

    /// Existing accounts are assumed provisioned; no profile write here.
    pub async fn submit_log_in(&self) -> SubmitOutcome {
        let (fields, busy) = match self.begin(validate_log_in) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let result = self
            .until_unmounted(async {
                self.clients
                    .auth
                    .sign_in(&fields.email, &fields.password)
                    .await?;
                Ok::<(), FlowError>(())
            })
            .await;

        self.finish(result, busy, "Logged in successfully!", "Login error")
    }

    pub async fn submit_google(&self) -> SubmitOutcome {
        let (_, busy) = match self.begin(|_| Ok(())) {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        let result = self
            .until_unmounted(async {
                let identity = self
                    .clients
                    .auth
                    .sign_in_federated(self.clients.provider.descriptor())
                    .await?;
                let fallback = identity.display_name.clone().unwrap_or_default();
                ensure_profile_document(
                    self.clients.db.as_ref(),
                    &self.settings.users_collection,
                    &identity,
                    &fallback,
                )
                .await?;
                Ok::<(), FlowError>(())
            })
            .await;

        self.finish(result, busy, "Signed in with Google!", "Google sign-in error")
    }

    /// Checks the busy flag and the local rules, then marks the form busy and
    /// snapshots the fields for the flow.
    fn begin(
        &self,
        validate: impl FnOnce(&FormState) -> Result<(), ValidationError>,
    ) -> Result<(FormState, BusyGuard), SubmitOutcome> {
        if self.is_unmounted() {
            return Err(SubmitOutcome::Abandoned);
        }

        let mut inner = self.lock();
        if inner.loading {
            return Err(SubmitOutcome::Busy);
        }
        if let Err(rule) = validate(&inner.state) {
            let notice = Notice::error(rule.to_string());
            inner.last_notice = Some(notice.clone());
            return Err(SubmitOutcome::Invalid(notice));
        }

        inner.loading = true;
        let fields = inner.state.clone();
        drop(inner);

        Ok((
            fields,
            BusyGuard {
                inner: Arc::clone(&self.inner),
            },
        ))
    }

    async fn until_unmounted<F>(&self, flow: F) -> Option<Result<(), FlowError>>
    where
        F: Future<Output = Result<(), FlowError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = flow => Some(result),
        }
    }

    fn finish(
        &self,
        result: Option<Result<(), FlowError>>,
        busy: BusyGuard,
        success: &str,
        label: &str,
    ) -> SubmitOutcome {
        let outcome = match result {
            _ if self.is_unmounted() => {
                info!("{}: form unmounted, dropping result", label);
                SubmitOutcome::Abandoned
            }
            None => SubmitOutcome::Abandoned,
            Some(Ok(())) => {
                let notice = Notice::success(success);
                let mut inner = self.lock();
                inner.state.reset();
                inner.last_notice = Some(notice.clone());
                SubmitOutcome::Navigate {
                    notice,
                    route: self.settings.landing_route.clone(),
                }
            }
            Some(Err(e)) => {
                error!("{}: {}", label, e);
                let notice = Notice::error(e.to_string());
                self.lock().last_notice = Some(notice.clone());
                SubmitOutcome::Failed(notice)
            }
        };
        drop(busy);
        outcome
    }
}

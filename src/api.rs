//! HTTP API driving the sign-up / log-in form

use crate::firebase::{AppConfig, ServiceClients};
use crate::form::{AuthForm, FieldUpdate, FormSettings, FormView, Notice, SubmitOutcome};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use uuid::Uuid;

const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// A mounted form and the last time a request reached it.
struct MountedForm {
    form: AuthForm,
    last_touched: Instant,
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub clients: ServiceClients,
    pub settings: FormSettings,
    forms: Arc<RwLock<HashMap<Uuid, MountedForm>>>,
    max_forms: usize,
    idle_timeout: Duration,
}

impl AppState {
    pub fn new(clients: ServiceClients, settings: FormSettings) -> Self {
        let defaults = AppConfig::default();
        Self {
            clients,
            settings,
            forms: Arc::new(RwLock::new(HashMap::new())),
            max_forms: defaults.max_forms,
            idle_timeout: defaults.form_idle_timeout(),
        }
    }

    pub fn with_limits(mut self, max_forms: usize, idle_timeout: Duration) -> Self {
        self.max_forms = max_forms.max(1);
        self.idle_timeout = idle_timeout;
        self
    }

    pub async fn mounted_forms(&self) -> usize {
        self.forms.read().await.len()
    }

    async fn mount(&self, form: AuthForm) -> Uuid {
        self.mount_at(form, Instant::now()).await
    }

    /// Inserts a new form, evicting the least recently used one when full.
    /// Idle forms go first; a form with a flow in flight only when every
    /// mounted form is busy.
    async fn mount_at(&self, form: AuthForm, now: Instant) -> Uuid {
        let id = Uuid::new_v4();
        let mut forms = self.forms.write().await;

        while forms.len() >= self.max_forms {
            let victim = forms
                .iter()
                .min_by_key(|(_, m)| (m.form.is_loading(), m.last_touched))
                .map(|(id, _)| *id);
            let Some(victim) = victim else { break };
            if let Some(evicted) = forms.remove(&victim) {
                evicted.form.unmount();
                info!("Evicted form {} (limit {})", victim, self.max_forms);
            }
        }

        forms.insert(
            id,
            MountedForm {
                form,
                last_touched: now,
            },
        );
        id
    }

    async fn form(&self, id: Uuid) -> Option<AuthForm> {
        self.form_at(id, Instant::now()).await
    }

    async fn form_at(&self, id: Uuid, now: Instant) -> Option<AuthForm> {
        let mut forms = self.forms.write().await;
        let mounted = forms.get_mut(&id)?;
        mounted.last_touched = now;
        Some(mounted.form.clone())
    }

    async fn remove(&self, id: Uuid) -> Option<AuthForm> {
        let form = self.forms.write().await.remove(&id).map(|m| m.form);
        if let Some(form) = &form {
            form.unmount();
        }
        form
    }

    /// Unmounts forms untouched for the idle timeout. Forms with a flow in
    /// flight are left for a later sweep. Returns how many were removed.
    pub async fn sweep_idle(&self, now: Instant) -> usize {
        let mut forms = self.forms.write().await;
        let before = forms.len();
        forms.retain(|id, mounted| {
            let idle = now.saturating_duration_since(mounted.last_touched) >= self.idle_timeout;
            if idle && !mounted.form.is_loading() {
                mounted.form.unmount();
                debug!("Unmounted idle form {}", id);
                false
            } else {
                true
            }
        });
        let removed = before - forms.len();
        if removed > 0 {
            info!("Swept {} idle form(s)", removed);
        }
        removed
    }

    /// Periodically sweeps idle forms for the life of the process.
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = (self.idle_timeout / 2).max(MIN_SWEEP_PERIOD);
        tokio::spawn(async move {
            loop {
                sleep(period).await;
                state.sweep_idle(Instant::now()).await;
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub project_id: String,
    pub mounted_forms: usize,
}

#[derive(Debug, Serialize)]
pub struct MountResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: FormView,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub notice: Option<Notice>,
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

// Configure routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/forms", post(mount_form))
        .route("/forms/:id", get(get_form).delete(unmount_form))
        .route("/forms/:id/fields", put(update_fields))
        .route("/forms/:id/toggle", post(toggle_mode))
        .route("/forms/:id/submit", post(submit))
        .route("/forms/:id/google", post(submit_google))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn form_not_found(id: Uuid) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: format!("No form with id {}", id),
        }),
    )
        .into_response()
}

// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let mounted_forms = state.mounted_forms().await;
    Json(StatusResponse {
        status: "ok".to_string(),
        service: "financely-auth".to_string(),
        project_id: state.clients.app.project_id().to_string(),
        mounted_forms,
    })
}

async fn mount_form(State(state): State<AppState>) -> impl IntoResponse {
    let form = AuthForm::new(state.clients.clone(), state.settings.clone());
    let view = form.view();
    let id = state.mount(form).await;

    info!("Mounted form {}", id);
    (StatusCode::CREATED, Json(MountResponse { id, view }))
}

async fn get_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.form(id).await {
        Some(form) => Json(form.view()).into_response(),
        None => form_not_found(id),
    }
}

async fn unmount_form(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.remove(id).await {
        Some(_) => {
            info!("Unmounted form {}", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => form_not_found(id),
    }
}

async fn update_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FieldUpdate>,
) -> Response {
    match state.form(id).await {
        Some(form) => {
            form.update_fields(update);
            Json(form.view()).into_response()
        }
        None => form_not_found(id),
    }
}

async fn toggle_mode(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.form(id).await {
        Some(form) => {
            form.toggle_mode();
            Json(form.view()).into_response()
        }
        None => form_not_found(id),
    }
}

async fn submit(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let Some(form) = state.form(id).await else {
        return form_not_found(id);
    };
    let outcome = form.submit().await;
    respond(&state, id, outcome).await
}

async fn submit_google(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let Some(form) = state.form(id).await else {
        return form_not_found(id);
    };
    let outcome = form.submit_google().await;
    respond(&state, id, outcome).await
}

/// Maps a flow outcome to HTTP. A form that navigated away is unmounted.
async fn respond(state: &AppState, id: Uuid, outcome: SubmitOutcome) -> Response {
    let notice = outcome.notice().cloned();
    let (status, redirect) = match outcome {
        SubmitOutcome::Navigate { route, .. } => {
            state.remove(id).await;
            (StatusCode::OK, Some(route))
        }
        SubmitOutcome::Invalid(_) => (StatusCode::UNPROCESSABLE_ENTITY, None),
        SubmitOutcome::Failed(_) => (StatusCode::BAD_REQUEST, None),
        SubmitOutcome::Busy => (StatusCode::CONFLICT, None),
        SubmitOutcome::Abandoned => (StatusCode::GONE, None),
    };

    (
        status,
        Json(SubmitResponse {
            success: redirect.is_some(),
            notice,
            redirect,
        }),
    )
        .into_response()
}

use crate::errors::AppError;
use crate::models::{LogForm, User};
use crate::state::AppState;
use crate::ui::{render_index, render_progress};
use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    response::Html,
};
use tracing::{info, warn};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let today = state.clock.now().date();
    let ledger = state.ledger.lock().await;
    let users = ledger.snapshot(today).await?;
    Ok(Html(render_index(&users, ledger.settings())))
}

pub async fn log_distance(
    State(state): State<AppState>,
    form: Result<Form<LogForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(form) = form.map_err(|err| {
        warn!(error = %err, "error parsing form");
        AppError::bad_request("error parsing form")
    })?;
    info!(
        name = ?form.name,
        distance = ?form.distance,
        unit = ?form.unit,
        activity = ?form.activity,
        "received request to log distance"
    );

    let now = state.clock.now();
    let ledger = state.ledger.lock().await;
    ledger.log_distance(&form, now).await?;

    // The entry is committed at this point; a failure below only affects display.
    let users = ledger
        .snapshot(now.date())
        .await
        .map_err(|err| AppError::internal("error rendering progress section", err))?;
    Ok(Html(render_progress(&users, ledger.settings())))
}

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let today = state.clock.now().date();
    let ledger = state.ledger.lock().await;
    Ok(Json(ledger.snapshot(today).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<User>, AppError> {
    let today = state.clock.now().date();
    let ledger = state.ledger.lock().await;
    Ok(Json(ledger.lookup(&name, today).await?))
}

pub async fn health() -> &'static str {
    "ok"
}

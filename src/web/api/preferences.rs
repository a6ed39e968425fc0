use crate::models::preferences::{NotificationUpdate, ThemeUpdate};
use crate::panel::PanelView;
use crate::web::api::{ApiError, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::debug;

// Handler for getting the current panel view
pub async fn get_preferences(State(state): State<AppState>) -> Json<PanelView> {
    Json(state.panel.view())
}

// Handler for the notification switches
pub async fn update_notifications(
    State(state): State<AppState>,
    Json(update): Json<NotificationUpdate>,
) -> Result<Json<PanelView>, ApiError> {
    debug!("Updating notification switches: {:?}", update);
    let view = state.panel.update_notifications(update)?;
    Ok(Json(view))
}

// Handler for the theme switch - applies instantly, persists debounced
pub async fn update_theme(
    State(state): State<AppState>,
    Json(update): Json<ThemeUpdate>,
) -> Result<Json<PanelView>, ApiError> {
    debug!("Updating theme switch: {}", update.theme);
    let view = state.panel.set_theme(update.theme)?;
    Ok(Json(view))
}

// Handler for the manual save button
pub async fn save_preferences(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PanelView>), ApiError> {
    debug!("Manual save requested");
    let view = state.panel.save_now()?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

// Handler for retrying the initial load
pub async fn reload_preferences(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<PanelView>), ApiError> {
    let view = state.panel.reload()?;
    Ok((StatusCode::ACCEPTED, Json(view)))
}

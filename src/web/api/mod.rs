use crate::error::PanelError;
use crate::panel::PreferencesPanel;
use crate::theme::SharedThemeHolder;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

pub mod events;
pub mod preferences;
pub mod theme;

// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub panel: Arc<PreferencesPanel>,
    pub theme: SharedThemeHolder,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// Maps panel errors to HTTP responses
pub struct ApiError(pub PanelError);

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PanelError::NotReady => StatusCode::CONFLICT,
            PanelError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PanelError::Unmounted => StatusCode::SERVICE_UNAVAILABLE,
        };
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

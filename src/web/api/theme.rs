use crate::models::preferences::ThemeUpdate;
use crate::web::api::AppState;
use axum::extract::State;
use axum::Json;

// Handler for reading the page-wide theme
pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeUpdate> {
    Json(ThemeUpdate {
        theme: state.theme.mode(),
    })
}

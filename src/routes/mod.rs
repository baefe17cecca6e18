use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use badge::get_badge;
use gas::{get_about, get_gas, get_popup, get_popup_stream};
use health_check::health_check;
use refresh::post_refresh;

pub mod badge;
pub mod gas;
pub mod health_check;
pub mod refresh;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/gas", get(get_gas))
        .route("/popup", get(get_popup))
        .route("/popup/stream", get(get_popup_stream))
        .route("/about", get(get_about))
        .route("/badge", get(get_badge))
        .route("/refresh", post(post_refresh))
        .route("/health_check", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

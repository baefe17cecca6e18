//! Read side of the display client: the persisted snapshot, its rendered
//! popup view, and a stream that re-renders on every storage change.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::Utc;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, instrument};

use crate::{
    background::gas_state::{GasState, GAS_STATE_KEY},
    display::popup_view::{self, AboutView, PopupView},
    errors::api_error::ApiError,
    state::AppState,
};

const POPUP_EVENT: &str = "gasData";

#[instrument(skip(state))]
pub async fn get_gas(State(state): State<AppState>) -> Result<Json<GasState>, ApiError> {
    let gas_state = state.store.load_gas_state().await?;
    gas_state.map(Json).ok_or(ApiError::NoData)
}

#[instrument(skip(state))]
pub async fn get_popup(State(state): State<AppState>) -> Result<Json<PopupView>, ApiError> {
    let gas_state = state.store.load_gas_state().await?;
    Ok(Json(popup_view::render(gas_state.as_ref(), &state.display)))
}

pub async fn get_popup_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading so no write slips between the two.
    let changes = BroadcastStream::new(state.store.subscribe());

    let current = match state.store.load_gas_state().await {
        Ok(gas_state) => gas_state,
        Err(e) => {
            error!(error = %e, "Failed to load gas state for popup stream");
            None
        }
    };
    let initial = popup_event(&popup_view::render(current.as_ref(), &state.display));

    let display = state.display.clone();
    let updates = changes.filter_map(move |change| {
        // Lagged receivers just skip to the next change.
        let change = change.ok()?;
        if change.key != GAS_STATE_KEY {
            return None;
        }
        let gas_state: GasState = serde_json::from_value(change.new_value).ok()?;
        popup_event(&popup_view::render(Some(&gas_state), &display))
    });

    let stream = tokio_stream::iter(initial).chain(updates).map(Ok::<_, Infallible>);
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn get_about() -> Json<AboutView> {
    Json(popup_view::about(Utc::now()))
}

fn popup_event(view: &PopupView) -> Option<Event> {
    Event::default().event(POPUP_EVENT).json_data(view).ok()
}

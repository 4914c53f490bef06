use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::Instrument;
use uuid::Uuid;

use vidsage_client::{GatewayError, NoopSink};
use vidsage_types::{Command, RelayEvent, Reply};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn parse_command(payload: Result<Json<Command>, JsonRejection>) -> ApiResult<Command> {
    payload
        .map(|Json(command)| command)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Run a command and answer with its reply; progress events are dropped
pub async fn dispatch_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Command>, JsonRejection>,
) -> ApiResult<Json<Reply>> {
    let command = parse_command(payload)?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("dispatch", %request_id, action = command.action());

    let reply = state
        .dispatcher
        .dispatch(command, &NoopSink)
        .instrument(span)
        .await?;

    Ok(Json(reply))
}

/// Run a command and stream its progress using Server-Sent Events
///
/// Relay events are sent as they happen, named after their `action`. The
/// stream ends with exactly one `result` or `error` event.
pub async fn dispatch_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Command>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let command = parse_command(payload)?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("dispatch_stream", %request_id, action = command.action());

    let (event_tx, event_rx) = mpsc::unbounded_channel::<RelayEvent>();
    let (result_tx, result_rx) = oneshot::channel();
    let dispatcher = state.dispatcher.clone();

    tokio::spawn(
        async move {
            let result = dispatcher.dispatch(command, &event_tx).await;
            // Closing the channel ends the relay part of the stream
            drop(event_tx);
            if result_tx.send(result).is_err() {
                tracing::debug!("Client went away before the result was ready");
            }
        }
        .instrument(span),
    );

    let relay = UnboundedReceiverStream::new(event_rx).map(relay_event);
    let outcome = stream::once(async move {
        match result_rx.await {
            Ok(result) => outcome_event(result),
            Err(_) => error_event("Internal error: dispatch task ended unexpectedly"),
        }
    });

    let events = relay.chain(outcome).map(Ok::<Event, Infallible>);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn relay_event(event: RelayEvent) -> Event {
    Event::default()
        .event(event.action())
        .json_data(&event)
        .unwrap_or_else(|e| error_event(&format!("Failed to encode event: {}", e)))
}

fn outcome_event(result: Result<Reply, GatewayError>) -> Event {
    match result {
        Ok(reply) => Event::default()
            .event("result")
            .json_data(&reply)
            .unwrap_or_else(|e| error_event(&format!("Failed to encode reply: {}", e))),
        Err(e) => error_event(&e.to_string()),
    }
}

fn error_event(message: &str) -> Event {
    Event::default()
        .event("error")
        .data(json!({ "error": message }).to_string())
}

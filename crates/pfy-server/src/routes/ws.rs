//! `GET /ws`: the live notification channel.
//!
//! The access token (query `token` or `Authorization` header) is verified
//! before the upgrade. The socket then joins exactly the room of the
//! token's user and receives every notification pushed there as a JSON
//! text frame `{ event, payload }`. Anything the client sends is ignored,
//! including legacy `join` requests naming another user.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, ORIGIN};
use axum::response::Response;
use pfy_auth::{bearer_token, verify_token};
use pfy_notify::RoomSubscription;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsParams {
    pub token: Option<String>,
}

pub async fn connect(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.config.server.origin_allowed(origin) {
        tracing::warn!(origin, "live channel origin rejected");
        return Err(ApiError::forbidden("Origin not allowed"));
    }

    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = match params.token.as_deref() {
        Some(token) => bearer_token(Some(token))?,
        None => bearer_token(header)?,
    };
    let claims = verify_token(token, state.jwt_secret())?;

    let room = state.hub.join(&claims.user_id);
    tracing::info!(user_id = %claims.user_id, "live channel connected");
    Ok(ws.on_upgrade(move |socket| session(socket, room)))
}

async fn session(mut socket: WebSocket, mut room: RoomSubscription) {
    loop {
        tokio::select! {
            pushed = room.recv() => {
                let Some(message) = pushed else { break };
                let frame = match message.to_json() {
                    Ok(frame) => frame,
                    Err(error) => {
                        tracing::warn!(%error, user_id = room.user_id(), "dropping push frame");
                        continue;
                    }
                };
                if socket.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
    tracing::info!(user_id = room.user_id(), "live channel disconnected");
}

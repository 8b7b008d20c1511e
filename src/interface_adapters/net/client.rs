use crate::domain::{KitId, PlayerInput};
use crate::interface_adapters::protocol::{
    ClientMessage, JoinPayload, MapDataDto, ServerMessage, WorldUpdateDto, sanitize_name,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_conn_id;
use crate::use_cases::{GameEvent, GameNotice, WorldHandle, WorldUpdate};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    EventsClosed,
    JoinRequired,
    JoinTimeout,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::WorldUpdate(WorldUpdateDto::from(update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize world update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Store the latest bytes for lag recovery.
                let _ = world_latest_tx.send(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_world_serializer(world: &WorldHandle) {
    tokio::spawn(world_update_serializer(
        world.world_tx.subscribe(),
        world.world_bytes_tx.clone(),
        world.world_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let world = state.world.clone();
    ws.on_upgrade(move |socket| {
        // The connection id doubles as the player id for the lifetime of the socket.
        let conn_id = next_conn_id();
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, world, conn_id).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, world: WorldHandle, conn_id: u64) {
    let mut ctx = match bootstrap_connection(&mut socket, &world, conn_id).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id);
    info!(player_id = ctx.player_id, name = %ctx.name, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub player_id: u64,
    pub name: String,
    pub input_tx: mpsc::Sender<GameEvent>,
    pub world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub world_latest_rx: watch::Receiver<Utf8Bytes>,
    pub notice_rx: broadcast::Receiver<GameNotice>,
    // Count lag recovery snapshots sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_input_full_log: Instant,
    pub last_world_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

#[derive(Debug)]
struct JoinHandshake {
    name: String,
    kit: KitId,
    bytes_in: u64,
    msgs_in: u64,
}

impl JoinHandshake {
    fn from_payload(payload: JoinPayload, bytes_in: u64, msgs_in: u64) -> Self {
        Self {
            name: sanitize_name(&payload.name),
            kit: KitId::resolve(payload.kit.as_deref()),
            bytes_in,
            msgs_in,
        }
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    world: &WorldHandle,
    player_id: u64,
) -> Result<ConnCtx, NetError> {
    // Subscribe to updates *before* doing anything else (awaits) to not miss packets.
    let world_bytes_rx = world.world_bytes_tx.subscribe();
    let world_latest_rx = world.world_latest_tx.subscribe();
    let notice_rx = world.notice_tx.subscribe();

    // The map never changes, so the client can render it while choosing a name.
    let map_msg = ServerMessage::MapData(MapDataDto::new(world.map_size, &world.obstacles));
    let map_bytes = send_message(socket, &map_msg).await?;

    let join = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let identity_msg = ServerMessage::Identity { player_id };
    let identity_bytes = send_message(socket, &identity_msg).await?;

    // Join is queued after Identity so the first update containing this player is attributable.
    world
        .input_tx
        .send(GameEvent::Join {
            player_id,
            name: join.name.clone(),
            kit: join.kit,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        name: join.name,
        input_tx: world.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        notice_rx,
        lag_recovery_count: 0,

        msgs_in: join.msgs_in,
        msgs_out: 2,
        bytes_in: join.bytes_in,
        bytes_out: (map_bytes + identity_bytes) as u64,

        invalid_json: 0,

        last_input_full_log: now,
        last_world_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<JoinHandshake, NetError> {
    let mut msgs_in = 0;
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                msgs_in += 1;
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => {
                        return Ok(JoinHandshake::from_payload(
                            payload,
                            text.len() as u64,
                            msgs_in,
                        ));
                    }
                    // Latency probes are allowed before joining.
                    Ok(ClientMessage::Ping { t }) => {
                        send_message(socket, &ServerMessage::Pong { t }).await?;
                    }
                    Ok(ClientMessage::Input(_)) | Ok(ClientMessage::Shoot) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                }
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Non-blocking forward into the world inbox; a full inbox drops the event.
fn forward_event(
    player_id: u64,
    input_tx: &mpsc::Sender<GameEvent>,
    ev: GameEvent,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match input_tx.try_send(ev) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!(player_id, "input channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        world_bytes_rx,
        world_latest_rx,
        notice_rx,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_input_full_log,
        last_world_lag_log,
        last_invalid_input_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                let mut io = IncomingCounters {
                    msgs_in: &mut *msgs_in,
                    bytes_in: &mut *bytes_in,
                    msgs_out: &mut *msgs_out,
                    bytes_out: &mut *bytes_out,
                    invalid_json: &mut *invalid_json,
                    last_input_full_log: &mut *last_input_full_log,
                    last_invalid_input_log: &mut *last_invalid_input_log,
                };
                match handle_incoming_ws(socket, incoming, player_id, input_tx, &mut io, close_frame).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            world_msg = world_bytes_rx.recv() => {
                match world_msg {
                    Ok(bytes) => match forward_world_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_world_lag_log) {
                            warn!(missed = n, "world updates lagged; sending snapshot");
                        }

                        // Resync strategy: send the latest world snapshot.
                        let latest = world_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            *lag_recovery_count += 1;
                            debug!(player_id, count = *lag_recovery_count, "sent lag recovery snapshot");
                            match forward_world_bytes(latest, socket, msgs_out, bytes_out).await {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }

            notice = notice_rx.recv() => {
                match notice {
                    Ok(notice) => match forward_notice(notice, player_id, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Notices are transient; missing a few is acceptable.
                        debug!(player_id, missed = n, "notices lagged");
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        input_tx,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *lag_recovery_count,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal {
        Err(err)
    } else {
        Ok(())
    }
}

/// Mutable per-connection counters touched while handling one inbound frame.
struct IncomingCounters<'a> {
    msgs_in: &'a mut u64,
    bytes_in: &'a mut u64,
    msgs_out: &'a mut u64,
    bytes_out: &'a mut u64,
    invalid_json: &'a mut u32,
    last_input_full_log: &'a mut Instant,
    last_invalid_input_log: &'a mut Instant,
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    player_id: u64,
    input_tx: &mpsc::Sender<GameEvent>,
    io: &mut IncomingCounters<'_>,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    let text = match incoming {
        Some(Ok(Message::Text(text))) => text,
        Some(Ok(Message::Binary(_))) => {
            *close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            return Ok(LoopControl::Disconnect);
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => return Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => return Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            return Ok(LoopControl::Disconnect);
        }
        None => {
            info!(player_id, "websocket closed");
            return Ok(LoopControl::Disconnect);
        }
    };

    *io.msgs_in += 1;
    *io.bytes_in += text.len() as u64;

    match serde_json::from_str::<ClientMessage>(&text) {
        Ok(ClientMessage::Join(payload)) => {
            // The world ignores this while the player is alive; after death it respawns them.
            let join = JoinHandshake::from_payload(payload, 0, 0);
            input_tx
                .send(GameEvent::Join {
                    player_id,
                    name: join.name,
                    kit: join.kit,
                })
                .await
                .map_err(|_| NetError::InputClosed)?;
            Ok(LoopControl::Continue)
        }
        Ok(ClientMessage::Input(dto)) => {
            if !dto.angle.is_finite() {
                if should_log(io.last_invalid_input_log) {
                    warn!(player_id, "invalid input angle (NaN/inf); dropping");
                }
                return Ok(LoopControl::Continue);
            }
            let ev = GameEvent::Input {
                player_id,
                input: PlayerInput::from(&dto),
                angle: dto.angle,
            };
            forward_event(player_id, input_tx, ev, io.last_input_full_log)
        }
        Ok(ClientMessage::Shoot) => forward_event(
            player_id,
            input_tx,
            GameEvent::Shoot { player_id },
            io.last_input_full_log,
        ),
        Ok(ClientMessage::Ping { t }) => {
            let bytes = send_message(socket, &ServerMessage::Pong { t }).await?;
            *io.msgs_out += 1;
            *io.bytes_out += bytes as u64;
            Ok(LoopControl::Continue)
        }
        Err(parse_err) => {
            *io.invalid_json += 1;
            if should_log(io.last_invalid_input_log) {
                warn!(
                    player_id,
                    bytes = text.len(),
                    error = %parse_err,
                    "failed to parse client message"
                );
            }

            if *io.invalid_json > MAX_INVALID_JSON {
                *close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "too many invalid messages".into(),
                });
                return Ok(LoopControl::Disconnect);
            }

            Ok(LoopControl::Continue)
        }
    }
}

async fn forward_world_bytes(
    world_msg: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = world_msg.len();
    match socket
        .send(Message::Text(world_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

/// Returns true if this connection should receive the notice.
fn notice_is_for(notice: &GameNotice, player_id: u64) -> bool {
    match notice {
        GameNotice::YouDied {
            player_id: victim, ..
        } => *victim == player_id,
        GameNotice::Hit { .. } | GameNotice::KillFeed { .. } => true,
    }
}

async fn forward_notice(
    notice: GameNotice,
    player_id: u64,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    if !notice_is_for(&notice, player_id) {
        return LoopControl::Continue;
    }
    match send_message(socket, &ServerMessage::from(notice)).await {
        Ok(bytes) => {
            *msgs_out += 1;
            *bytes_out += bytes as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send notice");
            LoopControl::Disconnect
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    player_id: u64,
    input_tx: &mpsc::Sender<GameEvent>,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,
) -> Result<(), NetError> {
    input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        player_id,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        lag_recovery_count,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeathCause;

    #[test]
    fn when_death_notice_targets_another_player_then_it_is_filtered() {
        let died = GameNotice::YouDied {
            player_id: 4,
            killer: "k".into(),
            cause: DeathCause::Bullet,
        };
        assert!(notice_is_for(&died, 4));
        assert!(!notice_is_for(&died, 5));

        let feed = GameNotice::KillFeed {
            killer: "k".into(),
            victim: "v".into(),
        };
        assert!(notice_is_for(&feed, 5));
        assert!(notice_is_for(&GameNotice::Hit { x: 1.0, y: 2.0 }, 5));
    }

    #[test]
    fn when_join_payload_has_unknown_kit_then_default_kit_is_used() {
        let join = JoinHandshake::from_payload(
            JoinPayload {
                name: "  Zed ".into(),
                kit: Some("laser".into()),
            },
            10,
            1,
        );
        assert_eq!(join.name, "Zed");
        assert_eq!(join.kit, KitId::DEFAULT);
    }

    #[tokio::test]
    async fn when_inbox_is_full_then_event_is_dropped_not_fatal() {
        let (tx, _rx) = mpsc::channel(1);
        let mut last = Instant::now() - LOG_THROTTLE;
        assert!(matches!(
            forward_event(1, &tx, GameEvent::Shoot { player_id: 1 }, &mut last),
            Ok(LoopControl::Continue)
        ));
        assert!(matches!(
            forward_event(1, &tx, GameEvent::Shoot { player_id: 1 }, &mut last),
            Ok(LoopControl::Continue)
        ));
    }

    #[tokio::test]
    async fn when_world_is_gone_then_forwarding_fails() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut last = Instant::now();
        assert!(matches!(
            forward_event(1, &tx, GameEvent::Shoot { player_id: 1 }, &mut last),
            Err(NetError::InputClosed)
        ));
    }
}

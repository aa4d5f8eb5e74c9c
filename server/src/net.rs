// Per-connection plumbing: a reader loop decoding newline-delimited
// records and a writer task draining this session's outbound queue.
// Handlers hold no shared state beyond their own (room, session) identity.

use std::net::SocketAddr;
use std::sync::Arc;

use protocol::{decode_line, Message};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::rooms::{RoomRegistry, SessionId};

pub async fn handle_connection(registry: Arc<RoomRegistry>, stream: TcpStream, peer: SocketAddr) {
    let span = info_span!("conn", %peer);
    serve_connection(registry, stream).instrument(span).await;
}

async fn serve_connection(registry: Arc<RoomRegistry>, stream: TcpStream) {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Writer task: the only place this socket is written, so a slow or
    // dead peer never stalls the registry lock or other sessions.
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                debug!(error = %e, "write failed, dropping outbound queue");
                break;
            }
        }
    });

    info!("client connected");

    // Identity of this connection once it has joined a room.
    let mut session: Option<(String, SessionId)> = None;

    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let msg = match decode_line(&line) {
                    Ok(msg) => msg,
                    Err(e) => {
                        // Drop the malformed record, keep the connection.
                        debug!(error = %e, "malformed record dropped");
                        continue;
                    }
                };
                if !dispatch(&registry, &tx, &mut session, msg) {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "read failed");
                break;
            }
        }
    }

    // Disconnect, explicit leave, or read error all take the same path.
    if let Some((room, session_id)) = session.take() {
        registry.leave(&room, &session_id);
    }
    write_task.abort();
    info!("client disconnected");
}

/// Applies one inbound message. Returns false when the connection should
/// close (explicit `leave`).
fn dispatch(
    registry: &Arc<RoomRegistry>,
    tx: &mpsc::UnboundedSender<String>,
    session: &mut Option<(String, SessionId)>,
    msg: Message,
) -> bool {
    match msg {
        Message::Join { room, name, ch } => {
            // Joining while already in a room implies leaving the old one.
            if let Some((old_room, old_id)) = session.take() {
                registry.leave(&old_room, &old_id);
            }
            let session_id = registry.join(&room, &name, &ch, tx.clone());
            *session = Some((room, session_id));
        }
        Message::Ready { ready } => {
            if let Some((room, session_id)) = session.as_ref() {
                registry.set_ready(room, session_id, ready);
            }
        }
        msg @ (Message::State { .. } | Message::Attack { .. } | Message::Respawn { .. }) => {
            if let Some((room, session_id)) = session.as_ref() {
                registry.relay(room, session_id, msg);
            }
        }
        Message::Leave => {
            if let Some((room, session_id)) = session.take() {
                registry.leave(&room, &session_id);
            }
            return false;
        }
        // Server-originated or unrecognized types: ignored, forward
        // compatible.
        _ => {}
    }
    true
}

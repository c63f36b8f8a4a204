//! Push channel: a Socket.IO client over the Engine.IO v4 websocket transport.
//!
//! Only the text packets the dashboard needs are spoken:
//!
//! - `0{...}` open, answered with `40` (connect to the default namespace)
//! - `40{...}` namespace connected, `44{...}` refused
//! - `2` ping from the server, answered with `3`
//! - `42["event", {...}]` events in both directions
//! - `1` / `41` close
//!
//! `connect` finishes the handshake before returning, so a server that does
//! not speak Socket.IO fails there and the dashboard keeps polling.  After
//! that a reader task forwards events and answers pings, and a writer task
//! owns the socket's sending half.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use botdash_proto::protocol::{PushEvent, RoomRequest};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const NAMESPACE_CONNECT: &str = "40";
const EVENT_PREFIX: &str = "42";

#[derive(Debug)]
pub enum PushMessage {
    Event(PushEvent),
    Closed,
}

/// One decoded Engine.IO text frame.
#[derive(Debug, PartialEq)]
pub enum Frame {
    Open,
    /// Server ping; the payload is echoed back in the pong.
    Ping(String),
    Connected,
    ConnectError(String),
    Event(PushEvent),
    Closed,
    Ignored,
}

fn pong(payload: &str) -> String {
    format!("3{}", payload)
}

/// Sending half of an open push channel.
#[derive(Debug, Clone)]
pub struct PushHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl PushHandle {
    /// Queue a room request.  False once the socket has gone away.
    pub fn emit(&self, request: RoomRequest) -> bool {
        match encode_room(&request) {
            Some(text) => self.tx.send(text).is_ok(),
            None => {
                warn!("failed to encode room request {:?}", request);
                false
            }
        }
    }
}

/// Decode one Engine.IO text frame.
pub fn decode_frame(text: &str) -> Frame {
    // Packet types are single ASCII digits, so slicing past them is safe.
    match text.as_bytes().first() {
        Some(b'0') => Frame::Open,
        Some(b'1') => Frame::Closed,
        Some(b'2') => Frame::Ping(text[1..].to_string()),
        Some(b'4') => decode_packet(&text[1..]),
        _ => Frame::Ignored,
    }
}

/// Socket.IO packet carried in an Engine.IO message.
fn decode_packet(packet: &str) -> Frame {
    match packet.as_bytes().first() {
        Some(b'0') => Frame::Connected,
        Some(b'1') => Frame::Closed,
        Some(b'2') => decode_event(&packet[1..]),
        Some(b'4') => Frame::ConnectError(packet[1..].to_string()),
        _ => Frame::Ignored,
    }
}

/// `["name", data]`, possibly preceded by a namespace or an ack id.
fn decode_event(body: &str) -> Frame {
    let Some(start) = body.find('[') else {
        return Frame::Ignored;
    };
    let mut args: Vec<Value> = match serde_json::from_str(&body[start..]) {
        Ok(args) => args,
        Err(e) => {
            debug!("ignoring push packet ({}): {}", e, body);
            return Frame::Ignored;
        }
    };
    if args.is_empty() {
        return Frame::Ignored;
    }
    let data = if args.len() > 1 { args.swap_remove(1) } else { Value::Null };
    let name = args.swap_remove(0);
    match serde_json::from_value::<PushEvent>(json!({ "event": &name, "data": data })) {
        Ok(event) => Frame::Event(event),
        Err(e) => {
            debug!("ignoring push event {} ({})", name, e);
            Frame::Ignored
        }
    }
}

/// `42["join_room",{"guild_id":...}]`
pub fn encode_room(request: &RoomRequest) -> Option<String> {
    let mut value = serde_json::to_value(request).ok()?;
    let event = value.get_mut("event").map(Value::take)?;
    let data = value.get_mut("data").map(Value::take).unwrap_or_default();
    Some(format!("{}{}", EVENT_PREFIX, Value::Array(vec![event, data])))
}

async fn handshake(ws: &mut Socket) -> anyhow::Result<()> {
    loop {
        let text = match ws.next().await {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => {
                anyhow::bail!("socket closed during handshake")
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        };
        match decode_frame(&text) {
            Frame::Open => ws.send(Message::Text(NAMESPACE_CONNECT.to_string())).await?,
            Frame::Ping(payload) => ws.send(Message::Text(pong(&payload))).await?,
            Frame::Connected => return Ok(()),
            Frame::ConnectError(reason) => anyhow::bail!("namespace refused: {}", reason),
            Frame::Closed => anyhow::bail!("server closed during handshake"),
            Frame::Event(_) | Frame::Ignored => {}
        }
    }
}

pub async fn connect(url: &str) -> anyhow::Result<(PushHandle, mpsc::Receiver<PushMessage>)> {
    let (mut ws, _) = connect_async(url).await?;
    timeout(HANDSHAKE_TIMEOUT, handshake(&mut ws))
        .await
        .map_err(|_| anyhow::anyhow!("socket.io handshake timed out"))??;
    info!("push channel connected: {}", url);
    let (mut sink, mut stream) = ws.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (event_tx, event_rx) = mpsc::channel::<PushMessage>(256);

    tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let pong_tx = out_tx.clone();
    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    warn!("push channel read error: {}", e);
                    break;
                }
            };
            match decode_frame(&text) {
                Frame::Ping(payload) => {
                    if pong_tx.send(pong(&payload)).is_err() {
                        break;
                    }
                }
                Frame::Event(event) => {
                    if event_tx.send(PushMessage::Event(event)).await.is_err() {
                        return;
                    }
                }
                Frame::Closed => break,
                Frame::ConnectError(reason) => {
                    warn!("push namespace refused: {}", reason);
                    break;
                }
                Frame::Open | Frame::Connected | Frame::Ignored => {}
            }
        }
        info!("push channel closed");
        let _ = event_tx.send(PushMessage::Closed).await;
    });

    Ok((PushHandle { tx: out_tx }, event_rx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn engine_io_control_frames() {
        assert_eq!(
            decode_frame(r#"0{"sid":"a1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#),
            Frame::Open
        );
        assert_eq!(decode_frame("2"), Frame::Ping(String::new()));
        assert_eq!(decode_frame("2probe"), Frame::Ping("probe".into()));
        assert_eq!(decode_frame(r#"40{"sid":"b2"}"#), Frame::Connected);
        assert_eq!(
            decode_frame(r#"44{"message":"Unauthorized"}"#),
            Frame::ConnectError(r#"{"message":"Unauthorized"}"#.into())
        );
        assert_eq!(decode_frame("41"), Frame::Closed);
        assert_eq!(decode_frame("1"), Frame::Closed);
        assert_eq!(decode_frame("6"), Frame::Ignored);
        assert_eq!(decode_frame(""), Frame::Ignored);
    }

    #[test]
    fn socket_io_events_decode() {
        let frame = decode_frame(
            r#"42["playlist_update",{"guild_id":"g1","playlist":[{"name":"a","playing":true}]}]"#,
        );
        match frame {
            Frame::Event(PushEvent::PlaylistUpdate { guild_id, playlist }) => {
                assert_eq!(guild_id, "g1");
                assert_eq!(playlist.len(), 1);
            }
            other => panic!("unexpected frame {:?}", other),
        }

        let frame = decode_frame(
            r#"42["player_status",{"guild_id":"g2","playing":true,"song_name":"s","artist_name":"a","position":12}]"#,
        );
        assert!(matches!(
            frame,
            Frame::Event(PushEvent::PlayerStatus(s)) if s.guild_id == "g2" && s.position == Some(12.0)
        ));

        // Ack ids sit between the packet type and the payload.
        let frame = decode_frame(r#"4217["player_status",{"guild_id":"g3"}]"#);
        assert!(matches!(frame, Frame::Event(e) if e.guild_id() == "g3"));
    }

    #[test]
    fn unknown_and_broken_events_are_ignored() {
        assert_eq!(decode_frame(r#"42["status",{"message":"connected"}]"#), Frame::Ignored);
        assert_eq!(decode_frame("42[]"), Frame::Ignored);
        assert_eq!(decode_frame("42not json"), Frame::Ignored);
        assert_eq!(decode_frame(r#"42["playlist_update"]"#), Frame::Ignored);
    }

    #[test]
    fn room_requests_encode_as_event_packets() {
        assert_eq!(
            encode_room(&RoomRequest::JoinRoom {
                guild_id: "g1".into()
            })
            .as_deref(),
            Some(r#"42["join_room",{"guild_id":"g1"}]"#)
        );
        assert_eq!(
            encode_room(&RoomRequest::LeaveRoom {
                guild_id: "g1".into()
            })
            .as_deref(),
            Some(r#"42["leave_room",{"guild_id":"g1"}]"#)
        );
    }

    #[test]
    fn emit_fails_after_the_writer_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = PushHandle { tx };
        assert!(handle.emit(RoomRequest::JoinRoom {
            guild_id: "g".into()
        }));
        drop(rx);
        assert!(!handle.emit(RoomRequest::LeaveRoom {
            guild_id: "g".into()
        }));
    }

    async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(_)) => continue,
                other => panic!("socket ended early: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn handshake_pings_events_and_rooms_against_a_socket_io_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let mut seen = Vec::new();
            ws.send(Message::Text(
                r#"0{"sid":"a1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#
                    .to_string(),
            ))
            .await
            .unwrap();
            seen.push(next_text(&mut ws).await);
            ws.send(Message::Text(r#"40{"sid":"b2"}"#.to_string()))
                .await
                .unwrap();
            ws.send(Message::Text("2".to_string())).await.unwrap();
            seen.push(next_text(&mut ws).await);
            ws.send(Message::Text(
                r#"42["player_status",{"guild_id":"g1","playing":false}]"#.to_string(),
            ))
            .await
            .unwrap();
            seen.push(next_text(&mut ws).await);
            seen
        });

        let url = format!("ws://{}/socket.io/?EIO=4&transport=websocket", addr);
        let (handle, mut events) = connect(&url).await.unwrap();
        match events.recv().await {
            Some(PushMessage::Event(PushEvent::PlayerStatus(status))) => {
                assert_eq!(status.guild_id, "g1");
                assert!(!status.playing);
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert!(handle.emit(RoomRequest::JoinRoom {
            guild_id: "g1".into()
        }));

        let seen = server.await.unwrap();
        assert_eq!(seen, vec!["40", "3", r#"42["join_room",{"guild_id":"g1"}]"#]);
    }

    #[tokio::test]
    async fn plain_websocket_server_fails_the_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text(r#"{"event":"hello"}"#.to_string()))
                .await
                .unwrap();
            let _ = ws.close(None).await;
        });

        let url = format!("ws://{}/socket.io/?EIO=4&transport=websocket", addr);
        assert!(connect(&url).await.is_err());
    }
}

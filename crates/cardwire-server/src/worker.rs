//! Per-connection worker: handshake phase, then the play loop.
//!
//! Workers run synchronously per spec: read -> engine step -> write. There
//! is no in-process connection multiplexing; each accepted socket gets its
//! own task (see `lib.rs`), and the session store is the only state shared
//! across them.

use std::{sync::Arc, time::Duration};

use bytes::BytesMut;
use cardwire_core::{Environment, Hand, MatchState, Side, engine, opponent};
use cardwire_proto::{
    Frame, FrameHeader, Payload, ProtocolError,
    payloads::{ErrorPayload, LoginResp, ResumeResp},
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{counters::Counters, snapshot, store::SessionStore};

/// Idle read timeout for a server-side connection, per spec default.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A framing-level failure: fatal to the connection, session preserved.
#[derive(Debug)]
pub struct ConnectionClosed;

/// Reads one frame from `stream`, enforcing the idle read timeout.
///
/// Framing errors (truncation, checksum mismatch, oversized length) and
/// timeouts are both fatal to the connection per spec; the caller should
/// simply drop the connection and let the session persist for resumption.
async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Frame, ConnectionClosed> {
    let mut header_buf = [0u8; FrameHeader::SIZE];
    tokio::time::timeout(READ_TIMEOUT, stream.read_exact(&mut header_buf)).await.map_err(|_| ConnectionClosed)?.map_err(|_| ConnectionClosed)?;

    let header = *FrameHeader::from_bytes(&header_buf).map_err(|_| ConnectionClosed)?;
    let payload_len = header.payload_len() as usize;

    let mut body = BytesMut::with_capacity(FrameHeader::SIZE + payload_len);
    body.extend_from_slice(&header_buf);
    body.resize(FrameHeader::SIZE + payload_len, 0);

    if payload_len > 0 {
        tokio::time::timeout(READ_TIMEOUT, stream.read_exact(&mut body[FrameHeader::SIZE..]))
            .await
            .map_err(|_| ConnectionClosed)?
            .map_err(|_| ConnectionClosed)?;
    }

    Frame::decode(&body).map_err(|_: ProtocolError| ConnectionClosed)
}

async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, payload: Payload) -> Result<(), ConnectionClosed> {
    let frame = payload.into_frame();
    let mut wire = Vec::new();
    frame.encode(&mut wire).map_err(|_| ConnectionClosed)?;
    stream.write_all(&wire).await.map_err(|_| ConnectionClosed)?;
    Ok(())
}

async fn write_snapshot<S: AsyncWrite + Unpin>(
    stream: &mut S,
    state: &MatchState,
    hand: &Hand,
) -> Result<(), ConnectionClosed> {
    write_frame(stream, Payload::State(snapshot::state_payload(state))).await?;
    write_frame(stream, Payload::Hand(snapshot::hand_payload(hand))).await
}

/// Completes the opponent's turn if it currently holds the turn: plays its
/// hand, then advances END -> next DRAW/MAIN if the match continues.
///
/// Idempotent when called on a state where it is not the opponent's turn,
/// or the match is already over — both are no-ops.
fn advance_opponent_turn(state: &mut MatchState, hand: &mut Hand, env: &impl Environment) {
    if state.game_over || state.turn != Side::Opponent {
        return;
    }
    opponent::run_opponent_turn(state, hand);
    if !state.game_over {
        engine::end_phase(state, hand, env);
    }
}

/// Runs the handshake phase: reads frames until a `LOGIN_REQ` or a
/// successful `RESUME_REQ`, answering `PING` inline and discarding anything
/// else. Returns the session id the play phase should operate on.
async fn run_handshake<S, E>(
    stream: &mut S,
    store: &SessionStore,
    env: &E,
) -> Result<u64, ConnectionClosed>
where
    S: AsyncRead + AsyncWrite + Unpin,
    E: Environment,
{
    loop {
        let frame = read_frame(stream).await?;
        let Ok(payload) = Payload::from_frame(&frame) else {
            continue;
        };

        match payload {
            Payload::Ping => write_frame(stream, Payload::Pong).await?,
            Payload::LoginReq => {
                let Some(session_id) = store.allocate(env) else {
                    write_frame(stream, Payload::Error(ErrorPayload::store_full())).await?;
                    return Err(ConnectionClosed);
                };

                let (mut state, mut hand) = store.load(session_id, env).expect("slot just allocated");
                engine::enter_turn(&mut state, &mut hand, env, Side::Player);
                store.save(session_id, state, hand, env).map_err(|_| ConnectionClosed)?;

                write_frame(stream, Payload::LoginResp(LoginResp::new(true))).await?;
                write_frame(stream, Payload::ResumeResp(ResumeResp::accepted(session_id))).await?;
                write_snapshot(stream, &state, &hand).await?;
                return Ok(session_id);
            },
            Payload::ResumeReq(req) => {
                let session_id = req.session_id();
                match store.load(session_id, env) {
                    Some((state, hand)) => {
                        write_frame(stream, Payload::ResumeResp(ResumeResp::accepted(session_id))).await?;
                        write_snapshot(stream, &state, &hand).await?;
                        return Ok(session_id);
                    },
                    None => {
                        write_frame(stream, Payload::ResumeResp(ResumeResp::rejected())).await?;
                    },
                }
            },
            _ => {},
        }
    }
}

/// Runs the play phase loop until the connection closes.
async fn run_play_phase<S, E>(
    stream: &mut S,
    session_id: u64,
    store: &SessionStore,
    counters: &Counters,
    env: &E,
) -> Result<(), ConnectionClosed>
where
    S: AsyncRead + AsyncWrite + Unpin,
    E: Environment,
{
    loop {
        let (mut state, mut hand) = store.load(session_id, env).ok_or(ConnectionClosed)?;

        if state.turn == Side::Opponent && !state.game_over {
            advance_opponent_turn(&mut state, &mut hand, env);
            store.save(session_id, state, hand, env).map_err(|_| ConnectionClosed)?;
        }

        let frame = read_frame(stream).await?;
        counters.record_packet();
        store.touch(session_id, env);

        let decoded = Payload::from_frame(&frame);

        // PING is answered unconditionally, even once the match is over.
        if let Ok(Payload::Ping) = decoded {
            write_frame(stream, Payload::Pong).await?;
            continue;
        }

        if state.game_over {
            write_snapshot(stream, &state, &hand).await?;
            continue;
        }

        match decoded {
            Ok(Payload::Ping) => write_frame(stream, Payload::Pong).await?,
            Ok(Payload::LoginReq | Payload::ResumeReq(_)) => continue,
            Ok(Payload::PlayCard(play)) => {
                let result = engine::play_card(&mut state, &mut hand, Side::Player, play.hand_idx() as usize);
                if let Err(err) = result {
                    write_frame(stream, Payload::Error(ErrorPayload::new(err.code(), &err.to_string()))).await?;
                }
                store.save(session_id, state, hand, env).map_err(|_| ConnectionClosed)?;
                write_snapshot(stream, &state, &hand).await?;
            },
            Ok(Payload::EndTurn) => {
                if state.turn != Side::Player {
                    write_frame(stream, Payload::Error(ErrorPayload::not_your_turn())).await?;
                    write_snapshot(stream, &state, &hand).await?;
                    continue;
                }
                engine::end_phase(&mut state, &mut hand, env);
                advance_opponent_turn(&mut state, &mut hand, env);
                store.save(session_id, state, hand, env).map_err(|_| ConnectionClosed)?;
                write_snapshot(stream, &state, &hand).await?;
            },
            Ok(Payload::LoginResp(_) | Payload::Pong | Payload::ResumeResp(_) | Payload::State(_) | Payload::Hand(_) | Payload::Error(_)) => {
                write_frame(stream, Payload::Error(ErrorPayload::unknown_opcode())).await?;
            },
            Err(ProtocolError::UnknownOpcode(_)) => {
                write_frame(stream, Payload::Error(ErrorPayload::unknown_opcode())).await?;
            },
            Err(ProtocolError::PayloadSizeMismatch { .. }) => {
                write_frame(stream, Payload::Error(ErrorPayload::bad_payload())).await?;
            },
            Err(_) => return Err(ConnectionClosed),
        }
    }
}

/// Drives one accepted connection end to end: handshake, then play loop.
///
/// Any I/O or framing failure simply ends the task; the session persists
/// in the store for a later `RESUME_REQ`.
pub async fn run_connection<S, E>(mut stream: S, store: Arc<SessionStore>, counters: Arc<Counters>, env: E)
where
    S: AsyncRead + AsyncWrite + Unpin,
    E: Environment,
{
    counters.record_connection();

    let Ok(session_id) = run_handshake(&mut stream, &store, &env).await else {
        return;
    };

    let _ = run_play_phase(&mut stream, session_id, &store, &counters, &env).await;
}

#[cfg(test)]
mod tests {
    use cardwire_core::env::test_util::TestEnv;
    use tokio::io::duplex;

    use super::*;

    async fn send(client: &mut (impl AsyncRead + AsyncWrite + Unpin), payload: Payload) {
        let mut wire = Vec::new();
        payload.into_frame().encode(&mut wire).expect("should encode");
        client.write_all(&wire).await.expect("should write");
    }

    async fn recv(client: &mut (impl AsyncRead + AsyncWrite + Unpin)) -> Payload {
        let mut header_buf = [0u8; FrameHeader::SIZE];
        client.read_exact(&mut header_buf).await.expect("should read header");
        let header = *FrameHeader::from_bytes(&header_buf).expect("should parse header");
        let mut body = vec![0u8; FrameHeader::SIZE + header.payload_len() as usize];
        body[..FrameHeader::SIZE].copy_from_slice(&header_buf);
        client.read_exact(&mut body[FrameHeader::SIZE..]).await.expect("should read payload");

        let frame = Frame::decode(&body).expect("should decode");
        Payload::from_frame(&frame).expect("should parse payload")
    }

    #[tokio::test]
    async fn login_then_play_card_returns_updated_state() {
        let (mut client, server) = duplex(8192);
        let store = Arc::new(SessionStore::new());
        let counters = Arc::new(Counters::new());
        let env = TestEnv::new(42);

        let handle = tokio::spawn(run_connection(server, Arc::clone(&store), Arc::clone(&counters), env));

        send(&mut client, Payload::LoginReq).await;
        assert_eq!(recv(&mut client).await, Payload::LoginResp(LoginResp::new(true)));
        let Payload::ResumeResp(resume) = recv(&mut client).await else { panic!("expected RESUME_RESP") };
        assert!(resume.ok());
        let Payload::State(_) = recv(&mut client).await else { panic!("expected STATE") };
        let Payload::Hand(initial_hand) = recv(&mut client).await else { panic!("expected HAND") };

        let slot = (0..8u8).find(|&i| initial_hand.card_ids()[i as usize] != 0).expect("hand should not be empty");
        send(&mut client, Payload::PlayCard(cardwire_proto::payloads::PlayCard::new(slot))).await;

        let reply = recv(&mut client).await;
        assert!(matches!(reply, Payload::State(_)) || matches!(reply, Payload::Error(_)));

        assert_eq!(counters.connections(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn ping_is_answered_even_after_game_over() {
        let (mut client, server) = duplex(8192);
        let store = Arc::new(SessionStore::new());
        let counters = Arc::new(Counters::new());
        let env = TestEnv::new(99);

        let handle = tokio::spawn(run_connection(server, Arc::clone(&store), Arc::clone(&counters), env.clone()));

        send(&mut client, Payload::LoginReq).await;
        assert_eq!(recv(&mut client).await, Payload::LoginResp(LoginResp::new(true)));
        let Payload::ResumeResp(resume) = recv(&mut client).await else { panic!("expected RESUME_RESP") };
        let session_id = resume.session_id();
        let Payload::State(_) = recv(&mut client).await else { panic!("expected STATE") };
        let Payload::Hand(_) = recv(&mut client).await else { panic!("expected HAND") };

        let (mut state, hand) = store.load(session_id, &env).expect("session should exist");
        state.game_over = true;
        store.save(session_id, state, hand, &env).expect("should save");

        send(&mut client, Payload::Ping).await;
        assert_eq!(recv(&mut client).await, Payload::Pong, "PING must be answered even once the match is frozen");

        handle.abort();
    }

    #[tokio::test]
    async fn unknown_session_resume_is_rejected_and_handshake_continues() {
        let (mut client, server) = duplex(8192);
        let store = Arc::new(SessionStore::new());
        let counters = Arc::new(Counters::new());
        let env = TestEnv::new(7);

        let handle = tokio::spawn(run_connection(server, Arc::clone(&store), Arc::clone(&counters), env));

        send(&mut client, Payload::ResumeReq(cardwire_proto::payloads::ResumeReq::new(0xDEAD_BEEF))).await;
        let Payload::ResumeResp(resp) = recv(&mut client).await else { panic!("expected RESUME_RESP") };
        assert!(!resp.ok());

        send(&mut client, Payload::LoginReq).await;
        assert_eq!(recv(&mut client).await, Payload::LoginResp(LoginResp::new(true)));

        handle.abort();
    }
}

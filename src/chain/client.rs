//! Node client - blocking line-protocol connection to the ledger node
//!
//! A reader thread turns incoming lines into `NodeEvent`s on a channel;
//! request waits poll that channel under a deadline and pair replies with
//! requests by sequence number. The connect sequence records its status
//! transitions in order, for the status line and for tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::protocol::{
    create_game_end, create_game_start, create_hello, create_leaderboard_request,
    create_submit_score, AckFrame, AckStatus, ErrorFrame, LeaderboardFrame, WelcomeFrame,
};
use super::{
    tokens_for_score, ConnectionStatus, LeaderRow, LedgerError, ScoreLedger, SubmitReceipt,
};
use crate::types::LEADERBOARD_LIMIT;

pub const DEFAULT_NODE_PORT: u16 = 9710;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_NODE_PORT,
        }
    }
}

impl std::str::FromStr for NodeConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("expected HOST:PORT, got '{}'", s))?;
        if host.is_empty() {
            return Err(format!("missing host in '{}'", s));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("invalid port '{}'", port))?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One parsed line from the node
#[derive(Debug, Clone)]
pub enum NodeEvent {
    Welcome(WelcomeFrame),
    Ack(AckFrame),
    Leaderboard(LeaderboardFrame),
    /// Error frame reported by the node itself
    Fault(ErrorFrame),
    /// Local read or parse failure
    ReadError(String),
    Closed,
}

/// Live connection to a ledger node
#[derive(Debug)]
pub struct NodeLedger {
    config: NodeConfig,
    stream: TcpStream,
    events: mpsc::Receiver<NodeEvent>,
    seq: u64,
    status: ConnectionStatus,
    trace: Vec<ConnectionStatus>,
    player_id: String,
    chain_id: String,
    balance: u64,
}

impl NodeLedger {
    /// Connect, handshake, and claim the player's chain. Blocks for at
    /// most the handshake timeout.
    pub fn connect(config: NodeConfig, player_id: &str) -> Result<Self, LedgerError> {
        let mut trace = vec![ConnectionStatus::Connecting];

        let mut stream = TcpStream::connect((config.host.as_str(), config.port))?;
        stream.set_nodelay(true)?;
        trace.push(ConnectionStatus::Handshaking);

        let hello = create_hello(1, "chain-crush", player_id);
        let line = serde_json::to_string(&hello)?;
        stream.write_all(line.as_bytes())?;
        stream.write_all(b"\n")?;
        stream.flush()?;

        let reader = stream.try_clone()?;
        let (tx, rx) = mpsc::channel::<NodeEvent>();
        thread::spawn(move || {
            let reader = BufReader::new(reader);
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        let _ = tx.send(NodeEvent::ReadError(format!("node: read error: {}", e)));
                        let _ = tx.send(NodeEvent::Closed);
                        return;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(event) = parse_node_line(&line) {
                    let _ = tx.send(event);
                }
            }
            let _ = tx.send(NodeEvent::Closed);
        });

        trace.push(ConnectionStatus::ClaimingChain);
        let welcome = wait_for_welcome(&rx, HANDSHAKE_TIMEOUT)?;
        trace.push(ConnectionStatus::Ready);

        Ok(Self {
            config,
            stream,
            events: rx,
            seq: 1,
            status: ConnectionStatus::Ready,
            trace,
            player_id: player_id.to_string(),
            chain_id: welcome.chain_id,
            balance: welcome.balance,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// The lifecycle statuses seen so far, in order
    pub fn status_trace(&self) -> &[ConnectionStatus] {
        &self.trace
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn send_line<T: Serialize>(&mut self, frame: &T) -> Result<(), LedgerError> {
        let line = serde_json::to_string(frame)?;
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        Ok(())
    }

    /// Wait for the reply carrying `seq`, skipping stale frames
    fn await_reply(&mut self, seq: u64, what: &'static str) -> Result<NodeEvent, LedgerError> {
        let deadline = Instant::now() + REQUEST_TIMEOUT;
        while Instant::now() < deadline {
            match self.events.recv_timeout(POLL_INTERVAL) {
                Ok(NodeEvent::Ack(ack)) if ack.seq == seq => return Ok(NodeEvent::Ack(ack)),
                Ok(NodeEvent::Leaderboard(frame)) if frame.seq == seq => {
                    return Ok(NodeEvent::Leaderboard(frame));
                }
                Ok(NodeEvent::Fault(fault)) if fault.seq == seq => {
                    return Err(LedgerError::Rejected {
                        what,
                        message: fault.message,
                    });
                }
                Ok(NodeEvent::Closed) => return Err(LedgerError::Closed),
                Ok(_) => {}
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(LedgerError::Closed),
            }
        }
        Err(LedgerError::Timeout(what))
    }

    fn mark_error(&mut self, err: &LedgerError) {
        self.status = ConnectionStatus::Error(err.to_string());
        self.trace.push(self.status.clone());
    }
}

impl ScoreLedger for NodeLedger {
    fn status(&self) -> ConnectionStatus {
        self.status.clone()
    }

    fn game_started(&mut self) {
        let seq = self.next_seq();
        let frame = create_game_start(seq, &self.player_id);
        let outcome = self
            .send_line(&frame)
            .and_then(|_| self.await_reply(seq, "game_start"));
        if let Err(err) = outcome {
            self.mark_error(&err);
        }
    }

    fn game_ended(&mut self, score: u32) {
        let seq = self.next_seq();
        let frame = create_game_end(seq, &self.player_id, score);
        let outcome = self
            .send_line(&frame)
            .and_then(|_| self.await_reply(seq, "game_end"));
        if let Err(err) = outcome {
            self.mark_error(&err);
        }
    }

    fn submit_score(
        &mut self,
        score: u32,
        time_secs: u32,
        moves: u32,
    ) -> Result<SubmitReceipt, LedgerError> {
        let tokens = tokens_for_score(score);
        if tokens == 0 {
            // Nothing to transfer; acknowledged without touching the node.
            return Ok(SubmitReceipt {
                tokens: 0,
                balance: Some(self.balance),
                local: true,
            });
        }

        let seq = self.next_seq();
        let frame = create_submit_score(seq, &self.player_id, score, time_secs, moves);
        self.send_line(&frame)?;
        match self.await_reply(seq, "submit_score") {
            Ok(NodeEvent::Ack(ack)) => {
                if ack.status == AckStatus::Rejected {
                    let err = LedgerError::Rejected {
                        what: "submit_score",
                        message: "node declined the transfer".to_string(),
                    };
                    self.mark_error(&err);
                    return Err(err);
                }
                match ack.balance {
                    Some(balance) => self.balance = balance,
                    None => self.balance += tokens as u64,
                }
                Ok(SubmitReceipt {
                    tokens,
                    balance: Some(self.balance),
                    local: false,
                })
            }
            Ok(_) => Err(LedgerError::Protocol(
                "unexpected reply to submit_score".to_string(),
            )),
            Err(err) => {
                self.mark_error(&err);
                Err(err)
            }
        }
    }

    fn leaderboard(&mut self) -> Result<Vec<LeaderRow>, LedgerError> {
        let seq = self.next_seq();
        let frame = create_leaderboard_request(seq, LEADERBOARD_LIMIT);
        self.send_line(&frame)?;
        match self.await_reply(seq, "leaderboard") {
            Ok(NodeEvent::Leaderboard(frame)) => Ok(frame.rows),
            Ok(_) => Err(LedgerError::Protocol(
                "unexpected reply to leaderboard".to_string(),
            )),
            Err(err) => {
                self.mark_error(&err);
                Err(err)
            }
        }
    }
}

impl Drop for NodeLedger {
    fn drop(&mut self) {
        // Unblocks the reader thread.
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

fn wait_for_welcome(
    rx: &mpsc::Receiver<NodeEvent>,
    timeout: Duration,
) -> Result<WelcomeFrame, LedgerError> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(NodeEvent::Welcome(welcome)) => return Ok(welcome),
            Ok(NodeEvent::Fault(fault)) => {
                return Err(LedgerError::Rejected {
                    what: "hello",
                    message: fault.message,
                });
            }
            Ok(NodeEvent::ReadError(message)) => return Err(LedgerError::Protocol(message)),
            Ok(NodeEvent::Closed) => return Err(LedgerError::Closed),
            Ok(_) => {}
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => return Err(LedgerError::Closed),
        }
    }
    Err(LedgerError::Timeout("welcome"))
}

fn parse_node_line(line: &str) -> Option<NodeEvent> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Some(NodeEvent::ReadError(format!("node: invalid json: {}", e))),
    };
    let msg_type = value.get("type").and_then(|v| v.as_str()).unwrap_or("");
    match msg_type {
        "welcome" => match serde_json::from_str::<WelcomeFrame>(line) {
            Ok(frame) => Some(NodeEvent::Welcome(frame)),
            Err(e) => Some(NodeEvent::ReadError(format!("node: invalid welcome: {}", e))),
        },
        "ack" => match serde_json::from_str::<AckFrame>(line) {
            Ok(frame) => Some(NodeEvent::Ack(frame)),
            Err(e) => Some(NodeEvent::ReadError(format!("node: invalid ack: {}", e))),
        },
        "leaderboard" => match serde_json::from_str::<LeaderboardFrame>(line) {
            Ok(frame) => Some(NodeEvent::Leaderboard(frame)),
            Err(e) => Some(NodeEvent::ReadError(format!(
                "node: invalid leaderboard: {}",
                e
            ))),
        },
        "error" => match serde_json::from_str::<ErrorFrame>(line) {
            Ok(frame) => Some(NodeEvent::Fault(frame)),
            Err(e) => Some(NodeEvent::ReadError(format!("node: invalid error: {}", e))),
        },
        _ => None,
    }
}

#![cfg(feature = "std")]

//! Front-end side of the protocol: sends requests and matches replies.

use std::collections::VecDeque;

use anyhow::anyhow;

use crate::domain::{PlayerId, SessionId, Snapshot};
use crate::protocol::{Message, Rejection, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Host answer to a move, refresh or abandon request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The game goes on.
    Update(Snapshot),
    /// The game ended and the host dropped the session.
    Finished(Snapshot),
    /// Nothing changed; show the reason to the acting player.
    Rejected(Rejection),
}

pub struct Client<T: Transport> {
    transport: T,
    next_seq: u64,
    handshaken: bool,
    notifications: VecDeque<Message>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_seq: 0,
            handshaken: false,
            notifications: VecDeque::new(),
        }
    }

    async fn ensure_handshake(&mut self) -> anyhow::Result<()> {
        if self.handshaken {
            return Ok(());
        }
        self.transport
            .send(Message::Handshake {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match self.transport.recv().await? {
            Message::HandshakeAck { version } if version == PROTOCOL_VERSION => {
                self.handshaken = true;
                Ok(())
            }
            Message::HandshakeAck { version } => Err(anyhow!(
                "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            other => Err(anyhow!("Expected HandshakeAck, got {:?}", other)),
        }
    }

    /// Send the request built from a fresh sequence number and wait for the
    /// reply carrying it. Anything else received meanwhile is queued as a
    /// notification.
    async fn request(&mut self, build: impl FnOnce(u64) -> Message) -> anyhow::Result<Message> {
        self.ensure_handshake().await?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.transport.send(build(seq)).await?;
        loop {
            let msg = self.transport.recv().await?;
            if msg.reply_seq() == Some(seq) {
                return Ok(msg);
            }
            log::debug!("queued notification {:?}", msg);
            self.notifications.push_back(msg);
        }
    }

    /// Start a game; `challenger` moves first.
    pub async fn start(
        &mut self,
        challenger: PlayerId,
        opponent: PlayerId,
    ) -> anyhow::Result<Result<(SessionId, Snapshot), Rejection>> {
        let reply = self
            .request(|seq| Message::Start {
                seq,
                challenger,
                opponent,
            })
            .await?;
        match reply {
            Message::Started {
                session, snapshot, ..
            } => Ok(Ok((session, snapshot))),
            Message::Rejected { reason, .. } => Ok(Err(reason)),
            other => Err(anyhow!("Unexpected reply to Start: {:?}", other)),
        }
    }

    /// Drop `player`'s piece into the 0-based `column`.
    pub async fn play(
        &mut self,
        session: SessionId,
        player: PlayerId,
        column: usize,
    ) -> anyhow::Result<Reply> {
        // out-of-range columns still reach the host, which rejects them
        let column = u8::try_from(column).unwrap_or(u8::MAX);
        let reply = self
            .request(|seq| Message::Move {
                seq,
                session,
                player,
                column,
            })
            .await?;
        into_reply(reply)
    }

    pub async fn refresh(&mut self, session: SessionId) -> anyhow::Result<Reply> {
        let reply = self.request(|seq| Message::Refresh { seq, session }).await?;
        into_reply(reply)
    }

    pub async fn abandon(&mut self, session: SessionId, player: PlayerId) -> anyhow::Result<Reply> {
        let reply = self
            .request(|seq| Message::Abandon {
                seq,
                session,
                player,
            })
            .await?;
        into_reply(reply)
    }

    /// Drain messages the host pushed on its own.
    pub fn take_notifications(&mut self) -> Vec<Message> {
        self.notifications.drain(..).collect()
    }

    /// Wait for the next pushed message.
    pub async fn next_notification(&mut self) -> anyhow::Result<Message> {
        if let Some(msg) = self.notifications.pop_front() {
            return Ok(msg);
        }
        self.ensure_handshake().await?;
        self.transport.recv().await
    }
}

fn into_reply(msg: Message) -> anyhow::Result<Reply> {
    match msg {
        Message::Update { snapshot, .. } => Ok(Reply::Update(snapshot)),
        Message::Finished { snapshot, .. } => Ok(Reply::Finished(snapshot)),
        Message::Rejected { reason, .. } => Ok(Reply::Rejected(reason)),
        other => Err(anyhow!("Unexpected reply: {:?}", other)),
    }
}

#![cfg(feature = "std")]

//! Transport-side game host: maps each inbound request to exactly one
//! registry or engine call and answers it.

use anyhow::anyhow;
use tokio::time::interval;

use crate::config::HostConfig;
use crate::core::SessionError;
use crate::domain::{PlayerId, SessionId, Snapshot};
use crate::protocol::{Message, Rejection, PROTOCOL_VERSION};
use crate::registry::SessionRegistry;
use crate::transport::Transport;

pub struct Host<T: Transport> {
    transport: T,
    registry: SessionRegistry<PlayerId>,
    config: HostConfig,
}

impl<T: Transport> Host<T> {
    pub fn new(transport: T, config: HostConfig) -> Self {
        Self::with_registry(transport, SessionRegistry::new(), config)
    }

    pub fn with_registry(
        transport: T,
        registry: SessionRegistry<PlayerId>,
        config: HostConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &SessionRegistry<PlayerId> {
        &self.registry
    }

    async fn handshake(&mut self) -> anyhow::Result<()> {
        match self.transport.recv().await? {
            Message::Handshake { version } if version == PROTOCOL_VERSION => {
                self.transport
                    .send(Message::HandshakeAck {
                        version: PROTOCOL_VERSION,
                    })
                    .await
            }
            Message::Handshake { version } => {
                log::warn!(
                    "handshake version mismatch: expected {}, peer sent {}",
                    PROTOCOL_VERSION,
                    version
                );
                Err(anyhow!(
                    "Protocol version mismatch in Handshake: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ))
            }
            other => {
                log::warn!("expected Handshake, got {:?}", other);
                Err(anyhow!("Expected Handshake, got unexpected message (closing session)"))
            }
        }
    }

    /// Serve requests until the transport closes. Every session still live at
    /// that point is abandoned and disposed.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.handshake().await?;

        let mut sweep = interval(self.config.sweep_interval);
        sweep.tick().await; // first tick completes immediately

        let result = loop {
            tokio::select! {
                msg = self.transport.recv() => {
                    let msg = match msg {
                        Ok(msg) => msg,
                        Err(e) => {
                            log::info!("transport closed: {}", e);
                            break Ok(());
                        }
                    };
                    let reply = self.handle(msg).await;
                    if let Err(e) = self.transport.send(reply).await {
                        break Err(e);
                    }
                }
                _ = sweep.tick() => {
                    if let Err(e) = self.expire_idle().await {
                        break Err(e);
                    }
                }
            }
        };

        self.close_all().await;
        result
    }

    /// Answer a single request.
    pub async fn handle(&mut self, msg: Message) -> Message {
        log::debug!("request {:?}", msg);
        match msg {
            Message::Start {
                seq,
                challenger,
                opponent,
            } => self.start(seq, challenger, opponent).await,
            Message::Move {
                seq,
                session,
                player,
                column,
            } => self.play(seq, session, player, column as usize).await,
            Message::Refresh { seq, session } => match self.snapshot(session).await {
                Some(snapshot) => Message::Update {
                    seq,
                    session,
                    snapshot,
                },
                None => reject(seq, Some(session), Rejection::UnknownSession),
            },
            Message::Abandon {
                seq,
                session,
                player,
            } => self.abandon(seq, session, player).await,
            other => {
                log::warn!("unexpected message {:?}", other);
                reject(other.reply_seq().unwrap_or(0), None, Rejection::UnexpectedMessage)
            }
        }
    }

    async fn start(&mut self, seq: u64, challenger: PlayerId, opponent: PlayerId) -> Message {
        let session = match self.registry.create((challenger, opponent)) {
            Ok(id) => id,
            Err(SessionError::InvalidPlayers) => {
                return reject(seq, None, Rejection::InvalidPlayers);
            }
        };
        match self.snapshot(session).await {
            Some(snapshot) => Message::Started {
                seq,
                session,
                snapshot,
            },
            None => reject(seq, Some(session), Rejection::UnknownSession),
        }
    }

    async fn play(
        &mut self,
        seq: u64,
        session: SessionId,
        player: PlayerId,
        column: usize,
    ) -> Message {
        let Some(shared) = self.registry.get(session) else {
            return reject(seq, Some(session), Rejection::UnknownSession);
        };
        let (snapshot, over) = {
            let mut game = shared.lock().await;
            if let Err(e) = game.apply_move(&player, column) {
                log::warn!(
                    "session {}: move by {} in column {} rejected: {}",
                    session,
                    player,
                    column,
                    e
                );
                return reject(seq, Some(session), Rejection::Move(e));
            }
            (Snapshot::from(&*game), game.is_over())
        };

        if over {
            self.registry.dispose(session).await;
            Message::Finished {
                seq: Some(seq),
                session,
                snapshot,
            }
        } else {
            self.registry.touch(session);
            Message::Update {
                seq,
                session,
                snapshot,
            }
        }
    }

    async fn abandon(&mut self, seq: u64, session: SessionId, player: PlayerId) -> Message {
        let Some(shared) = self.registry.get(session) else {
            return reject(seq, Some(session), Rejection::UnknownSession);
        };
        let snapshot = {
            let mut game = shared.lock().await;
            if game.seat_of(&player).is_none() {
                return reject(seq, Some(session), Rejection::NotInSession);
            }
            game.abandon();
            Snapshot::from(&*game)
        };
        log::info!("session {} abandoned by {}", session, player);
        self.registry.dispose(session).await;
        Message::Finished {
            seq: Some(seq),
            session,
            snapshot,
        }
    }

    async fn snapshot(&self, session: SessionId) -> Option<Snapshot> {
        let shared = self.registry.get(session)?;
        let game = shared.lock().await;
        Some(Snapshot::from(&*game))
    }

    /// Abandon and dispose sessions idle past the move timeout, pushing a
    /// `Finished` message for each.
    async fn expire_idle(&mut self) -> anyhow::Result<()> {
        for session in self.registry.expired(self.config.move_timeout) {
            let Some(snapshot) = self.abandon_and_dispose(session).await else {
                continue;
            };
            log::info!(
                "session {} timed out after {:?}",
                session,
                self.config.move_timeout
            );
            self.transport
                .send(Message::Finished {
                    seq: None,
                    session,
                    snapshot,
                })
                .await?;
        }
        Ok(())
    }

    async fn abandon_and_dispose(&mut self, session: SessionId) -> Option<Snapshot> {
        let shared = self.registry.get(session)?;
        let snapshot = {
            let mut game = shared.lock().await;
            game.abandon();
            Snapshot::from(&*game)
        };
        self.registry.dispose(session).await;
        Some(snapshot)
    }

    async fn close_all(&mut self) {
        for session in self.registry.ids() {
            self.abandon_and_dispose(session).await;
        }
    }
}

fn reject(seq: u64, session: Option<SessionId>, reason: Rejection) -> Message {
    Message::Rejected {
        seq,
        session,
        reason,
    }
}

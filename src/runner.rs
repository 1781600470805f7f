#![cfg(feature = "std")]

use anyhow::anyhow;

use crate::client::{Client, Reply};
use crate::domain::{PlayerId, SessionId, Snapshot};
use crate::player::{Intent, MoveSource};
use crate::protocol::{Message, Rejection};
use crate::render::{render_rejection, render_result, render_snapshot, render_start};
use crate::transport::Transport;

/// Outcome of a match driven by [`MatchRunner`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchReport {
    pub session: SessionId,
    pub snapshot: Snapshot,
    /// Intents the host refused along the way.
    pub rejections: usize,
}

/// Drives one session through a [`Client`], asking the move source of the
/// seat whose turn it is for every step. Sources are called on the blocking
/// pool, so a source may wait on stdin.
pub struct MatchRunner<T: Transport> {
    client: Client<T>,
    seats: [Option<Box<dyn MoveSource>>; 2],
    echo: bool,
}

impl<T: Transport> MatchRunner<T> {
    pub fn new(client: Client<T>, seats: [Box<dyn MoveSource>; 2]) -> Self {
        Self {
            client,
            seats: seats.map(Some),
            echo: false,
        }
    }

    /// Print the start and result messages to stdout.
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn into_client(self) -> Client<T> {
        self.client
    }

    pub async fn run(
        &mut self,
        challenger: PlayerId,
        opponent: PlayerId,
    ) -> anyhow::Result<MatchReport> {
        let (session, mut snapshot) = self
            .client
            .start(challenger, opponent)
            .await?
            .map_err(|reason| anyhow!("Game could not start: {}", reason))?;
        if self.echo {
            println!("{}", render_start(&snapshot));
        }

        let mut rejections = 0;
        while let Some(current) = snapshot.current_player {
            if let Some(last) = self.pushed_finish(session) {
                snapshot = last;
                break;
            }
            let seat = snapshot
                .seat_of(current)
                .ok_or_else(|| anyhow!("Player {} is not seated in session {}", current, session))?;
            let reply = match self.choose(seat, &snapshot).await? {
                Intent::Drop(column) => self.client.play(session, current, column).await?,
                Intent::Refresh => self.client.refresh(session).await?,
                Intent::Quit => self.client.abandon(session, current).await?,
            };
            match reply {
                Reply::Update(next) => snapshot = next,
                Reply::Finished(last) => {
                    snapshot = last;
                    break;
                }
                Reply::Rejected(Rejection::UnknownSession) => {
                    // the host ends idle sessions on its own
                    snapshot = self
                        .pushed_finish(session)
                        .ok_or_else(|| anyhow!("Session {} is gone", session))?;
                    break;
                }
                Reply::Rejected(reason) => {
                    rejections += 1;
                    log::warn!("{}", render_rejection(current, &reason));
                    if let Some(source) = self.seats[seat].as_mut() {
                        source.rejected(&reason);
                    }
                }
            }
        }

        if self.echo {
            println!("\n{}", render_snapshot(&snapshot));
            println!("{}", render_result(&snapshot));
        }
        Ok(MatchReport {
            session,
            snapshot,
            rejections,
        })
    }

    /// Ask the seat's source for an intent without stalling the runtime.
    async fn choose(&mut self, seat: usize, snapshot: &Snapshot) -> anyhow::Result<Intent> {
        let mut source = self.seats[seat]
            .take()
            .ok_or_else(|| anyhow!("Seat {} has no move source", seat))?;
        let view = snapshot.clone();
        let (source, intent) = tokio::task::spawn_blocking(move || {
            let intent = source.choose(&view);
            (source, intent)
        })
        .await?;
        self.seats[seat] = Some(source);
        Ok(intent)
    }

    /// `Finished` pushed by the host for `session`, if one arrived.
    fn pushed_finish(&mut self, session: SessionId) -> Option<Snapshot> {
        let mut finished = None;
        for msg in self.client.take_notifications() {
            match msg {
                Message::Finished {
                    session: id,
                    snapshot,
                    ..
                } if id == session => finished = Some(snapshot),
                other => log::debug!("dropping notification {:?}", other),
            }
        }
        finished
    }
}

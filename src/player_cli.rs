#![cfg(feature = "std")]

use std::io::{self, BufRead, Cursor, Stdin, Stdout, Write};

use crate::domain::Snapshot;
use crate::player::{Intent, MoveSource};
use crate::protocol::Rejection;
use crate::render::{mention, parse_column, render_snapshot, REFRESH_GLYPH};

/// Line-oriented input for [`CliMover`].
pub trait LineReader: Send {
    /// Append the next line to `buf`; returns 0 at end of input.
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

// Stdin keeps one process-wide buffer, so several movers can share it.
impl LineReader for Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        Stdin::read_line(self, buf)
    }
}

impl<T: AsRef<[u8]> + Send> LineReader for Cursor<T> {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        BufRead::read_line(self, buf)
    }
}

/// Hot-seat terminal player: prints the board and reads one command per
/// line. Columns are typed 1-7, `r` refreshes, `q` leaves the game.
pub struct CliMover<R, W> {
    input: R,
    output: W,
}

impl CliMover<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: LineReader, W: Write> CliMover<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        writeln!(self.output, "\n{}", render_snapshot(snapshot))?;
        if let Some(current) = snapshot.current_player {
            write!(
                self.output,
                "{} pick a column (1-7), r {} to refresh, q to quit: ",
                mention(current),
                REFRESH_GLYPH
            )?;
        }
        self.output.flush()
    }
}

fn parse_intent(line: &str) -> Option<Intent> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" | REFRESH_GLYPH => Some(Intent::Refresh),
        "q" | "quit" => Some(Intent::Quit),
        other => parse_column(other).map(Intent::Drop),
    }
}

impl<R: LineReader, W: Write + Send> MoveSource for CliMover<R, W> {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        if self.prompt(snapshot).is_err() {
            return Intent::Quit;
        }
        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Intent::Quit,
                Ok(_) => {}
            }
            if let Some(intent) = parse_intent(&line) {
                return intent;
            }
            if write!(self.output, "Invalid input, try again: ")
                .and_then(|()| self.output.flush())
                .is_err()
            {
                return Intent::Quit;
            }
        }
    }

    fn rejected(&mut self, reason: &Rejection) {
        let _ = writeln!(self.output, "{}", reason);
    }
}

#![cfg(feature = "std")]

//! Chat-style text rendering of snapshots: emoji cells, keycap column
//! labels and `<@id>` mentions.

use std::fmt::Write;

use crate::core::{
    config::{COLS, ROWS},
    Piece, Status,
};
use crate::domain::{PlayerId, Snapshot};
use crate::protocol::Rejection;

pub const EMPTY_GLYPH: &str = "\u{2B1B}";
pub const RED_GLYPH: &str = "\u{1F534}";
pub const BLUE_GLYPH: &str = "\u{1F535}";
/// Reaction that asks for the board to be sent again.
pub const REFRESH_GLYPH: &str = "\u{23EC}";

pub fn piece_glyph(piece: Piece) -> &'static str {
    match piece {
        Piece::Empty => EMPTY_GLYPH,
        Piece::PlayerA => RED_GLYPH,
        Piece::PlayerB => BLUE_GLYPH,
    }
}

/// Keycap emoji for a 0-based column ("1️⃣" for column 0).
pub fn column_label(col: usize) -> String {
    format!("{}\u{FE0F}\u{20E3}", col + 1)
}

/// Parse a keycap label or a plain 1-based number back to a 0-based column.
pub fn parse_column(input: &str) -> Option<usize> {
    let digits = input
        .trim()
        .trim_end_matches('\u{20E3}')
        .trim_end_matches('\u{FE0F}');
    let n: usize = digits.parse().ok()?;
    (1..=COLS).contains(&n).then(|| n - 1)
}

pub fn mention(player: PlayerId) -> String {
    format!("<@{}>", player)
}

/// Grid rows top to bottom, followed by the column header line.
pub fn render_board(board: &[[Piece; COLS]; ROWS]) -> String {
    let mut out = String::new();
    for row in board.iter() {
        for &piece in row.iter() {
            out.push_str(piece_glyph(piece));
        }
        out.push('\n');
    }
    for col in 0..COLS {
        out.push_str(&column_label(col));
    }
    out
}

/// Full game message: last move, whose turn it is, then the board.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    if let Some(last) = &snapshot.last_move {
        let _ = writeln!(
            out,
            "Last move:\n{} {} ({})",
            piece_glyph(last.piece),
            mention(last.player),
            last.column + 1
        );
    }
    if let Some(current) = snapshot.current_player {
        let glyph = match snapshot.seat_of(current) {
            Some(seat) => piece_glyph(Piece::for_seat(seat)),
            None => EMPTY_GLYPH,
        };
        let _ = writeln!(out, "Current turn: {} {}", glyph, mention(current));
    }
    out.push_str(&render_board(&snapshot.board));
    out
}

/// Line announcing a game start.
pub fn render_start(snapshot: &Snapshot) -> String {
    let [first, second] = snapshot.players;
    format!(
        "Game has started between {} and {}! {} will go first!",
        mention(first),
        mention(second),
        mention(first)
    )
}

/// Line announcing how a finished game ended.
pub fn render_result(snapshot: &Snapshot) -> String {
    match snapshot.status {
        Status::Won(winner) => format!("{} wins!", mention(winner)),
        Status::Draw => "It's a draw!".to_string(),
        Status::Abandoned => "The game was canceled or no moves were made.".to_string(),
        Status::InProgress => "The game is still running.".to_string(),
    }
}

pub fn render_rejection(player: PlayerId, reason: &Rejection) -> String {
    format!("{}: {}", mention(player), reason)
}

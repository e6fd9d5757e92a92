//! Terminal rendering of the message list and the credential form.
//!
//! Each message becomes one or more [`Row`]s: an avatar badge followed by
//! the body, with continuation rows indented under the first. Badges are
//! colored by [`Author`]. A [`ScrollView`] holds the visible window and
//! snaps to the last row every time the list is replaced.

use std::io::{self, Write};
use std::ops::Range;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use crate::feed::Message;

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

/// Avatar shown for messages without a sender.
pub const BOT_INITIAL: char = 'D';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    /// A chat user talking to the bot.
    Operator,
    /// The bot's own replies (no sender name).
    Bot,
}

#[must_use]
pub fn author(sender: &str) -> Author {
    if sender.is_empty() { Author::Bot } else { Author::Operator }
}

/// First character of the sender, upper-cased, or [`BOT_INITIAL`].
#[must_use]
pub fn avatar_initial(sender: &str) -> char {
    sender
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(BOT_INITIAL)
}

#[must_use]
pub fn badge_color(author: Author) -> Color {
    match author {
        Author::Operator => Color::DarkYellow,
        Author::Bot => Color::Magenta,
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// One screen row. Continuation rows carry a blank badge of the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub author: Author,
    pub badge: String,
    pub text: String,
}

impl Row {
    #[must_use]
    pub fn plain(&self) -> String {
        format!("{} {}", self.badge, self.text)
    }
}

/// Rows for a single message.
#[must_use]
pub fn message_rows(message: &Message) -> Vec<Row> {
    let author = author(&message.sender);
    let badge = format!("[{}]", avatar_initial(&message.sender));
    let indent = " ".repeat(badge.chars().count());
    let mut lines = message.body.lines();
    let first = lines.next().unwrap_or("");

    let mut rows = vec![Row { author, badge, text: first.to_owned() }];
    rows.extend(lines.map(|line| Row { author, badge: indent.clone(), text: line.to_owned() }));
    rows
}

/// Rows for the whole list, in the order given. An empty list renders nothing.
#[must_use]
pub fn render_rows(messages: &[Message]) -> Vec<Row> {
    messages.iter().flat_map(message_rows).collect()
}

// =============================================================================
// SCROLL VIEW
// =============================================================================

/// Visible window over `len` rows, `height` rows tall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollView {
    height: usize,
    offset: usize,
    len: usize,
}

impl ScrollView {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self { height: height.max(1), offset: 0, len: 0 }
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// React to a list replacement: the last row becomes visible.
    pub fn replace(&mut self, len: usize) {
        self.len = len;
        self.offset = self.bottom();
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset = (self.offset + rows).min(self.bottom());
    }

    #[must_use]
    pub fn at_bottom(&self) -> bool {
        self.offset == self.bottom()
    }

    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.len)
    }

    fn bottom(&self) -> usize {
        self.len.saturating_sub(self.height)
    }
}

/// Slice of `rows` currently in view, clamped to what exists.
#[must_use]
pub fn visible_rows<'a>(rows: &'a [Row], view: &ScrollView) -> &'a [Row] {
    let range = view.visible_range();
    let end = range.end.min(rows.len());
    &rows[range.start.min(end)..end]
}

// =============================================================================
// DRAWING
// =============================================================================

fn line_y(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

/// Redraw the whole screen with `rows` and a trailing status line, then flush.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn draw_feed(out: &mut impl Write, rows: &[Row], status: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    for (y, row) in rows.iter().enumerate() {
        queue!(
            out,
            MoveTo(0, line_y(y)),
            SetForegroundColor(badge_color(row.author)),
            Print(&row.badge),
            ResetColor,
            Print(' '),
            Print(&row.text)
        )?;
    }
    queue!(out, MoveTo(0, line_y(rows.len() + 1)), Print(status))?;
    out.flush()
}

/// Redraw the whole screen with plain `lines`, then flush.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn draw_lines(out: &mut impl Write, lines: &[String]) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    for (y, line) in lines.iter().enumerate() {
        queue!(out, MoveTo(0, line_y(y)), Print(line))?;
    }
    out.flush()
}

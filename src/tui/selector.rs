// Full-screen fuzzy list selector.
//
// Layout, top to bottom: title, search line, optional column header, then as
// many item rows as fit. The query narrows the list on every keystroke; the
// selection is an index into the filtered list and is clamped whenever that
// list changes.

use std::io;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use super::table::{header_line, row_line, Column};
use super::terminal::{truncate, Frame, Screen, Style};
use crate::fuzzy::fuzzy_indices;

/// How a selector run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Index into the original item slice.
    Selected(usize),
    /// Escape on a selector that allows going back.
    Back,
    /// Escape on a selector without a previous page.
    Cancelled,
    /// Ctrl-C.
    Interrupted,
}

/// Cursor, scroll and query state, independent of the items themselves.
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    pub query: String,
    /// Positions in the item slice that match the query.
    pub filtered: Vec<usize>,
    /// Position in `filtered`; `None` only when `filtered` is empty.
    pub selected: Option<usize>,
    /// First visible position in `filtered`.
    pub top: usize,
    /// Last screen row the pointer was seen on.
    pub pointer_row: Option<u16>,
}

impl SelectorState {
    fn new(len: usize) -> Self {
        let mut state = SelectorState {
            filtered: (0..len).collect(),
            ..Default::default()
        };
        state.clamp();
        state
    }

    fn set_filtered(&mut self, filtered: Vec<usize>) {
        self.filtered = filtered;
        self.clamp();
    }

    fn clamp(&mut self) {
        self.selected = match self.filtered.len() {
            0 => None,
            n => Some(self.selected.unwrap_or(0).min(n - 1)),
        };
        if self.selected.is_none() {
            self.top = 0;
        }
    }

    fn move_by(&mut self, delta: isize) {
        if let Some(current) = self.selected {
            let last = self.filtered.len().saturating_sub(1);
            let next = current.saturating_add_signed(delta).min(last);
            self.selected = Some(next);
        }
    }

    fn move_to(&mut self, position: usize) {
        if !self.filtered.is_empty() {
            self.selected = Some(position.min(self.filtered.len() - 1));
        }
    }

    /// Adjust `top` so the selection is inside `[top, top + max_rows)`.
    fn scroll_into_view(&mut self, max_rows: usize) {
        let Some(selected) = self.selected else {
            self.top = 0;
            return;
        };
        if selected < self.top {
            self.top = selected;
        } else if selected >= self.top + max_rows {
            self.top = selected + 1 - max_rows;
        }
        self.top = self.top.min(self.filtered.len().saturating_sub(max_rows));
    }

    /// Filtered position shown on screen row `row`, if that row holds an item.
    fn position_at(&self, row: u16, list_top: u16, max_rows: usize) -> Option<usize> {
        let rel = usize::from(row.checked_sub(list_top)?);
        if rel >= max_rows {
            return None;
        }
        let position = self.top + rel;
        (position < self.filtered.len()).then_some(position)
    }

    /// Remove the last word and any whitespace after it.
    fn delete_word(&mut self) {
        let trimmed = self.query.trim_end();
        if trimmed.is_empty() {
            return;
        }
        let keep = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.query.truncate(keep);
    }
}

pub struct ListSelector<'a, T> {
    items: &'a [T],
    title: String,
    label: Box<dyn Fn(&T) -> String + 'a>,
    columns: Vec<Column<'a, T>>,
    allow_escape_back: bool,
    state: SelectorState,
}

impl<'a, T> ListSelector<'a, T> {
    /// `label` is the text searched by the query and shown when there are no columns.
    pub fn new(title: impl Into<String>, items: &'a [T], label: impl Fn(&T) -> String + 'a) -> Self {
        Self {
            items,
            title: title.into(),
            label: Box::new(label),
            columns: Vec::new(),
            allow_escape_back: false,
            state: SelectorState::new(items.len()),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column<'a, T>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn allow_escape_back(mut self, allow: bool) -> Self {
        self.allow_escape_back = allow;
        self
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn selected_item(&self) -> Option<&'a T> {
        let items = self.items;
        self.state
            .selected
            .map(|pos| &items[self.state.filtered[pos]])
    }

    /// Paint, read one event, repeat until the user commits or leaves.
    pub fn run(&mut self, screen: &mut dyn Screen) -> io::Result<Outcome> {
        loop {
            let (cols, rows) = screen.size()?;
            self.state.scroll_into_view(self.max_rows(rows));
            screen.draw(&self.render(cols, rows))?;
            let event = screen.read_event()?;
            if let Some(outcome) = self.handle_event(event, rows) {
                tracing::debug!(?outcome, title = %self.title, "selector finished");
                return Ok(outcome);
            }
        }
    }

    /// Screen row of the first item.
    fn list_top(&self) -> u16 {
        if self.columns.is_empty() {
            2
        } else {
            3
        }
    }

    /// Item rows that fit on a screen `rows` tall.
    pub fn max_rows(&self, rows: u16) -> usize {
        let chrome = if self.columns.is_empty() { 3 } else { 4 };
        usize::from(rows.saturating_sub(chrome)).max(1)
    }

    pub fn handle_event(&mut self, event: Event, rows: u16) -> Option<Outcome> {
        let max_rows = self.max_rows(rows);
        let outcome = match event {
            Event::Key(key) => self.handle_key(key, max_rows),
            Event::Mouse(mouse) => self.handle_mouse(mouse, max_rows),
            Event::Paste(text) => {
                self.state.query.extend(text.chars().filter(|c| !c.is_control()));
                self.refilter();
                None
            }
            _ => None,
        };
        self.state.scroll_into_view(max_rows);
        outcome
    }

    fn handle_key(&mut self, key: KeyEvent, max_rows: usize) -> Option<Outcome> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let page = isize::try_from(max_rows).unwrap_or(1);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(Outcome::Interrupted),
            KeyCode::Enter => {
                return self
                    .state
                    .selected
                    .map(|pos| Outcome::Selected(self.state.filtered[pos]));
            }
            KeyCode::Esc => {
                return Some(if self.allow_escape_back {
                    Outcome::Back
                } else {
                    Outcome::Cancelled
                });
            }
            KeyCode::Up => self.state.move_by(-1),
            KeyCode::Down => self.state.move_by(1),
            KeyCode::PageUp => self.state.move_by(-page),
            KeyCode::PageDown => self.state.move_by(page),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to(usize::MAX),
            KeyCode::Char('w') if ctrl => {
                self.state.delete_word();
                self.refilter();
            }
            KeyCode::Backspace if ctrl || alt => {
                self.state.delete_word();
                self.refilter();
            }
            KeyCode::Backspace => {
                self.state.query.pop();
                self.refilter();
            }
            // ^H is what many terminals send for Backspace.
            KeyCode::Char('h') if ctrl => {
                self.state.query.pop();
                self.refilter();
            }
            KeyCode::Char(c) if !ctrl && !alt && !c.is_control() => {
                self.state.query.push(c);
                self.refilter();
            }
            _ => {}
        }
        None
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, max_rows: usize) -> Option<Outcome> {
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.state.pointer_row = Some(mouse.row);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                self.state.pointer_row = Some(mouse.row);
                if let Some(pos) = self.state.position_at(mouse.row, self.list_top(), max_rows) {
                    self.state.selected = Some(pos);
                    return Some(Outcome::Selected(self.state.filtered[pos]));
                }
            }
            MouseEventKind::ScrollUp => self.state.move_by(-1),
            MouseEventKind::ScrollDown => self.state.move_by(1),
            _ => {}
        }
        None
    }

    fn refilter(&mut self) {
        let label = &self.label;
        let filtered = fuzzy_indices(self.items, &self.state.query, |item: &T| label(item));
        self.state.set_filtered(filtered);
    }

    /// Filtered position under the pointer, recomputed against the current list.
    fn hovered(&self, max_rows: usize) -> Option<usize> {
        self.state
            .pointer_row
            .and_then(|row| self.state.position_at(row, self.list_top(), max_rows))
    }

    pub fn render(&self, cols: u16, rows: u16) -> Frame {
        let width = usize::from(cols).saturating_sub(1);
        let mut frame = Frame::default();
        frame.push(0, 0, truncate(&self.title, width), Style::Bold);
        frame.push(
            1,
            0,
            truncate(&format!("Search: {}", self.state.query), width),
            Style::Normal,
        );
        if !self.columns.is_empty() {
            frame.push(2, 0, truncate(&header_line(&self.columns), width), Style::Underline);
        }

        let list_top = self.list_top();
        let max_rows = self.max_rows(rows);
        let hovered = self.hovered(max_rows);
        let visible = (self.state.top..self.state.filtered.len()).take(max_rows);
        for (rel, pos) in visible.enumerate() {
            let item = &self.items[self.state.filtered[pos]];
            let text = if self.columns.is_empty() {
                (self.label)(item)
            } else {
                row_line(&self.columns, item)
            };
            let style = if Some(pos) == self.state.selected {
                Style::Reverse
            } else if Some(pos) == hovered {
                Style::DimReverse
            } else {
                Style::Normal
            };
            let row = list_top.saturating_add(u16::try_from(rel).unwrap_or(u16::MAX));
            frame.push(row, 0, truncate(&text, width), style);
        }
        frame
    }
}

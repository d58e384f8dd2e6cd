// Screen abstraction for the full-screen chooser.
//
// The selector only needs three things from a terminal: its size, the next
// input event and a way to paint a frame. `CrosstermScreen` provides them on a
// real terminal; `ScriptedScreen` replays a fixed list of events and records
// what was painted.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Set while a `TerminalGuard` holds the terminal; read by the panic hook.
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);
static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Visual treatment of a painted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    Bold,
    Underline,
    /// Current selection.
    Reverse,
    /// Mouse hover.
    DimReverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    pub row: u16,
    pub col: u16,
    pub text: String,
    pub style: Style,
}

/// One full redraw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<FrameLine>,
}

impl Frame {
    pub fn push(&mut self, row: u16, col: u16, text: impl Into<String>, style: Style) {
        self.lines.push(FrameLine {
            row,
            col,
            text: text.into(),
            style,
        });
    }

    /// Text painted on `row`, if any.
    pub fn row_text(&self, row: u16) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.row == row)
            .map(|l| l.text.as_str())
    }

    /// Single line centered on a `cols` x `rows` screen.
    pub fn centered(message: &str, cols: u16, rows: u16) -> Self {
        let text = truncate(message, usize::from(cols).saturating_sub(1));
        let col = (usize::from(cols).saturating_sub(text.chars().count())) / 2;
        let mut frame = Frame::default();
        frame.push(rows / 2, u16::try_from(col).unwrap_or(0), text, Style::Bold);
        frame
    }
}

/// Cut `text` to at most `max` characters.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub trait Screen {
    /// Terminal size as (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;
    /// Block until the next input event.
    fn read_event(&mut self) -> io::Result<Event>;
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Raw mode + alternate screen (+ mouse reporting) for as long as it lives.
///
/// Dropping the guard restores the terminal; a panic hook does the same
/// before the panic message is printed.
pub struct TerminalGuard {
    mouse: bool,
}

impl TerminalGuard {
    pub fn enter(mouse: bool) -> io::Result<Self> {
        install_panic_hook();
        terminal::enable_raw_mode()?;
        // From here on the guard exists, so a failure below still restores.
        let guard = TerminalGuard { mouse };
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);
        let mut out = io::stdout();
        queue!(out, EnterAlternateScreen, cursor::Hide)?;
        if mouse {
            queue!(out, EnableMouseCapture)?;
        }
        out.flush()?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            restore(self.mouse);
        }
    }
}

fn restore(mouse: bool) {
    let mut out = io::stdout();
    if mouse {
        let _ = queue!(out, DisableMouseCapture);
    }
    let _ = queue!(out, cursor::Show, LeaveAlternateScreen);
    let _ = out.flush();
    let _ = terminal::disable_raw_mode();
}

fn install_panic_hook() {
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            restore(true);
        }
        previous(info);
    }));
}

/// Screen backed by the process terminal through crossterm.
pub struct CrosstermScreen {
    out: Stdout,
    _guard: TerminalGuard,
}

impl CrosstermScreen {
    pub fn open(mouse: bool) -> io::Result<Self> {
        let guard = TerminalGuard::enter(mouse)?;
        Ok(Self {
            out: io::stdout(),
            _guard: guard,
        })
    }
}

impl Screen for CrosstermScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn read_event(&mut self) -> io::Result<Event> {
        event::read()
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        queue!(self.out, terminal::Clear(ClearType::All))?;
        for line in &frame.lines {
            queue!(self.out, cursor::MoveTo(line.col, line.row))?;
            match line.style {
                Style::Normal => {}
                Style::Bold => queue!(self.out, SetAttribute(Attribute::Bold))?,
                Style::Underline => queue!(self.out, SetAttribute(Attribute::Underlined))?,
                Style::Reverse => queue!(self.out, SetAttribute(Attribute::Reverse))?,
                Style::DimReverse => queue!(
                    self.out,
                    SetAttribute(Attribute::Dim),
                    SetAttribute(Attribute::Reverse)
                )?,
            }
            queue!(self.out, Print(&line.text), SetAttribute(Attribute::Reset))?;
        }
        self.out.flush()
    }
}

/// Screen fed from a queue of events, recording every frame drawn.
///
/// Running out of events is reported as `UnexpectedEof` so a loop waiting
/// for input cannot spin forever.
#[derive(Debug, Default)]
pub struct ScriptedScreen {
    pub cols: u16,
    pub rows: u16,
    pub events: VecDeque<Event>,
    pub frames: Vec<Frame>,
}

impl ScriptedScreen {
    pub fn new(cols: u16, rows: u16, events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            cols,
            rows,
            events: events.into_iter().collect(),
            frames: Vec::new(),
        }
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl Screen for ScriptedScreen {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok((self.cols, self.rows))
    }

    fn read_event(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted events left"))
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn centered_frame_sits_in_the_middle() {
        let frame = Frame::centered("Loading", 21, 10);
        assert_eq!(frame.lines.len(), 1);
        assert_eq!(frame.lines[0].row, 5);
        assert_eq!(frame.lines[0].col, 7);
        assert_eq!(frame.lines[0].style, Style::Bold);
    }

    #[test]
    fn centered_frame_truncates_long_messages() {
        let frame = Frame::centered("a very long loading message", 10, 4);
        assert_eq!(frame.lines[0].text, "a very lo");
        assert_eq!(frame.lines[0].col, 0);
    }

    #[test]
    fn scripted_screen_replays_then_reports_eof() {
        let key = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let mut screen = ScriptedScreen::new(80, 24, [key.clone()]);
        assert_eq!(screen.read_event().unwrap(), key);
        let err = screen.read_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn restoring_without_an_active_screen_is_a_no_op() {
        assert!(!SCREEN_ACTIVE.load(Ordering::SeqCst));
    }
}

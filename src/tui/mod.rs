// Interactive selection: a full-screen fuzzy chooser and its line-based
// fallback, plus the course -> assignment -> file workflow that drives them.

pub mod chooser;
pub mod fallback;
pub mod navigator;
pub mod selector;
pub mod table;
pub mod terminal;
pub mod workflow;

use std::io::{self, IsTerminal};

pub use chooser::{Chooser, FullScreenChooser, Pick};
pub use fallback::LineChooser;
pub use workflow::{drill_down, DrillDownOptions, FileEscape, Selection};

use crate::icons::Icons;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserMode {
    FullScreen,
    Line,
}

impl ChooserMode {
    /// `--fallback` wins, then the `tui_fallback` setting, then what the
    /// terminal can do.
    pub fn decide(fallback_flag: bool, fallback_setting: bool, full_screen_capable: bool) -> Self {
        if fallback_flag || fallback_setting || !full_screen_capable {
            ChooserMode::Line
        } else {
            ChooserMode::FullScreen
        }
    }
}

/// Whether stdin/stdout look like a terminal we can take over.
pub fn full_screen_capable() -> bool {
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return false;
    }
    if std::env::var("TERM").is_ok_and(|t| t == "dumb") {
        return false;
    }
    crossterm::terminal::size().is_ok_and(|(cols, rows)| cols > 0 && rows > 0)
}

/// Build the chooser for `mode`, dropping to the line chooser when the
/// terminal cannot be taken over.
pub fn open_chooser(mode: ChooserMode, icons: Icons) -> Box<dyn Chooser> {
    if mode == ChooserMode::FullScreen {
        match FullScreenChooser::open(icons.clone()) {
            Ok(chooser) => return Box::new(chooser),
            Err(err) => tracing::warn!(%err, "full-screen mode unavailable, using line prompts"),
        }
    }
    Box::new(LineChooser::stdio(icons))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_fallback_always_wins() {
        assert_eq!(ChooserMode::decide(true, false, true), ChooserMode::Line);
        assert_eq!(ChooserMode::decide(false, true, true), ChooserMode::Line);
        assert_eq!(ChooserMode::decide(false, false, false), ChooserMode::Line);
        assert_eq!(ChooserMode::decide(false, false, true), ChooserMode::FullScreen);
    }
}

// UI helpers: spinners and line prompts built on `indicatif` and `dialoguer`.
// The full-screen chooser lives in `tui`; these are the small one-off
// interactions the command handlers need around it.

use std::time::Duration;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::icons::{Icons, DEFAULT_EMOJI_LEVEL};

/// Spinner with a message; hidden entirely when `quiet`.
///
/// The caller finishes it with `finish_and_clear` or `finish_with_message`.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Ask for a line of text. An empty answer yields `default` (or "").
pub fn prompt_with_default(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = Input::<String>::new();
    input.with_prompt(prompt).allow_empty(true);
    if let Some(default) = default.filter(|d| !d.is_empty()) {
        input.default(default.to_string());
    }
    let answer = input
        .interact_text()
        .with_context(|| format!("reading answer for '{prompt}'"))?;
    Ok(answer.trim().to_string())
}

/// Yes/no question.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .context("reading confirmation")
}

/// Chooser preferences picked by `config tui`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiPreferences {
    pub fallback: bool,
    pub emoji_level: u8,
}

impl Default for TuiPreferences {
    fn default() -> Self {
        Self {
            fallback: false,
            emoji_level: DEFAULT_EMOJI_LEVEL,
        }
    }
}

/// Labels for the emoji level menu, each showing a sample of its glyphs.
pub fn emoji_level_labels() -> Vec<String> {
    let names = ["plain text", "basic symbols", "full emoji"];
    names
        .iter()
        .enumerate()
        .map(|(level, name)| {
            let icons = Icons::for_level(level as u8);
            format!(
                "{level}: {name} ({} {} {} {})",
                icons.folder, icons.check, icons.cross, icons.star
            )
        })
        .collect()
}

/// Ask for the chooser mode and emoji level, starting from `current`.
pub fn tui_preferences(current: TuiPreferences) -> Result<TuiPreferences> {
    let modes = ["Full-screen (keyboard and mouse)", "Line prompts (fallback)"];
    let mode = Select::new()
        .with_prompt("Interactive mode")
        .items(&modes)
        .default(usize::from(current.fallback))
        .interact()
        .context("reading interactive mode")?;

    let levels = emoji_level_labels();
    let level = Select::new()
        .with_prompt("Icon style")
        .items(&levels)
        .default(usize::from(current.emoji_level.min(2)))
        .interact()
        .context("reading icon style")?;

    Ok(TuiPreferences {
        fallback: mode == 1,
        emoji_level: u8::try_from(level).unwrap_or(DEFAULT_EMOJI_LEVEL),
    })
}

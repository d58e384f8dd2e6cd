// `canvas config ...`: get, set, unset, list and the chooser preferences.

use anyhow::Result;
use serde_json::Value;

use crate::cli::{ConfigCommand, ScopeArgs};
use crate::config::{
    display_value, parse_value, write_scope, ConfigScope, ConfigStore, ListedEntry, ScopeSelection,
    Unset,
};
use crate::context::AppContext;
use crate::icons::DEFAULT_EMOJI_LEVEL;
use crate::ui::{self, TuiPreferences};

pub fn run(ctx: &mut AppContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { key, scope } => get(ctx, &key, scope),
        ConfigCommand::Set { key, value, scope } => set(ctx, &key, &value, scope),
        ConfigCommand::Unset { key, scope } => unset(ctx, &key, scope),
        ConfigCommand::List {
            scope,
            show_origin,
            show_scope,
            name_only,
        } => list(
            ctx,
            scope,
            ListFormat {
                show_origin,
                show_scope,
                name_only,
            },
        ),
        ConfigCommand::Tui { scope } => tui(ctx, scope),
    }
}

/// Where a read looked, for "not found" messages.
fn read_location(ctx: &AppContext, selection: ScopeSelection) -> String {
    match selection {
        ScopeSelection::Cascade => "global or local".to_string(),
        ScopeSelection::Only(scope) => ctx.store.path(scope).display().to_string(),
    }
}

fn get(ctx: &AppContext, key: &str, scope: ScopeArgs) -> Result<()> {
    let selection = ScopeSelection::from_flags(scope.global, scope.local);
    match ctx.store.get(key, selection)? {
        Some(value) => ctx.echo(format!("{key}={value}")),
        None => ctx.echo(format!("Key '{key}' not found in {}", read_location(ctx, selection))),
    }
    Ok(())
}

fn set(ctx: &AppContext, key: &str, raw: &str, scope: ScopeArgs) -> Result<()> {
    let target = write_scope(scope.global, scope.local, ConfigScope::Local)?;
    ctx.store.set(key, parse_value(key, raw), target)?;
    ctx.echo(format!(
        "Set {key} to {raw} in {}",
        ctx.store.path(target).display()
    ));
    Ok(())
}

fn unset(ctx: &AppContext, key: &str, scope: ScopeArgs) -> Result<()> {
    let target = write_scope(scope.global, scope.local, ConfigScope::Local)?;
    let path = ctx.store.path(target).display().to_string();
    match ctx.store.unset(key, target)? {
        Unset::Removed => ctx.echo(format!("Unset {key} in {path}")),
        Unset::NotFound => ctx.echo(format!("Key '{key}' not found in {path}")),
    }
    Ok(())
}

/// Display switches of `config list`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFormat {
    pub show_origin: bool,
    pub show_scope: bool,
    pub name_only: bool,
}

/// One `key=value` (or bare `key`) line with the requested annotations.
pub fn format_entry(entry: &ListedEntry, format: ListFormat) -> String {
    let line = if format.name_only {
        entry.key.clone()
    } else {
        format!("{}={}", entry.key, display_value(&entry.value))
    };
    let path = entry.path.display();
    match (format.show_origin, format.show_scope) {
        (true, true) => format!("{line} (from {} config at {path})", entry.scope),
        (true, false) => format!("{line} (from {path})"),
        (false, true) => format!("{line} ({})", entry.scope),
        (false, false) => line,
    }
}

/// Output of `config list`: one line per entry, then where they came from.
pub fn list_lines(store: &ConfigStore, selection: ScopeSelection, format: ListFormat) -> Result<Vec<String>> {
    let scope_text = match selection {
        ScopeSelection::Cascade => "cascaded (global and local)".to_string(),
        ScopeSelection::Only(scope) => scope.to_string(),
    };
    let entries = store.list(selection)?;
    if entries.is_empty() {
        return Ok(vec![format!("No config found in {scope_text} scope")]);
    }
    let mut lines: Vec<String> = entries.iter().map(|e| format_entry(e, format)).collect();
    lines.push(format!("Listed config from {scope_text} scope"));
    Ok(lines)
}

fn list(ctx: &AppContext, scope: ScopeArgs, format: ListFormat) -> Result<()> {
    let selection = ScopeSelection::from_flags(scope.global, scope.local);
    for line in list_lines(&ctx.store, selection, format)? {
        ctx.echo(line);
    }
    Ok(())
}

/// Current preferences as stored, for the menu defaults.
fn current_preferences(ctx: &AppContext) -> Result<TuiPreferences> {
    let fallback = ctx
        .store
        .resolve("tui_fallback", None)?
        .is_some_and(|v| v == "true");
    let emoji_level = ctx
        .store
        .resolve("tui_emoji_level", None)?
        .and_then(|v| v.parse::<u8>().ok())
        .unwrap_or(DEFAULT_EMOJI_LEVEL);
    Ok(TuiPreferences {
        fallback,
        emoji_level,
    })
}

fn tui(ctx: &AppContext, scope: ScopeArgs) -> Result<()> {
    let target = write_scope(scope.global, scope.local, ConfigScope::Global)?;
    let prefs = ui::tui_preferences(current_preferences(ctx)?)?;
    ctx.store.set("tui_fallback", Value::Bool(prefs.fallback), target)?;
    // Stored as a string so level 0 is not a falsy value that falls through the cascade.
    ctx.store.set(
        "tui_emoji_level",
        Value::String(prefs.emoji_level.to_string()),
        target,
    )?;
    ctx.echo(format!(
        "Saved interactive preferences to {}",
        ctx.store.path(target).display()
    ));
    Ok(())
}

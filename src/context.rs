// Per-invocation state handed to every command handler: output settings,
// the configuration store and a lazily built API client.

use std::fmt::Display;

use anyhow::Result;

use crate::api::ApiClient;
use crate::config::{is_truthy, ConfigStore};
use crate::error::CliError;
use crate::icons::Icons;
use crate::tui::{self, Chooser, ChooserMode};

/// Output verbosity from the global flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    pub verbose: bool,
    pub quiet: bool,
}

pub struct AppContext {
    pub settings: Settings,
    pub store: ConfigStore,
    api: Option<ApiClient>,
}

impl AppContext {
    pub fn new(settings: Settings, store: ConfigStore) -> Self {
        Self {
            settings,
            store,
            api: None,
        }
    }

    /// Informational output; silent under `--quiet`.
    pub fn echo(&self, message: impl Display) {
        if !self.settings.quiet {
            println!("{message}");
        }
    }

    /// Detail shown only with `--verbose`; always logged.
    pub fn debug(&self, message: impl Display) {
        tracing::debug!("{message}");
        if self.settings.verbose && !self.settings.quiet {
            println!("{message}");
        }
    }

    /// API client built from `host` and `token` on first use.
    pub fn api(&mut self) -> Result<&ApiClient> {
        let api = match self.api.take() {
            Some(api) => api,
            None => ApiClient::from_config(&self.store)?,
        };
        Ok(self.api.insert(api))
    }

    /// Cascading lookup with an explicit override.
    pub fn resolve(&self, key: &str, override_value: Option<String>) -> Result<Option<String>> {
        Ok(self.store.resolve(key, override_value)?)
    }

    /// Like [`resolve`](Self::resolve) for numeric ids.
    pub fn resolve_id(&self, key: &str, override_value: Option<u64>) -> Result<Option<u64>> {
        match self.resolve(key, override_value.map(|v| v.to_string()))? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| CliError::UserInput(format!("{key} must be a number, got '{raw}'")).into()),
        }
    }

    /// A numeric id that must resolve; the error names the flag and config key.
    pub fn require_id(&self, key: &str, override_value: Option<u64>) -> Result<u64> {
        self.resolve_id(key, override_value)?.ok_or_else(|| {
            let flag = key.replace('_', "-");
            CliError::MissingConfig(format!(
                "{key} (pass --{flag}, use --tui, or run `canvas config set {key} <id>`)"
            ))
            .into()
        })
    }

    /// Icon set from `tui_emoji_level`.
    pub fn icons(&self) -> Icons {
        match self.store.resolve("tui_emoji_level", None) {
            Ok(level) => Icons::from_setting(level.as_deref()),
            Err(err) => {
                tracing::warn!(%err, "ignoring unreadable tui_emoji_level");
                Icons::default()
            }
        }
    }

    /// Full-screen or line prompts, from the flag, the setting and the terminal.
    pub fn chooser_mode(&self, fallback_flag: bool) -> Result<ChooserMode> {
        let setting = self
            .store
            .resolve_value("tui_fallback")?
            .is_some_and(|v| is_truthy(&v) && v != serde_json::Value::String("false".into()));
        let capable = !fallback_flag && !setting && tui::full_screen_capable();
        let mode = ChooserMode::decide(fallback_flag, setting, capable);
        tracing::debug!(?mode, fallback_flag, setting, "chooser mode");
        Ok(mode)
    }

    pub fn open_chooser(&self, fallback_flag: bool) -> Result<Box<dyn Chooser>> {
        let mode = self.chooser_mode(fallback_flag)?;
        Ok(tui::open_chooser(mode, self.icons()))
    }
}

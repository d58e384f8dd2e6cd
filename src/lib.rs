// Library root
// -----------
// This crate exposes the library surface of the `canvas` CLI. The binary
// (`main.rs`) parses arguments, builds an `AppContext` and hands it to the
// command handlers.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the Canvas REST API (courses,
//   assignments, submission history, three-step upload, downloads).
// - `config`: local/global JSON configuration files and cascading lookup.
// - `tui`: the interactive chooser (full-screen and line-based) and the
//   course -> assignment -> file workflow.
// - `fuzzy`, `icons`, `ordering`: filtering, glyphs and list order used by
//   the chooser and by `status`.
// - `ui`: spinners and one-off prompts.
// - `commands`, `cli`, `context`, `error`, `logging`: the command layer.
//
// The chooser is kept behind a trait so the workflow can be driven from
// tests with scripted input.
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod fuzzy;
pub mod icons;
pub mod logging;
pub mod ordering;
pub mod tui;
pub mod ui;

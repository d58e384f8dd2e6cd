// `canvas init`: write the local configuration for a project directory,
// npm-init style.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{current_dir, pick_interactively};
use crate::cli::TargetArgs;
use crate::config::{display_value, parse_value, ConfigScope, Mapping};
use crate::context::AppContext;
use crate::error::CliError;
use crate::tui::{DrillDownOptions, FileEscape};
use crate::ui;

const BANNER: &str = "This utility will walk you through creating a local canvas config file.
It only covers the most common items, and tries to guess sensible defaults.

Use `canvas push --file <file>` to submit a specific file or just
`canvas push` to submit the default file.

Press ^C at any time to quit.";

/// Prompt order: (label, key).
const FIELDS: [(&str, &str); 5] = [
    ("Course Name", "course_name"),
    ("Course ID", "course_id"),
    ("Assignment Name", "assignment_name"),
    ("Assignment ID", "assignment_id"),
    ("File", "file"),
];

/// Flags of `canvas init` besides the course/assignment target.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub file: Option<PathBuf>,
    pub course_name: Option<String>,
    pub assignment_name: Option<String>,
}

/// Values suggested before prompting, from flags or the interactive picker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub course_name: Option<String>,
    pub course_id: Option<String>,
    pub assignment_name: Option<String>,
    pub assignment_id: Option<String>,
    pub file: Option<String>,
}

impl Suggestions {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "course_name" => self.course_name.as_deref(),
            "course_id" => self.course_id.as_deref(),
            "assignment_name" => self.assignment_name.as_deref(),
            "assignment_id" => self.assignment_id.as_deref(),
            "file" => self.file.as_deref(),
            _ => None,
        }
    }

    /// Names given on the command line win over picked or configured ones.
    pub fn with_names(mut self, course_name: Option<String>, assignment_name: Option<String>) -> Self {
        if course_name.is_some() {
            self.course_name = course_name;
        }
        if assignment_name.is_some() {
            self.assignment_name = assignment_name;
        }
        self
    }
}

/// Default shown for `key`: the suggestion, else what the local file already has.
pub fn default_for(key: &str, suggestions: &Suggestions, existing: &Mapping) -> Option<String> {
    suggestions
        .get(key)
        .map(str::to_string)
        .or_else(|| existing.get(key).map(display_value))
}

/// Merge answers into the existing mapping. Empty answers keep what was there.
pub fn merge_answers(existing: &Mapping, answers: &[(&str, String)]) -> Mapping {
    let mut merged = existing.clone();
    for (key, answer) in answers {
        if !answer.is_empty() {
            merged.insert(key.to_string(), parse_value(key, answer));
        }
    }
    merged
}

/// Show `path` relative to `base` when it lives underneath it.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

fn suggestions(ctx: &mut AppContext, target: &TargetArgs, file: Option<PathBuf>) -> Result<Suggestions> {
    if target.interactive() {
        let cwd = current_dir();
        let selection = pick_interactively(
            ctx,
            target,
            DrillDownOptions {
                select_file: true,
                on_file_escape: FileEscape::Finish,
                start_dir: cwd.clone(),
                ..Default::default()
            },
        )?;
        let base = std::fs::canonicalize(&cwd).unwrap_or(cwd);
        return Ok(Suggestions {
            course_name: selection.course.name.clone(),
            course_id: Some(selection.course.id.to_string()),
            assignment_name: selection.assignment.as_ref().map(|a| a.name.clone()),
            assignment_id: selection.assignment_id().map(|id| id.to_string()),
            file: selection
                .file
                .or(file)
                .map(|p| relative_to(&p, &base).display().to_string()),
        });
    }
    Ok(Suggestions {
        course_id: ctx.resolve_id("course_id", target.course_id)?.map(|id| id.to_string()),
        course_name: ctx.resolve("course_name", None)?,
        assignment_id: ctx
            .resolve_id("assignment_id", target.assignment_id)?
            .map(|id| id.to_string()),
        assignment_name: ctx.resolve("assignment_name", None)?,
        file: ctx.resolve("file", file.map(|p| p.display().to_string()))?,
    })
}

pub fn run(ctx: &mut AppContext, target: &TargetArgs, options: InitOptions) -> Result<()> {
    let suggestions =
        suggestions(ctx, target, options.file)?.with_names(options.course_name, options.assignment_name);
    let existing = ctx.store.load(ConfigScope::Local)?;
    let path = ctx.store.path(ConfigScope::Local).to_path_buf();

    ctx.echo(BANNER);
    ctx.echo("");
    let mut answers = Vec::with_capacity(FIELDS.len());
    for (label, key) in FIELDS {
        let default = default_for(key, &suggestions, &existing);
        let answer = ui::prompt_with_default(label, default.as_deref())?;
        answers.push((key, answer));
    }
    let config = merge_answers(&existing, &answers);

    let pretty = serde_json::to_string_pretty(&config).context("serializing configuration")?;
    // The preview is part of the question, so it is shown even under --quiet.
    println!("About to write to {}:\n\n{pretty}\n", path.display());
    if !ui::confirm("Is this OK?", true)? {
        return Err(CliError::Cancelled.into());
    }

    ctx.store.save(ConfigScope::Local, &config)?;
    ctx.echo(format!("Configuration saved to {}", path.display()));
    Ok(())
}

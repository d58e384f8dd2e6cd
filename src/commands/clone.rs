// `canvas clone`: save an assignment's description as a standalone HTML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::course_and_assignment;
use crate::api::Assignment;
use crate::cli::TargetArgs;
use crate::context::AppContext;
use crate::error::CliError;
use crate::tui::chooser::short_datetime;
use crate::ui;

pub fn default_output(assignment_id: u64) -> PathBuf {
    PathBuf::from(format!("assignment_{assignment_id}.html"))
}

/// Minimal HTML page around the description body.
pub fn render_page(assignment: &Assignment) -> String {
    let title = escape(&assignment.name);
    let mut meta = Vec::new();
    if assignment.due_at.is_some() {
        meta.push(format!("Due: {}", short_datetime(assignment.due_at)));
    }
    if let Some(points) = assignment.points_possible {
        meta.push(format!("Points: {points}"));
    }
    let meta = if meta.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>\n", escape(&meta.join(" | ")))
    };
    let body = assignment.description.as_deref().unwrap_or("");
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n{meta}{body}\n</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn may_write(path: &Path, force: bool) -> Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    ui::confirm(&format!("{} already exists. Overwrite?", path.display()), false)
}

pub fn run(ctx: &mut AppContext, target: &TargetArgs, output: Option<PathBuf>, force: bool) -> Result<()> {
    let (course_id, assignment_id) = course_and_assignment(ctx, target)?;
    let output = output.unwrap_or_else(|| default_output(assignment_id));
    if output.is_dir() {
        return Err(CliError::UserInput(format!("'{}' is a directory", output.display())).into());
    }

    let api = ctx.api()?.clone();
    let spinner = ui::spinner("Fetching assignment...", ctx.settings.quiet);
    let assignment = api.get_assignment(course_id, assignment_id);
    spinner.finish_and_clear();
    let assignment = assignment?;
    if assignment.description.as_deref().map_or(true, str::is_empty) {
        tracing::warn!(assignment_id, "assignment has no description");
    }

    if !may_write(&output, force)? {
        return Err(CliError::Cancelled.into());
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(&output, render_page(&assignment))
        .with_context(|| format!("writing {}", output.display()))?;
    ctx.echo(format!("Saved '{}' to {}", assignment.name, output.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_name_uses_the_assignment_id() {
        assert_eq!(default_output(42), PathBuf::from("assignment_42.html"));
    }

    #[test]
    fn page_wraps_the_description() {
        let assignment = Assignment {
            id: 1,
            name: "Lab <1> & more".into(),
            description: Some("<p>Write a parser.</p>".into()),
            points_possible: Some(10.0),
            ..Default::default()
        };
        let page = render_page(&assignment);
        assert!(page.contains("<title>Lab &lt;1&gt; &amp; more</title>"));
        assert!(page.contains("<p>Points: 10</p>"));
        assert!(page.contains("<p>Write a parser.</p>"));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn missing_description_still_renders() {
        let page = render_page(&Assignment {
            name: "Empty".into(),
            ..Default::default()
        });
        assert!(page.contains("<h1>Empty</h1>"));
        assert!(!page.contains("Points"));
    }

    #[test]
    fn force_or_a_fresh_path_skips_the_question() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.html");
        assert!(may_write(&path, false).unwrap());
        fs::write(&path, "old").unwrap();
        assert!(may_write(&path, true).unwrap());
    }
}

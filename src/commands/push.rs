// `canvas push`: submit a file to an assignment.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{current_dir, pick_interactively, picked_assignment};
use crate::cli::TargetArgs;
use crate::context::AppContext;
use crate::error::CliError;
use crate::tui::{DrillDownOptions, FileEscape};
use crate::ui;

/// What to submit where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    pub course_id: u64,
    pub assignment_id: u64,
    pub file: PathBuf,
}

/// The file must exist and be a regular file.
pub fn check_file(path: &Path) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::NotFound(path.to_path_buf()))
    }
}

fn missing_file() -> CliError {
    CliError::MissingConfig(
        "file (pass --file, use --tui, or run `canvas config set file <path>`)".into(),
    )
}

fn resolve_target(ctx: &mut AppContext, target: &TargetArgs, file: Option<PathBuf>) -> Result<PushTarget> {
    let file_override = file.map(|p| p.display().to_string());
    if target.interactive() {
        let selection = pick_interactively(
            ctx,
            target,
            DrillDownOptions {
                select_file: true,
                on_file_escape: FileEscape::Back,
                start_dir: current_dir(),
                ..Default::default()
            },
        )?;
        let assignment_id = picked_assignment(&selection)?.id;
        // The line chooser can skip the file stage; fall back to the flag/config.
        let file = match selection.file {
            Some(path) => path,
            None => ctx
                .resolve("file", file_override)?
                .map(PathBuf::from)
                .ok_or_else(missing_file)?,
        };
        return Ok(PushTarget {
            course_id: selection.course.id,
            assignment_id,
            file,
        });
    }

    let course_id = ctx.require_id("course_id", target.course_id)?;
    let assignment_id = ctx.require_id("assignment_id", target.assignment_id)?;
    let file = ctx
        .resolve("file", file_override)?
        .map(PathBuf::from)
        .ok_or_else(missing_file)?;
    Ok(PushTarget {
        course_id,
        assignment_id,
        file,
    })
}

pub fn run(ctx: &mut AppContext, target: &TargetArgs, file: Option<PathBuf>) -> Result<()> {
    let push = resolve_target(ctx, target, file)?;
    check_file(&push.file)?;
    ctx.echo(format!("Course ID: {}", push.course_id));
    ctx.echo(format!("Assignment ID: {}", push.assignment_id));
    ctx.echo(format!("File: {}", push.file.display()));

    let api = ctx.api()?.clone();
    let spinner = ui::spinner("Submitting...", ctx.settings.quiet);
    let result = api.upload_and_submit(push.course_id, push.assignment_id, &push.file, |step| {
        spinner.set_message(step.label());
    });
    spinner.finish_and_clear();
    result?;

    ctx.echo(format!(
        "Submitted {} to assignment {} in course {}.",
        push.file.display(),
        push.assignment_id,
        push.course_id
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigScope, ConfigStore, CONFIG_FILE_NAME};
    use crate::context::Settings;
    use crate::error::exit_code_for;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        let store = ConfigStore::new(
            dir.path().join("local").join(CONFIG_FILE_NAME),
            dir.path().join("global").join(CONFIG_FILE_NAME),
        );
        AppContext::new(Settings { verbose: false, quiet: true }, store)
    }

    #[test]
    fn flags_override_config_values() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        ctx.store.set("course_id", json!(1), ConfigScope::Local).unwrap();
        ctx.store.set("assignment_id", json!(2), ConfigScope::Global).unwrap();
        ctx.store.set("file", json!("default.pdf"), ConfigScope::Local).unwrap();

        let args = TargetArgs {
            course_id: Some(9),
            ..Default::default()
        };
        let push = resolve_target(&mut ctx, &args, None).unwrap();
        assert_eq!(
            push,
            PushTarget {
                course_id: 9,
                assignment_id: 2,
                file: PathBuf::from("default.pdf"),
            }
        );

        let push = resolve_target(&mut ctx, &args, Some(PathBuf::from("other.pdf"))).unwrap();
        assert_eq!(push.file, PathBuf::from("other.pdf"));
    }

    #[test]
    fn missing_file_is_reported_before_any_request() {
        let dir = TempDir::new().unwrap();
        let mut ctx = context(&dir);
        let args = TargetArgs {
            course_id: Some(1),
            assignment_id: Some(2),
            ..Default::default()
        };
        let err = resolve_target(&mut ctx, &args, None).unwrap_err();
        assert!(err.to_string().contains("--file"));
        assert_eq!(exit_code_for(&err), 1);
    }

    #[test]
    fn file_must_exist_and_be_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("essay.pdf");
        assert!(matches!(check_file(&file), Err(CliError::NotFound(p)) if p == file));
        fs::write(&file, "%PDF").unwrap();
        assert!(check_file(&file).is_ok());
        assert!(check_file(dir.path()).is_err());
    }
}

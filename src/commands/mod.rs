// Command handlers. Each takes the explicit `AppContext` plus its parsed
// arguments and returns `anyhow::Result`; classified failures travel as
// `CliError` inside the error.

pub mod clone;
pub mod config;
pub mod init;
pub mod pull;
pub mod push;
pub mod status;

use std::path::PathBuf;

use anyhow::Result;

use crate::api::Assignment;
use crate::cli::{Command, TargetArgs};
use crate::context::AppContext;
use crate::error::CliError;
use crate::tui::{drill_down, DrillDownOptions, Selection};

pub fn dispatch(ctx: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::Config(cmd) => config::run(ctx, cmd),
        Command::Init {
            target,
            file,
            course_name,
            assignment_name,
        } => init::run(
            ctx,
            &target,
            init::InitOptions {
                file,
                course_name,
                assignment_name,
            },
        ),
        Command::Push { target, file } => push::run(ctx, &target, file),
        Command::Pull {
            target,
            output_dir,
            force,
            submission_number,
        } => pull::run(
            ctx,
            &target,
            &pull::PullOptions {
                output_dir,
                force,
                submission_number,
            },
        ),
        Command::Clone {
            target,
            output,
            force,
        } => clone::run(ctx, &target, output, force),
        Command::Status { target, json, view } => status::run(ctx, &target, json, view),
    }
}

/// Run the course/assignment(/file) picker. Leaving it without a choice is a
/// cancellation.
pub(crate) fn pick_interactively(
    ctx: &mut AppContext,
    target: &TargetArgs,
    options: DrillDownOptions,
) -> Result<Selection> {
    let api = ctx.api()?.clone();
    // The chooser owns the terminal until it is dropped at the end of this block.
    let selection = {
        let mut chooser = ctx.open_chooser(target.fallback)?;
        drill_down(chooser.as_mut(), &api, &options)?
    };
    selection.ok_or_else(|| CliError::Cancelled.into())
}

/// The assignment of a selection made with the assignment page enabled.
pub(crate) fn picked_assignment(selection: &Selection) -> Result<&Assignment> {
    selection
        .assignment
        .as_ref()
        .ok_or_else(|| CliError::MissingConfig("assignment_id (no assignment was picked)".into()).into())
}

/// Ids for a command that needs both, interactively or from flags/config.
pub(crate) fn course_and_assignment(ctx: &mut AppContext, target: &TargetArgs) -> Result<(u64, u64)> {
    if target.interactive() {
        let selection = pick_interactively(
            ctx,
            target,
            DrillDownOptions {
                select_file: false,
                ..Default::default()
            },
        )?;
        let assignment = picked_assignment(&selection)?;
        ctx.debug(format!(
            "Selected {} / {}",
            selection.course.display_name(),
            assignment.name
        ));
        return Ok((selection.course.id, assignment.id));
    }
    let course_id = ctx.require_id("course_id", target.course_id)?;
    let assignment_id = ctx.require_id("assignment_id", target.assignment_id)?;
    Ok((course_id, assignment_id))
}

/// Start directory for the file picker.
pub(crate) fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

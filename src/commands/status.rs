// `canvas status`: one assignment in detail, the assignment list of a course,
// or (`status all`) what is still pending across every course.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::pick_interactively;
use crate::api::{Assignment, Conversation, Course, CourseCatalog};
use crate::cli::{StatusView, TargetArgs};
use crate::context::AppContext;
use crate::icons::Icons;
use crate::ordering::{sort_assignments, sort_courses};
use crate::tui::chooser::short_datetime;
use crate::tui::DrillDownOptions;
use crate::ui;

fn or_dash(text: String) -> String {
    if text.is_empty() {
        "-".to_string()
    } else {
        text
    }
}

/// Detail lines for one assignment.
pub fn describe_assignment(assignment: &Assignment, icons: &Icons) -> Vec<String> {
    let submitted = if assignment.has_submitted_submissions {
        format!("{} yes", icons.check)
    } else {
        format!("{} no", icons.cross)
    };
    let graded = if assignment.is_graded() {
        format!(" {} graded", icons.medal)
    } else {
        String::new()
    };
    vec![
        format!("Assignment: {} ({})", assignment.name, assignment.id),
        format!("Due:        {}", or_dash(short_datetime(assignment.due_at))),
        format!("Locks:      {}", or_dash(short_datetime(assignment.lock_at))),
        format!(
            "Points:     {}",
            assignment
                .points_possible
                .map_or_else(|| "-".to_string(), |p| p.to_string())
        ),
        format!("Submitted:  {submitted}{graded}"),
        format!("Accepts:    {}", or_dash(assignment.submission_types.join(", "))),
    ]
}

/// One line per uploadable assignment, in list order.
pub fn assignment_lines(assignments: Vec<Assignment>, icons: &Icons, now: DateTime<Utc>) -> Vec<String> {
    sort_assignments(assignments, now)
        .iter()
        .map(|a| {
            let due = short_datetime(a.due_at);
            let due = if due.is_empty() { "no due date".to_string() } else { format!("due {due}") };
            format!("{}{} [{}] ({due})", icons.assignment_icon_at(a, now), a.name, a.id)
        })
        .collect()
}

/// Uploadable assignments of one course that have no submission yet.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CourseSummary {
    pub id: u64,
    pub name: String,
    pub favorite: bool,
    pub pending: Vec<Assignment>,
}

#[derive(Serialize, Debug)]
pub struct Overview {
    pub courses: Vec<CourseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread: Option<Vec<Conversation>>,
}

pub fn summarize_course(course: &Course, assignments: Vec<Assignment>, now: DateTime<Utc>) -> CourseSummary {
    let pending = sort_assignments(assignments, now)
        .into_iter()
        .filter(|a| !a.has_submitted_submissions)
        .collect();
    CourseSummary {
        id: course.id,
        name: course.display_name().to_string(),
        favorite: course.is_favorite,
        pending,
    }
}

/// Summaries for every named course, in chooser order. A course whose
/// assignments cannot be listed is logged and left out.
pub fn gather_overview(catalog: &dyn CourseCatalog, now: DateTime<Utc>) -> Result<Vec<CourseSummary>> {
    let mut summaries = Vec::new();
    for course in sort_courses(catalog.list_courses()?) {
        match catalog.list_assignments(course.id) {
            Ok(assignments) => summaries.push(summarize_course(&course, assignments, now)),
            Err(err) => tracing::warn!(course_id = course.id, "skipping course: {err:#}"),
        }
    }
    Ok(summaries)
}

pub fn summary_lines(summary: &CourseSummary, icons: &Icons, now: DateTime<Utc>) -> Vec<String> {
    let star = if summary.favorite { icons.star } else { " " };
    let mut lines = vec![format!("{star} {} ({})", summary.name, summary.id)];
    if summary.pending.is_empty() {
        lines.push("    nothing pending".to_string());
    }
    for line in assignment_lines(summary.pending.clone(), icons, now) {
        lines.push(format!("    {line}"));
    }
    lines
}

pub fn conversation_line(conversation: &Conversation) -> String {
    let subject = conversation.subject.as_deref().filter(|s| !s.is_empty()).unwrap_or("(no subject)");
    let when = short_datetime(conversation.last_message_at);
    let preview: String = conversation
        .last_message
        .as_deref()
        .unwrap_or_default()
        .chars()
        .take(60)
        .collect();
    let mut line = format!("{subject} [{}]", conversation.id);
    if !when.is_empty() {
        line.push_str(&format!(" ({when})"));
    }
    if !preview.is_empty() {
        line.push_str(&format!(": {}", preview.replace('\n', " ")));
    }
    line
}

/// JSON output is data, so it ignores `--quiet`.
fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Serializing status")?;
    println!("{text}");
    Ok(())
}

pub fn run(ctx: &mut AppContext, target: &TargetArgs, json: bool, view: Option<StatusView>) -> Result<()> {
    match view {
        Some(StatusView::All { messages }) => run_all(ctx, json, messages),
        None => run_target(ctx, target, json),
    }
}

fn run_all(ctx: &mut AppContext, json: bool, messages: bool) -> Result<()> {
    let icons = ctx.icons();
    let api = ctx.api()?.clone();
    let now = Utc::now();

    let spinner = ui::spinner("Fetching courses...", ctx.settings.quiet);
    let courses = gather_overview(&api, now);
    spinner.finish_and_clear();
    let courses = courses?;

    let unread = if messages {
        let spinner = ui::spinner("Fetching conversations...", ctx.settings.quiet);
        let unread = api.unread_conversations();
        spinner.finish_and_clear();
        Some(unread?)
    } else {
        None
    };

    if json {
        return print_json(&Overview { courses, unread });
    }
    if courses.is_empty() {
        ctx.echo("No courses found.");
    }
    for summary in &courses {
        for line in summary_lines(summary, &icons, now) {
            ctx.echo(line);
        }
    }
    if let Some(unread) = unread {
        ctx.echo(format!("Unread conversations: {}", unread.len()));
        for conversation in &unread {
            ctx.echo(format!("    {}", conversation_line(conversation)));
        }
    }
    Ok(())
}

fn run_target(ctx: &mut AppContext, target: &TargetArgs, json: bool) -> Result<()> {
    let (course_id, assignment_id) = if target.interactive() {
        let selection = pick_interactively(
            ctx,
            target,
            DrillDownOptions {
                select_file: false,
                ..Default::default()
            },
        )?;
        (selection.course.id, selection.assignment_id())
    } else {
        (
            ctx.require_id("course_id", target.course_id)?,
            ctx.resolve_id("assignment_id", target.assignment_id)?,
        )
    };

    let icons = ctx.icons();
    let api = ctx.api()?.clone();
    match assignment_id {
        Some(assignment_id) => {
            let spinner = ui::spinner("Fetching assignment...", ctx.settings.quiet);
            let assignment = api.get_assignment(course_id, assignment_id);
            spinner.finish_and_clear();
            let assignment = assignment?;
            if json {
                return print_json(&assignment);
            }
            for line in describe_assignment(&assignment, &icons) {
                ctx.echo(line);
            }
        }
        None => {
            let spinner = ui::spinner("Fetching assignments...", ctx.settings.quiet);
            let assignments = api.list_assignments(course_id);
            spinner.finish_and_clear();
            let now = Utc::now();
            let assignments = assignments?;
            if json {
                return print_json(&sort_assignments(assignments, now));
            }
            let lines = assignment_lines(assignments, &icons, now);
            if lines.is_empty() {
                ctx.echo(format!("No assignments accepting file uploads in course {course_id}."));
            }
            for line in lines {
                ctx.echo(line);
            }
        }
    }
    Ok(())
}

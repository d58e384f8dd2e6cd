// The interactive front end behind the drill-down workflow.
//
// Two implementations share one trait: a full-screen chooser drawn with
// crossterm, and a line-based one that prints numbered lists and reads
// answers from a reader (see `fallback`). The workflow does not know which
// one it is talking to.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};

use super::navigator::{navigate, Navigation};
use super::selector::{ListSelector, Outcome};
use super::table::Column;
use super::terminal::{CrosstermScreen, Frame, Screen};
use crate::api::{Assignment, Course};
use crate::icons::Icons;

/// Result of one chooser page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick<T> {
    Chosen(T),
    /// Escape on a page with a previous page.
    Back,
    /// Proceed without a value (the line chooser's file stage).
    Skipped,
    /// Left the page without choosing, or there was nothing to choose.
    Dismissed,
    /// Ctrl-C or end of input: abandon the whole workflow.
    Quit,
}

pub trait Chooser {
    /// Tell the user a slow fetch is under way.
    fn loading(&mut self, message: &str) -> io::Result<()>;
    fn choose_course(&mut self, courses: &[Course]) -> io::Result<Pick<usize>>;
    fn choose_assignment(&mut self, course: &Course, assignments: &[Assignment]) -> io::Result<Pick<usize>>;
    fn choose_file(&mut self, start_dir: &Path) -> io::Result<Pick<PathBuf>>;
    /// Generic one-of-n pick with a title.
    fn choose_option(&mut self, title: &str, options: &[String]) -> io::Result<Pick<usize>>;
}

/// `YYYY-MM-DD` in local time, or empty.
pub(crate) fn short_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// `YYYY-MM-DD HH:MM` in local time, or empty.
pub(crate) fn short_datetime(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Canvas sends 0 where a number is unknown; such cells stay blank.
fn nonzero_id(id: u64) -> Option<String> {
    (id != 0).then(|| id.to_string())
}

fn nonzero_points(points: Option<f64>) -> Option<String> {
    points.filter(|p| *p != 0.0).map(|p| p.to_string())
}

fn course_columns<'a>(icons: &Icons) -> Vec<Column<'a, Course>> {
    let star = icons.star;
    vec![
        Column::new("Fav", 3, move |c: &Course| c.is_favorite.then(|| star.to_string())),
        Column::new("Name", 32, |c: &Course| c.name.clone()),
        Column::new("ID", 8, |c: &Course| nonzero_id(c.id)),
        Column::new("State", 10, |c: &Course| c.workflow_state.clone()),
        Column::new("Term", 18, |c: &Course| c.term.as_ref().and_then(|t| t.name.clone())),
        Column::new("Start", 12, |c: &Course| Some(short_date(c.start_at))),
        Column::new("End", 12, |c: &Course| Some(short_date(c.end_at))),
        Column::new("Account", 8, |c: &Course| c.account_id.and_then(nonzero_id)),
    ]
}

fn assignment_columns<'a>(icons: &Icons) -> Vec<Column<'a, Assignment>> {
    let icons = icons.clone();
    vec![
        Column::new("Sub", 3, move |a: &Assignment| {
            Some(icons.assignment_icon(a).trim_end().to_string())
        }),
        Column::new("Name", 32, |a: &Assignment| Some(a.name.clone())),
        Column::new("ID", 8, |a: &Assignment| nonzero_id(a.id)),
        Column::new("Due", 18, |a: &Assignment| Some(short_datetime(a.due_at))),
        Column::new("Points", 8, |a: &Assignment| nonzero_points(a.points_possible)),
        Column::new("State", 10, |a: &Assignment| a.workflow_state.clone()),
        Column::new("Type", 12, |a: &Assignment| a.submission_types.first().cloned()),
        Column::new("Desc", 24, |a: &Assignment| a.description.as_deref().map(preview)),
    ]
}

/// First 20 characters of a description, with an ellipsis when cut.
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(20).collect();
    if text.chars().count() > 20 {
        out.push_str("...");
    }
    out
}

/// Full-screen chooser: one selector page per stage.
pub struct FullScreenChooser<S: Screen> {
    screen: S,
    icons: Icons,
}

impl FullScreenChooser<CrosstermScreen> {
    /// Take over the terminal; it is restored when the chooser is dropped.
    pub fn open(icons: Icons) -> io::Result<Self> {
        Ok(Self::new(CrosstermScreen::open(true)?, icons))
    }
}

impl<S: Screen> FullScreenChooser<S> {
    pub fn new(screen: S, icons: Icons) -> Self {
        Self { screen, icons }
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }
}

fn to_pick(outcome: Outcome) -> Pick<usize> {
    match outcome {
        Outcome::Selected(index) => Pick::Chosen(index),
        Outcome::Back => Pick::Back,
        Outcome::Cancelled => Pick::Dismissed,
        Outcome::Interrupted => Pick::Quit,
    }
}

impl<S: Screen> Chooser for FullScreenChooser<S> {
    fn loading(&mut self, message: &str) -> io::Result<()> {
        let (cols, rows) = self.screen.size()?;
        self.screen.draw(&Frame::centered(message, cols, rows))
    }

    fn choose_course(&mut self, courses: &[Course]) -> io::Result<Pick<usize>> {
        let icons = self.icons.clone();
        let outcome = ListSelector::new("Select course (ESC to quit)", courses, move |c: &Course| {
            icons.format_course(c)
        })
        .with_columns(course_columns(&self.icons))
        .run(&mut self.screen)?;
        Ok(to_pick(outcome))
    }

    fn choose_assignment(&mut self, course: &Course, assignments: &[Assignment]) -> io::Result<Pick<usize>> {
        let icons = self.icons.clone();
        let title = format!("Select assignment for {} (ESC to go back)", course.display_name());
        let outcome = ListSelector::new(title, assignments, move |a: &Assignment| icons.format_assignment(a))
            .with_columns(assignment_columns(&self.icons))
            .allow_escape_back(true)
            .run(&mut self.screen)?;
        Ok(to_pick(outcome))
    }

    fn choose_file(&mut self, start_dir: &Path) -> io::Result<Pick<PathBuf>> {
        Ok(match navigate(&mut self.screen, start_dir, &self.icons)? {
            Navigation::File(path) => Pick::Chosen(path),
            Navigation::Escaped => Pick::Back,
            Navigation::Interrupted => Pick::Quit,
        })
    }

    fn choose_option(&mut self, title: &str, options: &[String]) -> io::Result<Pick<usize>> {
        let outcome = ListSelector::new(title, options, String::clone).run(&mut self.screen)?;
        Ok(to_pick(outcome))
    }
}

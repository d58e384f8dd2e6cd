// Status glyphs for courses, assignments and files.
//
// Three levels so the lists stay readable on terminals without emoji fonts:
// 0 plain ASCII, 1 basic symbols, 2 full emoji (default).

use chrono::{DateTime, Utc};

use crate::api::{Assignment, Course};

pub const DEFAULT_EMOJI_LEVEL: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icons {
    pub folder: &'static str,
    pub file: &'static str,
    pub check: &'static str,
    pub cross: &'static str,
    pub star: &'static str,
    pub dot_green: &'static str,
    pub dot_white: &'static str,
    pub medal: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self::for_level(DEFAULT_EMOJI_LEVEL)
    }
}

impl Icons {
    /// Glyph set for an emoji level; anything above 2 is treated as 2.
    pub fn for_level(level: u8) -> Self {
        match level {
            0 => Icons {
                folder: "DIR",
                file: "F",
                check: "Y",
                cross: "N",
                star: "*",
                dot_green: ".",
                dot_white: ".",
                medal: "G",
            },
            1 => Icons {
                folder: "DIR",
                file: "F",
                check: "✔",
                cross: "✗",
                star: "*",
                dot_green: "O",
                dot_white: ".",
                medal: "G",
            },
            _ => Icons {
                folder: "📁",
                file: "📄",
                check: "✔",
                cross: "✗",
                star: "★",
                dot_green: "🟢",
                dot_white: "⚪",
                medal: "🏅",
            },
        }
    }

    /// Parse a `tui_emoji_level` config value, falling back to the default.
    pub fn from_setting(raw: Option<&str>) -> Self {
        let level = raw
            .and_then(|v| v.trim().parse::<u8>().ok())
            .unwrap_or(DEFAULT_EMOJI_LEVEL);
        Self::for_level(level)
    }

    pub fn course_icon(&self, course: &Course) -> String {
        let star = if course.is_favorite { self.star } else { " " };
        let dot = if course.workflow_state.as_deref() == Some("available") {
            self.dot_green
        } else {
            self.dot_white
        };
        format!("{star} {dot} ")
    }

    pub fn assignment_icon(&self, assignment: &Assignment) -> String {
        self.assignment_icon_at(assignment, Utc::now())
    }

    pub fn assignment_icon_at(&self, assignment: &Assignment, now: DateTime<Utc>) -> String {
        if assignment.has_submitted_submissions {
            let mut icon = format!("{} ", self.check);
            if assignment.is_graded() {
                icon.push_str(self.medal);
                icon.push(' ');
            }
            icon
        } else if assignment.due_at.is_some_and(|due| due < now) {
            format!("{} ", self.cross)
        } else {
            "  ".to_string()
        }
    }

    pub fn format_course(&self, course: &Course) -> String {
        format!("{}{}", self.course_icon(course), course.display_name())
    }

    pub fn format_assignment(&self, assignment: &Assignment) -> String {
        format!("{}{}", self.assignment_icon(assignment), assignment.name)
    }
}

// Course -> assignment -> file drill-down.
//
// A small state machine over the chooser pages. Escape on the assignment
// page drops the course and returns to the course list; what Escape does on
// the file page depends on the caller (`push` goes back, `init` finishes).
// The assignment and file pages are optional; the file page is only reached
// through an assignment.

use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use super::chooser::{Chooser, Pick};
use crate::api::{Assignment, Course, CourseCatalog};
use crate::ordering::{sort_assignments, sort_courses};

/// What leaving the file page without a file means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEscape {
    /// Return to the assignment list of the same course.
    Back,
    /// Accept course and assignment with no file.
    Finish,
}

#[derive(Debug, Clone)]
pub struct DrillDownOptions {
    /// Offer the assignment page after a course is picked.
    pub select_assignment: bool,
    /// Offer the file page after an assignment is picked.
    pub select_file: bool,
    pub on_file_escape: FileEscape,
    pub start_dir: PathBuf,
}

impl Default for DrillDownOptions {
    fn default() -> Self {
        Self {
            select_assignment: true,
            select_file: true,
            on_file_escape: FileEscape::Back,
            start_dir: PathBuf::from("."),
        }
    }
}

/// What the user ended up picking. Stages that were not offered are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub course: Course,
    pub assignment: Option<Assignment>,
    pub file: Option<PathBuf>,
}

impl Selection {
    pub fn assignment_id(&self) -> Option<u64> {
        self.assignment.as_ref().map(|a| a.id)
    }
}

enum Page {
    Course,
    /// `assignments` is kept when coming back from the file page.
    Assignment {
        course: Course,
        assignments: Option<Vec<Assignment>>,
    },
    File {
        course: Course,
        assignments: Vec<Assignment>,
        assignment: Assignment,
    },
    Done(Selection),
}

/// Run the drill-down. `Ok(None)` means the user left without a selection.
pub fn drill_down(
    chooser: &mut dyn Chooser,
    catalog: &dyn CourseCatalog,
    options: &DrillDownOptions,
) -> Result<Option<Selection>> {
    let mut page = Page::Course;
    loop {
        page = match mem::replace(&mut page, Page::Course) {
            Page::Course => {
                chooser.loading("Loading courses from Canvas...")?;
                let courses = sort_courses(catalog.list_courses()?);
                tracing::debug!(count = courses.len(), "courses loaded");
                match chooser.choose_course(&courses)? {
                    Pick::Chosen(index) if options.select_assignment => Page::Assignment {
                        course: courses[index].clone(),
                        assignments: None,
                    },
                    Pick::Chosen(index) => Page::Done(Selection {
                        course: courses[index].clone(),
                        assignment: None,
                        file: None,
                    }),
                    _ => return Ok(None),
                }
            }
            Page::Assignment {
                course,
                assignments,
            } => {
                let assignments = match assignments {
                    Some(cached) => cached,
                    None => {
                        chooser.loading(&format!("Loading assignments for {}...", course.display_name()))?;
                        let fetched = catalog.list_assignments(course.id)?;
                        sort_assignments(fetched, Utc::now())
                    }
                };
                match chooser.choose_assignment(&course, &assignments)? {
                    Pick::Chosen(index) => {
                        let assignment = assignments[index].clone();
                        if options.select_file {
                            Page::File {
                                course,
                                assignments,
                                assignment,
                            }
                        } else {
                            Page::Done(Selection {
                                course,
                                assignment: Some(assignment),
                                file: None,
                            })
                        }
                    }
                    Pick::Quit => return Ok(None),
                    Pick::Back | Pick::Dismissed | Pick::Skipped => Page::Course,
                }
            }
            Page::File {
                course,
                assignments,
                assignment,
            } => match chooser.choose_file(&options.start_dir)? {
                Pick::Chosen(path) => Page::Done(Selection {
                    course,
                    assignment: Some(assignment),
                    file: Some(path),
                }),
                Pick::Skipped => Page::Done(Selection {
                    course,
                    assignment: Some(assignment),
                    file: None,
                }),
                Pick::Back | Pick::Dismissed => match options.on_file_escape {
                    FileEscape::Back => Page::Assignment {
                        course,
                        assignments: Some(assignments),
                    },
                    FileEscape::Finish => Page::Done(Selection {
                        course,
                        assignment: Some(assignment),
                        file: None,
                    }),
                },
                Pick::Quit => return Ok(None),
            },
            Page::Done(selection) => {
                tracing::debug!(
                    course_id = selection.course.id,
                    assignment_id = ?selection.assignment_id(),
                    file = ?selection.file,
                    "drill-down finished"
                );
                return Ok(Some(selection));
            }
        };
    }
}

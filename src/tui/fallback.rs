// Line-based chooser for terminals where the full-screen one cannot run.
//
// Every stage prints a numbered table and reads a 1-based number. A list
// with exactly one entry is taken without asking. Invalid answers re-prompt;
// end of input abandons the workflow.

use std::fs;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use super::chooser::{short_datetime, Chooser, Pick};
use super::navigator::with_path;
use crate::api::{Assignment, Course};
use crate::icons::Icons;

/// Answer accepted at the file stage to go on without a file.
pub const SKIP_TOKEN: &str = "q";

pub struct LineChooser<R, W> {
    input: R,
    output: W,
    icons: Icons,
}

impl LineChooser<StdinLock<'static>, Stdout> {
    pub fn stdio(icons: Icons) -> Self {
        Self::new(io::stdin().lock(), io::stdout(), icons)
    }
}

/// One parsed answer to a numbered prompt.
enum Answer {
    Index(usize),
    Skip,
    Eof,
}

impl<R: BufRead, W: Write> LineChooser<R, W> {
    pub fn new(input: R, output: W, icons: Icons) -> Self {
        Self { input, output, icons }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask until the answer is a number in `1..=count` (or the skip token
    /// when `skippable`).
    fn ask(&mut self, prompt: &str, count: usize, skippable: bool) -> io::Result<Answer> {
        loop {
            write!(self.output, "{prompt}")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Answer::Eof);
            }
            let answer = line.trim();
            if skippable && answer.eq_ignore_ascii_case(SKIP_TOKEN) {
                return Ok(Answer::Skip);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=count).contains(&n) => return Ok(Answer::Index(n - 1)),
                _ => writeln!(self.output, "Invalid selection. Try again.")?,
            }
        }
    }

    fn auto_pick(&mut self, what: &str, label: &str) -> io::Result<Pick<usize>> {
        writeln!(self.output, "Only one {what} available: {label}")?;
        Ok(Pick::Chosen(0))
    }
}

/// Regular files directly inside `dir`, sorted by name.
pub fn regular_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| with_path(err, dir))? {
        let entry = entry.map_err(|err| with_path(err, dir))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

impl<R: BufRead, W: Write> Chooser for LineChooser<R, W> {
    fn loading(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn choose_course(&mut self, courses: &[Course]) -> io::Result<Pick<usize>> {
        match courses {
            [] => {
                writeln!(self.output, "No courses found.")?;
                return Ok(Pick::Quit);
            }
            [only] => return self.auto_pick("course", only.display_name()),
            _ => {}
        }
        writeln!(self.output, "\nAvailable courses:")?;
        writeln!(self.output, "{:<3} {:^3} {:<40}", "#", "Fav", "Course Name")?;
        for (i, course) in courses.iter().enumerate() {
            let fav = if course.is_favorite { self.icons.star } else { "" };
            writeln!(self.output, "{:<3} {:^3} {:<40}", i + 1, fav, course.display_name())?;
        }
        Ok(match self.ask("Select a course by number: ", courses.len(), false)? {
            Answer::Index(i) => Pick::Chosen(i),
            Answer::Skip | Answer::Eof => Pick::Quit,
        })
    }

    fn choose_assignment(&mut self, course: &Course, assignments: &[Assignment]) -> io::Result<Pick<usize>> {
        match assignments {
            [] => {
                writeln!(
                    self.output,
                    "No assignments accepting file uploads in {}.",
                    course.display_name()
                )?;
                return Ok(Pick::Quit);
            }
            [only] => return self.auto_pick("assignment", &only.name),
            _ => {}
        }
        writeln!(self.output, "\nAssignments for {}:", course.display_name())?;
        writeln!(
            self.output,
            "{:<3} {:^3} {:<40} {:<16}",
            "#", self.icons.check, "Assignment Name", "Due"
        )?;
        for (i, assignment) in assignments.iter().enumerate() {
            let icon = self.icons.assignment_icon(assignment);
            writeln!(
                self.output,
                "{:<3} {:^3} {:<40} {:<16}",
                i + 1,
                icon.trim_end(),
                assignment.name,
                short_datetime(assignment.due_at)
            )?;
        }
        Ok(match self.ask("Select an assignment by number: ", assignments.len(), false)? {
            Answer::Index(i) => Pick::Chosen(i),
            Answer::Skip | Answer::Eof => Pick::Quit,
        })
    }

    fn choose_file(&mut self, start_dir: &Path) -> io::Result<Pick<PathBuf>> {
        let files = regular_files(start_dir)?;
        match files.as_slice() {
            [] => {
                writeln!(self.output, "No files in {}.", start_dir.display())?;
                return Ok(Pick::Skipped);
            }
            [only] => {
                writeln!(self.output, "Only one file available: {only}")?;
                return Ok(Pick::Chosen(start_dir.join(only)));
            }
            _ => {}
        }
        writeln!(self.output, "\nFiles in {}:", start_dir.display())?;
        writeln!(self.output, "{:<3} {:^4} {:<40}", "#", "Type", "File Name")?;
        for (i, name) in files.iter().enumerate() {
            writeln!(self.output, "{:<3} {:^4} {:<40}", i + 1, self.icons.file, name)?;
        }
        writeln!(self.output, "  [{SKIP_TOKEN}] No file / skip file")?;
        let prompt = format!("Enter file number or '{SKIP_TOKEN}' to skip: ");
        Ok(match self.ask(&prompt, files.len(), true)? {
            Answer::Index(i) => Pick::Chosen(start_dir.join(&files[i])),
            Answer::Skip => Pick::Skipped,
            Answer::Eof => Pick::Quit,
        })
    }

    fn choose_option(&mut self, title: &str, options: &[String]) -> io::Result<Pick<usize>> {
        match options {
            [] => return Ok(Pick::Dismissed),
            [only] => return self.auto_pick("option", only),
            _ => {}
        }
        writeln!(self.output, "\n{title}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "{:<3} {option}", i + 1)?;
        }
        let prompt = format!("Enter number or '{SKIP_TOKEN}' to cancel: ");
        Ok(match self.ask(&prompt, options.len(), true)? {
            Answer::Index(i) => Pick::Chosen(i),
            Answer::Skip => Pick::Dismissed,
            Answer::Eof => Pick::Quit,
        })
    }
}

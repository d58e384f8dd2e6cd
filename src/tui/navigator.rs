// Directory browser built on the list selector.
//
// Each directory is one selector page: ".." (unless at the filesystem root)
// followed by the directory's entries sorted by name. Picking a directory or
// ".." re-roots the page; picking a file ends the walk. A directory that
// cannot be opened leaves the walk where it was, with the error in the title.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::selector::{ListSelector, Outcome};
use super::table::Column;
use super::terminal::Screen;
use crate::icons::Icons;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Parent,
    Dir,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    /// Name as listed: directories get a trailing slash.
    pub fn label(&self) -> String {
        match self.kind {
            EntryKind::Parent => "..".to_string(),
            EntryKind::Dir => format!("{}/", self.name),
            EntryKind::File => self.name.clone(),
        }
    }
}

/// How a navigator walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    File(PathBuf),
    /// Escape: no file chosen.
    Escaped,
    /// Ctrl-C.
    Interrupted,
}

pub(crate) fn with_path(err: io::Error, path: &Path) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
}

/// Entries of `dir`: ".." first when `dir` has a parent, then everything else by name.
pub fn list_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| with_path(err, dir))? {
        let entry = entry.map_err(|err| with_path(err, dir))?;
        // `Path::is_dir` follows symlinks, so a link to a directory is browsable.
        let kind = if entry.path().is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        children.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind,
        });
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let mut entries = Vec::with_capacity(children.len() + 1);
    if dir.parent().is_some() {
        entries.push(Entry {
            name: "..".to_string(),
            kind: EntryKind::Parent,
        });
    }
    entries.extend(children);
    Ok(entries)
}

/// Walk the filesystem from `start` until a file is picked or the user leaves.
pub fn navigate(screen: &mut dyn Screen, start: &Path, icons: &Icons) -> io::Result<Navigation> {
    let mut cwd = fs::canonicalize(start).map_err(|err| with_path(err, start))?;
    let mut previous: Option<PathBuf> = None;
    let mut notice: Option<String> = None;
    loop {
        let entries = match list_entries(&cwd) {
            Ok(entries) => entries,
            Err(err) => match previous.take() {
                Some(back) => {
                    tracing::warn!("cannot open directory: {err}");
                    notice = Some(format!("Cannot open {err}"));
                    cwd = back;
                    continue;
                }
                None => return Err(err),
            },
        };
        let mut title = format!("Select file in {} (ESC to go back)", cwd.display());
        if let Some(notice) = notice.take() {
            title = format!("{notice} | {title}");
        }
        let folder = icons.folder;
        let file = icons.file;
        let columns = vec![
            Column::new("Type", 4, move |e: &Entry| {
                Some(match e.kind {
                    EntryKind::File => file.to_string(),
                    EntryKind::Dir | EntryKind::Parent => folder.to_string(),
                })
            }),
            Column::new("Name", 40, |e: &Entry| Some(e.label())),
        ];
        let outcome = ListSelector::new(title, &entries, Entry::label)
            .with_columns(columns)
            .allow_escape_back(true)
            .run(screen)?;

        match outcome {
            Outcome::Selected(index) => {
                let entry = &entries[index];
                match entry.kind {
                    EntryKind::Parent => {
                        if let Some(parent) = cwd.parent().map(Path::to_path_buf) {
                            previous = Some(std::mem::replace(&mut cwd, parent));
                        }
                    }
                    EntryKind::Dir => {
                        previous = Some(cwd.clone());
                        cwd.push(&entry.name);
                    }
                    EntryKind::File => {
                        let path = cwd.join(&entry.name);
                        tracing::debug!(path = ?path, "file picked");
                        return Ok(Navigation::File(path));
                    }
                }
            }
            Outcome::Back | Outcome::Cancelled => return Ok(Navigation::Escaped),
            Outcome::Interrupted => return Ok(Navigation::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::terminal::{Frame, ScriptedScreen};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn typed(text: &str) -> Vec<Event> {
        text.chars().map(|c| key(KeyCode::Char(c))).collect()
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src").join("main.rs"), "fn main() {}").unwrap();
        dir
    }

    #[test]
    fn entries_start_with_parent_and_are_sorted() {
        let dir = tree();
        let labels: Vec<String> = list_entries(dir.path())
            .unwrap()
            .iter()
            .map(Entry::label)
            .collect();
        assert_eq!(labels, vec!["..", "a.txt", "b.txt", "src/"]);
    }

    #[test]
    fn filesystem_root_has_no_parent_entry() {
        let root = Path::new("/");
        let entries = list_entries(root).unwrap();
        assert!(entries.iter().all(|e| e.kind != EntryKind::Parent));
    }

    #[test]
    fn picking_a_file_returns_its_full_path() {
        let dir = tree();
        // "..", "a.txt", "b.txt", "src/": two downs land on b.txt.
        let events = vec![key(KeyCode::Down), key(KeyCode::Down), key(KeyCode::Enter)];
        let mut screen = ScriptedScreen::new(80, 24, events);
        let picked = navigate(&mut screen, dir.path(), &Icons::for_level(0)).unwrap();
        let expected = fs::canonicalize(dir.path()).unwrap().join("b.txt");
        assert_eq!(picked, Navigation::File(expected));
    }

    #[test]
    fn directories_re_root_the_listing() {
        let dir = tree();
        let mut events = typed("src");
        events.push(key(KeyCode::Enter));
        events.extend(typed("main"));
        events.push(key(KeyCode::Enter));
        let mut screen = ScriptedScreen::new(80, 24, events);
        let picked = navigate(&mut screen, dir.path(), &Icons::for_level(0)).unwrap();
        let expected = fs::canonicalize(dir.path()).unwrap().join("src").join("main.rs");
        assert_eq!(picked, Navigation::File(expected));
    }

    #[test]
    fn parent_entry_goes_up_a_level() {
        let dir = tree();
        let start = dir.path().join("src");
        // ".." is first; then pick a.txt in the parent.
        let events = vec![key(KeyCode::Enter), key(KeyCode::Down), key(KeyCode::Enter)];
        let mut screen = ScriptedScreen::new(80, 24, events);
        let picked = navigate(&mut screen, &start, &Icons::for_level(0)).unwrap();
        let expected = fs::canonicalize(dir.path()).unwrap().join("a.txt");
        assert_eq!(picked, Navigation::File(expected));
    }

    #[test]
    fn escape_chooses_nothing() {
        let dir = tree();
        let mut screen = ScriptedScreen::new(80, 24, vec![key(KeyCode::Esc)]);
        let picked = navigate(&mut screen, dir.path(), &Icons::default()).unwrap();
        assert_eq!(picked, Navigation::Escaped);
    }

    #[test]
    fn rows_show_type_icons_and_slashes() {
        let dir = tree();
        let mut screen = ScriptedScreen::new(80, 24, vec![key(KeyCode::Esc)]);
        navigate(&mut screen, dir.path(), &Icons::for_level(0)).unwrap();
        let frame = screen.last_frame().unwrap();
        assert!(frame.row_text(6).unwrap().starts_with("DIR  | src/"));
        assert!(frame.row_text(4).unwrap().starts_with("F    | a.txt"));
    }

    /// Removes `doomed` when Enter is read, between listing and re-rooting.
    struct DeletingScreen {
        inner: ScriptedScreen,
        doomed: PathBuf,
    }

    impl Screen for DeletingScreen {
        fn size(&self) -> io::Result<(u16, u16)> {
            self.inner.size()
        }

        fn read_event(&mut self) -> io::Result<Event> {
            let event = self.inner.read_event()?;
            if event == key(KeyCode::Enter) && self.doomed.exists() {
                fs::remove_dir_all(&self.doomed)?;
            }
            Ok(event)
        }

        fn draw(&mut self, frame: &Frame) -> io::Result<()> {
            self.inner.draw(frame)
        }
    }

    #[test]
    fn vanished_directory_keeps_the_walk_in_place() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("zsub")).unwrap();
        let mut events = typed("zsub");
        events.push(key(KeyCode::Enter));
        events.push(key(KeyCode::Esc));
        let mut screen = DeletingScreen {
            inner: ScriptedScreen::new(400, 24, events),
            doomed: dir.path().join("zsub"),
        };
        let walked = navigate(&mut screen, dir.path(), &Icons::for_level(0)).unwrap();
        assert_eq!(walked, Navigation::Escaped);
        let frame = screen.inner.last_frame().unwrap();
        let title = frame.row_text(0).unwrap();
        assert!(title.starts_with("Cannot open "));
        assert!(title.contains("zsub"));
        let canonical = fs::canonicalize(dir.path()).unwrap();
        assert!(title.contains(&format!("Select file in {}", canonical.display())));
    }

    #[test]
    fn unreadable_start_names_the_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let err = list_entries(&missing).unwrap_err();
        assert!(err.to_string().contains("gone"));
        let mut screen = ScriptedScreen::new(80, 24, vec![]);
        let err = navigate(&mut screen, &missing, &Icons::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("gone"));
    }
}

// `canvas pull`: download the attachments of one of your submissions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::course_and_assignment;
use crate::api::{Attachment, Submission, SubmissionArchive};
use crate::cli::TargetArgs;
use crate::context::AppContext;
use crate::error::CliError;
use crate::tui::chooser::short_datetime;
use crate::tui::Pick;
use crate::ui;

#[derive(Debug, Clone)]
pub struct PullOptions {
    pub output_dir: PathBuf,
    pub force: bool,
    pub submission_number: Option<i64>,
}

/// Map a signed submission number onto an index into a history of `count`
/// attempts (oldest first).
///
/// `1..=count` counts from the oldest, `0` is the latest and `-k` is `k`
/// attempts before the latest, so the accepted range is `-(count-1)..=count`.
pub fn submission_index(number: i64, count: usize) -> Result<usize, CliError> {
    let n = i64::try_from(count).unwrap_or(i64::MAX);
    if count == 0 || number > n || number < -(n - 1) {
        let lowest = -(n - 1).max(0);
        return Err(CliError::UserInput(format!(
            "submission number must be between {lowest} and {n}, got {number}"
        )));
    }
    let index = if number >= 1 { number - 1 } else { n - 1 + number };
    // The range check above keeps `index` within 0..count.
    Ok(usize::try_from(index).unwrap_or(0))
}

/// `Submission 2 - 2024-03-01 10:00 - online_upload - 8/10 - report.pdf`
pub fn submission_label(position: usize, submission: &Submission, points_possible: Option<f64>) -> String {
    let mut label = format!("Submission {position}");
    if submission.submitted_at.is_some() {
        label.push_str(&format!(" - {}", short_datetime(submission.submitted_at)));
    }
    if let Some(kind) = &submission.submission_type {
        label.push_str(&format!(" - {kind}"));
    }
    if let (Some(score), Some(points)) = (submission.score, points_possible) {
        label.push_str(&format!(" - {score}/{points}"));
    }
    let names: Vec<&str> = submission
        .attachments
        .iter()
        .map(|a| a.display_name.as_deref().unwrap_or(&a.filename))
        .collect();
    if names.is_empty() {
        label.push_str(" - No Display Name");
    } else {
        label.push_str(&format!(" - {}", names.join(", ")));
    }
    label
}

/// Destination for an attachment inside `dir`, ignoring any directory part
/// the server put in the file name.
pub fn attachment_path(dir: &Path, attachment: &Attachment) -> PathBuf {
    let name = Path::new(&attachment.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "submission_file".into());
    dir.join(name)
}

/// An existing non-directory cannot be downloaded into.
pub fn check_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(CliError::UserInput(format!("'{}' is not a directory", dir.display())).into());
    }
    Ok(())
}

/// Create `dir` if needed; an existing non-directory is rejected.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    check_output_dir(dir)?;
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))
}

pub fn run(ctx: &mut AppContext, target: &TargetArgs, options: &PullOptions) -> Result<()> {
    let (course_id, assignment_id) = course_and_assignment(ctx, target)?;
    let api = ctx.api()?.clone();
    pull_submission(ctx, &api, (course_id, assignment_id), target.fallback, options)
}

/// Pick a submission and download its attachments. Nothing is written
/// until the submission is settled.
pub fn pull_submission(
    ctx: &AppContext,
    archive: &dyn SubmissionArchive,
    (course_id, assignment_id): (u64, u64),
    fallback: bool,
    options: &PullOptions,
) -> Result<()> {
    check_output_dir(&options.output_dir)?;

    let spinner = ui::spinner("Fetching submissions...", ctx.settings.quiet);
    let history = archive.submission_history(course_id, assignment_id);
    spinner.finish_and_clear();
    let history: Vec<Submission> = history?
        .into_iter()
        .filter(|s| s.submitted_at.is_some() || !s.attachments.is_empty())
        .collect();
    if history.is_empty() {
        anyhow::bail!("No submissions found for assignment {assignment_id} in course {course_id}.");
    }
    ctx.debug(format!(
        "Found {} submission(s) for assignment {assignment_id} in course {course_id}.",
        history.len()
    ));

    let index = match options.submission_number {
        Some(number) => submission_index(number, history.len())?,
        None if history.len() == 1 => 0,
        None => {
            let points = archive
                .points_possible(course_id, assignment_id)
                .unwrap_or_else(|err| {
                    tracing::debug!(%err, "assignment details unavailable for labels");
                    None
                });
            let labels: Vec<String> = history
                .iter()
                .enumerate()
                .map(|(i, s)| submission_label(i + 1, s, points))
                .collect();
            let pick = {
                let mut chooser = ctx.open_chooser(fallback)?;
                chooser.choose_option("Select a submission to download", &labels)?
            };
            match pick {
                Pick::Chosen(i) => i,
                _ => return Err(CliError::Cancelled.into()),
            }
        }
    };

    let submission = &history[index];
    if submission.attachments.is_empty() {
        ctx.echo(format!("Submission {} has no attachments.", index + 1));
        return Ok(());
    }

    prepare_output_dir(&options.output_dir)?;
    let mut downloaded = 0;
    for attachment in &submission.attachments {
        let dest = attachment_path(&options.output_dir, attachment);
        if dest.exists() && !options.force {
            let question = format!("{} already exists. Overwrite?", dest.display());
            if !ui::confirm(&question, false)? {
                ctx.echo(format!("Skipped {}", dest.display()));
                continue;
            }
        }
        let spinner = ui::spinner(format!("Downloading {}...", attachment.filename), ctx.settings.quiet);
        let bytes = archive.download(&attachment.url, &dest);
        spinner.finish_and_clear();
        let bytes = bytes?;
        ctx.debug(format!("Wrote {bytes} bytes to {}", dest.display()));
        downloaded += 1;
    }
    ctx.echo(format!(
        "Downloaded {downloaded} attachment(s) from submission {} to {}.",
        index + 1,
        options.output_dir.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn positive_numbers_count_from_the_oldest() {
        assert_eq!(submission_index(1, 3).unwrap(), 0);
        assert_eq!(submission_index(3, 3).unwrap(), 2);
    }

    #[test]
    fn zero_and_negatives_count_back_from_the_latest() {
        assert_eq!(submission_index(0, 3).unwrap(), 2);
        assert_eq!(submission_index(-1, 3).unwrap(), 1);
        assert_eq!(submission_index(-2, 3).unwrap(), 0);
        assert_eq!(submission_index(0, 1).unwrap(), 0);
    }

    #[test]
    fn out_of_range_numbers_are_user_errors() {
        for number in [4, -3, 100, -100] {
            let err = submission_index(number, 3).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
        assert!(submission_index(-1, 1).is_err());
        assert!(submission_index(0, 0).is_err());
        let message = submission_index(9, 3).unwrap_err().to_string();
        assert!(message.contains("between -2 and 3"));
    }

    #[test]
    fn labels_include_what_is_known() {
        let submission = Submission {
            submitted_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()),
            submission_type: Some("online_upload".into()),
            score: Some(8.0),
            attachments: vec![Attachment {
                filename: "report.pdf".into(),
                url: "https://x/files/1".into(),
                display_name: Some("Report.pdf".into()),
            }],
            ..Default::default()
        };
        let label = submission_label(2, &submission, Some(10.0));
        assert!(label.starts_with("Submission 2 - 2024-03-0"));
        assert!(label.ends_with(" - online_upload - 8/10 - Report.pdf"));

        let bare = submission_label(1, &Submission::default(), None);
        assert_eq!(bare, "Submission 1 - No Display Name");
    }

    #[test]
    fn attachment_names_cannot_escape_the_output_dir() {
        let dir = Path::new("/tmp/out");
        let sneaky = Attachment {
            filename: "../../etc/passwd".into(),
            url: String::new(),
            display_name: None,
        };
        assert_eq!(attachment_path(dir, &sneaky), dir.join("passwd"));
    }

    /// Two attempts with one attachment each; downloads write the url as content.
    struct FakeArchive;

    impl SubmissionArchive for FakeArchive {
        fn submission_history(&self, _: u64, _: u64) -> anyhow::Result<Vec<Submission>> {
            let attempt = |n: u32, name: &str| Submission {
                submitted_at: Some(Utc.with_ymd_and_hms(2024, 3, n, 12, 0, 0).unwrap()),
                attachments: vec![Attachment {
                    filename: name.into(),
                    url: format!("https://files/{name}"),
                    display_name: None,
                }],
                ..Default::default()
            };
            Ok(vec![attempt(1, "draft.pdf"), attempt(2, "final.pdf")])
        }

        fn points_possible(&self, _: u64, _: u64) -> anyhow::Result<Option<f64>> {
            Ok(Some(10.0))
        }

        fn download(&self, url: &str, dest: &Path) -> anyhow::Result<u64> {
            fs::write(dest, url)?;
            Ok(url.len() as u64)
        }
    }

    fn quiet_context(dir: &TempDir) -> AppContext {
        let store = crate::config::ConfigStore::new(
            dir.path().join("local.json"),
            dir.path().join("global.json"),
        );
        AppContext::new(
            crate::context::Settings {
                verbose: false,
                quiet: true,
            },
            store,
        )
    }

    fn options(output_dir: PathBuf, submission_number: i64) -> PullOptions {
        PullOptions {
            output_dir,
            force: false,
            submission_number: Some(submission_number),
        }
    }

    #[test]
    fn bad_submission_number_leaves_no_output_dir_behind() {
        let tmp = TempDir::new().unwrap();
        let ctx = quiet_context(&tmp);
        let out = tmp.path().join("newdir");
        let err = pull_submission(&ctx, &FakeArchive, (1, 2), true, &options(out.clone(), 99)).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 2);
        assert!(!out.exists());
    }

    #[test]
    fn latest_submission_is_downloaded_into_a_new_dir() {
        let tmp = TempDir::new().unwrap();
        let ctx = quiet_context(&tmp);
        let out = tmp.path().join("newdir");
        pull_submission(&ctx, &FakeArchive, (1, 2), true, &options(out.clone(), 0)).unwrap();
        assert_eq!(fs::read_to_string(out.join("final.pdf")).unwrap(), "https://files/final.pdf");
        assert!(!out.join("draft.pdf").exists());
    }

    #[test]
    fn output_dir_is_created_but_files_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        prepare_output_dir(&nested).unwrap();
        assert!(nested.is_dir());

        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = prepare_output_dir(&file).unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 2);
        assert!(check_output_dir(&file).is_err());
    }
}

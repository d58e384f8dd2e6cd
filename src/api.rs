// API client module: a small blocking HTTP client for the Canvas REST API.
// Every call is synchronous; the interactive screens simply wait for it.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::{multipart, Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::error::CliError;

/// Page size requested from list endpoints.
const PER_PAGE: &str = "100";

/// Course record as returned by `GET /courses`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub workflow_state: Option<String>,
    #[serde(default)]
    pub term: Option<Term>,
    #[serde(default)]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub account_id: Option<u64>,
}

impl Course {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(no name)")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Term {
    #[serde(default)]
    pub name: Option<String>,
}

/// Assignment record as returned by `GET /courses/:id/assignments`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    #[serde(default)]
    pub has_submitted_submissions: bool,
    #[serde(default)]
    pub submission_types: Vec<String>,
    #[serde(default)]
    pub workflow_state: Option<String>,
    /// Present when requested with `include[]=submission`.
    #[serde(default)]
    pub submission: Option<SubmissionState>,
}

impl Assignment {
    pub fn accepts_upload(&self) -> bool {
        self.submission_types.iter().any(|t| t == "online_upload")
    }

    pub fn is_graded(&self) -> bool {
        self.submission
            .as_ref()
            .and_then(|s| s.workflow_state.as_deref())
            == Some("graded")
    }
}

/// The caller's own submission state embedded in an assignment.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    #[serde(default)]
    pub workflow_state: Option<String>,
}

/// One attempt in a submission history.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Submission {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub attempt: Option<u64>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submission_type: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Conversation summary as returned by `GET /conversations`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub id: u64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workflow_state: Option<String>,
}

/// Body of `GET .../submissions/self?include[]=submission_history`.
#[derive(Deserialize, Debug, Default)]
struct SubmissionEnvelope {
    #[serde(default)]
    submission_history: Vec<Submission>,
}

/// Step-one response of the file upload protocol.
#[derive(Deserialize, Debug)]
struct UploadSession {
    upload_url: String,
    #[serde(default)]
    upload_params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct UploadedFile {
    id: u64,
}

/// The three steps of a file submission, reported as they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStep {
    RequestSession,
    UploadBytes,
    Submit,
}

impl UploadStep {
    pub fn label(self) -> &'static str {
        match self {
            UploadStep::RequestSession => "Step 1/3: Requesting upload session...",
            UploadStep::UploadBytes => "Step 2/3: Uploading file...",
            UploadStep::Submit => "Step 3/3: Submitting assignment...",
        }
    }
}

/// Read side of the API used by the selection workflows.
pub trait CourseCatalog {
    fn list_courses(&self) -> Result<Vec<Course>>;
    fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>>;
}

/// Submission side of the API used by `pull`.
pub trait SubmissionArchive {
    fn submission_history(&self, course_id: u64, assignment_id: u64) -> Result<Vec<Submission>>;
    fn points_possible(&self, course_id: u64, assignment_id: u64) -> Result<Option<f64>>;
    /// Write the file at `url` to `dest`, returning the byte count.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Blocking client holding the base URL and the bearer token headers.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `https://{host}/api/v1` authenticated with `token`.
    pub fn new(host: &str, token: &str) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}/api/v1")
        } else {
            format!("https://{host}/api/v1")
        };
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .context("Token contains characters not allowed in a header")?;
        headers.insert(AUTHORIZATION, bearer);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient { client, base_url })
    }

    /// Build a client from the `host` and `token` config keys.
    pub fn from_config(store: &ConfigStore) -> Result<Self> {
        let host = store
            .resolve("host", None)?
            .ok_or_else(|| CliError::MissingConfig("host (canvas config set --global host <host>)".into()))?;
        let token = store
            .resolve("token", None)?
            .ok_or_else(|| CliError::MissingConfig("token (canvas config set --global token <token>)".into()))?;
        tracing::debug!(%host, "creating API client");
        Self::new(&host, &token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a list endpoint and follow `Link: rel="next"` until exhausted.
    fn get_paginated<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let first = format!("{}{}", self.base_url, path);
        let mut res = self
            .client
            .get(&first)
            .query(query)
            .query(&[("per_page", PER_PAGE)])
            .send()
            .with_context(|| format!("Failed to send request to {first}"))?;
        loop {
            let res_checked = check(res, "Request")?;
            let next = next_link(res_checked.headers());
            let page: Vec<T> = res_checked.json().context("Parsing list response json")?;
            out.extend(page);
            match next {
                Some(url) => {
                    tracing::debug!(%url, "following pagination link");
                    res = self
                        .client
                        .get(&url)
                        .send()
                        .with_context(|| format!("Failed to send request to {url}"))?;
                }
                None => break,
            }
        }
        Ok(out)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("Failed to send request to {url}"))?;
        check(res, "Request")?.json().context("Parsing response json")
    }

    /// Details of a single assignment, including its HTML description.
    pub fn get_assignment(&self, course_id: u64, assignment_id: u64) -> Result<Assignment> {
        self.get_json(
            &format!("/courses/{course_id}/assignments/{assignment_id}"),
            &[],
        )
    }

    /// Submission attempts of the current user, oldest first.
    pub fn fetch_submission_history(&self, course_id: u64, assignment_id: u64) -> Result<Vec<Submission>> {
        let envelope: SubmissionEnvelope = self.get_json(
            &format!("/courses/{course_id}/assignments/{assignment_id}/submissions/self"),
            &[("include[]", "submission_history")],
        )?;
        Ok(envelope.submission_history)
    }

    pub fn unread_conversations(&self) -> Result<Vec<Conversation>> {
        self.get_paginated("/conversations", &[("scope", "unread")])
    }

    /// Submit `file_path` to an assignment using the three-step upload flow.
    ///
    /// `on_step` is called before each step starts. A failure after step one
    /// leaves the upload session behind on the server.
    pub fn upload_and_submit(
        &self,
        course_id: u64,
        assignment_id: u64,
        file_path: &Path,
        mut on_step: impl FnMut(UploadStep),
    ) -> Result<()> {
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("submission")
            .to_string();
        let size = std::fs::metadata(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?
            .len();

        on_step(UploadStep::RequestSession);
        let session_url = format!(
            "{}/courses/{course_id}/assignments/{assignment_id}/submissions/self/files",
            self.base_url
        );
        let res = self
            .client
            .post(&session_url)
            .json(&serde_json::json!({
                "name": file_name,
                "size": size,
                "content_type": "application/octet-stream",
                "on_duplicate": "overwrite",
            }))
            .send()
            .context("Failed to request upload session")?;
        let session: UploadSession = check(res, "Upload session")?
            .json()
            .context("Parsing upload session json")?;

        on_step(UploadStep::UploadBytes);
        let mut form = multipart::Form::new();
        for (key, value) in session.upload_params {
            form = form.text(key, crate::config::display_value(&value));
        }
        let file = File::open(file_path).context("Failed to open submission file")?;
        let part = multipart::Part::reader(file).file_name(file_name);
        form = form.part("file", part);
        // The upload URL is pre-signed; it must not receive our bearer token.
        let res = Client::new()
            .post(&session.upload_url)
            .multipart(form)
            .send()
            .context("Failed to upload file")?;
        let uploaded: UploadedFile = check(res, "Upload")?
            .json()
            .context("Parsing upload response json")?;

        on_step(UploadStep::Submit);
        let submit_url = format!(
            "{}/courses/{course_id}/assignments/{assignment_id}/submissions",
            self.base_url
        );
        let res = self
            .client
            .post(&submit_url)
            .json(&serde_json::json!({
                "submission": {
                    "submission_type": "online_upload",
                    "file_ids": [uploaded.id],
                }
            }))
            .send()
            .context("Failed to submit assignment")?;
        check(res, "Submit")?;
        tracing::info!(course_id, assignment_id, file_id = uploaded.id, "assignment submitted");
        Ok(())
    }

    /// Stream `url` into `dest`. Existence checks and overwrite prompts are
    /// the caller's job.
    pub fn download_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let res = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download {url}"))?;
        let mut res = check(res, "Download")?;
        let mut file = File::create(dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let written = res
            .copy_to(&mut file)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        tracing::debug!(%url, dest = %dest.display(), bytes = written, "downloaded");
        Ok(written)
    }
}

impl CourseCatalog for ApiClient {
    fn list_courses(&self) -> Result<Vec<Course>> {
        self.get_paginated(
            "/courses",
            &[("include[]", "favorites"), ("include[]", "term")],
        )
    }

    fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>> {
        self.get_paginated(
            &format!("/courses/{course_id}/assignments"),
            &[("include[]", "submission")],
        )
    }
}

impl SubmissionArchive for ApiClient {
    fn submission_history(&self, course_id: u64, assignment_id: u64) -> Result<Vec<Submission>> {
        self.fetch_submission_history(course_id, assignment_id)
    }

    fn points_possible(&self, course_id: u64, assignment_id: u64) -> Result<Option<f64>> {
        Ok(self.get_assignment(course_id, assignment_id)?.points_possible)
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.download_file(url, dest)
    }
}

/// Turn a non-2xx response into an error carrying the body text.
fn check(res: Response, what: &str) -> Result<Response> {
    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().unwrap_or_default();
        anyhow::bail!("{what} failed: {status} - {txt}");
    }
    Ok(res)
}

fn next_link(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(LINK)?.to_str().ok()?;
    parse_next_link(raw)
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header.
fn parse_next_link(raw: &str) -> Option<String> {
    raw.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if is_next {
            Some(target.trim_start_matches('<').trim_end_matches('>').to_string())
        } else {
            None
        }
    })
}

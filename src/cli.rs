use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "canvas",
    version,
    about = "Configure, browse, submit and download Canvas LMS assignments"
)]
pub struct Cli {
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read and write configuration values
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Write a local configuration for the current directory
    Init {
        #[command(flatten)]
        target: TargetArgs,

        /// Default file to submit
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Readable course name to store
        #[arg(long, value_name = "NAME")]
        course_name: Option<String>,

        /// Readable assignment name to store
        #[arg(long, value_name = "NAME")]
        assignment_name: Option<String>,
    },

    /// Submit a file to an assignment
    Push {
        #[command(flatten)]
        target: TargetArgs,

        /// File to submit (default: the `file` config value)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },

    /// Download the attachments of one of your submissions
    Pull {
        #[command(flatten)]
        target: TargetArgs,

        /// Directory to download into
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,

        /// Overwrite existing files without asking
        #[arg(short, long)]
        force: bool,

        /// Which submission: 1..=n from the oldest, 0 for the latest, -k for k before the latest
        #[arg(short = 'n', long, value_name = "N", allow_negative_numbers = true)]
        submission_number: Option<i64>,
    },

    /// Save an assignment's description as an HTML file
    Clone {
        #[command(flatten)]
        target: TargetArgs,

        /// Output file (default: assignment_<id>.html)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Show an assignment, the assignments of a course, or all courses
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Print the result as JSON
        #[arg(short, long, global = true)]
        json: bool,

        #[command(subcommand)]
        view: Option<StatusView>,
    },
}

/// Views of `status` that are not tied to one course.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusView {
    /// Summary of every enrolled course
    All {
        /// Also list unread conversations
        #[arg(short, long)]
        messages: bool,
    },
}

/// Which course and assignment a command acts on.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[arg(long, value_name = "ID")]
    pub course_id: Option<u64>,

    #[arg(long, value_name = "ID")]
    pub assignment_id: Option<u64>,

    /// Pick the course and assignment interactively
    #[arg(long)]
    pub tui: bool,

    /// Use line prompts instead of the full-screen chooser
    #[arg(long)]
    pub fallback: bool,
}

impl TargetArgs {
    /// `--fallback` alone also asks for the interactive picker.
    pub fn interactive(&self) -> bool {
        self.tui || self.fallback
    }
}

/// `--global` / `--local` pair shared by the config subcommands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ScopeArgs {
    /// Use the global file in the home directory
    #[arg(long)]
    pub global: bool,

    /// Use the local file in the current directory
    #[arg(long)]
    pub local: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print a value (cascading local over global unless a scope is given)
    Get {
        key: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Set a value (local scope unless --global)
    Set {
        key: String,
        value: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Remove a value (local scope unless --global)
    Unset {
        key: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List values
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Show the file each value comes from
        #[arg(long)]
        show_origin: bool,

        /// Show the scope each value comes from
        #[arg(long)]
        show_scope: bool,

        /// Show only the keys
        #[arg(long)]
        name_only: bool,
    },

    /// Choose the interactive mode and icon style (global scope unless --local)
    Tui {
        #[command(flatten)]
        scope: ScopeArgs,
    },
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::types::EntryPatch;

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    /// Directory holding the stored entries (overrides settings.json)
    #[arg(long, global = true, env = "DOJO_GOALS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to settings.json
    #[arg(long, global = true, env = "DOJO_GOALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List entries, newest first
    List {
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a new entry
    Add(AddArgs),
    /// Change fields of an existing entry
    Update(UpdateArgs),
    /// Add to (or subtract from) an entry's koin counter
    Koin {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Delete one entry
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Delete every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export entries as CSV
    Export {
        /// Output file (defaults to goal-entries-<today>.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Print the one-line summary for an entry
    Copy { id: String },
    /// Show entry totals
    Stats,
    /// Show the suggested goals for a project status
    Goals { status: String },
    /// List known project statuses
    Projects {
        /// Only show statuses containing this text
        query: Option<String>,
    },
    /// Manage the remembered sensei name
    #[command(subcommand)]
    Sensei(SenseiCommand),
    /// Show or edit settings.json
    Config {
        /// Edit the settings interactively
        #[arg(long)]
        edit: bool,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SenseiCommand {
    /// Remember the sensei name for the next 24 hours
    Set { name: String },
    /// Show the remembered name and whether it expired
    Show,
    /// Forget the remembered name
    Clear,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Ninja (student) name
    #[arg(long)]
    pub ninja: String,

    /// Project status, e.g. "Orange Belt: Level 1 | Hello World!"
    #[arg(long)]
    pub project: String,

    /// Sensei name (defaults to the remembered one)
    #[arg(long)]
    pub sensei: Option<String>,

    /// Session date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// First goal (defaults to the catalog suggestion)
    #[arg(long)]
    pub goal1: Option<String>,

    /// Second goal (defaults to the catalog suggestion)
    #[arg(long)]
    pub goal2: Option<String>,

    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub koin: i64,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub sensei: Option<String>,
    #[arg(long)]
    pub ninja: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub goal1: Option<String>,
    #[arg(long)]
    pub goal2: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub koin: Option<i64>,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> EntryPatch {
        EntryPatch {
            date: self.date.clone(),
            sensei_name: self.sensei.clone(),
            ninja_name: self.ninja.clone(),
            current_project: self.project.clone(),
            description: self.description.clone(),
            goal1: self.goal1.clone(),
            goal2: self.goal2.clone(),
            koin: self.koin,
        }
    }
}

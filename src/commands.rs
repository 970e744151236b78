//! Command handlers behind the CLI.
//!
//! Each handler writes its user-facing output to `out`. Validation and the
//! sensei-expiry gate live here, in front of the entry store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Duration, Local};
use colored::Colorize;
use dialoguer::{Confirm, Input};
use tracing::info;

use crate::cli::{AddArgs, Cli, Command, SenseiCommand, UpdateArgs};
use crate::config::{self, Settings};
use crate::entries::EntryStore;
use crate::error::{ServiceError, ServiceResult};
use crate::export::{EntryStats, export_file_name, summary_line, to_csv};
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::project_status::{ProjectStatus, SuggestedGoals, suggested_goals};
use crate::sensei::{SenseiRegistry, SenseiStatus};
use crate::storage::{FileStore, KeyValueStore};
use crate::types::{EntryDraft, GoalEntry};
use crate::validation::{DATE_FORMAT, validate_draft};

pub struct App<S> {
    entries: EntryStore<S>,
    sensei: SenseiRegistry<S>,
    settings: Settings,
    settings_path: PathBuf,
}

impl App<FileStore> {
    /// Resolve settings and open the on-disk store.
    pub fn open(cli: &Cli) -> ServiceResult<Self> {
        let settings_path = match &cli.config {
            Some(path) => path.clone(),
            None => config::default_config_path()?,
        };
        let settings = Settings::load(&settings_path)?;
        let data_dir = settings.resolve_data_dir(cli.data_dir.as_deref())?;
        info!(data_dir = %data_dir.display(), "opening store");

        let backend = FileStore::new(data_dir);
        Ok(Self::new(backend.clone(), backend, settings, settings_path))
    }
}

impl<S: KeyValueStore> App<S> {
    pub fn new(entries: S, sensei: S, settings: Settings, settings_path: PathBuf) -> Self {
        let ttl = Duration::try_hours(settings.sensei_ttl_hours).unwrap_or(Duration::MAX);
        Self {
            entries: EntryStore::new(entries),
            sensei: SenseiRegistry::with_ttl(sensei, ttl),
            settings,
            settings_path,
        }
    }

    pub fn entries(&self) -> &EntryStore<S> {
        &self.entries
    }

    pub fn run(&mut self, command: Command, out: &mut impl Write) -> ServiceResult<()> {
        match command {
            Command::List { json } => self.list(json, out),
            Command::Add(args) => self.add(args, out),
            Command::Update(args) => self.update(args, out),
            Command::Koin { id, delta } => self.koin(&id, delta, out),
            Command::Delete { id, yes } => self.delete(&id, yes, out),
            Command::Clear { yes } => self.clear(yes, out),
            Command::Export { output, stdout } => self.export(output, stdout, out),
            Command::Copy { id } => self.copy(&id, out),
            Command::Stats => self.stats(out),
            Command::Goals { status } => goals(&status, out),
            Command::Projects { query } => projects(query.as_deref(), out),
            Command::Sensei(cmd) => self.sensei(cmd, out),
            Command::Config { edit } => self.config(edit, out),
            Command::Version => {
                writeln!(out, "{PKG_NAME} {PKG_VERSION}")?;
                Ok(())
            }
        }
    }

    fn list(&self, json: bool, out: &mut impl Write) -> ServiceResult<()> {
        let entries = self.entries.list();
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
            return Ok(());
        }
        if entries.is_empty() {
            writeln!(out, "No entries yet.")?;
            return Ok(());
        }
        for entry in &entries {
            write_entry(entry, out)?;
        }
        Ok(())
    }

    fn add(&self, args: AddArgs, out: &mut impl Write) -> ServiceResult<()> {
        let sensei_name = match args.sensei {
            Some(name) => name,
            None => match self.sensei.current() {
                SenseiStatus::Active(name) => name,
                SenseiStatus::Expired(name) => return Err(ServiceError::SenseiExpired(name)),
                SenseiStatus::Missing => return Err(ServiceError::SenseiMissing),
            },
        };

        let suggested = suggested_goals(&args.project);
        if suggested == SuggestedGoals::Manual && (args.goal1.is_none() || args.goal2.is_none()) {
            notice(out, "Unknown project status, goals must be entered manually")?;
        }
        let pair = suggested.into_pair();

        let draft = EntryDraft {
            date: args
                .date
                .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string()),
            sensei_name,
            ninja_name: args.ninja,
            current_project: args.project,
            description: args.description,
            goal1: args.goal1.unwrap_or(pair.goal1),
            goal2: args.goal2.unwrap_or(pair.goal2),
            koin: args.koin,
        };
        validate_draft(&draft)?;

        let entry = self.entries.create(draft)?;
        info!(id = %entry.id, "goal entry created");
        success(out, "Goal entry created successfully")?;
        write_entry(&entry, out)?;
        Ok(())
    }

    fn update(&self, args: UpdateArgs, out: &mut impl Write) -> ServiceResult<()> {
        let patch = args.to_patch();
        if patch.is_empty() {
            notice(out, "Nothing to update")?;
            return Ok(());
        }
        match self.entries.update(&args.id, &patch)? {
            Some(entry) => {
                success(out, "Goal entry updated")?;
                write_entry(&entry, out)?;
            }
            None => notice(out, &format!("No entry with id {}", args.id))?,
        }
        Ok(())
    }

    fn koin(&self, id: &str, delta: i64, out: &mut impl Write) -> ServiceResult<()> {
        match self.entries.adjust_koin(id, delta)? {
            Some(entry) => success(out, &format!("{} now has {} koin", entry.ninja_name, entry.koin))?,
            None => notice(out, &format!("No entry with id {id}"))?,
        }
        Ok(())
    }

    fn delete(&self, id: &str, yes: bool, out: &mut impl Write) -> ServiceResult<()> {
        let Some(entry) = self.entries.get(id) else {
            notice(out, &format!("No entry with id {id}"))?;
            return Ok(());
        };
        if !yes && !confirm("Are you sure you want to delete this entry?")? {
            return Ok(());
        }
        self.entries.delete(&entry.id)?;
        success(out, "Goal entry deleted successfully")?;
        Ok(())
    }

    fn clear(&self, yes: bool, out: &mut impl Write) -> ServiceResult<()> {
        if self.entries.list().is_empty() {
            notice(out, "No entries to clear")?;
            return Ok(());
        }
        if !yes
            && !confirm("Are you sure you want to clear all entries? This action cannot be undone.")?
        {
            return Ok(());
        }
        self.entries.clear()?;
        success(out, "All entries cleared successfully")?;
        Ok(())
    }

    fn export(
        &self,
        output: Option<PathBuf>,
        stdout: bool,
        out: &mut impl Write,
    ) -> ServiceResult<()> {
        let entries = self.entries.list();
        if entries.is_empty() {
            notice(out, "No entries to export")?;
            return Ok(());
        }
        let csv = to_csv(&entries, self.settings.export_koin)?;
        if stdout {
            writeln!(out, "{csv}")?;
            return Ok(());
        }
        let path = output
            .unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
        fs::write(&path, csv)?;
        success(out, &format!("Data exported to {}", path.display()))?;
        Ok(())
    }

    fn copy(&self, id: &str, out: &mut impl Write) -> ServiceResult<()> {
        match self.entries.get(id) {
            Some(entry) => writeln!(out, "{}", summary_line(&entry))?,
            None => notice(out, &format!("No entry with id {id}"))?,
        }
        Ok(())
    }

    fn stats(&self, out: &mut impl Write) -> ServiceResult<()> {
        let stats = EntryStats::from_entries(&self.entries.list());
        writeln!(out, "Total Entries:      {}", stats.total)?;
        writeln!(out, "Completed Projects: {}", stats.completed)?;
        writeln!(out, "In Progress:        {}", stats.in_progress)?;
        Ok(())
    }

    fn sensei(&self, cmd: SenseiCommand, out: &mut impl Write) -> ServiceResult<()> {
        match cmd {
            SenseiCommand::Set { name } => {
                if name.trim().is_empty() {
                    return Err(ServiceError::Other("Sensei name cannot be empty".to_string()));
                }
                let setting = self.sensei.set(&name)?;
                success(
                    out,
                    &format!(
                        "Sensei set to {} for {}h",
                        setting.name, self.settings.sensei_ttl_hours
                    ),
                )?;
            }
            SenseiCommand::Show => match self.sensei.current() {
                SenseiStatus::Active(name) => writeln!(out, "{name}")?,
                SenseiStatus::Expired(name) => writeln!(out, "{name} {}", "(expired)".yellow())?,
                SenseiStatus::Missing => notice(out, "No sensei name set")?,
            },
            SenseiCommand::Clear => {
                self.sensei.clear()?;
                success(out, "Sensei name cleared")?;
            }
        }
        Ok(())
    }

    fn config(&mut self, edit: bool, out: &mut impl Write) -> ServiceResult<()> {
        if edit {
            self.settings = edit_settings(&self.settings)?;
            self.settings.save(&self.settings_path)?;
            success(out, &format!("Saved {}", self.settings_path.display()))?;
        }
        writeln!(out, "# {}", self.settings_path.display())?;
        writeln!(out, "{}", serde_json::to_string_pretty(&self.settings)?)?;
        Ok(())
    }
}

fn goals(status: &str, out: &mut impl Write) -> ServiceResult<()> {
    match suggested_goals(status) {
        SuggestedGoals::Catalog(pair) => {
            writeln!(out, "Goal 1: {}", pair.goal1)?;
            writeln!(out, "Goal 2: {}", pair.goal2)?;
        }
        SuggestedGoals::Manual => notice(out, "Unknown project status, enter goals manually")?,
    }
    Ok(())
}

fn projects(query: Option<&str>, out: &mut impl Write) -> ServiceResult<()> {
    let statuses = match query {
        Some(q) => ProjectStatus::search(q),
        None => ProjectStatus::all().collect(),
    };
    for status in statuses {
        writeln!(out, "{status}")?;
    }
    Ok(())
}

fn write_entry(entry: &GoalEntry, out: &mut impl Write) -> ServiceResult<()> {
    writeln!(
        out,
        "{}  {}  {} with {}",
        entry.id.dimmed(),
        entry.date,
        entry.ninja_name.bold(),
        entry.sensei_name
    )?;
    writeln!(out, "    Project: {}", entry.current_project)?;
    if !entry.description.is_empty() {
        writeln!(out, "    {}", entry.description)?;
    }
    writeln!(out, "    Goal 1: {}", entry.goal1)?;
    writeln!(out, "    Goal 2: {}", entry.goal2)?;
    writeln!(out, "    Koin: {}", entry.koin)?;
    Ok(())
}

fn success(out: &mut impl Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {message}", "✓".green())
}

fn notice(out: &mut impl Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {message}", "!".yellow())
}

fn confirm(prompt: &str) -> ServiceResult<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn edit_settings(current: &Settings) -> ServiceResult<Settings> {
    let data_dir: String = Input::new()
        .with_prompt("Data directory (empty for platform default)")
        .default(
            current
                .data_dir
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;
    let export_koin = Confirm::new()
        .with_prompt("Include Koin column in CSV exports?")
        .default(current.export_koin)
        .interact()?;
    let sensei_ttl_hours: i64 = Input::new()
        .with_prompt("Hours before the sensei name expires")
        .default(current.sensei_ttl_hours)
        .validate_with(|v: &i64| {
            if *v > 0 {
                Ok(())
            } else {
                Err("must be positive")
            }
        })
        .interact_text()?;

    Ok(Settings {
        data_dir: (!data_dir.trim().is_empty()).then(|| Path::new(data_dir.trim()).to_path_buf()),
        export_koin,
        sensei_ttl_hours,
    })
}

//! Curriculum catalog: project status labels and their suggested next goals.
//!
//! Labels look like `"White Belt: Level 1 | Your First Sprite"`; the
//! `"Half of ..."` variant marks a project that is half done. The table is
//! compiled into the binary from `data/project_status.json`.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

pub const HALF_WAY_PREFIX: &str = "Half of ";

const CATALOG_JSON: &str = include_str!("../data/project_status.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPair {
    pub goal1: String,
    pub goal2: String,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    status: String,
    goal1: String,
    goal2: String,
}

struct Catalog {
    rows: Vec<CatalogRow>,
    index: HashMap<String, usize>,
}

fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        // The file is part of the source tree and covered by tests.
        let rows: Vec<CatalogRow> = serde_json::from_str(CATALOG_JSON).unwrap_or_else(|e| {
            tracing::error!(error = %e, "embedded project status catalog is invalid");
            Vec::new()
        });
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.status.clone(), i))
            .collect();
        Catalog { rows, index }
    })
}

/// A label known to the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectStatus(usize);

impl ProjectStatus {
    /// Look up an exact label.
    pub fn parse(label: &str) -> Option<Self> {
        catalog().index.get(label).copied().map(Self)
    }

    /// Every status in curriculum order.
    pub fn all() -> impl Iterator<Item = ProjectStatus> {
        (0..catalog().rows.len()).map(Self)
    }

    /// Case-insensitive substring match over labels.
    pub fn search(query: &str) -> Vec<ProjectStatus> {
        let needle = query.trim().to_lowercase();
        Self::all()
            .filter(|s| s.label().to_lowercase().contains(&needle))
            .collect()
    }

    pub fn label(self) -> &'static str {
        &catalog().rows[self.0].status
    }

    pub fn goals(self) -> GoalPair {
        let row = &catalog().rows[self.0];
        GoalPair {
            goal1: row.goal1.clone(),
            goal2: row.goal2.clone(),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of asking the catalog what a ninja should do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestedGoals {
    Catalog(GoalPair),
    /// Label not in the catalog; the sensei writes the goals by hand.
    Manual,
}

impl SuggestedGoals {
    /// The goal pair, with empty strings for the manual case.
    pub fn into_pair(self) -> GoalPair {
        match self {
            SuggestedGoals::Catalog(pair) => pair,
            SuggestedGoals::Manual => GoalPair {
                goal1: String::new(),
                goal2: String::new(),
            },
        }
    }
}

pub fn suggested_goals(label: &str) -> SuggestedGoals {
    match ProjectStatus::parse(label) {
        Some(status) => SuggestedGoals::Catalog(status.goals()),
        None => SuggestedGoals::Manual,
    }
}

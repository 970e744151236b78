use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Read `null` or a missing field as the type's default. Older stores leave
/// `createdAt` and `koin` unset.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One persisted progress record for a ninja.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntry {
    pub id: String,
    pub date: String,
    pub sensei_name: String,
    pub ninja_name: String,
    pub current_project: String,
    pub description: String,
    pub goal1: String,
    pub goal2: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub koin: i64,
    /// Unix epoch when the stored record carries no timestamp.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: DateTime<Utc>,
}

impl GoalEntry {
    pub fn from_draft(draft: EntryDraft, id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            date: draft.date,
            sensei_name: draft.sensei_name,
            ninja_name: draft.ninja_name,
            current_project: draft.current_project,
            description: draft.description,
            goal1: draft.goal1,
            goal2: draft.goal2,
            koin: draft.koin,
            created_at,
        }
    }

    /// `true` when the project label marks a half-finished project.
    pub fn is_in_progress(&self) -> bool {
        self.current_project.starts_with(crate::project_status::HALF_WAY_PREFIX)
    }
}

/// A goal entry before the store assigns its id and creation time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub date: String,
    pub sensei_name: String,
    pub ninja_name: String,
    pub current_project: String,
    pub description: String,
    pub goal1: String,
    pub goal2: String,
    #[serde(default)]
    pub koin: i64,
}

/// Partial update for an existing entry. `None` leaves the field untouched.
///
/// The id and creation timestamp have no patch field, so a merge can never
/// rewrite them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensei_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ninja_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub koin: Option<i64>,
}

impl EntryPatch {
    pub fn koin(value: i64) -> Self {
        Self {
            koin: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the present fields into `entry`.
    pub fn apply_to(&self, entry: &mut GoalEntry) {
        fn merge(slot: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                slot.clone_from(v);
            }
        }

        merge(&mut entry.date, &self.date);
        merge(&mut entry.sensei_name, &self.sensei_name);
        merge(&mut entry.ninja_name, &self.ninja_name);
        merge(&mut entry.current_project, &self.current_project);
        merge(&mut entry.description, &self.description);
        merge(&mut entry.goal1, &self.goal1);
        merge(&mut entry.goal2, &self.goal2);
        if let Some(koin) = self.koin {
            entry.koin = koin;
        }
    }
}

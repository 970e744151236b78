use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::EntryDraft;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Date,
    SenseiName,
    NinjaName,
    CurrentProject,
    Description,
    Goal1,
    Goal2,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Date => "date",
            Field::SenseiName => "sensei name",
            Field::NinjaName => "ninja name",
            Field::CurrentProject => "current project",
            Field::Description => "description",
            Field::Goal1 => "goal 1",
            Field::Goal2 => "goal 2",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields (missing: {})", join(.0))]
    MissingFields(Vec<Field>),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

fn join(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a draft before it is handed to the entry store.
pub fn validate_draft(draft: &EntryDraft) -> Result<(), ValidationError> {
    let required = [
        (Field::Date, &draft.date),
        (Field::SenseiName, &draft.sensei_name),
        (Field::NinjaName, &draft.ninja_name),
        (Field::CurrentProject, &draft.current_project),
        (Field::Description, &draft.description),
        (Field::Goal1, &draft.goal1),
        (Field::Goal2, &draft.goal2),
    ];
    let missing: Vec<Field> = required
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    NaiveDate::parse_from_str(draft.date.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(draft.date.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> EntryDraft {
        EntryDraft {
            date: "2025-01-10".to_string(),
            sensei_name: "Joshua".to_string(),
            ninja_name: "Logan".to_string(),
            current_project: "Orange Belt: Level 1 | Hello World!".to_string(),
            description: "Intro done".to_string(),
            goal1: "a".to_string(),
            goal2: "b".to_string(),
            koin: 0,
        }
    }

    #[test]
    fn complete_draft_passes() {
        assert_eq!(validate_draft(&complete()), Ok(()));
    }

    #[test]
    fn reports_every_missing_field() {
        let draft = EntryDraft {
            ninja_name: "   ".to_string(),
            goal2: String::new(),
            ..complete()
        };
        assert_eq!(
            validate_draft(&draft),
            Err(ValidationError::MissingFields(vec![Field::NinjaName, Field::Goal2]))
        );
    }

    #[test]
    fn message_lists_fields() {
        let err = validate_draft(&EntryDraft::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields (missing: date, sensei name, ninja name, \
             current project, description, goal 1, goal 2)"
        );
    }

    #[test]
    fn rejects_malformed_date() {
        let draft = EntryDraft {
            date: "10/01/2025".to_string(),
            ..complete()
        };
        assert_eq!(
            validate_draft(&draft),
            Err(ValidationError::InvalidDate("10/01/2025".to_string()))
        );
    }

    #[test]
    fn koin_is_not_bounded() {
        let draft = EntryDraft {
            koin: i64::MIN,
            ..complete()
        };
        assert!(validate_draft(&draft).is_ok());
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::days::{day_markers, group_by_day};
use super::domain::{parse_day_label, DaySpecialMap, NamedSpecial, NamedSpecialDraft};
use super::repository::{NewSpecial, RepositoryError, SpecialRecord, SpecialsRepository};

/// Result of grouping OCR lines, with lines that named more than one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroupingReport {
    pub days: DaySpecialMap,
    pub ambiguous_lines: Vec<String>,
}

/// Review-then-persist workflow over a specials repository.
pub struct SpecialsService<R> {
    repository: Arc<R>,
}

impl<R> SpecialsService<R>
where
    R: SpecialsRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Suggest a name for a block of OCR text; the caller decides the final one.
    pub fn draft(&self, text: &str) -> NamedSpecialDraft {
        NamedSpecialDraft::from_text(text)
    }

    pub fn group_days<S: AsRef<str>>(&self, lines: &[S]) -> DayGroupingReport {
        let ambiguous_lines: Vec<String> = lines
            .iter()
            .map(|line| line.as_ref().trim())
            .filter(|line| day_markers(line).len() > 1)
            .map(str::to_string)
            .collect();

        for line in &ambiguous_lines {
            warn!(%line, "line names several days; first weekday in calendar order wins");
        }

        DayGroupingReport {
            days: group_by_day(lines),
            ambiguous_lines,
        }
    }

    /// Persist a reviewed named special. Both fields must be non-blank.
    pub fn save_named(&self, special: NamedSpecial) -> Result<SpecialRecord, SpecialsServiceError> {
        let name = required("restaurant name", &special.name)?;
        if special.details.trim().is_empty() {
            return Err(SpecialsServiceError::MissingField("special details"));
        }

        let record = self.repository.append(NewSpecial {
            restaurant_name: name,
            special_details: special.details,
            day: None,
        })?;
        info!(id = record.id.0, restaurant = %record.restaurant_name, "special saved");
        Ok(record)
    }

    /// Persist reviewed `(day, description)` pairs, one record each, in order.
    /// Each weekday may appear once; the batch is stored whole or not at all.
    pub fn save_days<I>(
        &self,
        restaurant_name: &str,
        pairs: I,
    ) -> Result<Vec<SpecialRecord>, SpecialsServiceError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let name = required("restaurant name", restaurant_name)?;

        let mut seen = HashSet::new();
        let mut specials = Vec::new();
        for (label, description) in pairs {
            let Some(day) = parse_day_label(&label) else {
                return Err(SpecialsServiceError::UnknownDay(label));
            };
            if !seen.insert(day) {
                return Err(SpecialsServiceError::DuplicateDay(label));
            }
            specials.push(NewSpecial {
                restaurant_name: name.clone(),
                special_details: description,
                day: Some(day),
            });
        }

        if specials.is_empty() {
            return Err(SpecialsServiceError::NothingRecognized);
        }

        let records = self.repository.append_all(specials)?;
        info!(restaurant = %name, count = records.len(), "day specials saved");
        Ok(records)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, SpecialsServiceError> {
        Ok(self.repository.recent(limit)?)
    }
}

fn required(field: &'static str, value: &str) -> Result<String, SpecialsServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(SpecialsServiceError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Error raised by the specials service.
#[derive(Debug, thiserror::Error)]
pub enum SpecialsServiceError {
    #[error("please provide the {0}")]
    MissingField(&'static str),
    #[error("no day specials were recognized")]
    NothingRecognized,
    #[error("'{0}' is not a day of the week")]
    UnknownDay(String),
    #[error("'{0}' appears more than once")]
    DuplicateDay(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SpecialsServiceError {
    /// True when the caller sent something that can be fixed and resubmitted.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SpecialsServiceError::Repository(_))
    }
}

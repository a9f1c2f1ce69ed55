use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use super::domain::day_label;

/// Identifier assigned by the store on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecialId(pub u64);

/// Reviewed special handed to the store. Named specials carry no day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSpecial {
    pub restaurant_name: String,
    pub special_details: String,
    pub day: Option<Weekday>,
}

/// Stored special with store-assigned identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRecord {
    pub id: SpecialId,
    pub restaurant_name: String,
    pub special_details: String,
    pub day: Option<Weekday>,
    pub date_added: NaiveDateTime,
}

impl SpecialRecord {
    pub fn from_new(id: SpecialId, special: NewSpecial, date_added: NaiveDateTime) -> Self {
        Self {
            id,
            restaurant_name: special.restaurant_name,
            special_details: special.special_details,
            day: special.day,
            date_added,
        }
    }

    pub fn view(&self) -> SpecialRecordView {
        SpecialRecordView {
            id: self.id,
            restaurant_name: self.restaurant_name.clone(),
            special_details: self.special_details.clone(),
            day: self.day.map(day_label),
            date_added: self.date_added,
        }
    }
}

/// Newest first, ties broken by the later id.
pub(crate) fn newest_first(records: &mut [SpecialRecord]) {
    records.sort_by(|a, b| {
        b.date_added
            .cmp(&a.date_added)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Append-only sink for reviewed specials.
pub trait SpecialsRepository: Send + Sync {
    fn append(&self, special: NewSpecial) -> Result<SpecialRecord, RepositoryError>;
    /// Stores the whole batch or nothing.
    fn append_all(&self, specials: Vec<NewSpecial>) -> Result<Vec<SpecialRecord>, RepositoryError>;
    fn recent(&self, limit: usize) -> Result<Vec<SpecialRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("specials store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("specials store holds invalid data: {0}")]
    Csv(#[from] csv::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Serialized shape of a stored special.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialRecordView {
    pub id: SpecialId,
    pub restaurant_name: String,
    pub special_details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<&'static str>,
    pub date_added: NaiveDateTime,
}

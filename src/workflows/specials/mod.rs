//! Normalization of OCR text from restaurant menus and signs.
//!
//! Two independent paths share this module: [`extract_name`] infers a display
//! name from a block of text, and [`group_by_day`] partitions a line sequence
//! into per-weekday specials. Both are pure; persistence sits behind
//! [`SpecialsRepository`] and is driven by [`SpecialsService`].

pub mod days;
pub mod domain;
pub mod name;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use days::{day_markers, detect_day, group_by_day, DayGrouping, LINE_SEPARATOR};
pub use domain::{
    day_label, parse_day_label, DaySpecial, DaySpecialMap, NamedSpecial, NamedSpecialDraft,
    RawText, CANONICAL_DAYS,
};
pub use name::{extract_name, UNKNOWN_RESTAURANT};
pub use repository::{
    NewSpecial, RepositoryError, SpecialId, SpecialRecord, SpecialRecordView, SpecialsRepository,
};
pub use router::specials_router;
pub use service::{DayGroupingReport, SpecialsService, SpecialsServiceError};
pub use store::{ConfiguredRepository, CsvSpecialsRepository, InMemorySpecialsRepository};

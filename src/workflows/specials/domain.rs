use chrono::Weekday;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use super::name::extract_name;

/// Weekdays in the order markers are tested against a line.
pub const CANONICAL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Capitalized label used as a `DaySpecialMap` key.
pub fn day_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Lowercase token searched for inside a lowercased line.
pub(crate) fn day_token(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Parses a full day name such as `"Monday"` or `" friday "`.
pub fn parse_day_label(value: &str) -> Option<Weekday> {
    let normalized = value.trim().to_lowercase();
    CANONICAL_DAYS
        .into_iter()
        .find(|day| day_token(*day) == normalized)
}

/// Text produced by the OCR collaborator, held as an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    /// Splits a block of text on line boundaries.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Wraps lines that were already segmented upstream.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn as_text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Suggested record awaiting human review. The inferred name is only a
/// default; it becomes a [`NamedSpecial`] through [`accept`](Self::accept) or
/// [`with_name`](Self::with_name).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NamedSpecialDraft {
    pub suggested_name: String,
    pub details: String,
}

impl NamedSpecialDraft {
    pub fn from_text(text: &str) -> Self {
        Self {
            suggested_name: extract_name(text),
            details: text.to_string(),
        }
    }

    pub fn accept(self) -> NamedSpecial {
        NamedSpecial {
            name: self.suggested_name,
            details: self.details,
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> NamedSpecial {
        NamedSpecial {
            name: name.into(),
            details: self.details,
        }
    }
}

/// Reviewed restaurant name plus the verbatim special text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct NamedSpecial {
    pub name: String,
    pub details: String,
}

/// One `(day, description)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySpecial {
    pub day: Weekday,
    pub description: String,
}

impl DaySpecial {
    pub fn label(&self) -> &'static str {
        day_label(self.day)
    }
}

/// Ordered day -> description mapping; each weekday appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySpecialMap {
    entries: Vec<DaySpecial>,
}

impl DaySpecialMap {
    pub(crate) fn from_entries(entries: Vec<DaySpecial>) -> Self {
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        let day = parse_day_label(label)?;
        self.get_day(day)
    }

    pub fn get_day(&self, day: Weekday) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.day == day)
            .map(|entry| entry.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DaySpecial> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.entries.iter().map(DaySpecial::label).collect()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.entries
            .into_iter()
            .map(|entry| (day_label(entry.day).to_string(), entry.description))
            .collect()
    }
}

impl Serialize for DaySpecialMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.label(), &entry.description)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_text_accepts_both_ocr_shapes() {
        let from_text = RawText::from_text("Tony's Pizza\r\n$5 off\nFriday");
        assert_eq!(from_text.lines(), ["Tony's Pizza", "$5 off", "Friday"]);

        let from_lines = RawText::from_lines(vec!["Monday".to_string(), "Burger".to_string()]);
        assert_eq!(from_lines.as_text(), "Monday\nBurger");
        assert!(RawText::from_text("").is_empty());
    }

    #[test]
    fn draft_name_can_be_overridden() {
        let draft = NamedSpecialDraft::from_text("Hours 11-9\nRt.66 Diner\nWings $0.50");
        assert_eq!(draft.suggested_name, "Hours 11-9");

        let reviewed = draft.clone().with_name("Rt.66 Diner");
        assert_eq!(reviewed.name, "Rt.66 Diner");
        assert_eq!(reviewed.details, draft.details);

        let accepted = draft.accept();
        assert_eq!(accepted.name, "Hours 11-9");
    }

    #[test]
    fn day_labels_round_trip_through_parser() {
        for day in CANONICAL_DAYS {
            assert_eq!(parse_day_label(day_label(day)), Some(day));
        }
        assert_eq!(parse_day_label("  FRIDAY "), Some(Weekday::Fri));
        assert_eq!(parse_day_label("Fri"), None);
    }

    #[test]
    fn map_serializes_in_entry_order() {
        let map = DaySpecialMap::from_entries(vec![
            DaySpecial {
                day: Weekday::Tue,
                description: "Tacos".to_string(),
            },
            DaySpecial {
                day: Weekday::Mon,
                description: String::new(),
            },
        ]);

        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"Tuesday":"Tacos","Monday":""}"#);
        assert_eq!(map.get("monday"), Some(""));
        assert_eq!(map.labels(), ["Tuesday", "Monday"]);
    }
}

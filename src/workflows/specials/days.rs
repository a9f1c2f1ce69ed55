use chrono::Weekday;

use super::domain::{day_token, DaySpecial, DaySpecialMap, CANONICAL_DAYS};

/// Joins the lines collected under one day.
pub const LINE_SEPARATOR: &str = " | ";

/// Every weekday whose name occurs in `line`, in canonical order. Matching is
/// a case-insensitive substring test, so `"mondayspecial"` yields Monday.
pub fn day_markers(line: &str) -> Vec<Weekday> {
    let lowered = line.trim().to_lowercase();
    CANONICAL_DAYS
        .into_iter()
        .filter(|day| lowered.contains(day_token(*day)))
        .collect()
}

/// The marker that opens a section: the first canonical day found in `line`.
pub fn detect_day(line: &str) -> Option<Weekday> {
    let lowered = line.trim().to_lowercase();
    CANONICAL_DAYS
        .into_iter()
        .find(|day| lowered.contains(day_token(*day)))
}

/// Accumulator threaded through the grouping fold.
///
/// Each [`step`](Self::step) consumes the previous state and returns the next
/// one, so a partial trace can be inspected after any prefix of the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayGrouping {
    current: Option<Weekday>,
    groups: Vec<(Weekday, Vec<String>)>,
}

impl DayGrouping {
    pub fn step(mut self, line: &str) -> Self {
        let trimmed = line.trim();

        if let Some(day) = detect_day(trimmed) {
            match self.groups.iter().position(|(seen, _)| *seen == day) {
                Some(index) => self.groups[index].1.clear(),
                None => self.groups.push((day, Vec::new())),
            }
            self.current = Some(day);
            return self;
        }

        if let Some(current) = self.current {
            if let Some((_, lines)) = self.groups.iter_mut().find(|(seen, _)| *seen == current) {
                lines.push(trimmed.to_string());
            }
        }

        self
    }

    /// Day whose section is currently open, if any marker has been seen.
    pub fn current_day(&self) -> Option<Weekday> {
        self.current
    }

    /// Lines collected so far for `day`.
    pub fn lines_for(&self, day: Weekday) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(seen, _)| *seen == day)
            .map(|(_, lines)| lines.as_slice())
    }

    pub fn finish(self) -> DaySpecialMap {
        let entries = self
            .groups
            .into_iter()
            .map(|(day, lines)| DaySpecial {
                day,
                description: lines.join(LINE_SEPARATOR),
            })
            .collect();
        DaySpecialMap::from_entries(entries)
    }
}

/// Partitions OCR lines into sections keyed by the day markers they contain.
/// Lines before the first marker are dropped; a repeated marker discards the
/// lines gathered under its earlier occurrence.
pub fn group_by_day<I, S>(lines: I) -> DaySpecialMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .fold(DayGrouping::default(), |state, line| state.step(line.as_ref()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lines_under_each_marker() {
        let map = group_by_day([
            "Monday",
            "Burger special $8",
            "Tuesday",
            "Taco night $6",
            "more tacos",
        ]);
        assert_eq!(map.labels(), ["Monday", "Tuesday"]);
        assert_eq!(map.get("Monday"), Some("Burger special $8"));
        assert_eq!(map.get("Tuesday"), Some("Taco night $6 | more tacos"));
    }

    #[test]
    fn drops_lines_before_first_marker() {
        let map = group_by_day(["random header", "Friday", "Fish fry $10"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Friday"), Some("Fish fry $10"));
    }

    #[test]
    fn repeated_marker_resets_accumulation() {
        let map = group_by_day(["Monday", "A", "Monday", "B"]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Monday"), Some("B"));
    }

    #[test]
    fn repeated_marker_keeps_first_seen_position() {
        let map = group_by_day(["Monday", "A", "Tuesday", "B", "monday", "C"]);
        assert_eq!(map.labels(), ["Monday", "Tuesday"]);
        assert_eq!(map.get("Monday"), Some("C"));
        assert_eq!(map.get("Tuesday"), Some("B"));
    }

    #[test]
    fn marker_without_lines_yields_empty_description() {
        let map = group_by_day(["Saturday", "Sunday", "Brunch"]);
        assert_eq!(map.get("Saturday"), Some(""));
        assert_eq!(map.get("Sunday"), Some("Brunch"));
    }

    #[test]
    fn no_markers_yields_empty_map() {
        assert!(group_by_day(["Happy hour", "$2 drafts"]).is_empty());
        assert!(group_by_day(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn substring_and_case_insensitive_matching() {
        let map = group_by_day(["  WEDNESDAYSPECIAL ", "  Wings 50c  "]);
        assert_eq!(map.get("Wednesday"), Some("Wings 50c"));
    }

    #[test]
    fn multi_day_line_resolves_to_first_canonical_day() {
        assert_eq!(
            day_markers("Tuesday and Monday special"),
            [Weekday::Mon, Weekday::Tue]
        );
        assert_eq!(detect_day("Tuesday and Monday special"), Some(Weekday::Mon));

        let map = group_by_day(["Sunday & Friday deals", "Half off"]);
        assert_eq!(map.labels(), ["Friday"]);
    }

    #[test]
    fn step_exposes_partial_trace() {
        let state = DayGrouping::default().step("intro");
        assert_eq!(state.current_day(), None);

        let state = state.step("Thursday").step("  Trivia night ");
        assert_eq!(state.current_day(), Some(Weekday::Thu));
        assert_eq!(
            state.lines_for(Weekday::Thu),
            Some(&["Trivia night".to_string()][..])
        );
        assert_eq!(state.finish().get("Thursday"), Some("Trivia night"));
    }

    #[test]
    fn grouping_is_repeatable() {
        let lines = vec!["Friday".to_string(), "Fish fry".to_string()];
        assert_eq!(group_by_day(&lines), group_by_day(&lines));
    }
}

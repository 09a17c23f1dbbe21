use chrono::{FixedOffset, Local, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::calendar::{EventRecord, EventTime};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Rewrites ambiguous local timestamps into timezone-qualified ones.
///
/// All-day values and timestamps that already carry a trailing `Z` or an
/// explicit `+hh:mm`/`-hh:mm` suffix are left untouched, which makes the
/// pass idempotent. Anything else is treated as a naive local timestamp and
/// re-emitted with the configured offset. A literal that fails even the
/// strict naive parse gets a `Z` appended as a last resort.
pub struct TimezoneNormalizer {
    offset: FixedOffset,
    offset_suffix: Regex,
}

impl TimezoneNormalizer {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset,
            offset_suffix: Regex::new(r"(Z|[+-]\d{2}:\d{2})$")
                .expect("offset suffix pattern is valid"),
        }
    }

    /// Normalizer for the machine-local timezone, the offset in effect now.
    pub fn local() -> Self {
        Self::with_offset(*Local::now().offset())
    }

    pub fn normalize(&self, events: &mut [EventRecord]) {
        for event in events.iter_mut() {
            self.normalize_time(&mut event.start);
            self.normalize_time(&mut event.end);
        }
    }

    fn normalize_time(&self, time: &mut EventTime) {
        if let EventTime::Timed { date_time } = time {
            *date_time = self.normalize_value(date_time);
        }
    }

    fn normalize_value(&self, raw: &str) -> String {
        if self.offset_suffix.is_match(raw) {
            return raw.to_string();
        }

        match NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT) {
            Ok(naive) => match self.offset.from_local_datetime(&naive).single() {
                Some(aware) => aware.to_rfc3339(),
                None => format!("{}Z", raw),
            },
            Err(_) => format!("{}Z", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Reminders;
    use proptest::prelude::*;

    fn minus_five() -> TimezoneNormalizer {
        TimezoneNormalizer::with_offset(FixedOffset::west_opt(5 * 3600).unwrap())
    }

    fn timed_event(start: &str, end: &str) -> EventRecord {
        EventRecord {
            summary: "EXAM: Midterm".to_string(),
            description: String::new(),
            location: None,
            color_id: Some("1".to_string()),
            start: EventTime::Timed {
                date_time: start.to_string(),
            },
            end: EventTime::Timed {
                date_time: end.to_string(),
            },
            recurrence: None,
            reminders: Some(Reminders::extraction_default()),
        }
    }

    fn start_of(event: &EventRecord) -> &str {
        match &event.start {
            EventTime::Timed { date_time } => date_time,
            EventTime::AllDay { date } => date,
        }
    }

    #[test]
    fn naive_timestamp_gets_local_offset() {
        let mut events = vec![timed_event("2024-03-01T09:00:00", "2024-03-01T10:00:00")];
        minus_five().normalize(&mut events);

        assert_eq!(start_of(&events[0]), "2024-03-01T09:00:00-05:00");
    }

    #[test]
    fn utc_suffix_is_untouched() {
        let mut events = vec![timed_event("2024-03-01T09:00:00Z", "2024-03-01T10:00:00Z")];
        minus_five().normalize(&mut events);

        assert_eq!(start_of(&events[0]), "2024-03-01T09:00:00Z");
    }

    #[test]
    fn explicit_offset_is_untouched() {
        let mut events = vec![timed_event(
            "2024-03-01T09:00:00+02:00",
            "2024-03-01T10:00:00-11:30",
        )];
        minus_five().normalize(&mut events);

        assert_eq!(start_of(&events[0]), "2024-03-01T09:00:00+02:00");
    }

    #[test]
    fn all_day_values_are_untouched() {
        let mut events = vec![EventRecord {
            summary: "ASSIGNMENT: HW1".to_string(),
            description: String::new(),
            location: None,
            color_id: None,
            start: EventTime::AllDay {
                date: "2024-03-01".to_string(),
            },
            end: EventTime::AllDay {
                date: "2024-03-02".to_string(),
            },
            recurrence: None,
            reminders: None,
        }];
        minus_five().normalize(&mut events);

        assert_eq!(start_of(&events[0]), "2024-03-01");
    }

    #[test]
    fn malformed_literal_gets_z_appended() {
        let mut events = vec![timed_event("next tuesday 9am", "2024-03-01T10:00:00")];
        minus_five().normalize(&mut events);

        assert_eq!(start_of(&events[0]), "next tuesday 9amZ");
    }

    proptest! {
        // Normalizing twice is the same as normalizing once: every output
        // either already carried an offset suffix or now ends in one.
        #[test]
        fn normalization_is_idempotent(raw in "\\PC{0,30}") {
            let normalizer = minus_five();
            let once = normalizer.normalize_value(&raw);
            let twice = normalizer.normalize_value(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn valid_naive_timestamps_are_idempotent_and_offset_qualified(
            year in 2024i32..2030,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let raw = format!("{:04}-{:02}-{:02}T{:02}:{:02}:00", year, month, day, hour, minute);
            let normalizer = minus_five();
            let once = normalizer.normalize_value(&raw);

            prop_assert!(once.ends_with("-05:00"));
            prop_assert_eq!(normalizer.normalize_value(&once), once);
        }
    }
}

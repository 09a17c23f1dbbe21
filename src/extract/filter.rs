use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::calendar::{EventRecord, EventTime};

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Drops events whose effective start has already elapsed.
///
/// All-day events are compared date-only against the reference date; timed
/// events against the full reference instant. Both comparisons are inclusive,
/// so an event starting exactly now (or dated today) is kept. Events whose
/// start cannot be parsed are kept: malformed data should surface to the
/// user, not vanish. Order is preserved.
pub struct PastEventFilter {
    reference: DateTime<FixedOffset>,
}

impl PastEventFilter {
    pub fn at(reference: DateTime<FixedOffset>) -> Self {
        Self { reference }
    }

    pub fn now() -> Self {
        Self::at(Local::now().fixed_offset())
    }

    pub fn retain_upcoming(&self, events: Vec<EventRecord>) -> Vec<EventRecord> {
        events.into_iter().filter(|e| self.keeps(e)).collect()
    }

    fn keeps(&self, event: &EventRecord) -> bool {
        match &event.start {
            EventTime::AllDay { date } => match NaiveDate::parse_from_str(date, DATE_FORMAT) {
                Ok(event_date) => event_date >= self.reference.date_naive(),
                Err(_) => true,
            },
            EventTime::Timed { date_time } => match self.parse_instant(date_time) {
                Some(instant) => instant >= self.reference,
                None => true,
            },
        }
    }

    /// A timestamp without timezone information is assumed to share the
    /// reference instant's offset.
    fn parse_instant(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
            NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
                .ok()
                .and_then(|naive| self.reference.offset().from_local_datetime(&naive).single())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(s: &str) -> PastEventFilter {
        PastEventFilter::at(DateTime::parse_from_rfc3339(s).unwrap())
    }

    fn all_day(summary: &str, date: &str) -> EventRecord {
        EventRecord {
            summary: summary.to_string(),
            description: String::new(),
            location: None,
            color_id: None,
            start: EventTime::AllDay {
                date: date.to_string(),
            },
            end: EventTime::AllDay {
                date: date.to_string(),
            },
            recurrence: None,
            reminders: None,
        }
    }

    fn timed(summary: &str, start: &str) -> EventRecord {
        EventRecord {
            summary: summary.to_string(),
            description: String::new(),
            location: None,
            color_id: None,
            start: EventTime::Timed {
                date_time: start.to_string(),
            },
            end: EventTime::Timed {
                date_time: start.to_string(),
            },
            recurrence: None,
            reminders: None,
        }
    }

    #[test]
    fn all_day_event_today_is_kept() {
        let filter = reference("2024-03-01T12:00:00-05:00");
        let kept = filter.retain_upcoming(vec![all_day("today", "2024-03-01")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn all_day_event_yesterday_is_dropped() {
        let filter = reference("2024-03-01T12:00:00-05:00");
        let kept = filter.retain_upcoming(vec![all_day("yesterday", "2024-02-29")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn timed_event_later_today_is_kept() {
        let filter = reference("2024-03-01T08:00:00-05:00");
        let kept = filter.retain_upcoming(vec![timed("exam", "2024-03-01T09:00:00-05:00")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn timed_event_already_past_is_dropped() {
        let filter = reference("2024-03-02T00:00:00-05:00");
        let kept = filter.retain_upcoming(vec![timed("exam", "2024-03-01T09:00:00-05:00")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn timed_event_exactly_now_is_kept() {
        let filter = reference("2024-03-01T09:00:00-05:00");
        let kept = filter.retain_upcoming(vec![timed("exam", "2024-03-01T09:00:00-05:00")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn naive_timestamp_assumes_reference_offset() {
        // 09:00 naive under a -05:00 reference is 09:00-05:00, still ahead
        // of the 08:00-05:00 reference instant.
        let filter = reference("2024-03-01T08:00:00-05:00");
        let kept = filter.retain_upcoming(vec![timed("exam", "2024-03-01T09:00:00")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn utc_suffix_is_compared_as_utc() {
        // 13:00Z == 08:00-05:00, the reference instant itself.
        let filter = reference("2024-03-01T08:00:00-05:00");
        let kept = filter.retain_upcoming(vec![timed("exam", "2024-03-01T13:00:00Z")]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn unparsable_start_is_kept() {
        let filter = reference("2024-03-01T08:00:00-05:00");
        let kept = filter.retain_upcoming(vec![
            timed("bad timestamp", "sometime next week"),
            all_day("bad date", "03/01/2024"),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn order_is_preserved() {
        let filter = reference("2024-03-01T00:00:00-05:00");
        let kept = filter.retain_upcoming(vec![
            all_day("c", "2024-03-03"),
            all_day("a", "2024-03-01"),
            all_day("b", "2024-03-02"),
        ]);

        let summaries: Vec<&str> = kept.iter().map(|e| e.summary.as_str()).collect();
        assert_eq!(summaries, vec!["c", "a", "b"]);
    }
}

use serde::{Deserialize, Serialize};

/// A calendar event as it travels through the extraction pipeline and out to
/// Google Calendar. The serialized form is the Google event JSON contract;
/// field names and presence rules must not drift from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "colorId", default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(
        default,
        with = "rrule_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

/// Start/end of an event: a calendar date for all-day events, a timestamp
/// otherwise. Values stay as strings because they arrive from an untrusted
/// model; the normalizer and filter parse them and fail open on bad literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    AllDay {
        date: String,
    },
    Timed {
        #[serde(rename = "dateTime")]
        date_time: String,
    },
}

impl EventTime {
    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::AllDay { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<ReminderOverride>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

impl Reminders {
    /// The fixed shape every extracted event carries: `{useDefault: false,
    /// overrides: []}`.
    pub fn extraction_default() -> Self {
        Self {
            use_default: false,
            overrides: Some(Vec::new()),
        }
    }

    /// The fallback the sync gateway substitutes when a submitted record
    /// carries no reminders: `{useDefault: true}` with no overrides key.
    /// Intentionally not the same shape as [`Reminders::extraction_default`].
    pub fn remote_default() -> Self {
        Self {
            use_default: true,
            overrides: None,
        }
    }
}

impl EventRecord {
    /// Start and end must use the same variant: both all-day or both timed.
    pub fn times_consistent(&self) -> bool {
        self.start.is_all_day() == self.end.is_all_day()
    }
}

/// On the wire `recurrence` is a JSON array of RRULE strings; internally we
/// carry at most one rule. Deserialization also tolerates a bare string and
/// treats an empty array as absent, since models emit all three.
mod rrule_list {
    use serde::de::Deserializer;
    use serde::ser::{SerializeSeq, Serializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RruleRepr {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(rule) => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(rule)?;
                seq.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = Option::<RruleRepr>::deserialize(deserializer)?;
        Ok(match repr {
            Some(RruleRepr::One(rule)) => Some(rule),
            Some(RruleRepr::Many(rules)) => rules.into_iter().next(),
            None => None,
        })
    }
}

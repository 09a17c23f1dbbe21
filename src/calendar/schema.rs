use serde_json::Value;
use thiserror::Error;

use crate::calendar::{EventRecord, Reminders};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("expected a JSON array or an object with an `events` array")]
    UnexpectedShape,
}

/// Turn raw model output into validated event records.
///
/// Accepts the two shapes the orchestrator tolerates: a bare array, or an
/// object whose `events` key holds an array. Anything else fails the whole
/// attempt. Individual elements that do not match the event schema, or whose
/// start/end mix the all-day and timed variants, are dropped with a warning
/// rather than failing the batch.
///
/// The repair pass also enforces the batch invariants: every record gets the
/// run's color tag and the fixed extraction reminders shape, regardless of
/// what the model emitted.
pub fn conform_batch(value: Value, color_id: &str) -> Result<Vec<EventRecord>, SchemaError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(items)) => items,
            _ => return Err(SchemaError::UnexpectedShape),
        },
        _ => return Err(SchemaError::UnexpectedShape),
    };

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<EventRecord>(item) {
            Ok(mut record) => {
                if !record.times_consistent() {
                    tracing::warn!(
                        "Dropping event '{}': start and end use different time variants",
                        record.summary
                    );
                    continue;
                }
                record.color_id = Some(color_id.to_string());
                record.reminders = Some(Reminders::extraction_default());
                events.push(record);
            }
            Err(err) => {
                tracing::warn!("Dropping event that does not match the schema: {}", err);
            }
        }
    }

    Ok(events)
}

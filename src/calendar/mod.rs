pub mod event;
pub mod schema;

pub use event::{EventRecord, EventTime, Reminders, ReminderOverride};
pub use schema::{conform_batch, SchemaError};

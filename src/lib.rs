pub mod calendar;
pub mod extract;
pub mod storage;
pub mod sync;

pub use calendar::{EventRecord, EventTime, Reminders};
pub use extract::{GeminiClient, SyllabusAnalyzer, SyllabusDocument};
pub use sync::{CalendarSyncGateway, CredentialBundle};

pub mod credentials;
pub mod gateway;
pub mod google_api;

pub use credentials::{CredentialBundle, CredentialError, CredentialStore};
pub use gateway::{CalendarSyncGateway, SyncError, DEFAULT_FETCH_LIMIT};
pub use google_api::{ApiError, EventPayload, GoogleCalendarClient, RemoteEvent};

pub mod analyzer;
pub mod filter;
pub mod prompt;
pub mod provider;
pub mod timezone;

pub use analyzer::{AttemptError, CredentialModelPair, SyllabusAnalyzer};
pub use filter::PastEventFilter;
pub use provider::{GeminiClient, GenerativeModel, ProviderError, SyllabusDocument};
pub use timezone::TimezoneNormalizer;

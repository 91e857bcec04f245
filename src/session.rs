//! Explicit per-invocation session context
//!
//! The display language and active city travel together through the call
//! chain as a value instead of ambient global state.

use clap::ValueEnum;

/// Display language for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

/// Context threaded through the orchestrator and presentation layer
#[derive(Debug, Clone)]
pub struct Session {
    pub language: Language,
    pub active_city: String,
}

impl Session {
    pub fn new(language: Language, active_city: impl Into<String>) -> Self {
        Self {
            language,
            active_city: active_city.into(),
        }
    }
}

/// Formats a payload's `fetched_at` stamp for display
///
/// Accepts the ISO-8601 string carried in payloads; an unparseable or
/// missing stamp yields an empty string rather than an error.
pub fn format_timestamp(fetched_at: Option<&str>, language: Language) -> String {
    let Some(raw) = fetched_at else {
        return String::new();
    };
    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) else {
        return String::new();
    };

    let date = parsed.format("%d/%m/%Y");
    let time = parsed.format("%I:%M %p");
    match language {
        Language::English => format!("Updated on {} at {}", date, time),
        Language::Hindi => format!("अपडेट किया गया {} को {}", date, time),
    }
}

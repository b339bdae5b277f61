//! Change event names and payloads.
//!
//! Three kinds of event exist:
//! - `change`: fired once for every write, whatever the path.
//! - `change:<path>`: fired for writes to exactly that path.
//! - `change:<Semantic>`: fired by the reactor when one of several store
//!   representations of the same concept changes (e.g. `change:ExtrasCode`).
//!
//! Semantic names take precedence when parsing, so a top-level attribute
//! named like a semantic event (e.g. `Scale`) cannot be listened to by path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::path::{AttributePath, KnownPath};

const CHANGE: &str = "change";

/// Semantic change events fanned out from concrete paths.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum SemanticEvent {
    Scale,
    State,
    PaymentFrequency,
    Excess,
    HospitalCode,
    ExtrasCode,
}

/// The name a listener subscribes under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Generic `change`, fired for every write.
    Change,
    /// `change:<path>`, fired for writes to one path.
    Path(AttributePath),
    /// `change:<Semantic>`, fired by the reactor.
    Semantic(SemanticEvent),
}

impl EventName {
    /// Event name for writes to a path.
    #[must_use]
    pub fn path(path: impl Into<AttributePath>) -> Self {
        Self::Path(path.into())
    }

    /// Parses `change`, `change:<Semantic>` or `change:<path>`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidEventName` if the name lacks the
    /// `change` prefix, or `ValidationError::InvalidPath` if the suffix is not
    /// a valid path.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw == CHANGE {
            return Ok(Self::Change);
        }

        let suffix = raw
            .strip_prefix(CHANGE)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| ValidationError::InvalidEventName {
                name: raw.to_string(),
            })?;

        if let Ok(semantic) = SemanticEvent::from_str(suffix) {
            return Ok(Self::Semantic(semantic));
        }

        AttributePath::parse(suffix).map(Self::Path)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Change => f.write_str(CHANGE),
            Self::Path(path) => write!(f, "{CHANGE}:{path}"),
            Self::Semantic(semantic) => write!(f, "{CHANGE}:{semantic}"),
        }
    }
}

impl FromStr for EventName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<SemanticEvent> for EventName {
    fn from(semantic: SemanticEvent) -> Self {
        Self::Semantic(semantic)
    }
}

impl From<KnownPath> for EventName {
    fn from(known: KnownPath) -> Self {
        Self::Path(known.into())
    }
}

impl From<AttributePath> for EventName {
    fn from(path: AttributePath) -> Self {
        Self::Path(path)
    }
}

/// Conversion into an [`EventName`].
pub trait IntoEventName {
    /// Converts `self` into an event name.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for unparseable strings.
    fn into_event_name(self) -> Result<EventName, ValidationError>;
}

impl IntoEventName for EventName {
    fn into_event_name(self) -> Result<EventName, ValidationError> {
        Ok(self)
    }
}

impl IntoEventName for SemanticEvent {
    fn into_event_name(self) -> Result<EventName, ValidationError> {
        Ok(self.into())
    }
}

impl IntoEventName for KnownPath {
    fn into_event_name(self) -> Result<EventName, ValidationError> {
        Ok(self.into())
    }
}

impl IntoEventName for &str {
    fn into_event_name(self) -> Result<EventName, ValidationError> {
        EventName::parse(self)
    }
}

impl IntoEventName for String {
    fn into_event_name(self) -> Result<EventName, ValidationError> {
        EventName::parse(&self)
    }
}

/// Payload delivered to every listener.
///
/// `path` is the path that was written, also for generic and semantic events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// The path that was written.
    pub path: AttributePath,
    /// The new value at `path`.
    pub value: Value,
}

impl Change {
    /// Creates a change payload.
    #[must_use]
    pub const fn new(path: AttributePath, value: Value) -> Self {
        Self { path, value }
    }

    /// The written path, if it is one of the known paths.
    #[must_use]
    pub fn known_path(&self) -> Option<KnownPath> {
        KnownPath::of(&self.path)
    }

    /// The new value as a string, if it is one.
    #[must_use]
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_str()
    }
}

//! Derived-field reactions wired into every model.
//!
//! Reactions run right after a write is stored, before the listeners of
//! the `change:<path>` event that triggered them.
//! A reaction never writes to the path that triggered it, so cascades end.

use crate::event::SemanticEvent;
use crate::path::{AttributePath, KnownPath};

/// What happens when a trigger path is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Re-derive `gender` from the title at `title`, leaving it alone when
    /// the title has no gender mapping.
    DefaultGender {
        /// Path holding the title.
        title: KnownPath,
        /// Path receiving the gender.
        gender: KnownPath,
    },
    /// Re-emit the write under a semantic event name.
    Broadcast(SemanticEvent),
}

impl Reaction {
    /// The path this reaction writes to, if any.
    #[must_use]
    pub const fn writes(&self) -> Option<KnownPath> {
        match self {
            Self::DefaultGender { gender, .. } => Some(*gender),
            Self::Broadcast(_) => None,
        }
    }
}

/// Fixed table of `(trigger path, reaction)` pairs.
#[derive(Debug, Clone)]
pub struct Reactor {
    table: Vec<(AttributePath, Reaction)>,
}

impl Reactor {
    /// The reactions every quote model carries.
    #[must_use]
    pub fn standard() -> Self {
        let table = vec![
            (
                KnownPath::PolicyHolderTitle,
                Reaction::DefaultGender {
                    title: KnownPath::PolicyHolderTitle,
                    gender: KnownPath::PolicyHolderGender,
                },
            ),
            (
                KnownPath::PartnerTitle,
                Reaction::DefaultGender {
                    title: KnownPath::PartnerTitle,
                    gender: KnownPath::PartnerGender,
                },
            ),
            (KnownPath::Scale, Reaction::Broadcast(SemanticEvent::Scale)),
            (KnownPath::State, Reaction::Broadcast(SemanticEvent::State)),
            (
                KnownPath::PaymentFrequency,
                Reaction::Broadcast(SemanticEvent::PaymentFrequency),
            ),
            (
                KnownPath::HospitalExcess,
                Reaction::Broadcast(SemanticEvent::Excess),
            ),
            (
                KnownPath::HospitalCode,
                Reaction::Broadcast(SemanticEvent::HospitalCode),
            ),
            (KnownPath::Extras, Reaction::Broadcast(SemanticEvent::ExtrasCode)),
        ];

        let reactor = Self {
            table: table
                .into_iter()
                .map(|(trigger, reaction)| (AttributePath::from(trigger), reaction))
                .collect(),
        };
        debug_assert!(reactor.is_acyclic());
        reactor
    }

    /// Reactions triggered by a write to `path`, in wiring order.
    pub fn reactions_for<'a>(&'a self, path: &'a AttributePath) -> impl Iterator<Item = Reaction> + 'a {
        self.table
            .iter()
            .filter(move |(trigger, _)| trigger == path)
            .map(|(_, reaction)| *reaction)
    }

    /// Returns true if no reaction writes to a path that triggers reactions.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.table.iter().all(|(_, reaction)| {
            reaction.writes().map_or(true, |written| {
                let written = AttributePath::from(written);
                self.table.iter().all(|(trigger, _)| *trigger != written)
            })
        })
    }

    /// Number of wired reactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no reactions are wired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_reactor_is_acyclic() {
        let reactor = Reactor::standard();
        assert!(reactor.is_acyclic());
        assert_eq!(reactor.len(), 8);
    }

    #[test]
    fn test_title_triggers_gender_default() {
        let reactor = Reactor::standard();
        let path = AttributePath::from(KnownPath::PartnerTitle);
        let reactions: Vec<Reaction> = reactor.reactions_for(&path).collect();
        assert_eq!(
            reactions,
            vec![Reaction::DefaultGender {
                title: KnownPath::PartnerTitle,
                gender: KnownPath::PartnerGender,
            }]
        );
    }

    #[test]
    fn test_extras_structure_broadcasts_extras_code() {
        let reactor = Reactor::standard();
        let path = AttributePath::from(KnownPath::Extras);
        let reactions: Vec<Reaction> = reactor.reactions_for(&path).collect();
        assert_eq!(reactions, vec![Reaction::Broadcast(SemanticEvent::ExtrasCode)]);

        let code_path = AttributePath::from(KnownPath::ExtrasCode);
        assert_eq!(reactor.reactions_for(&code_path).count(), 0);
    }

    #[test]
    fn test_gender_writes_trigger_nothing() {
        let reactor = Reactor::standard();
        let path = AttributePath::from(KnownPath::PolicyHolderGender);
        assert_eq!(reactor.reactions_for(&path).count(), 0);
    }
}

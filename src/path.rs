//! Attribute paths and the path schema.
//!
//! Attributes are addressed by dot-delimited paths such as
//! `PersonalDetails.PolicyHolder.Title`. Paths address object fields only:
//! every segment must be an identifier, so array indices can never appear.
//!
//! Writes are checked against a [`PathSchema`]. The schema starts from the
//! [`KnownPath`] set and may be extended with extra paths when the model is
//! constructed. A path is admitted when it is registered or when it is the
//! ancestor of a registered path (e.g. `ProductSelection.Extras`).

use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::error::ValidationError;

fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("segment pattern is a valid regex")
    })
}

/// A validated dot-delimited attribute path.
///
/// # Examples
///
/// ```
/// use quote_join_model::AttributePath;
///
/// let path = AttributePath::parse("ContactDetails.Address.State").unwrap();
/// assert_eq!(path.segments().count(), 3);
/// assert!(AttributePath::parse("Children.0.Name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributePath(String);

impl AttributePath {
    /// Parses and validates a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPath` if the path is empty, contains an
    /// empty segment, or has a segment that is not an identifier.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("path is empty"));
        }

        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(invalid("empty segment"));
            }
            if !segment_pattern().is_match(segment) {
                return Err(invalid(&format!(
                    "segment '{segment}' must be a field name"
                )));
            }
        }

        Ok(Self(raw.to_string()))
    }

    /// The path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The path of the containing object, if any.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.rsplit_once('.').map(|(parent, _)| Self(parent.to_string()))
    }

    /// Returns true if `self` is a strict ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'.'
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AttributePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AttributePath {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttributePath> for String {
    fn from(path: AttributePath) -> Self {
        path.0
    }
}

impl From<KnownPath> for AttributePath {
    fn from(known: KnownPath) -> Self {
        Self(known.as_ref().to_string())
    }
}

/// Conversion into a validated [`AttributePath`].
///
/// Implemented for strings (validated at runtime) and for [`KnownPath`]
/// (always valid).
pub trait IntoPath {
    /// Converts `self` into a path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPath` for malformed strings.
    fn into_path(self) -> Result<AttributePath, ValidationError>;
}

impl IntoPath for AttributePath {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        Ok(self)
    }
}

impl IntoPath for &AttributePath {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        Ok(self.clone())
    }
}

impl IntoPath for KnownPath {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        Ok(self.into())
    }
}

impl IntoPath for &str {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        AttributePath::parse(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        AttributePath::parse(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Result<AttributePath, ValidationError> {
        AttributePath::parse(self)
    }
}

/// The attribute paths the quote model understands.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum KnownPath {
    #[strum(serialize = "PersonalDetails.Scale")]
    Scale,
    #[strum(serialize = "PersonalDetails.PolicyHolder.Title")]
    PolicyHolderTitle,
    #[strum(serialize = "PersonalDetails.PolicyHolder.Gender")]
    PolicyHolderGender,
    #[strum(serialize = "PersonalDetails.PolicyHolder.FirstName")]
    PolicyHolderFirstName,
    #[strum(serialize = "PersonalDetails.PolicyHolder.LastName")]
    PolicyHolderLastName,
    #[strum(serialize = "PersonalDetails.PolicyHolder.Email")]
    PolicyHolderEmail,
    #[strum(serialize = "PersonalDetails.PolicyHolder.DateOfBirth")]
    PolicyHolderDateOfBirth,
    #[strum(serialize = "PersonalDetails.Partner.Title")]
    PartnerTitle,
    #[strum(serialize = "PersonalDetails.Partner.Gender")]
    PartnerGender,
    #[strum(serialize = "PersonalDetails.Partner.DateOfBirth")]
    PartnerDateOfBirth,
    #[strum(serialize = "ContactDetails.Address")]
    Address,
    #[strum(serialize = "ContactDetails.Address.State")]
    State,
    #[strum(serialize = "FinancialDetails.PaymentFrequency")]
    PaymentFrequency,
    #[strum(serialize = "FinancialDetails.PaymentMethod")]
    PaymentMethod,
    #[strum(serialize = "ProductSelection.Hospital.Code")]
    HospitalCode,
    #[strum(serialize = "ProductSelection.Hospital.Excess")]
    HospitalExcess,
    #[strum(serialize = "ProductSelection.Extras")]
    Extras,
    #[strum(serialize = "ProductSelection.Extras.Code")]
    ExtrasCode,
    #[strum(serialize = "ProductSelection.Combined.Code")]
    CombinedCode,
    #[strum(
        serialize = "GovernmentDetails.PolicyHolderPreviousFundDetails.PreviouslyHadHealthInsurance"
    )]
    PolicyHolderPreviouslyInsured,
    #[strum(
        serialize = "GovernmentDetails.PartnerPreviousFundDetails.PreviouslyHadHealthInsurance"
    )]
    PartnerPreviouslyInsured,
    #[strum(serialize = "GovernmentDetails.ApplyGovernmentRebate")]
    ApplyGovernmentRebate,
    #[strum(serialize = "GovernmentDetails.IncomeTier")]
    IncomeTier,
}

impl KnownPath {
    /// Returns true if a change at this path could change the quoted price.
    #[must_use]
    pub const fn affects_price(self) -> bool {
        matches!(
            self,
            Self::PolicyHolderDateOfBirth
                | Self::PartnerDateOfBirth
                | Self::Address
                | Self::State
                | Self::PolicyHolderPreviouslyInsured
                | Self::PartnerPreviouslyInsured
                | Self::ApplyGovernmentRebate
                | Self::IncomeTier
                | Self::PaymentFrequency
                | Self::PaymentMethod
        )
    }

    /// Matches a validated path against the known set.
    #[must_use]
    pub fn of(path: &AttributePath) -> Option<Self> {
        path.as_str().parse().ok()
    }
}

/// The set of paths a model accepts writes for.
#[derive(Debug, Clone)]
pub struct PathSchema {
    registered: BTreeSet<AttributePath>,
    strict: bool,
}

impl PathSchema {
    /// Creates a strict schema holding every [`KnownPath`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            registered: KnownPath::iter().map(AttributePath::from).collect(),
            strict: true,
        }
    }

    /// Creates a schema that admits every syntactically valid path.
    #[must_use]
    pub fn permissive() -> Self {
        let mut schema = Self::standard();
        schema.set_strict(false);
        schema
    }

    /// Switches rejection of unregistered paths on or off.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Registers an additional path.
    pub fn register(&mut self, path: AttributePath) {
        self.registered.insert(path);
    }

    /// Returns true if exactly `path` is registered.
    #[must_use]
    pub fn is_registered(&self, path: &AttributePath) -> bool {
        self.registered.contains(path)
    }

    /// Whether unregistered paths are rejected.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns true if the path is registered or is the ancestor of one.
    #[must_use]
    pub fn admits(&self, path: &AttributePath) -> bool {
        if !self.strict || self.registered.contains(path) {
            return true;
        }
        self.registered
            .range(path.clone()..)
            .take_while(|candidate| candidate.as_str().starts_with(path.as_str()))
            .any(|candidate| path.is_ancestor_of(candidate))
    }

    /// Checks a path against the schema.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownPath` if the schema is strict and the
    /// path is neither registered nor the ancestor of a registered path.
    pub fn check(&self, path: &AttributePath) -> Result<(), ValidationError> {
        if self.admits(path) {
            Ok(())
        } else {
            Err(ValidationError::UnknownPath {
                path: path.to_string(),
            })
        }
    }
}

impl Default for PathSchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_path() {
        let path = AttributePath::parse("PersonalDetails.PolicyHolder.Title").unwrap();
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["PersonalDetails", "PolicyHolder", "Title"]);
    }

    #[test]
    fn test_parse_rejects_empty_and_malformed() {
        assert!(AttributePath::parse("").is_err());
        assert!(AttributePath::parse("   ").is_err());
        assert!(AttributePath::parse("a..b").is_err());
        assert!(AttributePath::parse(".a").is_err());
        assert!(AttributePath::parse("a.").is_err());
        assert!(AttributePath::parse("a b").is_err());
    }

    #[test]
    fn test_parse_rejects_array_index() {
        let err = AttributePath::parse("Dependants.0.Name").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPath { .. }));
    }

    #[test]
    fn test_parent_and_ancestry() {
        let path = AttributePath::parse("ContactDetails.Address.State").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "ContactDetails.Address");
        assert!(parent.is_ancestor_of(&path));
        assert!(!path.is_ancestor_of(&parent));

        let sibling = AttributePath::parse("ContactDetails.AddressBook").unwrap();
        assert!(!parent.is_ancestor_of(&sibling));
    }

    #[test]
    fn test_known_path_round_trip() {
        let path = AttributePath::from(KnownPath::HospitalCode);
        assert_eq!(path.as_str(), "ProductSelection.Hospital.Code");
        assert_eq!(KnownPath::of(&path), Some(KnownPath::HospitalCode));
    }

    #[test]
    fn test_every_known_path_is_valid() {
        for known in KnownPath::iter() {
            assert!(AttributePath::parse(known.as_ref()).is_ok(), "{known}");
        }
    }

    #[test]
    fn test_strict_schema_admits_known_and_ancestors() {
        let schema = PathSchema::standard();
        let admits = |raw: &str| schema.admits(&AttributePath::parse(raw).unwrap());

        assert!(admits("PersonalDetails.Scale"));
        assert!(admits("PersonalDetails"));
        assert!(admits("ProductSelection.Hospital"));
        assert!(admits("ProductSelection.Combined"));
        assert!(!admits("PersonalDetails.Nickname"));
        assert!(!admits("Personal"));
    }

    #[test]
    fn test_registered_path_is_admitted() {
        let mut schema = PathSchema::standard();
        let extra = AttributePath::parse("ContactDetails.Address.Postcode").unwrap();
        assert!(schema.check(&extra).is_err());
        schema.register(extra.clone());
        assert!(schema.check(&extra).is_ok());
    }

    #[test]
    fn test_permissive_schema_admits_anything_valid() {
        let schema = PathSchema::permissive();
        assert!(!schema.is_strict());
        assert!(schema.admits(&AttributePath::parse("name").unwrap()));
    }
}

//! Fixed code sets used by the quote model.
//!
//! Each code family is one enum. The string form of a variant is exactly the
//! code stored in the attribute tree, so parsing a stored string is the
//! membership test.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A family of codes with a fixed string representation.
pub trait CodeSet: Copy + FromStr + AsRef<str> {
    /// Field name used in validation errors.
    const FIELD: &'static str;

    /// Parses a candidate code, failing if it is not a member.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for non-members.
    fn parse_code(candidate: &str) -> Result<Self, ValidationError> {
        candidate
            .parse::<Self>()
            .map_err(|_| ValidationError::invalid_value(Self::FIELD, candidate))
    }
}

/// Conversion of setter arguments into a member of a code set.
///
/// Typed codes convert infallibly; strings are validated.
pub trait IntoCode<C: CodeSet> {
    /// Converts `self` into a code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for non-members.
    fn into_code(self) -> Result<C, ValidationError>;
}

impl<C: CodeSet> IntoCode<C> for C {
    fn into_code(self) -> Result<C, ValidationError> {
        Ok(self)
    }
}

impl<C: CodeSet> IntoCode<C> for &str {
    fn into_code(self) -> Result<C, ValidationError> {
        C::parse_code(self)
    }
}

impl<C: CodeSet> IntoCode<C> for String {
    fn into_code(self) -> Result<C, ValidationError> {
        C::parse_code(&self)
    }
}

impl<C: CodeSet> IntoCode<C> for &String {
    fn into_code(self) -> Result<C, ValidationError> {
        C::parse_code(self)
    }
}

/// Household composition of a policy.
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
pub enum Scale {
    Single,
    Couple,
    Family,
    SingleParentFamily,
}

impl CodeSet for Scale {
    const FIELD: &'static str = "scale";
}

/// Hospital cover levels.
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
pub enum HospitalCode {
    /// No hospital cover.
    None,
    /// Basic hospital cover.
    #[strum(serialize = "BASIC")]
    #[serde(rename = "BASIC")]
    Basic,
    /// Mid-level hospital cover.
    #[strum(serialize = "MID")]
    #[serde(rename = "MID")]
    Mid,
    /// Top cover excluding pregnancy.
    #[strum(serialize = "TOP_NO_OBS")]
    #[serde(rename = "TOP_NO_OBS")]
    TopNoPregnancy,
    /// Top cover including pregnancy.
    #[strum(serialize = "TOP_WITH_OBS")]
    #[serde(rename = "TOP_WITH_OBS")]
    TopWithPregnancy,
}

impl CodeSet for HospitalCode {
    const FIELD: &'static str = "hospital product code";
}

/// Extras catalog codes.
///
/// Extras are selected through the product catalog, whose keys are free
/// strings; these are the codes the standard catalogs use.
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
    strum::IntoStaticStr,
)]
pub enum ExtrasCode {
    None,
    Core,
    CorePlus,
    Top,
    Wellbeing,
}

impl ExtrasCode {
    /// `Code` carried by catalog structures built from bundles.
    pub const BUNDLED: &'static str = "Bundles";
}

impl CodeSet for ExtrasCode {
    const FIELD: &'static str = "extras product code";
}

/// Combined hospital-and-extras products.
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
pub enum CombinedCode {
    None,
    Kickstarter,
    KickstarterPlus,
}

impl CodeSet for CombinedCode {
    const FIELD: &'static str = "combined product code";
}

/// Payment frequencies.
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
pub enum Frequency {
    Fortnightly,
    HalfYearly,
    Monthly,
    Quarterly,
    Weekly,
    Yearly,
}

impl CodeSet for Frequency {
    const FIELD: &'static str = "payment frequency";
}

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
pub enum Gender {
    Male,
    Female,
}

impl CodeSet for Gender {
    const FIELD: &'static str = "gender";
}

/// Guesses a gender from a person's title.
///
/// `Mr` maps to male; `Miss`, `Mrs` and `Ms` map to female. Any other title
/// has no mapping.
///
/// # Examples
///
/// ```
/// use quote_join_model::{gender_from_title, Gender};
///
/// assert_eq!(gender_from_title("Mr"), Some(Gender::Male));
/// assert_eq!(gender_from_title("Dr"), None);
/// ```
#[must_use]
pub fn gender_from_title(title: &str) -> Option<Gender> {
    match title {
        "Mr" => Some(Gender::Male),
        "Miss" | "Mrs" | "Ms" => Some(Gender::Female),
        _ => None,
    }
}

//! Which attribute changes could change the quoted price.
//!
//! Price calculation lives elsewhere; this module only answers whether a
//! write to a path invalidates a previously computed price.

use strum::IntoEnumIterator;

use crate::path::KnownPath;

/// Returns true if a change at `path` could affect the quoted price.
///
/// Unknown or malformed paths return false.
///
/// # Examples
///
/// ```
/// use quote_join_model::could_property_affect_price;
///
/// assert!(could_property_affect_price("GovernmentDetails.IncomeTier"));
/// assert!(!could_property_affect_price("PersonalDetails.PolicyHolder.Email"));
/// ```
#[must_use]
pub fn could_property_affect_price(path: &str) -> bool {
    path.parse::<KnownPath>()
        .map_or(false, KnownPath::affects_price)
}

/// Every path whose change could affect the quoted price.
#[must_use]
pub fn price_affecting_paths() -> Vec<KnownPath> {
    KnownPath::iter().filter(|p| p.affects_price()).collect()
}

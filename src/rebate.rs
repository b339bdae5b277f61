//! Government rebate (AGR) and lifetime health cover loading (LHC) collaborators.
//!
//! The model only depends on the [`RebateTierProvider`], [`RebateTier`] and
//! [`LoadingProvider`] traits. [`RebateSchedule`] and [`Loading`] are simple
//! data-backed implementations used when the options bundle carries raw tier
//! and loading data.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelResult, ValidationError};

/// A rebate income tier.
pub trait RebateTier: fmt::Debug + Send + Sync {
    /// Rebate percentage for the given policy holder and partner ages.
    fn percentage(&self, policy_holder_age: Option<i64>, partner_age: Option<i64>) -> f64;
}

/// Resolves income-tier codes to rebate tiers.
pub trait RebateTierProvider: Send + Sync {
    /// The tier for `code`, if one exists.
    fn tier(&self, code: &str) -> Option<&dyn RebateTier>;
}

/// Supplies the loading applied to a quote.
pub trait LoadingProvider: Send + Sync {
    /// The raw loading value.
    fn loading(&self) -> f64;
}

/// One age band of a tier: applies from `min_age` upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeBand {
    /// Youngest age the band applies to.
    pub min_age: i64,
    /// Rebate percentage for the band.
    pub percentage: f64,
}

/// A tier whose percentage depends on the age of the oldest insured person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BandedTier {
    /// Income-tier code.
    pub code: String,
    /// Age bands, in any order.
    pub bands: Vec<AgeBand>,
}

impl RebateTier for BandedTier {
    fn percentage(&self, policy_holder_age: Option<i64>, partner_age: Option<i64>) -> f64 {
        let age = policy_holder_age.max(partner_age).unwrap_or(0);
        self.bands
            .iter()
            .filter(|band| band.min_age <= age)
            .max_by_key(|band| band.min_age)
            .map_or(0.0, |band| band.percentage)
    }
}

/// Table of banded tiers, keyed by income-tier code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RebateSchedule {
    /// Tiers in declaration order.
    pub tiers: Vec<BandedTier>,
}

impl RebateSchedule {
    /// Parses a schedule from `{"Tiers": [{"Code": .., "Bands": [..]}]}`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` on malformed data.
    pub fn from_json(value: &Value) -> ModelResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            ValidationError::InvalidOptions {
                reason: format!("invalid rebate tier data: {e}"),
            }
            .into()
        })
    }
}

impl RebateTierProvider for RebateSchedule {
    fn tier(&self, code: &str) -> Option<&dyn RebateTier> {
        self.tiers
            .iter()
            .find(|tier| tier.code == code)
            .map(|tier| tier as &dyn RebateTier)
    }
}

/// Loading data as supplied in the options bundle (`{"Loading": 2}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Loading {
    /// Raw loading value.
    pub loading: f64,
}

impl Loading {
    /// Wraps a raw loading value.
    #[must_use]
    pub const fn new(loading: f64) -> Self {
        Self { loading }
    }

    /// Parses loading data from `{"Loading": <number>}`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` on malformed data.
    pub fn from_json(value: &Value) -> ModelResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            ValidationError::InvalidOptions {
                reason: format!("invalid loading data: {e}"),
            }
            .into()
        })
    }
}

impl LoadingProvider for Loading {
    fn loading(&self) -> f64 {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schedule() -> RebateSchedule {
        RebateSchedule::from_json(&json!({
            "Tiers": [
                {"Code": "0", "Bands": [
                    {"MinAge": 0, "Percentage": 27.82},
                    {"MinAge": 65, "Percentage": 32.46},
                    {"MinAge": 70, "Percentage": 37.09}
                ]},
                {"Code": "3", "Bands": [{"MinAge": 0, "Percentage": 0.0}]}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_tier_lookup() {
        let schedule = schedule();
        assert!(schedule.tier("0").is_some());
        assert!(schedule.tier("3").is_some());
        assert!(schedule.tier("9").is_none());
    }

    #[test]
    fn test_percentage_uses_oldest_age() {
        let schedule = schedule();
        let tier = schedule.tier("0").unwrap();
        assert!((tier.percentage(Some(40), None) - 27.82).abs() < f64::EPSILON);
        assert!((tier.percentage(Some(40), Some(66)) - 32.46).abs() < f64::EPSILON);
        assert!((tier.percentage(Some(71), Some(30)) - 37.09).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_without_ages_uses_youngest_band() {
        let schedule = schedule();
        let tier = schedule.tier("0").unwrap();
        assert!((tier.percentage(None, None) - 27.82).abs() < f64::EPSILON);
    }

    #[test]
    fn test_loading_from_json() {
        let loading = Loading::from_json(&json!({"Loading": 2})).unwrap();
        assert!((loading.loading() - 2.0).abs() < f64::EPSILON);
        assert!(Loading::from_json(&json!({"Loading": "two"})).is_err());
    }

    #[test]
    fn test_schedule_rejects_bad_data() {
        let err = RebateSchedule::from_json(&json!({"Tiers": "none"})).unwrap_err();
        assert!(err.is_validation());
    }
}

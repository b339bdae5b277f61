//! Typed accessors for personal, contact, financial and government details.

use chrono::NaiveDate;
use serde_json::{Number, Value};

use super::QuoteModel;
use crate::codes::{CodeSet, Frequency, Gender, IntoCode, Scale};
use crate::error::{ExecutionError, ModelResult, ValidationError};
use crate::path::KnownPath;
use crate::rebate::RebateTier;
use crate::time::{self, AgeUnit};

const EXCESS_FIELD: &str = "excess";

/// Conversion of setter arguments into a monetary amount.
///
/// Numbers convert directly; strings are parsed.
pub trait IntoAmount {
    /// Converts `self` into a finite amount.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for non-numeric strings and
    /// non-finite numbers.
    fn into_amount(self) -> Result<f64, ValidationError>;
}

impl IntoAmount for f64 {
    fn into_amount(self) -> Result<f64, ValidationError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(ValidationError::invalid_value(EXCESS_FIELD, self.to_string()))
        }
    }
}

impl IntoAmount for i64 {
    #[allow(clippy::cast_precision_loss)]
    fn into_amount(self) -> Result<f64, ValidationError> {
        Ok(self as f64)
    }
}

impl IntoAmount for i32 {
    fn into_amount(self) -> Result<f64, ValidationError> {
        Ok(f64::from(self))
    }
}

impl IntoAmount for u32 {
    fn into_amount(self) -> Result<f64, ValidationError> {
        Ok(f64::from(self))
    }
}

impl IntoAmount for &str {
    fn into_amount(self) -> Result<f64, ValidationError> {
        self.trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::invalid_value(EXCESS_FIELD, self))?
            .into_amount()
    }
}

impl IntoAmount for String {
    fn into_amount(self) -> Result<f64, ValidationError> {
        self.as_str().into_amount()
    }
}

/// JSON number for an amount; whole amounts are stored as integers.
#[allow(clippy::cast_possible_truncation)]
fn amount_value(amount: f64) -> Result<Value, ValidationError> {
    if amount.fract() == 0.0 && amount.abs() < 9_007_199_254_740_992.0 {
        return Ok(Value::from(amount as i64));
    }
    Number::from_f64(amount)
        .map(Value::Number)
        .ok_or_else(|| ValidationError::invalid_value(EXCESS_FIELD, amount.to_string()))
}

impl QuoteModel {
    pub(crate) fn code<C: CodeSet>(&self, path: KnownPath) -> Option<C> {
        let raw = self.get_str(path)?;
        match C::parse_code(raw) {
            Ok(code) => Some(code),
            Err(err) => {
                tracing::warn!(path = %path, error = %err, "stored code is not a member");
                None
            }
        }
    }

    pub(crate) fn set_code<C: CodeSet>(
        &mut self,
        path: KnownPath,
        code: impl IntoCode<C>,
    ) -> ModelResult<&mut Self> {
        let code = code.into_code().map_err(Self::rejected)?;
        self.set(path, code.as_ref())
    }

    fn flag(&self, path: KnownPath) -> Option<bool> {
        self.get(path).and_then(serde_json::Value::as_bool)
    }

    // Household

    /// Household composition.
    #[must_use]
    pub fn scale(&self) -> Option<Scale> {
        self.code(KnownPath::Scale)
    }

    /// Sets the household composition.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown scales, or a
    /// listener error.
    pub fn set_scale(&mut self, scale: impl IntoCode<Scale>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::Scale, scale)
    }

    /// Returns true if the scale is `Single`.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.scale() == Some(Scale::Single)
    }

    /// Returns true if the scale is `Couple`.
    #[must_use]
    pub fn is_couple(&self) -> bool {
        self.scale() == Some(Scale::Couple)
    }

    /// Returns true if the scale is `Family`.
    #[must_use]
    pub fn is_family(&self) -> bool {
        self.scale() == Some(Scale::Family)
    }

    /// Returns true if the scale is `SingleParentFamily`.
    #[must_use]
    pub fn is_single_parent_family(&self) -> bool {
        self.scale() == Some(Scale::SingleParentFamily)
    }

    /// Returns true if the policy covers a partner.
    #[must_use]
    pub fn has_partner(&self) -> bool {
        matches!(self.scale(), Some(Scale::Couple | Scale::Family))
    }

    // Policy holder

    /// The policy holder's title.
    #[must_use]
    pub fn policy_holder_title(&self) -> Option<&str> {
        self.get_str(KnownPath::PolicyHolderTitle)
    }

    /// Sets the policy holder's title, defaulting their gender when the title
    /// implies one.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_title(&mut self, title: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderTitle, title.into())
    }

    /// The policy holder's gender.
    #[must_use]
    pub fn policy_holder_gender(&self) -> Option<Gender> {
        self.code(KnownPath::PolicyHolderGender)
    }

    /// Sets the policy holder's gender.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown genders, or a
    /// listener error.
    pub fn set_policy_holder_gender(&mut self, gender: impl IntoCode<Gender>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::PolicyHolderGender, gender)
    }

    /// The policy holder's first name.
    #[must_use]
    pub fn policy_holder_first_name(&self) -> Option<&str> {
        self.get_str(KnownPath::PolicyHolderFirstName)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_first_name(&mut self, name: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderFirstName, name.into())
    }

    /// The policy holder's last name.
    #[must_use]
    pub fn policy_holder_last_name(&self) -> Option<&str> {
        self.get_str(KnownPath::PolicyHolderLastName)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_last_name(&mut self, name: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderLastName, name.into())
    }

    /// The policy holder's email address.
    #[must_use]
    pub fn policy_holder_email(&self) -> Option<&str> {
        self.get_str(KnownPath::PolicyHolderEmail)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_email(&mut self, email: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderEmail, email.into())
    }

    /// The policy holder's date of birth.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` if the stored value is not a
    /// `YYYY-MM-DD` string.
    pub fn policy_holder_date_of_birth(&self) -> ModelResult<Option<NaiveDate>> {
        self.date(KnownPath::PolicyHolderDateOfBirth)
    }

    /// Stores the policy holder's date of birth as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_date_of_birth(&mut self, date: NaiveDate) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderDateOfBirth, time::format_date(date))
    }

    /// The policy holder's age in whole years.
    ///
    /// # Errors
    ///
    /// See [`QuoteModel::policy_holder_age_in`].
    pub fn policy_holder_age(&self) -> ModelResult<Option<i64>> {
        self.policy_holder_age_in(AgeUnit::Years)
    }

    /// Time elapsed since the policy holder's date of birth, floored to whole
    /// `unit`s. `None` when no date of birth is stored.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for a malformed stored date.
    pub fn policy_holder_age_in(&self, unit: AgeUnit) -> ModelResult<Option<i64>> {
        self.age(KnownPath::PolicyHolderDateOfBirth, unit)
    }

    // Partner

    /// The partner's title.
    #[must_use]
    pub fn partner_title(&self) -> Option<&str> {
        self.get_str(KnownPath::PartnerTitle)
    }

    /// Sets the partner's title, defaulting their gender when the title
    /// implies one.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_partner_title(&mut self, title: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PartnerTitle, title.into())
    }

    /// The partner's gender.
    #[must_use]
    pub fn partner_gender(&self) -> Option<Gender> {
        self.code(KnownPath::PartnerGender)
    }

    /// Sets the partner's gender.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown genders, or a
    /// listener error.
    pub fn set_partner_gender(&mut self, gender: impl IntoCode<Gender>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::PartnerGender, gender)
    }

    /// The partner's date of birth.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for a malformed stored date.
    pub fn partner_date_of_birth(&self) -> ModelResult<Option<NaiveDate>> {
        self.date(KnownPath::PartnerDateOfBirth)
    }

    /// Stores the partner's date of birth as `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_partner_date_of_birth(&mut self, date: NaiveDate) -> ModelResult<&mut Self> {
        self.set(KnownPath::PartnerDateOfBirth, time::format_date(date))
    }

    /// The partner's age in whole years.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for a malformed stored date.
    pub fn partner_age(&self) -> ModelResult<Option<i64>> {
        self.partner_age_in(AgeUnit::Years)
    }

    /// Time elapsed since the partner's date of birth, floored to whole `unit`s.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for a malformed stored date.
    pub fn partner_age_in(&self, unit: AgeUnit) -> ModelResult<Option<i64>> {
        self.age(KnownPath::PartnerDateOfBirth, unit)
    }

    fn date(&self, path: KnownPath) -> ModelResult<Option<NaiveDate>> {
        let field = path.as_ref();
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Ok(Some(time::parse_date(field, raw)?)),
            Some(other) => Err(ValidationError::invalid_value(field, other.to_string()).into()),
        }
    }

    fn age(&self, path: KnownPath, unit: AgeUnit) -> ModelResult<Option<i64>> {
        let today = self.clock.now().date_naive();
        Ok(self
            .date(path)?
            .map(|born| time::elapsed(born, today, unit)))
    }

    // Contact

    /// The state of the postal address.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get_str(KnownPath::State)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_state(&mut self, state: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::State, state.into())
    }

    // Financial

    /// How often premiums are paid.
    #[must_use]
    pub fn frequency(&self) -> Option<Frequency> {
        self.code(KnownPath::PaymentFrequency)
    }

    /// Sets the payment frequency.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown frequencies, or a
    /// listener error.
    pub fn set_frequency(&mut self, frequency: impl IntoCode<Frequency>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::PaymentFrequency, frequency)
    }

    /// How premiums are paid.
    #[must_use]
    pub fn payment_method(&self) -> Option<&str> {
        self.get_str(KnownPath::PaymentMethod)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_payment_method(&mut self, method: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::PaymentMethod, method.into())
    }

    /// The hospital excess. Numeric strings are read as numbers.
    #[must_use]
    pub fn excess(&self) -> Option<f64> {
        match self.get(KnownPath::HospitalExcess)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Sets the hospital excess.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for non-numeric input, or a
    /// listener error.
    pub fn set_excess(&mut self, excess: impl IntoAmount) -> ModelResult<&mut Self> {
        let value = excess
            .into_amount()
            .and_then(amount_value)
            .map_err(Self::rejected)?;
        self.set(KnownPath::HospitalExcess, value)
    }

    // Government

    /// The income tier code. Numeric tiers are returned in decimal form.
    #[must_use]
    pub fn income_tier(&self) -> Option<String> {
        match self.get(KnownPath::IncomeTier)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_income_tier(&mut self, tier: impl Into<String>) -> ModelResult<&mut Self> {
        self.set(KnownPath::IncomeTier, tier.into())
    }

    /// Whether the government rebate is applied. Absent reads as false.
    #[must_use]
    pub fn is_agr_applied(&self) -> bool {
        self.flag(KnownPath::ApplyGovernmentRebate).unwrap_or(false)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_agr_applied(&mut self, applied: bool) -> ModelResult<&mut Self> {
        self.set(KnownPath::ApplyGovernmentRebate, applied)
    }

    /// The rebate tier for the stored income tier.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::MissingReference` if no tier provider was
    /// supplied, no income tier is stored, or the provider has no tier for it.
    pub fn agr_tier(&self) -> ModelResult<&dyn RebateTier> {
        let provider = self
            .rebates
            .as_deref()
            .ok_or_else(|| ExecutionError::missing("rebate tier provider"))?;
        let code = self
            .income_tier()
            .ok_or_else(|| ExecutionError::missing("income tier"))?;
        provider
            .tier(&code)
            .ok_or_else(|| ExecutionError::missing(format!("rebate tier '{code}'")).into())
    }

    /// The government rebate percentage for the current ages.
    ///
    /// # Errors
    ///
    /// See [`QuoteModel::agr_tier`]; also fails on malformed stored dates of
    /// birth.
    pub fn agr_percentage(&self) -> ModelResult<f64> {
        let tier = self.agr_tier()?;
        let percentage = tier.percentage(self.policy_holder_age()?, self.partner_age()?);
        tracing::trace!(percentage, "rebate percentage resolved");
        Ok(percentage)
    }

    /// Whether a lifetime loading applies.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::MissingReference` if no loading provider was
    /// supplied.
    pub fn is_lhc_applied(&self) -> ModelResult<bool> {
        Ok(self.lhc_percentage()? > 0.0)
    }

    /// The lifetime loading percentage.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::MissingReference` if no loading provider was
    /// supplied.
    pub fn lhc_percentage(&self) -> ModelResult<f64> {
        self.loading
            .as_deref()
            .map(|provider| provider.loading())
            .ok_or_else(|| ExecutionError::missing("loading provider").into())
    }

    /// Whether the policy holder previously held hospital cover.
    #[must_use]
    pub fn policy_holder_previously_insured(&self) -> Option<bool> {
        self.flag(KnownPath::PolicyHolderPreviouslyInsured)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_policy_holder_previously_insured(&mut self, insured: bool) -> ModelResult<&mut Self> {
        self.set(KnownPath::PolicyHolderPreviouslyInsured, insured)
    }

    /// Whether the partner previously held hospital cover.
    #[must_use]
    pub fn partner_previously_insured(&self) -> Option<bool> {
        self.flag(KnownPath::PartnerPreviouslyInsured)
    }

    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_partner_previously_insured(&mut self, insured: bool) -> ModelResult<&mut Self> {
        self.set(KnownPath::PartnerPreviouslyInsured, insured)
    }
}

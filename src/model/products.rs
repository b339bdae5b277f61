//! Product selection: hospital, extras and combined products.
//!
//! Hospital and combined products are stored as plain codes. Extras are
//! stored as the full catalog structure and mapped back to a code by
//! structural comparison against the catalog.

use super::QuoteModel;
use crate::codes::{CodeSet, CombinedCode, ExtrasCode, HospitalCode, IntoCode};
use crate::error::{ExecutionError, ModelResult, ValidationError};
use crate::path::KnownPath;
use crate::product::ExtrasSelection;

impl QuoteModel {
    /// The selected hospital product.
    #[must_use]
    pub fn hospital_product_code(&self) -> Option<HospitalCode> {
        self.code(KnownPath::HospitalCode)
    }

    /// Selects a hospital product. `"None"` deselects hospital cover.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown codes, or a
    /// listener error.
    pub fn set_hospital_product_code(&mut self, code: impl IntoCode<HospitalCode>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::HospitalCode, code)
    }

    /// Returns true if a hospital product other than `None` is selected.
    ///
    /// A stored code outside the code set counts as no selection, matching
    /// [`hospital_product_code`](Self::hospital_product_code).
    #[must_use]
    pub fn is_hospital_product_selected(&self) -> bool {
        self.hospital_product_code()
            .is_some_and(|code| code != HospitalCode::None)
    }

    /// The code of the selected extras product.
    ///
    /// The canonical "no extras" structure reads as `"None"` even without a
    /// catalog. Other structures are looked up in the catalog; a structure
    /// the catalog does not contain reads as absent.
    #[must_use]
    pub fn extras_product_code(&self) -> Option<&str> {
        let stored = self.get(KnownPath::Extras)?;
        if *stored == ExtrasSelection::none().to_value() {
            return Some(ExtrasCode::None.into());
        }
        self.catalog.as_ref()?.code_for(stored)
    }

    /// The stored extras structure.
    #[must_use]
    pub fn extras_selection(&self) -> Option<ExtrasSelection> {
        let stored = self.get(KnownPath::Extras)?;
        match serde_json::from_value(stored.clone()) {
            Ok(selection) => Some(selection),
            Err(err) => {
                tracing::warn!(error = %err, "stored extras structure is malformed");
                None
            }
        }
    }

    /// Selects an extras product by catalog code.
    ///
    /// `"None"` stores the canonical "no extras" structure and needs no
    /// catalog, even when the catalog has its own `None` entry. Any other
    /// code stores a verbatim copy of the catalog's structure.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::MissingReference` if no catalog was supplied,
    /// `ValidationError::InvalidValue` if the code is not in the catalog, or
    /// a listener error.
    pub fn set_extras_product_code(&mut self, code: impl AsRef<str>) -> ModelResult<&mut Self> {
        let code = code.as_ref();
        let structure = if code == ExtrasCode::None.as_ref() {
            ExtrasSelection::none().to_value()
        } else {
            let catalog = self
                .catalog
                .as_ref()
                .ok_or_else(|| ExecutionError::missing("extras product catalog"))?;
            catalog
                .get(code)
                .cloned()
                .ok_or_else(|| Self::rejected(ValidationError::invalid_value(ExtrasCode::FIELD, code)))?
        };
        self.set(KnownPath::Extras, structure)
    }

    /// Stores an extras structure directly, bypassing the catalog.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn set_extras_selection(&mut self, selection: &ExtrasSelection) -> ModelResult<&mut Self> {
        self.set(KnownPath::Extras, selection.to_value())
    }

    /// Returns true if an extras structure other than "no extras" is stored.
    #[must_use]
    pub fn is_extras_product_selected(&self) -> bool {
        let present = self.get(KnownPath::Extras).is_some_and(|v| !v.is_null());
        present && self.get_str(KnownPath::ExtrasCode) != Some(ExtrasCode::None.as_ref())
    }

    /// The selected combined product.
    #[must_use]
    pub fn combined_product_code(&self) -> Option<CombinedCode> {
        self.code(KnownPath::CombinedCode)
    }

    /// Selects a combined product.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidValue` for unknown codes, or a
    /// listener error.
    pub fn set_combined_product_code(&mut self, code: impl IntoCode<CombinedCode>) -> ModelResult<&mut Self> {
        self.set_code(KnownPath::CombinedCode, code)
    }

    /// Returns true if a combined product other than `None` is selected.
    ///
    /// A stored code outside the code set counts as no selection.
    #[must_use]
    pub fn is_combined_product_selected(&self) -> bool {
        self.combined_product_code()
            .is_some_and(|code| code != CombinedCode::None)
    }

    /// Returns true if the selection includes hospital cover, either directly
    /// or through a combined product.
    #[must_use]
    pub fn has_hospital_component(&self) -> bool {
        self.is_hospital_product_selected() || self.is_combined_product_selected()
    }

    /// Clears every product selection.
    ///
    /// # Errors
    ///
    /// Returns the first listener error.
    pub fn clear_product_selection(&mut self) -> ModelResult<&mut Self> {
        self.set_hospital_product_code(HospitalCode::None)?
            .set_extras_product_code(ExtrasCode::None)?
            .set_combined_product_code(CombinedCode::None)
    }
}

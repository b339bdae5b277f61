//! Construction options for a quote model.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ModelResult, ValidationError};
use crate::path::{AttributePath, PathSchema};
use crate::product::ProductCatalog;
use crate::rebate::{Loading, LoadingProvider, RebateSchedule, RebateTierProvider};
use crate::time::{Clock, SystemClock};

/// Options bundle used to construct a [`QuoteModel`](crate::QuoteModel).
///
/// # Example
/// ```rust,ignore
/// let options = ModelOptions::new()
///     .loading(Loading::new(2.0))
///     .rebates(schedule)
///     .catalog(catalog)
///     .attributes(json!({"PersonalDetails": {"Scale": "Single"}}));
/// let model = QuoteModel::new(options)?;
/// ```
#[derive(Clone)]
pub struct ModelOptions {
    pub(crate) rebates: Option<Arc<dyn RebateTierProvider>>,
    pub(crate) loading: Option<Arc<dyn LoadingProvider>>,
    pub(crate) attributes: Value,
    pub(crate) catalog: Option<ProductCatalog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) schema: PathSchema,
}

impl ModelOptions {
    /// Options for an empty model with no collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the JSON options bundle
    /// `{agr, lhc, attributes, preBundledExtrasProducts}`.
    ///
    /// Every key is optional. `agr` is read as a [`RebateSchedule`], `lhc` as
    /// [`Loading`] and `preBundledExtrasProducts` as a [`ProductCatalog`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` if `bundle` is not an object
    /// or any entry is malformed.
    pub fn from_json(bundle: &Value) -> ModelResult<Self> {
        let Value::Object(map) = bundle else {
            return Err(ValidationError::InvalidOptions {
                reason: "options bundle must be an object".to_string(),
            }
            .into());
        };

        let mut options = Self::new();
        if let Some(agr) = map.get("agr").filter(|v| !v.is_null()) {
            options = options.rebates(RebateSchedule::from_json(agr)?);
        }
        if let Some(lhc) = map.get("lhc").filter(|v| !v.is_null()) {
            options = options.loading(Loading::from_json(lhc)?);
        }
        if let Some(attributes) = map.get("attributes") {
            options = options.attributes(attributes.clone());
        }
        if let Some(catalog) = map
            .get("preBundledExtrasProducts")
            .filter(|v| !v.is_null())
        {
            options = options.catalog(ProductCatalog::from_json(catalog)?);
        }
        Ok(options)
    }

    /// Set the rebate tier provider.
    #[must_use]
    pub fn rebates(mut self, provider: impl RebateTierProvider + 'static) -> Self {
        self.rebates = Some(Arc::new(provider));
        self
    }

    /// Set a shared rebate tier provider.
    #[must_use]
    pub fn shared_rebates(mut self, provider: Arc<dyn RebateTierProvider>) -> Self {
        self.rebates = Some(provider);
        self
    }

    /// Set the loading provider.
    #[must_use]
    pub fn loading(mut self, provider: impl LoadingProvider + 'static) -> Self {
        self.loading = Some(Arc::new(provider));
        self
    }

    /// Set a shared loading provider.
    #[must_use]
    pub fn shared_loading(mut self, provider: Arc<dyn LoadingProvider>) -> Self {
        self.loading = Some(provider);
        self
    }

    /// Seed the attribute tree. Seeding never fires events.
    #[must_use]
    pub fn attributes(mut self, attributes: Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the extras product catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: ProductCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the clock used for age calculations (default: system clock).
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Accept writes to any syntactically valid path (default: strict).
    #[must_use]
    pub fn permissive_paths(mut self) -> Self {
        self.schema.set_strict(false);
        self
    }

    /// Register an additional writable path.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPath` if `path` is malformed.
    pub fn register_path(mut self, path: &str) -> ModelResult<Self> {
        self.schema.register(AttributePath::parse(path)?);
        Ok(self)
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            rebates: None,
            loading: None,
            attributes: Value::Null,
            catalog: None,
            clock: Arc::new(SystemClock),
            schema: PathSchema::standard(),
        }
    }
}

impl fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("rebates", &self.rebates.is_some())
            .field("loading", &self.loading.is_some())
            .field("attributes", &self.attributes)
            .field("catalog", &self.catalog)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

//! The quote model: an observable attribute tree with derived fields.
//!
//! Every write goes through [`QuoteModel::set_with`], which
//! 1. validates the path against the schema,
//! 2. stores the value,
//! 3. runs the reactions wired for that path (which may write again, nesting
//!    the whole sequence on the same call stack),
//! 4. fires `change:<path>`,
//! 5. fires the generic `change` event.
//!
//! Reactions run first, so a `change:<path>` listener already sees derived
//! fields such as the gender defaulted from a title. All of this completes
//! before the write returns. Silent writes stop after step 2.
//!
//! A listener removed while an event is being dispatched does not fire for
//! the remainder of that dispatch.

mod accessors;
mod products;

pub use accessors::IntoAmount;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::bus::{Callback, ChangeBus, ListenerId};
use crate::codes::{gender_from_title, Gender};
use crate::config::ModelOptions;
use crate::error::{ModelResult, ValidationError};
use crate::event::{Change, EventName, IntoEventName};
use crate::path::{AttributePath, IntoPath, KnownPath, PathSchema};
use crate::price;
use crate::product::ProductCatalog;
use crate::reactor::{Reaction, Reactor};
use crate::rebate::{LoadingProvider, RebateTierProvider};
use crate::store::AttributeStore;
use crate::stream::ChangeStream;
use crate::time::{Clock, SystemClock};

/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Store the value without firing events or reactions.
    pub silent: bool,
}

impl SetOptions {
    /// Options for a silent write.
    #[must_use]
    pub const fn silent() -> Self {
        Self { silent: true }
    }
}

/// Reactive domain model for one quote session.
pub struct QuoteModel {
    store: AttributeStore,
    bus: ChangeBus<QuoteModel>,
    reactor: Reactor,
    schema: PathSchema,
    rebates: Option<Arc<dyn RebateTierProvider>>,
    loading: Option<Arc<dyn LoadingProvider>>,
    catalog: Option<ProductCatalog>,
    clock: Arc<dyn Clock>,
}

impl QuoteModel {
    /// Builds a model from an options bundle.
    ///
    /// Initial attributes are seeded silently: no listener or reaction runs,
    /// so e.g. a seeded title does not default the gender.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidOptions` if the initial attributes are
    /// neither `null` nor an object.
    pub fn new(options: ModelOptions) -> ModelResult<Self> {
        let ModelOptions {
            rebates,
            loading,
            attributes,
            catalog,
            clock,
            schema,
        } = options;

        let store = AttributeStore::from_tree(attributes)?;
        tracing::debug!(
            seeded = store.tree().len(),
            catalog = catalog.as_ref().map_or(0, ProductCatalog::len),
            rebates = rebates.is_some(),
            loading = loading.is_some(),
            strict_paths = schema.is_strict(),
            "quote model created"
        );

        Ok(Self {
            store,
            bus: ChangeBus::new(),
            reactor: Reactor::standard(),
            schema,
            rebates,
            loading,
            catalog,
            clock,
        })
    }

    /// Builds a model from the JSON options bundle.
    ///
    /// # Errors
    ///
    /// See [`ModelOptions::from_json`] and [`QuoteModel::new`].
    pub fn from_json(bundle: &Value) -> ModelResult<Self> {
        Self::new(ModelOptions::from_json(bundle)?)
    }

    /// The whole attribute tree.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        self.store.tree()
    }

    /// The extras catalog, if one was supplied.
    #[must_use]
    pub const fn catalog(&self) -> Option<&ProductCatalog> {
        self.catalog.as_ref()
    }

    /// The path schema writes are checked against.
    #[must_use]
    pub const fn schema(&self) -> &PathSchema {
        &self.schema
    }

    /// Reads the value at `path`. `None` means absent; malformed paths are
    /// always absent.
    #[must_use]
    pub fn get(&self, path: impl IntoPath) -> Option<&Value> {
        match path.into_path() {
            Ok(path) => self.store.get(&path),
            Err(err) => {
                tracing::trace!(error = %err, "read of malformed path");
                None
            }
        }
    }

    /// Reads a string value at a known path.
    pub(crate) fn get_str(&self, path: KnownPath) -> Option<&str> {
        self.store.get(&path.into()).and_then(Value::as_str)
    }

    /// Writes `value` at `path` and fires change events.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for malformed or unregistered paths, or
    /// the first error returned by a listener.
    pub fn set(&mut self, path: impl IntoPath, value: impl Into<Value>) -> ModelResult<&mut Self> {
        self.set_with(path, value, SetOptions::default())
    }

    /// Writes `value` at `path` with explicit options.
    ///
    /// Writing a value equal to the current one still fires events unless
    /// `options.silent` is set.
    ///
    /// # Errors
    ///
    /// See [`QuoteModel::set`].
    pub fn set_with(
        &mut self,
        path: impl IntoPath,
        value: impl Into<Value>,
        options: SetOptions,
    ) -> ModelResult<&mut Self> {
        let path = path.into_path()?;
        self.schema.check(&path)?;
        self.write(path, value.into(), options)?;
        Ok(self)
    }

    fn write(&mut self, path: AttributePath, value: Value, options: SetOptions) -> ModelResult<()> {
        tracing::trace!(path = %path, silent = options.silent, "attribute write");
        self.store.set(&path, value.clone());
        if options.silent {
            return Ok(());
        }

        let change = Change::new(path, value);
        self.react(&change)?;
        self.dispatch(&EventName::Path(change.path.clone()), &change)?;
        self.dispatch(&EventName::Change, &change)
    }

    /// Registers a listener and returns the model for chaining.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the event name is malformed or names an
    /// unregistered path.
    pub fn on<F>(&mut self, event: impl IntoEventName, callback: F) -> ModelResult<&mut Self>
    where
        F: Fn(&mut QuoteModel, &Change) -> ModelResult<()> + 'static,
    {
        self.subscribe(event, callback)?;
        Ok(self)
    }

    /// Registers a listener and returns its id for later removal.
    ///
    /// # Errors
    ///
    /// See [`QuoteModel::on`].
    pub fn subscribe<F>(&mut self, event: impl IntoEventName, callback: F) -> ModelResult<ListenerId>
    where
        F: Fn(&mut QuoteModel, &Change) -> ModelResult<()> + 'static,
    {
        let event = event.into_event_name()?;
        if let EventName::Path(path) = &event {
            self.schema.check(path)?;
        }
        let callback: Callback<QuoteModel> = Rc::new(callback);
        Ok(self.bus.subscribe(event, callback))
    }

    /// Opens a bounded stream receiving every change fired under `event`.
    ///
    /// # Errors
    ///
    /// See [`QuoteModel::on`].
    pub fn stream(&mut self, event: impl IntoEventName, capacity: usize) -> ModelResult<ChangeStream> {
        let (sink, rx, dropped) = ChangeStream::channel(capacity);
        let own_id: Rc<Cell<Option<ListenerId>>> = Rc::default();
        let listener_id = Rc::clone(&own_id);
        let listener = self.subscribe(event, move |model: &mut QuoteModel, change: &Change| {
            if !sink.deliver(change) {
                if let Some(id) = listener_id.get() {
                    tracing::debug!(listener = %id, "change stream closed, removing listener");
                    model.off(id);
                }
            }
            Ok(())
        })?;
        own_id.set(Some(listener));
        Ok(ChangeStream::new(listener, rx, dropped))
    }

    /// Removes a listener. Returns true if it was registered.
    pub fn off(&mut self, listener: ListenerId) -> bool {
        self.bus.unsubscribe(listener)
    }

    /// Number of listeners registered under `event`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the event name is malformed.
    pub fn listener_count(&self, event: impl IntoEventName) -> ModelResult<usize> {
        Ok(self.bus.listener_count(&event.into_event_name()?))
    }

    /// Invokes every listener registered under exactly `event`.
    ///
    /// No reactions run and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the event name is malformed, or the
    /// first error returned by a listener.
    pub fn emit(&mut self, event: impl IntoEventName, change: &Change) -> ModelResult<()> {
        let event = event.into_event_name()?;
        self.dispatch(&event, change)
    }

    fn dispatch(&mut self, event: &EventName, change: &Change) -> ModelResult<()> {
        let callbacks = self.bus.snapshot(event);
        if callbacks.is_empty() {
            return Ok(());
        }
        tracing::trace!(event = %event, listeners = callbacks.len(), "dispatching change");
        for (id, callback) in callbacks {
            if self.bus.contains(id) {
                callback(self, change)?;
            }
        }
        Ok(())
    }

    fn react(&mut self, change: &Change) -> ModelResult<()> {
        let reactions: Vec<Reaction> = self.reactor.reactions_for(&change.path).collect();
        for reaction in reactions {
            match reaction {
                Reaction::DefaultGender { title, gender } => self.default_gender(title, gender)?,
                Reaction::Broadcast(semantic) => {
                    self.dispatch(&EventName::Semantic(semantic), change)?;
                }
            }
        }
        Ok(())
    }

    fn default_gender(&mut self, title: KnownPath, gender: KnownPath) -> ModelResult<()> {
        match self.get_str(title).and_then(gender_from_title) {
            Some(derived) => self.write(gender.into(), Value::from(derived.as_ref()), SetOptions::default()),
            None => {
                tracing::trace!(title = %title, "title has no gender mapping, gender unchanged");
                Ok(())
            }
        }
    }

    /// Defaults the policy holder's gender from their title.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a listener of the gender write.
    pub fn default_policy_holder_gender(&mut self) -> ModelResult<&mut Self> {
        self.default_gender(KnownPath::PolicyHolderTitle, KnownPath::PolicyHolderGender)?;
        Ok(self)
    }

    /// Defaults the partner's gender from their title.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a listener of the gender write.
    pub fn default_partner_gender(&mut self) -> ModelResult<&mut Self> {
        self.default_gender(KnownPath::PartnerTitle, KnownPath::PartnerGender)?;
        Ok(self)
    }

    /// Guesses a gender from a title. See [`gender_from_title`].
    #[must_use]
    pub fn gender_from_title(title: &str) -> Option<Gender> {
        gender_from_title(title)
    }

    /// Whether a change at `path` could affect the price.
    /// See [`price::could_property_affect_price`].
    #[must_use]
    pub fn could_property_affect_price(path: &str) -> bool {
        price::could_property_affect_price(path)
    }

    pub(crate) fn rejected(err: ValidationError) -> ValidationError {
        tracing::debug!(error = %err, "rejected value");
        err
    }
}

impl Default for QuoteModel {
    fn default() -> Self {
        Self {
            store: AttributeStore::new(),
            bus: ChangeBus::new(),
            reactor: Reactor::standard(),
            schema: PathSchema::standard(),
            rebates: None,
            loading: None,
            catalog: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl fmt::Debug for QuoteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteModel")
            .field("attributes", self.store.tree())
            .field("bus", &self.bus)
            .field("catalog", &self.catalog)
            .field("rebates", &self.rebates.is_some())
            .field("loading", &self.loading.is_some())
            .finish_non_exhaustive()
    }
}

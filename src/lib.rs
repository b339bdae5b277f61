//! # Quote/Join Model
//!
//! A reactive domain model for a health-insurance quote and join flow. The
//! model holds every answer captured so far in a nested attribute tree and
//! tells interested parties when any of it changes.
//!
//! ## Core Concepts
//!
//! - **Attribute path**: a dot-separated address into the tree, e.g.
//!   `PersonalDetails.PolicyHolder.Title`
//! - **Change**: the `(path, value)` pair carried by every notification
//! - **Event**: `change`, `change:<path>`, or a semantic name such as
//!   `change:HospitalCode`
//! - **Reaction**: a built-in derived-field rule, e.g. title defaults gender
//! - **Collaborators**: rebate tiers, loading data and the extras catalog
//!
//! ## Usage
//!
//! ```rust
//! use quote_join_model::{Gender, KnownPath, ModelOptions, QuoteModel};
//!
//! let mut model = QuoteModel::new(ModelOptions::new()).unwrap();
//! model.on("change:HospitalCode", |_, change| {
//!     println!("hospital now {}", change.value);
//!     Ok(())
//! }).unwrap();
//!
//! model.set_policy_holder_title("Mrs").unwrap();
//! assert_eq!(model.policy_holder_gender(), Some(Gender::Female));
//!
//! model.set_hospital_product_code("TOP_WITH_OBS").unwrap();
//! assert!(QuoteModel::could_property_affect_price(KnownPath::State.as_ref()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Attribute tree
pub mod error;
pub mod path;
pub mod store;

// Notification
pub mod bus;
pub mod event;
pub mod reactor;
pub mod stream;

// Domain
pub mod codes;
pub mod config;
pub mod model;
pub mod price;
pub mod product;
pub mod rebate;
pub mod time;

// Re-export primary types at crate root for convenience
pub use bus::ListenerId;
pub use codes::{
    gender_from_title, CodeSet, CombinedCode, ExtrasCode, Frequency, Gender, HospitalCode,
    IntoCode, Scale,
};
pub use config::ModelOptions;
pub use error::{ExecutionError, ModelError, ModelResult, ValidationError};
pub use event::{Change, EventName, IntoEventName, SemanticEvent};
pub use model::{IntoAmount, QuoteModel, SetOptions};
pub use path::{AttributePath, IntoPath, KnownPath, PathSchema};
pub use price::{could_property_affect_price, price_affecting_paths};
pub use product::{ExtrasSelection, ProductCatalog};
pub use rebate::{
    AgeBand, BandedTier, Loading, LoadingProvider, RebateSchedule, RebateTier, RebateTierProvider,
};
pub use stream::ChangeStream;
pub use time::{AgeUnit, Clock, FixedClock, SystemClock};

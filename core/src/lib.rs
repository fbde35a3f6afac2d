//! Schema model and shared conventions for command binding.
//!
//! This crate defines the collaborator surface consumed by the
//! `command-bind` subsystem:
//!
//! - [`ModelSchema`] — an ordered set of typed fields describing a data
//!   shape, with defaults, requiredness, descriptions, and metadata sources.
//! - [`FieldSpec`] — one field: a [`TypeExpr`], required flag, optional
//!   default value or factory, description, and metadata.
//! - [`TypeExpr`] — the type-expression language (primitives, optionals,
//!   unions, literal choices, containers, and named aliases).
//! - [`Outcome`] — the system-wide success/failure result convention used
//!   for all expected per-invocation failures.
//! - [`is_safe_identifier`] — the guard applied to every name that enters a
//!   synthesized parameter table.
//!
//! # Example
//!
//! ```
//! use command_bind_core::*;
//! use serde_json::json;
//!
//! let schema = ModelSchema::new("deploy")
//!     .with_description("Deploy a service")
//!     .with_field(FieldSpec::required("name", TypeExpr::String))
//!     .with_field(
//!         FieldSpec::optional("retries", TypeExpr::Integer)
//!             .with_default(json!(3))
//!             .with_description("Retry attempts"),
//!     );
//!
//! assert_eq!(schema.field_names(), vec!["name", "retries"]);
//! assert!(is_safe_identifier("retries"));
//! ```

mod ident;
mod outcome;
mod types;

pub use ident::is_safe_identifier;
pub use outcome::Outcome;
pub use types::*;

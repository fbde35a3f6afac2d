//! Declarative-schema-to-command-parameter compilation.
//!
//! This crate takes a structured [`ModelSchema`](command_bind_core::ModelSchema)
//! — an ordered set of typed fields with defaults, requiredness, and
//! descriptions — and compiles it into a callable with a flat,
//! individually-named parameter list that a reflection-based command
//! framework can introspect. Validated reconstructed data is forwarded to a
//! business handler.
//!
//! The pipeline, leaves first:
//!
//! - [`TypeResolver`] — classifies type expressions into a small closed set
//!   of CLI-representable [`PrimitiveKind`]s; never fails, degrading to an
//!   opaque fallback.
//! - [`extract_descriptors`] — pulls one immutable [`FieldDescriptor`] per
//!   schema field, in declaration order, merging metadata sources
//!   last-writer-wins.
//! - [`build_parameter_specs`] — maps descriptors 1:1 onto CLI-facing
//!   [`ParameterSpec`]s (flag style for booleans, kind-appropriate empty
//!   defaults).
//! - [`synthesize_signature`] — builds the introspectable
//!   [`BoundSignature`]: an ordered parameter table plus a reflective binder;
//!   only identifier-checked names ever enter the table.
//! - [`ValidationBridge`] — reconstructs and validates a
//!   [`ModelInstance`] from flattened arguments; failures are returned,
//!   never thrown.
//! - [`decorate`] / [`decorate_many`] — orchestrates the above into a
//!   [`BoundCommand`] with a BUILD-once, INVOKE-repeatedly lifecycle.
//!
//! Build-time errors ([`ExtractionError`], [`SynthesisError`]) are fatal for
//! registration; invocation-time validation failures come back as failure
//! text via the [`Outcome`](command_bind_core::Outcome) convention.
//!
//! # Example
//!
//! ```
//! use command_bind::decorate;
//! use command_bind_core::{FieldSpec, ModelSchema, Outcome, TypeExpr};
//! use serde_json::json;
//!
//! let schema = ModelSchema::new("greet")
//!     .with_field(FieldSpec::required("name", TypeExpr::String))
//!     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
//!
//! let command = decorate(&schema, |m| {
//!     Outcome::success(json!(format!(
//!         "{}:{}",
//!         m.get("name").unwrap().as_str().unwrap(),
//!         m.get("retries").unwrap()
//!     )))
//! })
//! .unwrap();
//!
//! assert_eq!(command.invoke(&[("name", json!("x"))]), "x:3");
//! ```
//!
//! # Feature flags
//!
//! - `clap` (default) — [`to_clap_command`] and [`invoke_from_matches`],
//!   exposing the flat parameter list to a real clap `Command`.

#[cfg(feature = "clap")]
mod adapter;
mod cache;
mod decorate;
mod extract;
mod params;
mod resolve;
mod signature;
mod validate;

#[cfg(feature = "clap")]
pub use adapter::{invoke_from_matches, to_clap_command};
pub use cache::{WrapperCache, decorate_cached};
pub use decorate::{
    BindError, BoundCommand, CompiledSchema, Handler, compile_schema, decorate, decorate_many,
    from_compiled,
};
pub use extract::{ExtractionError, FieldDescriptor, extract_descriptors};
pub use params::{ParameterSpec, build_parameter_specs};
pub use resolve::{PrimitiveKind, Resolution, TypeResolver};
pub use signature::{
    BoundSignature, ParameterEntry, SynthesisError, UnknownArgument, synthesize_signature,
};
pub use validate::{ModelInstance, ValidationBridge, ValidationError};

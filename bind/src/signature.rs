//! Flat parameter signature synthesis.
//!
//! Builds a [`BoundSignature`]: an ordered parameter table of
//! `(name, kind, default)` entries that exactly mirrors a list of
//! [`ParameterSpec`]s. The table is the introspectable flat parameter list a
//! hosting framework sees, and its [`bind`](BoundSignature::bind) method is
//! the reflective binder that maps named call arguments back onto it —
//! declaration order preserved, defaults filled in.
//!
//! Only identifier-checked *names* ever enter the table; field values are
//! plain data and never influence its shape. Synthesis is all-or-nothing:
//! any failure aborts with a typed error and no partial signature exists.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use command_bind_core::is_safe_identifier;

use crate::params::ParameterSpec;
use crate::resolve::PrimitiveKind;

/// Signature synthesis errors. All build-time and fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    /// A spec's field name failed the identifier-safety check.
    #[error("parameter name '{0}' is not a safe identifier")]
    UnsafeIdentifier(String),
    /// Two specs map to the same parameter name.
    #[error("duplicate parameter name: {0}")]
    DuplicateParameter(String),
    /// The built table does not mirror the requested specs.
    #[error("synthesized signature has {built} parameters, expected {expected}")]
    ShapeMismatch {
        /// Number of parameters requested.
        expected: usize,
        /// Number of parameters actually built.
        built: usize,
    },
}

/// A named call argument did not match any declared parameter.
///
/// Invoke-time counterpart of a keyword-argument mismatch; surfaced to the
/// caller as a failure outcome, never a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected argument '{0}'")]
pub struct UnknownArgument(pub String);

/// One entry of the parameter table.
#[derive(Debug, Clone)]
pub struct ParameterEntry {
    /// Parameter name (a validated identifier).
    pub name: String,
    /// Resolved kind.
    pub kind: PrimitiveKind,
    /// Default used when the argument is not supplied.
    pub default: Value,
}

/// Introspectable flat parameter list with a reflective binder.
///
/// # Examples
///
/// ```
/// use command_bind::{build_parameter_specs, extract_descriptors, synthesize_signature};
/// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("m")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
///
/// let specs = build_parameter_specs(&extract_descriptors(&schema).unwrap());
/// let signature = synthesize_signature(&specs).unwrap();
///
/// let bound = signature.bind(&[("name", json!("x"))]).unwrap();
/// assert_eq!(bound, vec![
///     ("name".to_string(), json!("x")),
///     ("retries".to_string(), json!(3)),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundSignature {
    entries: Vec<ParameterEntry>,
}

impl BoundSignature {
    /// The declared parameters, in schema order.
    pub fn parameters(&self) -> &[ParameterEntry] {
        &self.entries
    }

    /// Maps named call arguments onto the parameter table.
    ///
    /// Returns `(name, value)` pairs in declaration order, filling defaults
    /// for parameters not supplied. An argument naming no declared parameter
    /// fails with [`UnknownArgument`]. If the same argument is supplied more
    /// than once, the last occurrence wins.
    pub fn bind(
        &self,
        args: &[(&str, Value)],
    ) -> Result<Vec<(String, Value)>, UnknownArgument> {
        for (name, _) in args {
            if !self.entries.iter().any(|entry| entry.name == *name) {
                return Err(UnknownArgument((*name).to_string()));
            }
        }

        Ok(self
            .entries
            .iter()
            .map(|entry| {
                let supplied = args
                    .iter()
                    .rev()
                    .find(|(name, _)| *name == entry.name)
                    .map(|(_, value)| value.clone());
                (
                    entry.name.clone(),
                    supplied.unwrap_or_else(|| entry.default.clone()),
                )
            })
            .collect())
    }
}

/// Synthesizes a [`BoundSignature`] mirroring `specs` exactly.
///
/// Three distinct failure modes, each fatal: an unsafe identifier, a
/// duplicate parameter name, and a post-build shape audit failure. No
/// partial signature is ever returned.
pub fn synthesize_signature(specs: &[ParameterSpec]) -> Result<BoundSignature, SynthesisError> {
    let mut entries: Vec<ParameterEntry> = Vec::with_capacity(specs.len());

    for spec in specs {
        if !is_safe_identifier(&spec.field_name) {
            return Err(SynthesisError::UnsafeIdentifier(spec.field_name.clone()));
        }
        if entries.iter().any(|entry| entry.name == spec.field_name) {
            return Err(SynthesisError::DuplicateParameter(spec.field_name.clone()));
        }
        entries.push(ParameterEntry {
            name: spec.field_name.clone(),
            kind: spec.kind.clone(),
            default: spec.default.clone(),
        });
    }

    // Audit the built table against the request before handing it out.
    let audit_ok = entries.len() == specs.len()
        && entries
            .iter()
            .zip(specs)
            .all(|(entry, spec)| entry.name == spec.field_name);
    if !audit_ok {
        return Err(SynthesisError::ShapeMismatch {
            expected: specs.len(),
            built: entries.len(),
        });
    }

    debug!(parameters = entries.len(), "Synthesized parameter signature");
    Ok(BoundSignature { entries })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};

    use crate::extract::extract_descriptors;
    use crate::params::build_parameter_specs;

    use super::*;

    fn signature_for(schema: &ModelSchema) -> BoundSignature {
        let specs = build_parameter_specs(&extract_descriptors(schema).unwrap());
        synthesize_signature(&specs).unwrap()
    }

    #[test]
    fn test_signature_mirrors_specs_in_order() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("name", TypeExpr::String))
            .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)))
            .with_field(FieldSpec::optional("verbose", TypeExpr::Boolean));

        let signature = signature_for(&schema);
        let names: Vec<_> = signature
            .parameters()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "retries", "verbose"]);
        assert_eq!(signature.parameters()[1].default, json!(3));
    }

    #[test]
    fn test_bind_fills_defaults_in_declaration_order() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("name", TypeExpr::String))
            .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));

        let signature = signature_for(&schema);
        let bound = signature.bind(&[("name", json!("x"))]).unwrap();
        assert_eq!(
            bound,
            vec![
                ("name".to_string(), json!("x")),
                ("retries".to_string(), json!(3)),
            ]
        );
    }

    #[test]
    fn test_bind_rejects_unknown_argument() {
        let schema =
            ModelSchema::new("m").with_field(FieldSpec::required("name", TypeExpr::String));

        let signature = signature_for(&schema);
        let err = signature
            .bind(&[("name", json!("x")), ("bogus", json!(1))])
            .unwrap_err();
        assert_eq!(err, UnknownArgument("bogus".to_string()));
    }

    #[test]
    fn test_unsafe_identifier_aborts_synthesis() {
        let spec = ParameterSpec {
            field_name: "rm -rf".to_string(),
            cli_name: "--rm -rf".to_string(),
            kind: PrimitiveKind::String,
            is_flag: false,
            default: json!(""),
            help: None,
        };

        let err = synthesize_signature(&[spec]).unwrap_err();
        assert_eq!(err, SynthesisError::UnsafeIdentifier("rm -rf".to_string()));
    }

    #[test]
    fn test_duplicate_parameter_aborts_synthesis() {
        let spec = ParameterSpec {
            field_name: "twice".to_string(),
            cli_name: "--twice".to_string(),
            kind: PrimitiveKind::String,
            is_flag: false,
            default: json!(""),
            help: None,
        };

        let err = synthesize_signature(&[spec.clone(), spec]).unwrap_err();
        assert_eq!(err, SynthesisError::DuplicateParameter("twice".to_string()));
    }

    #[test]
    fn test_field_values_never_shape_the_signature() {
        // A hostile default value must land in the table as inert data, not
        // alter which parameters exist.
        let schema = ModelSchema::new("m").with_field(
            FieldSpec::optional("payload", TypeExpr::String)
                .with_default(json!("$(rm -rf /); --inject")),
        );

        let signature = signature_for(&schema);
        assert_eq!(signature.parameters().len(), 1);
        assert_eq!(signature.parameters()[0].name, "payload");
        assert_eq!(
            signature.parameters()[0].default,
            json!("$(rm -rf /); --inject")
        );
    }
}

//! Command decoration: schema in, callable out.
//!
//! Orchestrates the whole pipeline. `decorate` runs the BUILD phase once
//! (extract descriptors → build parameter specs → synthesize the flat
//! signature) and hands back a [`BoundCommand`] whose INVOKE phase can run
//! repeatedly: bind arguments → reconstruct and validate → call the handler
//! → normalize the result to text.
//!
//! Build errors are fatal for registration: a schema that fails extraction
//! or synthesis never becomes a command. Invocation errors are expected and
//! come back as failure text, never as panics or `Err`.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use command_bind_core::{ModelSchema, Outcome};

use crate::extract::{ExtractionError, FieldDescriptor, extract_descriptors};
use crate::params::{ParameterSpec, build_parameter_specs};
use crate::signature::{BoundSignature, SynthesisError, synthesize_signature};
use crate::validate::{ModelInstance, ValidationBridge};

/// Build-phase errors. Either stage aborts registration outright.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// Field extraction failed.
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    /// Signature synthesis failed.
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

/// Handler invoked with the reconstructed, validated model instances —
/// one per decorated schema, in schema order.
pub type Handler = Arc<dyn Fn(&[ModelInstance]) -> Outcome + Send + Sync>;

/// Everything the build phase derives from one schema.
///
/// Descriptors, parameter specs, and the synthesized signature; cacheable by
/// schema fingerprint (see [`WrapperCache`](crate::WrapperCache)).
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// Schema name.
    pub name: String,
    /// Extracted field descriptors, in declaration order.
    pub descriptors: Vec<FieldDescriptor>,
    /// CLI parameter specs, 1:1 with descriptors.
    pub specs: Vec<ParameterSpec>,
    /// Signature over this schema's parameters alone.
    pub signature: BoundSignature,
}

/// Runs the build phase for one schema.
pub fn compile_schema(schema: &ModelSchema) -> Result<CompiledSchema, BindError> {
    let descriptors = extract_descriptors(schema)?;
    let specs = build_parameter_specs(&descriptors);
    let signature = synthesize_signature(&specs)?;
    debug!(schema = %schema.name, parameters = specs.len(), "Compiled schema");
    Ok(CompiledSchema {
        name: schema.name.clone(),
        descriptors,
        specs,
        signature,
    })
}

struct ParameterGroup {
    bridge: ValidationBridge,
    field_names: Vec<String>,
}

/// A schema-backed command: a callable with a flat, introspectable
/// parameter list.
///
/// Built once by [`decorate`] or [`decorate_many`]; invoked repeatedly.
/// [`invoke`](Self::invoke) always returns display text — validation and
/// handler failures come back as the failure message.
pub struct BoundCommand {
    name: String,
    params: Vec<ParameterSpec>,
    signature: BoundSignature,
    groups: Vec<ParameterGroup>,
    handler: Handler,
}

impl std::fmt::Debug for BoundCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCommand")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl BoundCommand {
    /// The command name (schema names joined for multi-schema commands).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter list, in schema order across all groups.
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// The synthesized flat signature.
    pub fn signature(&self) -> &BoundSignature {
        &self.signature
    }

    /// Invokes the command with named arguments.
    ///
    /// Binds arguments onto the signature (defaults filled), reconstructs
    /// and validates one model instance per schema group, calls the handler,
    /// and normalizes the outcome to text. Never panics and never returns an
    /// error type: every failure path produces the failure message.
    pub fn invoke(&self, args: &[(&str, Value)]) -> String {
        let bound = match self.signature.bind(args) {
            Ok(bound) => bound,
            Err(err) => return Outcome::failure(err.to_string()).into_text(),
        };

        let mut instances = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let group_args: Vec<(String, Value)> = bound
                .iter()
                .filter(|(name, _)| group.field_names.iter().any(|f| f == name))
                .cloned()
                .collect();
            match group.bridge.reconstruct_and_validate(&group_args) {
                Ok(instance) => instances.push(instance),
                Err(err) => return Outcome::failure(err.to_string()).into_text(),
            }
        }

        (self.handler)(&instances).into_text()
    }
}

/// Decorates a single schema with a handler.
///
/// The handler receives the reconstructed [`ModelInstance`] and returns an
/// [`Outcome`]; the wrapper normalizes it to text.
///
/// # Examples
///
/// ```
/// use command_bind::decorate;
/// use command_bind_core::{FieldSpec, ModelSchema, Outcome, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("greet")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
///
/// let command = decorate(&schema, |m| {
///     Outcome::success(json!(format!(
///         "{}:{}",
///         m.get("name").unwrap().as_str().unwrap(),
///         m.get("retries").unwrap()
///     )))
/// })
/// .unwrap();
///
/// assert_eq!(command.invoke(&[("name", json!("x"))]), "x:3");
/// ```
pub fn decorate<F>(schema: &ModelSchema, handler: F) -> Result<BoundCommand, BindError>
where
    F: Fn(&ModelInstance) -> Outcome + Send + Sync + 'static,
{
    decorate_many(std::slice::from_ref(schema), move |instances: &[ModelInstance]| {
        handler(&instances[0])
    })
}

/// Decorates several schemas into one command, one parameter group per
/// schema in order.
///
/// All groups share a single flat parameter list; a field name appearing in
/// two groups is a build-time [`SynthesisError`]. The handler receives one
/// instance per schema, in the same order.
pub fn decorate_many<F>(schemas: &[ModelSchema], handler: F) -> Result<BoundCommand, BindError>
where
    F: Fn(&[ModelInstance]) -> Outcome + Send + Sync + 'static,
{
    let compiled: Vec<CompiledSchema> = schemas
        .iter()
        .map(compile_schema)
        .collect::<Result<_, _>>()?;
    from_compiled(&compiled, Arc::new(handler))
}

/// Assembles a [`BoundCommand`] from already-compiled schemas.
///
/// Used by [`decorate_many`] and by the wrapper cache; re-synthesizes only
/// the cross-group flat signature.
pub fn from_compiled(
    compiled: &[CompiledSchema],
    handler: Handler,
) -> Result<BoundCommand, BindError> {
    let params: Vec<ParameterSpec> = compiled
        .iter()
        .flat_map(|c| c.specs.iter().cloned())
        .collect();
    // Cross-group collisions surface here as duplicate parameters.
    let signature = synthesize_signature(&params)?;

    let groups = compiled
        .iter()
        .map(|c| ParameterGroup {
            bridge: ValidationBridge::from_descriptors(&c.name, c.descriptors.clone()),
            field_names: c.descriptors.iter().map(|d| d.name.clone()).collect(),
        })
        .collect();

    let name = compiled
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(BoundCommand {
        name,
        params,
        signature,
        groups,
        handler,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use command_bind_core::{FieldSpec, TypeExpr};

    use super::*;

    fn greet_schema() -> ModelSchema {
        ModelSchema::new("greet")
            .with_field(FieldSpec::required("name", TypeExpr::String))
            .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)))
    }

    #[test]
    fn test_build_then_invoke() {
        let command = decorate(&greet_schema(), |m| {
            Outcome::success(json!(format!(
                "{}:{}",
                m.get("name").unwrap().as_str().unwrap(),
                m.get("retries").unwrap()
            )))
        })
        .unwrap();

        assert_eq!(command.name(), "greet");
        assert_eq!(command.invoke(&[("name", json!("x"))]), "x:3");
    }

    #[test]
    fn test_params_mirror_schema_order() {
        let command = decorate(&greet_schema(), |_| Outcome::success(json!(null))).unwrap();
        let names: Vec<_> = command.params().iter().map(|p| p.field_name.as_str()).collect();
        assert_eq!(names, vec!["name", "retries"]);
    }

    #[test]
    fn test_validation_failure_is_returned_not_thrown() {
        let command = decorate(&greet_schema(), |_| Outcome::success(json!("ok"))).unwrap();

        let output = command.invoke(&[("name", json!("x")), ("retries", json!("many"))]);
        assert!(output.contains("retries"), "got: {output}");
        assert!(output.contains("integer"), "got: {output}");
    }

    #[test]
    fn test_unknown_argument_is_returned_not_thrown() {
        let command = decorate(&greet_schema(), |_| Outcome::success(json!("ok"))).unwrap();

        let output = command.invoke(&[("bogus", json!(1))]);
        assert_eq!(output, "unexpected argument 'bogus'");
    }

    #[test]
    fn test_handler_failure_text_is_forwarded() {
        let command = decorate(&greet_schema(), |_| Outcome::failure("upstream broke")).unwrap();

        assert_eq!(command.invoke(&[("name", json!("x"))]), "upstream broke");
    }

    #[test]
    fn test_non_text_success_is_stringified() {
        let command =
            decorate(&greet_schema(), |m| Outcome::success(m.get("retries").unwrap().clone()))
                .unwrap();

        assert_eq!(command.invoke(&[("name", json!("x"))]), "3");
    }

    #[test]
    fn test_build_fails_on_broken_metadata() {
        let schema = ModelSchema::new("m").with_field(
            FieldSpec::required("f", TypeExpr::String).with_metadata("extras", json!([1, 2])),
        );

        let err = decorate(&schema, |_| Outcome::success(json!(null))).unwrap_err();
        assert!(matches!(err, BindError::Extraction(_)));
    }

    #[test]
    fn test_decorate_many_groups_by_schema() {
        let source = ModelSchema::new("source")
            .with_field(FieldSpec::required("src", TypeExpr::String));
        let target = ModelSchema::new("target")
            .with_field(FieldSpec::required("dst", TypeExpr::String));

        let command = decorate_many(&[source, target], |instances| {
            Outcome::success(json!(format!(
                "{}->{}",
                instances[0].get("src").unwrap().as_str().unwrap(),
                instances[1].get("dst").unwrap().as_str().unwrap()
            )))
        })
        .unwrap();

        assert_eq!(command.name(), "source target");
        assert_eq!(
            command.invoke(&[("src", json!("a")), ("dst", json!("b"))]),
            "a->b"
        );
    }

    #[test]
    fn test_decorate_many_rejects_cross_group_collision() {
        let a = ModelSchema::new("a").with_field(FieldSpec::required("name", TypeExpr::String));
        let b = ModelSchema::new("b").with_field(FieldSpec::required("name", TypeExpr::String));

        let err = decorate_many(&[a, b], |_| Outcome::success(json!(null))).unwrap_err();
        assert_eq!(
            err,
            BindError::Synthesis(SynthesisError::DuplicateParameter("name".to_string()))
        );
    }

    #[test]
    fn test_independent_wrappers_behave_identically() {
        let schema = greet_schema();
        let build = || {
            decorate(&schema, |m| {
                Outcome::success(json!(format!("{}", m.get("retries").unwrap())))
            })
            .unwrap()
        };

        let first = build();
        let second = build();
        let args = [("name", json!("x")), ("retries", json!(9))];
        assert_eq!(first.invoke(&args), second.invoke(&args));
    }
}

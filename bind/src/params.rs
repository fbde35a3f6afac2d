//! CLI parameter specification building.
//!
//! Maps [`FieldDescriptor`]s 1:1 onto [`ParameterSpec`]s, the CLI-facing
//! shape of each field: its long option name, flag/option style, effective
//! default, and help text. Opaque kinds stay textual at this layer; the
//! validation bridge re-checks them structurally at invocation.

use serde_json::Value;

use crate::extract::FieldDescriptor;
use crate::resolve::PrimitiveKind;

/// CLI-facing shape of one schema field.
///
/// Built once per descriptor, immutable thereafter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// The schema field this parameter maps back to.
    pub field_name: String,
    /// Long option name (`--retry-count` for field `retry_count`).
    pub cli_name: String,
    /// Resolved kind of the field.
    pub kind: PrimitiveKind,
    /// Boolean kinds render as flags, never valued options.
    pub is_flag: bool,
    /// Effective default: the descriptor's default, else a kind-appropriate
    /// empty default.
    pub default: Value,
    /// Help text shown by the hosting framework.
    pub help: Option<String>,
}

/// Builds one [`ParameterSpec`] per descriptor, preserving order.
///
/// # Examples
///
/// ```
/// use command_bind::{build_parameter_specs, extract_descriptors};
/// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("m")
///     .with_field(FieldSpec::required("retry_count", TypeExpr::Integer))
///     .with_field(FieldSpec::optional("dry_run", TypeExpr::Boolean).with_default(json!(false)));
///
/// let specs = build_parameter_specs(&extract_descriptors(&schema).unwrap());
/// assert_eq!(specs[0].cli_name, "--retry-count");
/// assert_eq!(specs[0].default, json!(0));
/// assert!(specs[1].is_flag);
/// ```
pub fn build_parameter_specs(descriptors: &[FieldDescriptor]) -> Vec<ParameterSpec> {
    descriptors
        .iter()
        .map(|descriptor| ParameterSpec {
            field_name: descriptor.name.clone(),
            cli_name: format!("--{}", descriptor.name.replace('_', "-")),
            kind: descriptor.kind.clone(),
            is_flag: descriptor.kind == PrimitiveKind::Boolean,
            default: descriptor
                .default
                .clone()
                .unwrap_or_else(|| empty_default(&descriptor.kind, descriptor.optional)),
            help: descriptor.description.clone(),
        })
        .collect()
}

/// Kind-appropriate empty default for a field with no declared default.
/// Optional kinds default to null regardless of the underlying kind.
fn empty_default(kind: &PrimitiveKind, optional: bool) -> Value {
    if optional {
        return Value::Null;
    }
    match kind {
        PrimitiveKind::String | PrimitiveKind::Choice(_) | PrimitiveKind::Opaque => {
            Value::String(String::new())
        }
        PrimitiveKind::Integer => Value::from(0),
        PrimitiveKind::Float => Value::from(0.0),
        PrimitiveKind::Boolean => Value::Bool(false),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};

    use crate::extract::extract_descriptors;

    use super::*;

    fn specs_for(schema: &ModelSchema) -> Vec<ParameterSpec> {
        build_parameter_specs(&extract_descriptors(schema).unwrap())
    }

    #[test]
    fn test_one_spec_per_descriptor_in_order() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("b", TypeExpr::String))
            .with_field(FieldSpec::required("a", TypeExpr::Integer));

        let specs = specs_for(&schema);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].field_name, "b");
        assert_eq!(specs[1].field_name, "a");
    }

    #[test]
    fn test_boolean_kind_is_flag_style() {
        let schema =
            ModelSchema::new("m").with_field(FieldSpec::optional("verbose", TypeExpr::Boolean));

        let specs = specs_for(&schema);
        assert!(specs[0].is_flag);
        assert_eq!(specs[0].default, json!(false));
    }

    #[test]
    fn test_cli_name_uses_kebab_case() {
        let schema =
            ModelSchema::new("m").with_field(FieldSpec::required("retry_count", TypeExpr::Integer));

        let specs = specs_for(&schema);
        assert_eq!(specs[0].cli_name, "--retry-count");
    }

    #[test]
    fn test_kind_appropriate_empty_defaults() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("s", TypeExpr::String))
            .with_field(FieldSpec::required("i", TypeExpr::Integer))
            .with_field(FieldSpec::required("f", TypeExpr::Float))
            .with_field(FieldSpec::optional(
                "o",
                TypeExpr::Optional(Box::new(TypeExpr::Integer)),
            ));

        let specs = specs_for(&schema);
        assert_eq!(specs[0].default, json!(""));
        assert_eq!(specs[1].default, json!(0));
        assert_eq!(specs[2].default, json!(0.0));
        assert_eq!(specs[3].default, json!(null));
    }

    #[test]
    fn test_declared_default_wins_over_empty_default() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));

        let specs = specs_for(&schema);
        assert_eq!(specs[0].default, json!(3));
    }

    #[test]
    fn test_opaque_kind_is_textual() {
        let schema = ModelSchema::new("m").with_field(FieldSpec::required(
            "items",
            TypeExpr::List(Box::new(TypeExpr::String)),
        ));

        let specs = specs_for(&schema);
        assert_eq!(specs[0].kind, PrimitiveKind::Opaque);
        assert_eq!(specs[0].default, json!(""));
        assert!(!specs[0].is_flag);
    }
}

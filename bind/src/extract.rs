//! Field descriptor extraction.
//!
//! Walks a [`ModelSchema`] and produces one immutable [`FieldDescriptor`]
//! per field, in declaration order. Extraction is fail-fast: any malformed
//! field aborts the whole call with an error naming the field, so a command
//! built over a broken schema never registers partially.

use serde_json::{Map, Value};
use tracing::debug;

use command_bind_core::{FieldSpec, ModelSchema, TypeExpr, is_safe_identifier};

use crate::resolve::{PrimitiveKind, TypeResolver};

/// Field extraction errors.
///
/// All variants are build-time and fatal for the schema being compiled.
// `thiserror` cannot derive this enum: a field named `source` is always
// inferred as the error source, and `String` is not an `Error`. The impls
// below reproduce exactly what the derive would have generated otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Field name is empty or not a safe identifier.
    UnsafeFieldName(String),
    /// A metadata source's value is not an object.
    MetadataNotObject {
        /// The field whose metadata failed to merge.
        field: String,
        /// Label of the offending source.
        source: String,
    },
    /// Two fields share a name.
    DuplicateField(String),
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsafeFieldName(name) => {
                write!(f, "field '{name}' is not a safe identifier")
            }
            Self::MetadataNotObject { field, source } => {
                write!(
                    f,
                    "metadata source '{source}' on field '{field}' is not mapping-shaped"
                )
            }
            Self::DuplicateField(name) => write!(f, "duplicate field name: {name}"),
        }
    }
}

impl std::error::Error for ExtractionError {}

/// Extracted per-field metadata driving parameter generation.
///
/// Created once per schema, immutable thereafter. Order matches schema
/// declaration order exactly.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// The declared type expression, as written in the schema.
    pub declared_type: TypeExpr,
    /// Resolved CLI-representable kind.
    pub kind: PrimitiveKind,
    /// Underlying concrete type after unwrapping.
    pub underlying: TypeExpr,
    /// Whether the type expression carries a nullable wrapper.
    pub optional: bool,
    /// Declared requiredness (independent of `optional`).
    pub required: bool,
    /// Materialized default (explicit value wins over factory).
    pub default: Option<Value>,
    /// Help text.
    pub description: Option<String>,
    /// Merged metadata, last-writer-wins across the field's sources.
    pub metadata: Map<String, Value>,
}

/// Extracts descriptors for every field of `schema`, in declaration order.
///
/// Fails fast: the first malformed field aborts the whole call, and no
/// partial descriptor list is ever returned.
///
/// # Examples
///
/// ```
/// use command_bind::extract_descriptors;
/// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("deploy")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
///
/// let descriptors = extract_descriptors(&schema).unwrap();
/// assert_eq!(descriptors.len(), 2);
/// assert_eq!(descriptors[0].name, "name");
/// assert_eq!(descriptors[1].default, Some(json!(3)));
/// ```
pub fn extract_descriptors(schema: &ModelSchema) -> Result<Vec<FieldDescriptor>, ExtractionError> {
    let resolver = TypeResolver::new(&schema.aliases);
    let mut descriptors = Vec::with_capacity(schema.fields.len());

    for field in &schema.fields {
        if descriptors
            .iter()
            .any(|d: &FieldDescriptor| d.name == field.name)
        {
            return Err(ExtractionError::DuplicateField(field.name.clone()));
        }
        descriptors.push(extract_field(&resolver, field)?);
    }

    debug!(
        schema = %schema.name,
        fields = descriptors.len(),
        "Extracted field descriptors"
    );
    Ok(descriptors)
}

fn extract_field(
    resolver: &TypeResolver<'_>,
    field: &FieldSpec,
) -> Result<FieldDescriptor, ExtractionError> {
    if !is_safe_identifier(&field.name) {
        return Err(ExtractionError::UnsafeFieldName(field.name.clone()));
    }

    let resolution = resolver.resolve(&field.type_expr);

    // Explicit default wins over the factory; the factory runs exactly once,
    // here at extraction time.
    let default = field
        .default
        .clone()
        .or_else(|| field.default_factory.as_ref().map(|factory| factory()));

    Ok(FieldDescriptor {
        name: field.name.clone(),
        declared_type: field.type_expr.clone(),
        kind: resolution.kind,
        underlying: resolution.underlying,
        optional: resolution.optional,
        required: field.required,
        default,
        description: field.description.clone(),
        metadata: merge_metadata(field)?,
    })
}

/// Merges a field's metadata sources in declaration order, last writer wins.
/// A non-object source fails the whole field.
fn merge_metadata(field: &FieldSpec) -> Result<Map<String, Value>, ExtractionError> {
    let mut merged = Map::new();

    for source in &field.metadata_sources {
        let Value::Object(entries) = &source.value else {
            return Err(ExtractionError::MetadataNotObject {
                field: field.name.clone(),
                source: source.label.clone(),
            });
        };
        for (key, value) in entries {
            merged.insert(key.clone(), value.clone());
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use command_bind_core::ModelSchema;

    use super::*;

    #[test]
    fn test_extract_preserves_declaration_order() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("zeta", TypeExpr::String))
            .with_field(FieldSpec::required("alpha", TypeExpr::Integer))
            .with_field(FieldSpec::required("mid", TypeExpr::Boolean));

        let descriptors = extract_descriptors(&schema).unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_optional_derives_from_type_not_default() {
        let schema = ModelSchema::new("m")
            .with_field(
                FieldSpec::required("with_default", TypeExpr::String).with_default(json!("x")),
            )
            .with_field(FieldSpec::optional(
                "nullable",
                TypeExpr::Optional(Box::new(TypeExpr::Integer)),
            ));

        let descriptors = extract_descriptors(&schema).unwrap();
        assert!(!descriptors[0].optional, "default must not imply optional");
        assert!(descriptors[1].optional);
    }

    #[test]
    fn test_default_factory_materializes_once() {
        let schema = ModelSchema::new("m").with_field(
            FieldSpec::optional("gen", TypeExpr::Integer).with_default_factory(|| json!(41)),
        );

        let descriptors = extract_descriptors(&schema).unwrap();
        assert_eq!(descriptors[0].default, Some(json!(41)));
    }

    #[test]
    fn test_explicit_default_wins_over_factory() {
        let schema = ModelSchema::new("m").with_field(
            FieldSpec::optional("both", TypeExpr::Integer)
                .with_default(json!(1))
                .with_default_factory(|| json!(2)),
        );

        let descriptors = extract_descriptors(&schema).unwrap();
        assert_eq!(descriptors[0].default, Some(json!(1)));
    }

    #[test]
    fn test_metadata_merges_last_writer_wins() {
        let schema = ModelSchema::new("m").with_field(
            FieldSpec::required("f", TypeExpr::String)
                .with_metadata("extras", json!({"group": "a", "hidden": false}))
                .with_metadata("annotation", json!({"group": "b"})),
        );

        let descriptors = extract_descriptors(&schema).unwrap();
        assert_eq!(descriptors[0].metadata.get("group"), Some(&json!("b")));
        assert_eq!(descriptors[0].metadata.get("hidden"), Some(&json!(false)));
    }

    #[test]
    fn test_non_object_metadata_fails_naming_field_and_source() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("fine", TypeExpr::String))
            .with_field(
                FieldSpec::required("broken", TypeExpr::String)
                    .with_metadata("annotation", json!("not a mapping")),
            );

        let err = extract_descriptors(&schema).unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MetadataNotObject {
                field: "broken".to_string(),
                source: "annotation".to_string(),
            }
        );
    }

    #[test]
    fn test_unsafe_field_name_fails() {
        let schema =
            ModelSchema::new("m").with_field(FieldSpec::required("bad name", TypeExpr::String));

        let err = extract_descriptors(&schema).unwrap_err();
        assert_eq!(err, ExtractionError::UnsafeFieldName("bad name".to_string()));
    }

    #[test]
    fn test_duplicate_field_name_fails() {
        let schema = ModelSchema::new("m")
            .with_field(FieldSpec::required("twice", TypeExpr::String))
            .with_field(FieldSpec::required("twice", TypeExpr::Integer));

        let err = extract_descriptors(&schema).unwrap_err();
        assert_eq!(err, ExtractionError::DuplicateField("twice".to_string()));
    }
}

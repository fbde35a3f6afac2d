//! Model reconstruction and validation.
//!
//! The bridge between a flat bound argument list and a structured, validated
//! model instance. Runs per-field coercion and constraint checks (numeric
//! parsing, boolean parsing, choice membership, presence of required
//! fields), and supports single-field validation for hosts that check
//! token-by-token while parsing.
//!
//! Validation failures are expected and frequent; they are returned as typed
//! errors that the decorator converts into failure outcomes, never panics.

use serde_json::Value;
use thiserror::Error;

use command_bind_core::ModelSchema;

use crate::extract::{ExtractionError, FieldDescriptor, extract_descriptors};
use crate::resolve::PrimitiveKind;

/// Per-invocation validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field with no declared default received no value.
    #[error("missing required field '{0}'")]
    MissingRequired(String),
    /// A value could not be coerced to the field's resolved kind.
    #[error("field '{field}' expects {expected}, got {actual}")]
    KindMismatch {
        /// Field being validated.
        field: String,
        /// Human-readable expected kind.
        expected: String,
        /// Rendering of the offending value.
        actual: String,
    },
    /// A value is not in a choice field's legal set.
    #[error("invalid choice '{value}' for field '{field}' (expected one of: {choices})")]
    InvalidChoice {
        /// Field being validated.
        field: String,
        /// The rejected value.
        value: String,
        /// Comma-separated legal values.
        choices: String,
    },
    /// Single-field validation was asked about a field the schema lacks.
    #[error("no such field '{0}'")]
    UnknownField(String),
}

/// A reconstructed, validated model instance.
///
/// Field order matches schema declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    /// Name of the schema this instance was reconstructed from.
    pub model: String,
    fields: Vec<(String, Value)>,
}

impl ModelInstance {
    /// Looks up a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Renders the instance as a JSON object string, fields in order.
    pub fn to_json(&self) -> String {
        let mut out = String::from("{");
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{}:{}", Value::String(name.clone()), value));
        }
        out.push('}');
        out
    }
}

/// Validates flat argument lists against one schema's field descriptors.
///
/// # Examples
///
/// ```
/// use command_bind::ValidationBridge;
/// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
/// use serde_json::json;
///
/// let schema = ModelSchema::new("m")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
///
/// let bridge = ValidationBridge::new(&schema).unwrap();
/// let instance = bridge
///     .reconstruct_and_validate(&[
///         ("name".to_string(), json!("x")),
///         ("retries".to_string(), json!("5")),
///     ])
///     .unwrap();
///
/// assert_eq!(instance.get("retries"), Some(&json!(5))); // coerced
/// ```
#[derive(Debug, Clone)]
pub struct ValidationBridge {
    model: String,
    descriptors: Vec<FieldDescriptor>,
}

impl ValidationBridge {
    /// Builds a bridge by extracting the schema's descriptors.
    pub fn new(schema: &ModelSchema) -> Result<Self, ExtractionError> {
        Ok(Self::from_descriptors(
            &schema.name,
            extract_descriptors(schema)?,
        ))
    }

    /// Builds a bridge over already-extracted descriptors.
    pub fn from_descriptors(model: &str, descriptors: Vec<FieldDescriptor>) -> Self {
        Self {
            model: model.to_string(),
            descriptors,
        }
    }

    /// Rebuilds a structured instance from flattened `(name, value)` pairs,
    /// running each field's coercion and constraint checks.
    ///
    /// A field absent from `args` falls back to its extracted default; a
    /// required field with neither fails. Errors are returned, never thrown
    /// across the wrapper boundary.
    pub fn reconstruct_and_validate(
        &self,
        args: &[(String, Value)],
    ) -> Result<ModelInstance, ValidationError> {
        let mut fields = Vec::with_capacity(self.descriptors.len());

        for descriptor in &self.descriptors {
            let supplied = args
                .iter()
                .find(|(name, _)| *name == descriptor.name)
                .map(|(_, value)| value.clone())
                .or_else(|| descriptor.default.clone())
                .unwrap_or(Value::Null);

            let value = coerce_field(descriptor, supplied)?;
            fields.push((descriptor.name.clone(), value));
        }

        Ok(ModelInstance {
            model: self.model.clone(),
            fields,
        })
    }

    /// Validates a single field value, for hosts that check field-by-field.
    pub fn validate_field(&self, name: &str, value: &Value) -> Result<Value, ValidationError> {
        let descriptor = self
            .descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        coerce_field(descriptor, value.clone())
    }
}

fn coerce_field(descriptor: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
    if value.is_null() {
        if descriptor.optional || !descriptor.required {
            return Ok(Value::Null);
        }
        return Err(ValidationError::MissingRequired(descriptor.name.clone()));
    }

    match &descriptor.kind {
        PrimitiveKind::String => coerce_string(descriptor, value),
        PrimitiveKind::Integer => coerce_integer(descriptor, value),
        PrimitiveKind::Float => coerce_float(descriptor, value),
        PrimitiveKind::Boolean => coerce_boolean(descriptor, value),
        PrimitiveKind::Choice(choices) => coerce_choice(descriptor, choices, value),
        // Opaque fields already passed the presence check; structure is the
        // caller's problem at this layer.
        PrimitiveKind::Opaque => Ok(value),
    }
}

fn coerce_string(descriptor: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
    match value {
        Value::String(_) => Ok(value),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(mismatch(descriptor, "string", &other)),
    }
}

fn coerce_integer(descriptor: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 => Ok(Value::from(f as i64)),
            _ => Err(mismatch(descriptor, "integer", &value)),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| mismatch(descriptor, "integer", &value)),
        other => Err(mismatch(descriptor, "integer", other)),
    }
}

fn coerce_float(descriptor: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(_) => Ok(value),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| mismatch(descriptor, "float", &value)),
        other => Err(mismatch(descriptor, "float", other)),
    }
}

fn coerce_boolean(descriptor: &FieldDescriptor, value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Bool(_) => Ok(value),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(mismatch(descriptor, "boolean", &value)),
        },
        other => Err(mismatch(descriptor, "boolean", other)),
    }
}

fn coerce_choice(
    descriptor: &FieldDescriptor,
    choices: &[String],
    value: Value,
) -> Result<Value, ValidationError> {
    let rendered = match &value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if choices.contains(&rendered) {
        Ok(Value::String(rendered))
    } else {
        Err(ValidationError::InvalidChoice {
            field: descriptor.name.clone(),
            value: rendered,
            choices: choices.join(", "),
        })
    }
}

fn mismatch(descriptor: &FieldDescriptor, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::KindMismatch {
        field: descriptor.name.clone(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

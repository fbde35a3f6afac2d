//! Schema type definitions for structured command models.
//!
//! This module defines the data model consumed by the binding subsystem: a
//! [`ModelSchema`] is an ordered list of typed [`FieldSpec`]s, each carrying a
//! [`TypeExpr`], requiredness, optional defaults, a description, and zero or
//! more metadata sources. The types are designed for serialization with
//! [`serde`] and can round-trip through JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Version of the schema contract (semver).
///
/// Embedded in every [`ModelSchema`] to track compatibility across schema
/// versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Type expression a schema field may declare.
///
/// Type expressions are classified by the binding subsystem down to a small
/// closed set of CLI-representable kinds. Optional wrappers, unions, literal
/// choices, containers, and alias references are all expressible; the
/// classifier guarantees every expression terminates in some kind.
///
/// # Examples
///
/// ```
/// use command_bind_core::TypeExpr;
/// use serde_json::json;
///
/// let opt_int = TypeExpr::Optional(Box::new(TypeExpr::Integer));
/// assert_eq!(opt_int.to_string(), "Optional[Integer]");
///
/// let choice = TypeExpr::Literal(vec![json!("json"), json!("yaml")]);
/// assert_eq!(choice.to_string(), "Literal[\"json\", \"yaml\"]");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// Text value.
    String,
    /// Integer value.
    Integer,
    /// Floating-point value.
    Float,
    /// Boolean value.
    Boolean,
    /// The null/none type (meaningful inside unions).
    Null,
    /// One of a fixed set of literal values (e.g., `Literal["a", "b"]`).
    Literal(Vec<Value>),
    /// Nullable wrapper around an inner type.
    Optional(Box<TypeExpr>),
    /// Union of several member types, tried in declaration order.
    Union(Vec<TypeExpr>),
    /// Homogeneous list container.
    List(Box<TypeExpr>),
    /// Key/value map container.
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// Fixed-arity tuple container.
    Tuple(Vec<TypeExpr>),
    /// Reference to a named alias in the schema's alias table.
    ///
    /// Aliases may be recursive; the classifier bounds resolution depth.
    Name(String),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, items: &[impl fmt::Display]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            TypeExpr::String => write!(f, "String"),
            TypeExpr::Integer => write!(f, "Integer"),
            TypeExpr::Float => write!(f, "Float"),
            TypeExpr::Boolean => write!(f, "Boolean"),
            TypeExpr::Null => write!(f, "Null"),
            TypeExpr::Literal(values) => {
                write!(f, "Literal[")?;
                join(f, values)?;
                write!(f, "]")
            }
            TypeExpr::Optional(inner) => write!(f, "Optional[{inner}]"),
            TypeExpr::Union(members) => {
                write!(f, "Union[")?;
                join(f, members)?;
                write!(f, "]")
            }
            TypeExpr::List(inner) => write!(f, "List[{inner}]"),
            TypeExpr::Map(key, value) => write!(f, "Map[{key}, {value}]"),
            TypeExpr::Tuple(members) => {
                write!(f, "Tuple[")?;
                join(f, members)?;
                write!(f, "]")
            }
            TypeExpr::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Factory producing a default value at schema-analysis time.
pub type DefaultFactory = Arc<dyn Fn() -> Value + Send + Sync>;

/// One named source of field metadata.
///
/// A schema field may carry several metadata sources (e.g., a framework
/// extras table plus an annotation payload). The extractor merges them in
/// declaration order with last-writer-wins semantics, and requires each
/// source's value to be a JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSource {
    /// Where this metadata came from (e.g., "extras", "annotation").
    pub label: String,
    /// The metadata payload; must be an object to be mergeable.
    pub value: Value,
}

/// Schema for a single model field.
///
/// Fields are declared in order; that order is preserved all the way through
/// parameter generation and is load-bearing for positional mapping.
///
/// # Examples
///
/// ```
/// use command_bind_core::{FieldSpec, TypeExpr};
/// use serde_json::json;
///
/// let name = FieldSpec::required("name", TypeExpr::String)
///     .with_description("Service name");
/// assert!(name.required);
///
/// let retries = FieldSpec::optional("retries", TypeExpr::Integer)
///     .with_default(json!(3));
/// assert_eq!(retries.default, Some(json!(3)));
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name (must be a safe identifier).
    pub name: String,
    /// Declared type expression.
    pub type_expr: TypeExpr,
    /// Whether a value must be supplied at invocation.
    pub required: bool,
    /// Explicit default value (wins over `default_factory`).
    pub default: Option<Value>,
    /// Factory producing a default value; invoked once during extraction.
    #[serde(skip)]
    pub default_factory: Option<DefaultFactory>,
    /// Help/description text.
    pub description: Option<String>,
    /// Metadata sources, merged last-writer-wins by the extractor.
    pub metadata_sources: Vec<MetadataSource>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("type_expr", &self.type_expr)
            .field("required", &self.required)
            .field("default", &self.default)
            .field(
                "default_factory",
                &self.default_factory.as_ref().map(|_| "<factory>"),
            )
            .field("description", &self.description)
            .field("metadata_sources", &self.metadata_sources)
            .finish()
    }
}

impl FieldSpec {
    /// Creates a required field.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind_core::{FieldSpec, TypeExpr};
    ///
    /// let field = FieldSpec::required("name", TypeExpr::String);
    /// assert!(field.required);
    /// assert_eq!(field.name, "name");
    /// ```
    pub fn required(name: &str, type_expr: TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            type_expr,
            required: true,
            default: None,
            default_factory: None,
            description: None,
            metadata_sources: Vec::new(),
        }
    }

    /// Creates an optional field.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind_core::{FieldSpec, TypeExpr};
    ///
    /// let field = FieldSpec::optional("pattern", TypeExpr::String);
    /// assert!(!field.required);
    /// ```
    pub fn optional(name: &str, type_expr: TypeExpr) -> Self {
        Self {
            required: false,
            ..Self::required(name, type_expr)
        }
    }

    /// Sets an explicit default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets a default factory, invoked once during extraction.
    ///
    /// An explicit default set via [`with_default`](Self::with_default) wins
    /// over the factory.
    pub fn with_default_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default_factory = Some(Arc::new(factory));
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a metadata source.
    ///
    /// Sources merge in the order they were added; later sources overwrite
    /// earlier keys.
    pub fn with_metadata(mut self, label: &str, value: Value) -> Self {
        self.metadata_sources.push(MetadataSource {
            label: label.to_string(),
            value,
        });
        self
    }
}

/// Complete schema for one structured command model.
///
/// This is the primary input to the binding subsystem. Field declaration
/// order is preserved exactly; the alias table backs [`TypeExpr::Name`]
/// references.
///
/// # Examples
///
/// ```
/// use command_bind_core::*;
/// use serde_json::json;
///
/// let schema = ModelSchema::new("deploy")
///     .with_field(FieldSpec::required("name", TypeExpr::String))
///     .with_field(FieldSpec::optional("retries", TypeExpr::Integer).with_default(json!(3)));
///
/// assert_eq!(schema.field_names(), vec!["name", "retries"]);
/// assert!(schema.field("retries").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Schema contract version (populated from [`SCHEMA_CONTRACT_VERSION`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Model name (e.g., the command this model backs).
    pub name: String,
    /// Short description of the model.
    pub description: Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<FieldSpec>,
    /// Named type aliases referenced by [`TypeExpr::Name`].
    pub aliases: BTreeMap<String, TypeExpr>,
}

impl ModelSchema {
    /// Creates a new empty schema with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            schema_version: Some(SCHEMA_CONTRACT_VERSION.to_string()),
            name: name.to_string(),
            description: None,
            fields: Vec::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a field, preserving declaration order.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Registers a type alias.
    pub fn with_alias(mut self, name: &str, type_expr: TypeExpr) -> Self {
        self.aliases.insert(name.to_string(), type_expr);
        self
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Stable identity of this schema, as a sha256 hex digest of its
    /// serialized form.
    ///
    /// Used as the key for wrapper caching. Two schemas with the same name,
    /// fields, defaults, and aliases share a fingerprint; default factories
    /// are not serialized and therefore do not participate.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_bind_core::{FieldSpec, ModelSchema, TypeExpr};
    ///
    /// let a = ModelSchema::new("x").with_field(FieldSpec::required("f", TypeExpr::String));
    /// let b = ModelSchema::new("x").with_field(FieldSpec::required("f", TypeExpr::String));
    /// assert_eq!(a.fingerprint(), b.fingerprint());
    ///
    /// let c = ModelSchema::new("y");
    /// assert_ne!(a.fingerprint(), c.fingerprint());
    /// ```
    pub fn fingerprint(&self) -> String {
        let serialized = serde_json::to_string(self).unwrap_or_else(|_| self.name.clone());
        let hash = Sha256::digest(serialized.as_bytes());
        format!("{hash:x}")
    }
}

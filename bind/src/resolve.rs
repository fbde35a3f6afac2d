//! Type expression classification.
//!
//! Resolves arbitrary [`TypeExpr`]s down to a small closed set of
//! CLI-representable [`PrimitiveKind`]s. Classification never fails: every
//! expression terminates in one of the fixed kinds, with
//! [`PrimitiveKind::Opaque`] as the universal escape hatch. Degradation to
//! the opaque fallback is soft and logged, never an error.
//!
//! # Examples
//!
//! ```
//! use command_bind::{PrimitiveKind, TypeResolver};
//! use command_bind_core::TypeExpr;
//! use std::collections::BTreeMap;
//!
//! let aliases = BTreeMap::new();
//! let resolver = TypeResolver::new(&aliases);
//!
//! let r = resolver.resolve(&TypeExpr::Optional(Box::new(TypeExpr::Integer)));
//! assert_eq!(r.kind, PrimitiveKind::Integer);
//! assert!(r.optional);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use command_bind_core::TypeExpr;

/// Maximum alias/wrapper nesting the resolver will follow before degrading
/// to the opaque fallback. Bounds recursive and self-referential aliases.
const MAX_RESOLVE_DEPTH: usize = 32;

/// CLI-representable type category.
///
/// The closed set every type expression collapses into. `Choice` carries its
/// legal values rendered as strings; `Opaque` is the universal fallback for
/// containers, unresolvable unions, and unknown aliases (represented
/// textually at the parameter layer, re-validated by the bridge).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Text value.
    String,
    /// Integer value.
    Integer,
    /// Floating-point value.
    Float,
    /// Boolean value (flag-style parameter).
    Boolean,
    /// One of a fixed set of literal values, rendered as strings.
    Choice(Vec<String>),
    /// Fallback for anything not directly representable.
    Opaque,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Integer => write!(f, "integer"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::Boolean => write!(f, "boolean"),
            PrimitiveKind::Choice(values) => write!(f, "choice of [{}]", values.join(", ")),
            PrimitiveKind::Opaque => write!(f, "opaque"),
        }
    }
}

/// Result of classifying one type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// The CLI-representable kind.
    pub kind: PrimitiveKind,
    /// The underlying concrete type after unwrapping optionals/unions.
    pub underlying: TypeExpr,
    /// Whether a nullable/optional wrapper (or null union member) was
    /// present. Derived strictly from the type expression, never from
    /// whether a default exists.
    pub optional: bool,
}

/// Classifies type expressions against a schema's alias table.
///
/// # Examples
///
/// ```
/// use command_bind::{PrimitiveKind, TypeResolver};
/// use command_bind_core::TypeExpr;
/// use std::collections::BTreeMap;
///
/// let mut aliases = BTreeMap::new();
/// aliases.insert("Port".to_string(), TypeExpr::Integer);
///
/// let resolver = TypeResolver::new(&aliases);
/// let r = resolver.resolve(&TypeExpr::Name("Port".into()));
/// assert_eq!(r.kind, PrimitiveKind::Integer);
/// ```
#[derive(Debug)]
pub struct TypeResolver<'a> {
    aliases: &'a BTreeMap<String, TypeExpr>,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver over the given alias table.
    pub fn new(aliases: &'a BTreeMap<String, TypeExpr>) -> Self {
        Self { aliases }
    }

    /// Classifies a type expression.
    ///
    /// Never fails; unresolvable expressions degrade to
    /// [`PrimitiveKind::Opaque`] with a warning.
    pub fn resolve(&self, expr: &TypeExpr) -> Resolution {
        let resolution = self.resolve_at(expr, 0);
        debug!(
            expr = %expr,
            kind = %resolution.kind,
            optional = resolution.optional,
            "Resolved type expression"
        );
        resolution
    }

    fn resolve_at(&self, expr: &TypeExpr, depth: usize) -> Resolution {
        if depth > MAX_RESOLVE_DEPTH {
            warn!(expr = %expr, depth, "Resolution depth exceeded; degrading to opaque fallback");
            return Resolution {
                kind: PrimitiveKind::Opaque,
                underlying: expr.clone(),
                optional: false,
            };
        }

        match expr {
            TypeExpr::String => direct(PrimitiveKind::String, TypeExpr::String),
            TypeExpr::Integer => direct(PrimitiveKind::Integer, TypeExpr::Integer),
            TypeExpr::Float => direct(PrimitiveKind::Float, TypeExpr::Float),
            TypeExpr::Boolean => direct(PrimitiveKind::Boolean, TypeExpr::Boolean),
            TypeExpr::Null => {
                // A bare null type carries no value; vacuously optional.
                self.opaque(expr, true)
            }
            TypeExpr::Literal(values) => self.resolve_literal(expr, values),
            TypeExpr::Optional(inner) => {
                let mut resolution = self.resolve_at(inner, depth + 1);
                resolution.optional = true;
                resolution
            }
            TypeExpr::Union(members) => self.resolve_union(expr, members, depth),
            TypeExpr::List(_) | TypeExpr::Map(_, _) | TypeExpr::Tuple(_) => {
                self.opaque(expr, false)
            }
            TypeExpr::Name(alias) => match self.aliases.get(alias) {
                Some(target) => self.resolve_at(target, depth + 1),
                None => {
                    warn!(alias = %alias, "Unknown type alias; degrading to opaque fallback");
                    self.opaque(expr, false)
                }
            },
        }
    }

    /// Literal members collapse via the primitive kind of their declared
    /// values; the legal value set is the values rendered as strings.
    fn resolve_literal(&self, expr: &TypeExpr, values: &[Value]) -> Resolution {
        if values.is_empty() {
            return self.opaque(expr, false);
        }

        let rendered = values.iter().map(render_literal).collect();
        Resolution {
            kind: PrimitiveKind::Choice(rendered),
            underlying: literal_base(values),
            optional: false,
        }
    }

    /// Non-null members are tried in declaration order; the first member
    /// that resolves to a concrete (non-opaque) kind wins. An empty or
    /// fully-unresolvable union degrades to the opaque fallback, keeping
    /// `optional` if a null member was present.
    fn resolve_union(&self, expr: &TypeExpr, members: &[TypeExpr], depth: usize) -> Resolution {
        let saw_null = members.iter().any(|m| matches!(m, TypeExpr::Null));

        for member in members {
            if matches!(member, TypeExpr::Null) {
                continue;
            }
            let resolution = self.resolve_at(member, depth + 1);
            if resolution.kind != PrimitiveKind::Opaque {
                return Resolution {
                    optional: saw_null || resolution.optional,
                    ..resolution
                };
            }
        }

        self.opaque(expr, saw_null)
    }

    fn opaque(&self, expr: &TypeExpr, optional: bool) -> Resolution {
        warn!(expr = %expr, "Type expression degraded to opaque fallback");
        Resolution {
            kind: PrimitiveKind::Opaque,
            underlying: expr.clone(),
            optional,
        }
    }
}

fn direct(kind: PrimitiveKind, underlying: TypeExpr) -> Resolution {
    Resolution {
        kind,
        underlying,
        optional: false,
    }
}

fn render_literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Base primitive shared by all literal values; `String` when mixed.
fn literal_base(values: &[Value]) -> TypeExpr {
    if values.iter().all(Value::is_boolean) {
        TypeExpr::Boolean
    } else if values.iter().all(Value::is_i64) {
        TypeExpr::Integer
    } else if values.iter().all(Value::is_number) {
        TypeExpr::Float
    } else {
        TypeExpr::String
    }
}

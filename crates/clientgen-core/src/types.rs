//! Resolution of descriptor type names into target type references.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::OperationError;

/// Primitive types shared by every target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
    Object,
}

/// A resolved type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeRef {
    Primitive(Primitive),
    List(Box<TypeRef>),
    /// A model type present in the run's known models
    Model(String),
    /// Anything the generator could not type
    Any,
}

impl TypeRef {
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::String))
    }

    /// Collect every model name referenced by this type
    pub fn collect_models(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Model(name) => {
                out.insert(name.clone());
            }
            Self::List(inner) => inner.collect_models(out),
            Self::Primitive(_) | Self::Any => {}
        }
    }
}

fn primitive(name: &str) -> Option<TypeRef> {
    let p = match name.to_lowercase().as_str() {
        "string" | "str" => Primitive::String,
        "integer" | "int" => Primitive::Integer,
        "number" | "float" => Primitive::Number,
        "boolean" | "bool" => Primitive::Boolean,
        "object" | "dict" => Primitive::Object,
        "array" | "list" => return Some(TypeRef::List(Box::new(TypeRef::Any))),
        "any" => return Some(TypeRef::Any),
        _ => return None,
    };
    Some(TypeRef::Primitive(p))
}

/// Resolves type names against the known models of a run.
///
/// Unknown model names never fail: they resolve to [`TypeRef::Any`] and an
/// `UnknownTypeReference` warning is recorded.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    known_models: &'a BTreeSet<String>,
    warnings: Vec<OperationError>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(known_models: &'a BTreeSet<String>) -> Self {
        Self {
            known_models,
            warnings: Vec::new(),
        }
    }

    /// Resolve a type name; `location` names the referencing element in warnings
    pub fn resolve(&mut self, type_name: &str, location: &str) -> TypeRef {
        let trimmed = type_name.trim();
        if let Some(t) = primitive(trimmed) {
            return t;
        }
        if let Some(inner) = list_item(trimmed) {
            return TypeRef::List(Box::new(self.resolve(inner, location)));
        }
        if self.known_models.contains(trimmed) {
            return TypeRef::Model(trimmed.to_string());
        }
        self.warn_unknown(trimmed, location);
        TypeRef::Any
    }

    /// Resolve a model name that must be known; `None` means "degrade"
    pub fn resolve_model(&mut self, type_name: &str, location: &str) -> Option<String> {
        let trimmed = type_name.trim();
        if self.known_models.contains(trimmed) {
            Some(trimmed.to_string())
        } else {
            self.warn_unknown(trimmed, location);
            None
        }
    }

    pub fn into_warnings(self) -> Vec<OperationError> {
        self.warnings
    }

    fn warn_unknown(&mut self, type_name: &str, location: &str) {
        log::warn!("unknown type '{}' referenced by {}", type_name, location);
        self.warnings.push(OperationError::UnknownTypeReference {
            type_name: type_name.to_string(),
            location: location.to_string(),
        });
    }
}

/// `list[Item]` / `List[Item]` / `array[Item]` → `Item`
/// Item type name of `list[X]` / `array[X]`
pub(crate) fn list_item(name: &str) -> Option<&str> {
    let open = name.find('[')?;
    let container = name[..open].to_lowercase();
    if !matches!(container.as_str(), "list" | "array") {
        return None;
    }
    name[open + 1..].strip_suffix(']').map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> BTreeSet<String> {
        ["User", "Order"].into_iter().map(String::from).collect()
    }

    #[test]
    fn test_resolves_primitives() {
        let models = known();
        let mut r = TypeResolver::new(&models);
        assert_eq!(r.resolve("string", "p"), TypeRef::Primitive(Primitive::String));
        assert_eq!(r.resolve("int", "p"), TypeRef::Primitive(Primitive::Integer));
        assert_eq!(r.resolve("Number", "p"), TypeRef::Primitive(Primitive::Number));
        assert_eq!(r.resolve("array", "p"), TypeRef::List(Box::new(TypeRef::Any)));
        assert!(r.into_warnings().is_empty());
    }

    #[test]
    fn test_resolves_known_models_and_lists() {
        let models = known();
        let mut r = TypeResolver::new(&models);
        assert_eq!(r.resolve("User", "p"), TypeRef::Model("User".into()));
        assert_eq!(
            r.resolve("list[Order]", "p"),
            TypeRef::List(Box::new(TypeRef::Model("Order".into())))
        );
        assert_eq!(
            r.resolve("list[integer]", "p"),
            TypeRef::List(Box::new(TypeRef::Primitive(Primitive::Integer)))
        );
    }

    #[test]
    fn test_unknown_model_degrades_with_warning() {
        let models = known();
        let mut r = TypeResolver::new(&models);
        assert_eq!(r.resolve("Ghost", "parameter 'g'"), TypeRef::Any);
        assert_eq!(r.resolve_model("Phantom", "response '200'"), None);
        let warnings = r.into_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(
            warnings[0],
            OperationError::UnknownTypeReference {
                type_name: "Ghost".into(),
                location: "parameter 'g'".into(),
            }
        );
    }

    #[test]
    fn test_collect_models() {
        let mut out = BTreeSet::new();
        TypeRef::List(Box::new(TypeRef::Model("User".into()))).collect_models(&mut out);
        TypeRef::Primitive(Primitive::String).collect_models(&mut out);
        assert_eq!(out.into_iter().collect::<Vec<_>>(), vec!["User".to_string()]);
    }
}

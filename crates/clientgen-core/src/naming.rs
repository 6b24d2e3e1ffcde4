//! Identifier normalization for generated code.
//!
//! Converts arbitrary identifiers from API descriptions (`X-Request-ID`,
//! `userId`, `/users/{id}`) into names that are valid in the generated
//! source, and renames the ones that collide with reserved words.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::descriptor::HttpMethod;
use crate::error::{Error, Result};

/// Name of the catch-all keyword parameter on every generated function.
pub const PASSTHROUGH_NAME: &str = "kwargs";

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("static regex"));
static CASE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex"));

/// Reserved words of the generation target and the name each is renamed to.
const RENAME_TABLE: &[(&str, &str)] = &[
    // keywords
    ("and", "and_"),
    ("as", "as_"),
    ("assert", "assert_"),
    ("async", "async_"),
    ("await", "await_"),
    ("break", "break_"),
    ("class", "class_"),
    ("continue", "continue_"),
    ("def", "def_"),
    ("del", "del_"),
    ("elif", "elif_"),
    ("else", "else_"),
    ("except", "except_"),
    ("finally", "finally_"),
    ("for", "for_"),
    ("from", "from_"),
    ("global", "global_"),
    ("if", "if_"),
    ("import", "import_"),
    ("in", "in_"),
    ("is", "is_"),
    ("lambda", "lambda_"),
    ("nonlocal", "nonlocal_"),
    ("not", "not_"),
    ("or", "or_"),
    ("pass", "pass_"),
    ("raise", "raise_"),
    ("return", "return_"),
    ("try", "try_"),
    ("while", "while_"),
    ("with", "with_"),
    ("yield", "yield_"),
    // builtins that are commonly used as parameter names
    ("all", "all_"),
    ("any", "any_"),
    ("bool", "bool_"),
    ("bytes", "bytes_"),
    ("dict", "dict_"),
    ("dir", "dir_"),
    ("filter", "filter_"),
    ("float", "float_"),
    ("format", "format_"),
    ("hash", "hash_"),
    ("help", "help_"),
    ("id", "id_"),
    ("input", "input_"),
    ("int", "int_"),
    ("iter", "iter_"),
    ("len", "len_"),
    ("list", "list_"),
    ("map", "map_"),
    ("max", "max_"),
    ("min", "min_"),
    ("next", "next_"),
    ("object", "object_"),
    ("open", "open_"),
    ("print", "print_"),
    ("property", "property_"),
    ("range", "range_"),
    ("set", "set_"),
    ("str", "str_"),
    ("sum", "sum_"),
    ("super", "super_"),
    ("type", "type_"),
    ("vars", "vars_"),
    ("zip", "zip_"),
];

/// Reserved names the generated code itself binds; no rename is attempted.
const RESERVED_WITHOUT_RULE: &[&str] = &["self", PASSTHROUGH_NAME];

/// Split an identifier into words on separators and case boundaries.
fn split_words(s: &str) -> Vec<String> {
    let replaced: String = s
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .map(|c| match c {
            ' ' | '/' | '.' | '-' => '_',
            other => other,
        })
        .collect::<String>()
        .replace('&', "and");
    let split = ACRONYM_BOUNDARY.replace_all(&replaced, "${1}_${2}");
    let split = CASE_BOUNDARY.replace_all(&split, "${1}_${2}");

    split
        .split('_')
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

fn is_acronym(word: &str) -> bool {
    word.len() > 1
        && word.chars().any(char::is_alphabetic)
        && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
}

fn capitalize(word: &str) -> String {
    if is_acronym(word) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert a string to PascalCase, keeping acronyms upper-case
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// Convert a string to camelCase
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut iter = words.iter();
    match iter.next() {
        None => String::new(),
        Some(first) => first.to_lowercase() + &iter.map(|w| capitalize(w)).collect::<String>(),
    }
}

/// Naming convention for generated parameter and function names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    #[default]
    Snake,
    Camel,
}

impl NamingStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Camel => "camel",
        }
    }
}

impl FromStr for NamingStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snake" => Ok(Self::Snake),
            "camel" => Ok(Self::Camel),
            _ => Err(format!("Unknown naming style: {}", s)),
        }
    }
}

impl fmt::Display for NamingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turns raw identifiers into target identifiers for one generation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    style: NamingStyle,
}

impl Normalizer {
    pub fn new(style: NamingStyle) -> Self {
        Self { style }
    }

    /// Normalize a parameter or placeholder name.
    ///
    /// Letters outside ASCII are kept, since the target accepts Unicode
    /// identifiers; other symbols are dropped.
    ///
    /// # Errors
    ///
    /// `InvalidIdentifier` when nothing usable is left after conversion,
    /// `UnmappedIdentifierCollision` when the result is reserved and the
    /// rename table has no entry for it.
    pub fn normalize(&self, name: &str) -> Result<String> {
        let mut ident = sanitize(&self.convert(name));

        if ident.is_empty() {
            return Err(Error::InvalidIdentifier(name.to_string()));
        }
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident = match self.style {
                NamingStyle::Snake => format!("p_{}", ident),
                NamingStyle::Camel => format!("p{}", ident),
            };
        }

        rename_reserved(name, ident)
    }

    /// Name of the wrapper function for an operation, e.g. `get_users_id`.
    ///
    /// Function names are snake-case regardless of the naming style.
    pub fn function_name(&self, method: HttpMethod, path: &str) -> Result<String> {
        let joined = format!("{} {}", method.as_str(), path);
        let name = sanitize(&to_snake_case(&joined));
        if name.is_empty() {
            return Err(Error::InvalidIdentifier(joined));
        }
        Ok(name)
    }

    /// Name of the raw-response variant of a wrapper function.
    pub fn raw_function_name(&self, wrapper: &str) -> String {
        format!("{}_with_http_info", wrapper)
    }

    /// Name of the grouping class for an API group, e.g. `UsersApi`.
    pub fn class_name(&self, api_group: &str) -> String {
        let mut base = sanitize(&to_pascal_case(api_group));
        if base.starts_with(|c: char| c.is_ascii_digit()) {
            base.insert(0, 'P');
        }
        if base.ends_with("Api") {
            base
        } else {
            format!("{}Api", base)
        }
    }

    fn convert(&self, name: &str) -> String {
        match self.style {
            NamingStyle::Snake => to_snake_case(name),
            NamingStyle::Camel => to_camel_case(name),
        }
    }
}

/// Keep letters, ASCII digits and `_`.
fn sanitize(converted: &str) -> String {
    converted
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_ascii_digit() || *c == '_')
        .collect()
}

fn rename_reserved(original: &str, ident: String) -> Result<String> {
    if let Some((_, renamed)) = RENAME_TABLE.iter().find(|(word, _)| *word == ident) {
        return Ok((*renamed).to_string());
    }
    if RESERVED_WITHOUT_RULE.contains(&ident.as_str()) {
        return Err(Error::UnmappedIdentifierCollision {
            name: original.to_string(),
            normalized: ident,
        });
    }
    Ok(ident)
}

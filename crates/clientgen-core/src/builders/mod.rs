//! Builders that turn one operation descriptor into function IR.
//!
//! Each builder is a pure transform of a validated descriptor plus the
//! run's naming and type tables; none of them depends on another
//! operation.

pub mod body;
pub mod docs;
pub mod signature;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::descriptor::{HttpMethod, OperationDescriptor};
use crate::error::OperationError;
use crate::naming::Normalizer;
use crate::types::TypeResolver;

pub use body::render_body;
pub use docs::build_docs;
pub use signature::build_signature;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]*)\}").expect("static regex"));

/// A descriptor whose structural fields are known to be present
#[derive(Debug, Clone, Copy)]
pub struct ValidOperation<'a> {
    pub descriptor: &'a OperationDescriptor,
    pub method: HttpMethod,
    pub path: &'a str,
}

impl<'a> ValidOperation<'a> {
    /// Check `method` and `path`; anything else missing is defaulted later
    pub fn validate(descriptor: &'a OperationDescriptor) -> Result<Self, OperationError> {
        let method = descriptor
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| OperationError::structural("missing `method`"))?
            .parse::<HttpMethod>()
            .map_err(OperationError::structural)?;
        let path = descriptor
            .path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| OperationError::structural("missing `path`"))?;

        Ok(Self {
            descriptor,
            method,
            path,
        })
    }
}

/// Per-operation state shared by the builders
#[derive(Debug)]
pub struct BuildContext<'a> {
    pub normalizer: Normalizer,
    pub resolver: TypeResolver<'a>,
    warnings: Vec<OperationError>,
}

impl<'a> BuildContext<'a> {
    pub fn new(normalizer: Normalizer, known_models: &'a BTreeSet<String>) -> Self {
        Self {
            normalizer,
            resolver: TypeResolver::new(known_models),
            warnings: Vec::new(),
        }
    }

    pub fn normalize(&self, name: &str) -> Result<String, OperationError> {
        Ok(self.normalizer.normalize(name)?)
    }

    pub fn warn(&mut self, warning: OperationError) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn into_warnings(self) -> Vec<OperationError> {
        let mut warnings = self.resolver.into_warnings();
        warnings.extend(self.warnings);
        warnings
    }
}

/// Placeholder names in a path template, in order of appearance
pub(crate) fn placeholders(path: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(path)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Split a path template into literal text and placeholder names
pub(crate) fn split_path(path: &str) -> Vec<(bool, &str)> {
    let mut parts = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(path) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            parts.push((false, &path[last..whole.start()]));
        }
        parts.push((true, name.as_str()));
        last = whole.end();
    }
    if last < path.len() {
        parts.push((false, &path[last..]));
    }
    parts
}

//! Per-target printers that turn function IR into source text.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::render::TargetKind;
//! use std::str::FromStr;
//!
//! let target = TargetKind::from_str("python_httpx").unwrap();
//! assert_eq!(target, TargetKind::PythonHttpx);
//! assert_eq!(target.to_string(), "python_httpx");
//! assert_eq!(TargetKind::default(), TargetKind::PythonHttpx);
//! ```

pub mod python;

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::ir::ApiModule;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};

/// Supported output targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Python with an httpx-style transport and pydantic models
    #[default]
    PythonHttpx,
}

impl FromStr for TargetKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python_httpx" | "python" => Ok(TargetKind::PythonHttpx),
            _ => Err(format!("Unknown target kind: {}", s)),
        }
    }
}

impl TargetKind {
    /// Returns the target identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PythonHttpx => "python_httpx",
        }
    }

    /// Returns an iterator over all available targets
    pub fn all() -> impl Iterator<Item = Self> {
        [TargetKind::PythonHttpx].iter().copied()
    }

    /// Printer for this target
    pub fn printer(&self) -> Result<Box<dyn SourcePrinter>> {
        match self {
            Self::PythonHttpx => Ok(Box::new(python::PythonPrinter::new()?)),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Renders one API module into target source.
///
/// Printers only format; ordering, defaulting and documentation content are
/// already decided in the IR. Rendering the same module twice must produce
/// identical text.
pub trait SourcePrinter {
    fn print(&self, module: &ApiModule) -> Result<String>;
}

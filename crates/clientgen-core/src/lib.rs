//! clientgen Core Library
//!
//! This library turns normalized API operation descriptors into HTTP client
//! source code: one grouping class per API group, and for every operation a
//! typed wrapper function plus a raw-response function.

pub mod builders;
pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod ir;
pub mod naming;
pub mod render;
pub mod report;
pub mod types;

pub use crate::{
    config::RunConfig,
    descriptor::{HttpMethod, OperationDescriptor, OperationSet, ParameterDescriptor},
    emit::{Emitter, Generation},
    error::{Error, OperationError, Result},
    naming::{NamingStyle, Normalizer},
    render::{SourcePrinter, TargetKind},
    report::GenerationReport,
};

/// Render `descriptors` into one source unit using `config`.
pub fn generate(descriptors: &[OperationDescriptor], config: &RunConfig) -> Result<Generation> {
    Emitter::new(config).emit(descriptors)
}

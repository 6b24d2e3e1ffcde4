//! Function pair emission for a whole generation run.
//!
//! # Examples
//!
//! ```
//! use clientgen_core::{Emitter, OperationDescriptor, ParameterDescriptor, RunConfig};
//!
//! let config = RunConfig::new("user-service", "users").with_models(["UserResponse"]);
//! let mut op = OperationDescriptor::new("get", "/users/{id}");
//! op.path_parameters.push(ParameterDescriptor::new("id", "string", true));
//! op.responses.insert("200".into(), "UserResponse".into());
//!
//! let generation = Emitter::new(&config).emit(&[op]).unwrap();
//! assert!(generation.source.contains("class UsersApi:"));
//! assert!(generation.report.is_clean());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::builders::{build_docs, build_signature, render_body, BuildContext, ValidOperation};
use crate::config::RunConfig;
use crate::descriptor::OperationDescriptor;
use crate::error::{OperationError, Result};
use crate::ir::{ApiModule, FunctionDescriptor, FunctionKind, FunctionPair, ReturnType};
use crate::naming::Normalizer;
use crate::report::GenerationReport;

/// Rendered source for one API group plus what went wrong producing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub api_group: String,
    pub source: String,
    pub report: GenerationReport,
}

/// Result of building one operation
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub identity: String,
    /// `None` when a fatal error was found
    pub pair: Option<FunctionPair>,
    pub diagnostics: Vec<OperationError>,
}

/// Emits wrapper/raw-response function pairs for a run.
#[derive(Debug, Clone)]
pub struct Emitter<'a> {
    config: &'a RunConfig,
    normalizer: Normalizer,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(config.naming_style),
        }
    }

    /// Build the function pair of one operation.
    ///
    /// Independent of every other operation, so hosts may call this in
    /// parallel.
    pub fn build_operation(&self, index: usize, descriptor: &OperationDescriptor) -> OperationOutcome {
        let identity = descriptor.identity(index);
        let mut ctx = BuildContext::new(self.normalizer, &self.config.known_model_types);

        let built = self.build_pair(&identity, descriptor, &mut ctx);
        let mut diagnostics = ctx.into_warnings();
        let pair = match built {
            Ok(pair) => Some(pair),
            Err(err) => {
                log::warn!("skipping operation {}: {}", identity, err);
                diagnostics.push(err);
                None
            }
        };

        OperationOutcome {
            identity,
            pair,
            diagnostics,
        }
    }

    fn build_pair(
        &self,
        identity: &str,
        descriptor: &OperationDescriptor,
        ctx: &mut BuildContext<'_>,
    ) -> std::result::Result<FunctionPair, OperationError> {
        let op = ValidOperation::validate(descriptor)?;
        let wrapper_name = self.normalizer.function_name(op.method, op.path)?;
        let raw_name = self.normalizer.raw_function_name(&wrapper_name);

        let signature = build_signature(&op, ctx)?;
        let wrapper_plan = render_body(&op, &signature, FunctionKind::Wrapper, &raw_name, ctx)?;
        let raw_plan = render_body(&op, &signature, FunctionKind::RawResponse, &raw_name, ctx)?;

        let wrapper_returns = wrapper_plan.returns();
        let wrapper = FunctionDescriptor {
            name: wrapper_name,
            kind: FunctionKind::Wrapper,
            is_async: self.config.async_mode,
            docs: build_docs(descriptor, &signature, &wrapper_returns),
            signature: signature.clone(),
            plan: wrapper_plan,
            returns: wrapper_returns,
        };
        let raw = FunctionDescriptor {
            name: raw_name,
            kind: FunctionKind::RawResponse,
            is_async: self.config.async_mode,
            docs: build_docs(descriptor, &signature, &ReturnType::RawResponse),
            signature,
            plan: raw_plan,
            returns: ReturnType::RawResponse,
        };

        Ok(FunctionPair {
            operation: identity.to_string(),
            wrapper,
            raw,
        })
    }

    /// Build every operation in order and collect the report.
    ///
    /// A second operation that would generate an already used function name
    /// is rejected as structural.
    pub fn build(&self, descriptors: &[OperationDescriptor]) -> (Vec<FunctionPair>, GenerationReport) {
        self.build_indexed(descriptors.iter().enumerate())
    }

    fn build_indexed<'d, I>(&self, descriptors: I) -> (Vec<FunctionPair>, GenerationReport)
    where
        I: IntoIterator<Item = (usize, &'d OperationDescriptor)>,
    {
        let mut pairs = Vec::new();
        let mut report = GenerationReport::default();
        let mut names = HashSet::new();

        for (index, descriptor) in descriptors {
            let outcome = self.build_operation(index, descriptor);
            for diagnostic in outcome.diagnostics {
                report.record(&outcome.identity, diagnostic);
            }
            let Some(pair) = outcome.pair else {
                continue;
            };
            let taken = [&pair.wrapper.name, &pair.raw.name]
                .into_iter()
                .find(|name| names.contains(*name));
            if let Some(name) = taken {
                report.record(
                    &outcome.identity,
                    OperationError::structural(format!(
                        "function '{}' is already generated by another operation",
                        name
                    )),
                );
                continue;
            }
            names.insert(pair.wrapper.name.clone());
            names.insert(pair.raw.name.clone());
            pairs.push(pair);
        }

        report.generated = pairs.len();
        (pairs, report)
    }

    /// Assemble the printable module for a set of pairs
    pub fn module(&self, pairs: Vec<FunctionPair>) -> ApiModule {
        let models: BTreeSet<String> = pairs
            .iter()
            .flat_map(FunctionPair::referenced_models)
            .filter(|m| self.config.known_model_types.contains(m))
            .collect();

        ApiModule {
            service_name: self.config.service_name.clone(),
            class_name: self.normalizer.class_name(&self.config.api_group_name),
            is_async: self.config.async_mode,
            model_import_path: self.config.model_import_path(),
            transport_module: self.config.transport_module.clone(),
            models,
            pairs,
        }
    }

    /// Render all descriptors into one source unit for `config.api_group_name`.
    ///
    /// Fatal problems with individual operations end up in the report; the
    /// remaining operations are still rendered.
    pub fn emit(&self, descriptors: &[OperationDescriptor]) -> Result<Generation> {
        log::info!(
            "Generating {} client for {} ({} operation(s))",
            self.config.api_group_name,
            self.config.service_name,
            descriptors.len()
        );
        let (pairs, report) = self.build(descriptors);
        self.render(pairs, report)
    }

    /// Render one source unit per API group.
    ///
    /// Operations are grouped by their first tag; untagged operations fall
    /// into `config.api_group_name`. Groups come out in name order, and
    /// operations keep descriptor order within a group.
    pub fn emit_grouped(&self, descriptors: &[OperationDescriptor]) -> Result<Vec<Generation>> {
        let mut groups: BTreeMap<&str, Vec<(usize, &OperationDescriptor)>> = BTreeMap::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            let group = descriptor
                .primary_tag()
                .unwrap_or(self.config.api_group_name.as_str());
            groups.entry(group).or_default().push((index, descriptor));
        }

        let mut out = Vec::with_capacity(groups.len());
        for (group, members) in groups {
            let config = self.config.for_group(group);
            let emitter = Emitter::new(&config);
            log::info!("Generating client for group {}", group);
            let (pairs, report) = emitter.build_indexed(members);
            out.push(emitter.render(pairs, report)?);
        }
        Ok(out)
    }

    fn render(&self, pairs: Vec<FunctionPair>, report: GenerationReport) -> Result<Generation> {
        let printer = self.config.target.printer()?;
        let module = self.module(pairs);
        let source = printer.print(&module)?;
        Ok(Generation {
            api_group: self.config.api_group_name.clone(),
            source,
            report,
        })
    }
}

//! Intermediate representation of generated functions.
//!
//! Builders turn descriptors into these values; printers turn them into
//! target source. Nothing in here knows about target syntax.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::descriptor::HttpMethod;
use crate::types::TypeRef;

/// Which of the two functions of an operation is being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Convenience function returning the parsed success type
    Wrapper,
    /// Function returning the transport response untouched
    RawResponse,
}

/// Where a parameter's value ends up in the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamSource {
    Body,
    Path,
    Query,
    Header,
}

/// Default assigned to an optional parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// String-typed parameters always default to an empty string
    EmptyString,
    /// The literal from the descriptor
    Literal(JsonValue),
    /// No literal was supplied
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureParam {
    /// Normalized identifier used in the generated code
    pub name: String,
    /// Identifier as given by the descriptor
    pub raw_name: String,
    pub source: ParamSource,
    pub type_ref: TypeRef,
    pub required: bool,
    /// `None` for required parameters
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
}

/// Ties a declared request element to the variable that carries its value.
///
/// Every declared parameter has a binding, including ones whose normalized
/// name was deduplicated out of the parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub source: ParamSource,
    /// Name on the wire (query key, header name, placeholder)
    pub raw_name: String,
    pub var: String,
}

/// Ordered parameter list shared by both functions of an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub params: Vec<SignatureParam>,
    pub bindings: Vec<Binding>,
    /// Trailing catch-all for transport-level overrides
    pub passthrough: String,
}

impl Signature {
    pub fn bindings_for(&self, source: ParamSource) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.source == source)
    }

    pub fn body(&self) -> Option<&SignatureParam> {
        self.params.iter().find(|p| p.source == ParamSource::Body)
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum ReturnType {
    /// Parsed success model
    Model(String),
    /// The transport response object
    RawResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDoc {
    pub name: String,
    pub type_ref: TypeRef,
    pub required: bool,
    /// Description wrapped to the parameter column width
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocBlock {
    /// Summary wrapped to the summary column width
    pub summary: Vec<String>,
    pub params: Vec<ParamDoc>,
    pub passthrough: String,
    pub returns: ReturnType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PathSegment {
    Literal(String),
    /// Variable substituted into the path
    Param(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathTemplate {
    pub segments: Vec<PathSegment>,
}

impl PathTemplate {
    pub fn has_params(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PathSegment::Param(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Model serialized by alias with empty fields omitted, JSON content type
    Model,
    /// List of models, each dumped the same way, JSON content type
    ModelList,
    /// Untyped value handed to the transport as JSON
    Untyped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyPayload {
    pub var: String,
    pub encoding: BodyEncoding,
}

/// How the raw-response function assembles and sends the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestPlan {
    pub method: HttpMethod,
    pub path: PathTemplate,
    /// Falsy values are dropped at call time
    pub query: Vec<Binding>,
    /// Falsy values are dropped, the rest stringified, passthrough headers win
    pub headers: Vec<Binding>,
    pub body: Option<BodyPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum ResponsePlan {
    /// Parse the response text into the model
    Deserialize(String),
    /// Hand the response back unchanged
    Raw,
}

/// How the wrapper calls through to the raw-response function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DelegatePlan {
    pub target: String,
    pub args: Vec<String>,
    pub response: ResponsePlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyPlan {
    Request(RequestPlan),
    Delegate(DelegatePlan),
}

impl BodyPlan {
    pub fn returns(&self) -> ReturnType {
        match self {
            Self::Delegate(DelegatePlan {
                response: ResponsePlan::Deserialize(model),
                ..
            }) => ReturnType::Model(model.clone()),
            _ => ReturnType::RawResponse,
        }
    }
}

/// Everything a printer needs to emit one function
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub kind: FunctionKind,
    /// Cooperative calling convention; the single call in `plan` is a suspension point
    pub is_async: bool,
    pub signature: Signature,
    pub docs: DocBlock,
    pub plan: BodyPlan,
    pub returns: ReturnType,
}

/// Wrapper and raw-response functions of one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionPair {
    /// Identity of the source operation
    pub operation: String,
    pub wrapper: FunctionDescriptor,
    pub raw: FunctionDescriptor,
}

impl FunctionPair {
    /// Model names referenced by either function
    pub fn referenced_models(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for param in &self.wrapper.signature.params {
            param.type_ref.collect_models(&mut out);
        }
        if let ReturnType::Model(model) = &self.wrapper.returns {
            out.insert(model.clone());
        }
        out
    }
}

/// One rendered source unit: a grouping class and its function pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiModule {
    pub service_name: String,
    pub class_name: String,
    pub is_async: bool,
    pub model_import_path: String,
    pub transport_module: String,
    /// Sorted, deduplicated model imports
    pub models: BTreeSet<String>,
    pub pairs: Vec<FunctionPair>,
}

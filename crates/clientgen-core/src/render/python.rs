//! Python printer for httpx-style transports and pydantic models.
//!
//! The module shell (imports, grouping class, constructor) comes from a tera
//! template; functions are laid out here because their indentation depends on
//! the plan being printed.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tera::{Context, Tera};

use super::SourcePrinter;
use crate::error::Result;
use crate::ir::{
    ApiModule, BodyEncoding, BodyPlan, DefaultValue, DelegatePlan, DocBlock, FunctionDescriptor,
    PathSegment, PathTemplate, RequestPlan, ResponsePlan, ReturnType, SignatureParam,
};
use crate::types::{Primitive, TypeRef};

const TEMPLATE_NAME: &str = "api_client.py.tera";
const TEMPLATE: &str = include_str!("../../templates/python_httpx/api_client.py.tera");
const INDENT: &str = "    ";

/// Module-level template context
#[derive(Debug, Serialize)]
struct ModuleView<'a> {
    service_name: &'a str,
    class_name: &'a str,
    client_type: &'static str,
    transport_module: &'a str,
    model_import_path: &'a str,
    models: Vec<&'a str>,
    functions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PythonPrinter {
    tera: Tera,
}

impl PythonPrinter {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { tera })
    }
}

impl SourcePrinter for PythonPrinter {
    fn print(&self, module: &ApiModule) -> Result<String> {
        let functions = module
            .pairs
            .iter()
            .flat_map(|pair| [&pair.wrapper, &pair.raw])
            .map(print_function)
            .collect();

        let view = ModuleView {
            service_name: &module.service_name,
            class_name: &module.class_name,
            client_type: if module.is_async {
                "AsyncClient"
            } else {
                "Client"
            },
            transport_module: &module.transport_module,
            model_import_path: &module.model_import_path,
            models: module.models.iter().map(String::as_str).collect(),
            functions,
        };

        log::debug!(
            "Rendering {} with {} function(s)",
            module.class_name,
            view.functions.len()
        );
        let context = Context::from_serialize(&view)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Lines of a function body, indented in units of four spaces
#[derive(Default)]
struct Block {
    lines: Vec<String>,
}

impl Block {
    fn line(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(depth), text));
        }
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn print_function(f: &FunctionDescriptor) -> String {
    let mut out = Block::default();
    let keyword = if f.is_async { "async def" } else { "def" };

    out.line(1, format!("{} {}(", keyword, f.name));
    out.line(2, "self,");
    for param in parameter_list(&f.signature.params) {
        out.line(2, format!("{},", param));
    }
    out.line(2, format!("**{},", f.signature.passthrough));
    out.line(1, format!(") -> {}:", return_annotation(&f.returns)));

    print_docs(&mut out, &f.docs, &f.signature.passthrough);

    match &f.plan {
        BodyPlan::Delegate(plan) => print_delegate(&mut out, plan, f),
        BodyPlan::Request(plan) => print_request(&mut out, plan, f),
    }
    out.finish()
}

/// Parameter declarations in signature order.
///
/// A bare `*` goes in front of the first required parameter that follows an
/// optional one; everything after it becomes keyword-only, which keeps the
/// declared order legal.
fn parameter_list(params: &[SignatureParam]) -> Vec<String> {
    let mut out = Vec::with_capacity(params.len() + 1);
    let mut seen_optional = false;
    let mut keyword_only = false;

    for param in params {
        if param.default.is_none() && seen_optional && !keyword_only {
            out.push("*".to_string());
            keyword_only = true;
        }
        seen_optional |= param.default.is_some();
        out.push(declaration(param));
    }
    out
}

fn declaration(param: &SignatureParam) -> String {
    let ty = python_type(&param.type_ref);
    match &param.default {
        None => format!("{}: {}", param.name, ty),
        Some(DefaultValue::EmptyString) => format!("{}: {} = \"\"", param.name, ty),
        Some(DefaultValue::Literal(value)) => {
            format!("{}: {} = {}", param.name, ty, python_literal(value))
        }
        Some(DefaultValue::None) => format!("{}: {} | None = None", param.name, ty),
    }
}

fn print_docs(out: &mut Block, docs: &DocBlock, passthrough: &str) {
    out.line(2, "\"\"\"");
    for line in &docs.summary {
        out.line(2, docstring_text(line));
    }
    out.line(0, "");
    out.line(2, "Args:");
    for param in &docs.params {
        let status = if param.required { "required" } else { "optional" };
        let mut lines = param.lines.iter();
        let first = lines.next().map(String::as_str).unwrap_or_default();
        out.line(
            3,
            format!(
                "{} ({}, {}): {}",
                param.name,
                python_type(&param.type_ref),
                status,
                docstring_text(first)
            ),
        );
        for rest in lines {
            out.line(4, docstring_text(rest));
        }
    }
    out.line(3, format!("**{}: {}", passthrough, docs.passthrough));
    out.line(0, "");
    out.line(2, "Returns:");
    out.line(3, return_annotation(&docs.returns));
    out.line(2, "\"\"\"");
}

fn print_delegate(out: &mut Block, plan: &DelegatePlan, f: &FunctionDescriptor) {
    let call = format!("{}self.{}(", await_prefix(f), plan.target);
    match &plan.response {
        ResponsePlan::Deserialize(model) => {
            out.line(2, format!("response = {}", call));
            print_call_args(out, &plan.args, &f.signature.passthrough);
            out.line(2, format!("return {}.model_validate_json(response.text)", model));
        }
        ResponsePlan::Raw => {
            out.line(2, format!("return {}", call));
            print_call_args(out, &plan.args, &f.signature.passthrough);
        }
    }
}

fn print_call_args(out: &mut Block, args: &[String], passthrough: &str) {
    for arg in args {
        out.line(3, format!("{}={},", arg, arg));
    }
    out.line(3, format!("**{},", passthrough));
    out.line(2, ")");
}

fn print_request(out: &mut Block, plan: &RequestPlan, f: &FunctionDescriptor) {
    let passthrough = &f.signature.passthrough;

    if !plan.query.is_empty() {
        out.line(2, "_params = {");
        for entry in &plan.query {
            out.line(3, format!("{}: {},", python_str(&entry.raw_name), entry.var));
        }
        out.line(2, "}");
        out.line(2, "_params = {k: v for k, v in _params.items() if v}");
    }

    if plan.headers.is_empty() {
        out.line(2, "_headers: dict[str, str] = {}");
    } else {
        out.line(2, "_headers = {");
        for entry in &plan.headers {
            out.line(3, format!("{}: {},", python_str(&entry.raw_name), entry.var));
        }
        out.line(2, "}");
        out.line(2, "_headers = {k: str(v) for k, v in _headers.items() if v}");
    }

    let mut body_arg = None;
    if let Some(body) = &plan.body {
        match body.encoding {
            BodyEncoding::Model => {
                out.line(
                    2,
                    format!(
                        "_content = {}.model_dump_json(exclude_none=True, by_alias=True)",
                        body.var
                    ),
                );
                out.line(2, "_headers[\"Content-Type\"] = \"application/json\"");
                body_arg = Some("content=_content".to_string());
            }
            BodyEncoding::ModelList => {
                out.line(
                    2,
                    format!(
                        "_json = [_item.model_dump(mode=\"json\", exclude_none=True, by_alias=True) for _item in {}]",
                        body.var
                    ),
                );
                out.line(2, "_headers[\"Content-Type\"] = \"application/json\"");
                body_arg = Some("json=_json".to_string());
            }
            BodyEncoding::Untyped => body_arg = Some(format!("json={}", body.var)),
        }
    }
    out.line(
        2,
        format!("_headers.update({}.pop(\"headers\", None) or {{}})", passthrough),
    );

    out.line(
        2,
        format!(
            "return {}self.api_client.{}(",
            await_prefix(f),
            plan.method.as_str()
        ),
    );
    out.line(3, format!("url={},", python_path(&plan.path)));
    if let Some(arg) = body_arg {
        out.line(3, format!("{},", arg));
    }
    if !plan.query.is_empty() {
        out.line(3, "params=_params,");
    }
    out.line(3, "headers=_headers,");
    out.line(3, format!("**{},", passthrough));
    out.line(2, ")");
}

fn await_prefix(f: &FunctionDescriptor) -> &'static str {
    if f.is_async {
        "await "
    } else {
        ""
    }
}

fn return_annotation(returns: &ReturnType) -> String {
    match returns {
        ReturnType::Model(model) => model.clone(),
        ReturnType::RawResponse => "Response".to_string(),
    }
}

fn python_type(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Primitive(Primitive::String) => "str".to_string(),
        TypeRef::Primitive(Primitive::Integer) => "int".to_string(),
        TypeRef::Primitive(Primitive::Number) => "float".to_string(),
        TypeRef::Primitive(Primitive::Boolean) => "bool".to_string(),
        TypeRef::Primitive(Primitive::Object) => "dict[str, Any]".to_string(),
        TypeRef::List(inner) => format!("list[{}]", python_type(inner)),
        TypeRef::Model(name) => name.clone(),
        TypeRef::Any => "Any".to_string(),
    }
}

fn python_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => python_str(s),
        JsonValue::Array(items) => format!(
            "[{}]",
            items.iter().map(python_literal).collect::<Vec<_>>().join(", ")
        ),
        JsonValue::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", python_str(k), python_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn escape_into(out: &mut String, text: &str, braces: bool) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '{' if braces => out.push_str("{{"),
            '}' if braces => out.push_str("}}"),
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
}

fn python_str(text: &str) -> String {
    let mut out = String::from("\"");
    escape_into(&mut out, text, false);
    out.push('"');
    out
}

/// Path template as a plain string, or an f-string when it has placeholders
fn python_path(path: &PathTemplate) -> String {
    if !path.has_params() {
        let literal: String = path
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Literal(text) | PathSegment::Param(text) => text.as_str(),
            })
            .collect();
        return python_str(&literal);
    }

    let mut out = String::from("f\"");
    for segment in &path.segments {
        match segment {
            PathSegment::Literal(text) => escape_into(&mut out, text, true),
            PathSegment::Param(var) => {
                out.push('{');
                out.push_str(var);
                out.push('}');
            }
        }
    }
    out.push('"');
    out
}

fn docstring_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"")
}

//! Documentation block derivation.

use textwrap::{wrap, Options};

use crate::descriptor::OperationDescriptor;
use crate::ir::{DocBlock, ParamDoc, ReturnType, Signature};

/// Column width of the wrapped summary
pub const SUMMARY_WIDTH: usize = 120;
/// Column width of each wrapped parameter description
pub const DESCRIPTION_WIDTH: usize = 50;

pub const SUMMARY_PLACEHOLDER: &str = "No summary provided.";
pub const DESCRIPTION_PLACEHOLDER: &str = "No description provided.";
pub const PASSTHROUGH_DOC: &str =
    "Additional keyword arguments forwarded to the transport client (e.g. headers, timeout).";

/// Build the documentation block for one function.
///
/// Missing summaries and descriptions are filled with placeholder text; they
/// are never an error.
pub fn build_docs(
    descriptor: &OperationDescriptor,
    signature: &Signature,
    returns: &ReturnType,
) -> DocBlock {
    let summary = non_blank(descriptor.summary.as_deref()).unwrap_or(SUMMARY_PLACEHOLDER);

    let params = signature
        .params
        .iter()
        .map(|param| {
            let text = non_blank(param.description.as_deref()).unwrap_or(DESCRIPTION_PLACEHOLDER);
            ParamDoc {
                name: param.name.clone(),
                type_ref: param.type_ref.clone(),
                required: param.required,
                lines: wrap_lines(text, DESCRIPTION_WIDTH),
            }
        })
        .collect();

    DocBlock {
        summary: wrap_lines(summary, SUMMARY_WIDTH),
        params,
        passthrough: PASSTHROUGH_DOC.to_string(),
        returns: returns.clone(),
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    wrap(&collapsed, Options::new(width))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

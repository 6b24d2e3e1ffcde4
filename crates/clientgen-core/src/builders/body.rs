//! Request assembly and response handling plans.

use super::{split_path, BuildContext, ValidOperation};
use crate::error::OperationError;
use crate::ir::{
    BodyEncoding, BodyPayload, BodyPlan, DelegatePlan, FunctionKind, ParamSource, PathSegment,
    PathTemplate, RequestPlan, ResponsePlan, Signature,
};
use crate::types::TypeRef;

/// Decide how a function of `kind` assembles its request or handles the
/// response.
///
/// `raw_name` is the name of the raw-response function; the wrapper
/// delegates to it with the same arguments.
pub fn render_body(
    op: &ValidOperation<'_>,
    signature: &Signature,
    kind: FunctionKind,
    raw_name: &str,
    ctx: &mut BuildContext<'_>,
) -> Result<BodyPlan, OperationError> {
    match kind {
        FunctionKind::RawResponse => Ok(BodyPlan::Request(request_plan(op, signature, ctx)?)),
        FunctionKind::Wrapper => Ok(BodyPlan::Delegate(DelegatePlan {
            target: raw_name.to_string(),
            args: signature.params.iter().map(|p| p.name.clone()).collect(),
            response: response_plan(op, ctx),
        })),
    }
}

fn request_plan(
    op: &ValidOperation<'_>,
    signature: &Signature,
    ctx: &BuildContext<'_>,
) -> Result<RequestPlan, OperationError> {
    let mut segments = Vec::new();
    for (is_param, text) in split_path(op.path) {
        if is_param {
            segments.push(PathSegment::Param(ctx.normalize(text)?));
        } else {
            segments.push(PathSegment::Literal(text.to_string()));
        }
    }

    let body = signature.body().map(|param| BodyPayload {
        var: param.name.clone(),
        encoding: match param.type_ref {
            TypeRef::Model(_) => BodyEncoding::Model,
            TypeRef::List(ref item) if matches!(**item, TypeRef::Model(_)) => {
                BodyEncoding::ModelList
            }
            _ => BodyEncoding::Untyped,
        },
    });

    Ok(RequestPlan {
        method: op.method,
        path: PathTemplate { segments },
        query: signature.bindings_for(ParamSource::Query).cloned().collect(),
        headers: signature.bindings_for(ParamSource::Header).cloned().collect(),
        body,
    })
}

fn response_plan(op: &ValidOperation<'_>, ctx: &mut BuildContext<'_>) -> ResponsePlan {
    let descriptor = op.descriptor;
    let status = if descriptor.responses.contains_key("200") {
        "200"
    } else {
        "201"
    };
    match descriptor.success_response() {
        Some(type_name) => ctx
            .resolver
            .resolve_model(type_name, &format!("response '{}'", status))
            .map(ResponsePlan::Deserialize)
            .unwrap_or(ResponsePlan::Raw),
        None => ResponsePlan::Raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::build_signature;
    use crate::descriptor::{HttpMethod, OperationDescriptor, ParameterDescriptor};
    use crate::ir::{Binding, ReturnType};
    use crate::naming::Normalizer;
    use std::collections::BTreeSet;

    fn plans(op: &OperationDescriptor) -> Result<(BodyPlan, BodyPlan, usize), OperationError> {
        let known: BTreeSet<String> = ["CreateUserRequest", "UserResponse", "Created", "User"]
            .into_iter()
            .map(String::from)
            .collect();
        let mut ctx = BuildContext::new(Normalizer::default(), &known);
        let valid = ValidOperation::validate(op)?;
        let sig = build_signature(&valid, &mut ctx)?;
        let wrapper = render_body(&valid, &sig, FunctionKind::Wrapper, "raw_fn", &mut ctx)?;
        let raw = render_body(&valid, &sig, FunctionKind::RawResponse, "raw_fn", &mut ctx)?;
        Ok((wrapper, raw, ctx.into_warnings().len()))
    }

    #[test]
    fn test_get_with_path_parameter() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/users/{id}");
        op.path_parameters
            .push(ParameterDescriptor::new("id", "string", true));
        op.responses.insert("200".into(), "UserResponse".into());

        let (wrapper, raw, _) = plans(&op)?;
        assert_eq!(wrapper.returns(), ReturnType::Model("UserResponse".into()));
        let BodyPlan::Request(plan) = raw else {
            panic!("raw function must send a request");
        };
        assert_eq!(plan.method, HttpMethod::Get);
        assert_eq!(
            plan.path.segments,
            vec![
                PathSegment::Literal("/users/".into()),
                PathSegment::Param("id_".into())
            ]
        );
        assert!(plan.query.is_empty());
        assert!(plan.body.is_none());
        Ok(())
    }

    #[test]
    fn test_post_with_model_body() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("post", "/users");
        op.request_body = Some("CreateUserRequest".into());
        op.responses.insert("201".into(), "UserResponse".into());

        let (wrapper, raw, _) = plans(&op)?;
        assert_eq!(
            wrapper,
            BodyPlan::Delegate(DelegatePlan {
                target: "raw_fn".into(),
                args: vec!["create_user_request".into()],
                response: ResponsePlan::Deserialize("UserResponse".into()),
            })
        );
        let BodyPlan::Request(plan) = raw else {
            panic!("raw function must send a request");
        };
        assert_eq!(
            plan.body,
            Some(BodyPayload {
                var: "create_user_request".into(),
                encoding: BodyEncoding::Model,
            })
        );
        Ok(())
    }

    #[test]
    fn test_200_wins_over_201() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("post", "/users");
        op.responses.insert("201".into(), "Created".into());
        op.responses.insert("200".into(), "UserResponse".into());
        let (wrapper, _, _) = plans(&op)?;
        assert_eq!(wrapper.returns(), ReturnType::Model("UserResponse".into()));
        Ok(())
    }

    #[test]
    fn test_no_success_type_returns_raw() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("delete", "/users/{id}");
        op.responses.insert("204".into(), "Nothing".into());
        let (wrapper, _, warnings) = plans(&op)?;
        assert_eq!(wrapper.returns(), ReturnType::RawResponse);
        assert_eq!(warnings, 0);
        Ok(())
    }

    #[test]
    fn test_unknown_response_model_degrades_to_raw() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/ghosts");
        op.responses.insert("200".into(), "Ghost".into());
        let (wrapper, _, warnings) = plans(&op)?;
        assert_eq!(wrapper.returns(), ReturnType::RawResponse);
        assert_eq!(warnings, 1);
        Ok(())
    }

    #[test]
    fn test_query_and_header_bindings_keep_wire_names() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/items");
        op.query_parameters
            .push(ParameterDescriptor::new("page-size", "integer", false));
        op.headers
            .push(ParameterDescriptor::new("X-Opt", "string", false));
        op.headers
            .push(ParameterDescriptor::new("X-Req", "string", true));

        let (_, raw, _) = plans(&op)?;
        let BodyPlan::Request(plan) = raw else {
            panic!("raw function must send a request");
        };
        assert_eq!(
            plan.query,
            vec![Binding {
                source: ParamSource::Query,
                raw_name: "page-size".into(),
                var: "page_size".into(),
            }]
        );
        let header_names: Vec<_> = plan.headers.iter().map(|h| h.raw_name.as_str()).collect();
        assert_eq!(header_names, vec!["X-Req", "X-Opt"]);
        Ok(())
    }

    #[test]
    fn test_list_of_models_body_is_dumped_per_item() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("post", "/users/batch");
        op.request_body = Some("list[User]".into());

        let (_, raw, warnings) = plans(&op)?;
        let BodyPlan::Request(plan) = raw else {
            panic!("raw function must send a request");
        };
        assert_eq!(
            plan.body,
            Some(BodyPayload {
                var: "user_list".into(),
                encoding: BodyEncoding::ModelList,
            })
        );
        assert_eq!(warnings, 0);
        Ok(())
    }

    #[test]
    fn test_primitive_list_body_stays_untyped() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("post", "/tags");
        op.request_body = Some("list[string]".into());

        let (_, raw, _) = plans(&op)?;
        let BodyPlan::Request(plan) = raw else {
            panic!("raw function must send a request");
        };
        assert_eq!(plan.body.map(|b| b.encoding), Some(BodyEncoding::Untyped));
        Ok(())
    }
}

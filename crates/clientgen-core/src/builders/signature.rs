//! Parameter list derivation.
//!
//! Groups always appear as body, path, query, headers. Only the header group
//! is re-sorted (required first, stable); the other groups keep descriptor
//! order even when that puts an optional parameter before a required one.

use std::collections::HashSet;

use super::{placeholders, BuildContext, ValidOperation};
use crate::descriptor::ParameterDescriptor;
use crate::error::OperationError;
use crate::ir::{Binding, DefaultValue, ParamSource, Signature, SignatureParam};
use crate::naming::PASSTHROUGH_NAME;
use crate::types::{list_item, TypeRef};

/// Build the signature shared by the wrapper and raw-response functions.
pub fn build_signature(
    op: &ValidOperation<'_>,
    ctx: &mut BuildContext<'_>,
) -> Result<Signature, OperationError> {
    let descriptor = op.descriptor;
    let mut builder = SignatureBuilder::default();

    if let Some(body_type) = &descriptor.request_body {
        let type_ref = ctx.resolver.resolve(body_type, "request body");
        let name = body_name(body_type, ctx)?;
        builder.push(
            ctx,
            SignatureParam {
                name,
                raw_name: body_type.clone(),
                source: ParamSource::Body,
                type_ref,
                required: true,
                default: None,
                description: None,
            },
        );
    }

    let path_params = path_parameters(op, ctx)?;
    for param in &path_params {
        let built = build_param(param, ParamSource::Path, ctx)?;
        builder.push(ctx, built);
    }

    for param in &descriptor.query_parameters {
        let built = build_param(param, ParamSource::Query, ctx)?;
        builder.push(ctx, built);
    }

    let mut headers: Vec<&ParameterDescriptor> = descriptor.headers.iter().collect();
    headers.sort_by_key(|p| !p.required);
    for param in headers {
        let built = build_param(param, ParamSource::Header, ctx)?;
        builder.push(ctx, built);
    }

    Ok(Signature {
        params: builder.params,
        bindings: builder.bindings,
        passthrough: PASSTHROUGH_NAME.to_string(),
    })
}

/// Body parameters are named after their type; lists after their item type.
fn body_name(body_type: &str, ctx: &BuildContext<'_>) -> Result<String, OperationError> {
    let mut item = body_type.trim();
    let mut is_list = false;
    while let Some(inner) = list_item(item) {
        item = inner;
        is_list = true;
    }
    if is_list {
        ctx.normalize(&format!("{} list", item))
    } else {
        ctx.normalize(item)
    }
}

#[derive(Default)]
struct SignatureBuilder {
    params: Vec<SignatureParam>,
    bindings: Vec<Binding>,
    seen: HashSet<String>,
}

impl SignatureBuilder {
    fn push(&mut self, ctx: &mut BuildContext<'_>, param: SignatureParam) {
        self.bindings.push(Binding {
            source: param.source,
            raw_name: param.raw_name.clone(),
            var: param.name.clone(),
        });
        if self.seen.insert(param.name.clone()) {
            self.params.push(param);
        } else {
            ctx.warn(OperationError::DuplicateParameter {
                name: param.raw_name,
                normalized: param.name,
            });
        }
    }
}

/// Declared path parameters, plus a required string parameter for every
/// placeholder nobody declared.
fn path_parameters(
    op: &ValidOperation<'_>,
    ctx: &BuildContext<'_>,
) -> Result<Vec<ParameterDescriptor>, OperationError> {
    let mut placeholder_names = Vec::new();
    for raw in placeholders(op.path) {
        placeholder_names.push((ctx.normalize(raw)?, raw));
    }

    let mut params = op.descriptor.path_parameters.clone();
    let mut declared = HashSet::new();
    for param in &params {
        let normalized = ctx.normalize(&param.name)?;
        if !placeholder_names.iter().any(|(n, _)| *n == normalized) {
            return Err(OperationError::structural(format!(
                "path parameter '{}' has no placeholder in '{}'",
                param.name, op.path
            )));
        }
        declared.insert(normalized);
    }

    for (normalized, raw) in placeholder_names {
        if declared.insert(normalized) {
            params.push(
                ParameterDescriptor::new(raw, "string", true)
                    .with_description(format!("Path parameter: {}", raw)),
            );
        }
    }
    Ok(params)
}

fn build_param(
    param: &ParameterDescriptor,
    source: ParamSource,
    ctx: &mut BuildContext<'_>,
) -> Result<SignatureParam, OperationError> {
    let name = ctx.normalize(&param.name)?;
    let type_ref = ctx
        .resolver
        .resolve(&param.type_name, &format!("parameter '{}'", param.name));
    let default = (!param.required).then(|| default_for(&type_ref, param));

    Ok(SignatureParam {
        name,
        raw_name: param.name.clone(),
        source,
        type_ref,
        required: param.required,
        default,
        description: param.description.clone(),
    })
}

fn default_for(type_ref: &TypeRef, param: &ParameterDescriptor) -> DefaultValue {
    if type_ref.is_string() {
        return DefaultValue::EmptyString;
    }
    match &param.default {
        Some(value) if !value.is_null() => DefaultValue::Literal(value.clone()),
        _ => DefaultValue::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OperationDescriptor;
    use crate::naming::Normalizer;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn models() -> BTreeSet<String> {
        ["CreateUserRequest", "UserResponse"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn signature_of(op: &OperationDescriptor) -> Result<Signature, OperationError> {
        let known = models();
        let mut ctx = BuildContext::new(Normalizer::default(), &known);
        let valid = ValidOperation::validate(op)?;
        build_signature(&valid, &mut ctx)
    }

    #[test]
    fn test_path_parameter_scenario() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/users/{id}");
        op.path_parameters
            .push(ParameterDescriptor::new("id", "string", true));

        let sig = signature_of(&op)?;
        assert_eq!(sig.names(), vec!["id_"]);
        assert_eq!(sig.params[0].source, ParamSource::Path);
        assert_eq!(sig.params[0].default, None);
        assert_eq!(sig.passthrough, "kwargs");
        Ok(())
    }

    #[test]
    fn test_group_order_is_body_path_query_headers() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("put", "/orgs/{org}/users");
        op.request_body = Some("CreateUserRequest".into());
        op.headers
            .push(ParameterDescriptor::new("X-Trace", "string", false));
        op.query_parameters
            .push(ParameterDescriptor::new("dryRun", "boolean", false));
        op.path_parameters
            .push(ParameterDescriptor::new("org", "string", true));

        let sig = signature_of(&op)?;
        let sources: Vec<_> = sig.params.iter().map(|p| p.source).collect();
        assert_eq!(
            sources,
            vec![
                ParamSource::Body,
                ParamSource::Path,
                ParamSource::Query,
                ParamSource::Header
            ]
        );
        assert_eq!(
            sig.names(),
            vec!["create_user_request", "org", "dry_run", "x_trace"]
        );
        Ok(())
    }

    #[test]
    fn test_only_headers_are_sorted_required_first() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/items");
        op.query_parameters
            .push(ParameterDescriptor::new("page", "integer", false).with_default(json!(1)));
        op.query_parameters
            .push(ParameterDescriptor::new("filter", "string", true));
        op.headers
            .push(ParameterDescriptor::new("X-Optional", "string", false));
        op.headers
            .push(ParameterDescriptor::new("X-Required", "string", true));

        let sig = signature_of(&op)?;
        assert_eq!(
            sig.names(),
            vec!["page", "filter_", "x_required", "x_optional"]
        );
        assert!(!sig.params[0].required);
        assert!(sig.params[1].required);
        assert_eq!(sig.params[3].default, Some(DefaultValue::EmptyString));
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<(), OperationError> {
        let mut op = OperationDescriptor::new("get", "/items");
        op.query_parameters
            .push(ParameterDescriptor::new("q", "string", false).with_default(json!("ignored")));
        op.query_parameters
            .push(ParameterDescriptor::new("limit", "integer", false).with_default(json!(25)));
        op.query_parameters
            .push(ParameterDescriptor::new("verbose", "boolean", false));

        let sig = signature_of(&op)?;
        assert_eq!(sig.params[0].default, Some(DefaultValue::EmptyString));
        assert_eq!(sig.params[1].default, Some(DefaultValue::Literal(json!(25))));
        assert_eq!(sig.params[2].default, Some(DefaultValue::None));
        Ok(())
    }

    #[test]
    fn test_duplicates_are_dropped_but_keep_bindings() -> Result<(), OperationError> {
        let known = models();
        let mut ctx = BuildContext::new(Normalizer::default(), &known);
        let mut op = OperationDescriptor::new("get", "/users/{userId}");
        op.path_parameters
            .push(ParameterDescriptor::new("userId", "string", true));
        op.query_parameters
            .push(ParameterDescriptor::new("user_id", "string", false));

        let valid = ValidOperation::validate(&op)?;
        let sig = build_signature(&valid, &mut ctx)?;
        assert_eq!(sig.names(), vec!["user_id"]);
        assert_eq!(sig.bindings.len(), 2);
        assert_eq!(sig.bindings[1].raw_name, "user_id");
        assert_eq!(sig.bindings[1].source, ParamSource::Query);

        let warnings = ctx.into_warnings();
        assert!(matches!(
            warnings.as_slice(),
            [OperationError::DuplicateParameter { .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_undeclared_placeholders_are_synthesized() -> Result<(), OperationError> {
        let op = OperationDescriptor::new("delete", "/users/{userId}/keys/{keyId}");
        let sig = signature_of(&op)?;
        assert_eq!(sig.names(), vec!["user_id", "key_id"]);
        assert!(sig.params.iter().all(|p| p.required));
        assert_eq!(
            sig.params[1].description.as_deref(),
            Some("Path parameter: keyId")
        );
        Ok(())
    }

    #[test]
    fn test_path_parameter_without_placeholder_is_structural() {
        let mut op = OperationDescriptor::new("get", "/users");
        op.path_parameters
            .push(ParameterDescriptor::new("id", "string", true));
        let err = signature_of(&op).unwrap_err();
        assert!(matches!(err, OperationError::Structural { .. }));
    }

    #[test]
    fn test_unmapped_collision_fails_operation() {
        let mut op = OperationDescriptor::new("get", "/items");
        op.query_parameters
            .push(ParameterDescriptor::new("self", "string", false));
        assert!(matches!(
            signature_of(&op),
            Err(OperationError::UnmappedIdentifierCollision { .. })
        ));
    }

    #[test]
    fn test_unknown_body_type_degrades_to_any() -> Result<(), OperationError> {
        let known = models();
        let mut ctx = BuildContext::new(Normalizer::default(), &known);
        let mut op = OperationDescriptor::new("post", "/blobs");
        op.request_body = Some("BlobUpload".into());

        let valid = ValidOperation::validate(&op)?;
        let sig = build_signature(&valid, &mut ctx)?;
        assert_eq!(sig.params[0].name, "blob_upload");
        assert_eq!(sig.params[0].type_ref, TypeRef::Any);
        assert_eq!(ctx.into_warnings().len(), 1);
        Ok(())
    }

    #[test]
    fn test_list_body_is_named_after_item_type() -> Result<(), OperationError> {
        let known: BTreeSet<String> = ["User"].into_iter().map(String::from).collect();
        let mut ctx = BuildContext::new(Normalizer::default(), &known);
        let mut op = OperationDescriptor::new("post", "/users/batch");
        op.request_body = Some("list[User]".into());

        let valid = ValidOperation::validate(&op)?;
        let sig = build_signature(&valid, &mut ctx)?;
        assert_eq!(sig.params[0].name, "user_list");
        assert_eq!(
            sig.params[0].type_ref,
            TypeRef::List(Box::new(TypeRef::Model("User".into())))
        );
        assert!(ctx.into_warnings().is_empty());
        Ok(())
    }
}

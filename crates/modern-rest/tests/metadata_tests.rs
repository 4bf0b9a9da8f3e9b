//! Declaration-time checks: building endpoints, blueprints and controllers

use modern_rest::validation::build_metadata;
use modern_rest::{
    Blueprint, BlueprintConfig, Component, Controller, EndpointDefinition, EndpointMetadataError,
    ErrorHandler, Handler, HandlerError, HeaderSpec, HttpResponse, HttpStatus, ModifyPayload,
    NewHeader, Reply, ResponseSpec, Returns, Settings, TypeDescriptor, ValidatePayload,
};
use modern_rest_validation::FieldDescriptor;
use serde_json::json;

fn sync_handler() -> Handler {
    Handler::from_sync(|_| Ok(Reply::json(json!(null))))
}

fn async_handler() -> Handler {
    Handler::from_async(|_ctx| async { Ok::<_, HandlerError>(Reply::json(json!(null))) })
}

fn sync_error_handler() -> ErrorHandler {
    ErrorHandler::from_sync(|_, _, error| Err(anyhow::anyhow!("{}", error)))
}

fn async_error_handler() -> ErrorHandler {
    ErrorHandler::from_async(|_, _, error| async move { Err::<HttpResponse, _>(anyhow::anyhow!("{}", error)) })
}

fn build(definition: EndpointDefinition) -> Result<Blueprint, EndpointMetadataError> {
    Blueprint::builder("test").endpoint(definition).build(&Settings::default())
}

fn build_err(definition: EndpointDefinition) -> String {
    match build(definition) {
        Ok(_) => panic!("expected a declaration error"),
        Err(error) => error.message().to_string(),
    }
}

fn statuses(blueprint: &Blueprint, method: &str) -> Vec<u16> {
    blueprint
        .endpoint(method)
        .unwrap()
        .metadata()
        .responses
        .keys()
        .map(|status| status.code())
        .collect()
}

// ============================================================================
// Default responses
// ============================================================================

#[test]
fn test_default_status_per_method() {
    let blueprint = Blueprint::builder("items")
        .endpoint(EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .endpoint(EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .endpoint(EndpointDefinition::new("PATCH", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .endpoint(EndpointDefinition::new("DELETE", Returns::Nothing, sync_handler()))
        .build(&Settings::default())
        .unwrap();

    assert_eq!(statuses(&blueprint, "GET"), vec![200]);
    assert_eq!(statuses(&blueprint, "POST"), vec![201]);
    assert_eq!(statuses(&blueprint, "PATCH"), vec![200]);
    assert_eq!(statuses(&blueprint, "DELETE"), vec![204]);
}

#[test]
fn test_modify_status_overrides_default() {
    let blueprint = build(
        EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler())
            .modify(ModifyPayload::new().status_code(HttpStatus::ACCEPTED)),
    )
    .unwrap();
    assert_eq!(statuses(&blueprint, "POST"), vec![202]);
}

#[test]
fn test_modify_headers_become_required_header_specs() {
    let blueprint = build(
        EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler())
            .modify(ModifyPayload::new().header("X-Version", NewHeader::new("2"))),
    )
    .unwrap();

    let metadata = blueprint.endpoint("GET").unwrap().metadata();
    let spec = &metadata.responses[&HttpStatus::OK];
    let expected = ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK)
        .header("X-Version", NewHeader::new("2").to_spec());
    assert_eq!(spec, &expected);
}

// ============================================================================
// Response merging
// ============================================================================

#[test]
fn test_equal_extra_responses_dedupe() {
    let not_found = ResponseSpec::new(TypeDescriptor::string(), HttpStatus::NOT_FOUND);
    let blueprint = build(
        EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::int()), sync_handler()).modify(
            ModifyPayload::new()
                .extra_response(not_found.clone())
                .extra_response(not_found),
        ),
    )
    .unwrap();
    assert_eq!(statuses(&blueprint, "GET"), vec![200, 404]);
}

#[test]
fn test_conflicting_responses_fail() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Response, sync_handler()).validate(ValidatePayload::new([
            ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK),
            ResponseSpec::new(TypeDescriptor::int(), HttpStatus::OK),
        ])),
    );
    assert!(message.contains("different metadata"), "{}", message);
    assert!(message.contains("status_code=200"), "{}", message);
}

#[test]
fn test_extra_response_conflicting_with_default_fails() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler())
            .modify(ModifyPayload::new().extra_response(ResponseSpec::new(TypeDescriptor::int(), HttpStatus::OK))),
    );
    assert!(message.contains("different metadata"), "{}", message);
}

#[test]
fn test_blueprint_duplicate_responses_name_status() {
    let result = Blueprint::builder("users")
        .response(ResponseSpec::new(TypeDescriptor::string(), HttpStatus::CONFLICT))
        .response(ResponseSpec::new(TypeDescriptor::int(), HttpStatus::CONFLICT))
        .build(&Settings::default());
    let message = result.err().unwrap().message().to_string();
    assert!(message.contains("status_code=409"), "{}", message);
}

#[test]
fn test_inherited_responses_merge_in_order() {
    let settings = Settings::default().response(ResponseSpec::new(TypeDescriptor::string(), HttpStatus::UNAUTHORIZED));
    let blueprint = Blueprint::builder("users")
        .response(ResponseSpec::new(TypeDescriptor::string(), HttpStatus::NOT_FOUND))
        .endpoint(EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .build(&settings)
        .unwrap();
    assert_eq!(statuses(&blueprint, "GET"), vec![200, 401, 404]);
}

#[test]
fn test_component_responses() {
    let body = Component::body(TypeDescriptor::object(vec![FieldDescriptor::new("name", TypeDescriptor::string())]));

    let with_components = Blueprint::builder("users")
        .component(body.clone())
        .endpoint(EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .build(&Settings::default())
        .unwrap();
    assert_eq!(statuses(&with_components, "POST"), vec![201, 400]);

    let custom_bad_request = ResponseSpec::new(TypeDescriptor::string(), HttpStatus::BAD_REQUEST);
    let explicit = Blueprint::builder("users")
        .component(body.clone())
        .response(custom_bad_request.clone())
        .endpoint(EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .build(&Settings::default())
        .unwrap();
    let metadata = explicit.endpoint("POST").unwrap().metadata();
    assert_eq!(metadata.responses[&HttpStatus::BAD_REQUEST], custom_bad_request);

    let without = Blueprint::builder("users")
        .component(body)
        .responses_from_components(false)
        .endpoint(EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler()))
        .build(&Settings::default())
        .unwrap();
    assert_eq!(statuses(&without, "POST"), vec![201]);
}

#[test]
fn test_endpoint_responses_take_priority_over_component_responses() {
    let body = Component::body(TypeDescriptor::object(vec![FieldDescriptor::new("name", TypeDescriptor::string())]));
    let bad_request = ResponseSpec::new(
        TypeDescriptor::object(vec![FieldDescriptor::new("reason", TypeDescriptor::string())]),
        HttpStatus::BAD_REQUEST,
    );

    let modified = Blueprint::builder("users")
        .component(body.clone())
        .endpoint(
            EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler())
                .modify(ModifyPayload::new().extra_response(bad_request.clone())),
        )
        .build(&Settings::default())
        .unwrap();
    let metadata = modified.endpoint("POST").unwrap().metadata();
    assert_eq!(metadata.responses[&HttpStatus::BAD_REQUEST], bad_request);

    let validated = Blueprint::builder("users")
        .component(body)
        .endpoint(
            EndpointDefinition::new("POST", Returns::Response, sync_handler()).validate(
                ValidatePayload::new([
                    ResponseSpec::new(TypeDescriptor::string(), HttpStatus::CREATED),
                    bad_request.clone(),
                ]),
            ),
        )
        .build(&Settings::default())
        .unwrap();
    let metadata = validated.endpoint("POST").unwrap().metadata();
    assert_eq!(metadata.responses[&HttpStatus::BAD_REQUEST], bad_request);
    assert_eq!(statuses(&validated, "POST"), vec![201, 400]);
}

// ============================================================================
// Payload and return kind
// ============================================================================

#[test]
fn test_response_without_payload_needs_validate() {
    let message = build_err(EndpointDefinition::new("GET", Returns::Response, sync_handler()));
    assert!(message.contains("@validate"), "{}", message);
}

#[test]
fn test_response_without_payload_uses_inherited() {
    let blueprint = Blueprint::builder("users")
        .response(ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK))
        .endpoint(EndpointDefinition::new("GET", Returns::Response, sync_handler()))
        .build(&Settings::default())
        .unwrap();
    let metadata = blueprint.endpoint("GET").unwrap().metadata();
    assert!(metadata.modification.is_none());
    assert_eq!(statuses(&blueprint, "GET"), vec![200]);
}

#[test]
fn test_validate_on_raw_data_fails() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler())
            .validate(ValidatePayload::new([ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK)])),
    );
    assert!(message.contains("`@validate` is not allowed"), "{}", message);
    assert!(message.contains("use `@modify`"), "{}", message);
}

#[test]
fn test_modify_on_response_fails() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Response, sync_handler()).modify(ModifyPayload::new()),
    );
    assert!(message.contains("@modify"), "{}", message);
}

#[test]
fn test_header_kinds() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Response, sync_handler()).validate(ValidatePayload::new([
            ResponseSpec::new(TypeDescriptor::string(), HttpStatus::OK).header("X-Token", NewHeader::new("abc")),
        ])),
    );
    assert!(message.contains("NewHeader"), "{}", message);

    let message = build_err(
        EndpointDefinition::new("GET", Returns::Data(TypeDescriptor::string()), sync_handler())
            .modify(ModifyPayload::new().header("X-Token", HeaderSpec::new())),
    );
    assert!(message.contains("HeaderSpec"), "{}", message);
}

#[test]
fn test_bodyless_status_must_return_none() {
    let message = build_err(
        EndpointDefinition::new("DELETE", Returns::Data(TypeDescriptor::string()), sync_handler())
            .modify(ModifyPayload::new().status_code(HttpStatus::NO_CONTENT)),
    );
    assert!(message.contains("None"), "{}", message);

    let message = build_err(
        EndpointDefinition::new("GET", Returns::Response, sync_handler())
            .validate(ValidatePayload::new([ResponseSpec::new(TypeDescriptor::string(), HttpStatus::NOT_MODIFIED)])),
    );
    assert!(message.contains("None"), "{}", message);
}

// ============================================================================
// Error handlers and sync/async
// ============================================================================

#[test]
fn test_error_handler_kind_must_match_endpoint() {
    let message = build_err(
        EndpointDefinition::new("GET", Returns::Nothing, async_handler())
            .modify(ModifyPayload::new().error_handler(sync_error_handler())),
    );
    assert!(message.contains("Cannot use sync `error_handler` with async endpoint"), "{}", message);

    let message = build_err(
        EndpointDefinition::new("GET", Returns::Nothing, sync_handler())
            .modify(ModifyPayload::new().error_handler(async_error_handler())),
    );
    assert!(message.contains("Cannot use async `error_handler` with sync endpoint"), "{}", message);
}

#[test]
fn test_controller_rejects_mixed_endpoints() {
    let blueprint = Blueprint::builder("mixed")
        .endpoint(EndpointDefinition::new("GET", Returns::Nothing, sync_handler()))
        .endpoint(EndpointDefinition::new("POST", Returns::Nothing, async_handler()))
        .build(&Settings::default())
        .unwrap();
    let message = Controller::builder("mixed").blueprint(blueprint).build().err().unwrap().to_string();
    assert!(message.contains("either be all sync or all async"), "{}", message);
}

#[test]
fn test_blueprint_error_handler_kind() {
    let message = Blueprint::builder("sync")
        .error_handler(async_error_handler())
        .endpoint(EndpointDefinition::new("GET", Returns::Nothing, sync_handler()))
        .build(&Settings::default())
        .err()
        .unwrap()
        .to_string();
    assert!(message.contains("Blueprint sync has an async error handler"), "{}", message);
    assert!(message.contains("Use `handle_error` instead for sync endpoints."), "{}", message);

    let message = Blueprint::builder("async")
        .error_handler(sync_error_handler())
        .endpoint(EndpointDefinition::new("GET", Returns::Nothing, async_handler()))
        .build(&Settings::default())
        .err()
        .unwrap()
        .to_string();
    assert!(message.contains("Blueprint async has a sync error handler"), "{}", message);
    assert!(message.contains("Use `handle_async_error` instead for async endpoints."), "{}", message);

    assert!(Blueprint::builder("async")
        .error_handler(async_error_handler())
        .endpoint(EndpointDefinition::new("GET", Returns::Nothing, async_handler()))
        .build(&Settings::default())
        .is_ok());
}

#[test]
fn test_controller_error_handler_kind() {
    let sync_blueprint = || {
        Blueprint::builder("sync")
            .endpoint(EndpointDefinition::new("GET", Returns::Nothing, sync_handler()))
            .build(&Settings::default())
            .unwrap()
    };

    let message = Controller::builder("c")
        .blueprint(sync_blueprint())
        .error_handler(async_error_handler())
        .build()
        .err()
        .unwrap()
        .to_string();
    assert!(message.contains("Use `handle_error` instead for sync endpoints."), "{}", message);

    let async_blueprint = Blueprint::builder("async")
        .endpoint(EndpointDefinition::new("GET", Returns::Nothing, async_handler()))
        .build(&Settings::default())
        .unwrap();
    let message = Controller::builder("c")
        .blueprint(async_blueprint)
        .error_handler(sync_error_handler())
        .build()
        .err()
        .unwrap()
        .to_string();
    assert!(message.contains("Use `handle_async_error` instead for async endpoints."), "{}", message);

    assert!(Controller::builder("c")
        .blueprint(sync_blueprint())
        .error_handler(sync_error_handler())
        .build()
        .is_ok());
}

// ============================================================================
// Settings resolution and idempotence
// ============================================================================

#[test]
fn test_validate_responses_precedence() {
    let definition = |payload: Option<bool>| {
        let modify = match payload {
            Some(enabled) => ModifyPayload::new().validate_responses(enabled),
            None => ModifyPayload::new(),
        };
        EndpointDefinition::new("GET", Returns::Nothing, sync_handler()).modify(modify)
    };
    let settings = Settings::default().validate_responses(false);
    let blueprint = |validate: Option<bool>| BlueprintConfig {
        validate_responses: validate,
        ..BlueprintConfig::default()
    };

    let resolve = |payload, bp| {
        build_metadata(&definition(payload), &blueprint(bp), &settings)
            .unwrap()
            .validate_responses
    };
    assert!(!resolve(None, None));
    assert!(resolve(None, Some(true)));
    assert!(!resolve(Some(false), Some(true)));
    assert!(resolve(Some(true), None));
}

#[test]
fn test_metadata_build_is_idempotent() {
    let handler = sync_error_handler();
    let definition = EndpointDefinition::new("POST", Returns::Data(TypeDescriptor::string()), sync_handler()).modify(
        ModifyPayload::new()
            .header("X-Id", NewHeader::new("1"))
            .extra_response(ResponseSpec::new(TypeDescriptor::string(), HttpStatus::CONFLICT))
            .error_handler(handler)
            .summary("Create"),
    );
    let config = BlueprintConfig {
        responses: vec![ResponseSpec::new(TypeDescriptor::string(), HttpStatus::NOT_FOUND)],
        ..BlueprintConfig::default()
    };
    let settings = Settings::default();

    let first = build_metadata(&definition, &config, &settings).unwrap();
    let second = build_metadata(&definition, &config, &settings).unwrap();
    assert_eq!(first, second);
}

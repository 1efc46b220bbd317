//! Dispatcher behavior: exact-path routing, parameter sources and the
//! declared-schema validation.

use mockingbird_api::dispatch::{Dispatcher, DispatcherConfig};
use mockingbird_api::params::ParamMap;
use mockingbird_core::entity::UserId;
use mockingbird_core::error::ServiceError;
use mockingbird_core::service::Service;

const API: &str = "https://api.twitter.com/1.1/";

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

fn setup() -> (Dispatcher, Service, UserId) {
    let dispatcher = Dispatcher::new(DispatcherConfig::default());
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    (dispatcher, service, alice)
}

#[test]
fn unknown_path_is_unroutable() {
    let (dispatcher, mut service, alice) = setup();
    let err = dispatcher
        .dispatch(&mut service, alice, "GET", &format!("{API}statuses/nope.json"), None)
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::UnroutableRequest {
            host: "api".to_owned(),
            path: "statuses/nope.json".to_owned(),
        }
    );
}

#[test]
fn unknown_host_is_unroutable() {
    let (dispatcher, mut service, alice) = setup();
    let err = dispatcher
        .dispatch(&mut service, alice, "GET", "https://elsewhere.example/user.json", None)
        .unwrap_err();
    assert!(matches!(err, ServiceError::UnroutableRequest { .. }));
}

#[test]
fn query_suffix_is_ignored_for_routing() {
    let (dispatcher, mut service, alice) = setup();
    let id = service.new_message("hello", alice, None).expect("create");

    let response = dispatcher
        .dispatch(
            &mut service,
            alice,
            "GET",
            &format!("{API}statuses/show.json?id={id}"),
            None,
        )
        .expect("routed");
    let body = response.json().expect("json");
    assert_eq!(body["id_str"], id.to_string());
}

#[test]
fn body_parameters_replace_the_query_entirely() {
    let (dispatcher, mut service, alice) = setup();
    let first = service.new_message("first", alice, None).expect("create");
    let second = service.new_message("second", alice, None).expect("create");

    // The query names `first`, the body names `second`; the body is the
    // only source consulted.
    let body = params(&[("id", &second.to_string())]);
    let response = dispatcher
        .dispatch(
            &mut service,
            alice,
            "GET",
            &format!("{API}statuses/show.json?id={first}"),
            Some(&body),
        )
        .expect("routed");
    assert_eq!(response.json().expect("json")["text"], "second");
}

#[test]
fn undeclared_parameter_is_rejected() {
    let (dispatcher, mut service, alice) = setup();
    let err = dispatcher
        .dispatch(
            &mut service,
            alice,
            "GET",
            &format!("{API}statuses/show.json?id=1000&sparkle=yes"),
            None,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::UnknownParameter {
            endpoint: "statuses/show.json".to_owned(),
            name: "sparkle".to_owned(),
        }
    );
}

#[test]
fn missing_required_parameter_is_reported() {
    let (dispatcher, mut service, alice) = setup();
    let err = dispatcher
        .dispatch(&mut service, alice, "GET", &format!("{API}statuses/show.json"), None)
        .unwrap_err();
    assert_eq!(err, ServiceError::MissingParameter { name: "id".to_owned() });
}

#[test]
fn malformed_parameter_value_is_reported() {
    let (dispatcher, mut service, alice) = setup();
    let err = dispatcher
        .dispatch(
            &mut service,
            alice,
            "GET",
            &format!("{API}statuses/show.json?id=abc"),
            None,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::InvalidParameter { name: "id".to_owned(), value: "abc".to_owned() }
    );
}

#[test]
fn custom_base_urls_are_honored() {
    let config = DispatcherConfig {
        api_url: "http://localhost:8000/api/".to_owned(),
        stream_url: "http://localhost:8000/stream/".to_owned(),
        userstream_url: "http://localhost:8000/userstream/".to_owned(),
    };
    let dispatcher = Dispatcher::new(config);
    let mut service = Service::new();
    let alice = service.new_user("alice", "Alice");
    let id = service.new_message("local", alice, None).expect("create");

    let response = dispatcher
        .dispatch(
            &mut service,
            alice,
            "GET",
            &format!("http://localhost:8000/api/statuses/show.json?id={id}"),
            None,
        )
        .expect("routed");
    assert_eq!(response.json().expect("json")["text"], "local");
}

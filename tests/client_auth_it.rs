// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use terraform_provider_keycloak::{
	_preludet::*,
	config::ClientConfig,
	error::ConfigError,
};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
const REALM_PATH: &str = "/admin/realms/test";

fn token_body(access: &str, refresh: &str) -> String {
	format!(
		"{{\"access_token\":\"{access}\",\"refresh_token\":\"{refresh}\",\"token_type\":\"bearer\",\"expires_in\":300}}"
	)
}

#[tokio::test]
async fn cached_token_is_reused_across_requests() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("grant_type=client_credentials")
				.body_includes("client_id=terraform");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-cached", "refresh-cached"));
		})
		.await;
	let realm = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH).header("authorization", "Bearer access-cached");
			then.status(200).json_body(json!({ "realm": "test" }));
		})
		.await;
	let client = build_test_client(&server.base_url());

	for _ in 0..3 {
		let body = client.get::<Value>("/realms/test").await.expect("Realm lookup should succeed.");

		assert_eq!(body["realm"], "test");
	}

	token.assert_calls_async(1).await;
	realm.assert_calls_async(3).await;

	assert_eq!(client.metrics().logins(), 1);
	assert_eq!(client.metrics().refreshes(), 0);
}

#[tokio::test]
async fn unauthorized_admin_call_refreshes_and_retries_once() {
	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH).body_includes("grant_type=client_credentials");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-stale", "refresh-1"));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("grant_type=refresh_token")
				.body_includes("refresh_token=refresh-1");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-fresh", "refresh-2"));
		})
		.await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH).header("authorization", "Bearer access-stale");
			then.status(401).json_body(json!({ "error": "HTTP 401 Unauthorized" }));
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH).header("authorization", "Bearer access-fresh");
			then.status(200).json_body(json!({ "realm": "test" }));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let body = client.get::<Value>("/realms/test").await.expect("Retry should succeed.");

	assert_eq!(body["realm"], "test");

	login.assert_calls_async(1).await;
	refresh.assert_calls_async(1).await;
	rejected.assert_calls_async(1).await;
	accepted.assert_calls_async(1).await;

	assert_eq!(client.metrics().reauthentications(), 1);
	assert_eq!(
		client.cached_token().map(|record| record.access_token.expose().to_owned()),
		Some("access-fresh".to_owned())
	);
}

#[tokio::test]
async fn persistent_unauthorized_is_reported_after_one_retry() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-denied", "refresh-denied"));
		})
		.await;
	let realm = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH);
			then.status(401).json_body(json!({ "error": "HTTP 401 Unauthorized" }));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let err = client.get::<Value>("/realms/test").await.expect_err("A second 401 should surface.");

	assert_eq!(err.status(), Some(401));

	realm.assert_calls_async(2).await;
	token.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_callers_share_one_login() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-shared", "refresh-shared"))
				.delay(std::time::Duration::from_millis(100));
		})
		.await;
	let realm = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH).header("authorization", "Bearer access-shared");
			then.status(200).json_body(json!({ "realm": "test" }));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let (first, second): (Result<Value>, Result<Value>) =
		tokio::join!(client.get("/realms/test"), client.get("/realms/test"));

	first.expect("First caller should succeed.");
	second.expect("Second caller should succeed.");

	token.assert_calls_async(1).await;
	realm.assert_calls_async(2).await;
}

#[tokio::test]
async fn password_grant_sends_user_credentials() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.body_includes("grant_type=password")
				.body_includes("username=admin")
				.body_includes("password=hunter2")
				.body_includes("client_id=admin-cli");
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-password", "refresh-password"));
		})
		.await;
	let client = build_test_client_with(
		ClientConfig::builder(server.base_url())
			.client_id("admin-cli")
			.username("admin")
			.password("hunter2"),
	);
	let record = client.login().await.expect("Password grant should succeed.");

	token.assert_async().await;

	assert_eq!(record.access_token.expose(), "access-password");
}

#[tokio::test]
async fn static_access_token_skips_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(500);
		})
		.await;
	let realm = server
		.mock_async(|when, then| {
			when.method(GET).path(REALM_PATH).header("authorization", "Bearer pre-issued");
			then.status(200).json_body(json!({ "realm": "test" }));
		})
		.await;
	let client = build_test_client_with(
		ClientConfig::builder(server.base_url()).access_token("pre-issued").initial_login(false),
	);

	client.get::<Value>("/realms/test").await.expect("Static token should be accepted.");

	token.assert_calls_async(0).await;
	realm.assert_async().await;
}

#[tokio::test]
async fn rejected_credentials_map_to_invalid_client() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"Invalid client secret\"}");
		})
		.await;

	let client = build_test_client(&server.base_url());
	let err = client.login().await.expect_err("Bad credentials should be rejected.");

	assert!(matches!(err, Error::InvalidClient { .. }), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn server_errors_at_the_token_endpoint_are_transient() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(503).body("maintenance");
		})
		.await;

	let client = build_test_client(&server.base_url());
	let err = client.login().await.expect_err("Unavailable token endpoint should fail.");

	assert!(matches!(err, Error::Transient(_)), "Unexpected error: {err:?}.");
}

#[tokio::test]
async fn legacy_base_path_prefixes_every_url() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(format!("/auth{TOKEN_PATH}"));
			then.status(200)
				.header("content-type", "application/json")
				.body(token_body("access-legacy", "refresh-legacy"));
		})
		.await;
	let realm = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/auth{REALM_PATH}"));
			then.status(200).json_body(json!({ "realm": "test" }));
		})
		.await;
	let client =
		build_test_client_with(test_client_config_builder(&server.base_url()).base_path("auth"));

	client.get::<Value>("/realms/test").await.expect("Legacy layout should be reachable.");

	token.assert_async().await;
	realm.assert_async().await;
}

#[test]
fn configuration_requires_a_credential_mode() {
	let err = ClientConfig::builder("https://sso.example.com")
		.client_id("terraform")
		.build()
		.expect_err("A bare client id is not a credential mode.");

	assert!(
		ConfigError::from(err).to_string().starts_with("Must specify client_secret"),
		"A missing credential mode should be reported."
	);
}

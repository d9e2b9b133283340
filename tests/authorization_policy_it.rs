// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use terraform_provider_keycloak::{
	_preludet::*,
	api::{OpenidClientAuthorizationRole, OpenidClientAuthorizationRolePolicy},
};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
const POLICIES_PATH: &str = "/admin/realms/test/clients/rs/authz/resource-server/policy";

async fn mock_login(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-authz\",\"refresh_token\":\"refresh-authz\",\"token_type\":\"bearer\",\"expires_in\":300}",
				);
		})
		.await;
}

fn policy_body() -> Value {
	json!({
		"id": "p1",
		"name": "admins",
		"type": "role",
		"logic": "POSITIVE",
		"decisionStrategy": "UNANIMOUS",
		"roles": [{ "id": "r1", "required": true }]
	})
}

fn policy() -> OpenidClientAuthorizationRolePolicy {
	OpenidClientAuthorizationRolePolicy {
		realm_id: "test".into(),
		resource_server_id: "rs".into(),
		name: "admins".into(),
		policy_type: "role".into(),
		roles: vec![OpenidClientAuthorizationRole { id: "r1".into(), required: true }],
		..Default::default()
	}
}

#[tokio::test]
async fn create_reads_the_id_from_the_response_body() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;

	let created = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(format!("{POLICIES_PATH}/role"))
				.body_includes("\"type\":\"role\"")
				.body_includes("\"roles\":[{\"id\":\"r1\",\"required\":true}]");
			then.status(201).json_body(policy_body());
		})
		.await;
	let client = build_test_client(&server.base_url());
	let mut policy = policy();

	client
		.new_openid_client_authorization_role_policy(&mut policy)
		.await
		.expect("Policy should be created.");

	created.assert_async().await;

	assert_eq!(policy.id, "p1");

	let fetched = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{POLICIES_PATH}/role/p1"));
			then.status(200).json_body(policy_body());
		})
		.await;
	let read = client
		.get_openid_client_authorization_role_policy("test", "rs", "p1")
		.await
		.expect("Policy should be readable.");

	fetched.assert_async().await;

	assert_eq!(read.resource_server_id, "rs");
	assert_eq!(read.decision_strategy, "UNANIMOUS");
}

#[tokio::test]
async fn update_and_delete_use_their_own_paths() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;

	let updated = server
		.mock_async(|when, then| {
			when.method(PUT)
				.path(format!("{POLICIES_PATH}/role/p1"))
				.body_includes("\"id\":\"p1\"");
			then.status(201);
		})
		.await;
	let deleted = server
		.mock_async(|when, then| {
			when.method(DELETE).path(format!("{POLICIES_PATH}/p1"));
			then.status(204);
		})
		.await;
	let client = build_test_client(&server.base_url());
	let policy = OpenidClientAuthorizationRolePolicy { id: "p1".into(), ..policy() };

	client
		.update_openid_client_authorization_role_policy(&policy)
		.await
		.expect("Policy should be updated.");
	client
		.delete_openid_client_authorization_role_policy("test", "rs", "p1")
		.await
		.expect("Policy should be deleted.");

	updated.assert_async().await;
	deleted.assert_async().await;
}

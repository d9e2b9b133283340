// crates.io
use httpmock::prelude::*;
use serde_json::json;
use tf_provider::{
	Diagnostics, Resource,
	value::{ValueBool, ValueEmpty, ValueNumber, ValueString},
};
// self
use terraform_provider_keycloak::_preludet::build_test_client;
use terraform_provider_keycloak_plugin::{
	ClientSlot,
	resources::{RealmKeystoreRsaEncGeneratedResource, RealmKeystoreRsaEncGeneratedState},
};

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
const COMPONENTS_PATH: &str = "/admin/realms/test/components";

async fn mock_login(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-keys\",\"refresh_token\":\"refresh-keys\",\"token_type\":\"bearer\",\"expires_in\":300}",
				);
		})
		.await;
}

fn resource(server: &MockServer) -> RealmKeystoreRsaEncGeneratedResource {
	RealmKeystoreRsaEncGeneratedResource::new(ClientSlot::with_client(build_test_client(
		&server.base_url(),
	)))
}

fn component_body(key_size: &str) -> serde_json::Value {
	json!({
		"id": "k1",
		"name": "rsa-enc",
		"providerId": "rsa-enc-generated",
		"providerType": "org.keycloak.keys.KeyProvider",
		"parentId": "test",
		"config": {
			"active": ["true"],
			"enabled": ["false"],
			"priority": ["100"],
			"algorithm": ["RSA-OAEP-256"],
			"keySize": [key_size],
			"certificate": ["MIIC"]
		}
	})
}

#[tokio::test]
async fn create_posts_a_key_provider_component() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;

	let created = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(COMPONENTS_PATH)
				.body_includes("\"providerId\":\"rsa-enc-generated\"")
				.body_includes("\"providerType\":\"org.keycloak.keys.KeyProvider\"")
				.body_includes("\"parentId\":\"test\"")
				.body_includes("\"keySize\":[\"4096\"]");
			then.status(201).header("location", format!("{COMPONENTS_PATH}/k1"));
		})
		.await;
	let fetched = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{COMPONENTS_PATH}/k1"));
			then.status(200).json_body(component_body("4096"));
		})
		.await;
	let resource = resource(&server);
	let mut diags = Diagnostics::default();
	let config = RealmKeystoreRsaEncGeneratedState {
		name: "rsa-enc".into(),
		realm_id: "test".into(),
		enabled: false.into(),
		priority: 100.into(),
		algorithm: "RSA-OAEP-256".into(),
		key_size: 4096.into(),
		..Default::default()
	};
	let (planned, _) = resource
		.plan_create(&mut diags, config.clone(), config.clone(), ValueEmpty::default())
		.await
		.expect("Keystore configuration should be valid.");

	assert_eq!(planned.active, ValueBool::from(true));

	let (state, _) = resource
		.create(&mut diags, planned, config, ValueEmpty::default(), ValueEmpty::default())
		.await
		.expect("Keystore should be created.");

	created.assert_async().await;
	fetched.assert_async().await;

	assert!(diags.errors.is_empty(), "{diags:?}");
	assert_eq!(state.id, ValueString::from("k1"));
	assert_eq!(state.key_size, ValueNumber::from(4096));
	assert_eq!(state.priority, ValueNumber::from(100));
	assert_eq!(state.active, ValueBool::from(true));
	assert_eq!(state.enabled, ValueBool::from(false));
}

#[tokio::test]
async fn import_reads_the_component() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{COMPONENTS_PATH}/k1"));
			then.status(200).json_body(component_body("2048"));
		})
		.await;

	let resource = resource(&server);
	let mut diags = Diagnostics::default();
	let (state, _) =
		resource.import(&mut diags, "test/k1".into()).await.expect("Import should succeed.");

	assert_eq!(state.realm_id, ValueString::from("test"));
	assert_eq!(state.algorithm, ValueString::from("RSA-OAEP-256"));
	assert_eq!(state.key_size, ValueNumber::from(2048));
}

#[tokio::test]
async fn importing_a_missing_keystore_fails() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(format!("{COMPONENTS_PATH}/k9"));
			then.status(404).json_body(json!({ "error": "Could not find component" }));
		})
		.await;

	let resource = resource(&server);
	let mut diags = Diagnostics::default();

	assert!(resource.import(&mut diags, "test/k9".into()).await.is_none());
	assert_eq!(diags.errors[0].summary, "Cannot import non-existent remote object");
}

#[tokio::test]
async fn delete_removes_the_component() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;

	let deleted = server
		.mock_async(|when, then| {
			when.method(DELETE).path(format!("{COMPONENTS_PATH}/k1"));
			then.status(204);
		})
		.await;
	let resource = resource(&server);
	let mut diags = Diagnostics::default();
	let state = RealmKeystoreRsaEncGeneratedState {
		id: "k1".into(),
		name: "rsa-enc".into(),
		realm_id: "test".into(),
		..Default::default()
	};

	resource
		.destroy(&mut diags, state, ValueEmpty::default(), ValueEmpty::default())
		.await
		.expect("Delete should succeed.");

	deleted.assert_async().await;
}

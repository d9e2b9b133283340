// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use terraform_provider_keycloak::_preludet::*;

const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";
const GROUPS_PATH: &str = "/admin/realms/test/groups";

async fn mock_login(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(
					"{\"access_token\":\"access-groups\",\"refresh_token\":\"refresh-groups\",\"token_type\":\"bearer\",\"expires_in\":300}",
				);
		})
		.await;
}

#[tokio::test]
async fn listing_pages_until_a_short_page() {
	let server = MockServer::start_async().await;

	mock_login(&server).await;

	let first_page = (0..100)
		.map(|idx| json!({ "id": format!("g{idx}"), "name": format!("group-{idx}") }))
		.collect::<Vec<_>>();
	let first = server
		.mock_async(move |when, then| {
			when.method(GET).path(GROUPS_PATH).query_param("first", "0").query_param("max", "100");
			then.status(200).json_body(Value::Array(first_page));
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(GROUPS_PATH)
				.query_param("first", "100")
				.query_param("max", "100");
			then.status(200).json_body(json!([{ "id": "g100", "name": "group-100" }]));
		})
		.await;
	let client = build_test_client(&server.base_url());
	let groups = client.get_groups("test").await.expect("Paging should succeed.");

	first.assert_async().await;
	second.assert_async().await;

	assert_eq!(groups.len(), 101);
	assert!(groups.iter().all(|group| group.realm_id == "test"));
}

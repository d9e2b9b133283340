//! `keycloak_realm_keystore_rsa_enc_generated`.

// crates.io
use terraform_provider_keycloak::api::RealmKeystoreRsaEncGenerated;
// self
use crate::{
	_prelude::*,
	diag::{check_int_one_of, check_one_of, force_new},
	import::{REALM_KEYSTORE_IMPORT_FORMAT, split_import_id},
	provider::ClientSlot,
	resources::{Remote, applied},
	schema::{computed, optional_computed, required, schema},
	value::default_to,
};

const ALGORITHMS: &[&str] = &["RSA1_5", "RSA-OAEP", "RSA-OAEP-256"];
const KEY_SIZES: &[i64] = &[1024, 2048, 4096];
const DEFAULT_ALGORITHM: &str = "RSA-OAEP";
const DEFAULT_KEY_SIZE: i64 = 2048;

/// State of `keycloak_realm_keystore_rsa_enc_generated`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmKeystoreRsaEncGeneratedState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub active: ValueBool,
	pub enabled: ValueBool,
	pub priority: ValueNumber,
	pub algorithm: ValueString<'a>,
	pub key_size: ValueNumber,
}
impl<'a> RealmKeystoreRsaEncGeneratedState<'a> {
	fn with_defaults(mut self) -> Self {
		default_to(&mut self.active, true);
		default_to(&mut self.enabled, true);
		default_to(&mut self.priority, 0);
		default_to(&mut self.algorithm, Cow::Borrowed(DEFAULT_ALGORITHM));
		default_to(&mut self.key_size, DEFAULT_KEY_SIZE);

		self
	}

	fn to_keystore(&self) -> RealmKeystoreRsaEncGenerated {
		RealmKeystoreRsaEncGenerated {
			id: text(&self.id).into(),
			name: text(&self.name).into(),
			realm_id: text(&self.realm_id).into(),
			active: self.active.unwrap_or(true),
			enabled: self.enabled.unwrap_or(true),
			priority: self.priority.unwrap_or(0),
			algorithm: text(&self.algorithm).into(),
			key_size: self.key_size.unwrap_or(DEFAULT_KEY_SIZE),
			..Default::default()
		}
	}

	fn refreshed(keystore: RealmKeystoreRsaEncGenerated, _: &Self) -> Self {
		Self {
			id: keystore.id.into(),
			name: keystore.name.into(),
			realm_id: keystore.realm_id.into(),
			active: keystore.active.into(),
			enabled: keystore.enabled.into(),
			priority: keystore.priority.into(),
			algorithm: keystore.algorithm.into(),
			key_size: keystore.key_size.into(),
		}
	}
}

/// Realm key provider generating an RSA encryption key.
#[derive(Clone, Debug)]
pub struct RealmKeystoreRsaEncGeneratedResource {
	client: ClientSlot,
}
impl RealmKeystoreRsaEncGeneratedResource {
	/// Resource bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client }
	}
}
#[async_trait]
impl Resource for RealmKeystoreRsaEncGeneratedResource {
	type State<'a> = RealmKeystoreRsaEncGeneratedState<'a>;
	type PrivateState<'a> = ValueEmpty;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		Some(schema(
			"Realm key provider that generates an RSA key for encryption.",
			map! {
				"id" => computed(AttributeType::String, "Component id."),
				"name" => required(
					AttributeType::String,
					"Display name of provider when linked in admin console.",
				),
				"realm_id" => required(AttributeType::String, "Realm the keystore belongs to."),
				"active" => optional_computed(
					AttributeType::Bool,
					"Set if the keys can be used for signing",
				),
				"enabled" => optional_computed(AttributeType::Bool, "Set if the keys are enabled"),
				"priority" => optional_computed(AttributeType::Number, "Priority for the provider"),
				"algorithm" => optional_computed(
					AttributeType::String,
					"Intended algorithm for the key",
				),
				"key_size" => optional_computed(
					AttributeType::Number,
					"Size for the generated keys",
				),
			},
			HashMap::new(),
		))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
		check_one_of(diags, "algorithm", &config.algorithm, ALGORITHMS);
		check_int_one_of(diags, "key_size", &config.key_size, KEY_SIZES);

		Some(())
	}

	async fn read<'a>(
		&self,
		diags: &mut Diagnostics,
		state: Self::State<'a>,
		_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let Some(client) = self.client.get(diags) else {
			return Some((state, ValueEmpty::default()));
		};
		let fetched = client
			.get_realm_keystore_rsa_enc_generated(text(&state.realm_id), text(&state.id))
			.await;

		Remote::new(fetched, diags).refresh(state, RealmKeystoreRsaEncGeneratedState::refreshed)
	}

	async fn plan_create<'a>(
		&self,
		_diags: &mut Diagnostics,
		proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let mut state = proposed_state.with_defaults();

		state.id = ValueString::Unknown;

		Some((state, ValueEmpty::default()))
	}

	async fn plan_update<'a>(
		&self,
		_diags: &mut Diagnostics,
		prior_state: Self::State<'a>,
		proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		prior_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
		let mut replace = Vec::new();

		force_new(&mut replace, "realm_id", &prior_state.realm_id, &proposed_state.realm_id);

		Some((proposed_state.with_defaults(), prior_private_state, replace))
	}

	async fn plan_destroy<'a>(
		&self,
		_diags: &mut Diagnostics,
		_prior_state: Self::State<'a>,
		prior_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<Self::PrivateState<'a>> {
		Some(prior_private_state)
	}

	async fn create<'a>(
		&self,
		diags: &mut Diagnostics,
		planned_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_planned_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let client = self.client.get(diags)?;
		let mut keystore = planned_state.to_keystore();

		client.new_realm_keystore_rsa_enc_generated(&mut keystore).await.or_report(diags)?;

		let planned =
			RealmKeystoreRsaEncGeneratedState { id: keystore.id.clone().into(), ..planned_state };
		let fetched =
			client.get_realm_keystore_rsa_enc_generated(&keystore.realm_id, &keystore.id).await;

		applied(fetched, planned, diags, RealmKeystoreRsaEncGeneratedState::refreshed)
	}

	async fn update<'a>(
		&self,
		diags: &mut Diagnostics,
		_prior_state: Self::State<'a>,
		planned_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_planned_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let client = self.client.get(diags)?;
		let keystore = planned_state.to_keystore();

		client.update_realm_keystore_rsa_enc_generated(&keystore).await.or_report(diags)?;

		let fetched =
			client.get_realm_keystore_rsa_enc_generated(&keystore.realm_id, &keystore.id).await;

		applied(fetched, planned_state, diags, RealmKeystoreRsaEncGeneratedState::refreshed)
	}

	async fn destroy<'a>(
		&self,
		diags: &mut Diagnostics,
		prior_state: Self::State<'a>,
		_planned_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<()> {
		self.client
			.get(diags)?
			.delete_realm_keystore_rsa_enc_generated(
				text(&prior_state.realm_id),
				text(&prior_state.id),
			)
			.await
			.or_report(diags)
	}

	async fn import<'a>(
		&self,
		diags: &mut Diagnostics,
		id: String,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let [realm_id, keystore_id] =
			split_import_id::<2>(&id, REALM_KEYSTORE_IMPORT_FORMAT).or_report(diags)?;
		let client = self.client.get(diags)?;
		let fetched = client.get_realm_keystore_rsa_enc_generated(&realm_id, &keystore_id).await;

		Remote::new(fetched, diags).import(diags, &id, RealmKeystoreRsaEncGeneratedState::refreshed)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use serde_json::json;
	use terraform_provider_keycloak::_preludet::build_test_client;
	// self
	use super::*;

	const COMPONENT_PATH: &str = "/admin/realms/test/components/k1";

	fn keystore(server: &MockServer) -> RealmKeystoreRsaEncGeneratedResource {
		RealmKeystoreRsaEncGeneratedResource::new(ClientSlot::with_client(build_test_client(
			&server.base_url(),
		)))
	}

	fn configured() -> RealmKeystoreRsaEncGeneratedState<'static> {
		RealmKeystoreRsaEncGeneratedState {
			id: "k1".into(),
			name: "rsa-enc".into(),
			realm_id: "test".into(),
			..Default::default()
		}
		.with_defaults()
	}

	fn component(active: &str, enabled: &str, priority: &str) -> serde_json::Value {
		json!({
			"id": "k1",
			"name": "rsa-enc",
			"providerId": "rsa-enc-generated",
			"providerType": "org.keycloak.keys.KeyProvider",
			"parentId": "test",
			"config": {
				"active": [active],
				"enabled": [enabled],
				"priority": [priority],
				"algorithm": ["RSA-OAEP"],
				"keySize": ["2048"]
			}
		})
	}

	async fn mock_login(server: &MockServer) {
		server
			.mock_async(|when, then| {
				when.method(POST).path("/realms/master/protocol/openid-connect/token");
				then.status(200).json_body(json!({
					"access_token": "access-keys",
					"refresh_token": "refresh-keys",
					"token_type": "bearer",
					"expires_in": 300
				}));
			})
			.await;
	}

	#[tokio::test]
	async fn unsupported_algorithm_and_key_size_are_rejected() {
		let resource = RealmKeystoreRsaEncGeneratedResource::new(ClientSlot::default());
		let mut diags = Diagnostics::default();
		let config = RealmKeystoreRsaEncGeneratedState {
			algorithm: "RSA-PSS".into(),
			key_size: 3072.into(),
			..configured()
		};

		resource.validate(&mut diags, config).await;

		let attributes = diags.errors.iter().map(|diag| diag.attribute.clone()).collect::<Vec<_>>();

		assert_eq!(
			attributes,
			vec![AttributePath::new("algorithm"), AttributePath::new("key_size")]
		);
		assert_eq!(
			diags.errors[0].summary,
			"expected algorithm to be one of [RSA1_5 RSA-OAEP RSA-OAEP-256], got RSA-PSS"
		);
		assert_eq!(
			diags.errors[1].summary,
			"expected key_size to be one of [1024 2048 4096], got 3072"
		);

		let mut diags = Diagnostics::default();

		resource
			.validate(&mut diags, RealmKeystoreRsaEncGeneratedState {
				algorithm: "RSA-OAEP-256".into(),
				key_size: 4096.into(),
				priority: (-10).into(),
				..configured()
			})
			.await;

		assert!(diags.errors.is_empty());
	}

	#[tokio::test]
	async fn plan_fills_defaults_and_replaces_on_realm_change() {
		let resource = RealmKeystoreRsaEncGeneratedResource::new(ClientSlot::default());
		let mut diags = Diagnostics::default();
		let proposed = RealmKeystoreRsaEncGeneratedState {
			name: "rsa-enc".into(),
			realm_id: "test".into(),
			priority: 100.into(),
			..Default::default()
		};
		let (planned, _) = resource
			.plan_create(&mut diags, proposed.clone(), proposed, ValueEmpty::default())
			.await
			.expect("Plan should succeed.");

		assert_eq!(planned.id, ValueString::Unknown);
		assert_eq!(planned.priority, ValueNumber::from(100));
		assert_eq!(planned.active, ValueBool::from(true));
		assert_eq!(planned.enabled, ValueBool::from(true));
		assert_eq!(planned.algorithm, ValueString::from("RSA-OAEP"));
		assert_eq!(planned.key_size, ValueNumber::from(2048));

		let moved = RealmKeystoreRsaEncGeneratedState { realm_id: "other".into(), ..configured() };
		let (_, _, replace) = resource
			.plan_update(
				&mut diags,
				configured(),
				moved.clone(),
				moved,
				ValueEmpty::default(),
				ValueEmpty::default(),
			)
			.await
			.expect("Plan should succeed.");

		assert_eq!(replace, vec![AttributePath::new("realm_id")]);
	}

	#[tokio::test]
	async fn read_accepts_keycloak_boolean_spellings() {
		let server = MockServer::start_async().await;

		mock_login(&server).await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(COMPONENT_PATH);
				then.status(200).json_body(component("True", "0", ""));
			})
			.await;

		let mut diags = Diagnostics::default();
		let (state, _) = keystore(&server)
			.read(&mut diags, configured(), ValueEmpty::default(), ValueEmpty::default())
			.await
			.expect("Keystore should still exist.");

		assert!(diags.errors.is_empty(), "{diags:?}");
		assert_eq!(state.active, ValueBool::from(true));
		assert_eq!(state.enabled, ValueBool::from(false));
		assert_eq!(state.priority, ValueNumber::from(0));
	}

	#[tokio::test]
	async fn unknown_boolean_spellings_keep_prior_state() {
		let server = MockServer::start_async().await;

		mock_login(&server).await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(COMPONENT_PATH);
				then.status(200).json_body(component("yes", "true", "10"));
			})
			.await;

		let mut diags = Diagnostics::default();
		let prior = configured();
		let (state, _) = keystore(&server)
			.read(&mut diags, prior.clone(), ValueEmpty::default(), ValueEmpty::default())
			.await
			.expect("A decode failure is not a deletion.");

		assert_eq!(state, prior);
		assert_eq!(diags.errors.len(), 1);
		assert_eq!(
			diags.errors[0].summary,
			"Component config `active` holds an invalid value `yes`."
		);
	}

	#[tokio::test]
	async fn update_puts_the_component_and_rereads_it() {
		let server = MockServer::start_async().await;

		mock_login(&server).await;

		let put = server
			.mock_async(|when, then| {
				when.method(PUT)
					.path(COMPONENT_PATH)
					.body_includes("\"priority\":[\"100\"]")
					.body_includes("\"enabled\":[\"false\"]");
				then.status(204);
			})
			.await;
		let get = server
			.mock_async(|when, then| {
				when.method(GET).path(COMPONENT_PATH);
				then.status(200).json_body(component("true", "false", "100"));
			})
			.await;
		let planned = RealmKeystoreRsaEncGeneratedState {
			enabled: false.into(),
			priority: 100.into(),
			..configured()
		};
		let mut diags = Diagnostics::default();
		let (state, _) = keystore(&server)
			.update(
				&mut diags,
				configured(),
				planned.clone(),
				planned.clone(),
				ValueEmpty::default(),
				ValueEmpty::default(),
			)
			.await
			.expect("Update should succeed.");

		put.assert_calls_async(1).await;
		get.assert_calls_async(1).await;

		assert!(diags.errors.is_empty(), "{diags:?}");
		assert_eq!(state, planned);
	}
}

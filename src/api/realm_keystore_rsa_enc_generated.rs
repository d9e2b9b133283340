//! Generated RSA encryption key provider stored as a realm component.

// self
use crate::{_prelude::*, api::component::Component, client::KeycloakClient};

const PROVIDER_ID: &str = "rsa-enc-generated";
const PROVIDER_TYPE: &str = "org.keycloak.keys.KeyProvider";
const DEFAULT_PRIORITY: i64 = 0;
const DEFAULT_KEY_SIZE: i64 = 2048;

/// Realm keystore holding a server-generated RSA encryption key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RealmKeystoreRsaEncGenerated {
	/// Identifier; empty before creation.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Owning realm.
	pub realm_id: String,
	/// Key is used for new encryptions.
	pub active: bool,
	/// Key is loaded at all.
	pub enabled: bool,
	/// Precedence among keys of the same algorithm.
	pub priority: i64,
	/// `RSA1_5`, `RSA-OAEP` or `RSA-OAEP-256`.
	pub algorithm: String,
	/// Modulus size in bits.
	pub key_size: i64,
	/// Server-generated private key (read only).
	pub private_key: String,
	/// Server-generated certificate (read only).
	pub certificate: String,
}
impl RealmKeystoreRsaEncGenerated {
	/// Converts into the component representation sent to Keycloak.
	pub fn to_component(&self) -> Component {
		let mut component = Component {
			id: self.id.clone(),
			name: self.name.clone(),
			provider_id: PROVIDER_ID.into(),
			provider_type: PROVIDER_TYPE.into(),
			parent_id: self.realm_id.clone(),
			config: BTreeMap::new(),
		};

		component.set_config("active", self.active.to_string());
		component.set_config("enabled", self.enabled.to_string());
		component.set_config("priority", self.priority.to_string());
		component.set_config("algorithm", self.algorithm.clone());
		component.set_config("keySize", self.key_size.to_string());

		component
	}

	/// Rebuilds the keystore from a component, applying read-side defaults.
	pub fn from_component(component: Component, realm_id: &str) -> Result<Self> {
		Ok(Self {
			active: component.config_bool("active")?,
			enabled: component.config_bool("enabled")?,
			priority: component.config_int_or("priority", DEFAULT_PRIORITY)?,
			key_size: component.config_int_or("keySize", DEFAULT_KEY_SIZE)?,
			algorithm: component.config_value("algorithm").into(),
			private_key: component.config_value("privateKey").into(),
			certificate: component.config_value("certificate").into(),
			realm_id: realm_id.into(),
			id: component.id,
			name: component.name,
		})
	}
}

impl KeycloakClient {
	/// Creates the keystore and records its id.
	pub async fn new_realm_keystore_rsa_enc_generated(
		&self,
		keystore: &mut RealmKeystoreRsaEncGenerated,
	) -> Result<()> {
		let path = format!("/realms/{}/components", keystore.realm_id);

		keystore.id = self.post_for_id(&path, &keystore.to_component()).await?;

		Ok(())
	}

	/// Fetches the keystore.
	pub async fn get_realm_keystore_rsa_enc_generated(
		&self,
		realm_id: &str,
		id: &str,
	) -> Result<RealmKeystoreRsaEncGenerated> {
		let component =
			self.get::<Component>(&format!("/realms/{realm_id}/components/{id}")).await?;

		RealmKeystoreRsaEncGenerated::from_component(component, realm_id)
	}

	/// Replaces the keystore configuration.
	pub async fn update_realm_keystore_rsa_enc_generated(
		&self,
		keystore: &RealmKeystoreRsaEncGenerated,
	) -> Result<()> {
		let path = format!("/realms/{}/components/{}", keystore.realm_id, keystore.id);

		self.put(&path, &keystore.to_component()).await
	}

	/// Deletes the keystore.
	pub async fn delete_realm_keystore_rsa_enc_generated(
		&self,
		realm_id: &str,
		id: &str,
	) -> Result<()> {
		self.delete(&format!("/realms/{realm_id}/components/{id}")).await
	}
}

//! Generic protocol mapper representation and the CRUD calls shared by typed mappers.
//!
//! A mapper hangs off either a client or a client scope. [`MapperParent`] keeps
//! the realm together with that choice, and [`TypedProtocolMapper`] lets each
//! typed mapper describe its conversion to and from the generic wire shape so the
//! HTTP calls are written once.

// self
use crate::{_prelude::*, client::KeycloakClient};

/// SAML attribute name.
pub const ATTRIBUTE_NAME_FIELD: &str = "attribute.name";
/// SAML attribute name format.
pub const ATTRIBUTE_NAME_FORMAT_FIELD: &str = "attribute.nameformat";
/// SAML friendly name.
pub const FRIENDLY_NAME_FIELD: &str = "friendly.name";
/// Hardcoded attribute value.
pub const ATTRIBUTE_VALUE_FIELD: &str = "attribute.value";
/// User session note name.
pub const NOTE_FIELD: &str = "note";
/// OIDC claim name.
pub const CLAIM_NAME_FIELD: &str = "claim.name";
/// OIDC claim JSON type.
pub const CLAIM_VALUE_TYPE_FIELD: &str = "jsonType.label";
/// Script source.
pub const SCRIPT_FIELD: &str = "script";
/// Add the claim to the ID token.
pub const ADD_TO_ID_TOKEN_FIELD: &str = "id.token.claim";
/// Add the claim to the access token.
pub const ADD_TO_ACCESS_TOKEN_FIELD: &str = "access.token.claim";
/// Add the claim to the userinfo response.
pub const ADD_TO_USERINFO_FIELD: &str = "userinfo.token.claim";
/// Emit the claim as an array.
pub const MULTIVALUED_FIELD: &str = "multivalued";

/// Protocol mapper as exchanged with the `protocol-mappers/models` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolMapper {
	/// Server-assigned identifier; empty before creation.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	/// Mapper name, unique per parent.
	pub name: String,
	/// `saml` or `openid-connect`.
	pub protocol: String,
	/// Mapper implementation identifier.
	pub protocol_mapper: String,
	/// Single-valued configuration entries.
	#[serde(default)]
	pub config: BTreeMap<String, String>,
}
impl ProtocolMapper {
	/// Returns the config entry stored under `key`, or `""` when absent.
	pub fn config_value(&self, key: &str) -> &str {
		self.config.get(key).map(String::as_str).unwrap_or("")
	}

	/// Returns a config entry parsed as a boolean; anything but `true` reads as `false`.
	pub fn config_flag(&self, key: &str) -> bool {
		self.config_value(key).eq_ignore_ascii_case("true")
	}
}

/// Realm plus the client or client scope a mapper is attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapperParent {
	/// Realm identifier.
	pub realm_id: String,
	/// Owning client, if any.
	pub client_id: Option<String>,
	/// Owning client scope, if any.
	pub client_scope_id: Option<String>,
}
impl MapperParent {
	/// Parent that is a client.
	pub fn client(realm_id: impl Into<String>, client_id: impl Into<String>) -> Self {
		Self { realm_id: realm_id.into(), client_id: Some(client_id.into()), client_scope_id: None }
	}

	/// Parent that is a client scope.
	pub fn client_scope(realm_id: impl Into<String>, client_scope_id: impl Into<String>) -> Self {
		Self {
			realm_id: realm_id.into(),
			client_id: None,
			client_scope_id: Some(client_scope_id.into()),
		}
	}

	/// Collection path of the parent's mappers.
	pub fn mappers_path(&self) -> Result<String> {
		match (non_empty(&self.client_id), non_empty(&self.client_scope_id)) {
			(Some(client), _) =>
				Ok(format!("/realms/{}/clients/{client}/protocol-mappers/models", self.realm_id)),
			(None, Some(scope)) => Ok(format!(
				"/realms/{}/client-scopes/{scope}/protocol-mappers/models",
				self.realm_id
			)),
			(None, None) =>
				Err(Error::validation("one of ClientId or ClientScopeId must be set")),
		}
	}

	/// Path of a single mapper below the parent.
	pub fn mapper_path(&self, id: &str) -> Result<String> {
		Ok(format!("{}/{id}", self.mappers_path()?))
	}

	fn kind(&self) -> &'static str {
		if non_empty(&self.client_id).is_some() { "client" } else { "client scope" }
	}
}

/// Typed mapper that converts to and from [`ProtocolMapper`].
pub trait TypedProtocolMapper: Sized {
	/// Protocol the mapper belongs to.
	const PROTOCOL: &'static str;
	/// Mapper implementation identifier.
	const PROTOCOL_MAPPER: &'static str;

	/// Identifier; empty before creation.
	fn id(&self) -> &str;
	/// Stores the identifier assigned on creation.
	fn set_id(&mut self, id: String);
	/// Mapper name.
	fn name(&self) -> &str;
	/// Attachment point.
	fn parent(&self) -> &MapperParent;
	/// Implementation-specific config entries.
	fn config(&self) -> BTreeMap<String, String>;
	/// Rebuilds the typed mapper from its wire shape.
	fn from_generic(mapper: ProtocolMapper, parent: MapperParent) -> Self;

	/// Converts the typed mapper into its wire shape.
	fn to_generic(&self) -> ProtocolMapper {
		ProtocolMapper {
			id: self.id().to_owned(),
			name: self.name().to_owned(),
			protocol: Self::PROTOCOL.into(),
			protocol_mapper: Self::PROTOCOL_MAPPER.into(),
			config: self.config(),
		}
	}
}

impl KeycloakClient {
	/// Lists the mappers attached to `parent`.
	pub async fn list_generic_protocol_mappers(
		&self,
		parent: &MapperParent,
	) -> Result<Vec<ProtocolMapper>> {
		self.get(&parent.mappers_path()?).await
	}

	/// Rejects mappers without a parent or whose name is taken by a sibling.
	pub async fn validate_protocol_mapper_parent_and_name(
		&self,
		parent: &MapperParent,
		id: &str,
		name: &str,
	) -> Result<()> {
		let siblings = self.list_generic_protocol_mappers(parent).await?;

		if siblings.iter().any(|mapper| mapper.name == name && mapper.id != id) {
			return Err(Error::validation(format!(
				"a protocol mapper with name {name} already exists for this {}",
				parent.kind()
			)));
		}

		Ok(())
	}

	/// Fetches a typed mapper by id.
	pub async fn get_protocol_mapper<M>(&self, parent: &MapperParent, id: &str) -> Result<M>
	where
		M: TypedProtocolMapper,
	{
		let generic = self.get::<ProtocolMapper>(&parent.mapper_path(id)?).await?;

		Ok(M::from_generic(generic, parent.clone()))
	}

	/// Creates a typed mapper and stores the assigned id on it.
	pub async fn new_protocol_mapper<M>(&self, mapper: &mut M) -> Result<()>
	where
		M: TypedProtocolMapper,
	{
		let path = mapper.parent().mappers_path()?;
		let id = self.post_for_id(&path, &mapper.to_generic()).await?;

		mapper.set_id(id);

		Ok(())
	}

	/// Replaces a typed mapper.
	pub async fn update_protocol_mapper<M>(&self, mapper: &M) -> Result<()>
	where
		M: TypedProtocolMapper,
	{
		self.put(&mapper.parent().mapper_path(mapper.id())?, &mapper.to_generic()).await
	}

	/// Deletes a mapper by id.
	pub async fn delete_protocol_mapper(&self, parent: &MapperParent, id: &str) -> Result<()> {
		self.delete(&parent.mapper_path(id)?).await
	}

	/// Validates parent and name uniqueness of a typed mapper.
	pub async fn validate_protocol_mapper<M>(&self, mapper: &M) -> Result<()>
	where
		M: TypedProtocolMapper,
	{
		self.validate_protocol_mapper_parent_and_name(mapper.parent(), mapper.id(), mapper.name())
			.await
	}
}

/// Collection path of a parent's mappers.
pub fn protocol_mapper_path(
	realm_id: &str,
	client_id: Option<&str>,
	client_scope_id: Option<&str>,
) -> Result<String> {
	MapperParent {
		realm_id: realm_id.into(),
		client_id: client_id.map(Into::into),
		client_scope_id: client_scope_id.map(Into::into),
	}
	.mappers_path()
}

/// Path of a single mapper.
pub fn individual_protocol_mapper_path(
	realm_id: &str,
	client_id: Option<&str>,
	client_scope_id: Option<&str>,
	id: &str,
) -> Result<String> {
	Ok(format!("{}/{id}", protocol_mapper_path(realm_id, client_id, client_scope_id)?))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn paths_prefer_client_over_scope() {
		assert_eq!(
			protocol_mapper_path("test", Some("c1"), None).expect("Client path should build."),
			"/realms/test/clients/c1/protocol-mappers/models"
		);
		assert_eq!(
			individual_protocol_mapper_path("test", Some(""), Some("s1"), "m1")
				.expect("Scope path should build."),
			"/realms/test/client-scopes/s1/protocol-mappers/models/m1"
		);
	}

	#[test]
	fn missing_parent_is_a_validation_error() {
		let err = MapperParent { realm_id: "test".into(), ..Default::default() }
			.mappers_path()
			.expect_err("A parentless mapper must be rejected.");

		assert_eq!(
			err.to_string(),
			"validation error: one of ClientId or ClientScopeId must be set"
		);
	}

	#[test]
	fn flags_parse_case_insensitively() {
		let mut mapper = ProtocolMapper::default();

		mapper.config.insert(ADD_TO_ID_TOKEN_FIELD.into(), "TRUE".into());
		mapper.config.insert(MULTIVALUED_FIELD.into(), "false".into());

		assert!(mapper.config_flag(ADD_TO_ID_TOKEN_FIELD));
		assert!(!mapper.config_flag(MULTIVALUED_FIELD));
		assert!(!mapper.config_flag(ADD_TO_USERINFO_FIELD));
		assert_eq!(mapper.config_value(SCRIPT_FIELD), "");
	}
}

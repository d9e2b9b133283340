//! OIDC mapper that computes a claim from a server-side script.

// self
use crate::{
	_prelude::*,
	api::protocol_mapper::{
		ADD_TO_ACCESS_TOKEN_FIELD, ADD_TO_ID_TOKEN_FIELD, ADD_TO_USERINFO_FIELD, CLAIM_NAME_FIELD,
		CLAIM_VALUE_TYPE_FIELD, MULTIVALUED_FIELD, MapperParent, ProtocolMapper, SCRIPT_FIELD,
		TypedProtocolMapper,
	},
	client::KeycloakClient,
};

/// `oidc-script-based-protocol-mapper` attached to a client or client scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenIdScriptProtocolMapper {
	/// Identifier; empty before creation.
	pub id: String,
	/// Mapper name.
	pub name: String,
	/// Attachment point.
	pub parent: MapperParent,
	/// Emit the claim in ID tokens.
	pub add_to_id_token: bool,
	/// Emit the claim in access tokens.
	pub add_to_access_token: bool,
	/// Emit the claim from the userinfo endpoint.
	pub add_to_userinfo: bool,
	/// Emit the claim as an array.
	pub multivalued: bool,
	/// Claim name.
	pub claim_name: String,
	/// JSON type of the claim value.
	pub claim_value_type: String,
	/// Script source.
	pub script: String,
}
impl TypedProtocolMapper for OpenIdScriptProtocolMapper {
	const PROTOCOL: &'static str = "openid-connect";
	const PROTOCOL_MAPPER: &'static str = "oidc-script-based-protocol-mapper";

	fn id(&self) -> &str {
		&self.id
	}

	fn set_id(&mut self, id: String) {
		self.id = id;
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn parent(&self) -> &MapperParent {
		&self.parent
	}

	fn config(&self) -> BTreeMap<String, String> {
		BTreeMap::from([
			(ADD_TO_ID_TOKEN_FIELD.into(), self.add_to_id_token.to_string()),
			(ADD_TO_ACCESS_TOKEN_FIELD.into(), self.add_to_access_token.to_string()),
			(ADD_TO_USERINFO_FIELD.into(), self.add_to_userinfo.to_string()),
			(MULTIVALUED_FIELD.into(), self.multivalued.to_string()),
			(CLAIM_NAME_FIELD.into(), self.claim_name.clone()),
			(CLAIM_VALUE_TYPE_FIELD.into(), self.claim_value_type.clone()),
			(SCRIPT_FIELD.into(), self.script.clone()),
		])
	}

	fn from_generic(mapper: ProtocolMapper, parent: MapperParent) -> Self {
		Self {
			add_to_id_token: mapper.config_flag(ADD_TO_ID_TOKEN_FIELD),
			add_to_access_token: mapper.config_flag(ADD_TO_ACCESS_TOKEN_FIELD),
			add_to_userinfo: mapper.config_flag(ADD_TO_USERINFO_FIELD),
			multivalued: mapper.config_flag(MULTIVALUED_FIELD),
			claim_name: mapper.config_value(CLAIM_NAME_FIELD).into(),
			claim_value_type: mapper.config_value(CLAIM_VALUE_TYPE_FIELD).into(),
			script: mapper.config_value(SCRIPT_FIELD).into(),
			id: mapper.id,
			name: mapper.name,
			parent,
		}
	}
}

impl KeycloakClient {
	/// Fetches a script mapper.
	pub async fn get_openid_script_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<OpenIdScriptProtocolMapper> {
		self.get_protocol_mapper(parent, id).await
	}

	/// Creates a script mapper and records its id.
	pub async fn new_openid_script_protocol_mapper(
		&self,
		mapper: &mut OpenIdScriptProtocolMapper,
	) -> Result<()> {
		self.new_protocol_mapper(mapper).await
	}

	/// Replaces a script mapper.
	pub async fn update_openid_script_protocol_mapper(
		&self,
		mapper: &OpenIdScriptProtocolMapper,
	) -> Result<()> {
		self.update_protocol_mapper(mapper).await
	}

	/// Deletes a script mapper.
	pub async fn delete_openid_script_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<()> {
		self.delete_protocol_mapper(parent, id).await
	}

	/// Checks the parent and name uniqueness of a script mapper.
	pub async fn validate_openid_script_protocol_mapper(
		&self,
		mapper: &OpenIdScriptProtocolMapper,
	) -> Result<()> {
		self.validate_protocol_mapper(mapper).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flags_are_written_as_strings() {
		let mapper = OpenIdScriptProtocolMapper {
			name: "script".into(),
			parent: MapperParent::client("test", "c1"),
			add_to_id_token: true,
			add_to_access_token: true,
			claim_name: "bar".into(),
			claim_value_type: "String".into(),
			script: "exports = 'foo';".into(),
			..Default::default()
		};
		let generic = mapper.to_generic();

		assert_eq!(generic.protocol, "openid-connect");
		assert_eq!(generic.config_value(ADD_TO_ID_TOKEN_FIELD), "true");
		assert_eq!(generic.config_value(ADD_TO_USERINFO_FIELD), "false");
		assert_eq!(
			OpenIdScriptProtocolMapper::from_generic(generic, mapper.parent.clone()),
			mapper
		);
	}
}

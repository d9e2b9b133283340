//! SAML mapper that adds a constant attribute to every assertion.

// self
use crate::{
	_prelude::*,
	api::protocol_mapper::{
		ATTRIBUTE_NAME_FIELD, ATTRIBUTE_NAME_FORMAT_FIELD, ATTRIBUTE_VALUE_FIELD,
		FRIENDLY_NAME_FIELD, MapperParent, ProtocolMapper, TypedProtocolMapper,
	},
	client::KeycloakClient,
};

/// `saml-hardcode-attribute-mapper` attached to a client or client scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamlHardcodedAttributeProtocolMapper {
	/// Identifier; empty before creation.
	pub id: String,
	/// Mapper name.
	pub name: String,
	/// Attachment point.
	pub parent: MapperParent,
	/// Constant attribute value.
	pub attribute_value: String,
	/// Optional friendly name.
	pub friendly_name: String,
	/// SAML attribute name.
	pub saml_attribute_name: String,
	/// `Basic`, `URI Reference` or `Unspecified`.
	pub saml_attribute_name_format: String,
}
impl TypedProtocolMapper for SamlHardcodedAttributeProtocolMapper {
	const PROTOCOL: &'static str = "saml";
	const PROTOCOL_MAPPER: &'static str = "saml-hardcode-attribute-mapper";

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
			(ATTRIBUTE_NAME_FIELD.into(), self.saml_attribute_name.clone()),
			(ATTRIBUTE_NAME_FORMAT_FIELD.into(), self.saml_attribute_name_format.clone()),
			(FRIENDLY_NAME_FIELD.into(), self.friendly_name.clone()),
			(ATTRIBUTE_VALUE_FIELD.into(), self.attribute_value.clone()),
		])
	}

	fn from_generic(mapper: ProtocolMapper, parent: MapperParent) -> Self {
		Self {
			attribute_value: mapper.config_value(ATTRIBUTE_VALUE_FIELD).into(),
			friendly_name: mapper.config_value(FRIENDLY_NAME_FIELD).into(),
			saml_attribute_name: mapper.config_value(ATTRIBUTE_NAME_FIELD).into(),
			saml_attribute_name_format: mapper.config_value(ATTRIBUTE_NAME_FORMAT_FIELD).into(),
			id: mapper.id,
			name: mapper.name,
			parent,
		}
	}
}

impl KeycloakClient {
	/// Fetches a hardcoded attribute mapper.
	pub async fn get_saml_hardcoded_attribute_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<SamlHardcodedAttributeProtocolMapper> {
		self.get_protocol_mapper(parent, id).await
	}

	/// Creates a hardcoded attribute mapper and records its id.
	pub async fn new_saml_hardcoded_attribute_protocol_mapper(
		&self,
		mapper: &mut SamlHardcodedAttributeProtocolMapper,
	) -> Result<()> {
		self.new_protocol_mapper(mapper).await
	}

	/// Replaces a hardcoded attribute mapper.
	pub async fn update_saml_hardcoded_attribute_protocol_mapper(
		&self,
		mapper: &SamlHardcodedAttributeProtocolMapper,
	) -> Result<()> {
		self.update_protocol_mapper(mapper).await
	}

	/// Deletes a hardcoded attribute mapper.
	pub async fn delete_saml_hardcoded_attribute_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<()> {
		self.delete_protocol_mapper(parent, id).await
	}

	/// Checks the parent and name uniqueness of a hardcoded attribute mapper.
	pub async fn validate_saml_hardcoded_attribute_protocol_mapper(
		&self,
		mapper: &SamlHardcodedAttributeProtocolMapper,
	) -> Result<()> {
		self.validate_protocol_mapper(mapper).await
	}
}

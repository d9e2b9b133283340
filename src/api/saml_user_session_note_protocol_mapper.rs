//! SAML mapper that copies a user session note into the assertion.

// self
use crate::{
	_prelude::*,
	api::protocol_mapper::{
		ATTRIBUTE_NAME_FIELD, ATTRIBUTE_NAME_FORMAT_FIELD, FRIENDLY_NAME_FIELD, MapperParent,
		NOTE_FIELD, ProtocolMapper, TypedProtocolMapper,
	},
	client::KeycloakClient,
};

/// `saml-user-session-note-mapper` attached to a client or client scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamlUserSessionNoteProtocolMapper {
	/// Identifier; empty before creation.
	pub id: String,
	/// Mapper name.
	pub name: String,
	/// Attachment point.
	pub parent: MapperParent,
	/// Session note to copy.
	pub note_name: String,
	/// Optional friendly name.
	pub friendly_name: String,
	/// SAML attribute name.
	pub saml_attribute_name: String,
	/// `Basic`, `URI Reference` or `Unspecified`.
	pub saml_attribute_name_format: String,
}
impl TypedProtocolMapper for SamlUserSessionNoteProtocolMapper {
	const PROTOCOL: &'static str = "saml";
	const PROTOCOL_MAPPER: &'static str = "saml-user-session-note-mapper";

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
			(NOTE_FIELD.into(), self.note_name.clone()),
		])
	}

	fn from_generic(mapper: ProtocolMapper, parent: MapperParent) -> Self {
		Self {
			note_name: mapper.config_value(NOTE_FIELD).into(),
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
	/// Fetches a user session note mapper.
	pub async fn get_saml_user_session_note_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<SamlUserSessionNoteProtocolMapper> {
		self.get_protocol_mapper(parent, id).await
	}

	/// Creates a user session note mapper and records its id.
	pub async fn new_saml_user_session_note_protocol_mapper(
		&self,
		mapper: &mut SamlUserSessionNoteProtocolMapper,
	) -> Result<()> {
		self.new_protocol_mapper(mapper).await
	}

	/// Replaces a user session note mapper.
	pub async fn update_saml_user_session_note_protocol_mapper(
		&self,
		mapper: &SamlUserSessionNoteProtocolMapper,
	) -> Result<()> {
		self.update_protocol_mapper(mapper).await
	}

	/// Deletes a user session note mapper.
	pub async fn delete_saml_user_session_note_protocol_mapper(
		&self,
		parent: &MapperParent,
		id: &str,
	) -> Result<()> {
		self.delete_protocol_mapper(parent, id).await
	}

	/// Checks the parent and name uniqueness of a user session note mapper.
	pub async fn validate_saml_user_session_note_protocol_mapper(
		&self,
		mapper: &SamlUserSessionNoteProtocolMapper,
	) -> Result<()> {
		self.validate_protocol_mapper(mapper).await
	}
}

//! `keycloak_saml_hardcoded_attribute_protocol_mapper`.

// crates.io
use terraform_provider_keycloak::api::SamlHardcodedAttributeProtocolMapper;
// self
use crate::{
	_prelude::*,
	diag::check_one_of,
	resources::mapper::{
		MapperBinding, MapperResource, SAML_ATTRIBUTE_NAME_FORMATS, parent_from, parent_values,
	},
	schema::{optional, required},
};

/// SAML mapper adding a constant attribute.
pub type SamlHardcodedAttributeProtocolMapperResource =
	MapperResource<SamlHardcodedAttributeProtocolMapper>;

/// State of `keycloak_saml_hardcoded_attribute_protocol_mapper`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SamlHardcodedAttributeProtocolMapperState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub client_id: ValueString<'a>,
	pub client_scope_id: ValueString<'a>,
	pub attribute_value: ValueString<'a>,
	pub friendly_name: ValueString<'a>,
	pub saml_attribute_name: ValueString<'a>,
	pub saml_attribute_name_format: ValueString<'a>,
}

impl MapperBinding for SamlHardcodedAttributeProtocolMapper {
	type State<'a> = SamlHardcodedAttributeProtocolMapperState<'a>;

	const DESCRIPTION: &'static str = "SAML protocol mapper that adds a constant attribute.";

	fn attributes() -> HashMap<String, Attribute> {
		map! {
			"attribute_value" => required(AttributeType::String, "Value of the attribute."),
			"friendly_name" => optional(AttributeType::String, "Friendly name of the attribute."),
			"saml_attribute_name" => required(AttributeType::String, "Name of the attribute."),
			"saml_attribute_name_format" => required(
				AttributeType::String,
				"One of Basic, URI Reference, or Unspecified.",
			),
		}
	}

	fn validate(diags: &mut Diagnostics, config: &Self::State<'_>) {
		check_one_of(
			diags,
			"saml_attribute_name_format",
			&config.saml_attribute_name_format,
			SAML_ATTRIBUTE_NAME_FORMATS,
		);
	}

	fn id_mut<'s, 'a>(state: &'s mut Self::State<'a>) -> &'s mut ValueString<'a> {
		&mut state.id
	}

	fn from_state(state: &Self::State<'_>) -> Self {
		Self {
			id: text(&state.id).into(),
			name: text(&state.name).into(),
			parent: parent_from(&state.realm_id, &state.client_id, &state.client_scope_id),
			attribute_value: text(&state.attribute_value).into(),
			friendly_name: text(&state.friendly_name).into(),
			saml_attribute_name: text(&state.saml_attribute_name).into(),
			saml_attribute_name_format: text(&state.saml_attribute_name_format).into(),
		}
	}

	fn into_state<'a>(self, prior: &Self::State<'a>) -> Self::State<'a> {
		let (realm_id, client_id, client_scope_id) = parent_values(self.parent);

		SamlHardcodedAttributeProtocolMapperState {
			id: self.id.into(),
			name: self.name.into(),
			realm_id,
			client_id,
			client_scope_id,
			attribute_value: self.attribute_value.into(),
			friendly_name: optional_text(self.friendly_name, &prior.friendly_name),
			saml_attribute_name: self.saml_attribute_name.into(),
			saml_attribute_name_format: self.saml_attribute_name_format.into(),
		}
	}
}

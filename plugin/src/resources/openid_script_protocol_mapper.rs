//! `keycloak_openid_script_protocol_mapper`.

// crates.io
use terraform_provider_keycloak::api::OpenIdScriptProtocolMapper;
// self
use crate::{
	_prelude::*,
	diag::check_one_of,
	resources::mapper::{MapperBinding, MapperResource, parent_from, parent_values},
	schema::{optional, optional_computed, required},
	value::default_to,
};

const CLAIM_VALUE_TYPES: &[&str] = &["JSON", "String", "long", "int", "boolean"];

/// OIDC mapper computing a claim with a script.
pub type OpenIdScriptProtocolMapperResource = MapperResource<OpenIdScriptProtocolMapper>;

/// State of `keycloak_openid_script_protocol_mapper`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenIdScriptProtocolMapperState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub client_id: ValueString<'a>,
	pub client_scope_id: ValueString<'a>,
	pub add_to_id_token: ValueBool,
	pub add_to_access_token: ValueBool,
	pub add_to_userinfo: ValueBool,
	pub multivalued: ValueBool,
	pub claim_name: ValueString<'a>,
	pub claim_value_type: ValueString<'a>,
	pub script: ValueString<'a>,
}

impl MapperBinding for OpenIdScriptProtocolMapper {
	type State<'a> = OpenIdScriptProtocolMapperState<'a>;

	const DESCRIPTION: &'static str = "OIDC protocol mapper that computes a claim with a script.";

	fn attributes() -> HashMap<String, Attribute> {
		map! {
			"add_to_id_token" => optional_computed(
				AttributeType::Bool,
				"Indicates if the claim should be added to the ID token.",
			),
			"add_to_access_token" => optional_computed(
				AttributeType::Bool,
				"Indicates if the claim should be added to the access token.",
			),
			"add_to_userinfo" => optional_computed(
				AttributeType::Bool,
				"Indicates if the claim should be added to the userinfo response.",
			),
			"multivalued" => optional_computed(
				AttributeType::Bool,
				"Indicates whether this attribute is a single value or an array of values.",
			),
			"claim_name" => required(AttributeType::String, "Name of the claim."),
			"claim_value_type" => optional(
				AttributeType::String,
				"Claim type used when serializing tokens.",
			),
			"script" => required(AttributeType::String, "Script to compute the claim value."),
		}
	}

	fn validate(diags: &mut Diagnostics, config: &Self::State<'_>) {
		check_one_of(diags, "claim_value_type", &config.claim_value_type, CLAIM_VALUE_TYPES);
	}

	fn with_defaults(mut state: Self::State<'_>) -> Self::State<'_> {
		default_to(&mut state.add_to_id_token, true);
		default_to(&mut state.add_to_access_token, true);
		default_to(&mut state.add_to_userinfo, true);
		default_to(&mut state.multivalued, false);

		state
	}

	fn id_mut<'s, 'a>(state: &'s mut Self::State<'a>) -> &'s mut ValueString<'a> {
		&mut state.id
	}

	fn from_state(state: &Self::State<'_>) -> Self {
		Self {
			id: text(&state.id).into(),
			name: text(&state.name).into(),
			parent: parent_from(&state.realm_id, &state.client_id, &state.client_scope_id),
			add_to_id_token: state.add_to_id_token.unwrap_or(true),
			add_to_access_token: state.add_to_access_token.unwrap_or(true),
			add_to_userinfo: state.add_to_userinfo.unwrap_or(true),
			multivalued: state.multivalued.unwrap_or(false),
			claim_name: text(&state.claim_name).into(),
			claim_value_type: text(&state.claim_value_type).into(),
			script: text(&state.script).into(),
		}
	}

	fn into_state<'a>(self, prior: &Self::State<'a>) -> Self::State<'a> {
		let (realm_id, client_id, client_scope_id) = parent_values(self.parent);

		OpenIdScriptProtocolMapperState {
			id: self.id.into(),
			name: self.name.into(),
			realm_id,
			client_id,
			client_scope_id,
			add_to_id_token: self.add_to_id_token.into(),
			add_to_access_token: self.add_to_access_token.into(),
			add_to_userinfo: self.add_to_userinfo.into(),
			multivalued: self.multivalued.into(),
			claim_name: self.claim_name.into(),
			claim_value_type: optional_text(self.claim_value_type, &prior.claim_value_type),
			script: self.script.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_flags_default_on_and_multivalued_off() {
		let state = OpenIdScriptProtocolMapper::with_defaults(OpenIdScriptProtocolMapperState {
			add_to_userinfo: false.into(),
			..Default::default()
		});

		assert_eq!(state.add_to_id_token, ValueBool::from(true));
		assert_eq!(state.add_to_access_token, ValueBool::from(true));
		assert_eq!(state.add_to_userinfo, ValueBool::from(false));
		assert_eq!(state.multivalued, ValueBool::from(false));
	}

	#[test]
	fn claim_value_type_is_validated() {
		let mut diags = Diagnostics::default();

		OpenIdScriptProtocolMapper::validate(&mut diags, &OpenIdScriptProtocolMapperState {
			claim_value_type: "float".into(),
			..Default::default()
		});

		assert_eq!(
			diags.errors[0].summary,
			"expected claim_value_type to be one of [JSON String long int boolean], got float"
		);
	}
}

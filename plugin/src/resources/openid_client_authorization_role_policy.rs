//! `keycloak_openid_client_authorization_role_policy`.

// crates.io
use terraform_provider_keycloak::api::{
	OpenidClientAuthorizationRole, OpenidClientAuthorizationRolePolicy,
};
// self
use crate::{
	_prelude::*,
	diag::{check_one_of, force_new},
	import::{POLICY_IMPORT_FORMAT, split_import_id},
	provider::ClientSlot,
	resources::{Remote, applied},
	schema::{block, computed, optional, optional_computed, required, schema},
};

const POLICY_TYPE: &str = "role";
const LOGIC_TYPES: &[&str] = &["POSITIVE", "NEGATIVE"];
const DECISION_STRATEGIES: &[&str] = &["UNANIMOUS", "AFFIRMATIVE", "CONSENSUS"];

/// State of `keycloak_openid_client_authorization_role_policy`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenidClientAuthorizationRolePolicyState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub resource_server_id: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub decision_strategy: ValueString<'a>,
	pub logic: ValueString<'a>,
	#[serde(rename = "type")]
	pub policy_type: ValueString<'a>,
	pub description: ValueString<'a>,
	pub role: ValueSet<Value<RoleState<'a>>>,
}
impl<'a> OpenidClientAuthorizationRolePolicyState<'a> {
	fn to_policy(&self) -> OpenidClientAuthorizationRolePolicy {
		let roles = self
			.role
			.iter()
			.flatten()
			.filter_map(|role| role.as_ref_option())
			.map(|role| OpenidClientAuthorizationRole {
				id: text(&role.id).into(),
				required: role.required.unwrap_or(false),
			})
			.collect();

		OpenidClientAuthorizationRolePolicy {
			id: text(&self.id).into(),
			realm_id: text(&self.realm_id).into(),
			resource_server_id: text(&self.resource_server_id).into(),
			name: text(&self.name).into(),
			decision_strategy: text(&self.decision_strategy).into(),
			logic: text(&self.logic).into(),
			policy_type: POLICY_TYPE.into(),
			roles,
			description: text(&self.description).into(),
		}
	}

	fn refreshed(policy: OpenidClientAuthorizationRolePolicy, prior: &Self) -> Self {
		let role = policy
			.roles
			.into_iter()
			.map(|role| {
				Value::Value(RoleState { id: role.id.into(), required: role.required.into() })
			})
			.collect::<BTreeSet<_>>();
		// The wire type is always `role`; keep what the configuration named.
		let policy_type = if prior.policy_type.is_value() {
			prior.policy_type.clone()
		} else {
			policy.policy_type.into()
		};

		Self {
			id: policy.id.into(),
			resource_server_id: policy.resource_server_id.into(),
			realm_id: policy.realm_id.into(),
			name: policy.name.into(),
			decision_strategy: policy.decision_strategy.into(),
			logic: policy.logic.into(),
			policy_type,
			description: optional_text(policy.description, &prior.description),
			role: role.into(),
		}
	}
}

/// One `role` block of a role policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub required: ValueBool,
}

/// Authorization policy granting access based on realm or client roles.
#[derive(Clone, Debug)]
pub struct OpenidClientAuthorizationRolePolicyResource {
	client: ClientSlot,
}
impl OpenidClientAuthorizationRolePolicyResource {
	/// Resource bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client }
	}
}
#[async_trait]
impl Resource for OpenidClientAuthorizationRolePolicyResource {
	type State<'a> = OpenidClientAuthorizationRolePolicyState<'a>;
	type PrivateState<'a> = ValueEmpty;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		let role = block(
			"Role evaluated by the policy.",
			map! {
				"id" => required(AttributeType::String, "Role id."),
				"required" => required(
					AttributeType::Bool,
					"The user must hold this role for the policy to grant access.",
				),
			},
			HashMap::new(),
		);

		Some(schema(
			"Authorization policy granting access based on roles.",
			map! {
				"id" => computed(AttributeType::String, "Policy id."),
				"resource_server_id" => required(
					AttributeType::String,
					"Client acting as resource server.",
				),
				"realm_id" => required(AttributeType::String, "Realm of the resource server."),
				"name" => required(AttributeType::String, "Name of the policy."),
				"decision_strategy" => optional_computed(
					AttributeType::String,
					"One of UNANIMOUS, AFFIRMATIVE, or CONSENSUS.",
				),
				"logic" => optional_computed(AttributeType::String, "POSITIVE or NEGATIVE."),
				"type" => required(AttributeType::String, "Policy type."),
				"description" => optional(AttributeType::String, "Description of the policy."),
			},
			map! { "role" => NestedBlock::Set(role) },
		))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
		check_one_of(diags, "decision_strategy", &config.decision_strategy, DECISION_STRATEGIES);
		check_one_of(diags, "logic", &config.logic, LOGIC_TYPES);

		if !config.role.is_unknown() && config.role.iter().flatten().next().is_none() {
			diags.error_short(
				"Insufficient role blocks: at least 1 \"role\" blocks are required.",
				AttributePath::new("role"),
			);
		}

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
			.get_openid_client_authorization_role_policy(
				text(&state.realm_id),
				text(&state.resource_server_id),
				text(&state.id),
			)
			.await;

		Remote::new(fetched, diags)
			.refresh(state, OpenidClientAuthorizationRolePolicyState::refreshed)
	}

	async fn plan_create<'a>(
		&self,
		_diags: &mut Diagnostics,
		mut proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		proposed_state.id = ValueString::Unknown;

		if proposed_state.decision_strategy.is_null() {
			proposed_state.decision_strategy = ValueString::Unknown;
		}
		if proposed_state.logic.is_null() {
			proposed_state.logic = ValueString::Unknown;
		}

		Some((proposed_state, ValueEmpty::default()))
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
		force_new(
			&mut replace,
			"resource_server_id",
			&prior_state.resource_server_id,
			&proposed_state.resource_server_id,
		);

		Some((proposed_state, prior_private_state, replace))
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
		let mut policy = planned_state.to_policy();

		client.new_openid_client_authorization_role_policy(&mut policy).await.or_report(diags)?;

		let fetched = client
			.get_openid_client_authorization_role_policy(
				&policy.realm_id,
				&policy.resource_server_id,
				&policy.id,
			)
			.await;
		let planned = OpenidClientAuthorizationRolePolicyState::refreshed(policy, &planned_state);

		applied(fetched, planned, diags, OpenidClientAuthorizationRolePolicyState::refreshed)
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
		let policy = planned_state.to_policy();

		self.client
			.get(diags)?
			.update_openid_client_authorization_role_policy(&policy)
			.await
			.or_report(diags)?;

		Some((planned_state, ValueEmpty::default()))
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
			.delete_openid_client_authorization_role_policy(
				text(&prior_state.realm_id),
				text(&prior_state.resource_server_id),
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
		let [realm_id, resource_server_id, policy_id] =
			split_import_id::<3>(&id, POLICY_IMPORT_FORMAT).or_report(diags)?;
		let client = self.client.get(diags)?;
		let fetched = client
			.get_openid_client_authorization_role_policy(&realm_id, &resource_server_id, &policy_id)
			.await;

		Remote::new(fetched, diags).import(
			diags,
			&id,
			OpenidClientAuthorizationRolePolicyState::refreshed,
		)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn role(id: &'static str, required: bool) -> Value<RoleState<'static>> {
		Value::Value(RoleState { id: id.into(), required: required.into() })
	}

	fn configured() -> OpenidClientAuthorizationRolePolicyState<'static> {
		OpenidClientAuthorizationRolePolicyState {
			realm_id: "test".into(),
			resource_server_id: "rs".into(),
			name: "admins".into(),
			policy_type: "aggregate".into(),
			role: BTreeSet::from([role("r1", true)]).into(),
			..Default::default()
		}
	}

	#[test]
	fn wire_type_is_always_role() {
		let policy = configured().to_policy();

		assert_eq!(policy.policy_type, "role");
		assert_eq!(
			policy.roles,
			vec![OpenidClientAuthorizationRole { id: "r1".into(), required: true }]
		);
	}

	#[test]
	fn refresh_keeps_the_configured_type() {
		let policy = OpenidClientAuthorizationRolePolicy {
			id: "p1".into(),
			policy_type: "role".into(),
			decision_strategy: "UNANIMOUS".into(),
			logic: "POSITIVE".into(),
			..configured().to_policy()
		};
		let state =
			OpenidClientAuthorizationRolePolicyState::refreshed(policy.clone(), &configured());

		assert_eq!(state.policy_type, ValueString::from("aggregate"));
		assert_eq!(state.logic, ValueString::from("POSITIVE"));
		assert_eq!(state.description, ValueString::Null);
		assert_eq!(
			OpenidClientAuthorizationRolePolicyState::refreshed(policy, &Default::default())
				.policy_type,
			ValueString::from("role")
		);
	}

	#[tokio::test]
	async fn roles_and_enumerations_are_validated() {
		let resource = OpenidClientAuthorizationRolePolicyResource::new(ClientSlot::default());
		let mut diags = Diagnostics::default();

		resource
			.validate(&mut diags, OpenidClientAuthorizationRolePolicyState {
				logic: "MAYBE".into(),
				role: ValueSet::from(BTreeSet::new()),
				..configured()
			})
			.await;

		let summaries = diags.errors.iter().map(|diag| &*diag.summary).collect::<Vec<_>>();

		assert_eq!(
			summaries,
			vec![
				"expected logic to be one of [POSITIVE NEGATIVE], got MAYBE",
				"Insufficient role blocks: at least 1 \"role\" blocks are required.",
			]
		);

		let mut diags = Diagnostics::default();

		resource.validate(&mut diags, configured()).await;

		assert!(diags.errors.is_empty());
	}
}

//! Role-based authorization policies of a client's resource server.

// self
use crate::{
	_prelude::*,
	client::{KeycloakClient, request},
};

/// Role reference inside a role policy.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpenidClientAuthorizationRole {
	/// Role identifier.
	pub id: String,
	/// The user must hold this role for the policy to grant.
	#[serde(default)]
	pub required: bool,
}

/// Role policy as exchanged with `/authz/resource-server/policy/role`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenidClientAuthorizationRolePolicy {
	/// Identifier; empty before creation.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	/// Owning realm; not part of the wire shape.
	#[serde(skip)]
	pub realm_id: String,
	/// Client acting as resource server; not part of the wire shape.
	#[serde(skip)]
	pub resource_server_id: String,
	/// Policy name.
	pub name: String,
	/// `UNANIMOUS`, `AFFIRMATIVE` or `CONSENSUS`.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub decision_strategy: String,
	/// `POSITIVE` or `NEGATIVE`.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub logic: String,
	/// Policy type; always `role` for this adapter.
	#[serde(rename = "type")]
	pub policy_type: String,
	/// Roles the policy evaluates.
	#[serde(default)]
	pub roles: Vec<OpenidClientAuthorizationRole>,
	/// Free-form description.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
}

impl KeycloakClient {
	/// Creates a role policy; the id is read from the response body.
	pub async fn new_openid_client_authorization_role_policy(
		&self,
		policy: &mut OpenidClientAuthorizationRolePolicy,
	) -> Result<()> {
		let path = format!("{}/role", policies_path(&policy.realm_id, &policy.resource_server_id));
		let response = self.post(&path, policy).await?;
		let created =
			request::decode::<OpenidClientAuthorizationRolePolicy>(&path, &response.body)?;

		policy.id = created.id;

		Ok(())
	}

	/// Fetches a role policy.
	pub async fn get_openid_client_authorization_role_policy(
		&self,
		realm_id: &str,
		resource_server_id: &str,
		id: &str,
	) -> Result<OpenidClientAuthorizationRolePolicy> {
		let path = format!("{}/role/{id}", policies_path(realm_id, resource_server_id));
		let mut policy = self.get::<OpenidClientAuthorizationRolePolicy>(&path).await?;

		policy.realm_id = realm_id.into();
		policy.resource_server_id = resource_server_id.into();

		Ok(policy)
	}

	/// Replaces a role policy.
	pub async fn update_openid_client_authorization_role_policy(
		&self,
		policy: &OpenidClientAuthorizationRolePolicy,
	) -> Result<()> {
		let path = format!(
			"{}/role/{}",
			policies_path(&policy.realm_id, &policy.resource_server_id),
			policy.id
		);

		self.put(&path, policy).await
	}

	/// Deletes a policy of any type.
	pub async fn delete_openid_client_authorization_role_policy(
		&self,
		realm_id: &str,
		resource_server_id: &str,
		id: &str,
	) -> Result<()> {
		self.delete(&format!("{}/{id}", policies_path(realm_id, resource_server_id))).await
	}
}

fn policies_path(realm_id: &str, resource_server_id: &str) -> String {
	format!("/realms/{realm_id}/clients/{resource_server_id}/authz/resource-server/policy")
}

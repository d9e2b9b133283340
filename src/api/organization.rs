//! Organizations and their identity provider links (Keycloak 26+).

// self
use crate::{_prelude::*, client::KeycloakClient};

/// Internet domain owned by an organization.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationDomain {
	/// Domain name.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Ownership has been verified.
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub verified: bool,
}

/// Organization as exchanged with `/realms/{realm}/organizations`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
	/// Identifier; empty before creation.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	/// Owning realm; not part of the wire shape.
	#[serde(skip)]
	pub realm_id: String,
	/// Display name.
	pub name: String,
	/// URL-friendly alias; derived from the name when empty.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub alias: String,
	/// Members can sign in through the organization.
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	/// Landing page after registration or invitation.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub redirect_url: String,
	/// Free-form description.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub description: String,
	/// Owned domains.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub domains: Vec<OrganizationDomain>,
	/// Custom attributes.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub attributes: BTreeMap<String, Vec<String>>,
}
impl Default for Organization {
	fn default() -> Self {
		Self {
			id: String::new(),
			realm_id: String::new(),
			name: String::new(),
			alias: String::new(),
			enabled: true,
			redirect_url: String::new(),
			description: String::new(),
			domains: Vec::new(),
			attributes: BTreeMap::new(),
		}
	}
}

/// Optional filters for [`KeycloakClient::get_organizations`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrganizationQuery {
	/// Substring (or exact, see `exact`) match on name or domain.
	pub search: Option<String>,
	/// Require an exact match for `search`.
	pub exact: Option<bool>,
	/// Offset of the first result.
	pub first: Option<u32>,
	/// Page size.
	pub max: Option<u32>,
}
impl OrganizationQuery {
	fn to_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = Vec::new();

		if let Some(search) = &self.search {
			pairs.push(("search", search.clone()));
		}
		if let Some(exact) = self.exact {
			pairs.push(("exact", exact.to_string()));
		}
		if let Some(first) = self.first {
			pairs.push(("first", first.to_string()));
		}
		if let Some(max) = self.max {
			pairs.push(("max", max.to_string()));
		}

		pairs
	}
}

impl KeycloakClient {
	/// Creates an organization and records its id.
	pub async fn create_organization(&self, organization: &mut Organization) -> Result<()> {
		let path = organizations_path(&organization.realm_id);

		organization.id = self.post_for_id(&path, organization).await?;

		Ok(())
	}

	/// Lists organizations, optionally filtered.
	pub async fn get_organizations(
		&self,
		realm_id: &str,
		query: &OrganizationQuery,
	) -> Result<Vec<Organization>> {
		let pairs = query.to_pairs();
		let borrowed = pairs.iter().map(|(key, value)| (*key, value.as_str())).collect::<Vec<_>>();
		let mut organizations = self
			.get_with_query::<Vec<Organization>>(&organizations_path(realm_id), &borrowed)
			.await?;

		for organization in &mut organizations {
			organization.realm_id = realm_id.into();
		}

		Ok(organizations)
	}

	/// Lists one page of organizations.
	pub async fn get_organizations_paginated(
		&self,
		realm_id: &str,
		first: u32,
		max: u32,
		search: Option<&str>,
	) -> Result<Vec<Organization>> {
		let query = OrganizationQuery {
			search: search.filter(|search| !search.is_empty()).map(Into::into),
			first: Some(first),
			max: Some(max),
			..Default::default()
		};

		self.get_organizations(realm_id, &query).await
	}

	/// Finds an organization by exact name.
	pub async fn get_organization_by_name(
		&self,
		realm_id: &str,
		name: &str,
	) -> Result<Option<Organization>> {
		let query = OrganizationQuery {
			search: Some(name.into()),
			exact: Some(true),
			..Default::default()
		};

		Ok(self
			.get_organizations(realm_id, &query)
			.await?
			.into_iter()
			.find(|organization| organization.name == name))
	}

	/// Fetches an organization by id.
	pub async fn get_organization(&self, realm_id: &str, id: &str) -> Result<Organization> {
		let mut organization =
			self.get::<Organization>(&organization_path(realm_id, id)).await?;

		organization.realm_id = realm_id.into();

		Ok(organization)
	}

	/// Replaces an organization.
	pub async fn update_organization(&self, organization: &Organization) -> Result<()> {
		self.put(&organization_path(&organization.realm_id, &organization.id), organization).await
	}

	/// Deletes an organization.
	pub async fn delete_organization(&self, realm_id: &str, id: &str) -> Result<()> {
		self.delete(&organization_path(realm_id, id)).await
	}

	/// Links an existing identity provider to an organization.
	pub async fn link_identity_provider_to_organization(
		&self,
		realm_id: &str,
		organization_id: &str,
		alias: &str,
	) -> Result<()> {
		let path = format!("{}/identity-providers", organization_path(realm_id, organization_id));

		self.post(&path, alias).await.map(|_| ())
	}

	/// Succeeds when the identity provider is linked to the organization.
	pub async fn check_identity_provider_link_to_organization(
		&self,
		realm_id: &str,
		organization_id: &str,
		alias: &str,
	) -> Result<()> {
		self.check(&organization_identity_provider_path(realm_id, organization_id, alias)).await
	}

	/// Removes the link between an identity provider and an organization.
	pub async fn unlink_identity_provider_from_organization(
		&self,
		realm_id: &str,
		organization_id: &str,
		alias: &str,
	) -> Result<()> {
		self.delete(&organization_identity_provider_path(realm_id, organization_id, alias)).await
	}
}

/// Collection path of a realm's organizations.
pub fn organizations_path(realm_id: &str) -> String {
	format!("/realms/{realm_id}/organizations")
}

fn organization_path(realm_id: &str, id: &str) -> String {
	format!("{}/{id}", organizations_path(realm_id))
}

fn organization_identity_provider_path(
	realm_id: &str,
	organization_id: &str,
	alias: &str,
) -> String {
	format!("{}/identity-providers/{alias}", organization_path(realm_id, organization_id))
}

fn enabled_by_default() -> bool {
	true
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn wire_shape_omits_empty_fields_and_realm() {
		let organization = Organization {
			realm_id: "test".into(),
			name: "Acme".into(),
			domains: vec![OrganizationDomain { name: "acme.test".into(), verified: false }],
			..Default::default()
		};
		let value = serde_json::to_value(&organization).expect("Organization should serialize.");

		assert_eq!(
			value,
			json!({ "name": "Acme", "enabled": true, "domains": [{ "name": "acme.test" }] })
		);
	}

	#[test]
	fn decodes_server_representation() {
		let organization: Organization = serde_json::from_value(json!({
			"id": "o1",
			"name": "Acme",
			"alias": "acme",
			"redirectUrl": "https://acme.test",
			"domains": [{ "name": "acme.test", "verified": true }],
			"attributes": { "tier": ["gold"] },
			"members": []
		}))
		.expect("Server payload should decode.");

		assert!(organization.enabled);
		assert!(organization.realm_id.is_empty());
		assert_eq!(organization.redirect_url, "https://acme.test");
		assert!(organization.domains[0].verified);
		assert_eq!(organization.attributes["tier"], vec!["gold".to_owned()]);
	}

	#[test]
	fn query_pairs_skip_unset_filters() {
		let query =
			OrganizationQuery { search: Some("acme".into()), max: Some(10), ..Default::default() };

		assert_eq!(query.to_pairs(), vec![("search", "acme".to_owned()), ("max", "10".to_owned())]);
	}
}

//! Group listing and hierarchy flattening.

// self
use crate::{_prelude::*, client::KeycloakClient};

const GROUP_PAGE_SIZE: usize = 100;

/// Group as returned by `/realms/{realm}/groups`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
	/// Identifier.
	pub id: String,
	/// Owning realm; not part of the wire shape.
	#[serde(skip)]
	pub realm_id: String,
	/// Parent group, empty for top-level groups.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub parent_id: String,
	/// Group name.
	pub name: String,
	/// Slash separated path from the root.
	#[serde(default)]
	pub path: String,
	/// Number of direct children.
	#[serde(default)]
	pub sub_group_count: i64,
	/// Children inlined by older servers.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub sub_groups: Vec<Group>,
	/// Custom attributes.
	#[serde(default)]
	pub attributes: BTreeMap<String, Vec<String>>,
}

impl KeycloakClient {
	/// Lists the top-level groups of a realm.
	pub async fn get_groups(&self, realm_id: &str) -> Result<Vec<Group>> {
		let mut groups = self
			.get_all_pages::<Group>(
				&format!("/realms/{realm_id}/groups"),
				&[("briefRepresentation", "false")],
				GROUP_PAGE_SIZE,
			)
			.await?;

		for group in &mut groups {
			group.realm_id = realm_id.into();
		}

		Ok(groups)
	}

	/// Lists the direct children of a group.
	pub async fn get_group_children(&self, realm_id: &str, id: &str) -> Result<Vec<Group>> {
		let mut children = self
			.get_all_pages::<Group>(
				&format!("/realms/{realm_id}/groups/{id}/children"),
				&[("briefRepresentation", "false")],
				GROUP_PAGE_SIZE,
			)
			.await?;

		for child in &mut children {
			child.realm_id = realm_id.into();
			child.parent_id = id.into();
		}

		Ok(children)
	}

	/// Returns the realm's groups in depth-first order.
	///
	/// Without `full_hierarchy` only top-level groups are returned. Otherwise each
	/// group is followed by its descendants, taken from inline `subGroups` when the
	/// server sends them and fetched from the children endpoint when it does not.
	pub async fn get_flattened_groups_hierarchy(
		&self,
		realm_id: &str,
		full_hierarchy: bool,
	) -> Result<Vec<Group>> {
		let mut pending = self.get_groups(realm_id).await?;

		pending.reverse();

		let mut flattened = Vec::new();

		while let Some(mut group) = pending.pop() {
			let mut children = std::mem::take(&mut group.sub_groups);

			group.realm_id = realm_id.into();

			if full_hierarchy {
				if children.is_empty() && group.sub_group_count > 0 {
					children = self.get_group_children(realm_id, &group.id).await?;
				}

				for child in &mut children {
					child.parent_id = group.id.clone();
				}

				pending.extend(children.into_iter().rev());
			}

			flattened.push(group);
		}

		Ok(flattened)
	}
}

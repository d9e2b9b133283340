//! `keycloak_groups`.

// crates.io
use terraform_provider_keycloak::api::Group;
// self
use crate::{
	_prelude::*,
	provider::ClientSlot,
	schema::{computed, optional, required, schema, string_map},
};

/// Separator used to join multi-valued group attributes.
pub const MULTIVALUE_ATTRIBUTE_SEPARATOR: &str = "##";

/// State of `keycloak_groups`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub full_hierarchy: ValueBool,
	pub groups: ValueList<GroupState<'a>>,
}

/// One element of `groups`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub path: ValueString<'a>,
	pub subgroup_count: ValueNumber,
	pub parent_id: ValueString<'a>,
	pub attributes: ValueMap<'a, ValueString<'a>>,
}
impl From<Group> for GroupState<'_> {
	fn from(group: Group) -> Self {
		let attributes = group
			.attributes
			.into_iter()
			.map(|(key, values)| {
				(Cow::Owned(key), ValueString::from(values.join(MULTIVALUE_ATTRIBUTE_SEPARATOR)))
			})
			.collect::<BTreeMap<_, _>>();

		Self {
			id: group.id.into(),
			name: group.name.into(),
			realm_id: group.realm_id.into(),
			path: group.path.into(),
			subgroup_count: group.sub_group_count.into(),
			parent_id: Some(group.parent_id)
				.filter(|parent_id| !parent_id.is_empty())
				.map(Cow::Owned)
				.into(),
			attributes: attributes.into(),
		}
	}
}

/// Every group of a realm, optionally including nested groups.
#[derive(Clone, Debug)]
pub struct GroupsDataSource {
	client: ClientSlot,
}
impl GroupsDataSource {
	/// Data source bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client }
	}
}
#[async_trait]
impl DataSource for GroupsDataSource {
	type State<'a> = GroupsState<'a>;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		let group = HashMap::from([
			("id".to_owned(), AttributeType::String),
			("name".to_owned(), AttributeType::String),
			("realm_id".to_owned(), AttributeType::String),
			("path".to_owned(), AttributeType::String),
			("subgroup_count".to_owned(), AttributeType::Number),
			("parent_id".to_owned(), AttributeType::String),
			("attributes".to_owned(), string_map()),
		]);

		Some(schema(
			"Groups of a realm.",
			map! {
				"id" => computed(AttributeType::String, "Realm id."),
				"realm_id" => required(AttributeType::String, "Realm to list groups from."),
				"full_hierarchy" => optional(
					AttributeType::Bool,
					"Include nested groups after their parents.",
				),
				"groups" => computed(
					AttributeType::List(Box::new(AttributeType::Object(group))),
					"Groups in depth-first order; multi-valued attributes are joined with `##`.",
				),
			},
			HashMap::new(),
		))
	}

	async fn read<'a>(
		&self,
		diags: &mut Diagnostics,
		config: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<Self::State<'a>> {
		let client = self.client.get(diags)?;
		let realm_id = text(&config.realm_id);
		let groups = client
			.get_flattened_groups_hierarchy(realm_id, config.full_hierarchy.unwrap_or(false))
			.await
			.or_report(diags)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(realm_id, groups = groups.len(), "Read realm groups.");

		Some(GroupsState {
			id: realm_id.to_owned().into(),
			groups: groups.into_iter().map(GroupState::from).collect::<Vec<_>>().into(),
			..config
		})
	}
}

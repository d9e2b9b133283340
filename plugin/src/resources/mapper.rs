//! Lifecycle shared by the protocol mapper resources.
//!
//! Each typed mapper from the admin API implements [`MapperBinding`] to describe its Terraform
//! state; [`MapperResource`] drives the CRUD calls for all of them.

// std
use std::marker::PhantomData;
// crates.io
use terraform_provider_keycloak::api::{MapperParent, TypedProtocolMapper};
// self
use crate::{
	_prelude::*,
	diag::force_new,
	import::MapperImport,
	provider::ClientSlot,
	resources::{Remote, applied},
	schema::{computed, optional, required, schema},
	value::non_empty,
};

/// SAML attribute name formats accepted by Keycloak.
pub const SAML_ATTRIBUTE_NAME_FORMATS: &[&str] = &["Basic", "URI Reference", "Unspecified"];

/// Typed mapper exposed as a Terraform resource.
pub trait MapperBinding
where
	Self: TypedProtocolMapper + Send + Sync + 'static,
{
	/// Terraform state; carries `id`, `name`, `realm_id`, `client_id`, and `client_scope_id`.
	type State<'a>: Clone + Default + Send + Sync + Serialize + Deserialize<'a>;

	/// Resource description.
	const DESCRIPTION: &'static str;

	/// Mapper-specific attributes.
	fn attributes() -> HashMap<String, Attribute>;

	/// Mapper-specific configuration checks.
	fn validate(_diags: &mut Diagnostics, _config: &Self::State<'_>) {}

	/// Fills defaults of optional attributes.
	fn with_defaults(state: Self::State<'_>) -> Self::State<'_> {
		state
	}

	/// Computed id of `state`.
	fn id_mut<'s, 'a>(state: &'s mut Self::State<'a>) -> &'s mut ValueString<'a>;

	/// Builds the mapper from Terraform values.
	fn from_state(state: &Self::State<'_>) -> Self;

	/// Terraform values of the mapper; `prior` decides how empty strings read back.
	fn into_state<'a>(self, prior: &Self::State<'a>) -> Self::State<'a>;
}

/// Attributes every protocol mapper resource declares.
pub fn base_attributes() -> HashMap<String, Attribute> {
	map! {
		"id" => computed(AttributeType::String, "Protocol mapper id."),
		"name" => required(AttributeType::String, "Display name of this mapper."),
		"realm_id" => required(AttributeType::String, "Realm this mapper exists within."),
		"client_id" => optional(
			AttributeType::String,
			"Client this mapper is attached to. Conflicts with client_scope_id.",
		),
		"client_scope_id" => optional(
			AttributeType::String,
			"Client scope this mapper is attached to. Conflicts with client_id.",
		),
	}
}

/// Parent addressed by the Terraform values.
pub fn parent_from(
	realm_id: &ValueString,
	client_id: &ValueString,
	client_scope_id: &ValueString,
) -> MapperParent {
	MapperParent {
		realm_id: text(realm_id).into(),
		client_id: non_empty(client_id).map(Into::into),
		client_scope_id: non_empty(client_scope_id).map(Into::into),
	}
}

/// Terraform values of `parent`: realm, client, and client scope.
pub fn parent_values<'a>(
	parent: MapperParent,
) -> (ValueString<'a>, ValueString<'a>, ValueString<'a>) {
	(
		parent.realm_id.into(),
		parent.client_id.map(Cow::Owned).into(),
		parent.client_scope_id.map(Cow::Owned).into(),
	)
}

/// Protocol mapper resource over any [`MapperBinding`].
pub struct MapperResource<M> {
	client: ClientSlot,
	mapper: PhantomData<fn() -> M>,
}
impl<M> MapperResource<M> {
	/// Resource bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client, mapper: PhantomData }
	}
}
impl<M> Clone for MapperResource<M> {
	fn clone(&self) -> Self {
		Self::new(self.client.clone())
	}
}
impl<M> Debug for MapperResource<M>
where
	M: MapperBinding,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MapperResource")
			.field("protocol_mapper", &M::PROTOCOL_MAPPER)
			.field("client", &self.client)
			.finish()
	}
}
#[async_trait]
impl<M> Resource for MapperResource<M>
where
	M: MapperBinding,
{
	type State<'a> = M::State<'a>;
	type PrivateState<'a> = ValueEmpty;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		let mut attributes = base_attributes();

		attributes.extend(M::attributes());

		Some(schema(M::DESCRIPTION, attributes, HashMap::new()))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
		let mapper = M::from_state(&config);
		let parent = mapper.parent();

		if parent.client_id.is_some() && parent.client_scope_id.is_some() {
			diags.error_short(
				"\"client_id\": conflicts with client_scope_id",
				AttributePath::new("client_id"),
			);
		}

		M::validate(diags, &config);

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
		let mapper = M::from_state(&state);
		let fetched = client.get_protocol_mapper::<M>(mapper.parent(), mapper.id()).await;

		Remote::new(fetched, diags).refresh(state, M::into_state)
	}

	async fn plan_create<'a>(
		&self,
		_diags: &mut Diagnostics,
		proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let mut state = M::with_defaults(proposed_state);

		*M::id_mut(&mut state) = ValueString::Unknown;

		Some((state, ValueEmpty::default()))
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
		let prior = M::from_state(&prior_state);
		let proposed = M::from_state(&proposed_state);
		let (prior, proposed) = (prior.parent(), proposed.parent());
		let mut replace = Vec::new();

		force_new(&mut replace, "realm_id", &prior.realm_id, &proposed.realm_id);
		force_new(&mut replace, "client_id", &prior.client_id, &proposed.client_id);
		force_new(
			&mut replace,
			"client_scope_id",
			&prior.client_scope_id,
			&proposed.client_scope_id,
		);

		Some((M::with_defaults(proposed_state), prior_private_state, replace))
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
		let mut mapper = M::from_state(&planned_state);

		client.validate_protocol_mapper(&mapper).await.or_report(diags)?;
		client.new_protocol_mapper(&mut mapper).await.or_report(diags)?;

		let fetched = client.get_protocol_mapper::<M>(mapper.parent(), mapper.id()).await;
		let planned = mapper.into_state(&planned_state);

		applied(fetched, planned, diags, M::into_state)
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
		let client = self.client.get(diags)?;
		let mapper = M::from_state(&planned_state);

		client.validate_protocol_mapper(&mapper).await.or_report(diags)?;
		client.update_protocol_mapper(&mapper).await.or_report(diags)?;

		let fetched = client.get_protocol_mapper::<M>(mapper.parent(), mapper.id()).await;

		applied(fetched, planned_state, diags, M::into_state)
	}

	async fn destroy<'a>(
		&self,
		diags: &mut Diagnostics,
		prior_state: Self::State<'a>,
		_planned_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<()> {
		let client = self.client.get(diags)?;
		let mapper = M::from_state(&prior_state);

		client.delete_protocol_mapper(mapper.parent(), mapper.id()).await.or_report(diags)
	}

	async fn import<'a>(
		&self,
		diags: &mut Diagnostics,
		id: String,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let MapperImport { realm_id, client_id, client_scope_id, id: mapper_id } =
			MapperImport::parse(&id).or_report(diags)?;
		let client = self.client.get(diags)?;
		let parent = MapperParent { realm_id, client_id, client_scope_id };
		let fetched = client.get_protocol_mapper::<M>(&parent, &mapper_id).await;

		Remote::new(fetched, diags).import(diags, &id, M::into_state)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parent_round_trips_through_terraform_values() {
		let parent = parent_from(&"test".into(), &ValueString::Null, &"s1".into());

		assert_eq!(parent, MapperParent::client_scope("test", "s1"));

		let (realm_id, client_id, client_scope_id) = parent_values(parent);

		assert_eq!(realm_id, ValueString::from("test"));
		assert_eq!(client_id, ValueString::Null);
		assert_eq!(client_scope_id, ValueString::from("s1"));
		assert_eq!(parent_from(&"test".into(), &"".into(), &ValueString::Unknown).client_id, None);
	}
}

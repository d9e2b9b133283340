//! `keycloak_organization`.

// crates.io
use terraform_provider_keycloak::{
	api::{Organization, OrganizationDomain},
	client::Version,
};
// self
use crate::{
	_prelude::*,
	diag::{check_not_empty, force_new},
	import::{ORGANIZATION_IMPORT_FORMAT, split_import_id},
	provider::ClientSlot,
	resources::{Remote, applied},
	schema::{block, computed, optional, optional_computed, required, schema, string_map},
	value::{default_to, optional_map, text_map, unknown_if_null},
};

/// State of `keycloak_organization`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub name: ValueString<'a>,
	pub alias: ValueString<'a>,
	pub enabled: ValueBool,
	pub redirect_url: ValueString<'a>,
	pub description: ValueString<'a>,
	pub domain: ValueSet<Value<DomainState<'a>>>,
	pub attributes: ValueMap<'a, ValueString<'a>>,
}
impl<'a> OrganizationState<'a> {
	fn with_defaults(mut self) -> Self {
		default_to(&mut self.enabled, true);

		if let Value::Value(domains) = &mut self.domain {
			*domains = std::mem::take(domains)
				.into_iter()
				.map(|domain| {
					domain.map(|mut domain| {
						default_to(&mut domain.verified, false);

						domain
					})
				})
				.collect();
		}

		self
	}

	fn domains(&self) -> Vec<OrganizationDomain> {
		self.domain
			.iter()
			.flatten()
			.filter_map(|domain| domain.as_ref_option())
			.map(|domain| OrganizationDomain {
				name: text(&domain.name).into(),
				verified: domain.verified.unwrap_or(false),
			})
			.collect()
	}

	fn to_organization(&self) -> Result<Organization> {
		let domains = self.domains();

		if let Some(name) = duplicate_domain(&domains) {
			return Err(Error::validation(format!(
				"duplicate domain name found: {name}. Domain names must be unique"
			)));
		}

		Ok(Organization {
			id: text(&self.id).into(),
			realm_id: text(&self.realm_id).into(),
			name: text(&self.name).into(),
			alias: text(&self.alias).into(),
			enabled: self.enabled.unwrap_or(true),
			redirect_url: text(&self.redirect_url).into(),
			description: text(&self.description).into(),
			domains,
			attributes: text_map(&self.attributes)
				.into_iter()
				.map(|(key, value)| (key, vec![value]))
				.collect(),
		})
	}

	fn refreshed(organization: Organization, prior: &Self) -> Self {
		let mut domains = organization.domains;

		domains.sort();

		let domain = if domains.is_empty() && prior.domain.is_null() {
			ValueSet::Null
		} else {
			domains
				.into_iter()
				.map(|domain| {
					Value::Value(DomainState {
						name: domain.name.into(),
						verified: domain.verified.into(),
					})
				})
				.collect::<BTreeSet<_>>()
				.into()
		};
		let attributes = organization
			.attributes
			.into_iter()
			.filter_map(|(key, values)| values.into_iter().next().map(|value| (key, value)))
			.collect();

		Self {
			id: organization.id.into(),
			realm_id: organization.realm_id.into(),
			name: organization.name.into(),
			alias: organization.alias.into(),
			enabled: organization.enabled.into(),
			redirect_url: optional_text(organization.redirect_url, &prior.redirect_url),
			description: optional_text(organization.description, &prior.description),
			domain,
			attributes: optional_map(attributes, &prior.attributes),
		}
	}
}

/// One `domain` block of an organization.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomainState<'a> {
	#[serde(borrow = "'a")]
	pub name: ValueString<'a>,
	pub verified: ValueBool,
}

/// Organization with its domains and attributes.
#[derive(Clone, Debug)]
pub struct OrganizationResource {
	client: ClientSlot,
}
impl OrganizationResource {
	/// Resource bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client }
	}
}
#[async_trait]
impl Resource for OrganizationResource {
	type State<'a> = OrganizationState<'a>;
	type PrivateState<'a> = ValueEmpty;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		let domain = block(
			"Domain owned by the organization.",
			map! {
				"name" => optional(AttributeType::String, "Domain name."),
				"verified" => optional_computed(
					AttributeType::Bool,
					"Ownership of the domain has been verified.",
				),
			},
			HashMap::new(),
		);

		Some(schema(
			"Keycloak organization.",
			map! {
				"id" => computed(AttributeType::String, "Organization id."),
				"realm_id" => required(
					AttributeType::String,
					"Realm this organization exists in.",
				),
				"name" => required(AttributeType::String, "Name of the organization."),
				"alias" => optional_computed(
					AttributeType::String,
					"Alias of the organization; derived from the name when unset.",
				),
				"enabled" => optional_computed(
					AttributeType::Bool,
					"Members can sign in through this organization.",
				),
				"redirect_url" => optional(
					AttributeType::String,
					"Landing page after registration or invitation.",
				),
				"description" => optional(AttributeType::String, "Description of the organization."),
				"attributes" => optional(string_map(), "Custom attributes of the organization."),
			},
			map! { "domain" => NestedBlock::Set(domain) },
		))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
		check_not_empty(diags, "realm_id", &config.realm_id);
		check_not_empty(diags, "name", &config.name);
		check_not_empty(diags, "alias", &config.alias);

		if let Err(e) = config.to_organization() {
			diags.report_at(e, AttributePath::new("domain"));
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
		let fetched = client.get_organization(text(&state.realm_id), text(&state.id)).await;

		Remote::new(fetched, diags).refresh(state, OrganizationState::refreshed)
	}

	async fn plan_create<'a>(
		&self,
		_diags: &mut Diagnostics,
		proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let mut state = proposed_state.with_defaults();

		state.id = ValueString::Unknown;
		unknown_if_null(&mut state.alias);

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
		let mut replace = Vec::new();

		force_new(&mut replace, "realm_id", &prior_state.realm_id, &proposed_state.realm_id);

		Some((proposed_state.with_defaults(), prior_private_state, replace))
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

		client.require_version("Organizations", Version::V26).await.or_report(diags)?;

		let mut organization = planned_state.to_organization().or_report(diags)?;

		client.create_organization(&mut organization).await.or_report(diags)?;

		let fetched = client.get_organization(&organization.realm_id, &organization.id).await;
		let planned = OrganizationState::refreshed(organization, &planned_state);

		applied(fetched, planned, diags, OrganizationState::refreshed)
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
		let organization = planned_state.to_organization().or_report(diags)?;

		client.update_organization(&organization).await.or_report(diags)?;

		let fetched = client.get_organization(&organization.realm_id, &organization.id).await;

		applied(fetched, planned_state, diags, OrganizationState::refreshed)
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
			.delete_organization(text(&prior_state.realm_id), text(&prior_state.id))
			.await
			.or_report(diags)
	}

	async fn import<'a>(
		&self,
		diags: &mut Diagnostics,
		id: String,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let [realm_id, organization_id] =
			split_import_id::<2>(&id, ORGANIZATION_IMPORT_FORMAT).or_report(diags)?;
		let client = self.client.get(diags)?;
		let fetched = client.get_organization(&realm_id, &organization_id).await;

		Remote::new(fetched, diags).import(diags, &id, OrganizationState::refreshed)
	}
}

/// First domain name configured twice; unnamed domains are ignored.
fn duplicate_domain(domains: &[OrganizationDomain]) -> Option<&str> {
	let mut seen = BTreeSet::new();

	domains
		.iter()
		.map(|domain| domain.name.as_str())
		.filter(|name| !name.is_empty())
		.find(|name| !seen.insert(*name))
}

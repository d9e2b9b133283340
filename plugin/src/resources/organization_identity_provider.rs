//! `keycloak_organization_identity_provider`.
//!
//! The organization domain and the email-match redirect flag live in the identity provider's
//! config, so create and update rewrite the provider before touching the link itself.

// crates.io
use terraform_provider_keycloak::api::IdentityProvider;
// self
use crate::{
	_prelude::*,
	diag::{check_not_empty, force_new},
	import::{ORGANIZATION_IDENTITY_PROVIDER_IMPORT_FORMAT, split_import_id},
	provider::ClientSlot,
	resources::{Remote, applied},
	schema::{computed, optional_computed, required, schema},
	value::default_to,
};

/// State of `keycloak_organization_identity_provider`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationIdentityProviderState<'a> {
	#[serde(borrow = "'a")]
	pub id: ValueString<'a>,
	pub realm_id: ValueString<'a>,
	pub organization_id: ValueString<'a>,
	pub identity_provider_alias: ValueString<'a>,
	pub domain: ValueString<'a>,
	pub redirect_email_domain_matches: ValueBool,
}
impl<'a> OrganizationIdentityProviderState<'a> {
	fn with_defaults(mut self) -> Self {
		default_to(&mut self.domain, Cow::Borrowed(""));
		default_to(&mut self.redirect_email_domain_matches, false);

		self
	}

	fn link(&self) -> Link {
		Link {
			realm_id: text(&self.realm_id).into(),
			organization_id: text(&self.organization_id).into(),
			alias: text(&self.identity_provider_alias).into(),
		}
	}

	fn refreshed(linked: Linked, _: &Self) -> Self {
		let Linked { link, identity_provider } = linked;

		Self {
			id: link.id().into(),
			domain: identity_provider.org_domain().to_owned().into(),
			redirect_email_domain_matches: identity_provider.org_redirect_email_matches().into(),
			realm_id: link.realm_id.into(),
			organization_id: link.organization_id.into(),
			identity_provider_alias: link.alias.into(),
		}
	}
}

/// Address of an organization to identity provider link.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Link {
	realm_id: String,
	organization_id: String,
	alias: String,
}
impl Link {
	fn id(&self) -> String {
		format!("{}/{}/{}", self.realm_id, self.organization_id, self.alias)
	}

	/// Identity provider behind the link; a missing link answers 404.
	async fn fetch(self, client: &KeycloakClient) -> Result<Linked> {
		client
			.check_identity_provider_link_to_organization(
				&self.realm_id,
				&self.organization_id,
				&self.alias,
			)
			.await?;

		let identity_provider = client.get_identity_provider(&self.realm_id, &self.alias).await?;

		Ok(Linked { link: self, identity_provider })
	}

	async fn write_org_settings(
		&self,
		client: &KeycloakClient,
		state: &OrganizationIdentityProviderState<'_>,
	) -> Result<()> {
		let mut identity_provider =
			client.get_identity_provider(&self.realm_id, &self.alias).await?;

		identity_provider.set_org_domain(text(&state.domain));
		identity_provider
			.set_org_redirect_email_matches(state.redirect_email_domain_matches.unwrap_or(false));

		client.update_identity_provider(&self.realm_id, &identity_provider).await
	}
}

#[derive(Debug)]
struct Linked {
	link: Link,
	identity_provider: IdentityProvider,
}

/// Link between an organization and an existing identity provider.
#[derive(Clone, Debug)]
pub struct OrganizationIdentityProviderResource {
	client: ClientSlot,
}
impl OrganizationIdentityProviderResource {
	/// Resource bound to the provider's client slot.
	pub fn new(client: ClientSlot) -> Self {
		Self { client }
	}
}
#[async_trait]
impl Resource for OrganizationIdentityProviderResource {
	type State<'a> = OrganizationIdentityProviderState<'a>;
	type PrivateState<'a> = ValueEmpty;
	type ProviderMetaState<'a> = ValueEmpty;

	fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
		Some(schema(
			"Links an identity provider to an organization.",
			map! {
				"id" => computed(AttributeType::String, "Link id: realm, organization, and alias."),
				"realm_id" => required(AttributeType::String, "Realm of the organization."),
				"organization_id" => required(AttributeType::String, "Organization to link to."),
				"identity_provider_alias" => required(
					AttributeType::String,
					"Alias of the identity provider to link.",
				),
				"domain" => optional_computed(
					AttributeType::String,
					"Organization domain served by the identity provider.",
				),
				"redirect_email_domain_matches" => optional_computed(
					AttributeType::Bool,
					"Redirect users whose email matches the domain to this identity provider.",
				),
			},
			HashMap::new(),
		))
	}

	async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
		check_not_empty(diags, "realm_id", &config.realm_id);
		check_not_empty(diags, "organization_id", &config.organization_id);
		check_not_empty(diags, "identity_provider_alias", &config.identity_provider_alias);

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
		let fetched = state.link().fetch(&client).await;

		Remote::new(fetched, diags).refresh(state, OrganizationIdentityProviderState::refreshed)
	}

	async fn plan_create<'a>(
		&self,
		_diags: &mut Diagnostics,
		proposed_state: Self::State<'a>,
		_config_state: Self::State<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let mut state = proposed_state.with_defaults();

		state.id = state.link().id().into();

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
		let (prior, proposed) = (prior_state.link(), proposed_state.link());
		let mut replace = Vec::new();

		force_new(&mut replace, "realm_id", &prior.realm_id, &proposed.realm_id);
		force_new(&mut replace, "organization_id", &prior.organization_id, &proposed.organization_id);
		force_new(&mut replace, "identity_provider_alias", &prior.alias, &proposed.alias);

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
		let link = planned_state.link();

		link.write_org_settings(&client, &planned_state).await.or_report(diags)?;
		client
			.link_identity_provider_to_organization(
				&link.realm_id,
				&link.organization_id,
				&link.alias,
			)
			.await
			.or_report(diags)?;

		let fetched = link.fetch(&client).await;

		applied(fetched, planned_state, diags, OrganizationIdentityProviderState::refreshed)
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
		let link = planned_state.link();

		link.write_org_settings(&client, &planned_state).await.or_report(diags)?;

		let fetched = link.fetch(&client).await;

		applied(fetched, planned_state, diags, OrganizationIdentityProviderState::refreshed)
	}

	async fn destroy<'a>(
		&self,
		diags: &mut Diagnostics,
		prior_state: Self::State<'a>,
		_planned_private_state: Self::PrivateState<'a>,
		_provider_meta_state: Self::ProviderMetaState<'a>,
	) -> Option<()> {
		let client = self.client.get(diags)?;
		let Link { realm_id, organization_id, alias } = prior_state.link();

		client
			.unlink_identity_provider_from_organization(&realm_id, &organization_id, &alias)
			.await
			.or_report(diags)
	}

	async fn import<'a>(
		&self,
		diags: &mut Diagnostics,
		id: String,
	) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
		let [realm_id, organization_id, alias] =
			split_import_id::<3>(&id, ORGANIZATION_IDENTITY_PROVIDER_IMPORT_FORMAT)
				.or_report(diags)?;
		let client = self.client.get(diags)?;
		let fetched = Link { realm_id, organization_id, alias }.fetch(&client).await;

		Remote::new(fetched, diags).import(diags, &id, OrganizationIdentityProviderState::refreshed)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use serde_json::json;
	use terraform_provider_keycloak::_preludet::build_test_client;
	// self
	use super::*;

	const LINK_PATH: &str = "/admin/realms/test/organizations/o1/identity-providers/google";
	const IDP_PATH: &str = "/admin/realms/test/identity-provider/instances/google";

	async fn resource(server: &MockServer) -> OrganizationIdentityProviderResource {
		server
			.mock_async(|when, then| {
				when.method(POST).path("/realms/master/protocol/openid-connect/token");
				then.status(200).json_body(json!({
					"access_token": "access-orgs",
					"refresh_token": "refresh-orgs",
					"token_type": "bearer",
					"expires_in": 300
				}));
			})
			.await;

		OrganizationIdentityProviderResource::new(ClientSlot::with_client(build_test_client(
			&server.base_url(),
		)))
	}

	#[tokio::test]
	async fn plan_derives_the_link_id() {
		let resource = OrganizationIdentityProviderResource::new(ClientSlot::default());
		let mut diags = Diagnostics::default();
		let proposed = OrganizationIdentityProviderState {
			realm_id: "test".into(),
			organization_id: "o1".into(),
			identity_provider_alias: "google".into(),
			..Default::default()
		};
		let (state, _) = resource
			.plan_create(&mut diags, proposed.clone(), proposed, ValueEmpty::default())
			.await
			.expect("Planning should succeed.");

		assert_eq!(state.id, ValueString::from("test/o1/google"));
		assert_eq!(state.domain, ValueString::from(""));
		assert_eq!(state.redirect_email_domain_matches, ValueBool::from(false));
	}

	#[tokio::test]
	async fn read_takes_settings_from_the_identity_provider() {
		let server = MockServer::start_async().await;
		let resource = resource(&server).await;

		server
			.mock_async(|when, then| {
				when.method(GET).path(LINK_PATH);
				then.status(200).json_body(json!({ "alias": "google" }));
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(IDP_PATH);
				then.status(200).json_body(json!({
					"alias": "google",
					"providerId": "google",
					"enabled": true,
					"config": {
						"kc.org.domain": "acme.test",
						"kc.org.broker.redirect.mode.email-matches": "true"
					}
				}));
			})
			.await;

		let mut diags = Diagnostics::default();
		let (state, _) = resource
			.import(&mut diags, "test/o1/google".into())
			.await
			.expect("Import should find the link.");

		assert!(diags.errors.is_empty());
		assert_eq!(state.id, ValueString::from("test/o1/google"));
		assert_eq!(state.domain, ValueString::from("acme.test"));
		assert_eq!(state.redirect_email_domain_matches, ValueBool::from(true));
	}

	#[tokio::test]
	async fn unlinked_providers_drop_out_of_state() {
		let server = MockServer::start_async().await;
		let resource = resource(&server).await;

		server
			.mock_async(|when, then| {
				when.method(GET).path(LINK_PATH);
				then.status(404).json_body(json!({ "errorMessage": "Not linked" }));
			})
			.await;

		let mut diags = Diagnostics::default();
		let state = OrganizationIdentityProviderState {
			id: "test/o1/google".into(),
			realm_id: "test".into(),
			organization_id: "o1".into(),
			identity_provider_alias: "google".into(),
			..Default::default()
		};

		assert_eq!(
			resource.read(&mut diags, state, ValueEmpty::default(), ValueEmpty::default()).await,
			None
		);
		assert!(diags.errors.is_empty());
	}
}

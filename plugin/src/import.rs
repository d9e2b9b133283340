//! Import identifier layouts.

// self
use crate::_prelude::*;

/// Import layout of organizations.
pub const ORGANIZATION_IMPORT_FORMAT: &str = "{{realm}}/{{organizationId}}";
/// Import layout of organization identity provider links.
pub const ORGANIZATION_IDENTITY_PROVIDER_IMPORT_FORMAT: &str =
	"{{realm}}/{{organizationId}}/{{identityProviderAlias}}";
/// Import layout of protocol mappers.
pub const PROTOCOL_MAPPER_IMPORT_FORMAT: &str =
	"{{realmId}}/client/{{clientId}}/{{protocolMapperId}}, {{realmId}}/client-scope/{{clientScopeId}}/{{protocolMapperId}}";
/// Import layout of realm keystores.
pub const REALM_KEYSTORE_IMPORT_FORMAT: &str = "{{realm}}/{{keystoreId}}";
/// Import layout of authorization policies.
pub const POLICY_IMPORT_FORMAT: &str = "{{realmId}}/{{resourceServerId}}/{{policyId}}";

/// Splits an import id into exactly `N` non-empty segments.
pub fn split_import_id<const N: usize>(id: &str, format: &'static str) -> Result<[String; N]> {
	let parts = id.split('/').map(ToOwned::to_owned).collect::<Vec<_>>();

	if parts.iter().any(String::is_empty) {
		return Err(Error::InvalidImport { format });
	}

	parts.try_into().map_err(|_| Error::InvalidImport { format })
}

/// Protocol mapper address parsed from an import id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapperImport {
	/// Realm.
	pub realm_id: String,
	/// Owning client, when imported through `client`.
	pub client_id: Option<String>,
	/// Owning client scope, when imported through `client-scope`.
	pub client_scope_id: Option<String>,
	/// Mapper id.
	pub id: String,
}
impl MapperImport {
	/// Parses `{realm}/client/{client}/{id}` or `{realm}/client-scope/{scope}/{id}`.
	pub fn parse(id: &str) -> Result<Self> {
		let [realm_id, parent_kind, parent_id, id] =
			split_import_id::<4>(id, PROTOCOL_MAPPER_IMPORT_FORMAT)?;
		let (client_id, client_scope_id) = match parent_kind.as_str() {
			"client" => (Some(parent_id), None),
			"client-scope" => (None, Some(parent_id)),
			_ => return Err(Error::InvalidImport { format: PROTOCOL_MAPPER_IMPORT_FORMAT }),
		};

		Ok(Self { realm_id, client_id, client_scope_id, id })
	}
}

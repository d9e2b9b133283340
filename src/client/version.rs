//! Server version probing and comparison.

// self
use crate::{_prelude::*, client::KeycloakClient, error::DecodeError};

/// Keycloak release number (`major.minor.patch`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
	/// Major release.
	pub major: u64,
	/// Minor release.
	pub minor: u64,
	/// Patch release.
	pub patch: u64,
}
impl Version {
	/// First release that ships the organizations admin API.
	pub const V26: Version = Version::new(26, 0, 0);

	/// Creates a version from its components.
	pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
		Self { major, minor, patch }
	}

	/// Maps a Red Hat SSO 7.x release onto the Keycloak release it is built from.
	pub fn into_keycloak_version(self) -> Self {
		match (self.major, self.minor) {
			(7, 6) => Self::new(18, 0, 0),
			(7, 5) => Self::new(15, 0, 6),
			(7, 4) => Self::new(9, 0, 17),
			_ => self,
		}
	}
}
impl FromStr for Version {
	type Err = DecodeError;

	/// Parses the leading numeric components; suffixes such as `-SNAPSHOT` or `.GA` are
	/// ignored and missing components default to zero.
	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		let invalid = || DecodeError::ComponentConfig { key: "version".into(), value: raw.into() };
		let mut parts = [0_u64; 3];
		let mut parsed = 0;

		for (idx, segment) in raw.trim().split(['.', '-']).take(3).enumerate() {
			let digits = segment.chars().take_while(char::is_ascii_digit).collect::<String>();

			if digits.is_empty() {
				break;
			}

			parts[idx] = digits.parse().map_err(|_| invalid())?;
			parsed += 1;

			if digits.len() != segment.len() {
				break;
			}
		}

		if parsed == 0 {
			return Err(invalid());
		}

		Ok(Self::new(parts[0], parts[1], parts[2]))
	}
}
impl Display for Version {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfo {
	system_info: SystemInfo,
}

#[derive(Deserialize)]
struct SystemInfo {
	version: String,
}

impl KeycloakClient {
	/// Returns the server version, fetching `/serverinfo` once and caching the result.
	pub async fn server_version(&self) -> Result<Version> {
		if let Some(version) = *self.server_version.read() {
			return Ok(version);
		}

		let info = self.get::<ServerInfo>("/serverinfo").await?;
		let mut version = info.system_info.version.parse::<Version>()?;

		if self.config.red_hat_sso {
			version = version.into_keycloak_version();
		}

		*self.server_version.write() = Some(version);

		Ok(version)
	}

	/// Returns `true` when the server runs `version` or newer.
	pub async fn version_is_greater_than_or_equal_to(&self, version: Version) -> Result<bool> {
		Ok(self.server_version().await? >= version)
	}

	/// Returns `true` when the server runs a release older than `version`.
	pub async fn version_is_less_than(&self, version: Version) -> Result<bool> {
		Ok(self.server_version().await? < version)
	}

	/// Fails with [`Error::Unsupported`] when the server is older than `required`.
	pub async fn require_version(&self, feature: &'static str, required: Version) -> Result<()> {
		let actual = self.server_version().await?;

		if actual < required {
			return Err(Error::Unsupported {
				feature,
				required: required.to_string(),
				actual: actual.to_string(),
			});
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	// self
	use super::*;
	use crate::_preludet::{build_test_client_with, test_client_config_builder};

	#[test]
	fn parses_release_strings() {
		assert_eq!(
			"26.0.5".parse::<Version>().expect("Plain version should parse."),
			Version::new(26, 0, 5)
		);
		assert_eq!(
			"26.1.0-SNAPSHOT".parse::<Version>().expect("Snapshot version should parse."),
			Version::new(26, 1, 0)
		);
		assert_eq!(
			"7.6.0.GA".parse::<Version>().expect("RH-SSO version should parse."),
			Version::new(7, 6, 0)
		);
		assert_eq!(
			"25".parse::<Version>().expect("Major-only version should parse."),
			Version::new(25, 0, 0)
		);
		assert!("unknown".parse::<Version>().is_err());
	}

	#[test]
	fn orders_and_maps_versions() {
		assert!(Version::new(26, 0, 0) >= Version::V26);
		assert!(Version::new(25, 9, 9) < Version::V26);
		assert_eq!(Version::new(7, 6, 0).into_keycloak_version(), Version::new(18, 0, 0));
		assert_eq!(Version::new(24, 0, 1).into_keycloak_version(), Version::new(24, 0, 1));
		assert_eq!(Version::new(9, 0, 17).to_string(), "9.0.17");
	}

	#[tokio::test]
	async fn red_hat_sso_release_is_mapped_and_cached() {
		let server = MockServer::start_async().await;
		let login = server
			.mock_async(|when, then| {
				when.method(POST).path("/realms/master/protocol/openid-connect/token");
				then.status(200).header("content-type", "application/json").body(
					"{\"access_token\":\"access\",\"token_type\":\"bearer\",\"expires_in\":300}",
				);
			})
			.await;
		let server_info = server
			.mock_async(|when, then| {
				when.method(GET).path("/admin/serverinfo");
				then.status(200)
					.header("content-type", "application/json")
					.body("{\"systemInfo\":{\"version\":\"7.6.0.GA\"}}");
			})
			.await;
		let client = build_test_client_with(
			test_client_config_builder(&server.base_url()).red_hat_sso(true),
		);

		assert_eq!(
			client.server_version().await.expect("Server version should load."),
			Version::new(18, 0, 0)
		);
		assert!(
			!client
				.version_is_greater_than_or_equal_to(Version::V26)
				.await
				.expect("Cached version should compare.")
		);

		login.assert_calls_async(1).await;
		server_info.assert_calls_async(1).await;
	}
}

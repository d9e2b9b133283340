//! Generic component representation used by key providers and other extensions.

// self
use crate::{_prelude::*, error::DecodeError};

/// Component as exchanged with `/realms/{realm}/components`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
	/// Server-assigned identifier; empty before creation.
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub id: String,
	/// Display name.
	pub name: String,
	/// Provider implementation (for example `rsa-enc-generated`).
	pub provider_id: String,
	/// SPI the provider belongs to.
	pub provider_type: String,
	/// Owning realm identifier.
	pub parent_id: String,
	/// Multi-valued configuration entries.
	#[serde(default)]
	pub config: BTreeMap<String, Vec<String>>,
}
impl Component {
	/// Returns the first value stored under `key`, or `""` when absent.
	pub fn config_value(&self, key: &str) -> &str {
		self.config.get(key).and_then(|values| values.first()).map(String::as_str).unwrap_or("")
	}

	/// Stores a single-valued configuration entry.
	pub fn set_config(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.config.insert(key.into(), vec![value.into()]);
	}

	/// Parses a configuration entry as a boolean where the empty string means `false`.
	pub fn config_bool(&self, key: &str) -> Result<bool, DecodeError> {
		parse_bool_treat_empty_as_false(self.config_value(key)).ok_or_else(|| {
			DecodeError::ComponentConfig { key: key.into(), value: self.config_value(key).into() }
		})
	}

	/// Parses a configuration entry as an integer, falling back to `default` when empty.
	pub fn config_int_or(&self, key: &str, default: i64) -> Result<i64, DecodeError> {
		let raw = self.config_value(key);

		if raw.is_empty() {
			return Ok(default);
		}

		raw.parse()
			.map_err(|_| DecodeError::ComponentConfig { key: key.into(), value: raw.into() })
	}
}

/// Parses the boolean spellings Keycloak emits; the empty string is `false`.
pub fn parse_bool_treat_empty_as_false(raw: &str) -> Option<bool> {
	match raw {
		"" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
		"1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
		_ => None,
	}
}

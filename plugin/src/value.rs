//! Conversions between Terraform values and the plain strings the admin API speaks.
//!
//! Keycloak does not distinguish an unset string from an empty one, Terraform does. Optional
//! attributes therefore read back as null when the server returns nothing, unless the prior
//! state already held the empty value.

// self
use crate::_prelude::*;

/// Configured string, or `""` when null or unknown.
pub fn text<'s>(value: &'s ValueString<'_>) -> &'s str {
	value.as_deref_option().unwrap_or_default()
}

/// Configured string when it is set and not empty.
pub fn non_empty<'s>(value: &'s ValueString<'_>) -> Option<&'s str> {
	value.as_deref_option().filter(|raw| !raw.is_empty())
}

/// State value of an optional string read from the server.
pub fn optional_text<'a>(remote: String, prior: &ValueString<'_>) -> ValueString<'a> {
	if remote.is_empty() && prior.as_deref_option() != Some("") {
		ValueString::Null
	} else {
		ValueString::from(remote)
	}
}

/// Configured string map with null and unknown entries dropped.
pub fn text_map(value: &ValueMap<'_, ValueString<'_>>) -> BTreeMap<String, String> {
	value
		.iter()
		.flatten()
		.filter_map(|(key, value)| value.as_deref_option().map(|v| (key.to_string(), v.to_owned())))
		.collect()
}

/// State value of an optional string map read from the server.
pub fn optional_map<'a>(
	remote: BTreeMap<String, String>,
	prior: &ValueMap<'_, ValueString<'_>>,
) -> ValueMap<'a, ValueString<'a>> {
	if remote.is_empty() && !prior.as_ref_option().is_some_and(BTreeMap::is_empty) {
		return ValueMap::Null;
	}

	ValueMap::from(
		remote
			.into_iter()
			.map(|(key, value)| (Cow::Owned(key), ValueString::from(value)))
			.collect::<BTreeMap<_, _>>(),
	)
}

/// Replaces null with `default`.
pub fn default_to<T>(value: &mut Value<T>, default: T) {
	if value.is_null() {
		*value = Value::Value(default);
	}
}

/// Marks a null computed value as known only after apply.
pub fn unknown_if_null<T>(value: &mut Value<T>) {
	if value.is_null() {
		*value = Value::Unknown;
	}
}

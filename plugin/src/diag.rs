//! Error reporting and attribute validation on top of [`Diagnostics`].

// self
use crate::_prelude::*;

/// Adds admin client errors to a diagnostics list.
pub trait DiagnosticsExt {
	/// Records `e` as a root error; its source chain becomes the detail.
	fn report(&mut self, e: Error);

	/// Records `e` against `attribute`.
	fn report_at(&mut self, e: Error, attribute: AttributePath);
}
impl DiagnosticsExt for Diagnostics {
	fn report(&mut self, e: Error) {
		#[cfg(feature = "tracing")]
		tracing::debug!(error = %e, "Reporting error diagnostic.");

		self.root_error(e.to_string(), error_detail(&e));
	}

	fn report_at(&mut self, e: Error, attribute: AttributePath) {
		self.error(e.to_string(), error_detail(&e), attribute);
	}
}

/// Moves the error side of a [`Result`] into diagnostics.
pub trait ResultExt<T> {
	/// `Some` on success, otherwise the error is reported and `None` returned.
	fn or_report(self, diags: &mut Diagnostics) -> Option<T>;
}
impl<T> ResultExt<T> for Result<T> {
	fn or_report(self, diags: &mut Diagnostics) -> Option<T> {
		self.map_err(|e| diags.report(e)).ok()
	}
}

/// Joins the messages of every source below `e`.
pub fn error_detail(e: &Error) -> String {
	std::iter::successors(StdError::source(e), |err| (*err).source())
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(": ")
}

/// Rejects a configured empty string.
pub fn check_not_empty(diags: &mut Diagnostics, name: &'static str, value: &ValueString) {
	if value.as_deref_option() == Some("") {
		diags.error_short(
			format!("expected \"{name}\" to not be an empty string"),
			AttributePath::new(name),
		);
	}
}

/// Rejects a configured string outside `allowed`.
pub fn check_one_of(
	diags: &mut Diagnostics,
	name: &'static str,
	value: &ValueString,
	allowed: &[&str],
) {
	if let Some(raw) = value.as_deref_option().filter(|raw| !allowed.contains(raw)) {
		diags.error_short(
			format!("expected {name} to be one of [{}], got {raw}", allowed.join(" ")),
			AttributePath::new(name),
		);
	}
}

/// Rejects a configured number outside `allowed`.
pub fn check_int_one_of(
	diags: &mut Diagnostics,
	name: &'static str,
	value: &ValueNumber,
	allowed: &[i64],
) {
	if let Some(raw) = value.as_ref_option().filter(|raw| !allowed.contains(*raw)) {
		let allowed = allowed.iter().map(ToString::to_string).collect::<Vec<_>>();

		diags.error_short(
			format!("expected {name} to be one of [{}], got {raw}", allowed.join(" ")),
			AttributePath::new(name),
		);
	}
}

/// Records `name` as force-new when its value differs between `prior` and `proposed`.
pub fn force_new<T>(replace: &mut Vec<AttributePath>, name: &'static str, prior: &T, proposed: &T)
where
	T: PartialEq,
{
	if prior != proposed {
		replace.push(AttributePath::new(name));
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use terraform_provider_keycloak::{error::ConfigError, url::ParseError};
	// self
	use super::*;

	#[test]
	fn source_chain_becomes_the_detail() {
		let mut diags = Diagnostics::default();

		diags.report(
			ConfigError::InvalidEndpoint {
				url: "keycloak:8080".into(),
				source: ParseError::RelativeUrlWithoutBase,
			}
			.into(),
		);

		assert_eq!(diags.errors.len(), 1);
		assert_eq!(diags.errors[0].summary, "Endpoint URL `keycloak:8080` is invalid.");
		assert_eq!(diags.errors[0].detail, "relative URL without a base");
		assert_eq!(
			error_detail(&Error::validation("one of ClientId or ClientScopeId must be set")),
			""
		);
	}

	#[test]
	fn failed_results_are_reported_once() {
		let mut diags = Diagnostics::default();

		assert_eq!(Ok::<_, Error>(7).or_report(&mut diags), Some(7));
		assert!(diags.errors.is_empty());
		assert_eq!(
			Err::<(), _>(Error::from(ConfigError::NotConfigured)).or_report(&mut diags),
			None
		);
		assert_eq!(
			diags.errors[0].summary,
			"Provider must be configured before resources can be managed."
		);
	}

	#[test]
	fn value_checks_skip_null_and_unknown() {
		let mut diags = Diagnostics::default();

		check_one_of(&mut diags, "logic", &ValueString::Null, &["POSITIVE"]);
		check_one_of(&mut diags, "logic", &ValueString::Unknown, &["POSITIVE"]);
		check_int_one_of(&mut diags, "key_size", &ValueNumber::Unknown, &[2048]);
		check_not_empty(&mut diags, "name", &ValueString::Null);

		assert!(diags.errors.is_empty());

		check_one_of(&mut diags, "logic", &"MAYBE".into(), &["POSITIVE", "NEGATIVE"]);
		check_int_one_of(&mut diags, "key_size", &ValueNumber::from(512), &[1024, 2048]);
		check_not_empty(&mut diags, "name", &"".into());

		let summaries = diags.errors.iter().map(|diag| &*diag.summary).collect::<Vec<_>>();

		assert_eq!(
			summaries,
			vec![
				"expected logic to be one of [POSITIVE NEGATIVE], got MAYBE",
				"expected key_size to be one of [1024 2048], got 512",
				"expected \"name\" to not be an empty string",
			]
		);
		assert_eq!(diags.errors[1].attribute, AttributePath::new("key_size"));
	}
}

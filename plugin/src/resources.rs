//! Managed resource types.

pub mod openid_client_authorization_role_policy;
pub mod openid_script_protocol_mapper;
pub mod organization;
pub mod organization_identity_provider;
pub mod realm_keystore_rsa_enc_generated;
pub mod saml_hardcoded_attribute_protocol_mapper;
pub mod saml_user_session_note_protocol_mapper;

mod mapper;

pub use openid_client_authorization_role_policy::*;
pub use openid_script_protocol_mapper::*;
pub use organization::*;
pub use organization_identity_provider::*;
pub use realm_keystore_rsa_enc_generated::*;
pub use saml_hardcoded_attribute_protocol_mapper::*;
pub use saml_user_session_note_protocol_mapper::*;

// self
use crate::_prelude::*;

/// Outcome of looking up a managed object.
#[derive(Debug)]
pub enum Remote<T> {
	/// Object exists.
	Found(T),
	/// Admin API answered 404.
	Gone,
	/// Lookup failed; the error is already in the diagnostics.
	Failed,
}
impl<T> Remote<T> {
	/// Classifies a lookup result. Errors other than 404 are reported.
	pub fn new(result: Result<T>, diags: &mut Diagnostics) -> Self {
		match result {
			Ok(found) => Self::Found(found),
			Err(e) if e.is_not_found() => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %e, "Remote object is gone; removing it from state.");

				Self::Gone
			},
			Err(e) => {
				diags.report(e);

				Self::Failed
			},
		}
	}

	/// Read answer: the refreshed state, `None` once the object is gone, `prior` on failure.
	pub fn refresh<S, F>(self, prior: S, refresh: F) -> Option<(S, ValueEmpty)>
	where
		F: FnOnce(T, &S) -> S,
	{
		match self {
			Self::Found(found) => Some((refresh(found, &prior), ValueEmpty::default())),
			Self::Gone => None,
			Self::Failed => Some((prior, ValueEmpty::default())),
		}
	}

	/// Import answer; importing a missing object is an error.
	pub fn import<S, F>(
		self,
		diags: &mut Diagnostics,
		id: &str,
		refresh: F,
	) -> Option<(S, ValueEmpty)>
	where
		S: Default,
		F: FnOnce(T, &S) -> S,
	{
		match self {
			Self::Found(found) => Some((refresh(found, &S::default()), ValueEmpty::default())),
			Self::Gone => {
				diags.root_error(
					"Cannot import non-existent remote object",
					format!("Nothing matches the import identifier {id}."),
				);

				None
			},
			Self::Failed => None,
		}
	}
}

/// State after a create or update: `planned` refreshed from the server's view.
///
/// A failed re-read still returns the planned state so Terraform tracks the object.
pub fn applied<T, S, F>(
	result: Result<T>,
	planned: S,
	diags: &mut Diagnostics,
	refresh: F,
) -> Option<(S, ValueEmpty)>
where
	F: FnOnce(T, &S) -> S,
{
	match result {
		Ok(found) => Some((refresh(found, &planned), ValueEmpty::default())),
		Err(e) => {
			diags.report(e);

			Some((planned, ValueEmpty::default()))
		},
	}
}

//! Optional observability helpers for token flows and admin requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `keycloak.request` with the `kind` (grant or
//!   HTTP method) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `keycloak_request_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Calls observed by the admin client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
	/// Token acquisition with the configured credentials.
	Login,
	/// Refresh token exchange.
	Refresh,
	/// Admin `GET`.
	Get,
	/// Admin `POST`.
	Post,
	/// Admin `PUT`.
	Put,
	/// Admin `DELETE`.
	Delete,
}
impl RequestKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::Login => "login",
			RequestKind::Refresh => "refresh",
			RequestKind::Get => "get",
			RequestKind::Post => "post",
			RequestKind::Put => "put",
			RequestKind::Delete => "delete",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to a client call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::Failure => "failure",
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

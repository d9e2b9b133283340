// self
use crate::obs::{RequestKind, RequestOutcome};

/// Records a request outcome via the global metrics recorder (when enabled).
pub fn record_request_outcome(kind: RequestKind, outcome: RequestOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"keycloak_request_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the outcome of a finished call from its result.
pub fn record_result<T, E>(kind: RequestKind, result: &Result<T, E>) {
	match result {
		Ok(_) => record_request_outcome(kind, RequestOutcome::Success),
		Err(_) => record_request_outcome(kind, RequestOutcome::Failure),
	}
}

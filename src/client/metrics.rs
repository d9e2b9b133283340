// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for token activity.
#[derive(Debug, Default)]
pub struct ClientMetrics {
	logins: AtomicU64,
	refreshes: AtomicU64,
	reauthentications: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of grants performed with the configured credentials.
	pub fn logins(&self) -> u64 {
		self.logins.load(Ordering::Relaxed)
	}

	/// Returns the number of refresh token exchanges.
	pub fn refreshes(&self) -> u64 {
		self.refreshes.load(Ordering::Relaxed)
	}

	/// Returns how often an admin request was retried after a 401.
	pub fn reauthentications(&self) -> u64 {
		self.reauthentications.load(Ordering::Relaxed)
	}

	pub(crate) fn record_login(&self) {
		self.logins.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_refresh(&self) {
		self.refreshes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_reauthentication(&self) {
		self.reauthentications.fetch_add(1, Ordering::Relaxed);
	}
}

//! Utility functions shared across the orderflow crates.

/// Utility function to truncate an order id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
/// Ids come from user input as well as the factory, so truncation happens
/// on character boundaries, never byte offsets.
pub fn truncate_id(id: &str) -> String {
	match id.char_indices().nth(8) {
		Some((idx, _)) => format!("{}..", &id[..idx]),
		None => id.to_string(),
	}
}

/// Helper function to get current timestamp, returns 0 if system time is before UNIX epoch.
pub fn current_timestamp() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

use std::time::Duration;

#[cfg(not(feature = "wasm32_web_time"))]
pub use std::time::Instant;

/// WASM (browser) specific instant type.
///
/// This type is only available when the `wasm32_web_time` feature is enabled.
/// In that case this is an alias for [`web_time::Instant`].
#[cfg(feature = "wasm32_web_time")]
pub use web_time::Instant;

/// Checks if a deadline was exceeded.
pub fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    match deadline {
        Some(deadline) => Instant::now() > deadline,
        None => false,
    }
}

/// Converts a duration into a deadline.
pub fn duration_to_deadline(add: Duration) -> Option<Instant> {
    Instant::now().checked_add(add)
}

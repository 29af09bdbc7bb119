/// A cancellation token shared by the per-instance discovery workers.
///
/// This is a type alias for [`tokio_util::sync::CancellationToken`]. The first
/// worker that fails cancels it so the remaining workers stop before issuing
/// further API calls.
pub type DiscoveryCancellationToken = tokio_util::sync::CancellationToken;

/// Create a new [`DiscoveryCancellationToken`].
///
/// # Example
///
/// ```
/// use aurora_log_archiver::types::token::create_discovery_cancellation_token;
///
/// let token = create_discovery_cancellation_token();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
pub fn create_discovery_cancellation_token() -> DiscoveryCancellationToken {
    tokio_util::sync::CancellationToken::new()
}

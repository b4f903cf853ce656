use std::time::Duration;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// HTTP client shared by the token refresh and currently-playing calls.
///
/// `timeout` bounds every upstream request so a hung upstream turns into a
/// prompt 503 rather than holding the inbound request open.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
}

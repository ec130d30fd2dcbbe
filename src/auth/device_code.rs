use chrono::{DateTime, Utc};

use super::Token;

/// Device-code session details returned by the identity provider.
///
/// # Example
/// ```no_run
/// use meetai::auth::DeviceCodeSession;
/// use chrono::{DateTime, Utc};
///
/// let session = DeviceCodeSession {
///     verification_url: "https://microsoft.com/devicelogin".to_string(),
///     user_code: "ABCD-EFGH".to_string(),
///     device_code: "device-code".to_string(),
///     message: None,
///     interval_secs: 5,
///     expires_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DeviceCodeSession {
    pub verification_url: String,
    pub user_code: String,
    pub device_code: String,
    /// Ready-made instruction text, when the provider sends one.
    pub message: Option<String>,
    pub interval_secs: u64,
    pub expires_at: DateTime<Utc>,
}

/// Polling outcome for a device-code session.
#[derive(Debug, Clone)]
pub enum DeviceCodePoll {
    Pending { interval_secs: u64 },
    SlowDown { interval_secs: u64 },
    Authorized { token: Token },
    AccessDenied,
    Expired,
}

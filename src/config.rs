//local shortcuts
use crate::common::{DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_RTT_HEARTBEAT_SECONDS};

//third-party shortcuts

//standard shortcuts
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Config for a [`Context`](crate::Context).
#[derive(Debug, Clone)]
pub struct ContextConfig
{
    /// Heartbeat cadence used until the dispatcher supplies `heartbeatSeconds` at authentication. Defaults to
    /// 30 minutes, matching the dispatcher's own default.
    pub default_heartbeat_interval: Duration,
    /// Ceiling self-imposed by `authenticateSync`/`requestSync`. Defaults to 60 seconds.
    pub sync_call_timeout: Duration,
    /// Poll interval used by the sync variants between `runCallbacks` drains. Defaults to 10 milliseconds.
    pub sync_poll_interval: Duration,
    /// RTT heartbeat cadence used until the CONNECT reply supplies `heartbeatSeconds`. Defaults to 30 seconds.
    pub rtt_default_heartbeat: Duration,
    /// Per-request timeout handed to the [`HttpTransport`](crate::HttpTransport). Defaults to 30 seconds.
    pub http_request_timeout: Duration,
}

impl Default for ContextConfig
{
    fn default() -> ContextConfig
    {
        ContextConfig{
                default_heartbeat_interval : Duration::from_millis(DEFAULT_HEARTBEAT_INTERVAL_MS),
                sync_call_timeout          : Duration::from_secs(60),
                sync_poll_interval         : Duration::from_millis(10),
                rtt_default_heartbeat      : Duration::from_secs(DEFAULT_RTT_HEARTBEAT_SECONDS),
                http_request_timeout       : Duration::from_secs(30),
            }
    }
}

//-------------------------------------------------------------------------------------------------------------------

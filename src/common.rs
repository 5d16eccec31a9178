//local shortcuts

//third-party shortcuts
use serde_json::{json, Value};

//standard shortcuts

//-------------------------------------------------------------------------------------------------------------------

/// Default dispatcher URL for brainCloud's production S2S endpoint.
pub const DEFAULT_S2S_URL: &str = "https://api.braincloudservers.com/s2sdispatcher";

/// Version string reported by this crate, used where the original library reports `s_brainCloudS2SVersion`.
pub const S2S_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dispatcher error code meaning the session has expired server-side and must be re-authenticated.
pub(crate) const SERVER_SESSION_EXPIRED: i64 = 40365;

/// Default S2S heartbeat cadence (30 minutes) used when the server omits `heartbeatSeconds`.
pub(crate) const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30 * 60 * 1000;

/// Default RTT heartbeat cadence (seconds) used when the server omits `heartbeatSeconds`.
pub(crate) const DEFAULT_RTT_HEARTBEAT_SECONDS: u64 = 30;

//-------------------------------------------------------------------------------------------------------------------

/// Service-name string constants exported for callers building their own messages.
pub mod service_name
{
    pub const AUTHENTICATION: &str = "authenticationV2";
    pub const RTT_REGISTRATION: &str = "rttRegistration";
    pub const RTT: &str = "rtt";
    pub const CHAT: &str = "chat";
    pub const MESSAGING: &str = "messaging";
    pub const LOBBY: &str = "lobby";
    pub const RELAY: &str = "relay";
    pub const HEARTBEAT: &str = "heartbeat";
}

/// Operation-name string constants exported for callers building their own messages.
pub mod operation
{
    pub const AUTHENTICATE: &str = "AUTHENTICATE";
    pub const REQUEST_SYSTEM_CONNECTION: &str = "REQUEST_SYSTEM_CONNECTION";
    pub const CONNECT: &str = "CONNECT";
    pub const DISCONNECT: &str = "DISCONNECT";
    pub const HEARTBEAT: &str = "HEARTBEAT";
}

//-------------------------------------------------------------------------------------------------------------------

/// Builds a synthetic local-error envelope, status 900, matching the dispatcher's reserved status range for
/// transport-level failures.
pub(crate) fn local_error(message: &str) -> Value
{
    json!({ "status": 900, "message": message })
}

pub(crate) fn local_error_str(message: &str) -> String
{
    local_error(message).to_string()
}

//-------------------------------------------------------------------------------------------------------------------

/// Pulls `messageResponses[0]` and the top-level `packetId` out of a dispatcher response body.
///
/// Returns `None` if the body isn't valid JSON, or is missing/empty `messageResponses`.
pub(crate) fn parse_response_envelope(body: &str) -> Option<(i64, Value)>
{
    let data: Value = serde_json::from_str(body).ok()?;
    let packet_id = data.get("packetId").and_then(Value::as_i64).unwrap_or(0);
    let responses = data.get("messageResponses")?.as_array()?;
    let first = responses.first()?.clone();
    Some((packet_id, first))
}

/// Returns `true` if a parsed message response reports `status == 200`.
pub(crate) fn response_is_ok(message: &Value) -> bool
{
    message.get("status").and_then(Value::as_i64) == Some(200)
}

/// Extracts `reason_code` from a failed message response, if present.
pub(crate) fn response_reason_code(message: &Value) -> Option<i64>
{
    message.get("reason_code").and_then(Value::as_i64)
}

//-------------------------------------------------------------------------------------------------------------------

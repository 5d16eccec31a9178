//local shortcuts

//third-party shortcuts

//standard shortcuts
use std::time::Instant;

//-------------------------------------------------------------------------------------------------------------------

/// Session data only meaningful while [`SessionState::Authenticated`].
#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedState
{
    pub(crate) session_id: String,
    pub(crate) packet_id: i64,
    pub(crate) heartbeat_interval_ms: u64,
    pub(crate) heartbeat_deadline: Instant,
}

/// The S2S session's authoritative state tag. Workers read the current tag to decide behavior; it is only ever
/// mutated under the session's lock.
#[derive(Debug, Clone)]
pub(crate) enum SessionState
{
    Disconnected,
    Authenticating,
    Authenticated(AuthenticatedState),
}

impl SessionState
{
    pub(crate) fn is_disconnected(&self) -> bool
    {
        matches!(self, SessionState::Disconnected)
    }

    pub(crate) fn authenticated(&self) -> Option<&AuthenticatedState>
    {
        match self
        {
            SessionState::Authenticated(state) => Some(state),
            _ => None,
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

//local shortcuts
use crate::callback_pump::ResultCallback;

//third-party shortcuts
use serde_json::Value;

//standard shortcuts
use std::collections::VecDeque;
use std::sync::Mutex;

//-------------------------------------------------------------------------------------------------------------------

/// What a queued [`Request`] actually sends. The authentication packet and a user message are packetized
/// differently (no `sessionId`/running `packetId` for the former), so the dispatcher keeps them as one FIFO but
/// renders the wire body differently depending on this tag.
#[derive(Debug, Clone)]
pub(crate) enum RequestPayload
{
    Authenticate,
    UserMessage(Value),
}

//-------------------------------------------------------------------------------------------------------------------

/// A queued dispatcher request: its wire payload, the callback to invoke once a response (or terminal failure)
/// arrives, whether it has already been through one session-expiry retry, and whether it's the internally-generated
/// heartbeat (whose failure disconnects the session rather than merely reporting an error).
pub(crate) struct Request
{
    pub(crate) payload: RequestPayload,
    pub(crate) callback: Option<ResultCallback>,
    pub(crate) retried: bool,
    pub(crate) is_heartbeat: bool,
}

//-------------------------------------------------------------------------------------------------------------------

/// FIFO of outstanding dispatcher requests (including the authentication packet itself) with a single in-flight
/// slot.
///
/// The request at the front of the queue is the one currently being sent (or about to be). It is only removed once
/// its response has been matched, via [`RequestQueue::complete_front`] — never eagerly on submission. This mirrors
/// the original implementation's queue/pop split, but folds both sides under one lock so a request can't be popped
/// by one thread while another concurrently decides whether a new head needs dispatching (the source of a known
/// race in the original: popping and "is there a next request" were separate locked sections).
pub(crate) struct RequestQueue
{
    queue: Mutex<VecDeque<Request>>,
}

impl RequestQueue
{
    pub(crate) fn new() -> Self
    {
        Self{ queue: Mutex::new(VecDeque::new()) }
    }

    /// Appends `request`. Returns `true` if the queue was empty beforehand, meaning the caller is responsible for
    /// kicking off dispatch (otherwise a send is already in flight and will pick this request up in turn).
    pub(crate) fn push_back(&self, request: Request) -> bool
    {
        let mut queue = self.queue.lock().unwrap_or_else(|poison| poison.into_inner());
        let was_empty = queue.is_empty();
        queue.push_back(request);
        was_empty
    }

    /// Clones the payload of the in-flight (front) request, for rendering a wire body without consuming the
    /// request — its callback must stay queued until a response is matched.
    pub(crate) fn front_payload(&self) -> Option<RequestPayload>
    {
        let queue = self.queue.lock().unwrap_or_else(|poison| poison.into_inner());
        queue.front().map(|request| request.payload.clone())
    }

    /// Removes and returns the front request (its response has been matched or it has failed terminally), along
    /// with whether another request is now at the head and needs dispatching.
    pub(crate) fn complete_front(&self) -> (Option<Request>, bool)
    {
        let mut queue = self.queue.lock().unwrap_or_else(|poison| poison.into_inner());
        let completed = queue.pop_front();
        let more_pending = !queue.is_empty();
        (completed, more_pending)
    }

    /// Removes every queued request (in submission order), for use when the session disconnects and every
    /// outstanding callback must be notified of failure (or, on `disconnect()`, simply dropped).
    pub(crate) fn drain_all(&self) -> Vec<Request>
    {
        let mut queue = self.queue.lock().unwrap_or_else(|poison| poison.into_inner());
        queue.drain(..).collect()
    }

    pub(crate) fn is_empty(&self) -> bool
    {
        self.queue.lock().unwrap_or_else(|poison| poison.into_inner()).is_empty()
    }
}

//-------------------------------------------------------------------------------------------------------------------


//-------------------------------------------------------------------------------------------------------------------

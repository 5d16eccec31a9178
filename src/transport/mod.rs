//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

mod http;
mod ws;

#[cfg(feature = "transport-default")]
pub use http::ReqwestHttpTransport;
#[cfg(feature = "transport-default")]
pub use ws::{TungsteniteWsConnector, TungsteniteWsTransport};

//-------------------------------------------------------------------------------------------------------------------

/// One-shot JSON POST collaborator. Given a URL and a request body, returns the response body or a transport
/// error. Implementations are expected to be cheap to construct and safe to invoke from a freshly-spawned thread
/// (the core spawns one dispatch worker per outstanding request).
pub trait HttpTransport: Send + Sync + Debug
{
    /// Posts `body` (already-serialized JSON) to `url` with `Content-Type: application/json`, and blocks for the
    /// response body or failure. `timeout` bounds the whole round trip.
    fn post_json(&self, url: &str, body: &str, timeout: Duration) -> Result<String, HttpTransportError>;
}

//-------------------------------------------------------------------------------------------------------------------

/// A duplex frame connection used for the RTT channel. Implementations may back this with a WebSocket or a plain
/// TCP socket. Object-safe (no `Self`-returning constructor) so the core can hold one behind `Box<dyn WsTransport>`
/// without knowing the concrete transport; see [`WsConnector`] for how one gets opened in the first place.
pub trait WsTransport: Send + Debug
{
    /// Sends one text frame. Returns an error if the connection is no longer usable.
    fn send_text(&mut self, frame: &str) -> Result<(), WsTransportError>;

    /// Polls for the next text frame, bounded by an implementation-defined poll interval. Returns `Ok(None)` if
    /// nothing arrived within that interval (the caller is expected to call again), `Ok(Some(frame))` for a
    /// received frame, or `Err(WsTransportError::Closed)` once the connection has ended. Bounding each call is
    /// what lets the receive loop's caller release any lock it holds on this transport between polls, so a
    /// concurrent `close()` isn't stuck waiting behind an indefinitely-blocking read.
    fn recv_text(&mut self) -> Result<Option<String>, WsTransportError>;

    /// Closes the connection. Idempotent; subsequent `recv_text` polls should return `Err(WsTransportError::Closed)`
    /// promptly.
    fn close(&mut self);
}

//-------------------------------------------------------------------------------------------------------------------

/// Opens a [`WsTransport`]. Kept separate from the trait itself because `connect` returns a concrete, sized type
/// (or here, a freshly boxed one) and so isn't object-safe on `WsTransport` directly.
pub trait WsConnector: Send + Sync + Debug
{
    /// Opens the connection. `headers` are presented as connection handshake headers (WebSocket) or ignored by
    /// transports that have no handshake (plain TCP, where auth instead rides in the first frame).
    fn connect(&self, url: &str, headers: &[(String, String)]) -> Result<Box<dyn WsTransport>, WsTransportError>;
}

//-------------------------------------------------------------------------------------------------------------------

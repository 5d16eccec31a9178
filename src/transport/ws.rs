//local shortcuts
use crate::*;

//third-party shortcuts
use tungstenite::client::IntoClientRequest;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

//standard shortcuts
use core::fmt::Debug;
use std::net::TcpStream;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// How long a single `recv_text` poll blocks for before returning `Ok(None)`. Bounds how long
/// `RttChannel::shutdown_and_join` can be stuck waiting to acquire the socket lock behind an in-progress read.
const READ_POLL_TIMEOUT: Duration = Duration::from_millis(200);

/// Default [`WsTransport`] backed by the (synchronous) `tungstenite` crate.
///
/// We deliberately use plain `tungstenite` rather than `tokio-tungstenite`: the RTT engine is a thread/condvar
/// design (receive loop, heartbeat loop, both blocking), not an async task, so a blocking socket is the natural
/// fit and avoids pulling in a tokio runtime for a crate that otherwise has none.
pub struct TungsteniteWsTransport
{
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl Debug for TungsteniteWsTransport
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("TungsteniteWsTransport").finish_non_exhaustive()
    }
}

impl TungsteniteWsTransport
{
    fn connect(url: &str, headers: &[(String, String)]) -> Result<Self, WsTransportError>
    {
        let mut request = url.into_client_request()
            .map_err(|err| WsTransportError::ConnectFailed(err.to_string()))?;

        let request_headers = request.headers_mut();
        for (key, value) in headers
        {
            let Ok(header_value) = HeaderValue::from_str(value) else { continue; };
            let Ok(header_name) = tungstenite::http::HeaderName::try_from(key.as_str()) else { continue; };
            request_headers.insert(header_name, header_value);
        }

        let host = request.uri().host()
            .ok_or_else(|| WsTransportError::ConnectFailed("url is missing a host".to_string()))?;
        let port = request.uri().port_u16()
            .unwrap_or(if request.uri().scheme_str() == Some("wss") { 443 } else { 80 });

        // Connect the raw socket ourselves (rather than letting `tungstenite::connect` do it) so we can set a
        // read timeout before the handshake: without one, a single `recv_text` poll can block indefinitely on an
        // idle connection, which is exactly the window `RttChannel::shutdown_and_join` needs to acquire the
        // socket lock and call `close()`.
        let tcp_stream = TcpStream::connect((host, port))
            .map_err(|err| WsTransportError::ConnectFailed(err.to_string()))?;
        tcp_stream.set_read_timeout(Some(READ_POLL_TIMEOUT))
            .map_err(|err| WsTransportError::ConnectFailed(err.to_string()))?;

        let (socket, _response) = tungstenite::client_tls(request, tcp_stream)
            .map_err(|err| WsTransportError::ConnectFailed(err.to_string()))?;

        Ok(TungsteniteWsTransport{ socket })
    }
}

impl WsTransport for TungsteniteWsTransport
{
    fn send_text(&mut self, frame: &str) -> Result<(), WsTransportError>
    {
        self.socket.send(Message::Text(frame.to_owned().into()))
            .map_err(|err| WsTransportError::SendFailed(err.to_string()))
    }

    fn recv_text(&mut self) -> Result<Option<String>, WsTransportError>
    {
        match self.socket.read()
        {
            Ok(Message::Text(text)) => Ok(Some(text.to_string())),
            Ok(Message::Binary(bytes)) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Ok(Message::Close(_)) => Err(WsTransportError::Closed),
            Ok(_) => Ok(None), // ping/pong/frame: handled internally by tungstenite, poll again
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Err(WsTransportError::Closed),
            Err(tungstenite::Error::Io(io_err)) if matches!(io_err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) =>
            {
                Ok(None) // read timed out with nothing available; not a failure, just nothing to report yet
            }
            Err(err) => Err(WsTransportError::RecvFailed(err.to_string())),
        }
    }

    fn close(&mut self)
    {
        let _ = self.socket.close(None);
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Default [`WsConnector`] that opens connections via [`TungsteniteWsTransport::connect`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteWsConnector;

impl WsConnector for TungsteniteWsConnector
{
    fn connect(&self, url: &str, headers: &[(String, String)]) -> Result<Box<dyn WsTransport>, WsTransportError>
    {
        let transport = TungsteniteWsTransport::connect(url, headers)?;
        Ok(Box::new(transport))
    }
}

//-------------------------------------------------------------------------------------------------------------------

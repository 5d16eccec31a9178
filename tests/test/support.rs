//local shortcuts

//third-party shortcuts
use braincloud_s2s::{HttpTransport, HttpTransportError, WsConnector, WsTransport, WsTransportError};
use serde_json::{json, Value};

//standard shortcuts
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Scripted [`HttpTransport`]: responses are handed out in call order, matching the single-in-flight discipline
/// (`RequestQueue` guarantees there's never more than one call racing another).
#[derive(Debug)]
pub struct FakeHttpTransport
{
    responses: Mutex<VecDeque<Result<String, HttpTransportError>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeHttpTransport
{
    pub fn new(responses: Vec<Result<String, HttpTransportError>>) -> Self
    {
        Self{ responses: Mutex::new(responses.into_iter().collect()), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<String>
    {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpTransport for FakeHttpTransport
{
    fn post_json(&self, _url: &str, body: &str, _timeout: Duration) -> Result<String, HttpTransportError>
    {
        self.requests.lock().unwrap().push(body.to_owned());
        self.responses.lock().unwrap().pop_front()
            .unwrap_or_else(|| Err(HttpTransportError::Other("fake transport exhausted".to_string())))
    }
}

//-------------------------------------------------------------------------------------------------------------------

pub fn ok_envelope(packet_id: i64, data: Value) -> Result<String, HttpTransportError>
{
    Ok(json!({ "packetId": packet_id, "messageResponses": [ { "status": 200, "data": data } ] }).to_string())
}

pub fn error_envelope(packet_id: i64, status: i64, reason_code: Option<i64>) -> Result<String, HttpTransportError>
{
    let mut response = json!({ "status": status });
    if let Some(reason_code) = reason_code
    {
        response["reason_code"] = json!(reason_code);
    }
    Ok(json!({ "packetId": packet_id, "messageResponses": [ response ] }).to_string())
}

//-------------------------------------------------------------------------------------------------------------------

/// Scripted [`WsTransport`]: `inbound` frames are handed out on `recv_text` in order; once exhausted, each poll
/// sleeps briefly and returns `Ok(None)` until `close()` is called, matching the bounded-poll contract real
/// transports use so a concurrent `close()` is never stuck behind an in-progress read.
#[derive(Debug)]
pub struct FakeWsTransport
{
    inbound: Mutex<VecDeque<String>>,
    outbound: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl FakeWsTransport
{
    pub fn new(inbound: Vec<String>) -> Self
    {
        Self{ inbound: Mutex::new(inbound.into_iter().collect()), outbound: Mutex::new(Vec::new()), closed: AtomicBool::new(false) }
    }
}

impl WsTransport for FakeWsTransport
{
    fn send_text(&mut self, frame: &str) -> Result<(), WsTransportError>
    {
        self.outbound.lock().unwrap().push(frame.to_owned());
        Ok(())
    }

    fn recv_text(&mut self) -> Result<Option<String>, WsTransportError>
    {
        if let Some(frame) = self.inbound.lock().unwrap().pop_front()
        {
            return Ok(Some(frame));
        }
        if self.closed.load(Ordering::Acquire)
        {
            return Err(WsTransportError::Closed);
        }
        std::thread::sleep(Duration::from_millis(5));
        Ok(None)
    }

    fn close(&mut self)
    {
        self.closed.store(true, Ordering::Release);
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Scripted [`WsConnector`]: hands its one scripted frame list to the first `connect()` call.
#[derive(Debug)]
pub struct FakeWsConnector
{
    inbound: Mutex<Option<Vec<String>>>,
}

impl FakeWsConnector
{
    pub fn new(inbound: Vec<String>) -> Self
    {
        Self{ inbound: Mutex::new(Some(inbound)) }
    }
}

impl WsConnector for FakeWsConnector
{
    fn connect(&self, _url: &str, _headers: &[(String, String)]) -> Result<Box<dyn WsTransport>, WsTransportError>
    {
        let inbound = self.inbound.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(FakeWsTransport::new(inbound)))
    }
}

/// [`WsConnector`] for tests that never touch RTT: fails loudly if `enable_rtt` is ever actually called.
#[derive(Debug, Default)]
pub struct NullWsConnector;

impl WsConnector for NullWsConnector
{
    fn connect(&self, _url: &str, _headers: &[(String, String)]) -> Result<Box<dyn WsTransport>, WsTransportError>
    {
        Err(WsTransportError::ConnectFailed("RTT not used in this test".to_string()))
    }
}

//-------------------------------------------------------------------------------------------------------------------

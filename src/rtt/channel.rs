//local shortcuts
use crate::callback_pump::CallbackPump;
use crate::common::{operation, service_name};
use crate::rtt::status::{AtomicRttStatus, RttConnectionStatus};
use crate::rtt::subscribers::Subscribers;
use crate::transport::WsTransport;

//third-party shortcuts
use serde_json::{json, Value};

//standard shortcuts
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Result handed to the caller's `enableRtt` connect callback.
pub enum RttConnectOutcome
{
    Success,
    Failure(String),
}

/// One-shot callback for the outcome of an `enableRtt` call.
pub type RttConnectCallback = Box<dyn FnOnce(RttConnectOutcome) + Send>;

/// Wraps a typed [`RttConnectOutcome`] as a pump entry. The pump only knows how to carry `FnOnce(String)`
/// payloads; the outcome is captured in the closure instead of threaded through the string, which exists here
/// purely so ordinary drain bookkeeping (and tests) can see *something* go through the mailbox.
pub(crate) fn enqueue_connect_outcome(pump: &CallbackPump, callback: Option<RttConnectCallback>, outcome: RttConnectOutcome)
{
    let Some(callback) = callback else { return; };
    let marker = match &outcome
    {
        RttConnectOutcome::Success => String::new(),
        RttConnectOutcome::Failure(message) => message.clone(),
    };
    pump.enqueue(Some(Box::new(move |_payload| callback(outcome))), marker);
}

//-------------------------------------------------------------------------------------------------------------------

struct ShutdownState
{
    closing: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownState
{
    fn new() -> Self
    {
        Self{ closing: Mutex::new(false), condvar: Condvar::new() }
    }

    fn request_close(&self)
    {
        *self.closing.lock().unwrap_or_else(|poison| poison.into_inner()) = true;
        self.condvar.notify_all();
    }

    fn is_closing(&self) -> bool
    {
        *self.closing.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Sleeps for `timeout` unless woken early by [`Self::request_close`].
    fn sleep(&self, timeout: Duration)
    {
        let guard = self.closing.lock().unwrap_or_else(|poison| poison.into_inner());
        let _ = self.condvar.wait_timeout_while(guard, timeout, |closing| !*closing);
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A live RTT connection: the CONNECT exchange, the background receive and heartbeat loops, and clean shutdown.
/// Constructed once per successful `enableRtt`; torn down and dropped on `disableRtt`.
pub(crate) struct RttChannel
{
    socket: Mutex<Box<dyn WsTransport>>,
    status: Arc<AtomicRttStatus>,
    connection_id: Arc<Mutex<String>>,
    subscribers: Arc<Subscribers>,
    pump: Arc<CallbackPump>,
    shutdown: Arc<ShutdownState>,
    heartbeat_seconds: Mutex<u64>,
    connect_callback: Mutex<Option<RttConnectCallback>>,
    receive_handle: Mutex<Option<JoinHandle<()>>>,
    heartbeat_handle: Mutex<Option<JoinHandle<()>>>,
}

impl RttChannel
{
    /// Sends the CONNECT frame and spawns the receive loop. `status` is expected to already be `Connecting`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        mut socket: Box<dyn WsTransport>,
        app_id: &str,
        session_id: &str,
        auth: &std::collections::BTreeMap<String, String>,
        protocol: &str,
        default_heartbeat_seconds: u64,
        status: Arc<AtomicRttStatus>,
        connection_id: Arc<Mutex<String>>,
        subscribers: Arc<Subscribers>,
        pump: Arc<CallbackPump>,
        connect_callback: Option<RttConnectCallback>,
    ) -> Result<Arc<Self>, crate::errors::WsTransportError>
    {
        let connect_frame = json!({
                "operation": operation::CONNECT,
                "service": service_name::RTT,
                "data": {
                    "appId": app_id,
                    "profileId": "s",
                    "sessionId": session_id,
                    "auth": auth,
                    "system": { "protocol": protocol, "platform": super::handshake::RTT_PLATFORM },
                },
            }).to_string();

        socket.send_text(&connect_frame)?;

        let channel = Arc::new(Self{
                socket              : Mutex::new(socket),
                status,
                connection_id,
                subscribers,
                pump,
                shutdown            : Arc::new(ShutdownState::new()),
                heartbeat_seconds   : Mutex::new(default_heartbeat_seconds.max(1)),
                connect_callback    : Mutex::new(connect_callback),
                receive_handle      : Mutex::new(None),
                heartbeat_handle    : Mutex::new(None),
            });

        let receive_channel = Arc::clone(&channel);
        let handle = std::thread::spawn(move || receive_channel.run_receive_loop());
        *channel.receive_handle.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(handle);

        Ok(channel)
    }

    fn run_receive_loop(self: Arc<Self>)
    {
        loop
        {
            if self.shutdown.is_closing()
            {
                break;
            }

            // Scoped so the socket lock is released every iteration: `recv_text` polls with a bounded timeout
            // rather than blocking indefinitely, specifically so `shutdown_and_join`'s `close()` call can get the
            // lock between polls instead of waiting behind a read that might never return on its own.
            let frame = { self.socket.lock().unwrap_or_else(|poison| poison.into_inner()).recv_text() };
            let text = match frame
            {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(_) => break,
            };

            let Ok(message) = serde_json::from_str::<Value>(&text) else { continue; };
            self.process_message(&message, &text);
        }

        self.on_receive_loop_exited();
    }

    fn process_message(self: &Arc<Self>, message: &Value, raw_text: &str)
    {
        let service = message.get("service").and_then(Value::as_str).unwrap_or_default();
        let op = message.get("operation").and_then(Value::as_str).unwrap_or_default();

        if service == service_name::RTT && op == operation::CONNECT
        {
            self.on_connect_reply(message);
            return;
        }
        if service == service_name::RTT && op == operation::DISCONNECT
        {
            // The loop exits naturally on the next empty read once the server closes the socket; nothing further
            // to do here beyond what logging would record.
            return;
        }

        self.subscribers.dispatch(&self.pump, service, raw_text.to_owned());
    }

    fn on_connect_reply(self: &Arc<Self>, message: &Value)
    {
        let data = message.get("data").cloned().unwrap_or(Value::Null);
        let heartbeat_seconds = data.get("heartbeatSeconds").and_then(Value::as_u64).unwrap_or(30).max(1);
        let connection_id = data.get("cxId").and_then(Value::as_str).unwrap_or_default().to_owned();

        *self.heartbeat_seconds.lock().unwrap_or_else(|poison| poison.into_inner()) = heartbeat_seconds;
        *self.connection_id.lock().unwrap_or_else(|poison| poison.into_inner()) = connection_id;

        let heartbeat_channel = Arc::clone(self);
        let handle = std::thread::spawn(move || heartbeat_channel.run_heartbeat_loop());
        *self.heartbeat_handle.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(handle);

        self.status.store(RttConnectionStatus::Connected);

        let callback = self.connect_callback.lock().unwrap_or_else(|poison| poison.into_inner()).take();
        enqueue_connect_outcome(&self.pump, callback, RttConnectOutcome::Success);
    }

    fn run_heartbeat_loop(self: Arc<Self>)
    {
        loop
        {
            let seconds = *self.heartbeat_seconds.lock().unwrap_or_else(|poison| poison.into_inner());
            self.shutdown.sleep(Duration::from_secs(seconds));

            if self.shutdown.is_closing() || self.status.load() != RttConnectionStatus::Connected
            {
                break;
            }

            let frame = json!({ "operation": operation::HEARTBEAT, "service": service_name::RTT }).to_string();
            let sent = self.socket.lock().unwrap_or_else(|poison| poison.into_inner()).send_text(&frame);
            if sent.is_err()
            {
                break;
            }
        }
    }

    fn on_receive_loop_exited(self: &Arc<Self>)
    {
        if self.status.load() != RttConnectionStatus::Disconnecting
        {
            // The remote end closed (or the socket failed) without us asking: if we never finished the CONNECT
            // handshake, report a connect failure; otherwise just drop to Disconnected.
            self.status.store(RttConnectionStatus::Disconnected);
            let callback = self.connect_callback.lock().unwrap_or_else(|poison| poison.into_inner()).take();
            enqueue_connect_outcome(&self.pump, callback, RttConnectOutcome::Failure("Connection closed".to_string()));
        }
        self.shutdown.request_close();
    }

    /// Closes the transport and joins both background threads. Safe to call from `disableRtt`; the caller is
    /// responsible for only calling this once per successfully-opened channel (the owning [`RttService`] enforces
    /// that by taking the channel slot before calling in).
    pub(crate) fn shutdown_and_join(&self)
    {
        self.shutdown.request_close();
        self.socket.lock().unwrap_or_else(|poison| poison.into_inner()).close();

        if let Some(handle) = self.receive_handle.lock().unwrap_or_else(|poison| poison.into_inner()).take()
        {
            let _ = handle.join();
        }
        if let Some(handle) = self.heartbeat_handle.lock().unwrap_or_else(|poison| poison.into_inner()).take()
        {
            let _ = handle.join();
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

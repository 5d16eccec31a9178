//local shortcuts
use crate::callback_pump::CallbackPump;
use crate::common::{parse_response_envelope, response_is_ok, service_name};
use crate::config::ContextConfig;
use crate::rtt::channel::{enqueue_connect_outcome, RttChannel, RttConnectCallback, RttConnectOutcome};
use crate::rtt::handshake::{build_ws_url, choose_endpoint, parse_auth, parse_endpoints};
use crate::rtt::status::{AtomicRttStatus, RttConnectionStatus};
use crate::rtt::subscribers::{SubscriberCallback, Subscribers};
use crate::session::S2SSession;
use crate::transport::WsConnector;

//third-party shortcuts
use serde_json::json;

//standard shortcuts
use std::sync::{Arc, Mutex};

//-------------------------------------------------------------------------------------------------------------------

/// Public handle to the RTT channel for a [`Context`](crate::Context). Obtained via
/// [`Context::rtt_service`](crate::Context::rtt_service); one per Context, shared for its lifetime.
pub struct RttService
{
    session: Arc<S2SSession>,
    connector: Arc<dyn WsConnector>,
    config: ContextConfig,
    pump: Arc<CallbackPump>,
    status: Arc<AtomicRttStatus>,
    connection_id: Arc<Mutex<String>>,
    subscribers: Arc<Subscribers>,
    channel: Mutex<Option<Arc<RttChannel>>>,
}

impl RttService
{
    pub(crate) fn new(session: Arc<S2SSession>, connector: Arc<dyn WsConnector>, config: ContextConfig, pump: Arc<CallbackPump>) -> Arc<Self>
    {
        Arc::new(Self{
                session,
                connector,
                config,
                pump,
                status          : Arc::new(AtomicRttStatus::new(RttConnectionStatus::Disconnected)),
                connection_id   : Arc::new(Mutex::new(String::new())),
                subscribers     : Arc::new(Subscribers::new()),
                channel         : Mutex::new(None),
            })
    }

    /// Requests an event-server endpoint from the dispatcher and opens the RTT channel. A no-op if the channel
    /// isn't currently `Disconnected`.
    pub fn enable_rtt(self: &Arc<Self>, connect_callback: Option<RttConnectCallback>, use_websocket: bool)
    {
        if self.status.load() != RttConnectionStatus::Disconnected
        {
            return;
        }
        self.status.store(RttConnectionStatus::Connecting);

        let this = Arc::clone(self);
        let registration = json!({
                "service": service_name::RTT_REGISTRATION,
                "operation": crate::common::operation::REQUEST_SYSTEM_CONNECTION,
            });

        self.session.request(&registration.to_string(), Some(Box::new(move |payload| {
            this.on_registration_result(&payload, connect_callback, use_websocket);
        })));
    }

    fn on_registration_result(self: &Arc<Self>, payload: &str, connect_callback: Option<RttConnectCallback>, use_websocket: bool)
    {
        let Some((_packet_id, message)) = parse_response_envelope(payload) else
        {
            self.fail_connect(connect_callback, "Malformed json".to_string());
            return;
        };
        if !response_is_ok(&message)
        {
            self.fail_connect(connect_callback, message.to_string());
            return;
        }

        let data = message.get("data").cloned().unwrap_or(serde_json::Value::Null);
        let endpoints = parse_endpoints(&data);
        let auth = parse_auth(&data);

        let Some(endpoint) = choose_endpoint(&endpoints, use_websocket) else
        {
            self.fail_connect(connect_callback, "No endpoint available".to_string());
            return;
        };

        let protocol = if use_websocket { "ws" } else { "tcp" };
        let (url, headers) = build_ws_url(endpoint, &auth);

        let socket = match self.connector.connect(&url, &headers)
        {
            Ok(socket) => socket,
            Err(_) =>
            {
                self.fail_connect(connect_callback, format!("Failed to connect to RTT Event server: {}:{}", endpoint.host, endpoint.port));
                return;
            }
        };

        let opened = RttChannel::open(
            socket,
            self.session.app_id(),
            &self.session.session_id(),
            &auth,
            protocol,
            self.config.rtt_default_heartbeat.as_secs(),
            Arc::clone(&self.status),
            Arc::clone(&self.connection_id),
            Arc::clone(&self.subscribers),
            Arc::clone(&self.pump),
            connect_callback,
        );

        match opened
        {
            Ok(channel) => { *self.channel.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(channel); }
            Err(_) =>
            {
                self.status.store(RttConnectionStatus::Disconnected);
                // The connect callback already travelled into `RttChannel::open`'s failed attempt to send the
                // CONNECT frame; nothing queued it since construction never completed, so there is nothing left
                // to notify here beyond resetting status.
            }
        }
    }

    fn fail_connect(&self, connect_callback: Option<RttConnectCallback>, message: String)
    {
        self.status.store(RttConnectionStatus::Disconnected);
        enqueue_connect_outcome(&self.pump, connect_callback, RttConnectOutcome::Failure(message));
    }

    /// Tears down the RTT channel. Idempotent: calling twice leaves status `Disconnected` both times.
    pub fn disable_rtt(self: &Arc<Self>)
    {
        self.disable_rtt_inner(false);
    }

    /// As [`Self::disable_rtt`], but also clears every registered subscriber.
    pub fn disable_rtt_and_deregister_all(self: &Arc<Self>)
    {
        self.disable_rtt_inner(true);
    }

    fn disable_rtt_inner(self: &Arc<Self>, deregister_all: bool)
    {
        let channel = self.channel.lock().unwrap_or_else(|poison| poison.into_inner()).take();
        if let Some(channel) = channel
        {
            self.status.store(RttConnectionStatus::Disconnecting);
            channel.shutdown_and_join();
        }
        if deregister_all
        {
            self.subscribers.deregister_all();
        }
        *self.connection_id.lock().unwrap_or_else(|poison| poison.into_inner()) = String::new();
        self.status.store(RttConnectionStatus::Disconnected);
    }

    pub fn register_rtt_callback(&self, service_name: impl Into<String>, callback: SubscriberCallback)
    {
        self.subscribers.register(service_name, callback);
    }

    pub fn deregister_rtt_callback(&self, service_name: &str)
    {
        self.subscribers.deregister(service_name);
    }

    pub fn deregister_all_rtt_callbacks(&self)
    {
        self.subscribers.deregister_all();
    }

    pub fn get_rtt_enabled(&self) -> bool
    {
        self.status.load() == RttConnectionStatus::Connected
    }

    pub fn get_connection_status(&self) -> RttConnectionStatus
    {
        self.status.load()
    }

    pub fn get_rtt_connection_id(&self) -> String
    {
        self.connection_id.lock().unwrap_or_else(|poison| poison.into_inner()).clone()
    }
}

//-------------------------------------------------------------------------------------------------------------------

//local shortcuts
use crate::callback_pump::{CallbackPump, ResultCallback};
use crate::common::{local_error_str, operation, parse_response_envelope, response_is_ok, response_reason_code, service_name, SERVER_SESSION_EXPIRED};
use crate::config::ContextConfig;
use crate::request_queue::{Request, RequestPayload, RequestQueue};
use crate::session::state::{AuthenticatedState, SessionState};
use crate::transport::HttpTransport;

//third-party shortcuts
use serde_json::{json, Value};

//standard shortcuts
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

//-------------------------------------------------------------------------------------------------------------------

/// The S2S session engine: authentication, serialized request dispatch with packet sequencing, heartbeat
/// maintenance, and session-expiry recovery. Owned by a [`Context`](crate::Context); never constructed directly by
/// callers.
pub(crate) struct S2SSession
{
    app_id: String,
    server_name: String,
    server_secret: String,
    url: String,
    auto_auth: bool,
    config: ContextConfig,
    transport: Arc<dyn HttpTransport>,
    pump: Arc<CallbackPump>,
    queue: RequestQueue,
    state: Mutex<SessionState>,
}

impl S2SSession
{
    pub(crate) fn new(
        app_id: String,
        server_name: String,
        server_secret: String,
        url: String,
        auto_auth: bool,
        config: ContextConfig,
        transport: Arc<dyn HttpTransport>,
        pump: Arc<CallbackPump>,
    ) -> Self
    {
        Self{
                app_id,
                server_name,
                server_secret,
                url,
                auto_auth,
                config,
                transport,
                pump,
                queue: RequestQueue::new(),
                state: Mutex::new(SessionState::Disconnected),
            }
    }

    pub(crate) fn app_id(&self) -> &str { &self.app_id }
    pub(crate) fn server_name(&self) -> &str { &self.server_name }
    pub(crate) fn server_secret(&self) -> &str { &self.server_secret }
    pub(crate) fn url(&self) -> &str { &self.url }

    pub(crate) fn session_id(&self) -> String
    {
        let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.authenticated().map(|a| a.session_id.clone()).unwrap_or_default()
    }

    pub(crate) fn is_authenticated(&self) -> bool
    {
        let state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        state.authenticated().is_some()
    }

    //-----------------------------------------------------------------------------------------------------------

    /// Kicks off authentication. Fails immediately (via the pump) unless the session is currently `Disconnected`.
    pub(crate) fn authenticate(self: &Arc<Self>, callback: Option<ResultCallback>)
    {
        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        if !state.is_disconnected()
        {
            drop(state);
            self.pump.enqueue(callback, local_error_str("Already authenticated or authenticating"));
            return;
        }

        *state = SessionState::Authenticating;
        let became_head = self.queue.push_back(Request{
                payload     : RequestPayload::Authenticate,
                callback,
                retried     : false,
                is_heartbeat: false,
            });
        drop(state);

        if became_head
        {
            self.dispatch_head();
        }
    }

    /// Blocking variant of [`Self::authenticate`]: polls `run_callbacks` every `sync_poll_interval` until the
    /// callback fires or `sync_call_timeout` elapses.
    pub(crate) fn authenticate_sync(self: &Arc<Self>) -> String
    {
        self.call_sync("Authenticate timeout", |session, cb| session.authenticate(Some(cb)))
    }

    /// Submits a user request. `user_json` must be valid JSON text; malformed input fails locally without
    /// contacting the dispatcher.
    pub(crate) fn request(self: &Arc<Self>, user_json: &str, callback: Option<ResultCallback>)
    {
        let payload: Value = match serde_json::from_str(user_json)
        {
            Ok(value) => value,
            Err(_) =>
            {
                self.pump.enqueue(callback, local_error_str("Failed to parse user json"));
                return;
            }
        };
        self.submit(payload, callback, false, false);
    }

    /// Blocking variant of [`Self::request`].
    pub(crate) fn request_sync(self: &Arc<Self>, user_json: &str) -> String
    {
        let user_json = user_json.to_owned();
        self.call_sync("Request timeout", move |session, cb| session.request(&user_json, Some(cb)))
    }

    /// If `Authenticated` and the heartbeat deadline has passed, enqueues a heartbeat request and re-arms the
    /// deadline. Then drains the shared callback pump (which also carries RTT callbacks, since the RTT channel
    /// enqueues onto the same pump) for up to `min(timeout, time-left-until-heartbeat)`.
    pub(crate) fn run_callbacks(self: &Arc<Self>, timeout: Duration)
    {
        let mut fire_heartbeat = false;
        let mut wait = timeout;

        {
            let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            if let SessionState::Authenticated(authed) = &mut *state
            {
                let now = Instant::now();
                if now >= authed.heartbeat_deadline
                {
                    authed.heartbeat_deadline = now + Duration::from_millis(authed.heartbeat_interval_ms);
                    fire_heartbeat = true;
                }
                else
                {
                    wait = wait.min(authed.heartbeat_deadline.saturating_duration_since(now));
                }
            }
        }

        if fire_heartbeat
        {
            let heartbeat = json!({ "service": service_name::HEARTBEAT, "operation": operation::HEARTBEAT });
            self.submit(heartbeat, None, true, false);
        }

        self.pump.drain(wait);
    }

    /// Transitions to `Disconnected` and drops every queued request without invoking its callback — the spec's
    /// "pending callbacks are not cancelled but will no longer fire" rule.
    pub(crate) fn disconnect(self: &Arc<Self>)
    {
        {
            let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            *state = SessionState::Disconnected;
        }
        let _ = self.queue.drain_all();
    }

    //-----------------------------------------------------------------------------------------------------------

    /// Shared plumbing for `request`/`run_callbacks`(heartbeat)/expiry-retry: under `autoAuth`, a request arriving
    /// while `Disconnected` triggers authentication first (atomically, so a concurrent caller can't slip a message
    /// in ahead of the auth packet); the request itself is always appended afterward.
    fn submit(self: &Arc<Self>, payload: Value, callback: Option<ResultCallback>, is_heartbeat: bool, retried: bool)
    {
        {
            let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            if state.is_disconnected() && self.auto_auth
            {
                *state = SessionState::Authenticating;
                let auth_became_head = self.queue.push_back(Request{
                        payload     : RequestPayload::Authenticate,
                        callback    : None,
                        retried     : false,
                        is_heartbeat: false,
                    });
                drop(state);
                if auth_became_head
                {
                    self.dispatch_head();
                }
            }
        }

        let became_head = self.queue.push_back(Request{
                payload: RequestPayload::UserMessage(payload),
                callback,
                retried,
                is_heartbeat,
            });
        if became_head
        {
            self.dispatch_head();
        }
    }

    /// Renders the wire body for whatever is currently at the head of the queue (assigning/incrementing `packetId`
    /// for an authenticated user message at this instant, not at submission) and spawns a one-shot dispatch
    /// worker. A no-op if the queue is empty, or if the head is a user message but the session isn't yet
    /// authenticated (it will be redispatched once authentication completes).
    fn dispatch_head(self: &Arc<Self>)
    {
        let plan = {
            let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            let Some(payload) = self.queue.front_payload() else { return; };
            match payload
            {
                RequestPayload::Authenticate => Some((self.build_auth_body(), true)),
                RequestPayload::UserMessage(message) => match &mut *state
                {
                    SessionState::Authenticated(authed) =>
                    {
                        let body = json!({
                                "packetId": authed.packet_id,
                                "sessionId": authed.session_id,
                                "messages": [message],
                            }).to_string();
                        authed.packet_id += 1;
                        Some((body, false))
                    }
                    _ => None,
                },
            }
        };

        let Some((body, is_authenticate)) = plan else { return; };

        let session = Arc::clone(self);
        let transport = Arc::clone(&self.transport);
        let url = self.url.clone();
        let timeout = self.config.http_request_timeout;

        std::thread::spawn(move || {
            let result = transport.post_json(&url, &body, timeout);
            if is_authenticate
            {
                session.handle_auth_result(result);
            }
            else
            {
                session.handle_user_result(result);
            }
        });
    }

    fn build_auth_body(&self) -> String
    {
        json!({
                "packetId": 0,
                "messages": [ {
                    "service": service_name::AUTHENTICATION,
                    "operation": operation::AUTHENTICATE,
                    "data": {
                        "appId": self.app_id,
                        "serverName": self.server_name,
                        "serverSecret": self.server_secret,
                    },
                } ],
            }).to_string()
    }

    fn handle_auth_result(self: &Arc<Self>, result: Result<String, crate::errors::HttpTransportError>)
    {
        let outcome = match result
        {
            Err(err) => Err(local_error_str(&err.to_string())),
            Ok(body) => match parse_response_envelope(&body)
            {
                None => Err(local_error_str("Malformed json")),
                Some((packet_id, message)) =>
                {
                    if response_is_ok(&message) { Ok((packet_id, message)) } else { Err(message.to_string()) }
                }
            },
        };

        match outcome
        {
            Ok((packet_id, message)) =>
            {
                self.adopt_authenticated(packet_id, &message);
                let (completed, more_pending) = self.queue.complete_front();
                if let Some(request) = completed
                {
                    self.pump.enqueue(request.callback, message.to_string());
                }
                if more_pending
                {
                    self.dispatch_head();
                }
            }
            Err(error_payload) =>
            {
                {
                    let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
                    *state = SessionState::Disconnected;
                }
                // Fan-out: snapshot every queued request (the failed auth packet plus anything queued behind it)
                // and notify each once with the auth error. The auth requester is not double-notified: its
                // callback lives at index 0 of this same drain, so it fires exactly once, here.
                for request in self.queue.drain_all()
                {
                    self.pump.enqueue(request.callback, error_payload.clone());
                }
            }
        }
    }

    fn adopt_authenticated(&self, packet_id: i64, message: &Value)
    {
        let data = message.get("data").cloned().unwrap_or(Value::Null);
        let session_id = data.get("sessionId").and_then(Value::as_str).unwrap_or_default().to_owned();
        let heartbeat_interval_ms = data.get("heartbeatSeconds")
            .and_then(Value::as_u64)
            .map(|secs| secs.saturating_mul(1000))
            .unwrap_or(self.config.default_heartbeat_interval.as_millis() as u64);

        let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
        *state = SessionState::Authenticated(AuthenticatedState{
                session_id,
                packet_id: packet_id + 1,
                heartbeat_interval_ms,
                heartbeat_deadline: Instant::now() + Duration::from_millis(heartbeat_interval_ms),
            });
    }

    fn handle_user_result(self: &Arc<Self>, result: Result<String, crate::errors::HttpTransportError>)
    {
        let (completed, _) = self.queue.complete_front();
        let Some(request) = completed else { return; };

        match result
        {
            Ok(body) => match parse_response_envelope(&body)
            {
                Some((_packet_id, message)) => self.finish_user_request(request, Ok(message)),
                None => self.finish_user_request(request, Err(local_error_str("Malformed json"))),
            },
            Err(err) => self.finish_user_request(request, Err(local_error_str(&err.to_string()))),
        }
    }

    fn finish_user_request(self: &Arc<Self>, mut request: Request, outcome: Result<Value, String>)
    {
        match outcome
        {
            Ok(message) if response_is_ok(&message) =>
            {
                self.pump.enqueue(request.callback, message.to_string());
                self.dispatch_head();
            }
            Ok(message) if response_reason_code(&message) == Some(SERVER_SESSION_EXPIRED) && !request.retried =>
            {
                self.retry_after_expiry(request, message);
            }
            Ok(message) =>
            {
                let is_heartbeat = request.is_heartbeat;
                self.pump.enqueue(request.callback, message.to_string());
                if is_heartbeat { self.disconnect(); } else { self.dispatch_head(); }
            }
            Err(error_payload) =>
            {
                let is_heartbeat = request.is_heartbeat;
                self.pump.enqueue(request.callback.take(), error_payload);
                if is_heartbeat { self.disconnect(); } else { self.dispatch_head(); }
            }
        }
    }

    /// Session-expiry recovery: drop to `Disconnected`. Under `autoAuth` this transparently re-authenticates and
    /// re-submits the original request exactly once. Without `autoAuth` there is no one to re-authenticate the
    /// session, and a plain re-queue would sit at the head of the queue forever (a `UserMessage` never dispatches
    /// while `Disconnected`), so the expiry is surfaced to the caller verbatim instead.
    fn retry_after_expiry(self: &Arc<Self>, mut request: Request, message: Value)
    {
        {
            let mut state = self.state.lock().unwrap_or_else(|poison| poison.into_inner());
            *state = SessionState::Disconnected;
        }

        if !self.auto_auth
        {
            let is_heartbeat = request.is_heartbeat;
            self.pump.enqueue(request.callback.take(), message.to_string());
            if is_heartbeat { self.disconnect(); } else { self.dispatch_head(); }
            return;
        }

        let payload = match &request.payload
        {
            RequestPayload::UserMessage(value) => value.clone(),
            RequestPayload::Authenticate => Value::Null, // unreachable: auth itself never carries a reason_code retry
        };
        let callback = request.callback.take();
        let is_heartbeat = request.is_heartbeat;
        self.submit(payload, callback, is_heartbeat, true);
    }

    fn call_sync(self: &Arc<Self>, timeout_message: &'static str, submit: impl FnOnce(&Arc<Self>, ResultCallback)) -> String
    {
        let outcome: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let outcome_for_callback = Arc::clone(&outcome);
        let callback: ResultCallback = Box::new(move |payload| {
            *outcome_for_callback.lock().unwrap_or_else(|poison| poison.into_inner()) = Some(payload);
        });

        submit(self, callback);

        let deadline = Instant::now() + self.config.sync_call_timeout;
        loop
        {
            self.run_callbacks(self.config.sync_poll_interval);

            if let Some(payload) = outcome.lock().unwrap_or_else(|poison| poison.into_inner()).take()
            {
                return payload;
            }
            if Instant::now() >= deadline
            {
                return local_error_str(timeout_message);
            }
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

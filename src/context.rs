//local shortcuts
use crate::callback_pump::CallbackPump;
use crate::common::S2S_VERSION;
use crate::config::ContextConfig;
use crate::errors::ContextCreationError;
use crate::logging::{log_enabled, set_log_enabled, SecretRedactingLayer};
use crate::rtt::RttService;
use crate::session::S2SSession;
use crate::transport::{HttpTransport, WsConnector};

#[cfg(feature = "transport-default")]
use crate::transport::{ReqwestHttpTransport, TungsteniteWsConnector};

//third-party shortcuts

//standard shortcuts
use std::sync::Arc;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Entry point of this crate: one S2S session plus its RTT channel, sharing a single callback mailbox.
///
/// Construct with [`Context::create`] (pulls in the bundled `reqwest`/`tungstenite` transports, behind the
/// `transport-default` feature) or [`Context::create_with_transports`] to bring your own [`HttpTransport`] and
/// [`WsConnector`]. Every `Context` method is safe to call from any thread; callbacks only ever run on whichever
/// thread calls [`Context::run_callbacks`] (or one of the `*_sync` variants, which drive it internally).
///
/// Dropping a `Context` disables RTT (joining its background threads) before the session itself is torn down, so
/// by the time `drop` returns, [`RttService::get_connection_status`] would have reported `Disconnected` had anyone
/// still been able to ask.
pub struct Context
{
    session: Arc<S2SSession>,
    rtt: Arc<RttService>,
    pump: Arc<CallbackPump>,
}

impl Context
{
    /// Creates a context using the bundled `reqwest` HTTP transport and `tungstenite` WebSocket connector.
    #[cfg(feature = "transport-default")]
    pub fn create(
        app_id: impl Into<String>,
        server_name: impl Into<String>,
        server_secret: impl Into<String>,
        url: impl Into<String>,
        auto_auth: bool,
    ) -> Result<Arc<Context>, ContextCreationError>
    {
        Self::create_with_config(app_id, server_name, server_secret, url, auto_auth, ContextConfig::default())
    }

    /// As [`Self::create`], with a non-default [`ContextConfig`].
    #[cfg(feature = "transport-default")]
    pub fn create_with_config(
        app_id: impl Into<String>,
        server_name: impl Into<String>,
        server_secret: impl Into<String>,
        url: impl Into<String>,
        auto_auth: bool,
        config: ContextConfig,
    ) -> Result<Arc<Context>, ContextCreationError>
    {
        Self::create_with_transports(
            app_id,
            server_name,
            server_secret,
            url,
            auto_auth,
            config,
            Arc::new(ReqwestHttpTransport),
            Arc::new(TungsteniteWsConnector),
        )
    }

    /// Creates a context with caller-supplied transports. This is the only constructor available without the
    /// `transport-default` feature, and the one test code should use with fakes.
    #[allow(clippy::too_many_arguments)]
    pub fn create_with_transports(
        app_id: impl Into<String>,
        server_name: impl Into<String>,
        server_secret: impl Into<String>,
        url: impl Into<String>,
        auto_auth: bool,
        config: ContextConfig,
        transport: Arc<dyn HttpTransport>,
        connector: Arc<dyn WsConnector>,
    ) -> Result<Arc<Context>, ContextCreationError>
    {
        let app_id = app_id.into();
        let server_name = server_name.into();
        let url = url.into();

        if app_id.is_empty() { return Err(ContextCreationError::EmptyAppId); }
        if server_name.is_empty() { return Err(ContextCreationError::EmptyServerName); }
        if url.is_empty() { return Err(ContextCreationError::EmptyUrl); }

        let pump = Arc::new(CallbackPump::new());
        let session = Arc::new(S2SSession::new(
            app_id,
            server_name,
            server_secret.into(),
            url,
            auto_auth,
            config.clone(),
            transport,
            Arc::clone(&pump),
        ));
        let rtt = RttService::new(Arc::clone(&session), connector, config, Arc::clone(&pump));

        tracing::debug!(app_id = session.app_id(), "context created");
        Ok(Arc::new(Context{ session, rtt, pump }))
    }

    //-----------------------------------------------------------------------------------------------------------

    pub fn get_app_id(&self) -> &str { self.session.app_id() }
    pub fn get_server_name(&self) -> &str { self.session.server_name() }
    pub fn get_server_secret(&self) -> &str { self.session.server_secret() }
    pub fn get_server_url(&self) -> &str { self.session.url() }
    pub fn get_session_id(&self) -> String { self.session.session_id() }
    pub fn get_s2s_version(&self) -> &'static str { S2S_VERSION }
    pub fn is_authenticated(&self) -> bool { self.session.is_authenticated() }

    /// Handle to the RTT channel. One per `Context`, shared for its lifetime.
    pub fn rtt_service(&self) -> &Arc<RttService> { &self.rtt }

    //-----------------------------------------------------------------------------------------------------------

    /// Authenticates against the dispatcher. A no-op (reported via `callback`) if already authenticated or
    /// authenticating.
    pub fn authenticate(self: &Arc<Self>, callback: Option<crate::callback_pump::ResultCallback>)
    {
        self.session.authenticate(callback);
    }

    /// Blocking variant of [`Self::authenticate`].
    pub fn authenticate_sync(self: &Arc<Self>) -> String
    {
        self.session.authenticate_sync()
    }

    /// Submits a user request. Under `autoAuth`, authenticates first if necessary.
    pub fn request(self: &Arc<Self>, user_json: &str, callback: Option<crate::callback_pump::ResultCallback>)
    {
        self.session.request(user_json, callback);
    }

    /// Blocking variant of [`Self::request`].
    pub fn request_sync(self: &Arc<Self>, user_json: &str) -> String
    {
        self.session.request_sync(user_json)
    }

    /// Drains the shared callback mailbox (S2S and RTT callbacks alike), maintaining the S2S heartbeat along the
    /// way. Call this periodically from whichever thread should run callbacks (a game's main loop, typically).
    pub fn run_callbacks(self: &Arc<Self>, timeout: Duration)
    {
        self.session.run_callbacks(timeout);
    }

    /// Tears down the S2S session (and, transitively, RTT if still enabled). Safe to call more than once.
    pub fn disconnect(self: &Arc<Self>)
    {
        self.rtt.disable_rtt();
        self.session.disconnect();
    }

    //-----------------------------------------------------------------------------------------------------------

    /// Enables or disables payload-bearing `trace!` log events crate-wide. Lifecycle events at `debug` and above
    /// are unaffected; filter those at the subscriber as usual.
    pub fn set_log_enabled(enabled: bool)
    {
        set_log_enabled(enabled);
    }

    pub fn get_log_enabled() -> bool
    {
        log_enabled()
    }

    /// Builds a [`SecretRedactingLayer`] that appends formatted log lines to `path`, for installation onto the
    /// caller's own `tracing_subscriber::Registry`. The crate never installs a global subscriber itself.
    pub fn enable_file_logging(path: impl AsRef<std::path::Path>) -> std::io::Result<SecretRedactingLayer>
    {
        let sink = crate::logging::FileSink::create(path)?;
        Ok(SecretRedactingLayer::new(Arc::new(sink)))
    }
}

impl Drop for Context
{
    fn drop(&mut self)
    {
        // Parent-owns-children: tear down RTT (joining its background threads) before the session. The session
        // itself has no background threads beyond short-lived per-request dispatch workers, which detach on their
        // own, so nothing further needs joining here.
        self.rtt.disable_rtt_and_deregister_all();
        tracing::debug!(app_id = self.session.app_id(), "context dropped");
    }
}

//-------------------------------------------------------------------------------------------------------------------

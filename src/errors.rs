//local shortcuts

//third-party shortcuts
use thiserror::Error;

//standard shortcuts

//-------------------------------------------------------------------------------------------------------------------

/// Errors produced by an [`HttpTransport`](crate::HttpTransport) implementation.
#[derive(Debug, Error)]
pub enum HttpTransportError
{
    #[error("Operation timed out")]
    TimedOut,
    #[error("transport error: {0}")]
    Other(String),
}

//-------------------------------------------------------------------------------------------------------------------

/// Errors produced by a [`WsTransport`](crate::WsTransport) implementation.
#[derive(Debug, Error)]
pub enum WsTransportError
{
    #[error("failed to connect: {0}")]
    ConnectFailed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    RecvFailed(String),
    #[error("connection closed")]
    Closed,
}

//-------------------------------------------------------------------------------------------------------------------

/// Errors returned by [`Context::create`](crate::Context::create) for malformed constructor inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextCreationError
{
    #[error("appId must not be empty")]
    EmptyAppId,
    #[error("serverName must not be empty")]
    EmptyServerName,
    #[error("url must not be empty")]
    EmptyUrl,
}

//-------------------------------------------------------------------------------------------------------------------

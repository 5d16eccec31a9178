//documentation
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![allow(rustdoc::redundant_explicit_links)]
#![doc = include_str!("../README.md")]

//module tree
mod callback_pump;
mod common;
mod config;
mod context;
mod errors;
mod logging;
mod request_queue;
mod rtt;
mod session;
mod transport;

//API exports
pub use callback_pump::ResultCallback;
pub use common::{operation, service_name, DEFAULT_S2S_URL, S2S_VERSION};
pub use config::ContextConfig;
pub use context::Context;
pub use errors::{ContextCreationError, HttpTransportError, WsTransportError};
pub use logging::{set_log_enabled, FileSink, LogSink, SecretRedactingLayer, StderrSink};
pub use rtt::{RttConnectCallback, RttConnectOutcome, RttConnectionStatus, RttService, SubscriberCallback};
pub use transport::{HttpTransport, WsConnector, WsTransport};

#[cfg(feature = "transport-default")]
pub use transport::{ReqwestHttpTransport, TungsteniteWsConnector, TungsteniteWsTransport};

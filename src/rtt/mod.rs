//local shortcuts

//third-party shortcuts

//standard shortcuts

//-------------------------------------------------------------------------------------------------------------------

mod channel;
mod handshake;
mod service;
mod status;
mod subscribers;

pub use channel::{RttConnectCallback, RttConnectOutcome};
pub use service::RttService;
pub use status::RttConnectionStatus;
pub use subscribers::SubscriberCallback;

//-------------------------------------------------------------------------------------------------------------------

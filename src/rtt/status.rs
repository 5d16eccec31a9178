//local shortcuts

//third-party shortcuts

//standard shortcuts
use std::sync::atomic::{AtomicU8, Ordering};

//-------------------------------------------------------------------------------------------------------------------

/// Connection status of the RTT channel. Readable at any time; only ever transitioned by the RTT engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RttConnectionStatus
{
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl RttConnectionStatus
{
    fn to_tag(self) -> u8
    {
        match self
        {
            RttConnectionStatus::Disconnected  => 0,
            RttConnectionStatus::Connecting    => 1,
            RttConnectionStatus::Connected     => 2,
            RttConnectionStatus::Disconnecting => 3,
        }
    }

    fn from_tag(tag: u8) -> RttConnectionStatus
    {
        match tag
        {
            1 => RttConnectionStatus::Connecting,
            2 => RttConnectionStatus::Connected,
            3 => RttConnectionStatus::Disconnecting,
            _ => RttConnectionStatus::Disconnected,
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Atomic holder for [`RttConnectionStatus`], so `get_connection_status` never needs to take a lock.
#[derive(Debug)]
pub(crate) struct AtomicRttStatus(AtomicU8);

impl AtomicRttStatus
{
    pub(crate) fn new(initial: RttConnectionStatus) -> Self
    {
        Self(AtomicU8::new(initial.to_tag()))
    }

    pub(crate) fn load(&self) -> RttConnectionStatus
    {
        RttConnectionStatus::from_tag(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, status: RttConnectionStatus)
    {
        self.0.store(status.to_tag(), Ordering::Release);
    }
}

//-------------------------------------------------------------------------------------------------------------------

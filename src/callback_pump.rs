//local shortcuts

//third-party shortcuts
use crossbeam::channel::{self, Receiver, Sender};

//standard shortcuts
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// A one-shot result callback. Invoked at most once, from inside [`CallbackPump::drain`] on the caller's thread.
pub type ResultCallback = Box<dyn FnOnce(String) + Send>;

//-------------------------------------------------------------------------------------------------------------------

struct PumpEntry
{
    callback: Option<ResultCallback>,
    payload: String,
}

/// Thread-safe mailbox of `(callback, payload)` pairs, backed by an unbounded crossbeam channel.
///
/// `enqueue` is non-blocking and wakes anyone parked in `drain`. `drain` blocks up to a timeout for at least one
/// item, then dispatches every entry currently sitting in the channel. Callbacks run on the calling thread only,
/// never from inside `enqueue`, so a callback is free to call back into the pump (e.g. to submit a new request)
/// without deadlocking.
pub(crate) struct CallbackPump
{
    sender: Sender<PumpEntry>,
    receiver: Receiver<PumpEntry>,
}

impl CallbackPump
{
    pub(crate) fn new() -> Self
    {
        let (sender, receiver) = channel::unbounded();
        Self{ sender, receiver }
    }

    /// Enqueues a callback/payload pair. A `None` callback is accepted and silently dropped once drained, per spec
    /// (callers may submit fire-and-forget requests).
    pub(crate) fn enqueue(&self, callback: Option<ResultCallback>, payload: String)
    {
        // The receiver lives as long as `self`, so the channel is never disconnected from the sender's side.
        let _ = self.sender.send(PumpEntry{ callback, payload });
    }

    /// Blocks up to `timeout` waiting for at least one queued entry (or to be woken by a concurrent `enqueue`),
    /// then dispatches every entry currently queued. Returns the number of callbacks invoked.
    pub(crate) fn drain(&self, timeout: Duration) -> usize
    {
        let mut entries = Vec::new();

        if timeout.is_zero()
        {
            while let Ok(entry) = self.receiver.try_recv()
            {
                entries.push(entry);
            }
        }
        else if let Ok(first) = self.receiver.recv_timeout(timeout)
        {
            entries.push(first);
            while let Ok(entry) = self.receiver.try_recv()
            {
                entries.push(entry);
            }
        }

        let count = entries.len();
        for entry in entries
        {
            if let Some(callback) = entry.callback
            {
                callback(entry.payload);
            }
        }
        count
    }
}

//-------------------------------------------------------------------------------------------------------------------


//-------------------------------------------------------------------------------------------------------------------

//! Bounded FIFO of prefetched quotes.
//!
//! `QuoteQueue` is a cloneable handle over a `crossbeam_channel::bounded` channel. The
//! channel provides all synchronization: producers and consumers on any thread can push,
//! pop and inspect the depth without external locking, the length never exceeds the
//! capacity, and entries leave in the order they were accepted.
//!
//! Producers that must not lose a quote use `push_until`, which blocks while the queue
//! is full (backpressure) but wakes up as soon as the given cancellation channel fires.
//! The request path only ever uses `try_pop` and never waits.
use crossbeam_channel::{Receiver, Select, Sender, TrySendError, bounded};
use quote_common::{Quote, QuoteError};

use crate::result::Result;

/// Shared, fixed-capacity queue of quotes.
#[derive(Clone)]
pub struct QuoteQueue {
    tx: Sender<Quote>,
    rx: Receiver<Quote>,
    capacity: usize,
}

impl QuoteQueue {
    /// Create a queue holding at most `capacity` quotes. Zero is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(QuoteError::Config("queue capacity must be at least 1".into()).into());
        }
        let (tx, rx) = bounded(capacity);
        Ok(Self { tx, rx, capacity })
    }

    /// Enqueue without waiting. A full queue hands the quote back.
    pub fn try_push(&self, quote: Quote) -> std::result::Result<(), Quote> {
        self.tx.try_send(quote).map_err(|e| match e {
            TrySendError::Full(quote) | TrySendError::Disconnected(quote) => quote,
        })
    }

    /// Enqueue, waiting for space until `cancel` receives a message or disconnects.
    ///
    /// Returns the quote back when cancelled before it could be stored.
    pub fn push_until(&self, quote: Quote, cancel: &Receiver<()>) -> std::result::Result<(), Quote> {
        let quote = match self.try_push(quote) {
            Ok(()) => return Ok(()),
            Err(quote) => quote,
        };
        let mut sel = Select::new();
        let send_index = sel.send(&self.tx);
        sel.recv(cancel);
        let oper = sel.select();
        if oper.index() == send_index {
            oper.send(&self.tx, quote).map_err(|e| e.into_inner())
        } else {
            let _ = oper.recv(cancel);
            Err(quote)
        }
    }

    /// Dequeue the oldest quote, if any. Never blocks.
    pub fn try_pop(&self) -> Option<Quote> {
        self.rx.try_recv().ok()
    }

    /// Remove and return everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<Quote> {
        self.rx.try_iter().collect()
    }

    /// Current number of queued quotes.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// `true` when no quote is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Maximum number of queued quotes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

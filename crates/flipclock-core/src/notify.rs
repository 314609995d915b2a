//! In-process publish/subscribe.
//!
//! Publishers push notifications onto one channel per subscriber; consumers
//! drain their [`Subscription`] whenever they get control. Nothing is called
//! back synchronously, so a publisher can hold a mutable borrow of itself
//! while publishing without a subscriber ever re-entering it.

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

/// Fan-out of `T` to every live subscriber.
#[derive(Debug)]
pub struct Notifier<T> {
    subscribers: RefCell<Vec<Sender<T>>>,
}

impl<T: Clone> Notifier<T> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Register a new subscriber. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        Subscription { rx }
    }

    /// Deliver `message` to every subscriber, pruning the ones that hung up.
    pub fn publish(&self, message: &T) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(message.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<T: Clone> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`Notifier`].
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Next pending notification, if any.
    pub fn try_next(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All notifications queued since the last drain.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

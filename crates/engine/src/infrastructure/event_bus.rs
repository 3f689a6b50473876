//! In-process publish/subscribe for game events.
//!
//! Every subscriber owns a bounded mailbox. Publishing never waits: when a
//! mailbox is full the event is dropped for that subscriber only and a
//! warning is logged. Freshness of game state wins over completeness, so
//! there is no retry and no ordering guarantee across subscribers.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use mudmind_domain::{ActionEvent, PlayerMessage};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Event categories subscribers register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Action,
    PlayerMessage,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => f.write_str("ActionEvent"),
            Self::PlayerMessage => f.write_str("PlayerMessageEvent"),
        }
    }
}

/// An event as carried on the bus. Payloads are shared, never copied.
#[derive(Debug, Clone)]
pub enum GameEvent {
    Action(Arc<ActionEvent>),
    PlayerMessage(Arc<PlayerMessage>),
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Action(_) => EventKind::Action,
            Self::PlayerMessage(_) => EventKind::PlayerMessage,
        }
    }
}

pub type Mailbox = mpsc::Sender<GameEvent>;
pub type MailboxReceiver = mpsc::Receiver<GameEvent>;

/// Create a bounded mailbox for `EventBus::subscribe`.
pub fn mailbox(capacity: usize) -> (Mailbox, MailboxReceiver) {
    mpsc::channel(capacity.max(1))
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<EventKind, Vec<Mailbox>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: EventKind, mailbox: Mailbox) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.entry(kind).or_default().push(mailbox);
        tracing::debug!(event_kind = %kind, "Subscriber registered");
    }

    /// Deliver `event` to every mailbox registered for its kind.
    ///
    /// Returns the number of mailboxes that accepted it.
    pub fn publish(&self, event: GameEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        let mut saw_closed = false;

        {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let Some(mailboxes) = subscribers.get(&kind) else {
                tracing::trace!(event_kind = %kind, "No subscribers for event");
                return 0;
            };

            for mailbox in mailboxes {
                match mailbox.try_send(event.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(event_kind = %kind, "Dropping event, subscriber mailbox is full");
                    }
                    Err(TrySendError::Closed(_)) => saw_closed = true,
                }
            }
        }

        if saw_closed {
            self.prune_closed(kind);
        }

        delivered
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    /// Drop every mailbox registered for `kind`. Consumers see their mailbox
    /// close once they have drained what was already delivered.
    pub fn unsubscribe_all(&self, kind: EventKind) -> usize {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
            .map_or(0, |mailboxes| mailboxes.len());
        tracing::debug!(event_kind = %kind, removed, "Unsubscribed all mailboxes");
        removed
    }

    fn prune_closed(&self, kind: EventKind) {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mailboxes) = subscribers.get_mut(&kind) {
            let before = mailboxes.len();
            mailboxes.retain(|m| !m.is_closed());
            tracing::debug!(
                event_kind = %kind,
                removed = before - mailboxes.len(),
                "Removed closed subscriber mailboxes"
            );
        }
    }
}

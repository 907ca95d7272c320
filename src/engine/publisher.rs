//! Publish-on-change delivery of the current game.
//!
//! Subscribers register a callback and are called with the latest value
//! every time the engine commits a change, and once on subscription with
//! whatever is current. Callbacks run synchronously, in subscription order,
//! before the engine operation returns.

use std::fmt;

use crate::core::Game;

/// Handle returned by [`StatePublisher::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

type Callback = Box<dyn FnMut(Option<&Game>)>;

/// Holds the latest published game and the callbacks watching it.
#[derive(Default)]
pub struct StatePublisher {
    latest: Option<Game>,
    subscribers: Vec<(SubscriptionId, Callback)>,
    next_id: u64,
}

impl StatePublisher {
    /// Publisher with nothing published.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It is called immediately with the current value.
    pub fn subscribe<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(Option<&Game>) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        callback(self.latest.as_ref());
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    /// Replace the current value and notify every subscriber.
    pub fn publish(&mut self, game: Option<Game>) {
        self.latest = game;
        for (_, callback) in &mut self.subscribers {
            callback(self.latest.as_ref());
        }
    }

    /// Last published value.
    #[must_use]
    pub fn latest(&self) -> Option<&Game> {
        self.latest.as_ref()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for StatePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePublisher")
            .field("latest", &self.latest.as_ref().map(Game::id))
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameId, GameState};
    use chrono::Utc;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn game(id: &str) -> Game {
        Game::new(GameState::new(GameId::new(id), Default::default(), Utc::now()))
    }

    fn recorder(publisher: &mut StatePublisher) -> (SubscriptionId, Rc<RefCell<Vec<Option<GameId>>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = publisher.subscribe(move |g| sink.borrow_mut().push(g.map(|g| g.id().clone())));
        (id, seen)
    }

    #[test]
    fn test_subscribe_receives_current() {
        let mut publisher = StatePublisher::new();
        publisher.publish(Some(game("a")));

        let (_, seen) = recorder(&mut publisher);
        assert_eq!(*seen.borrow(), vec![Some(GameId::new("a"))]);
    }

    #[test]
    fn test_publish_notifies_all() {
        let mut publisher = StatePublisher::new();
        let (_, first) = recorder(&mut publisher);
        let (_, second) = recorder(&mut publisher);

        publisher.publish(Some(game("a")));
        publisher.publish(None);

        let expected = vec![None, Some(GameId::new("a")), None];
        assert_eq!(*first.borrow(), expected);
        assert_eq!(*second.borrow(), expected);
        assert!(publisher.latest().is_none());
    }

    #[test]
    fn test_unsubscribe() {
        let mut publisher = StatePublisher::new();
        let (id, seen) = recorder(&mut publisher);

        assert!(publisher.unsubscribe(id));
        assert!(!publisher.unsubscribe(id));
        assert_eq!(publisher.subscriber_count(), 0);

        publisher.publish(Some(game("a")));
        assert_eq!(seen.borrow().len(), 1);
    }
}

//! Topic-based event bus implementation.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::BattleEvent;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Battle start and end
    Lifecycle,
    /// Turn hand-over, input requests and turn completion
    Turn,
    /// Hits, echoes, charge, dual-state and deaths
    Combat,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Lifecycle, Topic::Turn, Topic::Combat];

    /// Topic a battle event is routed to.
    pub fn of(event: &BattleEvent) -> Self {
        match event {
            BattleEvent::BattleStarted { .. } | BattleEvent::BattleEnded { .. } => Topic::Lifecycle,
            BattleEvent::TurnStarted { .. }
            | BattleEvent::InputRequested { .. }
            | BattleEvent::ActionFinished { .. } => Topic::Turn,
            BattleEvent::EchoTriggered { .. }
            | BattleEvent::ActionResolved { .. }
            | BattleEvent::ActionRejected { .. }
            | BattleEvent::ChargeChanged { .. }
            | BattleEvent::DualStateActivated { .. }
            | BattleEvent::DualStateEnded { .. }
            | BattleEvent::CombatantDied { .. } => Topic::Combat,
        }
    }
}

/// Battle event stamped with the frame that produced it.
///
/// `sequence` counts every event the worker published, across all topics, so
/// a consumer reading several topics can restore publication order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub frame: u64,
    pub sequence: u64,
    pub payload: BattleEvent,
}

impl Event {
    pub fn new(frame: u64, sequence: u64, payload: BattleEvent) -> Self {
        Self {
            frame,
            sequence,
            payload,
        }
    }

    pub fn topic(&self) -> Topic {
        Topic::of(&self.payload)
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks: events sent while a
/// topic has no subscribers are dropped.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity.max(1)).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if let Some(tx) = self.channels.get(&topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.channels.get(&topic) {
            Some(tx) => tx.subscribe(),
            // Every topic is created up front; a fresh closed-off channel keeps
            // the signature infallible.
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

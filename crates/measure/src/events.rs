//! Pointer input and typed change notifications.

use std::sync::mpsc::{self, Receiver, Sender};

use glam::DVec3;
use kurbo::Point;

use crate::measurement::MeasurementId;
use crate::viewport::ViewportId;

// ============================================================================
// Pointer input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary ("data") button
    Data,
    /// Secondary ("reset") button
    Reset,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Mouse,
    Touch,
    Unknown,
}

/// One button press as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonEvent {
    pub world_point: DVec3,
    pub view_point: Point,
    pub button: MouseButton,
    pub source: InputSource,
    pub viewport_id: ViewportId,
}

impl ButtonEvent {
    pub fn data(world_point: DVec3, view_point: Point, viewport_id: ViewportId) -> Self {
        Self {
            world_point,
            view_point,
            button: MouseButton::Data,
            source: InputSource::Mouse,
            viewport_id,
        }
    }
}

/// Answer of a measurement (or the manager) to a button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEventResult {
    NotHandled,
    /// `consumed: false` lets the next handler see the same event
    Handled { consumed: bool },
}

impl ButtonEventResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, ButtonEventResult::Handled { .. })
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self, ButtonEventResult::Handled { consumed: true })
    }
}

// ============================================================================
// Change notifications
// ============================================================================

/// Identifies one tool session
pub type SessionId = u64;

/// Who asked for a removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOrigin {
    User,
    Tool(SessionId),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementEvent {
    Added { ids: Vec<MeasurementId> },
    Removed { ids: Vec<MeasurementId>, origin: RemovalOrigin },
}

/// Publish side of a typed notification channel.
///
/// Each subscriber gets its own queue; a dropped [`Subscription`] is pruned
/// on the next emit.
#[derive(Debug)]
pub struct EventChannel<E> {
    subscribers: Vec<Subscriber<E>>,
    next_id: u64,
}

/// Only events passing the filter are queued for the subscriber
type EventFilter<E> = fn(&E) -> bool;

struct Subscriber<E> {
    id: u64,
    sender: Sender<E>,
    filter: Option<EventFilter<E>>,
}

impl<E> std::fmt::Debug for Subscriber<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
        }
    }
}

/// Receive side handed out by [`EventChannel::subscribe`]
#[derive(Debug)]
pub struct Subscription<E> {
    id: u64,
    receiver: Receiver<E>,
}

impl<E> Subscription<E> {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Everything emitted since the last drain, oldest first
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }
}

impl<E: Clone> EventChannel<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Subscription<E> {
        self.add_subscriber(None)
    }

    /// Subscribe to the events `filter` accepts; the rest are never queued
    pub fn subscribe_filtered(&mut self, filter: EventFilter<E>) -> Subscription<E> {
        self.add_subscriber(Some(filter))
    }

    fn add_subscriber(&mut self, filter: Option<EventFilter<E>>) -> Subscription<E> {
        let (sender, receiver) = mpsc::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, sender, filter });
        Subscription { id, receiver }
    }

    pub fn unsubscribe(&mut self, subscription: Subscription<E>) {
        self.subscribers.retain(|s| s.id != subscription.id);
    }

    pub fn emit(&mut self, event: E) {
        self.subscribers.retain(|s| match s.filter {
            Some(accepts) if !accepts(&event) => true,
            _ => s.sender.send(event.clone()).is_ok(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

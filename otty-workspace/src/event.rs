use flume::{Receiver, Sender, TryRecvError, TrySendError};

use crate::model::ProjectId;

/// Change notifications published by the store after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    /// A new project was created.
    Added { id: ProjectId },
    /// An existing project was added again: it is pinned and touched.
    Reopened { id: ProjectId },
    Removed { id: ProjectId },
    PinToggled { id: ProjectId, pinned: bool },
    Selected { id: ProjectId },
    /// `last_opened_at` was refreshed without a selection change.
    Touched { id: ProjectId },
    /// Unpinned projects dropped by the recents cap.
    Evicted { ids: Vec<ProjectId> },
}

/// Error returned when receiving from a subscription fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventRecvError {
    Disconnected,
}

/// Error returned when a non-blocking receive fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventTryRecvError {
    Empty,
    Disconnected,
}

/// Receiving end of a store subscription.
#[derive(Debug)]
pub struct WorkspaceEvents {
    receiver: Receiver<WorkspaceEvent>,
}

impl WorkspaceEvents {
    /// Blocking receive.
    pub fn recv(&self) -> Result<WorkspaceEvent, EventRecvError> {
        self.receiver
            .recv()
            .map_err(|_| EventRecvError::Disconnected)
    }

    /// Non-blocking receive.
    pub fn try_recv(&self) -> Result<WorkspaceEvent, EventTryRecvError> {
        self.receiver.try_recv().map_err(|err| match err {
            TryRecvError::Empty => EventTryRecvError::Empty,
            TryRecvError::Disconnected => EventTryRecvError::Disconnected,
        })
    }

    /// Take every event queued so far without blocking.
    pub fn drain(&self) -> Vec<WorkspaceEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Fan-out of events to every live subscriber.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<WorkspaceEvent>>,
}

impl Subscribers {
    /// Register a subscriber; `capacity` of `None` means unbounded.
    pub(crate) fn subscribe(
        &mut self,
        capacity: Option<usize>,
    ) -> WorkspaceEvents {
        let (sender, receiver) = match capacity {
            Some(cap) => flume::bounded(cap),
            None => flume::unbounded(),
        };
        self.senders.push(sender);
        WorkspaceEvents { receiver }
    }

    /// Deliver `event` to every subscriber, pruning the ones that hung up.
    pub(crate) fn publish(&mut self, event: WorkspaceEvent) {
        self.senders.retain(|sender| match sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                log::warn!(
                    "workspace subscriber is full, dropping {dropped:?}"
                );
                true
            },
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

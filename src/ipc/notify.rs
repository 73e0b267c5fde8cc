//! IPC Notifications - Port death and other notifications
//!
//! Based on Mach4 ipc/ipc_notify.c
//!
//! The capability space does not deliver notifications itself. When a
//! right goes away the right manager reports it to a [`Notifier`], passing
//! the pending request index the entry carried; turning that into a
//! message is the notifier's business.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use spin::Mutex;

use super::entry::PortRequestIndex;
use super::ipc_object::IpcObjectId;
use super::space::SpaceId;
use super::MachPortName;

// ============================================================================
// Notification Types
// ============================================================================

/// Types of port notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NotifyType {
    /// Port was destroyed (dead name notification)
    DeadName = 0x0041,
    /// No more send rights exist (no-senders notification)
    NoSenders = 0x0046,
    /// Right under a watched name was deleted
    PortDeleted = 0x0048,
}

impl NotifyType {
    /// Get message ID for this notification type
    pub fn msg_id(self) -> i32 {
        self as i32
    }
}

/// One notification to deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub notify_type: NotifyType,
    /// Space the watched name lives in
    pub space_id: SpaceId,
    /// The watched name
    pub name: MachPortName,
    /// Request index the entry carried (0 for no-senders)
    pub request: PortRequestIndex,
    /// The object concerned
    pub object: IpcObjectId,
}

impl Notification {
    pub fn port_deleted(
        space_id: SpaceId,
        name: MachPortName,
        request: PortRequestIndex,
        object: IpcObjectId,
    ) -> Self {
        Self {
            notify_type: NotifyType::PortDeleted,
            space_id,
            name,
            request,
            object,
        }
    }

    pub fn dead_name(
        space_id: SpaceId,
        name: MachPortName,
        request: PortRequestIndex,
        object: IpcObjectId,
    ) -> Self {
        Self {
            notify_type: NotifyType::DeadName,
            space_id,
            name,
            request,
            object,
        }
    }

    pub fn no_senders(space_id: SpaceId, name: MachPortName, object: IpcObjectId) -> Self {
        Self {
            notify_type: NotifyType::NoSenders,
            space_id,
            name,
            request: 0,
            object,
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Receives notifications emitted by the right manager
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Queues notifications for later delivery
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<Notification> {
        self.pending.lock().pop_front()
    }

    /// Take everything queued so far
    pub fn drain(&self) -> Vec<Notification> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Notifier for NotificationQueue {
    fn notify(&self, notification: Notification) {
        log::trace!(
            "{}: {:?} for {:#x}",
            notification.space_id,
            notification.notify_type,
            notification.name
        );
        self.pending.lock().push_back(notification);
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_fifo() {
        let queue = NotificationQueue::new();
        let obj = IpcObjectId::new(1);
        queue.notify(Notification::port_deleted(SpaceId(1), 4, 2, obj));
        queue.notify(Notification::no_senders(SpaceId(1), 5, obj));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().notify_type, NotifyType::PortDeleted);
        let rest = queue.drain();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].request, 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_msg_ids() {
        assert_eq!(NotifyType::DeadName.msg_id(), 0x41);
        assert_eq!(NotifyType::NoSenders.msg_id(), 0x46);
    }
}

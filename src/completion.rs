//! Single-shot completion channel between a file picker and the shim
//!
//! The picker owns a [`Completion`] and answers through it exactly once;
//! `complete` consumes it, so a second answer for the same request cannot be
//! expressed. The shim holds the matching [`PendingSelection`].

use crate::log_filter::FRONTEND;
use crate::resource::ResourceHandle;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};

/// Android `Activity.RESULT_OK`
pub const RESULT_OK: i32 = -1;
/// Android `Activity.RESULT_CANCELED`
pub const RESULT_CANCELED: i32 = 0;

/// How the chooser closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Ok,
    Canceled,
    Failed(i32),
}

impl ResultStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            RESULT_OK => ResultStatus::Ok,
            RESULT_CANCELED => ResultStatus::Canceled,
            other => ResultStatus::Failed(other),
        }
    }

    pub fn is_ok(self) -> bool {
        self == ResultStatus::Ok
    }
}

/// The chooser's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub status: ResultStatus,
    pub handle: Option<ResourceHandle>,
}

impl Selection {
    pub fn picked(handle: ResourceHandle) -> Self {
        Self {
            status: ResultStatus::Ok,
            handle: Some(handle),
        }
    }

    pub fn canceled() -> Self {
        Self {
            status: ResultStatus::Canceled,
            handle: None,
        }
    }
}

/// Sender half, handed to the picker
#[derive(Debug)]
pub struct Completion {
    sender: SyncSender<Selection>,
}

/// Receiver half, kept by whoever issued the request
#[derive(Debug)]
pub struct PendingSelection {
    receiver: Receiver<Selection>,
}

/// Create a linked completion/pending pair with room for exactly one answer
pub fn channel() -> (Completion, PendingSelection) {
    let (sender, receiver) = sync_channel(1);
    (Completion { sender }, PendingSelection { receiver })
}

impl Completion {
    pub fn complete(self, selection: Selection) {
        // Buffer of one and a single send, so this never blocks
        if self.sender.send(selection).is_err() {
            log::debug!(target: FRONTEND, "Selection delivered after the request was abandoned");
        }
    }

    pub fn cancel(self) {
        self.complete(Selection::canceled());
    }
}

impl PendingSelection {
    /// Take the answer if the picker has delivered one.
    ///
    /// A picker that dropped its [`Completion`] without answering counts as a
    /// cancellation.
    pub fn try_take(&self) -> Option<Selection> {
        match self.receiver.try_recv() {
            Ok(selection) => Some(selection),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Selection::canceled()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_activity_result_codes() {
        assert_eq!(ResultStatus::from_code(-1), ResultStatus::Ok);
        assert_eq!(ResultStatus::from_code(0), ResultStatus::Canceled);
        assert_eq!(ResultStatus::from_code(1), ResultStatus::Failed(1));
    }

    #[test]
    fn pending_until_completed() {
        let (completion, pending) = channel();
        assert_eq!(pending.try_take(), None);

        completion.complete(Selection::picked(ResourceHandle::new("/games/a.3ds")));
        assert_eq!(
            pending.try_take(),
            Some(Selection::picked(ResourceHandle::new("/games/a.3ds")))
        );
    }

    #[test]
    fn dropped_completion_reads_as_cancel() {
        let (completion, pending) = channel();
        drop(completion);
        assert_eq!(pending.try_take(), Some(Selection::canceled()));
    }

    #[test]
    fn completing_abandoned_request_is_harmless() {
        let (completion, pending) = channel();
        drop(pending);
        completion.complete(Selection::canceled());
    }

    #[test]
    fn answered_from_another_thread() {
        let (completion, pending) = channel();
        std::thread::spawn(move || {
            completion.complete(Selection::picked(ResourceHandle::new("/games/b.cia")));
        })
        .join()
        .unwrap();

        let selection = pending.try_take().unwrap();
        assert_eq!(selection.handle, Some(ResourceHandle::new("/games/b.cia")));
    }
}

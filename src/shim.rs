//! Launcher shim - bridges one file selection to one native `Load` call
//!
//! ```text
//! user gesture -> request_file_selection -> chooser -> Completion
//!     -> poll / on_selection_complete -> resolve -> Load(path)
//! ```
//!
//! Failures never reach the user: every completion ends in a
//! [`SelectionOutcome`] and a log line, and `Load` runs only for a path that
//! resolved.

use crate::completion::{self, PendingSelection, ResultStatus, Selection};
use crate::entry_point::EntryPoint;
use crate::log_filter::FRONTEND;
use crate::picker::{DocumentRequest, FilePicker, PickerError};
use crate::resolver::{PathResolver, ResolveError};
use crate::resource::{ResourceHandle, SelectedResource};

/// Result of handling one chooser completion
#[derive(Debug)]
pub enum SelectionOutcome {
    /// The chooser was cancelled or reported failure
    Cancelled(ResultStatus),
    /// The chooser succeeded but returned no document
    NoResource,
    /// The document could not be turned into a local path; `Load` was not called
    Unresolved(ResolveError),
    /// `Load` was called once with `path`
    Loaded(SelectedResource),
}

impl SelectionOutcome {
    pub fn loaded_path(&self) -> Option<&str> {
        match self {
            SelectionOutcome::Loaded(resource) => Some(&resource.path),
            _ => None,
        }
    }
}

pub struct LauncherShim<R, E> {
    resolver: R,
    entry_point: E,
    request: DocumentRequest,
    pending: Option<PendingSelection>,
}

impl<R: PathResolver, E: EntryPoint> LauncherShim<R, E> {
    pub fn new(resolver: R, entry_point: E) -> Self {
        Self {
            resolver,
            entry_point,
            request: DocumentRequest::default(),
            pending: None,
        }
    }

    pub fn with_request(mut self, request: DocumentRequest) -> Self {
        self.request = request;
        self
    }

    pub fn request_mut(&mut self) -> &mut DocumentRequest {
        &mut self.request
    }

    pub fn entry_point(&self) -> &E {
        &self.entry_point
    }

    /// True while a chooser is open and has not answered yet
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Show the chooser. A second request while one is outstanding is ignored.
    pub fn request_file_selection(&mut self, picker: &mut dyn FilePicker) -> Result<(), PickerError> {
        if self.pending.is_some() {
            log::warn!(target: FRONTEND, "File selection already in progress, ignoring request");
            return Ok(());
        }

        let (completion, pending) = completion::channel();
        self.pending = Some(pending);

        log::info!(
            target: FRONTEND,
            "Requesting document selection (request code {}, type {})",
            self.request.request_code,
            self.request.mime_type
        );

        if let Err(e) = picker.open_document(&self.request, completion) {
            log::error!(target: FRONTEND, "{}", e);
            self.pending = None;
            return Err(e);
        }
        Ok(())
    }

    /// Handle the chooser's answer if it has arrived
    pub fn poll(&mut self) -> Option<SelectionOutcome> {
        let selection = self.pending.as_ref()?.try_take()?;
        self.pending = None;
        let Selection { status, handle } = selection;
        Some(self.on_selection_complete(status, handle))
    }

    /// Completion callback: resolve the handle and call `Load` at most once
    pub fn on_selection_complete(
        &mut self,
        status: ResultStatus,
        handle: Option<ResourceHandle>,
    ) -> SelectionOutcome {
        if !status.is_ok() {
            log::info!(target: FRONTEND, "Document selection ended without a result: {:?}", status);
            return SelectionOutcome::Cancelled(status);
        }

        let Some(handle) = handle else {
            log::info!(target: FRONTEND, "Document selection returned no resource");
            return SelectionOutcome::NoResource;
        };

        match self.resolver.resolve(&handle) {
            Ok(path) => {
                log::info!(target: FRONTEND, "Selected {} -> {}", handle, path);
                self.entry_point.load(&path);
                SelectionOutcome::Loaded(SelectedResource { handle, path })
            }
            Err(e) => {
                log::warn!(target: FRONTEND, "Could not resolve {}: {}", handle, e);
                SelectionOutcome::Unresolved(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Completion;

    struct FixedResolver;

    impl PathResolver for FixedResolver {
        fn resolve(&self, handle: &ResourceHandle) -> Result<String, ResolveError> {
            match handle.as_str() {
                "content://ok" => Ok("/games/ok.3ds".to_string()),
                other => Err(ResolveError::UnsupportedScheme(other.to_string())),
            }
        }
    }

    /// Holds on to the completion like a platform callback would
    #[derive(Default)]
    struct DeferredPicker {
        completion: Option<Completion>,
        opened: usize,
    }

    impl FilePicker for DeferredPicker {
        fn open_document(
            &mut self,
            _request: &DocumentRequest,
            completion: Completion,
        ) -> Result<(), PickerError> {
            self.opened += 1;
            self.completion = Some(completion);
            Ok(())
        }
    }

    struct BrokenPicker;

    impl FilePicker for BrokenPicker {
        fn open_document(
            &mut self,
            _request: &DocumentRequest,
            _completion: Completion,
        ) -> Result<(), PickerError> {
            Err(PickerError::Unavailable("no activity".to_string()))
        }
    }

    #[test]
    fn second_request_while_pending_is_ignored() {
        let mut shim = LauncherShim::new(FixedResolver, |_: &str| {});
        let mut picker = DeferredPicker::default();

        shim.request_file_selection(&mut picker).unwrap();
        shim.request_file_selection(&mut picker).unwrap();

        assert_eq!(picker.opened, 1);
        assert!(shim.is_pending());
        assert!(shim.poll().is_none());
    }

    #[test]
    fn poll_processes_deferred_answer_once() {
        let mut loads = Vec::new();
        {
            let mut shim = LauncherShim::new(FixedResolver, |p: &str| loads.push(p.to_string()));
            let mut picker = DeferredPicker::default();
            shim.request_file_selection(&mut picker).unwrap();

            picker
                .completion
                .take()
                .unwrap()
                .complete(Selection::picked(ResourceHandle::new("content://ok")));

            let outcome = shim.poll().unwrap();
            assert_eq!(outcome.loaded_path(), Some("/games/ok.3ds"));
            assert!(!shim.is_pending());
            assert!(shim.poll().is_none());
        }
        assert_eq!(loads, vec!["/games/ok.3ds".to_string()]);
    }

    #[test]
    fn picker_failure_clears_pending_request() {
        let mut shim = LauncherShim::new(FixedResolver, |_: &str| {});
        assert!(shim.request_file_selection(&mut BrokenPicker).is_err());
        assert!(!shim.is_pending());
    }

    #[test]
    fn failed_status_is_cancelled() {
        let mut shim = LauncherShim::new(FixedResolver, |_: &str| panic!("Load must not run"));
        let outcome = shim.on_selection_complete(
            ResultStatus::Failed(3),
            Some(ResourceHandle::new("content://ok")),
        );
        assert!(matches!(outcome, SelectionOutcome::Cancelled(ResultStatus::Failed(3))));
    }
}

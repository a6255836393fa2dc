//! File picker seam - the platform's "open document" affordance

use crate::completion::Completion;
use std::path::PathBuf;
use thiserror::Error;

/// Request code used for the open-document activity
pub const READ_REQUEST_CODE: i32 = 42;
/// Any document type
pub const ANY_DOCUMENT: &str = "*/*";

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("File chooser unavailable: {0}")]
    Unavailable(String),
    #[error("Failed to start file chooser: {0}")]
    LaunchFailed(String),
}

/// What to ask the chooser for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub request_code: i32,
    pub mime_type: String,
    /// Directory the chooser opens in, where the platform supports it
    pub start_dir: Option<PathBuf>,
    /// Extension filters offered on desktop, as (label, extensions)
    pub filters: Vec<(String, Vec<String>)>,
}

impl Default for DocumentRequest {
    fn default() -> Self {
        Self {
            request_code: READ_REQUEST_CODE,
            mime_type: ANY_DOCUMENT.to_string(),
            start_dir: None,
            filters: Vec::new(),
        }
    }
}

impl DocumentRequest {
    pub fn with_start_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.start_dir = dir;
        self
    }

    /// Offer a named extension filter before the catch-all
    pub fn with_filter(mut self, label: &str, extensions: &[&str]) -> Self {
        self.filters.push((
            label.to_string(),
            extensions.iter().map(|e| e.to_string()).collect(),
        ));
        self
    }
}

/// A platform file chooser.
///
/// `open_document` shows the chooser and arranges for `completion` to be
/// answered once it closes, either before returning (blocking dialogs) or
/// later from a platform callback.
pub trait FilePicker {
    fn open_document(
        &mut self,
        request: &DocumentRequest,
        completion: Completion,
    ) -> Result<(), PickerError>;
}

/// Native desktop dialog via `rfd`. Blocks until the user closes it.
#[cfg(feature = "desktop")]
#[derive(Debug, Default)]
pub struct DialogPicker;

#[cfg(feature = "desktop")]
impl FilePicker for DialogPicker {
    fn open_document(
        &mut self,
        request: &DocumentRequest,
        completion: Completion,
    ) -> Result<(), PickerError> {
        use crate::completion::{ResultStatus, Selection};
        use crate::log_filter::FRONTEND;
        use crate::resource::ResourceHandle;

        let mut dialog = rfd::FileDialog::new().set_title("Open game");
        for (label, extensions) in &request.filters {
            dialog = dialog.add_filter(label.as_str(), extensions.as_slice());
        }
        dialog = dialog.add_filter("All files", &["*"]);

        if let Some(ref dir) = request.start_dir {
            dialog = dialog.set_directory(dir);
        }

        match dialog.pick_file() {
            Some(path) => match ResourceHandle::from_path(&path) {
                Ok(handle) => completion.complete(Selection::picked(handle)),
                Err(e) => {
                    log::warn!(target: FRONTEND, "Ignoring picked file: {}", e);
                    completion.complete(Selection {
                        status: ResultStatus::Ok,
                        handle: None,
                    });
                }
            },
            None => completion.cancel(),
        }
        Ok(())
    }
}

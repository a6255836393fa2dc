//! Citra launcher
//!
//! Presents an "open game" action, resolves the document the user picked to
//! a local path and hands it to the native emulator core's `Load` entry point.
//! The desktop frontend lives in `main.rs`/`ui`; the Android frontend is the
//! `citra-launcher-android` JNI crate.

pub mod completion;
pub mod config;
pub mod entry_point;
pub mod log_filter;
pub mod logging;
pub mod picker;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod shim;

pub use completion::{Completion, PendingSelection, ResultStatus, Selection};
pub use config::LauncherConfig;
pub use entry_point::{EntryPoint, NativeCore};
pub use picker::{DocumentRequest, FilePicker};
pub use resolver::{CanonicalResolver, PathResolver, ResolveError};
pub use resource::{ResourceHandle, SelectedResource};
pub use session::{Checkout, LauncherSession};
pub use shim::{LauncherShim, SelectionOutcome};

/// Extension filters offered by desktop choosers ahead of "All files"
pub const GAME_EXTENSIONS: &[&str] = &["3ds", "3dsx", "cci", "cxi", "cia", "app", "elf", "axf"];

//! Native entry point - the one call into the emulator core
//!
//! The core exports `void Load(const char* path)`. Whatever it does with the
//! path, including failing, is its own business: nothing comes back.

use crate::log_filter::CORE;
use libloading::Library;
use std::ffi::{c_char, CString};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default exported symbol name
pub const DEFAULT_ENTRY_SYMBOL: &str = "Load";

/// C signature of the core's entry point
pub type LoadFn = unsafe extern "C" fn(path: *const c_char);

#[derive(Error, Debug)]
pub enum EntryPointError {
    #[error("Failed to open native core {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        source: libloading::Error,
    },
    #[error("Entry point `{symbol}` not found: {source}")]
    MissingSymbol {
        symbol: String,
        source: libloading::Error,
    },
}

/// `Load(path: string) -> void`
pub trait EntryPoint {
    fn load(&mut self, path: &str);
}

impl<F> EntryPoint for F
where
    F: FnMut(&str),
{
    fn load(&mut self, path: &str) {
        self(path)
    }
}

/// A dynamically loaded emulator core
pub struct NativeCore {
    // Keeps `load` valid; must outlive every call through it
    _library: Library,
    load: LoadFn,
    library_path: PathBuf,
    symbol: String,
}

impl NativeCore {
    /// Open `library_path` and look up `symbol` in it
    pub fn open(library_path: &Path, symbol: &str) -> Result<Self, EntryPointError> {
        // SAFETY: loading the core runs its initialisers; the core is trusted
        // code shipped alongside the launcher.
        let library = unsafe { Library::new(library_path) }.map_err(|source| {
            EntryPointError::OpenFailed {
                path: library_path.to_path_buf(),
                source,
            }
        })?;

        // SAFETY: the core exports `Load` with the C signature of `LoadFn`.
        let load = unsafe { library.get::<LoadFn>(symbol.as_bytes()) }
            .map(|sym| *sym)
            .map_err(|source| EntryPointError::MissingSymbol {
                symbol: symbol.to_string(),
                source,
            })?;

        log::info!(
            target: CORE,
            "Native core loaded: {} (entry point `{}`)",
            library_path.display(),
            symbol
        );

        Ok(Self {
            _library: library,
            load,
            library_path: library_path.to_path_buf(),
            symbol: symbol.to_string(),
        })
    }
}

impl EntryPoint for NativeCore {
    fn load(&mut self, path: &str) {
        let c_path = match CString::new(path) {
            Ok(p) => p,
            Err(e) => {
                log::error!(target: CORE, "Path cannot cross the C boundary: {}", e);
                return;
            }
        };

        log::info!(target: CORE, "{}(\"{}\")", self.symbol, path);
        // SAFETY: `c_path` is NUL-terminated and outlives the call; the
        // library backing `self.load` is owned by `self`.
        unsafe { (self.load)(c_path.as_ptr()) };
    }
}

impl fmt::Debug for NativeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCore")
            .field("library_path", &self.library_path)
            .field("symbol", &self.symbol)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_entry_points() {
        let mut calls = Vec::new();
        {
            let mut entry = |path: &str| calls.push(path.to_string());
            EntryPoint::load(&mut entry, "/games/a.3ds");
        }
        assert_eq!(calls, vec!["/games/a.3ds".to_string()]);
    }

    #[test]
    fn missing_library_is_reported() {
        let err = NativeCore::open(Path::new("/nonexistent/libcitra-core.so"), "Load").unwrap_err();
        assert!(matches!(err, EntryPointError::OpenFailed { .. }));
        assert!(err.to_string().contains("/nonexistent/libcitra-core.so"));
    }
}

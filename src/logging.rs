//! Log routing for frontends that install their own `log::Log`
//!
//! [`RoutedLogger`] applies the class filter from the configuration and copies
//! every record it lets through into a log file next to the platform logger.

use crate::log_filter::LogFilter;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// File name of the log inside the logs directory
pub const LOG_FILE_NAME: &str = "citra_launcher.log";

/// Filter and log file shared by a process-wide logger
pub struct LogRouter {
    filter: RwLock<LogFilter>,
    file: Mutex<Option<File>>,
}

impl Default for LogRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogRouter {
    pub const fn new() -> Self {
        Self {
            filter: RwLock::new(LogFilter::new()),
            file: Mutex::new(None),
        }
    }

    /// Replace the active filter, returning the most verbose level it lets through
    pub fn set_filter(&self, filter: LogFilter) -> LevelFilter {
        let max_level = filter.max_level();
        if let Ok(mut current) = self.filter.write() {
            *current = filter;
        }
        max_level
    }

    /// Start copying records to `<dir>/citra_launcher.log`, replacing any earlier file
    pub fn attach_file(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOG_FILE_NAME);
        let file = File::create(&path)?;
        if let Ok(mut slot) = self.file.lock() {
            *slot = Some(file);
        }
        Ok(path)
    }

    pub fn enabled(&self, metadata: &Metadata) -> bool {
        match self.filter.read() {
            Ok(filter) => filter.enabled(metadata.target(), metadata.level()),
            Err(_) => true,
        }
    }

    fn write_file(&self, record: &Record) {
        let Ok(mut slot) = self.file.lock() else {
            return;
        };
        if let Some(file) = slot.as_mut() {
            // A failing log file has nowhere left to report to
            let _ = writeln!(file, "{} <{}> {}", record.target(), record.level(), record.args());
        }
    }

    fn flush_file(&self) {
        if let Ok(mut slot) = self.file.lock() {
            if let Some(file) = slot.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Sends records that pass the router's filter to `inner` and to the log file
pub struct RoutedLogger<L> {
    inner: L,
    router: &'static LogRouter,
}

impl<L: Log> RoutedLogger<L> {
    pub fn new(inner: L, router: &'static LogRouter) -> Self {
        Self { inner, router }
    }
}

impl<L: Log> Log for RoutedLogger<L> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.router.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.inner.log(record);
        self.router.write_file(record);
    }

    fn flush(&self) {
        self.inner.flush();
        self.router.flush_file();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_filter::{CORE, FRONTEND};
    use log::Level;
    use tempfile::tempdir;

    /// Remembers the targets it was handed
    #[derive(Default)]
    struct Capture {
        targets: Mutex<Vec<String>>,
    }

    impl Log for Capture {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.targets.lock().unwrap().push(record.target().to_string());
        }

        fn flush(&self) {}
    }

    fn emit(logger: &dyn Log, target: &str, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .target(target)
                .level(level)
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn class_filter_decides_what_reaches_both_outputs() {
        let dir = tempdir().unwrap();
        let router: &'static LogRouter = Box::leak(Box::new(LogRouter::new()));
        let max = router.set_filter(LogFilter::parse("*:Info Core:Debug"));
        assert_eq!(max, LevelFilter::Debug);
        let path = router.attach_file(&dir.path().join("log")).unwrap();

        let logger = RoutedLogger::new(Capture::default(), router);
        emit(&logger, CORE, Level::Debug, "core detail");
        emit(&logger, FRONTEND, Level::Debug, "frontend detail");
        emit(&logger, FRONTEND, Level::Info, "picker opened");
        logger.flush();

        assert_eq!(
            *logger.inner.targets.lock().unwrap(),
            vec![CORE.to_string(), FRONTEND.to_string()]
        );

        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("Core <DEBUG> core detail"));
        assert!(contents.contains("Frontend <INFO> picker opened"));
        assert!(!contents.contains("frontend detail"));
    }

    #[test]
    fn without_a_file_only_the_platform_logger_gets_records() {
        let router: &'static LogRouter = Box::leak(Box::new(LogRouter::new()));
        let logger = RoutedLogger::new(Capture::default(), router);

        emit(&logger, FRONTEND, Level::Warn, "no file yet");
        emit(&logger, FRONTEND, Level::Debug, "below default");

        assert_eq!(*logger.inner.targets.lock().unwrap(), vec![FRONTEND.to_string()]);
    }
}

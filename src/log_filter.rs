//! Emulator-style log filters (`*:Info Core:Debug`) mapped onto `log` levels
//!
//! Log records are tagged with a class as their target (`log::info!(target:
//! FRONTEND, ...)`); a filter picks a level per class and a default for the rest.

use log::LevelFilter;

/// Launcher UI and the selection flow
pub const FRONTEND: &str = "Frontend";
/// Configuration loading and saving
pub const CONFIG: &str = "Config";
/// Calls into the native emulator core
pub const CORE: &str = "Core";

/// A parsed filter: a default level plus per-class overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub default: LevelFilter,
    pub classes: Vec<(String, LevelFilter)>,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFilter {
    pub const fn new() -> Self {
        Self {
            default: LevelFilter::Info,
            classes: Vec::new(),
        }
    }

    /// Parse a whitespace-separated list of `class:level` entries.
    ///
    /// Malformed entries are skipped with a warning; the last `*` entry wins.
    pub fn parse(filter: &str) -> Self {
        let (parsed, rejected) = Self::parse_quiet(filter);
        log_rejected(&rejected);
        parsed
    }

    /// Like [`parse`](Self::parse), but hands back the skipped entries instead
    /// of logging them, for use before a logger is installed
    pub fn parse_quiet(filter: &str) -> (Self, Vec<String>) {
        let mut parsed = Self::new();
        let mut rejected = Vec::new();

        for entry in filter.split_whitespace() {
            let Some((class, level)) = entry.split_once(':') else {
                rejected.push(entry.to_string());
                continue;
            };
            let Some(level) = parse_level(level) else {
                rejected.push(entry.to_string());
                continue;
            };

            if class == "*" {
                parsed.default = level;
            } else {
                parsed.classes.push((class.to_string(), level));
            }
        }

        (parsed, rejected)
    }

    /// Level for a record target: the last class entry that matches it, or the default.
    ///
    /// A class matches its own name and its sub-classes (`Render` matches `Render.OpenGL`).
    pub fn level_for(&self, target: &str) -> LevelFilter {
        self.classes
            .iter()
            .rev()
            .find(|(class, _)| {
                target == class
                    || target
                        .strip_prefix(class.as_str())
                        .is_some_and(|rest| rest.starts_with('.'))
            })
            .map(|(_, level)| *level)
            .unwrap_or(self.default)
    }

    pub fn enabled(&self, target: &str, level: log::Level) -> bool {
        level <= self.level_for(target)
    }

    /// Most verbose level any entry asks for
    pub fn max_level(&self) -> LevelFilter {
        self.classes
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

pub fn log_rejected(rejected: &[String]) {
    for entry in rejected {
        log::warn!(target: CONFIG, "Ignoring malformed log filter entry: {}", entry);
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warning" | "warn" => Some(LevelFilter::Warn),
        "error" | "critical" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn default_filter() {
        let filter = LogFilter::parse("*:Info");
        assert_eq!(filter.default, LevelFilter::Info);
        assert!(filter.classes.is_empty());
    }

    #[test]
    fn class_overrides_and_emulator_level_names() {
        let filter = LogFilter::parse("*:Warning Core:Debug Render.OpenGL:Critical");
        assert_eq!(filter.default, LevelFilter::Warn);
        assert_eq!(
            filter.classes,
            vec![
                ("Core".to_string(), LevelFilter::Debug),
                ("Render.OpenGL".to_string(), LevelFilter::Error),
            ]
        );
        assert_eq!(filter.max_level(), LevelFilter::Debug);
    }

    #[test]
    fn class_entry_changes_what_is_enabled() {
        let filter = LogFilter::parse("*:Info Core:Debug Frontend:Error");

        assert!(filter.enabled(CORE, Level::Debug));
        assert!(!filter.enabled(CORE, Level::Trace));
        assert!(!filter.enabled(FRONTEND, Level::Warn));
        assert!(filter.enabled(FRONTEND, Level::Error));
        assert!(filter.enabled(CONFIG, Level::Info));
        assert!(!filter.enabled(CONFIG, Level::Debug));
    }

    #[test]
    fn class_matches_sub_classes_only() {
        let filter = LogFilter::parse("*:Info Render:Trace");
        assert_eq!(filter.level_for("Render.OpenGL"), LevelFilter::Trace);
        assert_eq!(filter.level_for("Renderer"), LevelFilter::Info);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let (filter, rejected) = LogFilter::parse_quiet("Core *:Loud *:Error");
        assert_eq!(filter, LogFilter { default: LevelFilter::Error, classes: Vec::new() });
        assert_eq!(rejected, vec!["Core".to_string(), "*:Loud".to_string()]);
    }
}

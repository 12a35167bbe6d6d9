//! Host events and the line protocol read from stdin.

use crate::config::HostSettings;

/// Something the runtime reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A named source became active
    Activated(String),
    /// Explicit reload request
    ReloadRequested,
    /// The configuration document changed on disk
    ConfigChanged,
    /// Re-read the settings file, then apply it
    SettingsReloadRequested,
    /// New host settings were applied
    SettingsUpdated(Box<HostSettings>),
    Shutdown,
}

/// Interpret one input line.
///
/// Plain lines are source names; `:reload`, `:settings`, and `:quit` are
/// commands. Blank
/// lines and `#` comments are ignored.
pub fn parse_input_line(line: &str) -> Option<HostEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match line {
        ":reload" => Some(HostEvent::ReloadRequested),
        ":settings" => Some(HostEvent::SettingsReloadRequested),
        ":quit" | ":exit" => Some(HostEvent::Shutdown),
        name => Some(HostEvent::Activated(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_line() {
        assert_eq!(
            parse_input_line("  Camera 1 \n"),
            Some(HostEvent::Activated("Camera 1".to_string()))
        );
        assert_eq!(parse_input_line(":reload"), Some(HostEvent::ReloadRequested));
        assert_eq!(
            parse_input_line(":settings"),
            Some(HostEvent::SettingsReloadRequested)
        );
        assert_eq!(parse_input_line(":quit"), Some(HostEvent::Shutdown));
        assert_eq!(parse_input_line(""), None);
        assert_eq!(parse_input_line("# comment"), None);
    }
}

// Parameter Store Port - the producer/DCC bridge boundary
//
// Every front end (widget, node network, plain map) exposes its raw publish
// parameters through this interface; one concrete adapter per host.

/// Message severity for `show_message`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Parameter getter/setter interface implemented by producers.
pub trait ParameterStore: Send + Sync {
    /// Get a parameter value by name, `None` when unset
    fn get_parameter(&self, name: &str) -> Option<String>;

    /// Set a parameter value by name
    fn set_parameter(&self, name: &str, value: &str);

    /// Show a message to the user (optional; default is a no-op)
    fn show_message(&self, _text: &str, _severity: Severity) {}
}

/// Convenience accessors shared by callers of the port
pub trait ParameterStoreExt: ParameterStore {
    /// Parameter as a non-empty trimmed string
    fn get_nonempty(&self, name: &str) -> Option<String> {
        self.get_parameter(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Toggle parameter; "1"/"true"/"on" are truthy
    fn get_flag(&self, name: &str) -> bool {
        matches!(
            self.get_parameter(name).as_deref(),
            Some("1") | Some("true") | Some("on")
        )
    }

    /// Integer parameter, 0 when unset or unparsable
    fn get_count(&self, name: &str) -> usize {
        self.get_parameter(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

impl<T: ParameterStore + ?Sized> ParameterStoreExt for T {}

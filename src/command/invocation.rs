//! A single parsed command call

/// One call of a command: its name, arguments, and optional upstream record
///
/// Built once by the script parser (or by hand) and not changed afterwards;
/// [`with_input`](Self::with_input) derives a new invocation per upstream
/// record.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandInvocation {
    name: String,
    named: Vec<(String, String)>,
    positional: Vec<String>,
    input: Option<serde_json::Value>,
}

impl CommandInvocation {
    /// Start an invocation of `name` with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            named: Vec::new(),
            positional: Vec::new(),
            input: None,
        }
    }

    /// Add a named argument (`-Name value`)
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    /// Add a positional argument
    #[must_use]
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Derive an invocation that also carries an upstream record
    #[must_use]
    pub fn with_input(&self, record: serde_json::Value) -> Self {
        Self {
            input: Some(record),
            ..self.clone()
        }
    }

    /// Command name as written
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named arguments in the order written
    pub fn named_args(&self) -> &[(String, String)] {
        &self.named
    }

    /// Positional arguments in the order written
    pub fn positional_args(&self) -> &[String] {
        &self.positional
    }

    /// Value of a named argument (case-insensitive)
    pub fn named_arg(&self, name: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Upstream record, if any
    pub fn input(&self) -> Option<&serde_json::Value> {
        self.input.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_records_arguments_in_order() {
        let inv = CommandInvocation::new("Save-Track")
            .arg("TrackUrl", "https://a")
            .positional("extra");

        assert_eq!(inv.name(), "Save-Track");
        assert_eq!(inv.named_arg("trackurl"), Some("https://a"));
        assert_eq!(inv.positional_args(), ["extra".to_string()]);
        assert!(inv.input().is_none());
    }

    #[test]
    fn with_input_leaves_original_untouched() {
        let inv = CommandInvocation::new("Save-Track");
        let derived = inv.with_input(serde_json::json!("https://a"));

        assert!(inv.input().is_none());
        assert_eq!(derived.input(), Some(&serde_json::json!("https://a")));
        assert_eq!(derived.name(), inv.name());
    }
}

use serde::{Deserialize, Serialize};

/// Chain configuration. Every field is optional; `None` means "use the
/// default".
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Name of the chain. Used as the source's instance name and reported
    /// with every run.
    pub name: Option<String>,

    /// Whether a panicking stage function fails the run instead of
    /// stalling it. Defaults to true.
    pub catch_panics: Option<bool>,

    /// Upper bound on the number of transform stages the builder accepts.
    /// Unbounded when `None`.
    pub max_stages: Option<usize>,
}

impl ChainConfig {
    /// A configuration with only the name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set `catch_panics`.
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = Some(catch_panics);
        self
    }

    /// Set `max_stages`.
    pub fn with_max_stages(mut self, max_stages: usize) -> Self {
        self.max_stages = Some(max_stages);
        self
    }

    /// Effective `catch_panics`.
    pub fn catches_panics(&self) -> bool {
        self.catch_panics.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: ChainConfig = serde_json::from_str(r#"{"name": "adder"}"#).unwrap();
        assert_eq!(config.name.as_deref(), Some("adder"));
        assert!(config.catches_panics());
        assert_eq!(config.max_stages, None);
    }

    #[test]
    fn builder_methods_set_fields() {
        let config = ChainConfig::named("adder")
            .with_catch_panics(false)
            .with_max_stages(4);
        assert!(!config.catches_panics());
        assert_eq!(config.max_stages, Some(4));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["max_stages"], 4);
    }
}

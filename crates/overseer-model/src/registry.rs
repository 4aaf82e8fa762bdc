//! Registry of trackable models.
//!
//! The registry is built explicitly at startup and passed by reference to
//! every consumer. There is no lazy global list: what the application
//! registers is what the admin layer sees, and the set never changes after
//! construction. Models whose mutations must not be audited (the history
//! table itself, for one) are excluded by name before registration begins.

use std::collections::{HashMap, HashSet};

use overseer_core::{OverseerError, OverseerResult};

use crate::reflection::ModelInfo;

/// An explicitly constructed, read-mostly registry of [`ModelInfo`]s.
///
/// # Examples
///
/// ```
/// use overseer_model::registry::ModelRegistry;
/// use overseer_model::reflection::ModelInfo;
///
/// let mut registry = ModelRegistry::new().exclude("History");
/// registry.register(ModelInfo::new("Player", "players"));
/// registry.register(ModelInfo::new("History", "overseer_histories"));
///
/// assert!(registry.lookup("Player").is_some());
/// assert!(registry.lookup("History").is_none());
/// ```
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelInfo>,
    excluded: HashSet<String>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes a model name from registration.
    #[must_use]
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.excluded.insert(name.into());
        self
    }

    /// Registers a model. Returns `false` when the name is excluded.
    ///
    /// Registering the same name twice replaces the earlier entry.
    pub fn register(&mut self, info: ModelInfo) -> bool {
        if self.excluded.contains(&info.name) {
            tracing::debug!(model = %info.name, "skipping excluded model");
            return false;
        }
        self.models.insert(info.name.clone(), info);
        true
    }

    /// Looks up a registered model by name.
    pub fn lookup(&self, name: &str) -> Option<&ModelInfo> {
        self.models.get(name)
    }

    /// Looks up a registered model by name, erroring when absent.
    pub fn require(&self, name: &str) -> OverseerResult<&ModelInfo> {
        self.lookup(name)
            .ok_or_else(|| OverseerError::NotFound(name.to_string()))
    }

    /// All registered models, sorted by name.
    pub fn all(&self) -> Vec<&ModelInfo> {
        let mut models: Vec<&ModelInfo> = self.models.values().collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        models
    }

    /// The number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` when no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Returns `true` when a model of this name is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModelRegistry::new();
        assert!(registry.register(ModelInfo::new("Player", "players")));
        assert!(registry.is_registered("Player"));
        assert_eq!(registry.lookup("Player").unwrap().table_name, "players");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let registry = ModelRegistry::new();
        assert!(registry.lookup("Ghost").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_require_missing_is_not_found() {
        let registry = ModelRegistry::new();
        let err = registry.require("Ghost").unwrap_err();
        assert!(matches!(err, OverseerError::NotFound(name) if name == "Ghost"));
    }

    #[test]
    fn test_excluded_model_is_skipped() {
        let mut registry = ModelRegistry::new().exclude("History");
        assert!(!registry.register(ModelInfo::new("History", "overseer_histories")));
        assert!(registry.lookup("History").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_all_sorted_by_name() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelInfo::new("Team", "teams"));
        registry.register(ModelInfo::new("Division", "divisions"));
        registry.register(ModelInfo::new("Player", "players"));
        let names: Vec<&str> = registry.all().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Division", "Player", "Team"]);
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelInfo::new("Player", "players"));
        registry.register(ModelInfo::new("Player", "players_v2"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("Player").unwrap().table_name, "players_v2");
    }
}

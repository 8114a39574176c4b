//! Registry mapping stage kinds to their system prompt templates.

use std::collections::HashMap;

use super::templates;
use crate::core::StageKind;
use crate::errors::UnknownStageError;

/// O(1) lookup of the system prompt for a stage kind.
///
/// Built once at startup; templates never change afterwards, so no
/// caching or locking is involved.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    templates: HashMap<StageKind, String>,
}

impl PromptRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry preloaded with the built-in templates for
    /// all six stages.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(
            StageKind::RequirementCollection,
            templates::REQUIREMENT_COLLECTION,
        );
        registry.insert(StageKind::RiskAnalysis, templates::RISK_ANALYSIS);
        registry.insert(StageKind::TechStack, templates::TECH_STACK);
        registry.insert(StageKind::MvpBoundary, templates::MVP_BOUNDARY);
        registry.insert(StageKind::DiagramDesign, templates::DIAGRAM_DESIGN);
        registry.insert(
            StageKind::DocumentGeneration,
            templates::DOCUMENT_GENERATION,
        );
        registry
    }

    /// Registers (or replaces) a template for a stage kind.
    pub fn insert(&mut self, kind: StageKind, template: impl Into<String>) {
        self.templates.insert(kind, template.into());
    }

    /// Resolves the template for a stage kind.
    pub fn resolve(&self, kind: StageKind) -> Result<&str, UnknownStageError> {
        self.templates
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| UnknownStageError::prompt(kind))
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_stage() {
        let registry = PromptRegistry::with_defaults();
        assert_eq!(registry.len(), StageKind::ALL.len());
        for kind in StageKind::ALL {
            assert!(registry.resolve(kind).is_ok());
        }
    }

    #[test]
    fn test_empty_registry_reports_unknown_stage() {
        let registry = PromptRegistry::new();
        let err = registry.resolve(StageKind::RiskAnalysis).unwrap_err();
        assert_eq!(err.stage, StageKind::RiskAnalysis);
        assert!(err.to_string().contains("prompt template"));
    }

    #[test]
    fn test_insert_replaces_template() {
        let mut registry = PromptRegistry::with_defaults();
        registry.insert(StageKind::TechStack, "custom template");
        assert_eq!(registry.resolve(StageKind::TechStack).unwrap(), "custom template");
    }
}

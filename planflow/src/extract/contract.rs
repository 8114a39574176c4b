//! Per-stage shape contracts and their validation/normalization rules.
//!
//! A contract declares what a stage's structured result must look
//! like: required fields with container-type expectations, enumerated
//! item fields with allowed value sets, identifier backfill targets,
//! and boolean defaults. Fields the contract does not mention pass
//! through untouched, so results stay forward-compatible.

use serde_json::Value;
use std::collections::HashMap;

use crate::core::StageKind;
use crate::errors::UnknownStageError;
use crate::utils::generate_uuid_string;

/// Allowed severity levels for risk items.
pub const SEVERITY_LEVELS: &[&str] = &["low", "medium", "high"];

/// Expected container type for a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

/// A declared top-level field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Field name.
    pub name: &'static str,
    /// Expected container type.
    pub field_type: FieldType,
    /// Whether absence is a shape mismatch.
    pub required: bool,
}

/// An enumerated string field inside array items.
#[derive(Debug, Clone)]
pub struct EnumRule {
    /// Item field name.
    pub key: &'static str,
    /// Allowed values.
    pub allowed: &'static [&'static str],
}

/// Validation and normalization rules for the items of one array field.
#[derive(Debug, Clone, Default)]
pub struct ItemRules {
    /// The array field these rules apply to.
    pub field: &'static str,
    /// Whether items missing an `id` get a fresh unique identifier.
    pub assign_ids: bool,
    /// Enumerated item fields.
    pub enums: Vec<EnumRule>,
    /// Optional boolean item fields defaulted to `false` when absent.
    pub default_false: Vec<&'static str>,
}

impl ItemRules {
    /// Creates empty rules for an array field.
    #[must_use]
    pub fn for_field(field: &'static str) -> Self {
        Self {
            field,
            ..Self::default()
        }
    }

    /// Enables identifier backfill for items.
    #[must_use]
    pub fn assign_ids(mut self) -> Self {
        self.assign_ids = true;
        self
    }

    /// Declares an enumerated item field.
    #[must_use]
    pub fn enumerated(mut self, key: &'static str, allowed: &'static [&'static str]) -> Self {
        self.enums.push(EnumRule { key, allowed });
        self
    }

    /// Declares an optional boolean item field defaulted to `false`.
    #[must_use]
    pub fn default_false(mut self, key: &'static str) -> Self {
        self.default_false.push(key);
        self
    }
}

/// A structural violation found during validation, naming the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// Path of the offending field.
    pub field: String,
    /// Why it failed.
    pub reason: String,
}

impl ShapeViolation {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Declared structural shape of one stage's result.
#[derive(Debug, Clone)]
pub struct ShapeContract {
    /// The stage this contract belongs to.
    pub stage: StageKind,
    /// Declared top-level fields.
    pub fields: Vec<FieldRule>,
    /// Item rules for array fields.
    pub items: Vec<ItemRules>,
}

impl ShapeContract {
    /// Creates an empty contract for a stage.
    #[must_use]
    pub fn new(stage: StageKind) -> Self {
        Self {
            stage,
            fields: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Declares a required field.
    #[must_use]
    pub fn require(mut self, name: &'static str, field_type: FieldType) -> Self {
        self.fields.push(FieldRule {
            name,
            field_type,
            required: true,
        });
        self
    }

    /// Declares an optional field, type-checked only when present.
    #[must_use]
    pub fn optional(mut self, name: &'static str, field_type: FieldType) -> Self {
        self.fields.push(FieldRule {
            name,
            field_type,
            required: false,
        });
        self
    }

    /// Attaches item rules for an array field.
    #[must_use]
    pub fn items(mut self, rules: ItemRules) -> Self {
        self.items.push(rules);
        self
    }

    /// Validates a parsed value against this contract.
    ///
    /// Checks required fields, container types, and enumerated item
    /// fields; undeclared fields are ignored.
    pub fn check(&self, value: &Value) -> Result<(), ShapeViolation> {
        let Some(object) = value.as_object() else {
            return Err(ShapeViolation::new("$", "expected a JSON object"));
        };

        for rule in &self.fields {
            match object.get(rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        return Err(ShapeViolation::new(rule.name, "is missing"));
                    }
                }
                Some(found) => {
                    if !rule.field_type.matches(found) {
                        return Err(ShapeViolation::new(
                            rule.name,
                            format!("must be {}", rule.field_type.describe()),
                        ));
                    }
                }
            }
        }

        for rules in &self.items {
            let Some(items) = object.get(rules.field).and_then(Value::as_array) else {
                continue;
            };
            for (i, item) in items.iter().enumerate() {
                let Some(item_object) = item.as_object() else {
                    return Err(ShapeViolation::new(
                        format!("{}[{i}]", rules.field),
                        "items must be objects",
                    ));
                };
                for rule in &rules.enums {
                    let path = format!("{}[{i}].{}", rules.field, rule.key);
                    match item_object.get(rule.key) {
                        None | Some(Value::Null) => {
                            return Err(ShapeViolation::new(path, "is missing"));
                        }
                        Some(Value::String(found)) if !rule.allowed.contains(&found.as_str()) => {
                            return Err(ShapeViolation::new(
                                path,
                                format!(
                                    "is '{found}', expected one of [{}]",
                                    rule.allowed.join(", ")
                                ),
                            ));
                        }
                        Some(Value::String(_)) => {}
                        Some(_) => {
                            return Err(ShapeViolation::new(path, "must be a string"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Normalizes a validated value in place: backfills missing item
    /// identifiers with fresh unique ids and defaults declared
    /// booleans to `false`.
    ///
    /// Identifiers are never reused across results, even for equal
    /// content.
    pub fn normalize(&self, value: &mut Value) {
        let Some(object) = value.as_object_mut() else {
            return;
        };

        for rules in &self.items {
            let Some(items) = object.get_mut(rules.field).and_then(Value::as_array_mut) else {
                continue;
            };
            for item in items.iter_mut() {
                let Some(item_object) = item.as_object_mut() else {
                    continue;
                };
                if rules.assign_ids && !item_object.contains_key("id") {
                    item_object.insert("id".to_string(), Value::String(generate_uuid_string()));
                }
                for key in &rules.default_false {
                    item_object
                        .entry((*key).to_string())
                        .or_insert(Value::Bool(false));
                }
            }
        }
    }
}

/// O(1) lookup of the shape contract for a stage kind.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<StageKind, ShapeContract>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in contracts for all six
    /// stages.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for contract in default_contracts() {
            registry.insert(contract);
        }
        registry
    }

    /// Registers (or replaces) a contract.
    pub fn insert(&mut self, contract: ShapeContract) {
        self.contracts.insert(contract.stage, contract);
    }

    /// Resolves the contract for a stage kind.
    pub fn resolve(&self, kind: StageKind) -> Result<&ShapeContract, UnknownStageError> {
        self.contracts
            .get(&kind)
            .ok_or_else(|| UnknownStageError::contract(kind))
    }

    /// Number of registered contracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

fn default_contracts() -> Vec<ShapeContract> {
    vec![
        ShapeContract::new(StageKind::RequirementCollection)
            .require("project_name", FieldType::String)
            .require("core_goal", FieldType::String)
            .require("target_users", FieldType::Array)
            .require("features", FieldType::Array)
            .optional("constraints", FieldType::Array)
            .items(ItemRules::for_field("features").assign_ids()),
        ShapeContract::new(StageKind::RiskAnalysis)
            .require("risks", FieldType::Array)
            .require("approaches", FieldType::Array)
            .items(
                ItemRules::for_field("risks")
                    .assign_ids()
                    .enumerated("severity", SEVERITY_LEVELS),
            )
            .items(
                ItemRules::for_field("approaches")
                    .assign_ids()
                    .default_false("recommended"),
            ),
        ShapeContract::new(StageKind::TechStack)
            .require("recommendations", FieldType::Array)
            .items(
                ItemRules::for_field("recommendations")
                    .assign_ids()
                    .default_false("recommended"),
            ),
        ShapeContract::new(StageKind::MvpBoundary)
            .require("mvp_features", FieldType::Array)
            .require("future_features", FieldType::Array)
            .require("dev_plan", FieldType::Array)
            .items(ItemRules::for_field("mvp_features").assign_ids())
            .items(ItemRules::for_field("future_features").assign_ids()),
        ShapeContract::new(StageKind::DiagramDesign)
            .require("diagram_type", FieldType::String)
            .require("nodes", FieldType::Array)
            .require("edges", FieldType::Array)
            .items(ItemRules::for_field("nodes").assign_ids()),
        ShapeContract::new(StageKind::DocumentGeneration)
            .require("title", FieldType::String)
            .require("sections", FieldType::Array)
            .items(ItemRules::for_field("sections").assign_ids()),
    ]
}

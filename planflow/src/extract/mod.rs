//! Structured response extraction.
//!
//! This module turns free-form model text into a validated structured
//! value:
//! - Balanced-delimiter scanning to recover JSON embedded in prose
//! - Per-stage shape contracts with enum and container checks
//! - Normalization: identifier backfill and boolean defaults

mod contract;
mod extractor;
mod scanner;

pub use contract::{
    ContractRegistry, EnumRule, FieldRule, FieldType, ItemRules, ShapeContract, ShapeViolation,
};
pub use extractor::parse;
pub use scanner::BalancedScanner;

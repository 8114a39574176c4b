//! UUID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Generates a new UUID v4 as a string, used for identifier backfill.
#[must_use]
pub fn generate_uuid_string() -> String {
    Uuid::new_v4().to_string()
}

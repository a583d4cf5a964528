//! Report ownership attribution.

use serde::{Deserialize, Serialize};

/// A user, as far as this crate cares: an identifier reports are owned by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

//! Company model for biztime-service.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{Alphabetic}\p{N}]+").expect("valid slug pattern"));

/// Company row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a company. `code` is always derived with [`slugify`].
#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl CreateCompany {
    /// Build the insert input, deriving the key from `name`.
    ///
    /// Returns `None` when the name has no letters or digits to slug.
    pub fn from_name(name: String, description: Option<String>) -> Option<Self> {
        let code = slugify(&name);
        if code.is_empty() {
            return None;
        }
        Some(Self {
            code,
            name,
            description,
        })
    }
}

/// Input for updating a company. The key is never part of an update.
#[derive(Debug, Clone)]
pub struct UpdateCompany {
    pub name: String,
    pub description: Option<String>,
}

/// Lowercase `name` and collapse every run of non-alphanumeric characters
/// into a single `-`, trimming separators at either end.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

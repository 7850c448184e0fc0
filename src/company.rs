// 🏢 Company Entity - the single record type of the catalog
//
// "Name is a VALUE (canonicalized), UUID is IDENTITY (never changes)"
//
// A Company is built transiently from a CSV row or an API payload and only
// becomes persisted through the reconciliation service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// COMPANY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Company {
    /// Stable identity, assigned by the service on first insertion
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Company name, uppercase once canonicalized
    #[serde(default)]
    pub name: String,

    /// Five digit postal code
    #[serde(rename = "zipCode", default)]
    pub zip: String,

    /// Optional website (empty string when unknown)
    #[serde(default)]
    pub website: String,
}

impl Company {
    pub fn new(name: impl Into<String>, zip: impl Into<String>, website: impl Into<String>) -> Self {
        Company {
            id: None,
            name: name.into(),
            zip: zip.into(),
            website: website.into(),
        }
    }

    /// Uppercase the name in place
    pub fn canonicalize(&mut self) {
        self.name = canonical_name(&self.name);
    }

    /// Give this record a fresh identity
    pub fn assign_new_id(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.id = Some(id);
        id
    }
}

/// Canonical (uppercase) form used for every comparison and for storage
pub fn canonical_name(name: &str) -> String {
    name.to_uppercase()
}

// ============================================================================
// NAME MATCHING
// ============================================================================

/// How a name is compared when probing the store by name + zip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatch {
    /// Stored name equals the probe
    #[default]
    Exact,

    /// Stored name contains the probe (legacy behaviour, "ACME" matches "ACME SUBSIDIARY")
    Contains,
}

impl std::str::FromStr for NameMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(NameMatch::Exact),
            "contains" => Ok(NameMatch::Contains),
            other => Err(format!("unknown name match mode '{}' (expected exact or contains)", other)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

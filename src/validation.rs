// ✅ Field Validation - name, zip and website syntax checks
//
// Pure predicates, no side effects. validate_company() is the single gate
// every write path goes through: nothing reaches the store without it.

use crate::company::Company;
use crate::error::{Result, ServiceError};
use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// PATTERNS
// ============================================================================

const NAME_PATTERN: &str = r"^[A-Z&' ]*$";
const ZIP_PATTERN: &str = r"^[0-9]{5}$";

/// Optional scheme (http/https, optional www.), host labels joined by '-' or '.',
/// 2-5 letter TLD, optional port, optional path. Empty input matches.
// Looser than the legacy pattern, which demanded a scheme on any non-empty
// value: "example.com" passes here. The legacy multiline flag is dropped too.
const WEBSITE_PATTERN: &str =
    r"(?i)^(((https?://)(www\.)?)?[a-z0-9]+([\-.][a-z0-9]+)*\.[a-z]{2,5}(:[0-9]{1,5})?(/.*)?)?$";

static NAME_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static ZIP_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
static WEBSITE_REGEX: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn compiled(
    cell: &'static OnceLock<std::result::Result<Regex, regex::Error>>,
    pattern: &str,
) -> std::result::Result<&'static Regex, regex::Error> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(Clone::clone)
}

fn pattern_failure(field: &str, err: regex::Error) -> ServiceError {
    tracing::error!("{} pattern failed to compile: {}", field, err);
    ServiceError::InternalPattern(err)
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

/// Uppercase letters, '&', apostrophe and space only. Callers canonicalize first.
pub fn valid_name(name: &str) -> Result<bool> {
    let regex = compiled(&NAME_REGEX, NAME_PATTERN).map_err(|e| pattern_failure("name", e))?;
    Ok(regex.is_match(name))
}

/// Exactly five ASCII digits
pub fn valid_zip(zip: &str) -> Result<bool> {
    let regex = compiled(&ZIP_REGEX, ZIP_PATTERN).map_err(|e| pattern_failure("zip", e))?;
    Ok(regex.is_match(zip))
}

/// Website is optional, so the empty string is valid
pub fn valid_website(website: &str) -> bool {
    match compiled(&WEBSITE_REGEX, WEBSITE_PATTERN) {
        Ok(regex) => regex.is_match(website),
        Err(e) => {
            tracing::error!("website pattern failed to compile: {}", e);
            false
        }
    }
}

/// AND of the three checks.
///
/// Fails with `ValidationFailed` listing every bad field, or with
/// `InternalPattern` if a pattern itself is broken.
pub fn validate_company(company: &Company) -> Result<()> {
    let mut fields = Vec::new();

    if !valid_name(&company.name)? {
        fields.push("name");
    }
    if !valid_zip(&company.zip)? {
        fields.push("zip");
    }
    if !valid_website(&company.website) {
        fields.push("website");
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationFailed { fields })
    }
}

// ============================================================================
// TESTS
// ============================================================================

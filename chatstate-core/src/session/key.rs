//! Assistant identity validation
//!
//! Assistant ids are caller-assigned durable storage keys. Unsafe keys are
//! rejected up front rather than rewritten, so an id always maps to exactly
//! one storage partition.

use crate::{Error, Result};

/// Longest accepted assistant id
pub const MAX_ID_LEN: usize = 128;

/// Check that an assistant id is usable as a storage key.
///
/// Accepted: ASCII alphanumerics plus `-`, `_` and `.`; must not start
/// with a dot.
pub fn validate(assistant_id: &str) -> Result<()> {
    if assistant_id.is_empty() {
        return Err(Error::InvalidIdentity(
            "assistant id must not be empty".to_string(),
        ));
    }
    if assistant_id.len() > MAX_ID_LEN {
        return Err(Error::InvalidIdentity(format!(
            "assistant id longer than {} characters",
            MAX_ID_LEN
        )));
    }
    if assistant_id.starts_with('.') {
        return Err(Error::InvalidIdentity(format!(
            "assistant id must not start with '.': {}",
            assistant_id
        )));
    }
    if !assistant_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(Error::InvalidIdentity(format!(
            "assistant id contains unsupported characters: {}",
            assistant_id
        )));
    }
    Ok(())
}

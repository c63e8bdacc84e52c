//! Export serializers for completed runs.
//!
//! Pure serialization over a finished result sequence - no verification
//! logic. Two artifacts:
//! - plain text, one `credential | VERDICT` line per key
//! - JSON, an array of `{ credential, verdict }` records

use crate::verdict::CheckResult;
use crate::Result;

/// Render results as plain text, one `credential | VERDICT` line per key.
pub fn to_plain_text(results: &[CheckResult]) -> String {
    let mut out = String::new();
    for result in results {
        out.push_str(&result.credential);
        out.push_str(" | ");
        out.push_str(&result.verdict.to_string());
        out.push('\n');
    }
    out
}

/// Render results as pretty-printed JSON.
pub fn to_json(results: &[CheckResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

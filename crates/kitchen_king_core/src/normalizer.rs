//! crates/kitchen_king_core/src/normalizer.rs
//!
//! Turns the inference service's raw text into an `AnalysisResult`.
//!
//! Parsing is all-or-nothing: either every field decodes or the caller gets a
//! `CoreError::Parse` and no result at all. The only defaults applied are the
//! `isQuick` / `isNoGas` flags, which are declared on `Recipe` itself.

use tracing::{debug, error};

use crate::domain::AnalysisResult;
use crate::error::CoreError;

/// Parses a raw payload. Field values are kept exactly as received.
pub fn normalize(raw: &str) -> Result<AnalysisResult, CoreError> {
    let result: AnalysisResult = serde_json::from_str(raw.trim()).map_err(|e| {
        error!(
            line = e.line(),
            column = e.column(),
            "Inference payload did not match the analysis schema: {}",
            e
        );
        CoreError::Parse(e.to_string())
    })?;

    debug!(
        detected_items = result.detected_items.len(),
        recipes = result.recipes.len(),
        "Parsed analysis result."
    );
    Ok(result)
}

//! Ingestor: turns a raw classifier answer into one usable result.

use super::{ClassificationResult, Ranking};
use crate::error::{InstrumentError, Result};

/// Take the top entry of a ranking and clamp its confidence into `[0, 1]`
/// (NaN becomes 0). An error or an empty ranking yields an error and the
/// caller skips the cycle.
pub fn ingest(outcome: Result<Ranking>) -> Result<ClassificationResult> {
    let ranking = outcome?;
    let top = ranking
        .into_iter()
        .next()
        .ok_or_else(|| InstrumentError::ClassifierResult("empty ranking".into()))?;

    Ok(ClassificationResult {
        label: top.label,
        confidence: normalize_confidence(top.confidence),
    })
}

fn normalize_confidence(c: f32) -> f32 {
    if c.is_nan() {
        0.0
    } else {
        c.clamp(0.0, 1.0)
    }
}

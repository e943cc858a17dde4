//! Classification input: the contract with the external image classifier
//! and the sources that fulfil it.

pub mod ingest;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use ingest::ingest;
pub use source::{JsonLinesClassifier, ScriptedClassifier, SimulatedClassifier};

/// One (label, confidence) pair from the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f32,
}

impl ClassificationResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Results ordered by confidence, highest first.
pub type Ranking = Vec<ClassificationResult>;

/// An external classifier producing one ranking per request.
pub trait Classifier: Send {
    /// Classify the current frame.
    ///
    /// Blocks until the result is ready. Returns `None` once the source has
    /// nothing more to give; the loop then ends.
    fn classify(&mut self) -> Option<Result<Ranking>>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&mut self) -> Option<Result<Ranking>> {
        (**self).classify()
    }
}

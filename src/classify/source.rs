//! Classifier sources shipped with the instrument.
//!
//! - [`JsonLinesClassifier`]: an external model process writes one JSON
//!   result per line (stdin or a file).
//! - [`SimulatedClassifier`]: seeded random walk over the material labels,
//!   for playing without a camera or model.
//! - [`ScriptedClassifier`]: replays a fixed list.

use std::collections::VecDeque;
use std::io::BufRead;
use std::thread;
use std::time::Duration;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use super::{ClassificationResult, Classifier, Ranking};
use crate::config::SimulatorConfig;
use crate::error::{InstrumentError, Result};
use crate::material::{self, UNKNOWN_LABEL};

/// One line on the JSON-lines wire.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireLine {
    Ranked(Ranking),
    Single(ClassificationResult),
    Failure { error: String },
}

/// Reads classifications from a line-oriented JSON stream.
///
/// Each non-blank line is a ranked array, a single result object, or an
/// `{"error": "..."}` object:
///
/// ```text
/// [{"label":"wood","confidence":0.91},{"label":"stone","confidence":0.06}]
/// {"label":"coral","confidence":0.77}
/// {"error":"camera frame dropped"}
/// ```
pub struct JsonLinesClassifier<R> {
    reader: R,
    line: String,
}

impl<R: BufRead + Send> JsonLinesClassifier<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }

    fn parse(line: &str) -> Result<Ranking> {
        match serde_json::from_str::<WireLine>(line) {
            Ok(WireLine::Ranked(ranking)) => Ok(ranking),
            Ok(WireLine::Single(result)) => Ok(vec![result]),
            Ok(WireLine::Failure { error }) => Err(InstrumentError::ClassifierResult(error)),
            Err(e) => Err(InstrumentError::ClassifierResult(format!(
                "malformed classification {line:?}: {e}"
            ))),
        }
    }
}

impl<R: BufRead + Send> Classifier for JsonLinesClassifier<R> {
    fn classify(&mut self) -> Option<Result<Ranking>> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = self.line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(Self::parse(trimmed));
                }
                Err(e) => {
                    return Some(Err(InstrumentError::ClassifierUnavailable(e.to_string())))
                }
            }
        }
    }
}

/// Replays a fixed sequence of classifier answers.
pub struct ScriptedClassifier {
    script: VecDeque<Result<Ranking>>,
}

impl ScriptedClassifier {
    pub fn new(script: impl IntoIterator<Item = Result<Ranking>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Script of top-only results from `(label, confidence)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(label, c)| Ok(vec![ClassificationResult::new(label, c)])),
        )
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self) -> Option<Result<Ranking>> {
        self.script.pop_front()
    }
}

/// Probability of staying on the current label each cycle.
const STAY_PROBABILITY: f64 = 0.85;

/// Seeded random walk over the material labels.
///
/// Holds a label for a while before jumping, like a hand moving objects in
/// and out of frame. Confidence wanders within a plausible band.
pub struct SimulatedClassifier {
    rng: ChaCha8Rng,
    vocabulary: Vec<&'static str>,
    weights: Vec<u32>,
    current: usize,
    interval: Duration,
    remaining: Option<usize>,
}

impl SimulatedClassifier {
    /// Create a simulator; `cycles` limits how many results it produces.
    pub fn new(config: &SimulatorConfig, cycles: Option<usize>) -> Self {
        let mut vocabulary: Vec<&'static str> = material::labels().collect();
        let mut weights = vec![1; vocabulary.len()];
        vocabulary.push(UNKNOWN_LABEL);
        weights.push(config.unknown_weight);

        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            vocabulary,
            weights,
            current: 0,
            interval: Duration::from_millis(config.interval_ms),
            remaining: cycles,
        }
    }

    fn pick_label(&mut self) -> usize {
        let total: u32 = self.weights.iter().sum();
        if total == 0 {
            return self.current;
        }
        let mut roll = self.rng.gen_range(0..total);
        for (idx, &w) in self.weights.iter().enumerate() {
            if roll < w {
                return idx;
            }
            roll -= w;
        }
        self.current
    }

    fn next_ranking(&mut self) -> Ranking {
        if !self.rng.gen_bool(STAY_PROBABILITY) {
            self.current = self.pick_label();
        }

        let top: f32 = self.rng.gen_range(0.55..1.0);
        let mut rest = 1.0 - top;
        let mut ranking = vec![ClassificationResult::new(
            self.vocabulary[self.current],
            top,
        )];
        for (idx, label) in self.vocabulary.iter().enumerate() {
            if idx == self.current {
                continue;
            }
            let share = rest * self.rng.gen_range(0.0..1.0f32);
            rest -= share;
            ranking.push(ClassificationResult::new(*label, share));
        }
        ranking[1..].sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        ranking
    }
}

impl Classifier for SimulatedClassifier {
    fn classify(&mut self) -> Option<Result<Ranking>> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        if !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        Some(Ok(self.next_ranking()))
    }
}

//! Baseline-relative verdicts for probe responses
//!
//! Rules are evaluated top-down and the first one that fires decides the
//! verdict. Leaked file content outranks a large length change, which in turn
//! outranks a bare status code change.

use crate::models::{Baseline, Confidence, Detection, DEFAULT_LENGTH_DELTA_THRESHOLD};

/// What the classifier knows about one probe response
#[derive(Debug, Clone, Copy)]
pub struct Observation<'a> {
    pub indicators: &'a [String],
    pub baseline: Baseline,
    pub status: u16,
    pub length: usize,
}

type Rule = fn(&Observation<'_>, f64) -> Option<(Detection, Confidence)>;

/// Ordered rule list. Position is precedence.
const RULES: &[(&str, Rule)] = &[
    ("indicator-match", indicator_match),
    ("length-delta", length_delta),
    ("status-change", status_change),
];

fn indicator_match(obs: &Observation<'_>, _threshold: f64) -> Option<(Detection, Confidence)> {
    (!obs.indicators.is_empty()).then_some((Detection::ConfirmedLfi, Confidence::High))
}

fn length_delta(obs: &Observation<'_>, threshold: f64) -> Option<(Detection, Confidence)> {
    let base = obs.baseline.length.filter(|&len| len > 0)?;
    let delta = (obs.length as f64 - base as f64).abs() / base as f64;
    (delta > threshold).then_some((Detection::PossibleLfi, Confidence::Medium))
}

fn status_change(obs: &Observation<'_>, _threshold: f64) -> Option<(Detection, Confidence)> {
    let base = obs.baseline.status?;
    (obs.status != base).then_some((Detection::Suspicious, Confidence::Low))
}

/// Heuristic classifier with a tunable length-delta threshold
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    pub length_delta_threshold: f64,
}

impl Classifier {
    pub fn new(length_delta_threshold: f64) -> Self {
        Self {
            length_delta_threshold,
        }
    }

    /// Returns the verdict of the first rule that fires, or NOT_VULNERABLE
    pub fn classify(&self, obs: &Observation<'_>) -> (Detection, Confidence) {
        RULES
            .iter()
            .find_map(|(_, rule)| rule(obs, self.length_delta_threshold))
            .unwrap_or((Detection::NotVulnerable, Confidence::Low))
    }

    /// Name of the rule that decided the verdict, if any
    pub fn deciding_rule(&self, obs: &Observation<'_>) -> Option<&'static str> {
        RULES
            .iter()
            .find(|(_, rule)| rule(obs, self.length_delta_threshold).is_some())
            .map(|(name, _)| *name)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_DELTA_THRESHOLD)
    }
}

/// Classifies with the default threshold
pub fn classify(
    indicators: &[String],
    baseline_status: Option<u16>,
    baseline_length: Option<usize>,
    status: u16,
    length: usize,
) -> (Detection, Confidence) {
    Classifier::default().classify(&Observation {
        indicators,
        baseline: Baseline {
            status: baseline_status,
            length: baseline_length,
        },
        status,
        length,
    })
}

//! Trial-name mining from raw clinical text.
//!
//! A pure, deterministic function: a fixed battery of regex families over
//! the upper-cased text, curated exclusion sets, then a weighted score per
//! surviving candidate. No I/O.

pub mod exclusions;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use regex::Regex;

pub use exclusions::is_excluded;

/// Which regex family produced a candidate. Reliability differs by family:
/// hyphenated acronym+number and extension suffixes rarely false-positive,
/// bare two-word acronyms often do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PatternKind {
    HyphenatedNumber,
    WordNumber,
    RouteSuffix,
    ExtensionSuffix,
    TwoWordAcronym,
    PhaseSuffix,
}

impl PatternKind {
    pub fn reliability(&self) -> f64 {
        match self {
            Self::HyphenatedNumber | Self::ExtensionSuffix => 0.2,
            Self::RouteSuffix | Self::PhaseSuffix => 0.15,
            Self::WordNumber => 0.12,
            Self::TwoWordAcronym => 0.1,
        }
    }
}

/// Everything observed about one candidate across the text.
#[derive(Debug, Clone, Default)]
pub struct CandidateFeatures {
    pub count: usize,
    pub contexts: Vec<String>,
    pub kinds: Vec<PatternKind>,
}

const CONTEXT_WINDOW: usize = 100;

pub struct TrialNameExtractor {
    patterns: Vec<(PatternKind, Regex)>,
}

impl Default for TrialNameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TrialNameExtractor {
    pub fn new() -> Self {
        let specs: [(PatternKind, &str); 6] = [
            (PatternKind::HyphenatedNumber, r"\b[A-Z]{2,10}-\d{1,4}\b"),
            (PatternKind::WordNumber, r"\b[A-Z]{4,12} \d{1,3}\b"),
            (PatternKind::RouteSuffix, r"\b[A-Z]{3,10}-(?:SC|IV|IM|PO|SL)\b"),
            (PatternKind::ExtensionSuffix, r"\b[A-Z]{3,10}[- ](?:LTE|EXT|OLE)\b"),
            (PatternKind::TwoWordAcronym, r"\b[A-Z]{2,8}-[A-Z]{2,8}\b"),
            (PatternKind::PhaseSuffix, r"\b[A-Z]{3,10}-(?:IV|III|II|I)\b"),
        ];
        let patterns = specs
            .into_iter()
            .map(|(kind, pattern)| {
                (kind, Regex::new(pattern).expect("trial-name pattern must compile"))
            })
            .collect();
        Self { patterns }
    }

    /// Mine candidate trial names scoring at or above `min_confidence`.
    pub fn extract(&self, text: &str, min_confidence: f64) -> BTreeSet<String> {
        let upper = text.to_uppercase();
        let mut candidates: BTreeMap<String, CandidateFeatures> = BTreeMap::new();

        for (kind, regex) in &self.patterns {
            for m in regex.find_iter(&upper) {
                let name = m.as_str().to_string();
                if is_excluded(&name) {
                    continue;
                }
                let features = candidates.entry(name).or_default();
                features.count += 1;
                features.contexts.push(context_window(&upper, m.start(), m.end()));
                features.kinds.push(*kind);
            }
        }

        candidates
            .into_iter()
            .filter(|(name, features)| score_candidate(name, features) >= min_confidence)
            .map(|(name, _)| name)
            .collect()
    }

    /// Whether a string proposed elsewhere (e.g. by the model) looks like
    /// a trial name: matches one of the families and is not excluded.
    pub fn is_plausible_name(&self, name: &str) -> bool {
        let upper = name.trim().to_uppercase();
        if is_excluded(&upper) {
            return false;
        }
        self.patterns.iter().any(|(_, regex)| {
            regex
                .find(&upper)
                .is_some_and(|m| m.start() == 0 && m.end() == upper.len())
        })
    }
}

/// The 100-character window around a match, clamped to char boundaries.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let mut lo = start.saturating_sub(CONTEXT_WINDOW / 2);
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + CONTEXT_WINDOW / 2).min(text.len());
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    text[lo..hi].to_string()
}

/// Weighted candidate score, clamped to [0, 1]:
/// frequency (≤0.3) + positive context (0.4) + pattern reliability
/// (0.1–0.2) + format bonus (≤0.1).
pub fn score_candidate(name: &str, features: &CandidateFeatures) -> f64 {
    let frequency = (features.count.min(5) as f64 / 5.0) * 0.3;

    let context = if has_positive_context(name, &features.contexts) {
        0.4
    } else {
        0.0
    };

    let reliability = features
        .kinds
        .iter()
        .map(|k| k.reliability())
        .fold(0.0, f64::max);

    let mut format = 0.0;
    if (3..=15).contains(&name.len()) {
        format += 0.05;
    }
    if name.chars().any(|c| c.is_ascii_digit()) {
        format += 0.05;
    }

    (frequency + context + reliability + format).clamp(0.0, 1.0)
}

fn has_positive_context(name: &str, contexts: &[String]) -> bool {
    let escaped = regex::escape(name);
    let cues = [
        format!(r"THE\s+{escaped}\s+(?:TRIAL|STUDY)"),
        format!(r"RESULTS\s+(?:FROM|OF)\s+(?:THE\s+)?{escaped}"),
        format!(r"PHASE\s+(?:1|2|3|4|IV|III|II|I)B?\s+{escaped}"),
        format!(r"{escaped}\s+(?:TRIAL|STUDY|INVESTIGATORS)"),
    ];
    cues.iter().any(|cue| {
        Regex::new(cue)
            .map(|re| contexts.iter().any(|c| re.is_match(c)))
            .unwrap_or(false)
    })
}

//! Per-word pitch aggregation
//!
//! Pairs recognized words with pitch samples positionally and formats the
//! display lines. Pitch is advisory: when extraction is unavailable every
//! word reads `N/A` and the overall pitch is zero.

/// Aggregated pitch for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct PitchReport {
    /// One formatted line per recognized word
    pub per_word: Vec<String>,
    /// Mean of all extracted samples in Hz, 0.0 when there are none
    pub overall: f64,
}

/// Pair words with pitch samples by position.
///
/// Words beyond the sample count get `N/A`; samples beyond the word count
/// are dropped from the per-word lines but still count toward the overall
/// mean, which covers every extracted sample.
pub fn aggregate_pitch(words: &[String], samples: &[f64]) -> PitchReport {
    let matched = words.len().min(samples.len());
    let per_word = words
        .iter()
        .enumerate()
        .map(|(idx, word)| {
            if idx < matched {
                format!("{}: {:.2} Hz", word, samples[idx])
            } else {
                format!("{}: N/A", word)
            }
        })
        .collect();
    let overall = if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    };
    PitchReport { per_word, overall }
}

/// Report used when pitch extraction failed entirely
pub fn unavailable_pitch(words: &[String]) -> PitchReport {
    PitchReport {
        per_word: words.iter().map(|w| format!("{}: N/A", w)).collect(),
        overall: 0.0,
    }
}

//! Speech scoring primitives
//!
//! Deterministic, pure functions turning recognizer output (words with
//! confidence and timing) into normalized quality scores. All scores live
//! in [0, 100]; rounding to two decimals happens only when the final
//! metrics payload is assembled.

use tutor_core::{AssessedWord, AssessmentResult, ScoredWord, SpeechMetrics, WordError};

use crate::pitch::PitchReport;

/// Scoring constants
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Confidence above which a reference-matching word counts as correct
    pub confidence_threshold: f64,
    /// Words-per-minute treated as a perfect fluency score
    pub reference_wpm: f64,
    /// Composite weight: accuracy
    pub accuracy_weight: f64,
    /// Composite weight: completeness
    pub completeness_weight: f64,
    /// Composite weight: fluency
    pub fluency_weight: f64,
    /// Composite weight: pronunciation accuracy
    pub pronunciation_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            reference_wpm: 150.0,
            accuracy_weight: 0.4,
            completeness_weight: 0.3,
            fluency_weight: 0.2,
            pronunciation_weight: 0.1,
        }
    }
}

/// Scores for one utterance, full precision
#[derive(Debug, Clone)]
pub struct UtteranceScores {
    pub words: Vec<ScoredWord>,
    pub accuracy: f64,
    pub completeness: f64,
    pub fluency: f64,
    pub pronunciation_accuracy: f64,
    pub speech_quality: f64,
    pub word_evaluation: Vec<String>,
}

/// Speech scorer
#[derive(Debug, Clone, Default)]
pub struct SpeechScorer {
    config: ScoringConfig,
}

impl SpeechScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score an assessment against the reference text
    pub fn score(&self, assessment: &AssessmentResult, reference: &str) -> UtteranceScores {
        let reference_words = normalize_words(reference);
        let words = classify_words(
            &assessment.words,
            &reference_words,
            self.config.confidence_threshold,
        );

        let accuracy = accuracy_score(&words);
        let completeness = completeness_score(assessment.words.len(), reference_words.len());
        let fluency = fluency_score(&assessment.words, self.config.reference_wpm);
        let pronunciation_accuracy = pronunciation_accuracy(&words);
        let speech_quality = self.composite_quality(
            accuracy,
            completeness,
            fluency,
            pronunciation_accuracy,
        );
        let word_evaluation = word_evaluation(&words);

        UtteranceScores {
            words,
            accuracy,
            completeness,
            fluency,
            pronunciation_accuracy,
            speech_quality,
            word_evaluation,
        }
    }

    /// Composite speech quality from pre-computed component scores.
    /// Inputs are clamped to [0, 100] before weighting.
    pub fn composite_quality(
        &self,
        accuracy: f64,
        completeness: f64,
        fluency: f64,
        pronunciation_accuracy: f64,
    ) -> f64 {
        let c = &self.config;
        accuracy.clamp(0.0, 100.0) * c.accuracy_weight
            + completeness.clamp(0.0, 100.0) * c.completeness_weight
            + fluency.clamp(0.0, 100.0) * c.fluency_weight
            + pronunciation_accuracy.clamp(0.0, 100.0) * c.pronunciation_weight
    }

    /// Assemble the presentation payload, rounding every numeric field
    pub fn metrics(&self, scores: &UtteranceScores, pitch: &PitchReport) -> SpeechMetrics {
        SpeechMetrics {
            accuracy: round2(scores.accuracy),
            completeness: round2(scores.completeness),
            fluency: round2(scores.fluency),
            pronunciation_accuracy: round2(scores.pronunciation_accuracy),
            speech_quality: round2(scores.speech_quality),
            word_evaluation: scores.word_evaluation.clone(),
            pitch_analysis: pitch.per_word.clone(),
            overall_pitch: round2(pitch.overall),
        }
    }
}

/// Split text into lowercase words with surrounding punctuation stripped
pub fn normalize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| c.is_ascii_punctuation())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Classify recognized words against the reference set.
///
/// A word matching the reference classifies `None` only when its confidence
/// is strictly above the threshold; everything else is `Mispronounced`.
/// `Unknown` never appears here.
pub fn classify_words(
    assessed: &[AssessedWord],
    reference_words: &[String],
    confidence_threshold: f64,
) -> Vec<ScoredWord> {
    assessed
        .iter()
        .map(|w| {
            let word = w.word.to_lowercase();
            let error_type = if reference_words.contains(&word) && w.confidence > confidence_threshold
            {
                WordError::None
            } else {
                WordError::Mispronounced
            };
            ScoredWord {
                word,
                error_type,
                confidence: w.confidence,
            }
        })
        .collect()
}

/// Mean confidence (x100) over correctly pronounced words, divided by the
/// total word count. Mispronounced words contribute zero to the numerator
/// but still count in the denominator.
pub fn accuracy_score(words: &[ScoredWord]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let sum: f64 = words
        .iter()
        .filter(|w| w.error_type == WordError::None)
        .map(|w| w.confidence * 100.0)
        .sum();
    sum / words.len() as f64
}

/// Observed words-per-minute scaled against the reference rate, capped at 100
pub fn fluency_score(assessed: &[AssessedWord], reference_wpm: f64) -> f64 {
    let total_duration: f64 = assessed.iter().map(|w| w.duration_secs).sum();
    if assessed.is_empty() || total_duration <= 0.0 {
        return 0.0;
    }
    let wpm = assessed.len() as f64 / total_duration * 60.0;
    (wpm / reference_wpm * 100.0).min(100.0)
}

/// Recognized word count over reference word count, capped at 100
pub fn completeness_score(recognized: usize, reference: usize) -> f64 {
    if reference == 0 {
        return 0.0;
    }
    (recognized as f64 / reference as f64 * 100.0).min(100.0)
}

/// Share of words classified `None`, as a percentage of all recognized words
pub fn pronunciation_accuracy(words: &[ScoredWord]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let mispronounced = words
        .iter()
        .filter(|w| w.error_type != WordError::None)
        .count();
    (words.len() - mispronounced) as f64 / words.len() as f64 * 100.0
}

/// Per-word evaluation lines for display
pub fn word_evaluation(words: &[ScoredWord]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(idx, w)| {
            format!(
                "word {}: {}, error type: {}, confidence: {:.1}%",
                idx + 1,
                w.word,
                w.error_type,
                w.confidence * 100.0
            )
        })
        .collect()
}

/// Round to two decimal places, presentation only
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessed(word: &str, confidence: f64, duration_secs: f64) -> AssessedWord {
        AssessedWord {
            word: word.to_string(),
            confidence,
            duration_secs,
        }
    }

    fn reference(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_confidence_boundary_is_exclusive() {
        let reference = reference(&["hello", "world"]);
        let words = classify_words(
            &[assessed("hello", 0.81, 0.3), assessed("world", 0.80, 0.3)],
            &reference,
            0.8,
        );
        assert_eq!(words[0].error_type, WordError::None);
        assert_eq!(words[1].error_type, WordError::Mispronounced);
    }

    #[test]
    fn test_non_reference_word_is_mispronounced() {
        let reference = reference(&["hello"]);
        let words = classify_words(&[assessed("goodbye", 0.99, 0.3)], &reference, 0.8);
        assert_eq!(words[0].error_type, WordError::Mispronounced);
    }

    #[test]
    fn test_accuracy_counts_mispronounced_in_denominator() {
        let words = vec![
            ScoredWord {
                word: "hello".to_string(),
                error_type: WordError::None,
                confidence: 0.9,
            },
            ScoredWord {
                word: "world".to_string(),
                error_type: WordError::Mispronounced,
                confidence: 0.5,
            },
        ];
        // 0.9 * 100 / 2 words
        assert!((accuracy_score(&words) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_bounds() {
        assert_eq!(accuracy_score(&[]), 0.0);

        let all_perfect: Vec<ScoredWord> = (0..10)
            .map(|i| ScoredWord {
                word: format!("w{}", i),
                error_type: WordError::None,
                confidence: 1.0,
            })
            .collect();
        let score = accuracy_score(&all_perfect);
        assert!((0.0..=100.0).contains(&score));
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fluency_capped_at_reference_rate() {
        // 10 words in 1 second = 600 wpm, way past the cap
        let fast: Vec<AssessedWord> = (0..10).map(|i| assessed(&format!("w{}", i), 0.9, 0.1)).collect();
        assert_eq!(fluency_score(&fast, 150.0), 100.0);

        // 5 words in 4 seconds = 75 wpm = half the reference rate
        let slow: Vec<AssessedWord> = (0..5).map(|i| assessed(&format!("w{}", i), 0.9, 0.8)).collect();
        assert!((fluency_score(&slow, 150.0) - 50.0).abs() < 1e-9);

        assert_eq!(fluency_score(&[], 150.0), 0.0);
    }

    #[test]
    fn test_completeness_capped() {
        assert!((completeness_score(3, 4) - 75.0).abs() < 1e-9);
        assert_eq!(completeness_score(8, 4), 100.0);
        assert_eq!(completeness_score(3, 0), 0.0);
    }

    #[test]
    fn test_pronunciation_accuracy_denominator() {
        let words = vec![
            ScoredWord {
                word: "a".to_string(),
                error_type: WordError::None,
                confidence: 0.9,
            },
            ScoredWord {
                word: "b".to_string(),
                error_type: WordError::Mispronounced,
                confidence: 0.5,
            },
            ScoredWord {
                word: "c".to_string(),
                error_type: WordError::Unknown,
                confidence: 0.0,
            },
        ];
        assert!((pronunciation_accuracy(&words) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(pronunciation_accuracy(&[]), 0.0);
    }

    #[test]
    fn test_composite_monotonic_in_each_input() {
        let scorer = SpeechScorer::default();
        let base = scorer.composite_quality(50.0, 50.0, 50.0, 50.0);
        assert!(scorer.composite_quality(60.0, 50.0, 50.0, 50.0) > base);
        assert!(scorer.composite_quality(50.0, 60.0, 50.0, 50.0) > base);
        assert!(scorer.composite_quality(50.0, 50.0, 60.0, 50.0) > base);
        assert!(scorer.composite_quality(50.0, 50.0, 50.0, 60.0) > base);
    }

    #[test]
    fn test_composite_clamps_inputs() {
        let scorer = SpeechScorer::default();
        // Out-of-range inputs behave as if clamped
        assert_eq!(
            scorer.composite_quality(150.0, 100.0, 100.0, 100.0),
            scorer.composite_quality(100.0, 100.0, 100.0, 100.0)
        );
        assert_eq!(
            scorer.composite_quality(-20.0, 0.0, 0.0, 0.0),
            scorer.composite_quality(0.0, 0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_word_evaluation_format() {
        let words = vec![ScoredWord {
            word: "hello".to_string(),
            error_type: WordError::None,
            confidence: 0.925,
        }];
        let lines = word_evaluation(&words);
        assert_eq!(
            lines[0],
            "word 1: hello, error type: None, confidence: 92.5%"
        );
    }

    #[test]
    fn test_normalize_words_strips_punctuation() {
        assert_eq!(
            normalize_words("Hello, world! It's fine."),
            vec!["hello", "world", "it's", "fine"]
        );
    }

    #[test]
    fn test_full_scoring_determinism() {
        let scorer = SpeechScorer::default();
        let assessment = AssessmentResult {
            words: vec![
                assessed("the", 0.95, 0.2),
                assessed("quick", 0.85, 0.3),
                assessed("fox", 0.60, 0.25),
            ],
        };
        let a = scorer.score(&assessment, "The quick brown fox");
        let b = scorer.score(&assessment, "The quick brown fox");
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.speech_quality, b.speech_quality);
        assert_eq!(a.word_evaluation, b.word_evaluation);
        // 3 of 4 reference words recognized
        assert!((a.completeness - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(87.8571), 87.86);
        assert_eq!(round2(0.0), 0.0);
    }
}

//! Input handed over by an external OCR engine.

use serde::{Deserialize, Serialize};

/// A recognized word with the engine's confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    /// Recognized text.
    pub text: String,

    /// Recognition confidence (0 - 100).
    pub confidence: f32,
}

/// Full OCR output for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrOutput {
    /// Recognized text, lines separated by newlines.
    pub text: String,

    /// Per-word confidences, if the engine reports them.
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

impl OcrOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<OcrWord>) -> Self {
        self.words = words;
        self
    }

    /// Summarize word confidences. `None` when no words were supplied.
    pub fn word_stats(&self, threshold: f32) -> Option<WordStats> {
        if self.words.is_empty() {
            return None;
        }

        let confident = self
            .words
            .iter()
            .filter(|w| w.confidence >= threshold)
            .count();

        Some(WordStats {
            total: self.words.len(),
            confident,
            threshold,
        })
    }
}

/// Diagnostic summary of OCR word confidences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    /// Number of words reported.
    pub total: usize,

    /// Words at or above the threshold.
    pub confident: usize,

    /// Threshold used (0 - 100).
    pub threshold: f32,
}

impl WordStats {
    /// Share of confident words (0.0 - 1.0).
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.confident as f32 / self.total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_stats() {
        let ocr = OcrOutput::new("Total 12.00").with_words(vec![
            OcrWord { text: "Total".to_string(), confidence: 91.0 },
            OcrWord { text: "12.00".to_string(), confidence: 42.5 },
        ]);

        let stats = ocr.word_stats(60.0).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.confident, 1);
        assert!((stats.ratio() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_word_stats_without_words() {
        assert!(OcrOutput::new("text").word_stats(60.0).is_none());
    }
}

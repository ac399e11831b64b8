use log::{debug, warn};
use tiktoken_rs::{CoreBPE, cl100k_base};

pub trait TokenCounter {
    fn count_units(&self, text: &str) -> usize;
}

/// Heuristic: ~4 bytes per token, with whitespace-separated words as a floor.
pub fn estimate_units(text: &str) -> usize {
    let char_estimate = text.len() / 4;
    let word_estimate = text.split_whitespace().count();
    char_estimate.max(word_estimate)
}

/// Counts with the cl100k encoding, or estimates if the encoder could not be loaded.
pub struct TiktokenCounter {
    bpe: Option<CoreBPE>,
}

impl TiktokenCounter {
    pub fn new() -> Self {
        match cl100k_base() {
            Ok(bpe) => {
                debug!("Loaded cl100k_base encoding");
                Self { bpe: Some(bpe) }
            }
            Err(e) => {
                warn!("Falling back to estimated token counts: {}", e);
                Self { bpe: None }
            }
        }
    }
}

impl Default for TiktokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_units(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_with_special_tokens(text).len(),
            None => estimate_units(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_units() {
        assert_eq!(estimate_units(""), 0);
        assert_eq!(estimate_units("a b c"), 3);
        assert_eq!(estimate_units("abcdefghijklmnop"), 4);
    }

    #[test]
    fn test_tiktoken_counter() {
        let counter = TiktokenCounter::new();
        assert_eq!(counter.count_units(""), 0);
        assert!(counter.count_units("fn main() { println!(\"test\"); }") > 5);
    }

    #[test]
    fn test_default_counter_matches_new() {
        let text = "struct Bundle { files: Vec<String> }";
        assert_eq!(
            TiktokenCounter::default().count_units(text),
            TiktokenCounter::new().count_units(text)
        );
    }

    #[test]
    fn test_fallback_counter() {
        let counter = TiktokenCounter { bpe: None };
        assert_eq!(counter.count_units("hello world"), 2);
    }
}

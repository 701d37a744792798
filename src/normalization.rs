use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NormalizationConfig {
    pub lowercase: bool,
    pub trim: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            trim: true,
        }
    }
}

/// Normalizes a board word the way the vocabulary stores it.
pub fn normalize_word(raw: &str, config: &NormalizationConfig) -> String {
    let mut current = raw;
    if config.trim {
        current = current.trim();
    }
    if config.lowercase {
        current.to_lowercase()
    } else {
        current.to_string()
    }
}

/// Split whitespace- or comma-separated input into normalized words, dropping
/// empties and repeats while keeping first-seen order.
pub fn parse_word_list(input: &str, config: &NormalizationConfig) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for raw in input.split(|c: char| c.is_whitespace() || c == ',') {
        let word = normalize_word(raw, config);
        if !word.is_empty() && !words.contains(&word) {
            words.push(word);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        let config = NormalizationConfig::default();
        assert_eq!(normalize_word("  Apple ", &config), "apple");

        let keep_case = NormalizationConfig { lowercase: false, trim: true };
        assert_eq!(normalize_word(" Apple", &keep_case), "Apple");
    }

    #[test]
    fn test_parse_word_list() {
        let config = NormalizationConfig::default();
        assert_eq!(
            parse_word_list("Frog, mustard  frog\tMap", &config),
            vec!["frog", "mustard", "map"]
        );
        assert!(parse_word_list("  ", &config).is_empty());
    }
}

//! Random password generation with an "at least one digit" policy.

use crate::error::{Result, RotateError};
use rand::rngs::OsRng;
use rand::Rng;
use zeroize::Zeroizing;

/// Anything that can produce a candidate secret.
pub trait SecretSource {
    fn generate(&self) -> Zeroizing<String>;
}

/// Fixed-length strings over an alphabet, always containing a digit.
#[derive(Debug, Clone)]
pub struct DigitPolicyGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl DigitPolicyGenerator {
    /// The alphabet must contain an ASCII digit, or generation could never terminate.
    pub fn new(alphabet: &str, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(RotateError::Configuration(
                "secret length must be at least 1".into(),
            ));
        }
        let mut chars: Vec<char> = alphabet.chars().collect();
        chars.sort_unstable();
        chars.dedup();
        if chars.is_empty() {
            return Err(RotateError::Configuration("secret alphabet is empty".into()));
        }
        if !chars.iter().any(char::is_ascii_digit) {
            return Err(RotateError::Configuration(
                "secret alphabet must contain at least one digit".into(),
            ));
        }
        if let Some(c) = chars.iter().find(|c| c.is_whitespace() || **c == '/') {
            return Err(RotateError::Configuration(format!(
                "secret alphabet may not contain {:?}",
                c
            )));
        }
        Ok(Self {
            alphabet: chars,
            length,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw whole strings until one contains a digit.
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Zeroizing<String> {
        loop {
            let candidate: Zeroizing<String> = Zeroizing::new(
                (0..self.length)
                    .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
                    .collect(),
            );
            if contains_digit(&candidate) {
                return candidate;
            }
        }
    }
}

impl SecretSource for DigitPolicyGenerator {
    fn generate(&self) -> Zeroizing<String> {
        self.generate_with(&mut OsRng)
    }
}

pub fn contains_digit(word: &str) -> bool {
    word.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn default_generator() -> DigitPolicyGenerator {
        DigitPolicyGenerator::new(constants::DEFAULT_ALPHABET, 8).unwrap()
    }

    #[test]
    fn test_generate_length_and_digit() {
        let generator = default_generator();
        for _ in 0..2000 {
            let s = generator.generate();
            assert_eq!(s.chars().count(), 8);
            assert!(contains_digit(&s));
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_generate_with_seeded_rng_is_deterministic() {
        let generator = default_generator();
        let a = generator.generate_with(&mut StdRng::seed_from_u64(7));
        let b = generator.generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(*a, *b);
    }

    #[test]
    fn test_digits_only_alphabet() {
        let generator = DigitPolicyGenerator::new("0123456789", 4).unwrap();
        let s = generator.generate();
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_length_one_is_always_a_digit() {
        let generator = DigitPolicyGenerator::new("ab1", 1).unwrap();
        for _ in 0..200 {
            assert_eq!(&*generator.generate(), "1");
        }
    }

    #[test]
    fn test_alphabet_without_digit_rejected() {
        let err = DigitPolicyGenerator::new("abcdef", 8).unwrap_err();
        assert!(matches!(err, RotateError::Configuration(_)));
    }

    #[test]
    fn test_empty_alphabet_and_zero_length_rejected() {
        assert!(DigitPolicyGenerator::new("", 8).is_err());
        assert!(DigitPolicyGenerator::new("a1", 0).is_err());
    }

    #[test]
    fn test_separator_in_alphabet_rejected() {
        assert!(DigitPolicyGenerator::new("ab1/", 8).is_err());
        assert!(DigitPolicyGenerator::new("ab1 ", 8).is_err());
    }

    #[test]
    fn test_contains_digit() {
        assert!(contains_digit("abc1"));
        assert!(!contains_digit("abcd"));
        assert!(!contains_digit(""));
    }
}

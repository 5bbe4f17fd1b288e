//! Splitting text into the matches of a regular expression

use regex::Regex;
use splitseq_core::{Advance, BatchSplittable, Characteristics, Error, Result};

/// Yields every match of a pattern in a text, left to right.
///
/// Every match is reported, empty ones included. After an empty match the
/// search resumes one character further on.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    regex: Regex,
    text: String,
    position: usize,
    finished: bool,
}

impl RegexTokenizer {
    /// Tokenize `text` with an already compiled `regex`
    pub fn new(regex: Regex, text: impl Into<String>) -> Self {
        Self {
            regex,
            text: text.into(),
            position: 0,
            finished: false,
        }
    }

    /// Compile `pattern` and tokenize `text` with it
    pub fn from_pattern(pattern: &str, text: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::InvalidArgument(format!("Invalid pattern {pattern:?}: {e}")))?;
        Ok(Self::new(regex, text))
    }

    /// The pattern being matched
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The full input text
    pub fn text(&self) -> &str {
        &self.text
    }

    fn step_past(&self, offset: usize) -> usize {
        offset + self.text[offset..].chars().next().map_or(1, char::len_utf8)
    }
}

impl Advance for RegexTokenizer {
    type Item = String;

    fn try_advance(&mut self, action: &mut dyn FnMut(String)) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        let found = if self.position > self.text.len() {
            None
        } else {
            self.regex
                .find_at(&self.text, self.position)
                .map(|m| (m.start(), m.end()))
        };
        let Some((start, end)) = found else {
            self.finished = true;
            return Ok(false);
        };

        self.position = if start == end {
            self.step_past(end)
        } else {
            end
        };
        action(self.text[start..end].to_owned());
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::NONNULL | Characteristics::IMMUTABLE
    }
}

/// Tokenize `text` by `pattern`, splitting off tokens in batches of
/// `batch_size`
pub fn tokenize(
    pattern: &str,
    text: impl Into<String>,
    batch_size: usize,
) -> Result<BatchSplittable<RegexTokenizer>> {
    BatchSplittable::with_batch_size(RegexTokenizer::from_pattern(pattern, text)?, batch_size)
}

use std::sync::Arc;

use crate::error::TokenizeError;
use crate::item::Item;
use crate::measure::{Hyphenator, NoHyphenation, TextMeasurer};

/// Tokenization policy for one paragraph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParagraphOptions {
    /// First-line indent width; `> 0` emits a leading empty box.
    pub indent: f32,
    /// Ask the hyphenation oracle for break points inside unhyphenated words.
    pub hyphenation: bool,
    /// Inter-word glue multiplier after a sentence-ending word.
    pub sentence_space_factor: f32,
    /// Glue stretch as a fraction of the space width.
    pub space_stretch_ratio: f32,
    /// Glue shrink as a fraction of the space width.
    pub space_shrink_ratio: f32,
}

impl Default for ParagraphOptions {
    fn default() -> Self {
        Self {
            indent: 0.0,
            hyphenation: false,
            sentence_space_factor: 1.5,
            space_stretch_ratio: 1.0 / 2.0,
            space_shrink_ratio: 1.0 / 3.0,
        }
    }
}

/// Converts paragraph text into the item stream the breaker consumes.
///
/// Pure over its inputs: the same text, options, and oracles always yield
/// the same stream.
#[derive(Clone)]
pub struct ParagraphTokenizer {
    measurer: Arc<dyn TextMeasurer>,
    hyphenator: Arc<dyn Hyphenator>,
    options: ParagraphOptions,
}

impl core::fmt::Debug for ParagraphTokenizer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParagraphTokenizer")
            .field("options", &self.options)
            .finish()
    }
}

impl ParagraphTokenizer {
    /// Create a tokenizer around a width oracle, with default options and no
    /// hyphenation.
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            measurer,
            hyphenator: Arc::new(NoHyphenation),
            options: ParagraphOptions::default(),
        }
    }

    /// Install a syllabification oracle for automatic hyphenation.
    pub fn with_hyphenator(mut self, hyphenator: Arc<dyn Hyphenator>) -> Self {
        self.hyphenator = hyphenator;
        self
    }

    pub fn with_options(mut self, options: ParagraphOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ParagraphOptions {
        &self.options
    }

    /// Build the item stream for one paragraph.
    ///
    /// Words are whitespace-separated runs with punctuation attached.
    /// Explicit hyphens become flagged zero-width penalties between their
    /// syllable boxes; automatic hyphenation (when enabled) applies only to
    /// words that carry no explicit hyphen and inserts flagged penalties of
    /// hyphen width. The stream always ends with the terminator trio.
    pub fn tokenize(&self, text: &str) -> Result<Vec<Item>, TokenizeError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut items = Vec::with_capacity(words.len() * 2 + 4);

        if self.options.indent > 0.0 {
            items.push(Item::boxed(self.options.indent, ""));
        }

        for (index, word) in words.iter().enumerate() {
            if index > 0 {
                items.push(self.inter_word_glue(words[index - 1])?);
            }
            self.push_word(word, &mut items)?;
        }

        items.extend(Item::terminator());
        Ok(items)
    }

    fn inter_word_glue(&self, preceding: &str) -> Result<Item, TokenizeError> {
        let mut width = self.measure(" ")?;
        if preceding.ends_with(['.', '?', '!']) {
            width *= self.options.sentence_space_factor;
        }
        Ok(Item::glue(
            width,
            width * self.options.space_stretch_ratio,
            width * self.options.space_shrink_ratio,
        ))
    }

    fn push_word(&self, word: &str, items: &mut Vec<Item>) -> Result<(), TokenizeError> {
        let syllables: Vec<&str> = word.split('-').collect();
        let has_explicit_hyphen = syllables.len() > 1;

        for (index, syllable) in syllables.iter().enumerate() {
            let final_syllable = index + 1 == syllables.len();
            if !final_syllable {
                // The hyphen is already visible, so breaking here is free.
                let visible = format!("{syllable}-");
                items.push(Item::boxed(self.measure(&visible)?, visible));
                items.push(Item::penalty(0.0, 0.0, true));
            } else if self.options.hyphenation && !has_explicit_hyphen {
                self.push_hyphenated(syllable, items)?;
            } else {
                items.push(Item::boxed(self.measure(syllable)?, *syllable));
            }
        }
        Ok(())
    }

    fn push_hyphenated(&self, word: &str, items: &mut Vec<Item>) -> Result<(), TokenizeError> {
        let syllables = self.hyphenator.syllables(word);
        if syllables.len() <= 1 {
            items.push(Item::boxed(self.measure(word)?, word));
            return Ok(());
        }

        let mut rebuilt = String::with_capacity(word.len());
        for syllable in &syllables {
            if syllable.is_empty() {
                return Err(TokenizeError::EmptySyllable {
                    word: word.to_string(),
                });
            }
            rebuilt.push_str(syllable);
        }
        if rebuilt != word {
            return Err(TokenizeError::SyllableMismatch {
                word: word.to_string(),
                rebuilt,
            });
        }

        let hyphen_width = self.measure("-")?;
        for (index, syllable) in syllables.iter().enumerate() {
            if index > 0 {
                items.push(Item::penalty(hyphen_width, 0.0, true));
            }
            items.push(Item::boxed(self.measure(syllable)?, syllable.clone()));
        }
        Ok(())
    }

    fn measure(&self, text: &str) -> Result<f32, TokenizeError> {
        let width = self.measurer.measure_width(text);
        if width < 0.0 {
            return Err(TokenizeError::NegativeWidth {
                text: text.to_string(),
                width,
            });
        }
        if width == 0.0 && !text.is_empty() {
            log::warn!("width oracle reported zero width for {text:?}");
        }
        Ok(width)
    }
}

use core::fmt;

/// Tokenization failure caused by a misbehaving oracle.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenizeError {
    /// The width oracle reported a negative width.
    NegativeWidth { text: String, width: f32 },
    /// The hyphenation oracle produced an empty syllable.
    EmptySyllable { word: String },
    /// The hyphenation oracle's syllables do not reconstruct the word.
    SyllableMismatch { word: String, rebuilt: String },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::NegativeWidth { text, width } => {
                write!(f, "width oracle returned {width} for {text:?}")
            }
            TokenizeError::EmptySyllable { word } => {
                write!(f, "hyphenation oracle produced an empty syllable for {word:?}")
            }
            TokenizeError::SyllableMismatch { word, rebuilt } => {
                write!(
                    f,
                    "hyphenation oracle syllables rebuild {rebuilt:?}, expected {word:?}"
                )
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Line breaking failure.
#[derive(Clone, Debug, PartialEq)]
pub enum BreakError {
    /// The active frontier emptied mid-sweep: no chain of breaks keeps every
    /// line within the adjustment-ratio threshold. Recoverable by raising the
    /// threshold, enabling hyphenation, or widening the line.
    NoFeasibleSolution { position: usize, threshold: f32 },
    /// The stream does not end with the mandatory terminator trio
    /// (`Penalty(+inf)`, `Glue(0, +inf, 0)`, `Penalty(-inf)`). Caller bug.
    MissingTerminator,
}

impl fmt::Display for BreakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakError::NoFeasibleSolution {
                position,
                threshold,
            } => write!(
                f,
                "no feasible break chain at item {position} (threshold {threshold})"
            ),
            BreakError::MissingTerminator => {
                write!(f, "item stream is missing the paragraph terminator trio")
            }
        }
    }
}

impl std::error::Error for BreakError {}

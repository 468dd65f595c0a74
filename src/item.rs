use serde::{Deserialize, Serialize};

/// One element of a paragraph's item stream.
///
/// A stream is a flat sequence of boxes (unbreakable glyph runs), glue
/// (flexible whitespace), and penalties (discretionary break costs). The
/// breaker never looks inside box content; widths carry all the geometry.
///
/// Streams serialize as one tagged record per item. Infinite penalty costs
/// and infinite glue stretch are written as the keywords `"inf"` / `"-inf"`
/// so the sentinels survive formats without IEEE infinity literals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// An unbreakable run of glyphs with a fixed width.
    Box { width: f32, content: String },
    /// Flexible whitespace with natural width, stretch, and shrink.
    Glue {
        width: f32,
        #[serde(with = "maybe_infinite")]
        stretch: f32,
        shrink: f32,
    },
    /// A discretionary break cost; `+inf` forbids the break, `-inf` forces it.
    Penalty {
        width: f32,
        #[serde(with = "maybe_infinite")]
        penalty: f32,
        flagged: bool,
    },
}

impl Item {
    pub fn boxed(width: f32, content: impl Into<String>) -> Item {
        Item::Box {
            width,
            content: content.into(),
        }
    }

    pub fn glue(width: f32, stretch: f32, shrink: f32) -> Item {
        Item::Glue {
            width,
            stretch,
            shrink,
        }
    }

    pub fn penalty(width: f32, penalty: f32, flagged: bool) -> Item {
        Item::Penalty {
            width,
            penalty,
            flagged,
        }
    }

    /// Natural width of the item, whatever its variant.
    pub fn width(&self) -> f32 {
        match self {
            Item::Box { width, .. } => *width,
            Item::Glue { width, .. } => *width,
            Item::Penalty { width, .. } => *width,
        }
    }

    pub fn is_box(&self) -> bool {
        matches!(self, Item::Box { .. })
    }

    pub fn is_glue(&self) -> bool {
        matches!(self, Item::Glue { .. })
    }

    pub fn is_penalty(&self) -> bool {
        matches!(self, Item::Penalty { .. })
    }

    /// A penalty of `-inf`, i.e. an obligatory break point.
    pub fn is_forced_break(&self) -> bool {
        matches!(self, Item::Penalty { penalty, .. } if *penalty == f32::NEG_INFINITY)
    }

    /// True for a penalty whose flagged bit marks a hyphen-style break.
    pub fn is_flagged_penalty(&self) -> bool {
        matches!(self, Item::Penalty { flagged: true, .. })
    }

    /// The mandatory paragraph terminator: forbid a break, absorb arbitrary
    /// trailing slack, then force the final break.
    pub fn terminator() -> [Item; 3] {
        [
            Item::penalty(0.0, f32::INFINITY, false),
            Item::glue(0.0, f32::INFINITY, 0.0),
            Item::penalty(0.0, f32::NEG_INFINITY, true),
        ]
    }
}

/// Whether `stream` ends with the terminator trio every paragraph must carry.
pub fn has_terminator(stream: &[Item]) -> bool {
    let n = stream.len();
    if n < 3 {
        return false;
    }
    let forbid = matches!(
        &stream[n - 3],
        Item::Penalty { penalty, .. } if *penalty == f32::INFINITY
    );
    let fill = matches!(
        &stream[n - 2],
        Item::Glue { width, stretch, shrink }
            if *width == 0.0 && *stretch == f32::INFINITY && *shrink == 0.0
    );
    let force = stream[n - 1].is_forced_break();
    forbid && fill && force
}

mod maybe_infinite {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_str(if value.is_sign_positive() { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f32(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f32),
            Keyword(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(value),
            Raw::Keyword(keyword) => match keyword.as_str() {
                "inf" => Ok(f32::INFINITY),
                "-inf" => Ok(f32::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!(
                    "unknown dimension keyword: {other}"
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminator_trio_matches_invariant() {
        let trio = Item::terminator();
        let stream: Vec<Item> = trio.to_vec();
        assert!(has_terminator(&stream));
        assert!(stream[2].is_forced_break());
        assert!(stream[2].is_flagged_penalty());
    }

    #[test]
    fn terminator_detection_rejects_truncated_or_reordered_streams() {
        assert!(!has_terminator(&[]));
        assert!(!has_terminator(&[Item::boxed(10.0, "word")]));

        let mut reordered = Item::terminator().to_vec();
        reordered.swap(0, 2);
        assert!(!has_terminator(&reordered));

        let mut wrong_fill = Item::terminator().to_vec();
        wrong_fill[1] = Item::glue(0.0, 4.0, 0.0);
        assert!(!has_terminator(&wrong_fill));
    }

    #[test]
    fn infinite_dimensions_round_trip_as_keywords() {
        let stream = vec![
            Item::boxed(18.0, "bork"),
            Item::glue(6.0, 3.0, 2.0),
            Item::penalty(4.0, 50.0, true),
        ]
        .into_iter()
        .chain(Item::terminator())
        .collect::<Vec<Item>>();

        let json = serde_json::to_string(&stream).expect("stream should serialize");
        assert!(json.contains(r#""kind":"box""#));
        assert!(json.contains(r#""kind":"glue""#));
        assert!(json.contains(r#""penalty":"inf""#));
        assert!(json.contains(r#""penalty":"-inf""#));
        assert!(json.contains(r#""stretch":"inf""#));

        let back: Vec<Item> = serde_json::from_str(&json).expect("stream should deserialize");
        assert_eq!(back, stream);
    }
}

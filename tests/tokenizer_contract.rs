use std::sync::Arc;

use totalfit::{
    has_terminator, HeuristicMeasurer, Hyphenator, Item, MonospaceMeasurer, ParagraphOptions,
    ParagraphTokenizer,
};

struct VowelSplitter;

impl Hyphenator for VowelSplitter {
    // Split after every vowel, a crude stand-in for a real dictionary.
    fn syllables(&self, word: &str) -> Vec<String> {
        let mut syllables = Vec::new();
        let mut current = String::new();
        for ch in word.chars() {
            current.push(ch);
            if "aeiou".contains(ch) {
                syllables.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            syllables.push(current);
        }
        if syllables.is_empty() {
            vec![word.to_string()]
        } else {
            syllables
        }
    }
}

fn concatenated_boxes(stream: &[Item]) -> String {
    stream
        .iter()
        .filter_map(|item| match item {
            Item::Box { content, .. } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

fn squashed(text: &str) -> String {
    text.split_whitespace().collect()
}

#[test]
fn every_stream_ends_with_the_terminator_trio() {
    let texts = [
        "",
        "foo",
        "this is a test.",
        "cul-de-sac",
        "a  paragraph\twith   odd\n\nwhitespace",
    ];
    let tokenizer = ParagraphTokenizer::new(Arc::new(MonospaceMeasurer::new(10.0)));
    for text in texts {
        let stream = tokenizer.tokenize(text).expect("tokenize");
        assert!(
            has_terminator(&stream),
            "stream for {text:?} is missing the terminator trio"
        );
    }
}

#[test]
fn box_contents_rebuild_the_text_up_to_whitespace() {
    let texts = [
        "foo",
        "this is a test.",
        "cul-de-sac and more cul-de-sacs",
        "bork bork bork. bork bork bork",
        "a  paragraph\twith   odd\n\nwhitespace",
    ];
    let tokenizer = ParagraphTokenizer::new(Arc::new(HeuristicMeasurer::new(16.0)));
    for text in texts {
        let stream = tokenizer.tokenize(text).expect("tokenize");
        assert_eq!(
            concatenated_boxes(&stream),
            squashed(text),
            "box contents for {text:?} should rebuild the squashed text"
        );
    }
}

#[test]
fn hyphenation_marks_live_in_penalties_not_boxes() {
    let options = ParagraphOptions {
        hyphenation: true,
        ..ParagraphOptions::default()
    };
    let tokenizer = ParagraphTokenizer::new(Arc::new(MonospaceMeasurer::new(10.0)))
        .with_hyphenator(Arc::new(VowelSplitter))
        .with_options(options);

    let stream = tokenizer.tokenize("paragraph breaking").expect("tokenize");
    // Box contents still rebuild the words untouched.
    assert_eq!(concatenated_boxes(&stream), "paragraphbreaking");
    // The oracle's break points appear as flagged penalties of hyphen width.
    let hyphen_penalties = stream
        .iter()
        .filter(|item| {
            matches!(item, Item::Penalty { width, flagged: true, .. } if *width == 10.0)
        })
        .count();
    assert!(hyphen_penalties > 0, "expected discretionary hyphens");
}

#[test]
fn indent_box_is_content_free_and_first() {
    let options = ParagraphOptions {
        indent: 18.0,
        ..ParagraphOptions::default()
    };
    let tokenizer =
        ParagraphTokenizer::new(Arc::new(MonospaceMeasurer::new(10.0))).with_options(options);
    let stream = tokenizer.tokenize("indented text").expect("tokenize");
    assert_eq!(stream[0], Item::boxed(18.0, ""));
    // The indent box vanishes from the rebuilt text.
    assert_eq!(concatenated_boxes(&stream), "indentedtext");
}

#[test]
fn tokenization_is_deterministic() {
    let tokenizer = ParagraphTokenizer::new(Arc::new(HeuristicMeasurer::new(14.0)));
    let text = "determinism is part of the oracle contract.";
    let first = tokenizer.tokenize(text).expect("tokenize");
    let second = tokenizer.tokenize(text).expect("tokenize");
    assert_eq!(first, second);
}

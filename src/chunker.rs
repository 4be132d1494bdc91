//! Token-aware text chunking.
//!
//! Splits document text into pieces that fit a model context budget,
//! preferring paragraph boundaries and falling back to sentence boundaries
//! when a single paragraph is too large.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Token accounting for the downstream model.
///
/// Swapping implementations changes exact counts but never the boundary
/// semantics of [`chunk`]: paragraphs first, then sentences.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Character-based token estimator (1 token per ~4 characters).
///
/// Good enough for budgeting against GPT-family context windows without
/// shipping a full subword vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimator;

impl TokenCounter for CharEstimator {
    fn count(&self, text: &str) -> usize {
        text.chars().count() / 4 + 1
    }
}

/// How a chunk was carved out of the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKind {
    /// The whole document fit into a single chunk.
    Whole,
    /// Sealed along blank-line paragraph boundaries.
    Paragraph,
    /// At least one segment came from splitting an oversized paragraph
    /// into sentences.
    Sentence,
}

/// A contiguous slice of document text sized for one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub tokens: usize,
    pub split: SplitKind,
}

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    // Terminal punctuation followed by whitespace. The whitespace is
    // consumed by the split, the punctuation stays with its sentence.
    Regex::new(r"[.!?]\s+").expect("sentence boundary regex is valid")
});

fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BOUNDARY.find_iter(paragraph) {
        // The punctuation class is single-byte ASCII, so +1 is a valid
        // char boundary.
        pieces.push(&paragraph[start..m.start() + 1]);
        start = m.end();
    }
    let tail = &paragraph[start..];
    if !tail.trim().is_empty() {
        pieces.push(tail);
    }
    pieces
}

struct Segment<'a> {
    text: &'a str,
    tokens: usize,
    from_sentence: bool,
}

/// Lazy iterator over token-bounded chunks of `text`.
///
/// Pure function of its inputs: each call to [`chunk`] yields a fresh,
/// restartable sequence with no shared state.
pub struct Chunks<'a> {
    counter: &'a dyn TokenCounter,
    max_tokens: usize,
    /// Whole-document fast path, taken at most once.
    whole: Option<&'a str>,
    paragraphs: std::str::Split<'a, &'static str>,
    pending_sentences: VecDeque<&'a str>,
    /// Segment that did not fit into the previous chunk.
    carry: Option<Segment<'a>>,
    next_index: usize,
    done: bool,
}

/// Split `text` into chunks whose token counts stay within `max_tokens`.
///
/// Texts that already fit are passed through as a single chunk. Splitting
/// happens along blank-line paragraph boundaries first; a paragraph that
/// alone exceeds the budget is further split along sentence boundaries.
/// A single sentence over budget is emitted as its own oversized chunk
/// rather than truncated.
pub fn chunk<'a>(text: &'a str, max_tokens: usize, counter: &'a dyn TokenCounter) -> Chunks<'a> {
    let fits = !text.is_empty() && counter.count(text) <= max_tokens;
    Chunks {
        counter,
        max_tokens,
        whole: fits.then_some(text),
        paragraphs: if fits || text.is_empty() {
            "".split("\n\n")
        } else {
            text.split("\n\n")
        },
        pending_sentences: VecDeque::new(),
        carry: None,
        next_index: 0,
        done: text.is_empty(),
    }
}

impl<'a> Chunks<'a> {
    fn next_segment(&mut self) -> Option<Segment<'a>> {
        loop {
            if let Some(sentence) = self.pending_sentences.pop_front() {
                return Some(Segment {
                    text: sentence,
                    tokens: self.counter.count(sentence),
                    from_sentence: true,
                });
            }

            let paragraph = self.paragraphs.next()?;
            if paragraph.trim().is_empty() {
                continue;
            }

            let tokens = self.counter.count(paragraph);
            if tokens > self.max_tokens {
                self.pending_sentences.extend(split_sentences(paragraph));
                continue;
            }

            return Some(Segment {
                text: paragraph,
                tokens,
                from_sentence: false,
            });
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        if let Some(text) = self.whole.take() {
            self.done = true;
            return Some(Chunk {
                index: 0,
                text: text.to_string(),
                tokens: self.counter.count(text),
                split: SplitKind::Whole,
            });
        }

        let mut parts: Vec<&str> = Vec::new();
        let mut tokens = 0usize;
        let mut split = SplitKind::Paragraph;

        loop {
            let segment = match self.carry.take().or_else(|| self.next_segment()) {
                Some(segment) => segment,
                None => {
                    self.done = true;
                    break;
                }
            };

            if !parts.is_empty() && tokens + segment.tokens > self.max_tokens {
                self.carry = Some(segment);
                break;
            }

            if segment.tokens > self.max_tokens {
                // An unsplittable sentence larger than the budget passes
                // through whole; downstream has to live with it.
                warn!(
                    tokens = segment.tokens,
                    max_tokens = self.max_tokens,
                    "sentence exceeds chunk budget, emitting oversized chunk"
                );
            }

            if segment.from_sentence {
                split = SplitKind::Sentence;
            }
            tokens += segment.tokens;
            parts.push(segment.text);
        }

        if parts.is_empty() {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(Chunk {
            index,
            text: parts.join("\n\n"),
            tokens,
            split,
        })
    }
}

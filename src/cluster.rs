use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::samples::{PatternSample, SampleSeries};
use crate::tokenize::deduplicate_placeholders;

/// Renders a token sequence back into a display string. Clusters created
/// by training keep the unmarshal side of the tokenizer that produced
/// their tokens.
pub type Stringer = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// A mined message template together with its occurrence counters.
///
/// The identity of a cluster is its id; the template contents drift as the
/// cluster absorbs lines. Template length never changes after creation,
/// and a literal position can only generalize to the placeholder (or be
/// renamed to its canonical literal form), never the other way around.
pub struct LogCluster {
    id: u64,
    pub(crate) tokens: Vec<String>,
    size: u64,
    samples: SampleSeries,
    stringer: Option<Stringer>,
}

impl LogCluster {
    pub fn new(id: u64, tokens: Vec<String>, stringer: Option<Stringer>) -> Self {
        LogCluster {
            id,
            tokens,
            size: 0,
            samples: SampleSeries::default(),
            stringer,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The current template. Positions holding the placeholder matched
    /// differing values across the absorbed lines.
    pub fn template(&self) -> &[String] {
        &self.tokens
    }

    /// Number of training lines absorbed, including counts folded in from
    /// pre-aggregated samples.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn samples(&self) -> &SampleSeries {
        &self.samples
    }

    /// Absorbs one training line observed at `ts`.
    pub fn append(&mut self, ts: DateTime<Utc>) {
        self.size += 1;
        self.samples.record(ts);
    }

    /// Folds pre-aggregated samples into the cluster.
    pub fn merge(&mut self, samples: &[PatternSample]) {
        self.size += self.samples.merge(samples);
    }

    /// Renders the template for display, collapsing wildcard runs when no
    /// tokenizer-specific stringer is attached.
    pub fn render(&self, placeholder: &str) -> String {
        match &self.stringer {
            Some(stringer) => stringer(&self.tokens),
            None => deduplicate_placeholders(&self.tokens, placeholder).join(" "),
        }
    }
}

impl fmt::Debug for LogCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCluster")
            .field("id", &self.id)
            .field("tokens", &self.tokens)
            .field("size", &self.size)
            .field("samples", &self.samples)
            .finish_non_exhaustive()
    }
}

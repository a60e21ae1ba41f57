use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::cluster::{LogCluster, Stringer};
use crate::config::Config;
use crate::normalize::{DefaultNormalizer, TokenNormalizer};
use crate::samples::PatternSample;
use crate::similarity::create_template;
use crate::store::ClusterStore;
use crate::tokenize::{self, Tokenizer};
use crate::tree::PrefixTree;

/// Tokens longer than this are clipped and terminated with the
/// placeholder before training.
const MAX_TOKEN_BYTES: usize = 50;

#[derive(Debug, Error)]
pub enum DrainError {
    #[error("cluster depth must be at least 3, got {0}")]
    ClusterDepthTooSmall(usize),
}

/// Online log-template miner. Feed lines in one at a time; each line is
/// assigned to the cluster whose template explains it, generalizing the
/// template in place, or to a brand-new cluster when nothing is close
/// enough.
///
/// All operations run to completion on the caller's thread and mutate
/// shared structures in place, so multi-threaded callers must serialize
/// access externally.
pub struct Drain {
    config: Config,
    tree: PrefixTree,
    clusters: ClusterStore,
    clusters_counter: u64,
    tokenizer: Arc<dyn Tokenizer>,
    normalizer: Arc<dyn TokenNormalizer>,
    stringer: Stringer,
}

impl Drain {
    /// Builds an engine with the tokenization strategy selected by name
    /// (`"logfmt"` for key/value-aware splitting; anything else gets the
    /// adaptive default) and the default token normalizer.
    pub fn new(config: Config, tokenizer: &str) -> Result<Self, DrainError> {
        Self::with_components(
            config,
            tokenize::tokenizer_by_name(tokenizer),
            Arc::new(DefaultNormalizer),
        )
    }

    /// Builds an engine around caller-supplied tokenization and
    /// normalization strategies.
    pub fn with_components(
        config: Config,
        tokenizer: Arc<dyn Tokenizer>,
        normalizer: Arc<dyn TokenNormalizer>,
    ) -> Result<Self, DrainError> {
        if config.cluster_depth < 3 {
            return Err(DrainError::ClusterDepthTooSmall(config.cluster_depth));
        }
        let stringer: Stringer = {
            let tokenizer = Arc::clone(&tokenizer);
            Arc::new(move |tokens: &[String]| tokenizer.unmarshal(tokens))
        };
        Ok(Drain {
            clusters: ClusterStore::new(config.max_clusters),
            tree: PrefixTree::default(),
            clusters_counter: 0,
            tokenizer,
            normalizer,
            stringer,
            config,
        })
    }

    /// Absorbs one raw log line observed at `ts` and returns the cluster
    /// it was assigned to.
    pub fn train(&mut self, content: &str, ts: DateTime<Utc>) -> Option<&LogCluster> {
        let tokens = self.tokenizer.marshal(content);
        let stringer = Arc::clone(&self.stringer);
        self.train_inner(tokens, Some(stringer), Some(ts))
    }

    /// Absorbs one pre-tokenized line. `stringer` is kept on any cluster
    /// this call creates and used when rendering its template.
    pub fn train_tokens(
        &mut self,
        tokens: Vec<String>,
        stringer: Stringer,
        ts: DateTime<Utc>,
    ) -> Option<&LogCluster> {
        self.train_inner(tokens, Some(stringer), Some(ts))
    }

    fn train_inner(
        &mut self,
        mut tokens: Vec<String>,
        stringer: Option<Stringer>,
        ts: Option<DateTime<Utc>>,
    ) -> Option<&LogCluster> {
        for token in &mut tokens {
            clip_token(token, &self.config.placeholder);
        }
        let matched = self.tree.search(
            &mut tokens,
            self.config.sim_threshold,
            false,
            &self.clusters,
            &self.config,
            self.normalizer.as_ref(),
        );
        match matched {
            None => {
                self.clusters_counter += 1;
                let id = self.clusters_counter;
                debug!(id, token_count = tokens.len(), "no cluster above threshold, creating");
                let mut cluster = LogCluster::new(id, tokens, stringer);
                if let Some(ts) = ts {
                    cluster.append(ts);
                }
                self.tree.insert(
                    &mut cluster,
                    &mut self.clusters,
                    &self.config,
                    self.normalizer.as_ref(),
                );
                self.clusters.set(id, cluster);
                self.clusters.peek(id)
            }
            Some(id) => {
                let template = {
                    let cluster = self.clusters.peek(id)?;
                    create_template(&tokens, cluster.template(), &self.config.placeholder)
                };
                // The mutable get also refreshes recency, which is what
                // keeps actively trained clusters alive in the store.
                let cluster = self.clusters.get_mut(id)?;
                cluster.tokens = template;
                if let Some(ts) = ts {
                    cluster.append(ts);
                }
                Some(&*cluster)
            }
        }
    }

    /// Absorbs an already-templated pattern string together with its
    /// pre-aggregated occurrence counts.
    pub fn train_pattern(
        &mut self,
        content: &str,
        samples: &[PatternSample],
    ) -> Option<&LogCluster> {
        let mut tokens = tokenize::tokenize_pattern(content, &self.config.placeholder);
        let matched = self.tree.search(
            &mut tokens,
            self.config.sim_threshold,
            false,
            &self.clusters,
            &self.config,
            self.normalizer.as_ref(),
        );
        let id = match matched {
            None => {
                self.clusters_counter += 1;
                let id = self.clusters_counter;
                let mut cluster = LogCluster::new(id, tokens, None);
                self.tree.insert(
                    &mut cluster,
                    &mut self.clusters,
                    &self.config,
                    self.normalizer.as_ref(),
                );
                self.clusters.set(id, cluster);
                id
            }
            Some(id) => {
                let template = {
                    let cluster = self.clusters.peek(id)?;
                    create_template(&tokens, cluster.template(), &self.config.placeholder)
                };
                let cluster = self.clusters.get_mut(id)?;
                cluster.tokens = template;
                id
            }
        };
        let cluster = self.clusters.get_mut(id)?;
        cluster.merge(samples);
        Some(&*cluster)
    }

    /// Read-only lookup of the cluster that explains `content` exactly
    /// (wildcard positions count as matches). Neither the tree, the
    /// templates, nor the eviction order is modified; a miss is a normal
    /// outcome.
    pub fn match_line(&self, content: &str) -> Option<&LogCluster> {
        self.match_tokens_inner(self.content_as_tokens(content))
    }

    /// As `match_line`, for callers that already hold tokens.
    pub fn match_tokens(&self, tokens: &[String]) -> Option<&LogCluster> {
        self.match_tokens_inner(tokens.to_vec())
    }

    fn match_tokens_inner(&self, mut tokens: Vec<String>) -> Option<&LogCluster> {
        let id = self.tree.search(
            &mut tokens,
            1.0,
            true,
            &self.clusters,
            &self.config,
            self.normalizer.as_ref(),
        )?;
        self.clusters.peek(id)
    }

    fn content_as_tokens(&self, content: &str) -> Vec<String> {
        let mut content = content.to_string();
        for delimiter in &self.config.extra_delimiters {
            content = content.replace(delimiter.as_str(), " ");
        }
        content.split(' ').map(str::to_string).collect()
    }

    /// Forgets a cluster. Leaf references to the id linger until the next
    /// insertion at the same leaf sweeps them.
    pub fn delete(&mut self, cluster_id: u64) {
        self.clusters.remove(cluster_id);
    }

    /// Snapshot of live clusters, deduplicated by rendered template.
    /// When two clusters have generalized to the same shape, the most
    /// recently stored one wins.
    pub fn clusters(&self) -> Vec<&LogCluster> {
        let mut by_template: HashMap<String, &LogCluster> = HashMap::new();
        for cluster in self.clusters.values() {
            by_template.insert(cluster.render(&self.config.placeholder), cluster);
        }
        by_template.into_values().collect()
    }

    /// Number of live clusters, counting duplicates that `clusters`
    /// collapses.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Looks up a live cluster by id without touching eviction order.
    pub fn cluster(&self, id: u64) -> Option<&LogCluster> {
        self.clusters.peek(id)
    }

    /// The cluster's template as a user-facing pattern string, with
    /// wildcard runs collapsed. A template that says nothing but
    /// "anything" renders as the empty string.
    pub fn pattern_string(&self, cluster: &LogCluster) -> String {
        let rendered =
            tokenize::deduplicate_placeholders(cluster.template(), &self.config.placeholder)
                .join(" ");
        if rendered == self.config.placeholder {
            return String::new();
        }
        rendered
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn clip_token(token: &mut String, placeholder: &str) {
    if token.len() <= MAX_TOKEN_BYTES {
        return;
    }
    let mut end = MAX_TOKEN_BYTES;
    while !token.is_char_boundary(end) {
        end -= 1;
    }
    token.truncate(end);
    token.push_str(placeholder);
}

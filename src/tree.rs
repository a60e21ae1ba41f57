use std::collections::HashMap;
use tracing::{debug, trace};

use crate::cluster::LogCluster;
use crate::config::Config;
use crate::normalize::TokenNormalizer;
use crate::similarity::fast_match;
use crate::store::ClusterStore;

#[derive(Default)]
struct Node {
    children: HashMap<String, Node>,
    cluster_ids: Vec<u64>,
}

/// Two-tier prefix index over templates: token count selects a length
/// bucket, then up to `max_node_depth` leading tokens select the leaf
/// whose id list holds the match candidates.
///
/// Leaves hold cluster ids, never clusters, so the store is free to evict
/// without invalidating the tree; readers skip ids that no longer
/// resolve, and insertion sweeps them out.
#[derive(Default)]
pub struct PrefixTree {
    length_buckets: HashMap<usize, Node>,
}

impl PrefixTree {
    /// Locates the leaf for `tokens` and picks the best candidate there,
    /// or none if no path or no candidate clears `sim_th`.
    ///
    /// Interior edges resolve in three tiers: exact literal, normalized
    /// form, then the wildcard edge. On a normalized hit the query token
    /// is rewritten in place so the similarity pass compares against the
    /// canonical literal.
    pub fn search(
        &self,
        tokens: &mut [String],
        sim_th: f64,
        include_params: bool,
        store: &ClusterStore,
        config: &Config,
        normalizer: &dyn TokenNormalizer,
    ) -> Option<u64> {
        let token_count = tokens.len();
        let mut node = self.length_buckets.get(&token_count)?;

        // Degenerate lengths have no interior levels: the bucket is the leaf.
        if token_count < 2 {
            return node
                .cluster_ids
                .first()
                .copied()
                .filter(|id| store.contains(*id));
        }

        let mut depth = 1;
        for i in 0..token_count {
            if depth >= config.max_node_depth() || depth == token_count {
                break;
            }
            node = match node.children.get(&tokens[i]) {
                Some(child) => child,
                None => {
                    let normalized = normalizer.normalize(&tokens[i]);
                    match node.children.get(&normalized) {
                        Some(child) => {
                            tokens[i] = normalized;
                            child
                        }
                        None => node.children.get(&config.placeholder)?,
                    }
                }
            };
            depth += 1;
        }

        fast_match(
            &node.cluster_ids,
            tokens,
            sim_th,
            include_params,
            store,
            &config.placeholder,
        )
    }

    /// Threads a freshly created cluster into the tree, creating its path
    /// as needed and appending its id at the leaf.
    ///
    /// When an incoming token normalizes to the same canonical form as an
    /// existing edge key, the edge is relabelled to the canonical form and
    /// the rename is propagated into every template below it, so searches
    /// find the subtree by either spelling. When a node is out of edge
    /// slots, the wildcard edge takes the last slot and absorbs every
    /// unseen literal from then on.
    pub fn insert(
        &mut self,
        cluster: &mut LogCluster,
        store: &mut ClusterStore,
        config: &Config,
        normalizer: &dyn TokenNormalizer,
    ) {
        let token_count = cluster.tokens.len();
        let bucket = self.length_buckets.entry(token_count).or_default();

        if token_count == 0 {
            bucket.cluster_ids.push(cluster.id());
            return;
        }

        let mut node = bucket;
        let mut depth = 1;
        for i in 0..token_count {
            if depth >= config.max_node_depth() || depth >= token_count {
                // Reached the leaf: drop ids the store has evicted, then
                // append the newcomer.
                node.cluster_ids.retain(|id| store.contains(*id));
                node.cluster_ids.push(cluster.id());
                return;
            }

            let token = cluster.tokens[i].clone();
            let next_key = if node.children.contains_key(&token) {
                token
            } else {
                let normalized = normalizer.normalize(&token);
                let joinable = node
                    .children
                    .keys()
                    .find(|key| normalizer.normalize(key.as_str()) == normalized)
                    .cloned();
                match joinable {
                    Some(key) => {
                        // Group with the near-duplicate edge instead of
                        // spending a slot on a new literal.
                        cluster.tokens[i] = normalized.clone();
                        if key != normalized {
                            if let Some(subtree) = node.children.remove(&key) {
                                debug!(from = %key, to = %normalized, position = i, "relabelling edge to canonical form");
                                rename_position(
                                    &subtree,
                                    i,
                                    &normalized,
                                    &config.placeholder,
                                    store,
                                );
                                node.children.insert(normalized.clone(), subtree);
                            }
                        }
                        normalized
                    }
                    None => {
                        if node.children.contains_key(&config.placeholder) {
                            if node.children.len() < config.max_children {
                                token
                            } else {
                                config.placeholder.clone()
                            }
                        } else if node.children.len() + 1 < config.max_children {
                            token
                        } else if node.children.len() + 1 == config.max_children {
                            // Out of literal slots: the reserved last slot
                            // becomes the catch-all.
                            trace!(position = i, "fan-out cap reached, creating wildcard edge");
                            config.placeholder.clone()
                        } else {
                            config.placeholder.clone()
                        }
                    }
                }
            };
            node = node.children.entry(next_key).or_default();
            depth += 1;
        }
    }
}

/// Rewrites `position` to the canonical literal in every template
/// reachable from `node`. Positions already generalized to the wildcard
/// stay generalized.
fn rename_position(
    node: &Node,
    position: usize,
    replacement: &str,
    placeholder: &str,
    store: &mut ClusterStore,
) {
    for &id in &node.cluster_ids {
        if let Some(cluster) = store.peek_mut(id) {
            if let Some(slot) = cluster.tokens.get_mut(position) {
                if slot.as_str() != placeholder {
                    *slot = replacement.to_string();
                }
            }
        }
    }
    for child in node.children.values() {
        rename_position(child, position, replacement, placeholder, store);
    }
}

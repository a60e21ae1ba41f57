/// Tuning knobs for the mining engine.
///
/// The defaults follow the values that work well for mixed application
/// logs: a deep cluster path, a permissive similarity threshold, and a
/// small per-node fan-out so variable positions collapse into the
/// wildcard quickly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum template-position depth used for tree indexing. Must be at
    /// least 3; the first `cluster_depth - 2` tokens of a message select
    /// the leaf its candidates live at.
    pub cluster_depth: usize,
    /// Minimum similarity for training to attach a line to an existing
    /// cluster instead of creating a new one.
    pub sim_threshold: f64,
    /// Maximum edge fan-out per interior node. The last slot is reserved
    /// for the wildcard edge.
    pub max_children: usize,
    /// Capacity of the cluster LRU. Zero means unbounded.
    pub max_clusters: usize,
    /// Reserved token denoting "any value at this position".
    pub placeholder: String,
    /// Strings replaced by a single space before splitting in `match_line`.
    pub extra_delimiters: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cluster_depth: 18,
            sim_threshold: 0.5,
            max_children: 8,
            max_clusters: 300,
            placeholder: "<_>".to_string(),
            extra_delimiters: Vec::new(),
        }
    }
}

impl Config {
    pub(crate) fn max_node_depth(&self) -> usize {
        self.cluster_depth - 2
    }
}

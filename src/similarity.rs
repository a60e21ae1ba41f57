use crate::store::ClusterStore;
use crate::tokenize::EXACT_MATCH_MARK;

/// Positionwise similarity between a cluster template and an incoming
/// token sequence of the same length.
///
/// Returns `(sim, param_count)` where `param_count` is the number of
/// wildcard positions in the template. A template position marked for
/// exact matching that differs from the query is a hard rejection,
/// reported as `(0.0, -1)`.
///
/// With `include_params`, wildcard positions count as full matches; the
/// match path uses this so an already-generalized template still scores
/// 1.0 against a line it explains.
///
/// Panics if the sequences differ in length. The tree guarantees equal
/// length by bucketing on token count, so a mismatch means the caller
/// bypassed it.
pub fn seq_distance(
    template: &[String],
    tokens: &[String],
    include_params: bool,
    placeholder: &str,
) -> (f64, i64) {
    assert_eq!(
        template.len(),
        tokens.len(),
        "template and token sequences must be the same length"
    );

    let mut sim_tokens: i64 = 0;
    let mut param_count: i64 = 0;
    for (candidate, token) in template.iter().zip(tokens.iter()) {
        if candidate.starts_with(EXACT_MATCH_MARK) && candidate != token {
            return (0.0, -1);
        }
        if candidate == placeholder {
            param_count += 1;
        } else if candidate == token {
            sim_tokens += 1;
        }
    }
    if include_params {
        sim_tokens += param_count;
    }
    (sim_tokens as f64 / template.len() as f64, param_count)
}

/// Picks the best-matching live cluster among leaf candidates, by
/// similarity and then by wildcard count. Dead ids are skipped; the
/// lookup is a peek so matching never disturbs eviction order. Returns
/// the winner only if it clears `sim_th`.
pub fn fast_match(
    cluster_ids: &[u64],
    tokens: &[String],
    sim_th: f64,
    include_params: bool,
    store: &ClusterStore,
    placeholder: &str,
) -> Option<u64> {
    let mut best: Option<u64> = None;
    let mut max_sim = -1.0_f64;
    let mut max_param_count: i64 = -1;

    for &id in cluster_ids {
        let cluster = match store.peek(id) {
            Some(cluster) => cluster,
            None => continue,
        };
        let (sim, param_count) =
            seq_distance(cluster.template(), tokens, include_params, placeholder);
        if param_count < 0 {
            continue;
        }
        if sim > max_sim || (sim == max_sim && param_count > max_param_count) {
            max_sim = sim;
            max_param_count = param_count;
            best = Some(id);
        }
    }

    best.filter(|_| max_sim >= sim_th)
}

/// Generalizes a template against a matched token sequence: positions
/// that differ become the placeholder, everything else is kept. This is
/// the only way a template position generalizes.
pub fn create_template(tokens: &[String], template: &[String], placeholder: &str) -> Vec<String> {
    assert_eq!(
        template.len(),
        tokens.len(),
        "template and token sequences must be the same length"
    );
    template
        .iter()
        .zip(tokens.iter())
        .map(|(candidate, token)| {
            if token == candidate {
                candidate.clone()
            } else {
                placeholder.to_string()
            }
        })
        .collect()
}

//! Maximal marginal relevance selection.
//!
//! MMR balances query relevance against mutual diversity:
//! MMR = lambda * sim(query, doc) - (1 - lambda) * max(sim(doc, selected))
//!
//! lambda = 1.0 is pure relevance, lambda = 0.0 is pure diversity.
//! Used by both passage retrieval (k = 8) and example selection (k = 1).

/// Calculate cosine similarity between two vectors.
///
/// Mismatched lengths and zero vectors score 0.0 rather than erroring.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Greedily select up to `k` candidate indices maximizing marginal relevance.
///
/// `vectors` are the candidate embeddings in their ranked order. The first
/// pick is always the most query-relevant candidate; later picks trade
/// relevance against similarity to what was already selected. Returns
/// indices into `vectors`, in selection order.
pub fn mmr_select(query: &[f32], vectors: &[Vec<f32>], k: usize, lambda: f32) -> Vec<usize> {
    if vectors.is_empty() || k == 0 {
        return Vec::new();
    }

    let lambda = lambda.clamp(0.0, 1.0);
    let k = k.min(vectors.len());

    let relevance: Vec<f32> = vectors
        .iter()
        .map(|v| cosine_similarity(query, v))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k);
    let mut remaining: Vec<usize> = (0..vectors.len()).collect();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let max_selected_sim = selected
                .iter()
                .map(|&s| cosine_similarity(&vectors[candidate], &vectors[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let diversity_penalty = if selected.is_empty() {
                0.0
            } else {
                max_selected_sim
            };

            let score = lambda * relevance[candidate] - (1.0 - lambda) * diversity_penalty;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        selected.push(remaining.remove(best_pos));
    }

    selected
}

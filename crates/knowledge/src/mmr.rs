//! Maximal Marginal Relevance selection.
//!
//! `score = λ · sim(query, doc) − (1 − λ) · max sim(doc, selected)`
//!
//! λ = 1.0 ranks purely by relevance; λ = 0.0 purely by novelty.

use crate::index::cosine_similarity;

/// Pick up to `k` candidate indices by MMR, in selection order.
///
/// `candidates` holds embeddings in any order; ties go to the earlier index.
pub fn select(query: &[f32], candidates: &[Vec<f32>], k: usize, lambda: f32) -> Vec<usize> {
    let k = k.min(candidates.len());
    let lambda = lambda.clamp(0.0, 1.0);

    let relevance: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k);
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k {
        let mut best: Option<(usize, f32)> = None;

        for (pos, &idx) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(&candidates[idx], &candidates[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };

            let score = lambda * relevance[idx] - (1.0 - lambda) * redundancy;
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((pos, score));
            }
        }

        match best {
            Some((pos, _)) => selected.push(remaining.remove(pos)),
            None => break,
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_relevance_orders_by_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]];

        assert_eq!(select(&query, &candidates, 3, 1.0), vec![1, 2, 0]);
    }

    #[test]
    fn test_balanced_prefers_novel_over_duplicate() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            vec![1.0, 0.2],
            vec![1.0, 0.21],
            vec![1.0, -0.5],
        ];

        let picked = select(&query, &candidates, 2, 0.5);
        assert_eq!(picked, vec![0, 2]);
    }

    #[test]
    fn test_k_larger_than_candidates() {
        let picked = select(&[1.0], &[vec![1.0], vec![0.5]], 10, 0.5);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(select(&[1.0], &[], 3, 0.5).is_empty());
        assert!(select(&[1.0], &[vec![1.0]], 0, 0.5).is_empty());
    }
}

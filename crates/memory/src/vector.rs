//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and a ranked nearest-neighbor scan over
//! turns. Every backend shares these so that similarity semantics (and the
//! tie-break rule) cannot drift between implementations.

use localbrain_core::turn::Turn;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 =
/// opposite. Returns 0.0 if the vectors differ in length or either has zero
/// norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank turns by cosine similarity to a query embedding.
///
/// Returns up to `limit` turns sorted by descending similarity; equal
/// similarity is broken by more-recent position first. Turns without an
/// embedding and turns whose id is in `exclude` are skipped.
pub fn rank_by_similarity(
    turns: &[Turn],
    query: &[f32],
    limit: usize,
    exclude: &[String],
) -> Vec<Turn> {
    let mut scored: Vec<(f32, &Turn)> = turns
        .iter()
        .filter(|t| !exclude.contains(&t.id))
        .filter_map(|t| {
            let emb = t.embedding.as_ref()?;
            Some((cosine_similarity(emb, query), t))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.1.position.cmp(&a.1.position))
    });
    scored.truncate(limit);
    scored.into_iter().map(|(_, t)| t.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use localbrain_core::turn::{ConversationId, Turn, UserId};

    fn turn(content: &str, position: u64, embedding: Option<Vec<f32>>) -> Turn {
        let mut t = Turn::user(UserId::from("u1"), ConversationId::from("c1"), content);
        t.position = position;
        t.embedding = embedding;
        t
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_empty_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn cosine_zero_vector_is_degenerate() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1 → 1/sqrt(2)
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[test]
    fn ranks_by_descending_similarity() {
        let query = vec![1.0, 0.0, 0.0];
        let turns = vec![
            turn("orthogonal", 0, Some(vec![0.0, 1.0, 0.0])),
            turn("identical", 1, Some(vec![1.0, 0.0, 0.0])),
            turn("partial", 2, Some(vec![0.5, 0.5, 0.0])),
        ];

        let results = rank_by_similarity(&turns, &query, 10, &[]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "identical");
        assert_eq!(results[1].content, "partial");
        assert_eq!(results[2].content, "orthogonal");
    }

    #[test]
    fn ties_broken_by_more_recent_position() {
        let query = vec![1.0, 0.0];
        let turns = vec![
            turn("older", 2, Some(vec![1.0, 0.0])),
            turn("newer", 7, Some(vec![1.0, 0.0])),
        ];

        let results = rank_by_similarity(&turns, &query, 10, &[]);
        assert_eq!(results[0].content, "newer");
        assert_eq!(results[1].content, "older");
    }

    #[test]
    fn skips_turns_without_embeddings() {
        let query = vec![1.0, 0.0];
        let turns = vec![
            turn("embedded", 0, Some(vec![1.0, 0.0])),
            turn("bare", 1, None),
        ];

        let results = rank_by_similarity(&turns, &query, 10, &[]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "embedded");
    }

    #[test]
    fn excluded_ids_never_returned() {
        let query = vec![1.0, 0.0];
        let a = turn("keep", 0, Some(vec![1.0, 0.0]));
        let b = turn("skip", 1, Some(vec![1.0, 0.0]));
        let excluded = vec![b.id.clone()];

        let results = rank_by_similarity(&[a, b], &query, 10, &excluded);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "keep");
    }

    #[test]
    fn respects_limit() {
        let query = vec![1.0, 0.0];
        let turns: Vec<Turn> = (0..10)
            .map(|i| turn(&format!("t{i}"), i, Some(vec![1.0, i as f32 * 0.1])))
            .collect();

        let results = rank_by_similarity(&turns, &query, 3, &[]);
        assert_eq!(results.len(), 3);
    }
}

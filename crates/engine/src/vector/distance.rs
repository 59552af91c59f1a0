//! Cosine similarity kernel for the vector store.
//!
//! Scores are normalized to "higher = more similar": the similarity reported
//! to callers is `1 - cosine_distance`, i.e. plain cosine similarity in
//! [-1, 1]. Vectors are used as-is; the store never normalizes them
//! (producers are required to hand in L2-normalized embeddings).

/// Cosine similarity: dot(a, b) / (||a|| * ||b||).
///
/// Range: [-1, 1], higher = more similar.
/// Returns 0.0 if either vector has zero norm (avoids division by zero).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "dimension mismatch in similarity");

    let mut dot = 0.0f32;
    let mut norm_a_sq = 0.0f32;
    let mut norm_b_sq = 0.0f32;

    for (ai, bi) in a.iter().zip(b.iter()) {
        dot += ai * bi;
        norm_a_sq += ai * ai;
        norm_b_sq += bi * bi;
    }

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

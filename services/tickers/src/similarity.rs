//! Edit-distance similarity between tickers.

/// Default similarity above which two tickers are considered confusingly
/// similar. A pair at exactly this value does not collide.
pub const SIMILARITY_THRESHOLD: f64 = 0.8;

/// Levenshtein distance between `a` and `b`, with unit costs for insertion,
/// deletion and substitution, counted in characters.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Similarity in `[0, 1]`: the share of the longer string left untouched by
/// the edit distance. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a_len, b_len) = (a.chars().count(), b.chars().count());
    let (longer, shorter, longest) = if a_len >= b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };

    if longest == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(longer, shorter);
    (longest - distance) as f64 / longest as f64
}

/// Whether `a` and `b` collide under `threshold`.
pub fn too_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) > threshold
}

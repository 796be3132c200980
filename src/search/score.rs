pub const EXACT_MATCH: f32 = 1.0;
pub const LABEL_TOKEN_EXACT: f32 = 0.9;
pub const LABEL_CONTAINS: f32 = 0.7;
pub const LABEL_TOKEN_CONTAINS: f32 = 0.5;
pub const TYPE_CONTAINS: f32 = 0.3;
pub const NO_MATCH: f32 = 0.0;

/// Relevance of a node for `query`, in `[0, 1]`.
///
/// Comparison is case-insensitive and the first matching rung wins: exact
/// label or type, exact label word, label substring, label word substring,
/// type substring. An empty query scores 0; callers that want "show
/// everything" for an empty query must check for it themselves.
pub fn score(label: &str, node_type: &str, query: &str) -> f32 {
    if query.is_empty() {
        return NO_MATCH;
    }

    let query = query.to_lowercase();
    let label = label.to_lowercase();
    let node_type = node_type.to_lowercase();

    if label == query || node_type == query {
        return EXACT_MATCH;
    }

    if label.split_whitespace().any(|word| word == query) {
        return LABEL_TOKEN_EXACT;
    }

    if label.contains(&query) {
        return LABEL_CONTAINS;
    }

    if label.split_whitespace().any(|word| word.contains(&query)) {
        return LABEL_TOKEN_CONTAINS;
    }

    if node_type.contains(&query) {
        return TYPE_CONTAINS;
    }

    NO_MATCH
}

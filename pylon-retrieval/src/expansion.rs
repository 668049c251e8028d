//! Query expansion for the semantic path.
//!
//! Short queries carry little signal for embedding similarity, so known
//! domain terms are padded with synonym context before embedding. Pure
//! local lookup, no API calls. Long queries pass through untouched.

/// Queries longer than this are descriptive enough already.
const EXPANSION_MAX_LEN: usize = 60;

const EXPANSIONS: &[(&str, &str)] = &[
    ("caching", "response cache semantic cache performance"),
    ("testing", "unit test integration test coverage"),
    ("deployment", "deploy production rollout containers"),
    ("security", "authentication authorization vulnerability"),
    ("performance", "optimization latency throughput"),
    ("migration", "upgrade breaking changes versioning"),
    ("api", "rest endpoint request response contract"),
    ("database", "sql schema query index"),
    ("auth", "authentication authorization session tokens"),
    ("rag", "retrieval augmented generation embeddings search"),
    ("chunking", "text splitting segmentation retrieval"),
    ("monitoring", "logging metrics observability health"),
];

/// Expand a short query with synonym context when it names a known
/// domain term. Returns the query unchanged otherwise.
pub fn expand_query(query: &str) -> String {
    if query.len() > EXPANSION_MAX_LEN {
        return query.to_string();
    }

    let lower = query.to_lowercase();
    for (term, context) in EXPANSIONS {
        if lower.contains(term) {
            return format!("{query} {context}");
        }
    }
    query.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_term_gains_context() {
        let expanded = expand_query("caching strategies");
        assert!(expanded.starts_with("caching strategies"));
        assert!(expanded.len() > "caching strategies".len());
    }

    #[test]
    fn unknown_term_passes_through() {
        assert_eq!(expand_query("ostrich farming"), "ostrich farming");
    }

    #[test]
    fn long_queries_are_untouched() {
        let long = "how should a caching layer invalidate entries when the \
                    upstream source of truth changes frequently";
        assert_eq!(expand_query(long), long);
    }
}

use crate::models::CorpusDocument;

/// External corpus store: resolves item ids to displayable content.
///
/// The gateway never mutates document content. It reads documents to
/// build the keyword index and resolves snippets for responses.
pub trait ICorpusStore: Send + Sync {
    /// All retrievable documents, for keyword index construction.
    fn documents(&self) -> Vec<CorpusDocument>;

    /// Resolve an item id to a display snippet.
    fn snippet(&self, item_id: &str) -> Option<String>;
}

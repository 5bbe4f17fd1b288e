//! Documents matching an index term
//!
//! A [`TermDocs`] sequence walks the posting list of one term and loads the
//! stored fields of every document it names. The index itself stays behind
//! the [`Postings`] and [`DocumentStore`] traits; in-memory versions of both
//! are provided for tests and small corpora.

use std::collections::{HashMap, HashSet};
use std::io;

use splitseq_core::{Advance, BatchSplittable, Characteristics, Result};

/// Identifier of a document within an index
pub type DocId = u32;

/// Ids of the documents containing a term, in increasing order, each once
pub trait Postings {
    /// The next document id, or `None` once the list is exhausted
    fn next_doc(&mut self) -> io::Result<Option<DocId>>;
}

/// Loads stored documents by id
pub trait DocumentStore {
    /// A loaded document
    type Document;

    /// Load document `id` with only the given stored `fields`
    fn document(&self, id: DocId, fields: &HashSet<String>) -> io::Result<Self::Document>;
}

/// Yields the stored document of every posting of a term
#[derive(Debug)]
pub struct TermDocs<P, R> {
    postings: P,
    store: R,
    fields: HashSet<String>,
}

impl<P: Postings, R: DocumentStore> TermDocs<P, R> {
    /// Load `fields` of every document in `postings` from `store`
    pub fn new(postings: P, store: R, fields: HashSet<String>) -> Self {
        Self {
            postings,
            store,
            fields,
        }
    }

    /// Fields loaded for each document
    pub fn fields(&self) -> &HashSet<String> {
        &self.fields
    }
}

impl<P: Postings, R: DocumentStore> Advance for TermDocs<P, R> {
    type Item = R::Document;

    fn try_advance(&mut self, action: &mut dyn FnMut(R::Document)) -> Result<bool> {
        let Some(id) = self.postings.next_doc()? else {
            return Ok(false);
        };
        action(self.store.document(id, &self.fields)?);
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::NONNULL | Characteristics::DISTINCT
    }
}

/// Build a batch-splittable sequence over the documents of `postings`
pub fn term_docs<P, R, I>(postings: P, store: R, fields: I) -> BatchSplittable<TermDocs<P, R>>
where
    P: Postings,
    R: DocumentStore,
    I: IntoIterator,
    I::Item: Into<String>,
{
    let fields = fields.into_iter().map(Into::into).collect();
    BatchSplittable::new(TermDocs::new(postings, store, fields))
}

/// A posting list held in memory
#[derive(Debug, Clone)]
pub struct MemoryPostings {
    docs: std::vec::IntoIter<DocId>,
}

impl MemoryPostings {
    /// Post `docs`; ids are sorted and duplicates dropped
    pub fn new(mut docs: Vec<DocId>) -> Self {
        docs.sort_unstable();
        docs.dedup();
        Self {
            docs: docs.into_iter(),
        }
    }
}

impl Postings for MemoryPostings {
    fn next_doc(&mut self) -> io::Result<Option<DocId>> {
        Ok(self.docs.next())
    }
}

/// Documents as string-valued field maps, identified by insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Vec<HashMap<String, String>>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `document` and return its id
    pub fn add<K, V>(&mut self, document: impl IntoIterator<Item = (K, V)>) -> DocId
    where
        K: Into<String>,
        V: Into<String>,
    {
        let id = DocId::try_from(self.documents.len()).unwrap_or(DocId::MAX);
        self.documents.push(
            document
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        id
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is stored
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    type Document = HashMap<String, String>;

    fn document(&self, id: DocId, fields: &HashSet<String>) -> io::Result<Self::Document> {
        let stored = usize::try_from(id)
            .ok()
            .and_then(|index| self.documents.get(index))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no document with id {id}"))
            })?;
        Ok(stored
            .iter()
            .filter(|(name, _)| fields.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }
}

impl<R: DocumentStore> DocumentStore for &R {
    type Document = R::Document;

    fn document(&self, id: DocId, fields: &HashSet<String>) -> io::Result<Self::Document> {
        (**self).document(id, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitseq_core::{Error, SizeEstimate, Splittable};

    fn store() -> MemoryDocumentStore {
        let mut store = MemoryDocumentStore::new();
        store.add([("title", "Dune"), ("author", "Herbert"), ("year", "1965")]);
        store.add([("title", "Solaris"), ("author", "Lem"), ("year", "1961")]);
        store.add([("title", "Ubik"), ("author", "Dick"), ("year", "1969")]);
        store
    }

    struct BrokenPostings;

    impl Postings for BrokenPostings {
        fn next_doc(&mut self) -> io::Result<Option<DocId>> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated segment"))
        }
    }

    #[test]
    fn test_documents_follow_postings_with_loaded_fields_only() {
        let store = store();
        let mut seq = term_docs(MemoryPostings::new(vec![2, 0, 2]), &store, ["title"]);

        let mut titles = Vec::new();
        seq.for_each_remaining(&mut |doc| {
            assert_eq!(doc.len(), 1);
            titles.push(doc["title"].clone());
        })
        .unwrap();
        assert_eq!(titles, vec!["Dune", "Ubik"]);
    }

    #[test]
    fn test_missing_document_is_io_error() {
        let mut seq = term_docs(MemoryPostings::new(vec![7]), store(), ["title"]);
        match seq.next_item() {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_postings_failure_propagates() {
        let mut seq = term_docs(BrokenPostings, store(), ["title"]);
        assert!(matches!(seq.split(), Err(Error::Io(_))));
    }

    #[test]
    fn test_reports_distinct_ordered_unsized() {
        let seq = term_docs(MemoryPostings::new(vec![1]), store(), Vec::<String>::new());
        assert!(seq.has_characteristics(
            Characteristics::ORDERED | Characteristics::NONNULL | Characteristics::DISTINCT
        ));
        assert_eq!(seq.estimate_size(), SizeEstimate::Unbounded);
        assert!(seq.get_ref().fields().is_empty());
    }

    #[test]
    fn test_documents_split_into_batches() {
        let store = store();
        let mut seq = BatchSplittable::with_batch_size(
            TermDocs::new(
                MemoryPostings::new(vec![0, 1, 2]),
                &store,
                HashSet::from(["author".to_owned()]),
            ),
            2,
        )
        .unwrap();

        let first = seq.split().unwrap().unwrap();
        assert_eq!(first.len(), 2);
        let last = seq.split().unwrap().unwrap().into_vec();
        assert_eq!(last[0]["author"], "Dick");
        assert!(seq.split().unwrap().is_none());
    }
}

//! Sequence combinators and source adapters
//!
//! Every adapter here is an [`Advance`](splitseq_core::Advance) source, so it
//! plugs into [`BatchSplittable`](splitseq_core::BatchSplittable) and can be
//! split into batches and combined with the others.

pub mod fixed_batch;
pub mod partition_by;
pub mod postings;
pub mod resource;
pub mod sources;
pub mod tokenizer;
pub mod zip;

pub use fixed_batch::{fixed_batches, FixedBatch};
pub use partition_by::{partition_by, PartitionBy};
pub use postings::{
    term_docs, DocId, DocumentStore, MemoryDocumentStore, MemoryPostings, Postings, TermDocs,
};
pub use resource::{resource_sequence, result_stream, ResourceBound, Row, VecCursor};
pub use sources::{source_sequence, LineSource, RandomIntSource, VecSource};
pub use tokenizer::{tokenize, RegexTokenizer};
pub use zip::{zip, zip_all, Zip, ZipN};

// Re-export core types
pub use splitseq_core::{
    Advance, Batch, BatchSplittable, Characteristics, Closeable, Error, Result, SequenceStream,
    SizeEstimate, Splittable,
};

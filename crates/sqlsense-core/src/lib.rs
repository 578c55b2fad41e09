//! Context-aware code completion for MySQL SQL text.
//!
//! Given a buffer and a caret position, [`get_code_completion_list`]
//! returns the ordered proposal list for that spot: keywords legal at the
//! caret, built-in runtime functions, and object names resolved through a
//! metadata cache. Qualifier resolution, table reference harvesting and
//! the proposal mapping policy live in this crate; the metadata cache is
//! owned by the caller behind the [`MetadataCache`] trait.

pub mod cache;
pub mod driver;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod qualifier;
pub mod references;
pub mod scanner;
pub mod session;
pub mod synonyms;
pub mod types;

pub use cache::{MemoryCache, MetadataCache, MetadataDocument, SchemaMetadata, TableMetadata};
pub use driver::{get_code_completion_list, get_code_completion_list_with};
pub use error::LexError;
pub use grammar::{
    CandidateCollector, CandidatesCollection, CollectorConfig, MySqlCandidateCollector,
    RuleCandidate, RuleId, TokenCandidate,
};
pub use qualifier::{schema_table_qualifier, simple_qualifier, ObjectFlags};
pub use references::ReferenceCollector;
pub use scanner::TokenScanner;
pub use session::{ParserSession, QueryType};
pub use synonyms::keyword_synonyms;
pub use types::{
    CompletionSet, Keyword, ProposalEntry, ProposalKind, SqlToken, TableReference, TokenChannel,
    TokenKind,
};

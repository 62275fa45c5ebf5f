pub mod bm25;
pub mod intent;
pub mod synonyms;
pub mod tokenize;

pub use bm25::Bm25;
pub use intent::Intent;
pub use synonyms::{ExpandedQuery, SynonymTable};
pub use tokenize::{normalize, tokenize};

pub mod corpus;
pub mod model_store;

pub use corpus::{Corpus, CorpusLoader};
pub use model_store::{CorpusModel, ModelStore};

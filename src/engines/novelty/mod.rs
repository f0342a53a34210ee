//! Novelty search: dissimilarity metrics, the exemplar archive and
//! k-neighbour novelty scoring.

pub mod metrics;
pub mod selection;
pub mod archive;
pub mod search;

pub use archive::{AdmissionPolicy, NoveltyArchive};
pub use metrics::{
    norm_dissimilarity, norm_similarity, str_dissimilarity, str_similarity, JaccardMetric,
    SequenceMetric,
};
pub use search::NoveltyScorer;
pub use selection::{best_indices, tournament_indices, NeighborSelection};

//! Vector embedding and semantic scoring
//!
//! The [`model`] submodule wraps a Candle BERT encoder; [`scorer`]
//! holds the fixed topic reference vector and the fast/deep scoring
//! strategies built on top of it.

pub mod model;
pub mod scorer;

pub use model::{BertEncoder, EncoderSettings};
pub use scorer::{
    cosine_similarity, DeepScorer, FastScorer, ScoreStrategy, SemanticScorer, TextEncoder,
    TOPIC_REFERENCE,
};

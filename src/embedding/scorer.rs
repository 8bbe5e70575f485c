//! Semantic scoring against the fixed topic reference
//!
//! The reference vector is encoded once when the scorer is built and is
//! read-only for its lifetime. Two scoring strategies share one
//! contract: fast mode scores query texts in a single batch, deep mode
//! scores related-article context one item at a time through the
//! provider's rate limiter.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::models::RawTrend;
use crate::trends::TrendsClient;

/// Hand-curated description of the target topic, encoded once into the
/// reference vector every candidate is compared against.
pub const TOPIC_REFERENCE: &str = "artificial intelligence, machine learning, neural networks, \
    LLM, ChatGPT, GPT, OpenAI, DeepMind, Stability AI, Mistral AI, Anthropic, AI model, \
    AI research, Robot";

/// Text-to-vector encoder, order-preserving over batches
pub trait TextEncoder: Send + Sync {
    /// Encode a batch of texts; results match input order
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Compute cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Scores texts by cosine similarity against the topic reference
pub struct SemanticScorer {
    encoder: Arc<dyn TextEncoder>,
    reference: Vec<f32>,
}

impl SemanticScorer {
    /// Build a scorer for the default topic reference
    pub fn new(encoder: Arc<dyn TextEncoder>) -> Result<Self> {
        Self::with_reference(encoder, TOPIC_REFERENCE)
    }

    /// Build a scorer with a custom reference phrase
    pub fn with_reference(encoder: Arc<dyn TextEncoder>, phrase: &str) -> Result<Self> {
        let mut vectors = encoder.encode_batch(&[phrase.to_string()])?;
        let reference = vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("encoder returned no reference vector"))?;

        Ok(Self { encoder, reference })
    }

    /// Score a batch of texts, preserving input order
    ///
    /// Empty or whitespace-only texts score exactly 0.0 without
    /// invoking the model.
    pub fn score_texts(&self, texts: &[String]) -> Result<Vec<f32>> {
        let mut scores = vec![0.0f32; texts.len()];

        let mut indices = Vec::with_capacity(texts.len());
        let mut to_encode = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            if !text.trim().is_empty() {
                indices.push(i);
                to_encode.push(text.clone());
            }
        }

        if to_encode.is_empty() {
            return Ok(scores);
        }

        let embeddings = self.encoder.encode_batch(&to_encode)?;
        anyhow::ensure!(
            embeddings.len() == to_encode.len(),
            "encoder returned {} vectors for {} texts",
            embeddings.len(),
            to_encode.len()
        );

        for (i, embedding) in indices.into_iter().zip(&embeddings) {
            scores[i] = cosine_similarity(&self.reference, embedding);
        }

        Ok(scores)
    }
}

/// Scoring strategy contract shared by fast and deep modes
///
/// The ranking and export stages are unaware of which strategy is
/// active. A strategy failure is fatal to the run.
#[async_trait]
pub trait ScoreStrategy: Send + Sync {
    /// Semantic score per trend, matching input order
    async fn score_batch(&self, trends: &[RawTrend]) -> Result<Vec<f32>>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Fast mode: score the query text alone, one batched model invocation
pub struct FastScorer {
    scorer: SemanticScorer,
}

impl FastScorer {
    pub fn new(scorer: SemanticScorer) -> Self {
        Self { scorer }
    }
}

#[async_trait]
impl ScoreStrategy for FastScorer {
    async fn score_batch(&self, trends: &[RawTrend]) -> Result<Vec<f32>> {
        let queries: Vec<String> = trends.iter().map(|t| t.query.clone()).collect();
        self.scorer.score_texts(&queries)
    }

    fn name(&self) -> &'static str {
        "fast"
    }
}

/// Deep mode: score related-article context, sequential and rate-limited
///
/// Falls back to the bare query text when no article context is
/// retrievable. Markedly slower than fast mode: one item at a time,
/// each throttled by the provider client's rate limiter.
pub struct DeepScorer {
    scorer: SemanticScorer,
    client: Arc<TrendsClient>,
}

impl DeepScorer {
    pub fn new(scorer: SemanticScorer, client: Arc<TrendsClient>) -> Self {
        Self { scorer, client }
    }
}

#[async_trait]
impl ScoreStrategy for DeepScorer {
    async fn score_batch(&self, trends: &[RawTrend]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(trends.len());

        for trend in trends {
            let context = self.client.fetch_news_context(&trend.news_link).await;
            let text = if context.trim().is_empty() {
                trend.query.clone()
            } else {
                context
            };

            let score = self
                .scorer
                .score_texts(std::slice::from_ref(&text))?
                .first()
                .copied()
                .unwrap_or(0.0);
            scores.push(score);
        }

        Ok(scores)
    }

    fn name(&self) -> &'static str {
        "deep"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic encoder: AI-flavored texts map onto the reference
    /// axis, everything else onto the orthogonal one.
    struct StubEncoder {
        calls: AtomicUsize,
    }

    impl StubEncoder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextEncoder for StubEncoder {
        fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let lowered = t.to_lowercase();
                    if lowered.contains("artificial intelligence")
                        || lowered.contains("gpt")
                        || lowered.contains(" ai")
                    {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_scorer_orders_and_scores() {
        let scorer = SemanticScorer::new(Arc::new(StubEncoder::new())).unwrap();

        let texts = vec![
            String::from("openai gpt-5 release"),
            String::from("royal wedding"),
        ];
        let scores = scorer.score_texts(&texts).unwrap();

        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert!(scores[1].abs() < 1e-6);
    }

    #[test]
    fn test_blank_text_short_circuits() {
        let encoder = Arc::new(StubEncoder::new());
        let scorer = SemanticScorer::new(encoder.clone()).unwrap();
        let calls_after_reference = encoder.calls.load(Ordering::SeqCst);

        let scores = scorer
            .score_texts(&[String::new(), String::from("   ")])
            .unwrap();

        assert_eq!(scores, vec![0.0, 0.0]);
        // No model invocation beyond the reference encoding
        assert_eq!(encoder.calls.load(Ordering::SeqCst), calls_after_reference);
    }

    #[test]
    fn test_blank_and_real_texts_mixed() {
        let scorer = SemanticScorer::new(Arc::new(StubEncoder::new())).unwrap();

        let texts = vec![
            String::new(),
            String::from("mistral ai funding"),
            String::from(""),
        ];
        let scores = scorer.score_texts(&texts).unwrap();

        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 1.0).abs() < 1e-6);
        assert_eq!(scores[2], 0.0);
    }

    #[tokio::test]
    async fn test_fast_scorer_matches_input_order() {
        let scorer = SemanticScorer::new(Arc::new(StubEncoder::new())).unwrap();
        let strategy = FastScorer::new(scorer);

        let trends = vec![
            RawTrend {
                query: String::from("taylor swift tour"),
                geo: String::from("US"),
                search_volume: 90_000,
                news_link: String::new(),
            },
            RawTrend {
                query: String::from("anthropic ai claude"),
                geo: String::from("US"),
                search_volume: 30_000,
                news_link: String::new(),
            },
        ];

        let scores = strategy.score_batch(&trends).await.unwrap();
        assert!(scores[0] < 0.35);
        assert!(scores[1] > 0.35);
        assert_eq!(strategy.name(), "fast");
    }
}

//! Sentence embedding with Candle
//!
//! Wraps a BERT-based sentence-transformer model for short-phrase
//! embedding: batched inference, mean pooling over the attention mask
//! and L2 normalization, with CPU fallback when no GPU is available.

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use super::scorer::TextEncoder;

/// Embedding model used for query scoring (384-dim sentence vectors)
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Encoder settings
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    /// HuggingFace model ID or local path
    pub model_id: String,

    /// Maximum sequence length; longer inputs are truncated
    pub max_seq_length: usize,

    /// Batch size for inference
    pub batch_size: usize,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_seq_length: 256,
            batch_size: 64,
        }
    }
}

/// BERT sentence encoder
pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    settings: EncoderSettings,
}

impl BertEncoder {
    /// Download the model from the HuggingFace Hub and load it
    pub fn from_pretrained(settings: EncoderSettings) -> Result<Self> {
        let device = Device::cuda_if_available(0).unwrap_or(Device::Cpu);

        tracing::info!(
            model = %settings.model_id,
            device = ?device,
            "Loading embedding model"
        );

        let api = Api::new().context("Failed to create HuggingFace API")?;
        let repo = api.repo(Repo::new(settings.model_id.clone(), RepoType::Model));

        let tokenizer_path = repo
            .get("tokenizer.json")
            .context("Failed to download tokenizer")?;

        let config_path = repo
            .get("config.json")
            .context("Failed to download model config")?;

        let weights_path = repo
            .get("model.safetensors")
            .context("Failed to download model weights")?;

        Self::from_files(tokenizer_path, config_path, weights_path, settings, device)
    }

    /// Load the encoder from local files
    pub fn from_files(
        tokenizer_path: PathBuf,
        config_path: PathBuf,
        weights_path: PathBuf,
        settings: EncoderSettings,
        device: Device,
    ) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {e}"))?;

        let bert_config: BertConfig = serde_json::from_str(
            &std::fs::read_to_string(&config_path).context("Failed to read model config")?,
        )
        .context("Failed to parse model config")?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .context("Failed to load safetensors weights")?
        };

        let model = BertModel::load(vb, &bert_config).context("Failed to build BERT model")?;

        Ok(Self {
            model,
            tokenizer,
            device,
            settings,
        })
    }

    /// Embed one batch-size-bounded chunk of texts
    fn forward_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let encodings: Vec<_> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(self.settings.max_seq_length);

        let batch_size = encodings.len();

        let mut input_ids = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask = Vec::with_capacity(batch_size * max_len);
        let mut token_type_ids = Vec::with_capacity(batch_size * max_len);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let type_ids = encoding.get_type_ids();

            let seq_len = ids.len().min(max_len);

            input_ids.extend(ids.iter().take(seq_len).map(|&x| x as i64));
            attention_mask.extend(mask.iter().take(seq_len).map(|&x| x as i64));
            token_type_ids.extend(type_ids.iter().take(seq_len).map(|&x| x as i64));

            let padding = max_len - seq_len;
            input_ids.extend(std::iter::repeat(0i64).take(padding));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
            token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        let input_ids = Tensor::from_vec(input_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(attention_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(token_type_ids, (batch_size, max_len), &self.device)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = mean_pool(&hidden, &attention_mask)?;
        let normalized = l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}

impl TextEncoder for BertEncoder {
    /// Embed texts in batches, preserving input order
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.settings.batch_size) {
            embeddings.extend(self.forward_chunk(chunk)?);
        }

        Ok(embeddings)
    }
}

/// Mean pooling over the sequence dimension, weighted by attention mask
fn mean_pool(hidden_states: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.unsqueeze(2)?.to_dtype(DType::F32)?;

    let masked = hidden_states.broadcast_mul(&mask)?;
    let summed = masked.sum(1)?;

    let lengths = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    Ok(summed.broadcast_div(&lengths)?)
}

/// L2 normalize each row
fn l2_normalize(embeddings: &Tensor) -> Result<Tensor> {
    let norms = embeddings.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norms = norms.clamp(1e-12, f64::MAX)?;
    Ok(embeddings.broadcast_div(&norms)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_settings_default() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.model_id, DEFAULT_MODEL_ID);
        assert_eq!(settings.max_seq_length, 256);
        assert_eq!(settings.batch_size, 64);
    }

    #[test]
    fn test_mean_pool_respects_mask() {
        let device = Device::Cpu;
        // batch of 1, seq len 2, hidden 2; second position masked out
        let hidden =
            Tensor::from_vec(vec![1.0f32, 2.0, 9.0, 9.0], (1, 2, 2), &device).unwrap();
        let mask = Tensor::from_vec(vec![1i64, 0], (1, 2), &device).unwrap();

        let pooled = mean_pool(&hidden, &mask).unwrap();
        let values = pooled.to_vec2::<f32>().unwrap();
        assert!((values[0][0] - 1.0).abs() < 1e-6);
        assert!((values[0][1] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_unit_norm() {
        let device = Device::Cpu;
        let embeddings = Tensor::from_vec(vec![3.0f32, 4.0], (1, 2), &device).unwrap();

        let normalized = l2_normalize(&embeddings).unwrap();
        let values = normalized.to_vec2::<f32>().unwrap();
        let norm: f32 = values[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    // Integration tests require a model download
    #[test]
    #[ignore = "Requires model download"]
    fn test_encoder_from_pretrained() {
        let encoder = BertEncoder::from_pretrained(EncoderSettings::default());
        assert!(encoder.is_ok());
    }
}

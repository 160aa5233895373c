//! services/api/src/adapters/ocr.rs
//!
//! This module contains the OCR adapter: a TrOCR-style ONNX encoder/decoder
//! pair with greedy decoding. The engine is expensive to load, so it is
//! created at most once per process behind a `tokio::sync::OnceCell`; two
//! first-time concurrent requests cannot initialize it twice.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::imageops::FilterType;
use ort::{
    init, inputs,
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Value,
};
use studyaid_core::ports::{OcrLine, OcrService, PortError, PortResult};
use tokenizers::tokenizer::Tokenizer;
use tokio::sync::OnceCell;
use tracing::info;

const ENCODER_FILE: &str = "trocr_encoder.onnx";
const DECODER_FILE: &str = "trocr_decoder.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

// TrOCR input geometry and special token ids.
const INPUT_SIZE: u32 = 384;
const BOS_TOKEN_ID: i64 = 0;
const EOS_TOKEN_ID: u32 = 2;
const MAX_DECODE_TOKENS: usize = 256;

fn engine_err(e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("OCR engine: {}", e))
}

//=========================================================================================
// The Lazily-Initialized Engine
//=========================================================================================

struct TrOcrEngine {
    encoder: Session,
    decoder: Session,
    tokenizer: Tokenizer,
}

impl TrOcrEngine {
    /// Loads both ONNX sessions and the tokenizer. Missing model files are a
    /// configuration problem, not an upstream failure.
    fn load(model_dir: &Path) -> PortResult<Self> {
        let encoder_path = model_dir.join(ENCODER_FILE);
        let decoder_path = model_dir.join(DECODER_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);
        if !encoder_path.exists() || !decoder_path.exists() || !tokenizer_path.exists() {
            return Err(PortError::NotConfigured("OCR model files"));
        }

        info!("loading OCR engine from {}", model_dir.display());
        let _ = init();

        let encoder = Session::builder()
            .map_err(engine_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(engine_err)?
            .with_intra_threads(2)
            .map_err(engine_err)?
            .commit_from_file(&encoder_path)
            .map_err(engine_err)?;

        let decoder = Session::builder()
            .map_err(engine_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(engine_err)?
            .with_intra_threads(2)
            .map_err(engine_err)?
            .commit_from_file(&decoder_path)
            .map_err(engine_err)?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(engine_err)?;
        info!("OCR engine loaded");

        Ok(Self {
            encoder,
            decoder,
            tokenizer,
        })
    }

    /// Resizes to the model's input geometry and normalizes into CHW order.
    fn preprocess(image_bytes: &[u8]) -> PortResult<Vec<f32>> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| PortError::Malformed(format!("could not decode image: {}", e)))?;
        let rgb = image
            .grayscale()
            .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Lanczos3)
            .to_rgb8();

        let side = INPUT_SIZE as usize;
        let mut pixels = Vec::with_capacity(3 * side * side);
        for channel in 0..3 {
            for y in 0..INPUT_SIZE {
                for x in 0..INPUT_SIZE {
                    pixels.push(rgb.get_pixel(x, y)[channel] as f32 / 255.0);
                }
            }
        }
        Ok(pixels)
    }

    /// Greedy autoregressive decode over the encoded image.
    fn recognize(&mut self, image_bytes: &[u8]) -> PortResult<Vec<OcrLine>> {
        let pixels = Self::preprocess(image_bytes)?;
        let side = INPUT_SIZE as usize;

        let (enc_shape, enc_data): (_, Vec<f32>) = {
            let encoder_input = Value::from_array(([1_usize, 3, side, side], pixels.into_boxed_slice()))
                .map_err(engine_err)?;
            let outputs = self.encoder.run(inputs![encoder_input]).map_err(engine_err)?;
            let (shape, data) = outputs[0].try_extract_tensor::<f32>().map_err(engine_err)?;
            (shape.clone(), data.to_vec())
        };

        let mut decoder_input_ids: Vec<i64> = vec![BOS_TOKEN_ID];
        let mut generated: Vec<u32> = Vec::new();
        let mut confidence_sum = 0.0_f32;

        for _ in 0..MAX_DECODE_TOKENS {
            let input_ids = Value::from_array((
                [1_usize, decoder_input_ids.len()],
                decoder_input_ids.clone().into_boxed_slice(),
            ))
            .map_err(engine_err)?;
            let encoder_hidden_states =
                Value::from_array((enc_shape.clone(), enc_data.clone().into_boxed_slice()))
                    .map_err(engine_err)?;
            let use_cache = Value::from_array(([1_usize], vec![false].into_boxed_slice()))
                .map_err(engine_err)?;

            let outputs = self
                .decoder
                .run(inputs![
                    "input_ids" => input_ids,
                    "encoder_hidden_states" => encoder_hidden_states,
                    "use_cache_branch" => use_cache
                ])
                .map_err(engine_err)?;

            let (logits_shape, logits_data) =
                outputs[0].try_extract_tensor::<f32>().map_err(engine_err)?;
            let vocab_size = logits_shape[2] as usize;
            let last_start = ((logits_shape[1] - 1) * logits_shape[2]) as usize;
            let last_logits = &logits_data[last_start..last_start + vocab_size];

            let (next_token, max_logit) = last_logits
                .iter()
                .enumerate()
                .fold((0usize, f32::NEG_INFINITY), |(best, best_logit), (i, &l)| {
                    if l > best_logit {
                        (i, l)
                    } else {
                        (best, best_logit)
                    }
                });
            let next_token = next_token as u32;

            // Softmax probability of the greedy choice.
            let denom: f32 = last_logits.iter().map(|&l| (l - max_logit).exp()).sum();
            confidence_sum += 1.0 / denom;

            if next_token == EOS_TOKEN_ID {
                break;
            }
            generated.push(next_token);
            decoder_input_ids.push(next_token as i64);

            // Stop when the decoder gets stuck repeating one token.
            if generated.len() >= 5 && generated[generated.len() - 5..].iter().all(|&t| t == next_token)
            {
                break;
            }
        }

        if generated.is_empty() {
            return Ok(Vec::new());
        }

        let text = self
            .tokenizer
            .decode(&generated, true)
            .map_err(engine_err)?
            .trim()
            .to_string();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let confidence = confidence_sum / generated.len() as f32;
        Ok(vec![OcrLine { text, confidence }])
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `OcrService` with a lazily-created TrOCR engine.
pub struct TrOcrAdapter {
    model_dir: PathBuf,
    engine: OnceCell<Arc<Mutex<TrOcrEngine>>>,
}

impl TrOcrAdapter {
    /// Creates a new `TrOcrAdapter`. The engine is not loaded until the
    /// first image arrives.
    pub fn new(model_dir: PathBuf) -> Self {
        Self {
            model_dir,
            engine: OnceCell::new(),
        }
    }

    async fn engine(&self) -> PortResult<Arc<Mutex<TrOcrEngine>>> {
        self.engine
            .get_or_try_init(|| async {
                let model_dir = self.model_dir.clone();
                // Session building is blocking and heavy; keep it off the runtime.
                tokio::task::spawn_blocking(move || TrOcrEngine::load(&model_dir))
                    .await
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .map(|engine| Arc::new(Mutex::new(engine)))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl OcrService for TrOcrAdapter {
    /// Runs inference on a blocking worker; the decode loop is synchronous
    /// CPU work, like the session build above.
    async fn recognize(&self, image: &[u8]) -> PortResult<Vec<OcrLine>> {
        let engine = self.engine().await?;
        let image = image.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| PortError::Unexpected("OCR engine lock poisoned".to_string()))?;
            engine.recognize(&image)
        })
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_models_short_circuit_as_not_configured() {
        let adapter = TrOcrAdapter::new(PathBuf::from("/nonexistent/models"));
        assert!(matches!(
            adapter.recognize(&[0u8; 8]).await,
            Err(PortError::NotConfigured("OCR model files"))
        ));
    }
}

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

use super::utils::{CONFIG_FILE, WEIGHTS_FILE};

fn read_config(model_dir: &Path) -> Result<(Config, serde_json::Value)> {
    let raw = std::fs::read_to_string(model_dir.join(CONFIG_FILE))?;
    let config: Config = serde_json::from_str(&raw)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))?;
    Ok((config, value))
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join(WEIGHTS_FILE);
    unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
}

/// Loads the encoder trunk from `bert.*`, `roberta.*` or un-prefixed weights.
fn load_trunk(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

enum ClassificationHead {
    /// BERT style: a single linear layer over the first token.
    Linear(Linear),
    /// RoBERTa style: dense + tanh + out projection.
    Dense { dense: Linear, out_proj: Linear },
}

impl ClassificationHead {
    fn load(vb: VarBuilder, hidden_size: usize, num_labels: usize) -> Result<Self> {
        if vb.contains_tensor("classifier.out_proj.weight") {
            let dense = candle_nn::linear(hidden_size, hidden_size, vb.pp("classifier.dense"))?;
            let out_proj =
                candle_nn::linear(hidden_size, num_labels, vb.pp("classifier.out_proj"))?;
            Ok(Self::Dense { dense, out_proj })
        } else {
            let linear = candle_nn::linear(hidden_size, num_labels, vb.pp("classifier"))?;
            Ok(Self::Linear(linear))
        }
    }

    fn forward(&self, first_token: &Tensor) -> Result<Tensor> {
        match self {
            Self::Linear(linear) => linear.forward(first_token),
            Self::Dense { dense, out_proj } => {
                let hidden = dense.forward(first_token)?.tanh()?;
                out_proj.forward(&hidden)
            }
        }
    }
}

struct SequenceClassifierImpl {
    bert: BertModel,
    head: ClassificationHead,
    id2label: Vec<String>,
}

/// Sequence-pair classifier (e.g. a fact-verification or NLI fine-tune).
#[derive(Clone)]
pub struct BertSequenceClassifier(Arc<SequenceClassifierImpl>);

impl BertSequenceClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let (config, raw) = read_config(model_dir)?;
        let id2label = parse_id2label(&raw);
        if id2label.is_empty() {
            return Err(candle::Error::Msg(
                "config.json declares no labels (id2label)".to_string(),
            ));
        }

        let vb = load_var_builder(model_dir, device)?;
        let bert = load_trunk(&vb, &config)?;
        let head = ClassificationHead::load(vb, config.hidden_size, id2label.len())?;

        Ok(Self(Arc::new(SequenceClassifierImpl {
            bert,
            head,
            id2label,
        })))
    }

    /// Class names indexed by logit position.
    pub fn id2label(&self) -> &[String] {
        &self.0.id2label
    }

    /// Returns logits shaped `[batch, num_labels]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .0
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let first_token = output.i((.., 0, ..))?;
        self.0.head.forward(&first_token)
    }
}

/// Sentence encoder producing mask-aware mean-pooled embeddings.
#[derive(Clone)]
pub struct BertEncoder(Arc<BertModel>);

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let (config, _) = read_config(model_dir)?;
        let vb = load_var_builder(model_dir, device)?;
        let bert = load_trunk(&vb, &config)?;
        Ok(Self(Arc::new(bert)))
    }

    /// Returns pooled embeddings shaped `[batch, hidden]`.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let output = self
            .0
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = output.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
        summed.broadcast_div(&counts)
    }
}

/// Reads `id2label` (`{"0": "SUPPORTS", ...}`) into a position-indexed vector.
pub fn parse_id2label(config: &serde_json::Value) -> Vec<String> {
    let Some(map) = config.get("id2label").and_then(|v| v.as_object()) else {
        return Vec::new();
    };

    let mut entries: Vec<(usize, String)> = map
        .iter()
        .filter_map(|(idx, label)| Some((idx.parse().ok()?, label.as_str()?.to_string())))
        .collect();
    entries.sort_by_key(|(idx, _)| *idx);

    let contiguous = entries
        .iter()
        .enumerate()
        .all(|(position, (idx, _))| position == *idx);
    if !contiguous {
        return Vec::new();
    }

    entries.into_iter().map(|(_, label)| label).collect()
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents an OpenRouter model identifier.
///
/// This can be one of the models offered in the selector or a custom string
/// for any other model the provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Models offered in the selector.
    Known(KnownModel),

    /// Custom model identifier.
    Custom(String),
}

/// The fixed set of models offered in the selector, in display order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Dolphin Mistral 24B (Venice edition)
    #[serde(rename = "cognitivecomputations/dolphin-mistral-24b-venice-edition:free")]
    DolphinMistral24b,

    /// Gemma 3N E2B
    #[serde(rename = "google/gemma-3n-e2b-it:free")]
    Gemma3nE2b,

    /// Mistral Small 3.2 24B
    #[serde(rename = "mistralai/mistral-small-3.2-24b-instruct:free")]
    MistralSmall32,

    /// DeepSeek R1 distilled onto Qwen3 8B
    #[serde(rename = "deepseek/deepseek-r1-0528-qwen3-8b:free")]
    DeepSeekR1Qwen3,

    /// Gemma 3N E4B
    #[serde(rename = "google/gemma-3n-e4b-it:free")]
    Gemma3nE4b,

    /// Microsoft MAI DS R1
    #[serde(rename = "microsoft/mai-ds-r1:free")]
    MaiDsR1,

    /// Llama 4 Maverick
    #[serde(rename = "meta-llama/llama-4-maverick:free")]
    Llama4Maverick,

    /// Llama 3.1 Nemotron Ultra 253B
    #[serde(rename = "nvidia/llama-3.1-nemotron-ultra-253b-v1:free")]
    NemotronUltra253b,
}

impl KnownModel {
    /// Every selectable model, in the order the selector lists them.
    pub const ALL: [KnownModel; 8] = [
        KnownModel::DolphinMistral24b,
        KnownModel::Gemma3nE2b,
        KnownModel::MistralSmall32,
        KnownModel::DeepSeekR1Qwen3,
        KnownModel::Gemma3nE4b,
        KnownModel::MaiDsR1,
        KnownModel::Llama4Maverick,
        KnownModel::NemotronUltra253b,
    ];

    /// The provider's identifier for this model.
    pub fn id(self) -> &'static str {
        match self {
            KnownModel::DolphinMistral24b => {
                "cognitivecomputations/dolphin-mistral-24b-venice-edition:free"
            }
            KnownModel::Gemma3nE2b => "google/gemma-3n-e2b-it:free",
            KnownModel::MistralSmall32 => "mistralai/mistral-small-3.2-24b-instruct:free",
            KnownModel::DeepSeekR1Qwen3 => "deepseek/deepseek-r1-0528-qwen3-8b:free",
            KnownModel::Gemma3nE4b => "google/gemma-3n-e4b-it:free",
            KnownModel::MaiDsR1 => "microsoft/mai-ds-r1:free",
            KnownModel::Llama4Maverick => "meta-llama/llama-4-maverick:free",
            KnownModel::NemotronUltra253b => "nvidia/llama-3.1-nemotron-ultra-253b-v1:free",
        }
    }

    /// The human-readable name shown in the selector.
    pub fn display_name(self) -> &'static str {
        match self {
            KnownModel::DolphinMistral24b => "Dolphin Mistral 24B",
            KnownModel::Gemma3nE2b => "Gemma 3N E2B",
            KnownModel::MistralSmall32 => "Mistral Small 3.2 24B",
            KnownModel::DeepSeekR1Qwen3 => "DeepSeek R1 Qwen3 8B",
            KnownModel::Gemma3nE4b => "Gemma 3N E4B",
            KnownModel::MaiDsR1 => "Microsoft MAI DS R1",
            KnownModel::Llama4Maverick => "Llama 4 Maverick",
            KnownModel::NemotronUltra253b => "Llama 3.1 Nemotron Ultra 253B",
        }
    }
}

impl Model {
    /// The identifier sent to the provider.
    pub fn id(&self) -> &str {
        match self {
            Model::Known(known) => known.id(),
            Model::Custom(custom) => custom,
        }
    }

    /// The name to show a user.  Custom models show their identifier.
    pub fn display_name(&self) -> &str {
        match self {
            Model::Known(known) => known.display_name(),
            Model::Custom(custom) => custom,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::ALL[0])
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for KnownModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KnownModel::ALL
            .into_iter()
            .find(|known| known.id() == s)
            .ok_or_else(|| format!("unknown model: {s}"))
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        match model.parse::<KnownModel>() {
            Ok(known) => Model::Known(known),
            Err(_) => Model::Custom(model),
        }
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::from(model.to_string())
    }
}

/// One entry of the model selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    /// Provider identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<KnownModel> for ModelOption {
    fn from(model: KnownModel) -> Self {
        Self {
            id: model.id().to_string(),
            name: model.display_name().to_string(),
        }
    }
}

/// The selector contents returned by `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    /// Selectable models in display order.
    pub models: Vec<ModelOption>,
    /// Identifier of the model selected on a fresh session.
    pub default: String,
}

impl ModelCatalog {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        Self {
            models: KnownModel::ALL.into_iter().map(ModelOption::from).collect(),
            default: Model::default().id().to_string(),
        }
    }
}

//! # Pipeline Configuration
//!
//! The pipeline is configured with a [`PipelineConfig`]: the set of stages to
//! run by default, a language tag and a handful of shared options. Partial
//! updates are expressed as [`PipelineConfigPatch`] values and applied with
//! an explicit merge so the override semantics stay documented in one place
//! instead of relying on whatever a serde round-trip would happen to do.
//!
//! ## Merge semantics
//!
//! - Top-level fields (`stages`, `language`) **replace** the stored value
//!   when present in the patch.
//! - `options` sub-fields merge **individually**: a patch that only sets
//!   `keepPunctuation` leaves `caseSensitive` and `customDictionary` alone.

use serde::{Deserialize, Serialize};

/// The annotation stages the pipeline knows about.
///
/// `Sentiment` is part of the declared stage vocabulary but has no
/// implementing processor; enabling it is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Tokenize,
    Pos,
    Ner,
    Parse,
    Coref,
    Sentiment,
}

impl PipelineStage {
    /// Stage name as used in configuration and logs.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Tokenize => "tokenize",
            PipelineStage::Pos => "pos",
            PipelineStage::Ner => "ner",
            PipelineStage::Parse => "parse",
            PipelineStage::Coref => "coref",
            PipelineStage::Sentiment => "sentiment",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Options shared across stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineOptions {
    /// Accepted for downstream matching; token boundaries never depend on it.
    pub case_sensitive: bool,
    /// Emit punctuation characters as their own one-character tokens.
    pub keep_punctuation: bool,
    /// Declared for callers that carry one; no stage consumes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dictionary: Option<Vec<String>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            keep_punctuation: true,
            custom_dictionary: None,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Stages that run when a `process` call passes no per-call options.
    pub stages: Vec<PipelineStage>,
    /// Language tag carried into every result. Annotation behavior is
    /// German-only regardless of the value.
    pub language: String,
    pub options: PipelineOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: vec![
                PipelineStage::Tokenize,
                PipelineStage::Pos,
                PipelineStage::Ner,
                PipelineStage::Parse,
                PipelineStage::Coref,
            ],
            language: "de".to_string(),
            options: PipelineOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Applies a partial update and returns the merged configuration.
    ///
    /// See the module docs for the per-field override semantics.
    pub fn merged(mut self, patch: PipelineConfigPatch) -> Self {
        if let Some(stages) = patch.stages {
            self.stages = stages;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(options) = patch.options {
            if let Some(case_sensitive) = options.case_sensitive {
                self.options.case_sensitive = case_sensitive;
            }
            if let Some(keep_punctuation) = options.keep_punctuation {
                self.options.keep_punctuation = keep_punctuation;
            }
            if let Some(custom_dictionary) = options.custom_dictionary {
                self.options.custom_dictionary = Some(custom_dictionary);
            }
        }
        self
    }
}

/// Partial update for [`PipelineConfig`]; absent fields keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfigPatch {
    pub stages: Option<Vec<PipelineStage>>,
    pub language: Option<String>,
    pub options: Option<PipelineOptionsPatch>,
}

/// Partial update for [`PipelineOptions`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineOptionsPatch {
    pub case_sensitive: Option<bool>,
    pub keep_punctuation: Option<bool>,
    pub custom_dictionary: Option<Vec<String>>,
}

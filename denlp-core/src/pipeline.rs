//! # Annotation Pipeline — Orchestrator
//!
//! The pipeline owns the configuration and the four stage processors and
//! decides per call which stages run. Control flow:
//!
//! 1. **Tokenize** — always runs.
//! 2. **POS** — runs when enabled; its output gates everything below.
//! 3. **NER**, **Parse**, **Coref** — each individually enabled, but only
//!    reachable when POS ran. Enabling NER while disabling POS yields tokens
//!    only; that is the dependency rule, not a configuration bug.
//!
//! Stage enablement per call: with a [`ProcessingOptions`] value present, a
//! stage runs unless explicitly set to `false`; with none, a stage runs iff
//! its name is in the configured stage list.
//!
//! Processors hold only their fixed rule tables, so concurrent `process`
//! calls on a shared pipeline are safe. Reconfiguration replaces the
//! processors and is **not** synchronized against in-flight calls; callers
//! serialize `set_config` against `process` themselves.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PipelineConfig, PipelineConfigPatch, PipelineStage};
use crate::coref::{Coreference, CoreferenceResolver};
use crate::error::{NlpError, Result};
use crate::ner::{EntityRecognizer, NamedEntity};
use crate::parser::{ParseNode, ShallowParser};
use crate::tagger::{PosTag, PosTagger};
use crate::tokenizer::{Token, Tokenizer, TokenizerOptions};

/// Per-call stage-enable flags. A stage not mentioned runs; a stage set to
/// `false` is skipped. The presence of this value overrides the configured
/// stage list entirely.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingOptions {
    pub tokenize: Option<bool>,
    pub pos: Option<bool>,
    pub ner: Option<bool>,
    pub parse: Option<bool>,
    pub coref: Option<bool>,
    pub sentiment: Option<bool>,
}

impl ProcessingOptions {
    fn flag(&self, stage: PipelineStage) -> Option<bool> {
        match stage {
            PipelineStage::Tokenize => self.tokenize,
            PipelineStage::Pos => self.pos,
            PipelineStage::Ner => self.ner,
            PipelineStage::Parse => self.parse,
            PipelineStage::Coref => self.coref,
            PipelineStage::Sentiment => self.sentiment,
        }
    }
}

/// Metadata attached to every successful result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    pub processing_ms: u64,
    pub used_stages: Vec<PipelineStage>,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// Aggregated annotation result. Only the layers whose stages ran are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub language: String,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<Token>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Vec<PosTag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<NamedEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_tree: Option<ParseNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coreferences: Option<Vec<Coreference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

/// The annotation pipeline.
///
/// Construction compiles every rule table once; `process` borrows the
/// processors immutably and allocates nothing shared.
pub struct Pipeline {
    config: PipelineConfig,
    tokenizer: Tokenizer,
    tagger: PosTagger,
    recognizer: EntityRecognizer,
    parser: ShallowParser,
    resolver: CoreferenceResolver,
}

impl Pipeline {
    /// Builds a pipeline with the default configuration (all five stages,
    /// language `de`, punctuation kept).
    pub fn new() -> Result<Self> {
        Self::with_config(PipelineConfig::default())
    }

    /// Builds a pipeline from a full configuration.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        let tokenizer = Tokenizer::new(TokenizerOptions {
            keep_punctuation: config.options.keep_punctuation,
            case_sensitive: config.options.case_sensitive,
        })?;
        Ok(Self {
            tokenizer,
            tagger: PosTagger::new()?,
            recognizer: EntityRecognizer::new()?,
            parser: ShallowParser::new()?,
            resolver: CoreferenceResolver::new(),
            config,
        })
    }

    /// Returns a copy of the current configuration.
    pub fn config(&self) -> PipelineConfig {
        self.config.clone()
    }

    /// Merges a partial update into the stored configuration and rebuilds
    /// all stage processors from the merged value.
    pub fn set_config(&mut self, patch: PipelineConfigPatch) -> Result<()> {
        let merged = self.config.clone().merged(patch);
        *self = Self::with_config(merged)?;
        Ok(())
    }

    /// Runs the enabled stages over `text` and aggregates their outputs.
    ///
    /// Fails as a whole: a stage error discards everything already computed.
    pub fn process(
        &self,
        text: &str,
        options: Option<&ProcessingOptions>,
    ) -> Result<ProcessingResult> {
        let started = Instant::now();
        let mut used_stages = vec![PipelineStage::Tokenize];

        let tokens = self.tokenizer.tokenize(text);
        debug!(tokens = tokens.len(), "tokenized input");

        let mut pos = None;
        let mut entities = None;
        let mut parse_tree = None;
        let mut coreferences = None;

        if self.should_run(PipelineStage::Pos, options) {
            let tags = self.tagger.tag(&tokens);
            used_stages.push(PipelineStage::Pos);
            debug!(tags = tags.len(), "tagged tokens");

            if self.should_run(PipelineStage::Ner, options) {
                let found = self.recognizer.recognize(&tokens);
                debug!(entities = found.len(), "recognized entities");
                used_stages.push(PipelineStage::Ner);
                entities = Some(found);
            }

            if self.should_run(PipelineStage::Parse, options) {
                let tree = self
                    .parser
                    .parse(&tokens, &tags)
                    .map_err(|e| NlpError::processing(e.to_string()))?;
                used_stages.push(PipelineStage::Parse);
                parse_tree = Some(tree);
            }

            if self.should_run(PipelineStage::Coref, options) {
                let chains = self
                    .resolver
                    .resolve(&tokens, &tags)
                    .map_err(|e| NlpError::processing(e.to_string()))?;
                debug!(chains = chains.len(), "resolved coreferences");
                used_stages.push(PipelineStage::Coref);
                coreferences = Some(chains);
            }

            pos = Some(tags);
        }

        Ok(ProcessingResult {
            language: self.config.language.clone(),
            raw: text.to_string(),
            tokens: Some(tokens),
            pos,
            entities,
            parse_tree,
            coreferences,
            metadata: Some(ResultMetadata {
                processing_ms: started.elapsed().as_millis() as u64,
                used_stages,
                timestamp: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        })
    }

    fn should_run(&self, stage: PipelineStage, options: Option<&ProcessingOptions>) -> bool {
        match options {
            Some(options) => options.flag(stage) != Some(false),
            None => self.config.stages.contains(&stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineOptionsPatch, PipelineStage};
    use crate::ner::EntityType;
    use crate::parser::NodeType;
    use crate::tagger::GermanPos;

    #[test]
    fn test_disabling_pos_gates_all_downstream_stages() {
        let pipeline = Pipeline::new().unwrap();
        let options = ProcessingOptions {
            pos: Some(false),
            ner: Some(true),
            ..Default::default()
        };
        let result = pipeline
            .process("Herr Müller wohnt in Hamburg.", Some(&options))
            .unwrap();
        assert!(result.tokens.is_some());
        assert!(result.pos.is_none());
        assert!(result.entities.is_none());
        assert!(result.parse_tree.is_none());
        assert!(result.coreferences.is_none());
    }

    #[test]
    fn test_options_object_overrides_configured_stages() {
        let config = PipelineConfig {
            stages: vec![PipelineStage::Tokenize],
            ..Default::default()
        };
        let pipeline = Pipeline::with_config(config).unwrap();
        // without options only tokenize runs
        let result = pipeline.process("Der Hund bellt.", None).unwrap();
        assert!(result.pos.is_none());
        // an options object makes unmentioned stages run again
        let result = pipeline
            .process("Der Hund bellt.", Some(&ProcessingOptions::default()))
            .unwrap();
        assert!(result.pos.is_some());
        assert!(result.entities.is_some());
    }

    #[test]
    fn test_configured_stage_subset() {
        let config = PipelineConfig {
            stages: vec![PipelineStage::Tokenize, PipelineStage::Pos],
            ..Default::default()
        };
        let pipeline = Pipeline::with_config(config).unwrap();
        let result = pipeline.process("Der Hund bellt.", None).unwrap();
        assert!(result.pos.is_some());
        assert!(result.entities.is_none());
        assert!(result.parse_tree.is_none());
        assert!(result.coreferences.is_none());
    }

    #[test]
    fn test_end_to_end() {
        let pipeline = Pipeline::new().unwrap();
        let result = pipeline.process("Die Bank ist groß.", None).unwrap();

        let tokens = result.tokens.as_ref().unwrap();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["Die", "Bank", "ist", "groß", "."]);

        // capitalization dominates the tagger, nothing matches "groß" or "."
        let tags: Vec<GermanPos> = result
            .pos
            .as_ref()
            .unwrap()
            .iter()
            .map(|t| t.tag)
            .collect();
        assert_eq!(
            tags,
            [
                GermanPos::Noun,
                GermanPos::Noun,
                GermanPos::Verb,
                GermanPos::Other,
                GermanPos::Other,
            ]
        );

        // no legal-form suffix, so no organization; the two capitalized
        // words fall back to PERSON and merge into one adjacent span
        let entities = result.entities.as_ref().unwrap();
        assert!(entities
            .iter()
            .all(|e| e.entity_type != EntityType::Organization));
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity, "Die Bank");

        let tree = result.parse_tree.as_ref().unwrap();
        assert_eq!(tree.node_type, NodeType::Clause);
        let child_types: Vec<NodeType> =
            tree.children.iter().map(|c| c.node_type).collect();
        assert_eq!(child_types, vec![NodeType::Np, NodeType::Vp]);

        assert!(result.coreferences.as_ref().unwrap().is_empty());

        let metadata = result.metadata.as_ref().unwrap();
        assert!(metadata.used_stages.contains(&PipelineStage::Parse));
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_empty_input() {
        let pipeline = Pipeline::new().unwrap();
        let result = pipeline.process("", None).unwrap();
        assert!(result.tokens.as_ref().unwrap().is_empty());
        assert!(result.pos.as_ref().unwrap().is_empty());
        assert!(result.entities.as_ref().unwrap().is_empty());
        // an empty token stream still yields an empty CLAUSE root
        assert_eq!(
            result.parse_tree.as_ref().unwrap().node_type,
            NodeType::Clause
        );
    }

    #[test]
    fn test_reconfiguration_rebuilds_processors() {
        let mut pipeline = Pipeline::new().unwrap();
        let result = pipeline.process("Er lacht.", None).unwrap();
        assert_eq!(result.tokens.as_ref().unwrap().len(), 3);

        pipeline
            .set_config(PipelineConfigPatch {
                options: Some(PipelineOptionsPatch {
                    keep_punctuation: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();
        let result = pipeline.process("Er lacht.", None).unwrap();
        assert_eq!(result.tokens.as_ref().unwrap().len(), 2);
        assert!(!pipeline.config().options.keep_punctuation);
        // untouched fields survive the merge
        assert_eq!(pipeline.config().language, "de");
    }

    #[test]
    fn test_result_wire_format() {
        let pipeline = Pipeline::new().unwrap();
        let result = pipeline.process("die Katze schläft.", None).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["language"], "de");
        assert!(json.get("parseTree").is_some());
        assert_eq!(json["parseTree"]["type"], "CLAUSE");
        assert_eq!(json["tokens"][0]["value"], "die");
        assert!(json["metadata"]["usedStages"]
            .as_array()
            .unwrap()
            .contains(&serde_json::Value::String("pos".into())));
    }

    #[test]
    fn test_language_tag_is_carried_through() {
        let config = PipelineConfig {
            language: "de-CH".to_string(),
            ..Default::default()
        };
        let pipeline = Pipeline::with_config(config).unwrap();
        let result = pipeline.process("Grüezi", None).unwrap();
        assert_eq!(result.language, "de-CH");
    }
}

//! # denlp-core — Rule-based Annotation Pipeline for German Text
//!
//! This crate turns raw German text into a layered annotation: token spans,
//! part-of-speech tags, named entities, a shallow constituent tree and
//! pronoun-to-entity coreference links. Everything is rule-based — ordered
//! pattern lists and small closed lexicons, no statistical model — which
//! keeps the behavior inspectable and deterministic.
//!
//! ## Architecture
//!
//! Data flows through the stages in dependency order:
//!
//! 1. **Input**: raw text (`&str`).
//! 2. **Tokenization** ([`tokenizer`]): splits the text into tokens with
//!    exact byte offsets, including heuristic compound-word splitting.
//! 3. **POS tagging** ([`tagger`]): one tag per token from an ordered rule
//!    list plus an exception lexicon. Gates everything below.
//! 4. **Annotation layers**, each independently switchable:
//!    * Named entities ([`ner`]) — persons, organizations, locations.
//!    * Shallow parse ([`parser`]) — one clause as NP/VP/PP constituents.
//!    * Coreference ([`coref`]) — pronouns linked to recent entities.
//! 5. **Output**: one aggregated [`pipeline::ProcessingResult`].
//!
//! The [`pipeline`] module owns configuration and sequencing; [`config`]
//! holds the configuration model and its merge semantics.
//!
//! ## Example
//!
//! ```rust
//! use denlp_core::Pipeline;
//!
//! let pipeline = Pipeline::new()?;
//! let result = pipeline.process("Herr Müller wohnt in Hamburg.", None)?;
//!
//! for entity in result.entities.unwrap_or_default() {
//!     println!("{} ({:?})", entity.entity, entity.entity_type);
//! }
//! # Ok::<(), denlp_core::NlpError>(())
//! ```

pub mod config;
pub mod coref;
pub mod error;
pub mod ner;
pub mod parser;
pub mod pipeline;
pub mod tagger;
pub mod tokenizer;

pub use config::{PipelineConfig, PipelineConfigPatch, PipelineOptions, PipelineStage};
pub use coref::{Coreference, CoreferenceResolver, ReferenceSpan};
pub use error::{NlpError, Result};
pub use ner::{EntityRecognizer, EntityType, NamedEntity};
pub use parser::{NodeType, ParseNode, ShallowParser};
pub use pipeline::{Pipeline, ProcessingOptions, ProcessingResult, ResultMetadata};
pub use tagger::{GermanPos, PosTag, PosTagger};
pub use tokenizer::{Token, Tokenizer, TokenizerOptions};

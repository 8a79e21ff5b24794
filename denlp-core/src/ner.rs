//! # Named-Entity Recognizer
//!
//! Detects person, organization and location mentions from token text alone;
//! POS tags are not consulted. Recognition is a single forward pass:
//!
//! 1. At each position a **2-token window** is tried first: organization
//!    legal-form suffixes (`GmbH`, `AG`, ...), German title prefixes
//!    (`Herr`, `Dr.`, ...) and location-indicator substrings (`straße`,
//!    `platz`, ...). The first category that matches wins and the scan
//!    advances by two tokens.
//! 2. Otherwise an **ordered list of single-token rules** is evaluated,
//!    first match wins.
//! 3. Otherwise a capitalized word that is neither a location indicator nor
//!    suffixed with a legal form falls back to PERSON.
//!
//! A post-pass merges consecutive entities of the same type whose character
//! gap is at most one, joining their text with a single space and taking the
//! union span; the merge is transitive across a run of qualifying hits.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tokenizer::Token;

/// Entity categories. The recognizer produces `Person`, `Organization` and
/// `Location`; the remaining variants complete the declared vocabulary for
/// consumers with richer sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Date,
    Time,
    Money,
    Percent,
    Event,
    WorkOfArt,
    Law,
    Language,
    Other,
}

/// An entity mention with its character span in the original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedEntity {
    /// Surface text, space-joined for multi-token and merged mentions.
    pub entity: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    /// Reserved; the rule-based recognizer does not score its hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Titles that introduce a person name in the 2-token window.
const GERMAN_TITLES: &[&str] = &[
    "Dr.", "Prof.", "Dipl.", "Ing.", "Med.", "Phil.",
    "Herr", "Frau", "Graf", "Baron", "König", "Kaiser",
];

/// Substrings marking street, place and settlement names (lowercase).
const LOCATION_INDICATORS: &[&str] = &[
    "straße", "platz", "weg", "allee", "gasse", "ring",
    "stadt", "dorf", "berg", "tal", "burg", "brücke",
];

/// Rule-based entity recognizer over token text.
pub struct EntityRecognizer {
    single_rules: Vec<(Regex, EntityType)>,
    multi_org: Regex,
    capitalized_word: Regex,
}

impl EntityRecognizer {
    pub fn new() -> Result<Self> {
        let patterns: [(&str, EntityType); 5] = [
            (
                "^[A-ZÄÖÜ][a-zäöüß]+(straße|platz|weg|allee)$",
                EntityType::Location,
            ),
            (
                r"^[A-ZÄÖÜ][a-zäöüß]+(GmbH|AG|KG|OHG|e\.V\.|GbR)$",
                EntityType::Organization,
            ),
            (
                "^[A-ZÄÖÜ][a-zäöüß]+(burg|stadt|dorf|bach|berg|tal)$",
                EntityType::Location,
            ),
            (
                r"^[A-ZÄÖÜ][a-zäöüß]+er\s+(Universität|Hochschule)$",
                EntityType::Organization,
            ),
            (
                r"^(Dr\.|Prof\.|Herr|Frau)\s+[A-ZÄÖÜ][a-zäöüß]+$",
                EntityType::Person,
            ),
        ];
        let single_rules = patterns
            .into_iter()
            .map(|(pattern, entity_type)| Ok((Regex::new(pattern)?, entity_type)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            single_rules,
            multi_org: Regex::new("^[A-ZÄÖÜ][a-zäöüß]+ (GmbH|AG|KG|OHG)$")?,
            capitalized_word: Regex::new("^[A-ZÄÖÜ][a-zäöüß]+$")?,
        })
    }

    /// Recognizes entities over the token stream and merges adjacent hits.
    pub fn recognize(&self, tokens: &[Token]) -> Vec<NamedEntity> {
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];

            // 2-token window first
            if i + 1 < tokens.len() {
                let pair = format!("{} {}", token.value, tokens[i + 1].value);
                if let Some(entity_type) = self.multi_token_type(&pair) {
                    entities.push(NamedEntity {
                        entity: pair,
                        entity_type,
                        start: token.start,
                        end: tokens[i + 1].end,
                        confidence: None,
                    });
                    i += 2;
                    continue;
                }
            }

            // ordered single-token rules
            let mut matched = false;
            for (pattern, entity_type) in &self.single_rules {
                if pattern.is_match(&token.value) {
                    entities.push(NamedEntity {
                        entity: token.value.clone(),
                        entity_type: *entity_type,
                        start: token.start,
                        end: token.end,
                        confidence: None,
                    });
                    matched = true;
                    break;
                }
            }

            // capitalized-word fallback
            if !matched && self.is_potential_person_name(&token.value) {
                entities.push(NamedEntity {
                    entity: token.value.clone(),
                    entity_type: EntityType::Person,
                    start: token.start,
                    end: token.end,
                    confidence: None,
                });
            }

            i += 1;
        }

        merge_adjacent(entities)
    }

    /// Categorizes a space-joined 2-token window; first category wins.
    fn multi_token_type(&self, text: &str) -> Option<EntityType> {
        if self.multi_org.is_match(text) {
            return Some(EntityType::Organization);
        }
        if GERMAN_TITLES.iter().any(|title| text.starts_with(title)) {
            return Some(EntityType::Person);
        }
        let lower = text.to_lowercase();
        if LOCATION_INDICATORS
            .iter()
            .any(|indicator| lower.contains(indicator))
        {
            return Some(EntityType::Location);
        }
        None
    }

    fn is_potential_person_name(&self, value: &str) -> bool {
        let lower = value.to_lowercase();
        self.capitalized_word.is_match(value)
            && !LOCATION_INDICATORS
                .iter()
                .any(|indicator| lower.contains(indicator))
            && !value.ends_with("GmbH")
            && !value.ends_with("AG")
    }
}

/// Merges consecutive same-type entities whose character gap is at most one.
fn merge_adjacent(entities: Vec<NamedEntity>) -> Vec<NamedEntity> {
    let mut merged = Vec::new();
    let mut current: Option<NamedEntity> = None;

    for entity in entities {
        match current.take() {
            None => current = Some(entity),
            Some(previous) => {
                if previous.entity_type == entity.entity_type
                    && entity.start <= previous.end + 1
                {
                    current = Some(NamedEntity {
                        entity: format!("{} {}", previous.entity, entity.entity),
                        entity_type: previous.entity_type,
                        start: previous.start,
                        end: entity.end,
                        confidence: None,
                    });
                } else {
                    merged.push(previous);
                    current = Some(entity);
                }
            }
        }
    }

    if let Some(last) = current {
        merged.push(last);
    }
    merged
}

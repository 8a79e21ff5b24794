//! # Coreference Resolver
//!
//! Links pronouns back to the most recently introduced compatible entity.
//!
//! Entity candidates are the capitalized NOUN-tagged tokens; their gender is
//! read off the immediately preceding article via a closed article/pronoun
//! gender lexicon, else UNKNOWN. When the scan meets a pronoun it walks the
//! candidate list backward and takes the first entity that lies before the
//! pronoun and whose gender matches (UNKNOWN matches anything). The
//! before-check compares the candidate's character end offset against the
//! pronoun's token index; the two units differ, which can under- or
//! over-match in longer texts. The comparison is kept verbatim as the
//! resolution rule.
//!
//! Chains are keyed by the original entity's surface text: a second entity
//! with the same text joins the existing chain. Unresolved pronouns are
//! dropped silently.

use serde::{Deserialize, Serialize};

use crate::error::{NlpError, Result};
use crate::tagger::{GermanPos, PosTag};
use crate::tokenizer::Token;

/// A text span participating in a coreference chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// One entity plus the pronouns that refer back to it, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coreference {
    pub original: ReferenceSpan,
    pub references: Vec<ReferenceSpan>,
}

/// Grammatical gender as far as the article lexicon can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gender {
    Masc,
    Fem,
    Neut,
    Unknown,
}

/// Closed German pronoun list, matched on the lowercased token.
const GERMAN_PRONOUNS: &[&str] = &[
    "er", "sie", "es",
    "ihm", "ihr", "ihn",
    "sein", "seine", "seiner", "seinen", "seinem",
    "ihre", "ihrer", "ihren", "ihrem",
    "deren", "dessen",
];

/// Article/pronoun gender lexicon.
fn gender_of(word: &str) -> Gender {
    match word.to_lowercase().as_str() {
        "der" | "er" => Gender::Masc,
        "die" | "sie" => Gender::Fem,
        "das" | "es" => Gender::Neut,
        _ => Gender::Unknown,
    }
}

/// Internal entity candidate collected before resolution.
struct EntityCandidate {
    text: String,
    start: usize,
    end: usize,
    gender: Gender,
}

/// Backward-scan pronoun resolver.
pub struct CoreferenceResolver;

impl CoreferenceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves pronouns over parallel token and tag slices.
    pub fn resolve(&self, tokens: &[Token], tags: &[PosTag]) -> Result<Vec<Coreference>> {
        if tokens.len() != tags.len() {
            return Err(NlpError::InputMismatch(format!(
                "{} tokens but {} tags",
                tokens.len(),
                tags.len()
            )));
        }

        let candidates = find_entities(tokens, tags);
        let mut chains: Vec<Coreference> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if !is_pronoun(&token.value) {
                continue;
            }
            let gender = gender_of(&token.value);

            let Some(entity) = find_matching_entity(&candidates, i, gender) else {
                continue;
            };

            let reference = ReferenceSpan {
                text: token.value.clone(),
                start: token.start,
                end: token.end,
            };

            if let Some(chain) = chains
                .iter_mut()
                .find(|chain| chain.original.text == entity.text)
            {
                chain.references.push(reference);
            } else {
                chains.push(Coreference {
                    original: ReferenceSpan {
                        text: entity.text.clone(),
                        start: entity.start,
                        end: entity.end,
                    },
                    references: vec![reference],
                });
            }
        }

        Ok(chains)
    }
}

impl Default for CoreferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects capitalized NOUN tokens with their article-derived gender.
fn find_entities(tokens: &[Token], tags: &[PosTag]) -> Vec<EntityCandidate> {
    let mut entities = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if tags[i].tag != GermanPos::Noun {
            continue;
        }
        let capitalized = token
            .value
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase());
        if !capitalized {
            continue;
        }

        let mut gender = Gender::Unknown;
        if i > 0 && tags[i - 1].tag == GermanPos::Art {
            gender = gender_of(&tokens[i - 1].value);
        }

        entities.push(EntityCandidate {
            text: token.value.clone(),
            start: token.start,
            end: token.end,
            gender,
        });
    }

    entities
}

/// Most recent candidate lying before the pronoun with a compatible gender.
///
/// `end` is a character offset while `pronoun_index` is a token index; the
/// mixed-unit comparison is intentional (see module docs).
fn find_matching_entity(
    candidates: &[EntityCandidate],
    pronoun_index: usize,
    pronoun_gender: Gender,
) -> Option<&EntityCandidate> {
    candidates.iter().rev().find(|entity| {
        entity.end < pronoun_index
            && (entity.gender == pronoun_gender || entity.gender == Gender::Unknown)
    })
}

fn is_pronoun(word: &str) -> bool {
    let lower = word.to_lowercase();
    GERMAN_PRONOUNS.iter().any(|p| *p == lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a token/tag pair with token-scale offsets (start = index).
    fn annotated(words: &[(&str, GermanPos)]) -> (Vec<Token>, Vec<PosTag>) {
        let tokens: Vec<Token> = words
            .iter()
            .enumerate()
            .map(|(i, (value, _))| Token {
                value: value.to_string(),
                start: i,
                end: i + 1,
                index: i,
                normalized: None,
                lemma: None,
            })
            .collect();
        let tags: Vec<PosTag> = tokens
            .iter()
            .zip(words)
            .map(|(token, (_, tag))| PosTag {
                token: token.clone(),
                tag: *tag,
                description: String::new(),
            })
            .collect();
        (tokens, tags)
    }

    #[test]
    fn test_pronoun_resolves_to_most_recent_entity() {
        let (tokens, tags) = annotated(&[
            ("Der", GermanPos::Art),
            ("Mann", GermanPos::Noun),
            ("lacht", GermanPos::Vfin),
            (".", GermanPos::Other),
            ("Er", GermanPos::Pron),
            ("lacht", GermanPos::Vfin),
            ("auch", GermanPos::Adv),
            (".", GermanPos::Other),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].original.text, "Mann");
        assert_eq!(chains[0].references.len(), 1);
        assert_eq!(chains[0].references[0].text, "Er");
    }

    #[test]
    fn test_gender_mismatch_skips_candidate() {
        let (tokens, tags) = annotated(&[
            ("Der", GermanPos::Art),
            ("Mann", GermanPos::Noun),
            ("die", GermanPos::Art),
            ("Frau", GermanPos::Noun),
            ("kommt", GermanPos::Vfin),
            ("er", GermanPos::Pron),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        // "Frau" is FEM and more recent, but "er" is MASC: the backward scan
        // keeps going and lands on "Mann"
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].original.text, "Mann");
    }

    #[test]
    fn test_unknown_gender_matches_any_pronoun() {
        let (tokens, tags) = annotated(&[
            ("Kind", GermanPos::Noun),
            ("spielt", GermanPos::Vfin),
            ("es", GermanPos::Pron),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].original.text, "Kind");
    }

    #[test]
    fn test_unresolved_pronoun_is_dropped() {
        let (tokens, tags) = annotated(&[
            ("er", GermanPos::Pron),
            ("lacht", GermanPos::Vfin),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn test_chains_group_by_surface_text() {
        let (tokens, tags) = annotated(&[
            ("Der", GermanPos::Art),
            ("Mann", GermanPos::Noun),
            ("sieht", GermanPos::Vfin),
            ("er", GermanPos::Pron),
            ("und", GermanPos::Conj),
            ("er", GermanPos::Pron),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].references.len(), 2);
        assert_eq!(chains[0].references[0].start, 3);
        assert_eq!(chains[0].references[1].start, 5);
    }

    #[test]
    fn test_lowercase_noun_is_not_a_candidate() {
        let (tokens, tags) = annotated(&[
            ("der", GermanPos::Art),
            ("mann", GermanPos::Noun),
            ("lacht", GermanPos::Vfin),
            ("er", GermanPos::Pron),
        ]);
        let chains = CoreferenceResolver::new().resolve(&tokens, &tags).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn test_mismatched_inputs_are_rejected() {
        let (tokens, tags) = annotated(&[("Mann", GermanPos::Noun)]);
        assert!(CoreferenceResolver::new()
            .resolve(&tokens, &tags[..0])
            .is_err());
    }
}

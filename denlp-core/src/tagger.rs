//! # Part-of-Speech Tagger
//!
//! Assigns one tag per token from a fixed German inventory, using an ordered
//! list of pattern rules plus a small exception lexicon.
//!
//! ## Tag inventory
//!
//! | Tag   | Meaning            | Examples                  |
//! |-------|--------------------|---------------------------|
//! | NOUN  | Substantiv         | Hund, Stadt, Regierung    |
//! | VERB  | Verb (closed list) | ist, hat, werden          |
//! | VFIN  | Finite Verbform    | lacht, gehst              |
//! | VINF  | Infinitiv          | laufen, sehen             |
//! | ART   | Artikel            | der, die, das             |
//! | ADJ   | Adjektiv           | freundlich, schöner       |
//! | ADV   | Adverb             | sehr, nur, auch           |
//! | PRON  | Pronomen           | ich, er, wir              |
//! | PREP  | Präposition        | in, auf, über             |
//! | CONJ  | Konjunktion        | und, oder, aber           |
//! | PART  | Partikel           | (emitted by consumers)    |
//! | NEG   | Negation           | nicht                     |
//! | NUM   | Numeral            | 42, 1871                  |
//! | INTJ  | Interjektion       | (reserved)                |
//! | PUNCT | Interpunktion      | (reserved)                |
//! | OTHER | Sonstiges          | everything unmatched      |
//!
//! ## Rule order
//!
//! The rule list is evaluated top to bottom and the first match wins. The
//! capitalized-word NOUN rule comes first, so any capitalized token — German
//! nouns are capitalized, but so are sentence-initial articles — is tagged
//! NOUN before the narrower rules get a chance. Reordering the list changes
//! the tagger's output; the order is part of the contract.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tokenizer::Token;

/// The fixed German part-of-speech inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GermanPos {
    Noun,
    Verb,
    Vfin,
    Vinf,
    Art,
    Adj,
    Adv,
    Pron,
    Prep,
    Conj,
    Part,
    Neg,
    Num,
    Intj,
    Punct,
    Other,
}

impl GermanPos {
    /// Tag symbol as it appears in serialized results.
    pub fn name(&self) -> &'static str {
        match self {
            GermanPos::Noun => "NOUN",
            GermanPos::Verb => "VERB",
            GermanPos::Vfin => "VFIN",
            GermanPos::Vinf => "VINF",
            GermanPos::Art => "ART",
            GermanPos::Adj => "ADJ",
            GermanPos::Adv => "ADV",
            GermanPos::Pron => "PRON",
            GermanPos::Prep => "PREP",
            GermanPos::Conj => "CONJ",
            GermanPos::Part => "PART",
            GermanPos::Neg => "NEG",
            GermanPos::Num => "NUM",
            GermanPos::Intj => "INTJ",
            GermanPos::Punct => "PUNCT",
            GermanPos::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for GermanPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One token paired with its tag and a human-readable description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PosTag {
    pub token: Token,
    pub tag: GermanPos,
    pub description: String,
}

/// Fixed exception lexicon, consulted on the lowercased token before any
/// pattern rule.
fn exception(word: &str) -> Option<(GermanPos, &'static str)> {
    match word {
        "nicht" => Some((GermanPos::Neg, "Negation")),
        "sehr" | "nur" | "auch" => Some((GermanPos::Adv, "Adverb")),
        _ => None,
    }
}

/// Ordered-rule POS tagger.
pub struct PosTagger {
    rules: Vec<(Regex, GermanPos, &'static str)>,
}

impl PosTagger {
    pub fn new() -> Result<Self> {
        let patterns: [(&str, GermanPos, &'static str); 11] = [
            ("^[A-ZÄÖÜ][a-zäöüß]+$", GermanPos::Noun, "Noun"),
            ("(?i)^(der|die|das|den|dem|des)$", GermanPos::Art, "Article"),
            (
                "(?i)^(ist|sind|war|waren|hat|haben|wird|werden)$",
                GermanPos::Verb,
                "Verb",
            ),
            ("^[a-zäöüß]+lich$", GermanPos::Adj, "Adjective"),
            (
                "(?i)^(in|auf|unter|über|bei|seit|von|zu)$",
                GermanPos::Prep,
                "Preposition",
            ),
            (
                "(?i)^(und|oder|aber|denn|sondern)$",
                GermanPos::Conj,
                "Conjunction",
            ),
            (
                "(?i)^(ich|du|er|sie|es|wir|ihr|sie)$",
                GermanPos::Pron,
                "Pronoun",
            ),
            ("^[0-9]+$", GermanPos::Num, "Number"),
            ("^[a-zäöüß]+en$", GermanPos::Vinf, "Verb Infinitive"),
            ("^[a-zäöüß]+(st|t|en|et)$", GermanPos::Vfin, "Finite Verb"),
            ("^[a-zäöüß]+er$", GermanPos::Adj, "Adjective Comparative"),
        ];
        let rules = patterns
            .into_iter()
            .map(|(pattern, tag, description)| Ok((Regex::new(pattern)?, tag, description)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Tags every token, preserving order: one [`PosTag`] per input token.
    pub fn tag(&self, tokens: &[Token]) -> Vec<PosTag> {
        tokens
            .iter()
            .map(|token| {
                if let Some((tag, description)) = exception(&token.value.to_lowercase()) {
                    return PosTag {
                        token: token.clone(),
                        tag,
                        description: description.to_string(),
                    };
                }

                for (pattern, tag, description) in &self.rules {
                    if pattern.is_match(&token.value) {
                        return PosTag {
                            token: token.clone(),
                            tag: *tag,
                            description: description.to_string(),
                        };
                    }
                }

                PosTag {
                    token: token.clone(),
                    tag: GermanPos::Other,
                    description: "Unknown Part of Speech".to_string(),
                }
            })
            .collect()
    }

    /// Reverse lookup: the description registered for the first rule carrying
    /// `tag`, or "Unknown" if no rule uses it.
    pub fn description_for(&self, tag: GermanPos) -> &'static str {
        for (_, rule_tag, description) in &self.rules {
            if *rule_tag == tag {
                return *description;
            }
        }
        "Unknown"
    }
}

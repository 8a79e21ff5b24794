//! # Shallow Constituent Parser
//!
//! Builds a single flat constituent tree for the **first clause** of the
//! token stream: a subject noun phrase, a verb phrase and any trailing
//! object/adjunct phrases. There is no recursive clause embedding, no
//! conjunction handling and no multi-sentence support; the scan stops at the
//! first sentence-ending period it reaches and everything after it is simply
//! not part of the tree.
//!
//! Phrase shapes:
//!
//! - `NP` = optional determiner (ART) + adjectives (ADJ)* + optional noun
//! - `VP` = one verb token + further verb/particle tokens
//! - `PP` = one preposition + one NP
//!
//! A token is verb-eligible when its tag is VERB/VFIN/VINF or its literal
//! text matches one of the closed copula/inflection shapes.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{NlpError, Result};
use crate::tagger::{GermanPos, PosTag};
use crate::tokenizer::Token;

/// Constituent labels used in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Clause,
    Np,
    Vp,
    Pp,
    Det,
    Adj,
    Noun,
    Verb,
    Part,
    Prep,
}

/// Grammatical case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GermanCase {
    Nominative,
    Accusative,
    Dative,
    Genitive,
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GermanGender {
    Masculine,
    Feminine,
    Neuter,
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GermanNumber {
    Singular,
    Plural,
}

/// Verb tense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GermanTense {
    Present,
    Past,
    Perfect,
    Future,
}

/// Grammatical features a node may carry. Reserved extension point: the
/// shallow parser never fills these in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<GermanCase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<GermanGender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<GermanNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tense: Option<GermanTense>,
}

/// One node of the constituent tree. Terminals carry a `value` and have no
/// children; phrase nodes carry ordered children and no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub children: Vec<ParseNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<NodeFeatures>,
}

/// Incremental builder for [`ParseNode`]; `build` returns the finished,
/// immutable node.
pub struct NodeBuilder {
    node_type: NodeType,
    value: Option<String>,
    children: Vec<ParseNode>,
}

impl NodeBuilder {
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            value: None,
            children: Vec::new(),
        }
    }

    /// Sets the terminal value.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Appends a child node.
    pub fn child(mut self, node: ParseNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn build(self) -> ParseNode {
        ParseNode {
            node_type: self.node_type,
            value: self.value,
            children: self.children,
            features: None,
        }
    }
}

/// Terminal shorthand used by the phrase builders.
fn terminal(node_type: NodeType, value: &str) -> ParseNode {
    NodeBuilder::new(node_type).value(value).build()
}

/// Greedy first-clause parser over tokens and their POS tags.
pub struct ShallowParser {
    verb_shapes: Vec<Regex>,
}

impl ShallowParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            verb_shapes: vec![
                Regex::new("(?i)^(ist|sind|war|waren|hat|haben|wird|werden)$")?,
                Regex::new("^[a-zäöüß]+(en|t|st|e)$")?,
            ],
        })
    }

    /// Parses the first clause into a tree rooted at `CLAUSE`.
    ///
    /// `tokens` and `tags` must be parallel slices as produced by the
    /// tokenizer and tagger.
    pub fn parse(&self, tokens: &[Token], tags: &[PosTag]) -> Result<ParseNode> {
        if tokens.len() != tags.len() {
            return Err(NlpError::InputMismatch(format!(
                "{} tokens but {} tags",
                tokens.len(),
                tags.len()
            )));
        }
        Ok(self.parse_clause(tokens, tags, 0).0)
    }

    fn parse_clause(&self, tokens: &[Token], tags: &[PosTag], start_index: usize) -> (ParseNode, usize) {
        let mut clause = NodeBuilder::new(NodeType::Clause);
        let mut i = start_index;
        let mut has_subject = false;
        let mut has_verb = false;

        while i < tokens.len() {
            // subject
            if !has_subject && is_noun_phrase(&tags[i]) {
                let (np, end) = parse_noun_phrase(tokens, tags, i);
                clause = clause.child(np);
                i = end;
                has_subject = true;
                continue;
            }

            // verb
            if has_subject && !has_verb && self.is_verb(&tokens[i], &tags[i]) {
                let (vp, end) = self.parse_verb_phrase(tokens, tags, i);
                clause = clause.child(vp);
                i = end;
                has_verb = true;
                continue;
            }

            // objects and adjuncts after the verb
            if has_verb {
                if is_noun_phrase(&tags[i]) {
                    let (np, end) = parse_noun_phrase(tokens, tags, i);
                    clause = clause.child(np);
                    i = end;
                } else if tags[i].tag == GermanPos::Prep {
                    let (pp, end) = self.parse_prep_phrase(tokens, tags, i);
                    clause = clause.child(pp);
                    i = end;
                } else {
                    i += 1;
                }
            } else {
                i += 1;
            }

            // end of clause; the subject and verb arms above re-enter the
            // loop directly and skip this check
            if i < tokens.len() && tokens[i].value == "." {
                break;
            }
        }

        (clause.build(), i)
    }

    fn parse_verb_phrase(&self, tokens: &[Token], tags: &[PosTag], start_index: usize) -> (ParseNode, usize) {
        let mut vp = NodeBuilder::new(NodeType::Vp);
        let mut i = start_index;

        // main verb
        if i < tokens.len() && self.is_verb(&tokens[i], &tags[i]) {
            vp = vp.child(terminal(NodeType::Verb, &tokens[i].value));
            i += 1;
        }

        // auxiliaries and particles
        while i < tokens.len()
            && (self.is_verb(&tokens[i], &tags[i]) || tags[i].tag == GermanPos::Part)
        {
            let node_type = if tags[i].tag == GermanPos::Part {
                NodeType::Part
            } else {
                NodeType::Verb
            };
            vp = vp.child(terminal(node_type, &tokens[i].value));
            i += 1;
        }

        (vp.build(), i)
    }

    fn parse_prep_phrase(&self, tokens: &[Token], tags: &[PosTag], start_index: usize) -> (ParseNode, usize) {
        let mut pp = NodeBuilder::new(NodeType::Pp);
        let mut i = start_index;

        if i < tokens.len() && tags[i].tag == GermanPos::Prep {
            pp = pp.child(terminal(NodeType::Prep, &tokens[i].value));
            i += 1;
        }

        let (np, end) = parse_noun_phrase(tokens, tags, i);
        pp = pp.child(np);

        (pp.build(), end)
    }

    fn is_verb(&self, token: &Token, tag: &PosTag) -> bool {
        matches!(
            tag.tag,
            GermanPos::Verb | GermanPos::Vfin | GermanPos::Vinf
        ) || self
            .verb_shapes
            .iter()
            .any(|shape| shape.is_match(&token.value))
    }
}

fn parse_noun_phrase(tokens: &[Token], tags: &[PosTag], start_index: usize) -> (ParseNode, usize) {
    let mut np = NodeBuilder::new(NodeType::Np);
    let mut i = start_index;

    // determiner
    if i < tokens.len() && tags[i].tag == GermanPos::Art {
        np = np.child(terminal(NodeType::Det, &tokens[i].value));
        i += 1;
    }

    // adjectives
    while i < tokens.len() && tags[i].tag == GermanPos::Adj {
        np = np.child(terminal(NodeType::Adj, &tokens[i].value));
        i += 1;
    }

    // head noun
    if i < tokens.len() && tags[i].tag == GermanPos::Noun {
        np = np.child(terminal(NodeType::Noun, &tokens[i].value));
        i += 1;
    }

    (np.build(), i)
}

fn is_noun_phrase(tag: &PosTag) -> bool {
    tag.tag == GermanPos::Noun || tag.tag == GermanPos::Pron
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::PosTagger;
    use crate::tokenizer::{Tokenizer, TokenizerOptions};

    fn parse(text: &str) -> ParseNode {
        let tokenizer = Tokenizer::new(TokenizerOptions {
            keep_punctuation: true,
            ..Default::default()
        })
        .unwrap();
        let tagger = PosTagger::new().unwrap();
        let tokens = tokenizer.tokenize(text);
        let tags = tagger.tag(&tokens);
        ShallowParser::new().unwrap().parse(&tokens, &tags).unwrap()
    }

    fn child_types(node: &ParseNode) -> Vec<NodeType> {
        node.children.iter().map(|c| c.node_type).collect()
    }

    fn pos(value: &str, start: usize, tag: GermanPos) -> (Token, PosTag) {
        let token = Token {
            value: value.to_string(),
            start,
            end: start + value.len(),
            index: 0,
            normalized: None,
            lemma: None,
        };
        let tag = PosTag {
            token: token.clone(),
            tag,
            description: String::new(),
        };
        (token, tag)
    }

    #[test]
    fn test_subject_and_verb_phrase() {
        // the clause scan enters the subject NP at the noun itself, so the
        // preceding article is skipped, not attached
        let tree = parse("die Katze schläft.");
        assert_eq!(tree.node_type, NodeType::Clause);
        assert_eq!(child_types(&tree), vec![NodeType::Np, NodeType::Vp]);

        let np = &tree.children[0];
        assert_eq!(child_types(np), vec![NodeType::Noun]);
        assert_eq!(np.children[0].value.as_deref(), Some("Katze"));

        let vp = &tree.children[1];
        assert_eq!(child_types(vp), vec![NodeType::Verb]);
        assert_eq!(vp.children[0].value.as_deref(), Some("schläft"));
    }

    #[test]
    fn test_noun_phrase_builder_shape() {
        // det + adjectives + noun, as reachable from a PP
        let built: Vec<(Token, PosTag)> = vec![
            pos("der", 0, GermanPos::Art),
            pos("freundlich", 4, GermanPos::Adj),
            pos("Hund", 15, GermanPos::Noun),
        ];
        let tokens: Vec<Token> = built.iter().map(|(t, _)| t.clone()).collect();
        let tags: Vec<PosTag> = built.iter().map(|(_, t)| t.clone()).collect();
        let (np, end) = parse_noun_phrase(&tokens, &tags, 0);
        assert_eq!(end, 3);
        assert_eq!(
            child_types(&np),
            vec![NodeType::Det, NodeType::Adj, NodeType::Noun]
        );
    }

    #[test]
    fn test_object_noun_phrase_after_verb() {
        let tree = parse("die Katze jagt die Maus.");
        assert_eq!(
            child_types(&tree),
            vec![NodeType::Np, NodeType::Vp, NodeType::Np]
        );
        // the inflection-shape rule also matches "die", so the VP swallows it
        let vp = &tree.children[1];
        assert_eq!(child_types(vp), vec![NodeType::Verb, NodeType::Verb]);
        assert_eq!(vp.children[0].value.as_deref(), Some("jagt"));
        assert_eq!(vp.children[1].value.as_deref(), Some("die"));

        let object = &tree.children[2];
        assert_eq!(child_types(object), vec![NodeType::Noun]);
        assert_eq!(object.children[0].value.as_deref(), Some("Maus"));
    }

    #[test]
    fn test_prepositional_phrase() {
        let tree = parse("die Katze sitzt auf dem Tisch.");
        assert_eq!(
            child_types(&tree),
            vec![NodeType::Np, NodeType::Vp, NodeType::Pp]
        );
        let pp = &tree.children[2];
        assert_eq!(child_types(pp), vec![NodeType::Prep, NodeType::Np]);
        assert_eq!(pp.children[0].value.as_deref(), Some("auf"));
        let np = &pp.children[1];
        assert_eq!(child_types(np), vec![NodeType::Det, NodeType::Noun]);
    }

    #[test]
    fn test_scan_stops_at_period_after_object() {
        let tree = parse("die Katze jagt die Maus. der Hund bellt.");
        // the object NP ends right before the period, so the clause closes
        // there and nothing from the second sentence shows up
        assert_eq!(
            child_types(&tree),
            vec![NodeType::Np, NodeType::Vp, NodeType::Np]
        );
        fn values(node: &ParseNode, out: &mut Vec<String>) {
            if let Some(value) = &node.value {
                out.push(value.clone());
            }
            for child in &node.children {
                values(child, out);
            }
        }
        let mut leaves = Vec::new();
        values(&tree, &mut leaves);
        assert!(!leaves.iter().any(|v| v == "Hund" || v == "bellt"));
    }

    #[test]
    fn test_capitalized_article_becomes_bare_noun_subject() {
        // "Die" is tagged NOUN (capitalization dominates), so the subject NP
        // consumes it alone and "Katze" is skipped before the verb
        let tree = parse("Die Katze schläft.");
        let np = &tree.children[0];
        assert_eq!(child_types(np), vec![NodeType::Noun]);
        assert_eq!(np.children[0].value.as_deref(), Some("Die"));
    }

    #[test]
    fn test_mismatched_inputs_are_rejected() {
        let tokenizer = Tokenizer::new(TokenizerOptions::default()).unwrap();
        let tokens = tokenizer.tokenize("die Katze schläft");
        let tags = PosTagger::new().unwrap().tag(&tokens[..2]);
        assert!(ShallowParser::new()
            .unwrap()
            .parse(&tokens, &tags)
            .is_err());
    }

    #[test]
    fn test_empty_input_yields_empty_clause() {
        let tree = parse("");
        assert_eq!(tree.node_type, NodeType::Clause);
        assert!(tree.children.is_empty());
        assert!(tree.value.is_none());
        assert!(tree.features.is_none());
    }

    #[test]
    fn test_builder_produces_terminal_without_children() {
        let node = NodeBuilder::new(NodeType::Noun).value("Hund").build();
        assert_eq!(node.value.as_deref(), Some("Hund"));
        assert!(node.children.is_empty());
    }
}

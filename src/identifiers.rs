//! Section and step identifier extraction from tagged procedure spans.
//!
//! Procedure spans carry numeric ("3"), alphanumeric ("3a") or identifier
//! ("IV-a") tokens. Which token names the section and which names the step
//! is decided by qualifier words and document order; uninterpretable spans
//! fail resolution rather than guess.

use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, Tag, TaggedTree};

/// Tags that may carry a section or step identifier token.
const IDENTIFIER_TAGS: &[Tag] = &[Tag::Identifier, Tag::Cardinal, Tag::AlphanumericCardinal];

/// A resolved (section, optional step) pair extracted from a procedure
/// reference. Both fields are plain identifier strings and are never
/// re-validated against the document structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAndStepIdentifier {
    pub section: String,
    pub step: Option<String>,
}

/// Parses procedure spans into section/step identifiers.
///
/// Constructed with the words that count as synonyms for "step": a qualifier
/// like "Example" or "Method" marks a section identifier, but a qualifier
/// that is itself a step synonym ("Step 2") does not.
#[derive(Debug, Clone)]
pub struct ProcedureIdentifierParser {
    step_synonyms: Vec<String>,
}

impl Default for ProcedureIdentifierParser {
    fn default() -> Self {
        ProcedureIdentifierParser::new(&["step", "stage"])
    }
}

impl ProcedureIdentifierParser {
    pub fn new(step_synonyms: &[&str]) -> Self {
        ProcedureIdentifierParser {
            step_synonyms: step_synonyms.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    fn is_step_synonym(&self, word: &str) -> bool {
        let lowercased = word.to_lowercase();
        self.step_synonyms.iter().any(|s| *s == lowercased)
    }

    fn identifier_tokens(&self, tree: &TaggedTree, procedure: NodeId) -> Vec<NodeId> {
        tree.descendants_with_tags(procedure, IDENTIFIER_TAGS)
    }

    /// Is the identifier preceded by a qualifier marking it as a section
    /// identifier?
    fn is_section_identifier(&self, tree: &TaggedTree, identifier: NodeId) -> bool {
        let Some(qualifier) = tree.prev_sibling(identifier) else {
            return false;
        };
        matches!(
            tree.tag(qualifier),
            Tag::ExampleQualifier | Tag::MethodQualifier
        ) && !self.is_step_synonym(&tree.value(qualifier))
    }

    /// The identifier of a procedure span expected to describe a section.
    /// `None` unless the span contains exactly one identifier token.
    pub fn section_identifier(&self, tree: &TaggedTree, procedure: NodeId) -> Option<String> {
        match self.identifier_tokens(tree, procedure).as_slice() {
            [only] => Some(tree.value(*only)),
            _ => None,
        }
    }

    /// The identifier of a procedure span expected to describe a step within
    /// the section identified by `section_identifier`. With two tokens, the
    /// first must repeat the section identifier.
    pub fn step_identifier(
        &self,
        tree: &TaggedTree,
        procedure: NodeId,
        section_identifier: &str,
    ) -> Option<String> {
        match self.identifier_tokens(tree, procedure).as_slice() {
            [only] => Some(tree.value(*only)),
            [first, second] if tree.value(*first) == section_identifier => {
                Some(tree.value(*second))
            }
            _ => None,
        }
    }

    /// Interpret a procedure reference as a (section, optional step) pair.
    ///
    /// `enclosing_section` is the identifier of the experimental section the
    /// reference appears in; a lone unmarked identifier is read as a step
    /// within it. `None` when the span is not interpretable.
    pub fn section_and_step(
        &self,
        tree: &TaggedTree,
        procedure: NodeId,
        enclosing_section: Option<&str>,
    ) -> Option<SectionAndStepIdentifier> {
        match self.identifier_tokens(tree, procedure).as_slice() {
            [only] => {
                if self.is_section_identifier(tree, *only) {
                    Some(SectionAndStepIdentifier {
                        section: tree.value(*only),
                        step: None,
                    })
                } else {
                    enclosing_section.map(|section| SectionAndStepIdentifier {
                        section: section.to_string(),
                        step: Some(tree.value(*only)),
                    })
                }
            }
            [first, second] => {
                let first_marked = self.is_section_identifier(tree, *first);
                let second_marked = self.is_section_identifier(tree, *second);
                match (first_marked, second_marked) {
                    // Exactly one marked: the marked one is the section,
                    // order-independent.
                    (true, false) | (false, false) => Some(SectionAndStepIdentifier {
                        section: tree.value(*first),
                        step: Some(tree.value(*second)),
                    }),
                    (false, true) => Some(SectionAndStepIdentifier {
                        section: tree.value(*second),
                        step: Some(tree.value(*first)),
                    }),
                    // Both marked is intentionally not interpretable.
                    (true, true) => None,
                }
            }
            _ => None,
        }
    }
}

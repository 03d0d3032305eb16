//! Anaphora resolution and alias harvesting over classified mentions.
//!
//! After classification, each mention is checked for back-references: an
//! explicit reference to an aliased compound ("compound 3a"), or a reference
//! to the product of an earlier procedure ("prepared as in Example 2").
//! Separately, mentions that establish identities register aliases for
//! later mentions to resolve against.
//!
//! Every ambiguous or unresolvable case is reported and skipped; nothing is
//! inferred by guessing among candidates.

use tracing::{debug, trace};

use crate::chemical::{Chemical, ChemicalIdentifierPair, EntityType};
use crate::external::NameResolver;
use crate::history::ReactionHistory;
use crate::identifiers::ProcedureIdentifierParser;
use crate::tree::{NodeId, Tag, TaggedTree};

/// Tags whose child tokens make up a reference identifier ("3", "3a", "IV-a").
const REFERENCE_IDENTIFIER_TAGS: &[Tag] =
    &[Tag::Cardinal, Tag::AlphanumericCardinal, Tag::Identifier];

/// Name components of a chemical-name span: its leaf tokens in document
/// order, brackets excluded.
pub(crate) fn name_components(tree: &TaggedTree, span: NodeId) -> Vec<String> {
    let mut components = Vec::new();
    collect_name_tokens(tree, span, &mut components);
    components
}

fn collect_name_tokens(tree: &TaggedTree, id: NodeId, out: &mut Vec<String>) {
    if let Some(token) = tree.token(id) {
        if !matches!(tree.tag(id), Tag::LeftBracket | Tag::RightBracket) {
            out.push(token.to_string());
        }
    }
    for &child in tree.children(id) {
        collect_name_tokens(tree, child, out);
    }
}

/// Resolves back-references on mentions and harvests alias definitions.
#[derive(Debug, Clone, Default)]
pub struct AnaphoraResolver {
    identifiers: ProcedureIdentifierParser,
}

impl AnaphoraResolver {
    pub fn new() -> Self {
        AnaphoraResolver::default()
    }

    pub fn with_identifier_parser(identifiers: ProcedureIdentifierParser) -> Self {
        AnaphoraResolver { identifiers }
    }

    /// Attempt to attach a concrete identifier pair to `chemical` by
    /// anaphora. `enclosing_section` is the identifier of the section the
    /// mention appears in, used to interpret bare step references.
    pub fn resolve(
        &self,
        tree: &TaggedTree,
        mention: NodeId,
        chemical: &mut Chemical,
        enclosing_section: Option<&str>,
        history: &ReactionHistory,
    ) {
        if let Some(entity_type) = chemical.entity_type() {
            // A mention with its own resolvable structure is not treated as
            // a back-reference.
            if chemical.smiles().is_some() && entity_type != EntityType::DefiniteReference {
                return;
            }
        }

        let references = tree.descendants_with_tag(mention, Tag::ReferenceToCompound);
        match references.as_slice() {
            [reference] => self.resolve_compound_reference(tree, *reference, chemical, history),
            [] => {}
            _ => debug!(
                mention = %tree.value(mention),
                "multiple compound references in mention; resolution skipped"
            ),
        }

        let procedures = tree.descendants_with_tag(mention, Tag::Procedure);
        match procedures.as_slice() {
            [procedure] => self.resolve_procedure_reference(
                tree,
                *procedure,
                chemical,
                enclosing_section,
                history,
            ),
            [] => {}
            _ => debug!(
                mention = %tree.value(mention),
                "multiple procedure references in mention; resolution skipped"
            ),
        }
    }

    /// The textual identifier of a reference span: its numeric, alphanumeric
    /// and identifier child tokens, space-joined in document order.
    pub fn identifier_from_reference(tree: &TaggedTree, reference: NodeId) -> String {
        tree.children_with_tags(reference, REFERENCE_IDENTIFIER_TAGS)
            .iter()
            .map(|&id| tree.value(id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn resolve_compound_reference(
        &self,
        tree: &TaggedTree,
        reference: NodeId,
        chemical: &mut Chemical,
        history: &ReactionHistory,
    ) {
        let identifier = Self::identifier_from_reference(tree, reference);
        let Some(referenced) = history.chemical_for_alias(&identifier) else {
            trace!(identifier = %identifier, "failed to resolve reference to compound");
            return;
        };
        if !referenced.has_inchi() {
            trace!(
                identifier = %identifier,
                "reference resolved to a compound with no InChI; ignored"
            );
            return;
        }
        if has_shorter_inchi(referenced, chemical) {
            trace!(
                identifier = %identifier,
                "reference resolved to a compound with a shorter InChI; ignored"
            );
            return;
        }
        if let Some(pair) = referenced.identifier_pair() {
            chemical.set_identifier_pair(pair.clone());
        }
    }

    /// A reference to a procedure means the chemical is the product of that
    /// procedure.
    fn resolve_procedure_reference(
        &self,
        tree: &TaggedTree,
        procedure: NodeId,
        chemical: &mut Chemical,
        enclosing_section: Option<&str>,
        history: &ReactionHistory,
    ) {
        let reference_text = tree.value(procedure);
        let Some(identifier) =
            self.identifiers
                .section_and_step(tree, procedure, enclosing_section)
        else {
            trace!(reference = %reference_text, "failed to resolve reference to procedure");
            return;
        };
        let Some(referenced) = history.product_of(&identifier.section, identifier.step.as_deref())
        else {
            trace!(reference = %reference_text, "failed to resolve reference to procedure");
            return;
        };

        if let Some(inchi) = chemical.inchi() {
            if identifier.step.is_none() && referenced.inchi() != Some(inchi) {
                // A section-level reference whose chemical already matches a
                // recorded sub-step product points at that narrower result;
                // leave the chemical alone.
                if history
                    .product_inchis(&identifier.section)
                    .iter()
                    .any(|recorded| *recorded == inchi)
                {
                    return;
                }
            }
        }
        if !referenced.has_inchi() {
            trace!(
                reference = %reference_text,
                "procedure reference resolved to a compound with no InChI; ignored"
            );
            return;
        }
        if has_shorter_inchi(referenced, chemical) {
            trace!(
                reference = %reference_text,
                "procedure reference resolved to a compound with a shorter InChI; ignored"
            );
            return;
        }
        if let Some(pair) = referenced.identifier_pair() {
            chemical.set_identifier_pair(pair.clone());
        }
    }

    /// Aliases this mention establishes for later mentions: its own
    /// reference identifier, and synonymous chemical names asserted by the
    /// text itself. Only mentions with established identities define aliases.
    pub fn harvest_alias_definitions(
        &self,
        tree: &TaggedTree,
        mention: NodeId,
        chemical: &Chemical,
        names: &dyn NameResolver,
    ) -> Vec<(String, Chemical)> {
        if !matches!(
            chemical.entity_type(),
            Some(EntityType::Exact | EntityType::DefiniteReference)
        ) {
            return Vec::new();
        }

        let mut aliases: Vec<(String, Chemical)> = self
            .synonymous_name_alias(tree, mention, names)
            .into_iter()
            .collect();

        let references = tree.descendants_with_tag(mention, Tag::ReferenceToCompound);
        match references.as_slice() {
            [reference] => {
                let identifier = Self::identifier_from_reference(tree, *reference);
                aliases.push((identifier, chemical.clone()));
            }
            [] => {}
            _ => debug!(
                mention = %tree.value(mention),
                "multiple compound references in mention; no alias harvested"
            ),
        }
        aliases
    }

    /// Detect the two-name synonym pattern: a mention whose relevant children
    /// are exactly two chemical-name spans, the second bracketed or wrapped
    /// in a mixture span, where exactly one side's name resolves. The text
    /// asserts the two names are synonymous, so the unresolved name becomes
    /// an alias for the resolved structure.
    fn synonymous_name_alias(
        &self,
        tree: &TaggedTree,
        mention: NodeId,
        names: &dyn NameResolver,
    ) -> Option<(String, Chemical)> {
        let spans = tree.children_with_tags(mention, &[Tag::ChemicalName, Tag::Mixture]);
        let [first, second] = spans.as_slice() else {
            return None;
        };
        if tree.tag(*first) != Tag::ChemicalName {
            return None;
        }
        let second = if tree.tag(*second) == Tag::Mixture {
            synonym_span_from_mixture(tree, *second)?
        } else {
            // Typically only the first name span carries the compound's
            // name; a second one only defines a synonym when bracketed.
            if !is_bracketed(tree, *second) {
                return None;
            }
            *second
        };

        let first_components = name_components(tree, *first);
        let second_components = name_components(tree, second);
        let first_smiles = names.smiles_for_name(&first_components);
        let second_smiles = names.smiles_for_name(&second_components);
        let first_name = first_components.join(" ");
        let second_name = second_components.join(" ");

        match (first_smiles, second_smiles) {
            (Some(smiles), None) => {
                trace!(resolved = %first_name, alias = %second_name, "synonym detected");
                let mut chem = Chemical::new(second_name.clone());
                chem.set_identifier_pair(ChemicalIdentifierPair::new(
                    Some(smiles),
                    names.inchi_for_name(&first_components),
                ));
                Some((second_name, chem))
            }
            (None, Some(smiles)) => {
                trace!(resolved = %second_name, alias = %first_name, "synonym detected");
                let mut chem = Chemical::new(first_name.clone());
                chem.set_identifier_pair(ChemicalIdentifierPair::new(
                    Some(smiles),
                    names.inchi_for_name(&second_components),
                ));
                Some((first_name, chem))
            }
            // Both resolving or neither resolving asserts nothing.
            _ => None,
        }
    }
}

/// True only when both InChIs are present and `candidate`'s is strictly
/// shorter than `current`'s. InChI length is a proxy for structural
/// specificity: a shorter InChI must not overwrite more specific information.
fn has_shorter_inchi(candidate: &Chemical, current: &Chemical) -> bool {
    match (candidate.inchi(), current.inchi()) {
        (Some(candidate_inchi), Some(current_inchi)) => {
            candidate_inchi.len() < current_inchi.len()
        }
        _ => false,
    }
}

/// A mixture wrapper defines a synonym when it opens with a bracket followed
/// by a chemical-name span and a comma or colon delimiter.
fn synonym_span_from_mixture(tree: &TaggedTree, mixture: NodeId) -> Option<NodeId> {
    let bracket = tree.first_child_with_tag(mixture, Tag::LeftBracket)?;
    let span = tree.next_sibling(bracket)?;
    if tree.tag(span) != Tag::ChemicalName {
        return None;
    }
    let delimiter = tree.next_sibling(span)?;
    matches!(tree.tag(delimiter), Tag::Comma | Tag::Colon).then_some(span)
}

fn is_bracketed(tree: &TaggedTree, span: NodeId) -> bool {
    let children = tree.children(span);
    match (children.first(), children.last()) {
        (Some(&first), Some(&last)) if children.len() >= 3 => {
            tree.tag(first) == Tag::LeftBracket && tree.tag(last) == Tag::RightBracket
        }
        _ => false,
    }
}

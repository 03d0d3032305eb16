//! Entity-type classification from local tagged context.
//!
//! The heuristics are ordered most-certain first and evaluated first-match
//! wins; a later rule only fires when no earlier rule produced a type. The
//! chain is a literal rule table so the precedence contract stays auditable
//! and each rule can be exercised on its own.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::chemical::{Chemical, EntityType};
use crate::external::{FunctionalGroupLookup, NameResolver};
use crate::tree::{NodeId, Tag, TaggedTree};

/// A digit run followed by "H" (an NMR proton count), or anything ending in
/// "nmr".
static NMR_SHIFT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\d+H|.*(?i:nmr))$").unwrap());

/// Plural class nouns. The consonant set deliberately excludes endings such
/// as "is"/"us"/"os" that are not English plurals.
static PLURAL_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^.*[abcdefghklmnpqrtwy]s$").unwrap());

static SURFACE_PRE_QUALIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:on|onto)$").unwrap());

static SURFACE_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:surface|interface)$").unwrap());

static CLASS_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:compound|derivative)s?$").unwrap());

static FRAGMENT_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:group|atom|ring|chain|bond|bridge|contact)s?|functional|complex)$")
        .unwrap()
});

/// Everything a classification decision may read: the mention's tagged
/// context plus the chemical built from its local information.
pub struct MentionContext<'a> {
    pub tree: &'a TaggedTree,
    pub mention: NodeId,
    pub chemical: &'a Chemical,
    pub names: &'a dyn NameResolver,
    pub functional_groups: &'a dyn FunctionalGroupLookup,
}

type Rule = fn(&MentionContext<'_>) -> Option<EntityType>;

/// Primary heuristics, most specific first. Evaluated until the first match.
const RULES: &[(&str, Rule)] = &[
    ("false-positive-filters", false_positive_filters),
    ("plural-ending", plural_ending),
    ("functional-class-name", functional_class_name),
    ("head-noun-qualifier", head_noun_qualifier),
    ("preceding-qualifier", preceding_qualifier),
];

/// Assigns one [`EntityType`] per mention. Pure with respect to the tagged
/// context; the caller stores the produced type on the chemical.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTypeClassifier;

impl EntityTypeClassifier {
    pub fn new() -> Self {
        EntityTypeClassifier
    }

    pub fn classify(&self, ctx: &MentionContext<'_>) -> EntityType {
        let mut entity_type = RULES.iter().find_map(|(name, rule)| {
            let result = rule(ctx);
            if let Some(found) = result {
                trace!(rule = name, ?found, chemical = ctx.chemical.name(), "rule matched");
            }
            result
        });

        // An explicit textual back-reference always wins over a local-noun
        // heuristic, but never resurrects a false positive.
        if entity_type != Some(EntityType::FalsePositive) && has_qualifying_identifier(ctx) {
            entity_type = Some(EntityType::DefiniteReference);
        }

        entity_type.unwrap_or_else(|| fallback(ctx))
    }
}

fn false_positive_filters(ctx: &MentionContext<'_>) -> Option<EntityType> {
    let name = ctx.chemical.name();
    if NMR_SHIFT.is_match(name) {
        return Some(EntityType::FalsePositive);
    }
    // "under nitrogen": the enclosing phrase describes an atmosphere, not a
    // reagent.
    if ctx
        .tree
        .parent(ctx.mention)
        .map(|parent| ctx.tree.tag(parent) == Tag::AtmospherePhrase)
        .unwrap_or(false)
    {
        return Some(EntityType::FalsePositive);
    }
    let lowercased = name.to_lowercase();
    if lowercased.contains('=') || lowercased.starts_with("silica") {
        return Some(EntityType::FalsePositive);
    }
    None
}

fn plural_ending(ctx: &MentionContext<'_>) -> Option<EntityType> {
    PLURAL_ENDING
        .is_match(ctx.chemical.name())
        .then_some(EntityType::ChemicalClass)
}

fn functional_class_name(ctx: &MentionContext<'_>) -> Option<EntityType> {
    ctx.functional_groups
        .functional_class_smarts_for_name(&ctx.chemical.name().to_lowercase())
        .map(|_| EntityType::ChemicalClass)
}

/// Examine the head noun: the leaf immediately following the mention in
/// document order.
fn head_noun_qualifier(ctx: &MentionContext<'_>) -> Option<EntityType> {
    let next = ctx.tree.next_leaf(ctx.mention)?;
    let text = ctx.tree.token(next)?;
    if SURFACE_QUALIFIER.is_match(text) {
        Some(EntityType::FalsePositive)
    } else if CLASS_QUALIFIER.is_match(text) {
        Some(EntityType::ChemicalClass)
    } else if FRAGMENT_QUALIFIER.is_match(text) {
        Some(EntityType::Fragment)
    } else {
        None
    }
}

/// Examine the leaf before the first chemical-name span of the mention, or
/// before the mention itself when it has none.
fn preceding_qualifier(ctx: &MentionContext<'_>) -> Option<EntityType> {
    let anchor = ctx
        .tree
        .descendants_with_tag(ctx.mention, Tag::ChemicalName)
        .first()
        .copied()
        .unwrap_or(ctx.mention);
    let previous = ctx.tree.prev_leaf(anchor)?;
    if ctx
        .tree
        .token(previous)
        .map(|text| SURFACE_PRE_QUALIFIER.is_match(text))
        .unwrap_or(false)
    {
        return Some(EntityType::FalsePositive);
    }
    match ctx.tree.tag(previous) {
        Tag::Determiner => Some(EntityType::ChemicalClass),
        Tag::DefiniteDeterminer => Some(EntityType::DefiniteReference),
        _ => None,
    }
}

fn has_qualifying_identifier(ctx: &MentionContext<'_>) -> bool {
    !ctx.tree
        .descendants_with_tag(ctx.mention, Tag::ReferenceToCompound)
        .is_empty()
}

/// Nothing anchors the mention to a real substance: no structure, no
/// quantity, and a name the resolver cannot interpret.
fn fallback(ctx: &MentionContext<'_>) -> EntityType {
    let unanchored = ctx.chemical.smiles().is_none()
        && ctx.chemical.inchi().is_none()
        && ctx
            .tree
            .descendants_with_tag(ctx.mention, Tag::Quantity)
            .is_empty()
        && !ctx.names.contains_resolvable_name(ctx.chemical.name());
    if unanchored {
        EntityType::FalsePositive
    } else {
        EntityType::Exact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::ChemicalIdentifierPair;
    use crate::tests::support::{StaticFunctionalGroups, StaticNameResolver};
    use crate::tree::{node, token};

    fn classify(tree: &TaggedTree, chemical: &Chemical) -> EntityType {
        classify_with(tree, chemical, &StaticNameResolver::new(), &StaticFunctionalGroups::new())
    }

    fn classify_with(
        tree: &TaggedTree,
        chemical: &Chemical,
        names: &StaticNameResolver,
        functional_groups: &StaticFunctionalGroups,
    ) -> EntityType {
        let mention = tree
            .descendants_with_tags(tree.root(), &[Tag::Molecule, Tag::UnnamedMolecule])
            .first()
            .copied()
            .expect("tree has a mention");
        EntityTypeClassifier::new().classify(&MentionContext {
            tree,
            mention,
            chemical,
            names,
            functional_groups,
        })
    }

    fn bare_mention(name_token: &str) -> TaggedTree {
        TaggedTree::new(node(Tag::Sentence).child(
            node(Tag::Molecule).child(node(Tag::ChemicalName).child(token(Tag::Word, name_token))),
        ))
    }

    #[test]
    fn nmr_shift_names_are_false_positives() {
        let tree = bare_mention("1H");
        assert_eq!(
            classify(&tree, &Chemical::new("1H")),
            EntityType::FalsePositive
        );
        let tree = bare_mention("13C-NMR");
        assert_eq!(
            classify(&tree, &Chemical::new("13C-NMR")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn atmosphere_phrase_mentions_are_false_positives() {
        let tree = TaggedTree::new(
            node(Tag::Sentence).child(
                node(Tag::AtmospherePhrase)
                    .child(token(Tag::Word, "under"))
                    .child(node(Tag::Molecule).child(
                        node(Tag::ChemicalName).child(token(Tag::Word, "nitrogen")),
                    )),
            ),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("nitrogen")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn formula_notation_and_silica_are_false_positives() {
        let tree = bare_mention("M=382");
        assert_eq!(
            classify(&tree, &Chemical::new("M=382")),
            EntityType::FalsePositive
        );
        let tree = bare_mention("silica");
        assert_eq!(
            classify(&tree, &Chemical::new("silica gel")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn plural_endings_classify_as_chemical_class() {
        let tree = bare_mention("amines");
        assert_eq!(
            classify(&tree, &Chemical::new("amines")),
            EntityType::ChemicalClass
        );
    }

    #[test]
    fn non_plural_s_endings_do_not_trigger_the_plural_rule() {
        // "us" is excluded from the consonant set.
        let names = StaticNameResolver::new().with_structure("phosphorus", "P", "InChI=1S/P");
        let tree = bare_mention("phosphorus");
        assert_eq!(
            classify_with(
                &tree,
                &Chemical::new("phosphorus"),
                &names,
                &StaticFunctionalGroups::new()
            ),
            EntityType::Exact
        );
    }

    #[test]
    fn functional_class_dictionary_hit_classifies_as_class() {
        let groups = StaticFunctionalGroups::new().with_functional_class("acid chloride", "[CX3](=O)[Cl]");
        let tree = bare_mention("chloride");
        assert_eq!(
            classify_with(
                &tree,
                &Chemical::new("Acid Chloride"),
                &StaticNameResolver::new(),
                &groups
            ),
            EntityType::ChemicalClass
        );
    }

    #[test]
    fn head_noun_surface_is_false_positive() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "gold")),
                ))
                .child(token(Tag::Word, "surface")),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("gold")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn head_noun_compounds_is_chemical_class() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "nitro")),
                ))
                .child(token(Tag::Word, "compounds")),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("nitro")),
            EntityType::ChemicalClass
        );
    }

    #[test]
    fn head_noun_group_is_fragment() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "methyl")),
                ))
                .child(token(Tag::Word, "group")),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("methyl")),
            EntityType::Fragment
        );
    }

    #[test]
    fn preceding_on_is_false_positive() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(token(Tag::Word, "onto"))
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "alumina")),
                )),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("alumina")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn preceding_indefinite_determiner_is_chemical_class() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(token(Tag::Determiner, "an"))
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "alcohol")),
                )),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("alcohol")),
            EntityType::ChemicalClass
        );
    }

    #[test]
    fn preceding_definite_determiner_is_definite_reference() {
        let tree = TaggedTree::new(
            node(Tag::Sentence)
                .child(token(Tag::DefiniteDeterminer, "the"))
                .child(node(Tag::Molecule).child(
                    node(Tag::ChemicalName).child(token(Tag::Word, "amine")),
                )),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("amine")),
            EntityType::DefiniteReference
        );
    }

    #[test]
    fn compound_reference_overrides_earlier_heuristics() {
        // Plural name would classify as a class, but the explicit
        // back-reference wins.
        let tree = TaggedTree::new(
            node(Tag::Sentence).child(
                node(Tag::Molecule)
                    .child(node(Tag::ChemicalName).child(token(Tag::Word, "amines")))
                    .child(
                        node(Tag::ReferenceToCompound)
                            .child(token(Tag::AlphanumericCardinal, "3a")),
                    ),
            ),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("amines")),
            EntityType::DefiniteReference
        );
    }

    #[test]
    fn compound_reference_does_not_resurrect_a_false_positive() {
        let tree = TaggedTree::new(
            node(Tag::Sentence).child(
                node(Tag::Molecule)
                    .child(node(Tag::ChemicalName).child(token(Tag::Word, "silica")))
                    .child(
                        node(Tag::ReferenceToCompound)
                            .child(token(Tag::AlphanumericCardinal, "3a")),
                    ),
            ),
        );
        assert_eq!(
            classify(&tree, &Chemical::new("silica gel")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn unanchored_mentions_fall_back_to_false_positive() {
        let tree = bare_mention("gibberish");
        assert_eq!(
            classify(&tree, &Chemical::new("gibberish")),
            EntityType::FalsePositive
        );
    }

    #[test]
    fn a_quantity_anchors_the_fallback_to_exact() {
        let tree = TaggedTree::new(
            node(Tag::Sentence).child(
                node(Tag::Molecule)
                    .child(node(Tag::ChemicalName).child(token(Tag::Word, "gibberish")))
                    .child(node(Tag::Quantity).child(token(Tag::Cardinal, "5"))),
            ),
        );
        assert_eq!(classify(&tree, &Chemical::new("gibberish")), EntityType::Exact);
    }

    #[test]
    fn a_resolved_structure_anchors_the_fallback_to_exact() {
        let tree = bare_mention("benzene");
        let mut chem = Chemical::new("benzene");
        chem.set_identifier_pair(ChemicalIdentifierPair::new(
            Some("c1ccccc1".into()),
            Some("InChI=1S/C6H6/c1-2-4-6-5-3-1/h1-6H".into()),
        ));
        assert_eq!(classify(&tree, &chem), EntityType::Exact);
    }
}

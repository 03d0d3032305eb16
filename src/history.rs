//! Cross-section extraction state.
//!
//! One [`ReactionHistory`] lives for one document's extraction run. It is
//! created at document start, threaded `&mut` through every section, and
//! discarded at document end; nothing here is process-wide. Sections and
//! steps later in the document resolve their references against what earlier
//! ones recorded.

use std::collections::HashMap;

use crate::chemical::{Chemical, Reaction};

#[derive(Debug, Default)]
struct SectionRecord {
    /// Reactions in the order they were filed for this section.
    reactions: Vec<Reaction>,
    /// Products by step identifier.
    products_by_step: HashMap<String, Vec<Chemical>>,
    /// Products of the section's overall/last step, refreshed on every
    /// product-bearing filing. Empty until one is filed.
    overall_products: Vec<Chemical>,
}

/// Aliases and per-section reaction records accumulated while a document is
/// processed.
#[derive(Debug, Default)]
pub struct ReactionHistory {
    aliases: HashMap<String, Chemical>,
    sections: HashMap<String, SectionRecord>,
}

impl ReactionHistory {
    pub fn new() -> Self {
        ReactionHistory::default()
    }

    /// Register an alias for a chemical. Keys are exact, case-sensitive
    /// strings; a later registration overwrites an earlier one, since text
    /// may redefine an alias within a narrower scope.
    pub fn register_alias(&mut self, identifier: impl Into<String>, chemical: Chemical) {
        self.aliases.insert(identifier.into(), chemical);
    }

    pub fn chemical_for_alias(&self, identifier: &str) -> Option<&Chemical> {
        self.aliases.get(identifier)
    }

    /// File reactions under a section and optional step identifier, updating
    /// the product index. Records are only ever added, never removed.
    pub fn add_reactions(
        &mut self,
        section: &str,
        step: Option<&str>,
        reactions: Vec<Reaction>,
    ) {
        let record = self.sections.entry(section.to_string()).or_default();
        // The step's product is the last product-bearing reaction filed with it.
        let products = reactions
            .iter()
            .rev()
            .find(|reaction| !reaction.products.is_empty())
            .map(|reaction| reaction.products.clone());
        record.reactions.extend(reactions);
        if let Some(products) = products {
            if let Some(step) = step {
                record
                    .products_by_step
                    .insert(step.to_string(), products.clone());
            }
            record.overall_products = products;
        }
    }

    /// The recorded product of a (section, step). `step = None` reads the
    /// section's overall/last step.
    pub fn product_of(&self, section: &str, step: Option<&str>) -> Option<&Chemical> {
        let record = self.sections.get(section)?;
        match step {
            Some(step) => record.products_by_step.get(step)?.first(),
            None => record.overall_products.first(),
        }
    }

    /// All reactions filed under a section, in filing order.
    pub fn reactions_in_section(&self, section: &str) -> &[Reaction] {
        self.sections
            .get(section)
            .map(|record| record.reactions.as_slice())
            .unwrap_or(&[])
    }

    /// Every product InChI recorded anywhere in a section.
    pub fn product_inchis(&self, section: &str) -> Vec<&str> {
        self.reactions_in_section(section)
            .iter()
            .flat_map(|reaction| reaction.products.iter())
            .filter_map(|product| product.inchi())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemical::ChemicalIdentifierPair;

    fn chemical(name: &str, inchi: &str) -> Chemical {
        let mut chem = Chemical::new(name);
        chem.set_identifier_pair(ChemicalIdentifierPair::new(None, Some(inchi.to_string())));
        chem
    }

    #[test]
    fn alias_lookup_is_case_sensitive_and_last_writer_wins() {
        let mut history = ReactionHistory::new();
        history.register_alias("3a", chemical("first", "InChI=1S/first"));
        history.register_alias("3a", chemical("second", "InChI=1S/second"));

        assert_eq!(
            history.chemical_for_alias("3a").map(Chemical::name),
            Some("second")
        );
        assert!(history.chemical_for_alias("3A").is_none());
    }

    #[test]
    fn products_are_indexed_by_section_and_step() {
        let mut history = ReactionHistory::new();
        history.add_reactions(
            "3",
            Some("1"),
            vec![Reaction::with_product(chemical("X", "InChI=1S/X"))],
        );

        assert_eq!(
            history.product_of("3", Some("1")).map(Chemical::name),
            Some("X")
        );
        assert!(history.product_of("3", Some("2")).is_none());
        assert!(history.product_of("4", Some("1")).is_none());
    }

    #[test]
    fn step_none_reads_the_latest_filed_step() {
        let mut history = ReactionHistory::new();
        history.add_reactions(
            "3",
            Some("1"),
            vec![Reaction::with_product(chemical("X", "InChI=1S/X"))],
        );
        history.add_reactions(
            "3",
            Some("2"),
            vec![Reaction::with_product(chemical("Y", "InChI=1S/Y"))],
        );

        assert_eq!(
            history.product_of("3", None).map(Chemical::name),
            Some("Y")
        );
        assert_eq!(
            history.product_of("3", Some("1")).map(Chemical::name),
            Some("X")
        );
    }

    #[test]
    fn reactions_accumulate_and_expose_their_product_inchis() {
        let mut history = ReactionHistory::new();
        history.add_reactions(
            "3",
            None,
            vec![Reaction::with_product(chemical("X", "InChI=1S/X"))],
        );
        history.add_reactions(
            "3",
            Some("a"),
            vec![Reaction::with_product(chemical("Y", "InChI=1S/Y"))],
        );

        assert_eq!(history.reactions_in_section("3").len(), 2);
        assert_eq!(
            history.product_inchis("3"),
            vec!["InChI=1S/X", "InChI=1S/Y"]
        );
        assert!(history.reactions_in_section("9").is_empty());
    }

    #[test]
    fn productless_reactions_do_not_disturb_the_index() {
        let mut history = ReactionHistory::new();
        history.add_reactions(
            "3",
            None,
            vec![Reaction::with_product(chemical("X", "InChI=1S/X"))],
        );
        history.add_reactions("3", Some("a"), vec![Reaction::default()]);

        assert_eq!(
            history.product_of("3", None).map(Chemical::name),
            Some("X")
        );
        assert!(history.product_of("3", Some("a")).is_none());
    }
}

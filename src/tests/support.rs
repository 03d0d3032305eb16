//! Static collaborator fakes shared across the test modules.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::chemical::{Chemical, Reaction};
use crate::external::{FunctionalGroupLookup, NameResolver, ReactionExtractor};
use crate::section::{ExperimentalStep, ResolvedMention};

/// A name resolver backed by a fixed name -> (SMILES, InChI) table.
#[derive(Debug, Default)]
pub struct StaticNameResolver {
    structures: HashMap<String, (String, String)>,
}

impl StaticNameResolver {
    pub fn new() -> Self {
        StaticNameResolver::default()
    }

    pub fn with_structure(mut self, name: &str, smiles: &str, inchi: &str) -> Self {
        self.structures
            .insert(name.to_string(), (smiles.to_string(), inchi.to_string()));
        self
    }

    fn lookup(&self, name_components: &[String]) -> Option<&(String, String)> {
        self.structures.get(&name_components.join(" "))
    }
}

impl NameResolver for StaticNameResolver {
    fn smiles_for_name(&self, name_components: &[String]) -> Option<String> {
        self.lookup(name_components).map(|(smiles, _)| smiles.clone())
    }

    fn inchi_for_name(&self, name_components: &[String]) -> Option<String> {
        self.lookup(name_components).map(|(_, inchi)| inchi.clone())
    }

    fn contains_resolvable_name(&self, text: &str) -> bool {
        self.structures.keys().any(|name| text.contains(name))
    }
}

/// A functional-group dictionary backed by fixed tables.
#[derive(Debug, Default)]
pub struct StaticFunctionalGroups {
    smarts: HashMap<String, String>,
    functional_class: HashMap<String, String>,
}

impl StaticFunctionalGroups {
    pub fn new() -> Self {
        StaticFunctionalGroups::default()
    }

    pub fn with_smarts(mut self, name: &str, smarts: &str) -> Self {
        self.smarts.insert(name.to_string(), smarts.to_string());
        self
    }

    pub fn with_functional_class(mut self, name: &str, smarts: &str) -> Self {
        self.functional_class
            .insert(name.to_string(), smarts.to_string());
        self
    }
}

impl FunctionalGroupLookup for StaticFunctionalGroups {
    fn smarts_for_name(&self, lowercased_name: &str) -> Option<String> {
        self.smarts.get(lowercased_name).cloned()
    }

    fn functional_class_smarts_for_name(&self, lowercased_name: &str) -> Option<String> {
        self.functional_class.get(lowercased_name).cloned()
    }
}

/// A reaction extractor that never finds anything.
#[derive(Debug, Default)]
pub struct NullExtractor;

impl ReactionExtractor for NullExtractor {
    fn extract_reactions(
        &self,
        _step: &ExperimentalStep,
        _mentions: &[ResolvedMention],
        _step_target: Option<&Chemical>,
        _title_compound: Option<&Chemical>,
    ) -> Vec<Reaction> {
        Vec::new()
    }
}

/// A reaction extractor that plays back scripted product lists, one per
/// step, in order.
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    products_per_step: RefCell<VecDeque<Vec<Chemical>>>,
}

impl ScriptedExtractor {
    pub fn new(products_per_step: Vec<Vec<Chemical>>) -> Self {
        ScriptedExtractor {
            products_per_step: RefCell::new(products_per_step.into()),
        }
    }
}

impl ReactionExtractor for ScriptedExtractor {
    fn extract_reactions(
        &self,
        _step: &ExperimentalStep,
        _mentions: &[ResolvedMention],
        _step_target: Option<&Chemical>,
        _title_compound: Option<&Chemical>,
    ) -> Vec<Reaction> {
        match self.products_per_step.borrow_mut().pop_front() {
            Some(products) if !products.is_empty() => vec![Reaction {
                products,
                ..Reaction::default()
            }],
            _ => Vec::new(),
        }
    }
}

/// A reaction extractor that emits one reaction producing each mention
/// classified as resolvable, so pipeline tests can observe resolved
/// chemicals downstream.
#[derive(Debug, Default)]
pub struct MentionProductExtractor;

impl ReactionExtractor for MentionProductExtractor {
    fn extract_reactions(
        &self,
        _step: &ExperimentalStep,
        mentions: &[ResolvedMention],
        _step_target: Option<&Chemical>,
        _title_compound: Option<&Chemical>,
    ) -> Vec<Reaction> {
        mentions
            .iter()
            .map(|mention| Reaction::with_product(mention.chemical.clone()))
            .collect()
    }
}

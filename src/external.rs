//! Collaborator traits at the crate boundary.
//!
//! The extraction core has no file or wire format of its own; it talks to
//! the surrounding pipeline through these traits. All lookups are pure:
//! unresolvable input yields `None`, never an error.

use crate::chemical::{Chemical, Reaction};
use crate::section::{ExperimentalStep, ResolvedMention};

/// Chemical-name-to-structure resolution.
pub trait NameResolver {
    /// Resolve space-separated name components to a SMILES string.
    fn smiles_for_name(&self, name_components: &[String]) -> Option<String>;

    /// Resolve space-separated name components to an InChI string.
    fn inchi_for_name(&self, name_components: &[String]) -> Option<String>;

    /// Whether `text` contains any systematic chemical name the resolver
    /// understands. Used only as a last-resort anchor check.
    fn contains_resolvable_name(&self, text: &str) -> bool;
}

/// Functional-group/SMARTS dictionary, static for the run.
pub trait FunctionalGroupLookup {
    /// Exact-match SMARTS for a lower-cased chemical name.
    fn smarts_for_name(&self, lowercased_name: &str) -> Option<String>;

    /// As above, restricted to functional-class names. A hit here means the
    /// mention names a class of structures rather than one structure.
    fn functional_class_smarts_for_name(&self, lowercased_name: &str) -> Option<String>;
}

/// Downstream reaction extraction over one step's resolved mentions.
pub trait ReactionExtractor {
    fn extract_reactions(
        &self,
        step: &ExperimentalStep,
        mentions: &[ResolvedMention],
        step_target: Option<&Chemical>,
        title_compound: Option<&Chemical>,
    ) -> Vec<Reaction>;
}

/// The collaborator bundle handed into the extraction driver.
pub struct Externals<'a> {
    pub names: &'a dyn NameResolver,
    pub functional_groups: &'a dyn FunctionalGroupLookup,
    pub reactions: &'a dyn ReactionExtractor,
}

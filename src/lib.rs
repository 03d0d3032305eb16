//! Cross-reference and entity-type classification engine for tagged
//! chemical procedure text.
//!
//! Experimental procedures arrive from an upstream NLP tagger as trees of
//! tagged spans. This crate turns every chemical mention in those trees into
//! a [`Chemical`] record with an assigned [`EntityType`], and resolves
//! anaphoric and inter-step/inter-section references so that a chemical
//! mentioned only by alias, definite reference, or "product of Example N"
//! is linked to the concrete structure it denotes.
//!
//! ## Per-mention pipeline
//!
//! - [`EntityTypeClassifier`] - assigns one of a fixed set of entity types
//!   from ordered textual heuristics over the mention's local tagged context
//! - [`AnaphoraResolver`] - resolves compound references ("compound 3a") and
//!   procedure references ("prepared as in Example 2") against accumulated
//!   state, and harvests alias definitions for later mentions
//!
//! ## Document-level state
//!
//! - [`ReactionHistory`] - one per document: the alias map and the
//!   section/step reaction records later references resolve against
//! - [`SectionExtractor`] - drives extraction over one experimental section,
//!   step by step, filing extracted reactions under their
//!   [`SectionAndStepIdentifier`]
//!
//! ## Collaborators
//!
//! The tagger, the name-to-structure resolver, the functional-group/SMARTS
//! dictionary, and the downstream reaction extractor are external; they
//! appear here as the [`NameResolver`], [`FunctionalGroupLookup`] and
//! [`ReactionExtractor`] traits and the [`TaggedTree`] input type.
//!
//! Unresolvable and ambiguous references are reported through `tracing`
//! diagnostics and skipped, never guessed. Processing is strictly
//! sequential: sections in document order, steps within a section in
//! document order, because later steps depend on the state earlier ones
//! produced.

mod chemical;
mod classifier;
mod error;
mod external;
mod history;
mod identifiers;
mod resolution;
mod section;
pub mod tree;

pub use chemical::{Chemical, ChemicalIdentifierPair, EntityType, Reaction};
pub use classifier::{EntityTypeClassifier, MentionContext};
pub use error::{ExtractionError, ExtractionResult};
pub use external::{Externals, FunctionalGroupLookup, NameResolver, ReactionExtractor};
pub use history::ReactionHistory;
pub use identifiers::{ProcedureIdentifierParser, SectionAndStepIdentifier};
pub use resolution::AnaphoraResolver;
pub use section::{
    ChemicalAliasPair, ExperimentalSection, ExperimentalStep, Paragraph, ResolvedMention,
    SectionExtractor,
};
pub use tree::{NodeId, Tag, TaggedTree};

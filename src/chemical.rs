//! Chemical record model.
//!
//! A [`Chemical`] is created per textual mention. Mentions never share a
//! record; when a reference resolves one chemical's identity onto another,
//! only the identifier pair is copied.

use serde::{Deserialize, Serialize};

/// A SMILES/InChI pair describing a resolved structure.
///
/// A pair with both fields `None` is meaningful: it marks a mention as
/// intentionally unresolved, e.g. a functional-class placeholder such as
/// "acid chloride" that names a class rather than a structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalIdentifierPair {
    pub smiles: Option<String>,
    pub inchi: Option<String>,
}

impl ChemicalIdentifierPair {
    pub fn new(smiles: Option<String>, inchi: Option<String>) -> Self {
        ChemicalIdentifierPair { smiles, inchi }
    }

    /// The explicit "known empty" placeholder.
    pub fn known_empty() -> Self {
        ChemicalIdentifierPair::default()
    }
}

/// Semantic entity type assigned to a chemical mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// A specific, independently resolvable chemical.
    Exact,
    /// A class of compounds ("nitro compounds", "amines").
    ChemicalClass,
    /// A sub-structural fragment (group, atom, ring, bond, ...).
    Fragment,
    /// A mention referring back to something already established.
    DefiniteReference,
    /// Text that matched the mention pattern but is not a chemical mention.
    FalsePositive,
}

/// A chemical as extracted from one textual mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    name: String,
    identifier_pair: Option<ChemicalIdentifierPair>,
    smarts: Option<String>,
    entity_type: Option<EntityType>,
}

impl Chemical {
    pub fn new(name: impl Into<String>) -> Self {
        Chemical {
            name: name.into(),
            identifier_pair: None,
            smarts: None,
            entity_type: None,
        }
    }

    /// The name exactly as it appeared in text.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier_pair(&self) -> Option<&ChemicalIdentifierPair> {
        self.identifier_pair.as_ref()
    }

    pub fn set_identifier_pair(&mut self, pair: ChemicalIdentifierPair) {
        self.identifier_pair = Some(pair);
    }

    pub fn smiles(&self) -> Option<&str> {
        self.identifier_pair
            .as_ref()
            .and_then(|pair| pair.smiles.as_deref())
    }

    pub fn inchi(&self) -> Option<&str> {
        self.identifier_pair
            .as_ref()
            .and_then(|pair| pair.inchi.as_deref())
    }

    pub fn has_inchi(&self) -> bool {
        self.inchi().is_some()
    }

    pub fn smarts(&self) -> Option<&str> {
        self.smarts.as_deref()
    }

    pub fn set_smarts(&mut self, smarts: impl Into<String>) {
        self.smarts = Some(smarts.into());
    }

    pub fn entity_type(&self) -> Option<EntityType> {
        self.entity_type
    }

    /// Assigns the entity type. A type is assigned at most once per mention;
    /// any later call is ignored.
    pub fn set_entity_type(&mut self, entity_type: EntityType) {
        if self.entity_type.is_none() {
            self.entity_type = Some(entity_type);
        }
    }
}

/// A reaction record produced by the downstream reaction extractor.
///
/// The cross-reference core only reads `products`; the other participant
/// lists are carried for the consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub reactants: Vec<Chemical>,
    pub products: Vec<Chemical>,
    pub agents: Vec<Chemical>,
}

impl Reaction {
    pub fn with_product(product: Chemical) -> Self {
        Reaction {
            products: vec![product],
            ..Reaction::default()
        }
    }
}

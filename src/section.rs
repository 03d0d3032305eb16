//! Experimental section/step model and the extraction driver.
//!
//! Sections are processed in document order, and steps within a section in
//! document order, because later steps resolve references against the
//! aliases and filed reactions of earlier ones. The driver wires the
//! per-mention pipeline: build a chemical from local information, classify
//! it, resolve anaphora, harvest aliases, then hand the step's resolved
//! mentions to the downstream reaction extractor and file what comes back.

use tracing::debug;

use crate::chemical::{Chemical, ChemicalIdentifierPair, Reaction};
use crate::classifier::{EntityTypeClassifier, MentionContext};
use crate::error::{ExtractionError, ExtractionResult};
use crate::external::Externals;
use crate::history::ReactionHistory;
use crate::identifiers::ProcedureIdentifierParser;
use crate::resolution::{name_components, AnaphoraResolver};
use crate::tree::{NodeId, Tag, TaggedTree};

/// One tagged paragraph of an experimental step.
#[derive(Debug, Clone)]
pub struct Paragraph {
    tree: TaggedTree,
}

impl Paragraph {
    pub fn new(tree: TaggedTree) -> Self {
        Paragraph { tree }
    }

    pub fn tree(&self) -> &TaggedTree {
        &self.tree
    }
}

/// A chemical together with the alias the heading text gave it, e.g. a
/// target compound titled "4-nitrobenzaldehyde (3a)".
#[derive(Debug, Clone)]
pub struct ChemicalAliasPair {
    pub chemical: Chemical,
    pub alias: Option<String>,
}

impl ChemicalAliasPair {
    pub fn new(chemical: Chemical, alias: Option<String>) -> Self {
        ChemicalAliasPair { chemical, alias }
    }
}

/// One step of an experimental section.
#[derive(Debug, Clone)]
pub struct ExperimentalStep {
    procedure: Option<TaggedTree>,
    target: Option<ChemicalAliasPair>,
    paragraphs: Vec<Paragraph>,
}

impl ExperimentalStep {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        ExperimentalStep {
            procedure: None,
            target: None,
            paragraphs,
        }
    }

    /// Attach the step's own procedure span ("Step 2").
    pub fn with_procedure(mut self, procedure: TaggedTree) -> Self {
        self.procedure = Some(procedure);
        self
    }

    /// Attach the step's target compound from its heading.
    pub fn with_target(mut self, target: ChemicalAliasPair) -> Self {
        self.target = Some(target);
        self
    }

    pub fn procedure(&self) -> Option<&TaggedTree> {
        self.procedure.as_ref()
    }

    pub fn target(&self) -> Option<&ChemicalAliasPair> {
        self.target.as_ref()
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }
}

/// An experimental section: a procedure heading ("Example 3") and its steps.
#[derive(Debug, Clone)]
pub struct ExperimentalSection {
    procedure: Option<TaggedTree>,
    target: Option<ChemicalAliasPair>,
    steps: Vec<ExperimentalStep>,
}

impl ExperimentalSection {
    pub fn new(procedure: Option<TaggedTree>, steps: Vec<ExperimentalStep>) -> Self {
        ExperimentalSection {
            procedure,
            target: None,
            steps,
        }
    }

    /// Attach the section's ultimate target compound from its heading.
    pub fn with_target(mut self, target: ChemicalAliasPair) -> Self {
        self.target = Some(target);
        self
    }

    pub fn procedure(&self) -> Option<&TaggedTree> {
        self.procedure.as_ref()
    }

    pub fn target(&self) -> Option<&ChemicalAliasPair> {
        self.target.as_ref()
    }

    pub fn steps(&self) -> &[ExperimentalStep] {
        &self.steps
    }
}

/// A mention span resolved to its chemical, handed to the downstream
/// reaction extractor.
#[derive(Debug, Clone)]
pub struct ResolvedMention {
    /// Index of the paragraph within the step.
    pub paragraph: usize,
    /// The mention node within that paragraph's tree.
    pub node: NodeId,
    pub chemical: Chemical,
}

/// Drives extraction over one experimental section, updating the shared
/// per-document [`ReactionHistory`] as it goes.
pub struct SectionExtractor<'a> {
    section: &'a ExperimentalSection,
    history: &'a mut ReactionHistory,
    classifier: EntityTypeClassifier,
    resolver: AnaphoraResolver,
    identifiers: ProcedureIdentifierParser,
}

impl<'a> SectionExtractor<'a> {
    pub fn new(section: &'a ExperimentalSection, history: &'a mut ReactionHistory) -> Self {
        SectionExtractor {
            section,
            history,
            classifier: EntityTypeClassifier::new(),
            resolver: AnaphoraResolver::new(),
            identifiers: ProcedureIdentifierParser::default(),
        }
    }

    /// Finds all the reactions in this section, step by step.
    pub fn parse_reactions(&mut self, externals: &Externals<'_>) -> ExtractionResult<Vec<Reaction>> {
        let ultimate_target = self.section.target().cloned().map(|pair| {
            if let Some(alias) = &pair.alias {
                self.history.register_alias(alias.clone(), pair.chemical.clone());
            }
            pair.chemical
        });

        let mut section_reactions = Vec::new();
        let step_count = self.section.steps().len();
        for (index, step) in self.section.steps().iter().enumerate() {
            let mut step_target = step.target().cloned().map(|pair| {
                if let Some(alias) = &pair.alias {
                    self.history.register_alias(alias.clone(), pair.chemical.clone());
                }
                pair.chemical
            });
            if step_target.is_none() && index + 1 == step_count {
                // The last step implicitly produces the section's target.
                step_target = ultimate_target.clone();
            }
            let title_compound = step_target.clone().or_else(|| ultimate_target.clone());

            let mentions = self.process_mentions(step, externals);
            let reactions = externals.reactions.extract_reactions(
                step,
                &mentions,
                step_target.as_ref(),
                title_compound.as_ref(),
            );
            self.record_reactions(step, &reactions)?;
            section_reactions.extend(reactions);
        }
        Ok(section_reactions)
    }

    fn enclosing_section_identifier(&self) -> Option<String> {
        let procedure = self.section.procedure()?;
        self.identifiers.section_identifier(procedure, procedure.root())
    }

    /// Build, classify and resolve a chemical for every mention in the
    /// step's paragraphs. Named mentions are classified before anaphora
    /// resolution; unnamed mentions are resolved first, since their type
    /// depends on what the resolution attaches.
    fn process_mentions(
        &mut self,
        step: &ExperimentalStep,
        externals: &Externals<'_>,
    ) -> Vec<ResolvedMention> {
        let enclosing_section = self.enclosing_section_identifier();
        let mut resolved = Vec::new();

        for (paragraph_index, paragraph) in step.paragraphs().iter().enumerate() {
            let tree = paragraph.tree();
            for mention in tree.descendants_with_tag(tree.root(), Tag::Molecule) {
                let mut chemical = self.chemical_from_mention(tree, mention, externals);
                let entity_type = self.classifier.classify(&MentionContext {
                    tree,
                    mention,
                    chemical: &chemical,
                    names: externals.names,
                    functional_groups: externals.functional_groups,
                });
                chemical.set_entity_type(entity_type);
                self.resolver.resolve(
                    tree,
                    mention,
                    &mut chemical,
                    enclosing_section.as_deref(),
                    self.history,
                );
                for (alias, target) in self.resolver.harvest_alias_definitions(
                    tree,
                    mention,
                    &chemical,
                    externals.names,
                ) {
                    self.history.register_alias(alias, target);
                }
                resolved.push(ResolvedMention {
                    paragraph: paragraph_index,
                    node: mention,
                    chemical,
                });
            }

            for mention in tree.descendants_with_tag(tree.root(), Tag::UnnamedMolecule) {
                let mut chemical = self.chemical_from_mention(tree, mention, externals);
                self.resolver.resolve(
                    tree,
                    mention,
                    &mut chemical,
                    enclosing_section.as_deref(),
                    self.history,
                );
                let entity_type = self.classifier.classify(&MentionContext {
                    tree,
                    mention,
                    chemical: &chemical,
                    names: externals.names,
                    functional_groups: externals.functional_groups,
                });
                chemical.set_entity_type(entity_type);
                resolved.push(ResolvedMention {
                    paragraph: paragraph_index,
                    node: mention,
                    chemical,
                });
            }
        }
        resolved
    }

    /// A chemical built from the mention's local information: its name
    /// components, any structure the name resolves to, any identity a known
    /// alias primes, and any functional-group SMARTS the name matches.
    fn chemical_from_mention(
        &self,
        tree: &TaggedTree,
        mention: NodeId,
        externals: &Externals<'_>,
    ) -> Chemical {
        let components = mention_name_components(tree, mention);
        let name = components.join(" ");
        let mut chemical = Chemical::new(name.clone());

        let smiles = externals.names.smiles_for_name(&components);
        let inchi = externals.names.inchi_for_name(&components);
        if smiles.is_some() || inchi.is_some() {
            chemical.set_identifier_pair(ChemicalIdentifierPair::new(smiles, inchi));
        }

        // A mention whose exact name is a known alias starts from the
        // aliased identity.
        if let Some(referenced) = self.history.chemical_for_alias(&name) {
            if let Some(pair) = referenced.identifier_pair() {
                chemical.set_identifier_pair(pair.clone());
            }
        }

        let lowercased = name.to_lowercase();
        if let Some(smarts) = externals.functional_groups.smarts_for_name(&lowercased) {
            chemical.set_smarts(smarts);
            if externals
                .functional_groups
                .functional_class_smarts_for_name(&lowercased)
                .is_some()
            {
                // A functional-class name denotes a class, not a structure:
                // mark it intentionally unresolved.
                chemical.set_identifier_pair(ChemicalIdentifierPair::known_empty());
            }
        }
        chemical
    }

    /// Associate the extracted reactions with this section and step's
    /// procedure identifiers so later cross-references can find them.
    fn record_reactions(
        &mut self,
        step: &ExperimentalStep,
        reactions: &[Reaction],
    ) -> ExtractionResult<()> {
        let Some(procedure) = self.section.procedure() else {
            return Err(ExtractionError::MissingProcedure);
        };
        let Some(section_identifier) =
            self.identifiers.section_identifier(procedure, procedure.root())
        else {
            debug!(
                procedure = %procedure.value(procedure.root()),
                "section procedure was not understood as a section identifier; reactions not filed"
            );
            return Ok(());
        };

        let step_identifier = match step.procedure() {
            Some(step_procedure) => {
                match self.identifiers.step_identifier(
                    step_procedure,
                    step_procedure.root(),
                    &section_identifier,
                ) {
                    Some(identifier) => Some(identifier),
                    None => {
                        debug!(
                            procedure = %step_procedure.value(step_procedure.root()),
                            "step procedure was not understood as a step identifier; reactions not filed"
                        );
                        return Ok(());
                    }
                }
            }
            None => None,
        };

        self.history.add_reactions(
            &section_identifier,
            step_identifier.as_deref(),
            reactions.to_vec(),
        );
        Ok(())
    }
}

/// The name components of a mention: the tokens of its first chemical-name
/// span, or all of its leaf tokens when it has none (unnamed mentions).
fn mention_name_components(tree: &TaggedTree, mention: NodeId) -> Vec<String> {
    match tree
        .descendants_with_tag(mention, Tag::ChemicalName)
        .first()
    {
        Some(&span) => name_components(tree, span),
        None => name_components(tree, mention),
    }
}

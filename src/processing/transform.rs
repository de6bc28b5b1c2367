//! Declarative ledger transformation.
//!
//! A [`TransformDefinition`] is authored outside the crate as YAML and
//! describes how the flat payment items of a raw ledger are grouped into
//! the normalized employee tree. [`apply`] is the pure engine;
//! [`TransformPipeline`] adds path checks, loading and saving around it.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{Span, info};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::document::{self, Node};
use crate::ledger::{LedgerStore, require_file, require_path};
use crate::logging::component_span;

/// Why the engine refused a definition or an input document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The definition is not valid YAML or does not have the expected shape.
    #[error("transform definition could not be read: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The definition parsed but is not usable.
    #[error("invalid transform definition: {0}")]
    Definition(String),

    /// The input is not a JSON document.
    #[error("input is not a valid document: {0}")]
    Input(#[from] serde_json::Error),

    /// The input has no node under the source container key.
    #[error("input has no '{container}' node")]
    MissingContainer {
        /// The configured container key.
        container: String,
    },
}

/// Where the payment items are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// Key of the node holding the items.
    pub container: String,
    /// Key of each item.
    pub item: String,
}

/// Shape of the produced tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    /// Key of the root node.
    pub root: String,
    /// Key of each group node.
    pub group: String,
    /// Key of each entry node nested in a group.
    pub entry: String,
}

/// One or more source fields feeding a target field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSource {
    /// A single source field.
    Single(String),
    /// Candidate source fields; the first one present wins.
    FirstOf(Vec<String>),
}

impl FieldSource {
    /// Returns the candidate source fields in priority order.
    pub fn candidates(&self) -> &[String] {
        match self {
            FieldSource::Single(name) => std::slice::from_ref(name),
            FieldSource::FirstOf(names) => names,
        }
    }
}

/// A target field of the entry nodes and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryField {
    /// Field name in the entry node.
    pub target: String,
    /// Source field(s) in the payment item.
    pub source: FieldSource,
}

/// Order of the group nodes in the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Order in which each group first appears in the input.
    #[default]
    FirstSeen,
    /// Sorted by the `group_by` fields, in the order they are listed.
    Sorted,
}

/// A declarative raw-ledger to normalized-tree mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformDefinition {
    /// Free-form name used in logs.
    #[serde(default)]
    pub name: String,
    /// Where items are read from.
    pub source: SourceSpec,
    /// Shape of the output tree.
    pub target: TargetSpec,
    /// Item fields forming the grouping key; copied onto each group node.
    pub group_by: Vec<String>,
    /// Fields of each entry node, in output order.
    #[serde(deserialize_with = "ordered_fields")]
    pub entry_fields: Vec<EntryField>,
    /// Output order of the group nodes.
    #[serde(default)]
    pub order: GroupOrder,
}

fn ordered_fields<'de, D>(deserializer: D) -> Result<Vec<EntryField>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<EntryField>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of target field to source field(s)")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut fields = Vec::new();
            while let Some((target, source)) = map.next_entry::<String, FieldSource>()? {
                fields.push(EntryField { target, source });
            }
            Ok(fields)
        }
    }

    deserializer.deserialize_map(FieldsVisitor)
}

impl TransformDefinition {
    /// Parses and validates a YAML definition.
    pub fn from_yaml(content: &str) -> Result<Self, EngineError> {
        let definition: TransformDefinition = serde_yaml::from_str(content)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Checks that every name is present and that the output shape is
    /// unambiguous.
    pub fn validate(&self) -> Result<(), EngineError> {
        let required = [
            ("source.container", &self.source.container),
            ("source.item", &self.source.item),
            ("target.root", &self.target.root),
            ("target.group", &self.target.group),
            ("target.entry", &self.target.entry),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(EngineError::Definition(format!("{} must not be empty", key)));
            }
        }

        if self.group_by.is_empty() {
            return Err(EngineError::Definition(
                "group_by must list at least one field".to_string(),
            ));
        }
        if let Some(field) = self.group_by.iter().find(|f| f.trim().is_empty()) {
            return Err(EngineError::Definition(format!("group_by field '{}' is blank", field)));
        }
        if self.group_by.contains(&self.target.entry) {
            return Err(EngineError::Definition(format!(
                "group_by field '{}' clashes with target.entry",
                self.target.entry
            )));
        }

        if self.entry_fields.is_empty() {
            return Err(EngineError::Definition("entry_fields must not be empty".to_string()));
        }
        for field in &self.entry_fields {
            if field.target.trim().is_empty() {
                return Err(EngineError::Definition(
                    "entry field name must not be empty".to_string(),
                ));
            }
            let candidates = field.source.candidates();
            if candidates.is_empty() || candidates.iter().any(|c| c.trim().is_empty()) {
                return Err(EngineError::Definition(format!(
                    "entry field '{}' needs non-empty source field names",
                    field.target
                )));
            }
        }

        Ok(())
    }
}

struct Group {
    key: Vec<String>,
    entries: Vec<Value>,
}

/// Runs a definition over an input document.
///
/// The output holds one group node per distinct `group_by` key, carrying
/// the key fields and the entries built from each of its items. Entry
/// fields whose sources are all absent are left out. The result depends
/// only on `definition` and `input`.
pub fn apply(definition: &TransformDefinition, input: &Value) -> Result<Value, EngineError> {
    definition.validate()?;

    let containers = document::descendants(input, &definition.source.container);
    if containers.is_empty() {
        return Err(EngineError::MissingContainer {
            container: definition.source.container.clone(),
        });
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut positions: HashMap<Vec<String>, usize> = HashMap::new();

    let items = containers
        .into_iter()
        .flat_map(|container| document::descendants_of(container, &definition.source.item));
    for item in items {
        let key: Vec<String> = definition
            .group_by
            .iter()
            .map(|field| document::text(item, field))
            .collect();

        let index = match positions.get(&key) {
            Some(index) => *index,
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    entries: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[index].entries.push(Value::Object(build_entry(definition, item)));
    }

    if definition.order == GroupOrder::Sorted {
        groups.sort_by(|a, b| a.key.cmp(&b.key));
    }

    let group_nodes: Vec<Value> = groups
        .into_iter()
        .map(|group| {
            let mut node = Node::new();
            for (field, value) in definition.group_by.iter().zip(group.key) {
                node.insert(field.clone(), Value::String(value));
            }
            node.insert(definition.target.entry.clone(), Value::Array(group.entries));
            Value::Object(node)
        })
        .collect();

    let mut root = Map::new();
    root.insert(definition.target.group.clone(), Value::Array(group_nodes));
    let mut output = Map::new();
    output.insert(definition.target.root.clone(), Value::Object(root));
    Ok(Value::Object(output))
}

fn build_entry(definition: &TransformDefinition, item: &Node) -> Node {
    let mut entry = Node::new();
    for field in &definition.entry_fields {
        let value = field
            .source
            .candidates()
            .iter()
            .find_map(|candidate| document::field(item, candidate));
        if let Some(value) = value {
            entry.insert(field.target.clone(), Value::String(value.into_owned()));
        }
    }
    entry
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformOutput {
    /// Name of the definition that was applied.
    pub definition: String,
    /// The normalized tree, as saved.
    pub tree: Value,
}

/// Runs definitions over ledger files and saves the result.
#[derive(Debug, Clone)]
pub struct TransformPipeline {
    store: LedgerStore,
    span: Span,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new(LedgerStore::new())
    }
}

impl TransformPipeline {
    /// Creates a pipeline logging under the `transform_pipeline` component.
    pub fn new(store: LedgerStore) -> Self {
        Self::with_span(store, component_span("transform_pipeline"))
    }

    /// Creates a pipeline logging under the given span.
    pub fn with_span(store: LedgerStore, span: Span) -> Self {
        Self { store, span }
    }

    /// Transforms `input` with `definition` and writes the result to `output`.
    ///
    /// # Returns
    ///
    /// Returns the produced tree, or an error if:
    /// - Any path is empty (`Validation`)
    /// - The input or the definition does not exist (`NotFound`)
    /// - The definition or the input is rejected by the engine (`Transform`)
    /// - The output cannot be written (`Io`)
    ///
    /// Nothing is written unless the engine succeeds.
    pub fn run(
        &self,
        input: &Path,
        definition: &Path,
        output: &Path,
    ) -> LedgerResult<TransformOutput> {
        const OPERATION: &str = "transform";
        let _enter = self.span.enter();

        require_path(input, "input")?;
        require_path(definition, "definition")?;
        require_path(output, "output")?;
        require_file(input, "input", OPERATION)?;
        require_file(definition, "definition", OPERATION)?;

        let definition_text = self.store.read_text(definition, OPERATION)?;
        let parsed = TransformDefinition::from_yaml(&definition_text)
            .map_err(|e| LedgerError::transform(OPERATION, definition.display().to_string(), e))?;

        let input_text = self.store.read_text(input, OPERATION)?;
        let input_tree: Value = serde_json::from_str(&input_text)
            .map_err(|e| {
                LedgerError::transform(OPERATION, input.display().to_string(), EngineError::from(e))
            })?;

        let tree = apply(&parsed, &input_tree)
            .map_err(|e| LedgerError::transform(OPERATION, input.display().to_string(), e))?;

        self.store.save(output, &tree, OPERATION)?;
        info!(
            definition = %parsed.name,
            input = %input.display(),
            output = %output.display(),
            "Transformed ledger"
        );

        Ok(TransformOutput {
            definition: parsed.name,
            tree,
        })
    }
}

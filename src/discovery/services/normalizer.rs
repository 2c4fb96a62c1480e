//! Tolerant translation of capability manifests into provider records.

use crate::catalog::domain::{Operation, ProviderDetails, ProviderRecord, ProviderSpec};
use crate::discovery::domain::{EndpointCandidate, ManifestWarning, NormalizeError, RawManifest};
use jsonschema::JSONSchema;
use mockable::Clock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Capability-manifest schema used for advisory validation.
const MANIFEST_SCHEMA: &str = include_str!("meta_knowledge_graph.schema.json");

/// Edge keys that form the operation triple or would collide with it.
const TRIPLE_KEYS: [&str; 6] = [
    "subject",
    "predicate",
    "object",
    "subject_category",
    "object_category",
    "predicate_category",
];

/// Error returned when the manifest schema cannot be loaded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid manifest schema: {0}")]
pub struct ManifestSchemaError(String);

/// A provider record accepted from a manifest, with the advisories raised
/// while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The record built from the manifest.
    pub record: ProviderRecord,
    /// Non-fatal problems found in the manifest.
    pub warnings: Vec<ManifestWarning>,
}

/// Turns raw capability manifests into provider records.
///
/// Schema conformance is advisory: violations are reported as warnings and
/// never reject a manifest. Only structural defects that prevent reading
/// `edges` or `nodes` reject it.
pub struct ManifestNormalizer {
    schema: JSONSchema,
}

impl fmt::Debug for ManifestNormalizer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ManifestNormalizer")
            .finish_non_exhaustive()
    }
}

impl ManifestNormalizer {
    /// Creates a normalizer using the embedded capability-manifest schema.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestSchemaError`] when the embedded schema does not
    /// parse or compile.
    pub fn new() -> Result<Self, ManifestSchemaError> {
        let document: Value = serde_json::from_str(MANIFEST_SCHEMA)
            .map_err(|err| ManifestSchemaError(err.to_string()))?;
        Self::with_schema(&document)
    }

    /// Creates a normalizer validating against `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestSchemaError`] when the schema does not compile.
    pub fn with_schema(document: &Value) -> Result<Self, ManifestSchemaError> {
        let schema =
            JSONSchema::compile(document).map_err(|err| ManifestSchemaError(err.to_string()))?;
        Ok(Self { schema })
    }

    /// Builds the provider record for `candidate` from its manifest.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] when the manifest is not an object, lacks
    /// `edges` or `nodes`, or contains an unreadable edge or node.
    pub fn normalize(
        &self,
        candidate: &EndpointCandidate,
        manifest: &RawManifest,
        clock: &impl Clock,
    ) -> Result<Normalized, NormalizeError> {
        let document = manifest.as_value();
        let object = document.as_object().ok_or(NormalizeError::NotAnObject)?;
        let mut warnings = self.schema_warnings(document);

        let edges = object
            .get("edges")
            .ok_or(NormalizeError::MissingField("edges"))?
            .as_array()
            .ok_or_else(|| NormalizeError::InvalidField {
                field: "edges",
                reason: String::from("expected a list"),
            })?;
        let operations = parse_edges(edges, &mut warnings)?;

        let nodes = object
            .get("nodes")
            .ok_or(NormalizeError::MissingField("nodes"))?
            .as_object()
            .ok_or_else(|| NormalizeError::InvalidField {
                field: "nodes",
                reason: String::from("expected a mapping"),
            })?;
        let preferred_prefixes = parse_nodes(nodes, &mut warnings)?;

        let record = ProviderRecord::new(
            ProviderSpec {
                title: candidate.title.clone(),
                infores_id: candidate.infores_id.clone(),
                base_url: candidate.base_url.clone(),
                maturity: candidate.maturity,
                operations,
                details: ProviderDetails::new().with_preferred_prefixes(preferred_prefixes),
            },
            clock,
        );

        Ok(Normalized { record, warnings })
    }

    fn schema_warnings(&self, document: &Value) -> Vec<ManifestWarning> {
        match self.schema.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| ManifestWarning::SchemaViolation {
                    path: error.instance_path.to_string(),
                    message: error.to_string(),
                })
                .collect(),
        }
    }
}

fn parse_edges(
    edges: &[Value],
    warnings: &mut Vec<ManifestWarning>,
) -> Result<Vec<Operation>, NormalizeError> {
    let mut seen = HashSet::new();
    let mut operations = Vec::with_capacity(edges.len());

    for (index, edge) in edges.iter().enumerate() {
        let operation = parse_edge(index, edge)?;
        let (subject, predicate, object) = operation.triple();
        if !seen.insert((subject.to_owned(), predicate.to_owned(), object.to_owned())) {
            warnings.push(ManifestWarning::DuplicateOperation {
                index,
                subject: subject.to_owned(),
                predicate: predicate.to_owned(),
                object: object.to_owned(),
            });
            continue;
        }
        operations.push(operation);
    }

    Ok(operations)
}

fn parse_edge(index: usize, edge: &Value) -> Result<Operation, NormalizeError> {
    let invalid = |reason: String| NormalizeError::InvalidEdge { index, reason };
    let fields = edge
        .as_object()
        .ok_or_else(|| invalid(String::from("not an object")))?;
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| invalid(format!("missing '{name}'")))?
            .as_str()
            .ok_or_else(|| invalid(format!("'{name}' is not a string")))
    };

    let subject = field("subject")?;
    let predicate = field("predicate")?;
    let object = field("object")?;
    let attributes: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !TRIPLE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Operation::new(subject, predicate, object)
        .map(|operation| operation.with_attributes(attributes))
        .map_err(|err| invalid(err.to_string()))
}

fn parse_nodes(
    nodes: &Map<String, Value>,
    warnings: &mut Vec<ManifestWarning>,
) -> Result<BTreeMap<String, Vec<String>>, NormalizeError> {
    let mut prefixes = BTreeMap::new();

    for (category, node) in nodes {
        let invalid = |reason: &str| NormalizeError::InvalidNode {
            category: category.clone(),
            reason: reason.to_owned(),
        };
        let fields = node.as_object().ok_or_else(|| invalid("not an object"))?;

        let declared = match fields.get("id_prefixes") {
            None | Some(Value::Null) => {
                warnings.push(ManifestWarning::MissingIdPrefixes {
                    category: category.clone(),
                });
                Vec::new()
            }
            Some(Value::Array(items)) => string_prefixes(category, items, warnings),
            Some(_) => return Err(invalid("id_prefixes is not a list")),
        };
        prefixes.insert(category.clone(), declared);
    }

    Ok(prefixes)
}

fn string_prefixes(
    category: &str,
    items: &[Value],
    warnings: &mut Vec<ManifestWarning>,
) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let prefix = item.as_str().map(str::to_owned);
            if prefix.is_none() {
                warnings.push(ManifestWarning::NonStringPrefix {
                    category: category.to_owned(),
                    index,
                });
            }
            prefix
        })
        .collect()
}

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error_catalog::error::{parse_error, CatalogResult};

type CodeMessages = BTreeMap<String, String>;
type FieldCodes = BTreeMap<String, CodeMessages>;
type ResourceFields = BTreeMap<String, FieldCodes>;

/// Locale-specific lookup table from `(resource, field, code)` to a message.
///
/// Catalogs are immutable once parsed; the loader shares them behind an `Arc`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorCatalog {
    resources: ResourceFields,
}

/// Shape of a locale document. Only the `errors` subtree is read; the rest of
/// the document carries view translations this crate does not need.
#[derive(Deserialize)]
struct LocaleDocument {
    #[serde(default)]
    errors: Option<Value>,
}

impl ErrorCatalog {
    /// Parses a YAML locale document and extracts its `errors` subtree.
    ///
    /// A document without `errors` produces an empty catalog, which resolves
    /// every lookup to the generic fallback. Entries under `errors` that are not
    /// a string at `resource.field.code` are skipped individually; only a
    /// document that is not valid YAML (or not a mapping) fails to parse.
    pub fn from_yaml_str(source: &str) -> CatalogResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: LocaleDocument = serde_yaml::from_str(source)
            .map_err(|err| parse_error(format!("invalid locale document: {err}")))?;
        let resources = match &document.errors {
            Some(Value::Mapping(by_resource)) => collect_messages(by_resource),
            Some(Value::Null) | None => ResourceFields::new(),
            Some(_) => {
                log::debug!("ignoring `errors` entry that is not a mapping");
                ResourceFields::new()
            }
        };
        Ok(Self { resources })
    }

    /// Builds a catalog from flat `(resource, field, code, message)` entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S, S)>,
        S: Into<String>,
    {
        let mut resources = ResourceFields::new();
        for (resource, field, code, message) in entries {
            resources
                .entry(resource.into())
                .or_default()
                .entry(field.into())
                .or_default()
                .insert(code.into(), message.into());
        }
        Self { resources }
    }

    /// Returns the message for the triple when every path segment exists.
    pub fn lookup(&self, resource: &str, field: &str, code: &str) -> Option<&str> {
        self.resources
            .get(resource)?
            .get(field)?
            .get(code)
            .map(String::as_str)
    }

    /// Number of leaf messages.
    pub fn len(&self) -> usize {
        self.resources
            .values()
            .flat_map(|fields| fields.values())
            .map(|codes| codes.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn collect_messages(by_resource: &Mapping) -> ResourceFields {
    let mut resources = ResourceFields::new();
    for (resource, fields) in by_resource {
        let (Some(resource), Some(fields)) = (resource.as_str(), fields.as_mapping()) else {
            log::debug!("skipping malformed catalog resource {resource:?}");
            continue;
        };
        for (field, codes) in fields {
            let (Some(field), Some(codes)) = (field.as_str(), codes.as_mapping()) else {
                log::debug!("skipping malformed catalog field {resource}.{field:?}");
                continue;
            };
            for (code, message) in codes {
                let (Some(code), Some(message)) = (code.as_str(), message.as_str()) else {
                    log::debug!("skipping malformed catalog entry {resource}.{field}.{code:?}");
                    continue;
                };
                resources
                    .entry(resource.to_string())
                    .or_default()
                    .entry(field.to_string())
                    .or_default()
                    .insert(code.to_string(), message.to_string());
            }
        }
    }
    resources
}

//! `$ref` resolution for field definitions

use super::error::LoadError;
use super::fetch::ResourceFetcher;
use super::raw::RawField;
use std::collections::HashMap;
use tracing::debug;

const LOCAL_PREFIX: &str = "#/definitions/";

/// Resolves `$ref` pointers against the document's own `definitions`
/// section or an external document
pub struct DefinitionResolver<'a> {
    definitions: HashMap<&'a str, &'a RawField>,
    fetcher: &'a dyn ResourceFetcher,
    base: Option<&'a str>,
}

impl<'a> DefinitionResolver<'a> {
    pub fn new(
        definitions: &'a [(String, RawField)],
        fetcher: &'a dyn ResourceFetcher,
        base: Option<&'a str>,
    ) -> Self {
        Self {
            definitions: definitions
                .iter()
                .map(|(name, def)| (name.as_str(), def))
                .collect(),
            fetcher,
            base,
        }
    }

    /// Resolve a reference to the definition it points to
    ///
    /// `path` is the referencing field, used for error messages.
    pub fn resolve(&self, reference: &str, path: &str) -> Result<RawField, LoadError> {
        let unresolved = || LoadError::UnresolvedReference {
            path: path.to_string(),
            reference: reference.to_string(),
        };

        if let Some(name) = reference.strip_prefix(LOCAL_PREFIX) {
            return self
                .definitions
                .get(name)
                .map(|def| (*def).clone())
                .ok_or_else(unresolved);
        }
        if reference.starts_with('#') {
            return Err(unresolved());
        }

        let (location, fragment) = match reference.split_once('#') {
            Some((location, fragment)) => (location, Some(fragment)),
            None => (reference, None),
        };
        debug!("Resolving external definition {} for {}", reference, path);
        let text = self.fetcher.fetch_reference(location, self.base)?;
        let document: serde_yaml::Value = serde_yaml::from_str(&text)?;

        let target = match fragment {
            Some(pointer) => pointer
                .split('/')
                .filter(|segment| !segment.is_empty())
                .try_fold(&document, |node, segment| node.get(segment))
                .ok_or_else(unresolved)?,
            None => &document,
        };
        serde_yaml::from_value(target.clone()).map_err(LoadError::from)
    }

    /// Fetch a referenced quality specification
    ///
    /// YAML and JSON check files are parsed so that formatting edits do not
    /// count as changes; anything else is kept as text.
    pub fn resolve_document(
        &self,
        reference: &str,
        path: &str,
    ) -> Result<serde_json::Value, LoadError> {
        debug!("Resolving quality specification {} for {}", reference, path);
        let text = self.fetcher.fetch_reference(reference, self.base)?;
        Ok(serde_yaml::from_str(&text).unwrap_or(serde_json::Value::String(text)))
    }
}

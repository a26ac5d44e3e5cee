//! Reading contract documents and referenced definitions
//!
//! Locations are local paths or http(s) URLs. Relative references inside a
//! local document resolve against that document's directory and may not
//! escape it.

use super::error::LoadError;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Source of document text
pub trait ResourceFetcher: Send + Sync {
    /// Fetch a top-level document
    fn fetch(&self, location: &str) -> Result<String, LoadError>;

    /// Fetch a document referenced from the document at `base`
    ///
    /// `base` is `None` for documents loaded from text. Only absolute
    /// http(s) references can be followed from such documents.
    fn fetch_reference(&self, reference: &str, base: Option<&str>) -> Result<String, LoadError> {
        if is_remote(reference) || base.is_some() {
            self.fetch(reference)
        } else {
            Err(LoadError::UnanchoredReference(reference.to_string()))
        }
    }
}

/// Check whether a location is an http(s) URL
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Default fetcher: local files plus http(s) when the feature is enabled
#[derive(Debug, Clone)]
pub struct LocationFetcher {
    timeout: Duration,
}

impl LocationFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for LocationFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ResourceFetcher for LocationFetcher {
    fn fetch(&self, location: &str) -> Result<String, LoadError> {
        if is_remote(location) {
            fetch_http(location, self.timeout)
        } else {
            read_file(Path::new(location))
        }
    }

    fn fetch_reference(&self, reference: &str, base: Option<&str>) -> Result<String, LoadError> {
        if is_remote(reference) {
            return fetch_http(reference, self.timeout);
        }
        match base {
            Some(base) if !is_remote(base) => read_relative(reference, Path::new(base)),
            Some(base) => Err(LoadError::Fetch {
                location: reference.to_string(),
                message: format!("relative reference inside remote document {}", base),
            }),
            None => Err(LoadError::UnanchoredReference(reference.to_string())),
        }
    }
}

/// Read a local file
pub fn read_file(path: &Path) -> Result<String, LoadError> {
    debug!("Reading {}", path.display());
    std::fs::read_to_string(path).map_err(|e| LoadError::Read {
        location: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Read a file referenced relative to the directory of `source_file`
pub fn read_relative(reference: &str, source_file: &Path) -> Result<String, LoadError> {
    let ref_path = reference.strip_prefix("./").unwrap_or(reference);
    let read_error = |message: String| LoadError::Read {
        location: reference.to_string(),
        message,
    };

    let source_dir = match source_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let resolved = source_dir
        .join(ref_path)
        .canonicalize()
        .map_err(|e| read_error(e.to_string()))?;
    let source_dir = source_dir
        .canonicalize()
        .map_err(|e| read_error(e.to_string()))?;

    if !resolved.starts_with(&source_dir) {
        return Err(read_error(format!("resolves outside {}", source_dir.display())));
    }

    read_file(&resolved)
}

#[cfg(feature = "http")]
fn fetch_http(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let fetch_error = |message: String| LoadError::Fetch {
        location: url.to_string(),
        message,
    };

    debug!("Fetching {} (timeout {:?})", url, timeout);
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| fetch_error(format!("failed to create HTTP client: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| fetch_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP status {}", response.status())));
    }

    response.text().map_err(|e| fetch_error(e.to_string()))
}

#[cfg(not(feature = "http"))]
fn fetch_http(url: &str, _timeout: Duration) -> Result<String, LoadError> {
    Err(LoadError::RemoteUnsupported(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/contract.yaml"));
        assert!(is_remote("http://localhost:8080/c.yaml"));
        assert!(!is_remote("./contracts/orders.yaml"));
    }

    #[test]
    fn test_read_relative() {
        let dir = TempDir::new().unwrap();
        let contract = dir.path().join("contract.yaml");
        fs::write(&contract, "id: x").unwrap();
        fs::write(dir.path().join("definitions.yaml"), "type: string").unwrap();

        let content = read_relative("./definitions.yaml", &contract).unwrap();
        assert_eq!(content, "type: string");
    }

    #[test]
    fn test_read_relative_rejects_traversal() {
        let outer = TempDir::new().unwrap();
        let inner = outer.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(outer.path().join("secret.yaml"), "type: string").unwrap();
        let contract = inner.join("contract.yaml");
        fs::write(&contract, "id: x").unwrap();

        let err = read_relative("../secret.yaml", &contract).unwrap_err();
        assert!(err.to_string().contains("resolves outside"));
    }

    #[test]
    fn test_missing_file() {
        let fetcher = LocationFetcher::default();
        let err = fetcher.fetch("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }

    #[test]
    fn test_reference_without_base_is_not_read() {
        let dir = TempDir::new().unwrap();
        let definition = dir.path().join("definitions.yaml");
        fs::write(&definition, "type: string").unwrap();

        let fetcher = LocationFetcher::default();
        let absolute = definition.to_string_lossy();
        let err = fetcher.fetch_reference(&absolute, None).unwrap_err();
        assert_eq!(err, LoadError::UnanchoredReference(absolute.into_owned()));

        let err = fetcher.fetch_reference("./definitions.yaml", None).unwrap_err();
        assert!(matches!(err, LoadError::UnanchoredReference(_)));
    }
}

//! Fetching the term dictionary and item catalog
//!
//! Documents come from a local directory or an `http(s)` base URL. Both
//! loads run concurrently; a failed load is logged and yields an empty
//! dataset so the page can always render.

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::models::{Catalog, Session, TermDictionary};

/// Where the documents are read from
#[derive(Debug, Clone)]
pub enum Source {
    /// A local directory
    Directory(PathBuf),
    /// A base URL; document names are joined onto it
    Remote { client: Client, base: Url },
}

impl Source {
    /// Picks the source kind from the location string
    pub fn from_location(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LoadError::InvalidLocation("empty location".to_string()));
        }

        if location.starts_with("http://") || location.starts_with("https://") {
            // Without a trailing slash Url::join would replace the last segment
            let with_slash = if location.ends_with('/') {
                location.to_string()
            } else {
                format!("{}/", location)
            };
            let base = Url::parse(&with_slash)
                .map_err(|e| LoadError::InvalidLocation(format!("{}: {}", location, e)))?;
            Ok(Source::Remote {
                client: Client::new(),
                base,
            })
        } else {
            Ok(Source::Directory(PathBuf::from(location)))
        }
    }

    pub fn directory<P: AsRef<Path>>(path: P) -> Self {
        Source::Directory(path.as_ref().to_path_buf())
    }

    /// Where `name` would be read from, for messages
    pub fn describe(&self, name: &str) -> String {
        match self {
            Source::Directory(dir) => dir.join(name).display().to_string(),
            Source::Remote { base, .. } => base
                .join(name)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("{}{}", base, name)),
        }
    }

    /// Reads a document as text
    pub async fn fetch(&self, name: &str) -> Result<String> {
        match self {
            Source::Directory(dir) => {
                let path = dir.join(name);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            Source::Remote { client, base } => {
                let url = base
                    .join(name)
                    .map_err(|e| LoadError::InvalidLocation(format!("{}: {}", name, e)))?;

                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|source| LoadError::Http {
                        url: url.to_string(),
                        source,
                    })?;

                if !response.status().is_success() {
                    return Err(LoadError::Status {
                        url: url.to_string(),
                        status: response.status(),
                    });
                }

                response.text().await.map_err(|source| LoadError::Http {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }

    /// Reads and parses a JSON document
    pub async fn fetch_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.fetch(name).await?;
        serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            name: name.to_string(),
            source,
        })
    }

    /// Loads a document, falling back to the empty value on any error
    async fn fetch_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.fetch_json(name).await {
            Ok(value) => value,
            Err(e) => {
                log::error!("Error loading {}: {}", self.describe(name), e);
                T::default()
            }
        }
    }
}

/// Loads the term dictionary; empty on failure
pub async fn load_terms(source: &Source, name: &str) -> TermDictionary {
    let terms: TermDictionary = source.fetch_or_default(name).await;
    for issue in terms.validate() {
        log::warn!("{}: {}", name, issue);
    }
    terms
}

/// Loads the item catalog sorted by name; empty on failure
pub async fn load_catalog(source: &Source, name: &str) -> Catalog {
    let catalog: Catalog = source.fetch_or_default(name).await;
    catalog.sorted_by_name()
}

/// Loads both documents concurrently. Returns only once both are done.
pub async fn load_session(source: &Source, config: &Config) -> Session {
    let (terms, catalog) = tokio::join!(
        load_terms(source, &config.terms_file),
        load_catalog(source, &config.data_file),
    );
    log::info!(
        "Loaded {} terms and {} items",
        terms.len(),
        catalog.len()
    );
    Session::new(terms, catalog)
}

//! Name-to-crew lookup built once per process.
//!
//! Built-in crews come from a static table; file crews come from `*.toml`
//! files in the crews directory, read in file-name order. Discovery is best
//! effort: a file that fails to load is logged, recorded in
//! [`CrewRegistry::skipped`], and the rest of the directory is still read.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::builtin::builtin_crews;
use super::file::FileCrew;
use super::{Crew, CrewInputs, CrewSpec, InputField};
use crate::error::CrewError;
use crate::tools::ToolCatalog;

/// Where a crew was registered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrewSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for CrewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrewSource::Builtin => write!(f, "builtin"),
            CrewSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A registered crew.
#[derive(Clone)]
pub struct CrewDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: CrewSource,
    pub input_fields: Vec<InputField>,
    crew: Arc<dyn Crew>,
}

impl CrewDescriptor {
    fn new(crew: Arc<dyn Crew>, source: CrewSource) -> Self {
        Self {
            id: crew.id().to_string(),
            name: crew.name().to_string(),
            description: crew.description().to_string(),
            source,
            input_fields: crew.input_fields(),
            crew,
        }
    }

    pub fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        self.crew.assemble(inputs)
    }
}

impl fmt::Debug for CrewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrewDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("input_fields", &self.input_fields)
            .finish_non_exhaustive()
    }
}

/// A crew that discovery could not register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCrew {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CrewRegistry {
    crews: BTreeMap<String, CrewDescriptor>,
    skipped: Vec<SkippedCrew>,
}

impl CrewRegistry {
    /// Register the built-in crews plus every valid crew file in
    /// `crews_dir`. Never fails; problems end up in [`Self::skipped`].
    pub fn discover(crews_dir: Option<&Path>, catalog: &ToolCatalog) -> Self {
        let mut registry = Self::default();

        for crew in builtin_crews() {
            registry.try_register(Arc::from(crew), CrewSource::Builtin);
        }

        if let Some(dir) = crews_dir {
            match crew_files(dir) {
                Ok(files) => {
                    for path in files {
                        match FileCrew::load(&path, catalog) {
                            Ok(crew) => {
                                registry.try_register(Arc::new(crew), CrewSource::File(path));
                            }
                            Err(e) => {
                                tracing::warn!("Skipping crew file: {e}");
                                registry.skipped.push(SkippedCrew {
                                    source: path.display().to_string(),
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("No crews directory at {}", dir.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to read crews directory {}: {e}", dir.display());
                    registry.skipped.push(SkippedCrew {
                        source: dir.display().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            crews = registry.crews.len(),
            skipped = registry.skipped.len(),
            "Crew registry built"
        );
        registry
    }

    /// Add a crew. The first registration of an id wins.
    pub fn register(&mut self, crew: Arc<dyn Crew>, source: CrewSource) -> Result<(), CrewError> {
        let descriptor = CrewDescriptor::new(crew, source);
        if self.crews.contains_key(&descriptor.id) {
            return Err(CrewError::DuplicateId {
                kind: "crew",
                id: descriptor.id,
            });
        }
        self.crews.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    fn try_register(&mut self, crew: Arc<dyn Crew>, source: CrewSource) {
        let label = source.to_string();
        if let Err(e) = self.register(crew, source) {
            tracing::warn!("Skipping crew from {label}: {e}");
            self.skipped.push(SkippedCrew {
                source: label,
                reason: e.to_string(),
            });
        }
    }

    /// Look up by id or display name, ignoring case.
    pub fn get(&self, key: &str) -> Option<&CrewDescriptor> {
        let key = key.trim();
        self.crews.get(key).or_else(|| {
            self.crews
                .values()
                .find(|d| d.id.eq_ignore_ascii_case(key) || d.name.eq_ignore_ascii_case(key))
        })
    }

    pub fn require(&self, key: &str) -> Result<&CrewDescriptor, CrewError> {
        self.get(key)
            .ok_or_else(|| CrewError::UnknownCrew(key.to_string()))
    }

    /// Crews in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CrewDescriptor> {
        self.crews.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.crews.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.crews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crews.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedCrew] {
        &self.skipped
    }
}

/// `*.toml` files directly inside `dir`, sorted by file name.
fn crew_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_only_without_a_directory() {
        let registry = CrewRegistry::discover(None, &ToolCatalog::builtin());
        assert_eq!(registry.len(), builtin_crews().len());
        assert!(registry.skipped().is_empty());
    }

    #[test]
    fn lookup_by_id_or_name() {
        let registry = CrewRegistry::discover(None, &ToolCatalog::builtin());
        let by_id = registry.get("wallet-summary").unwrap();
        let by_name = registry.get("wallet summary").unwrap();
        assert_eq!(by_id.id, by_name.id);
        assert!(registry.get("nope").is_none());
        assert!(matches!(registry.require("nope"), Err(CrewError::UnknownCrew(_))));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CrewRegistry::default();
        registry
            .register(Arc::new(crate::crews::builtin::WalletSummary), CrewSource::Builtin)
            .unwrap();
        let err = registry
            .register(Arc::new(crate::crews::builtin::WalletSummary), CrewSource::Builtin)
            .unwrap_err();
        assert!(matches!(err, CrewError::DuplicateId { kind: "crew", .. }));
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let registry =
            CrewRegistry::discover(Some(&tmp.path().join("absent")), &ToolCatalog::builtin());
        assert!(registry.skipped().is_empty());
    }
}

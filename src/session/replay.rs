// Wed Oct 14 2026 - Alex

use super::{BrowserSession, ExportRequest, SessionError, SessionResult};
use crate::query::QueryRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Offline stand-in for the tariff portal, read from a JSON description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortalDescription {
    pub entities: Vec<PortalEntity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalEntity {
    pub name: String,
    /// `None` makes the metadata lookup fail.
    #[serde(default)]
    pub latest: Option<LatestInfo>,
    /// Archive served on download, relative to the description file.
    #[serde(default)]
    pub artifact: Option<PathBuf>,
    #[serde(default)]
    pub polls_until_ready: u32,
    #[serde(default)]
    pub unsupported: bool,
    /// Unlisted entities can still be looked up but not selected.
    #[serde(default = "default_listed")]
    pub listed: bool,
    #[serde(default)]
    pub download_failures: u32,
}

fn default_listed() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestInfo {
    pub period_key: String,
    #[serde(default)]
    pub volume_measure: String,
    #[serde(default)]
    pub classification_scheme: String,
}

impl PortalEntity {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            latest: None,
            artifact: None,
            polls_until_ready: 0,
            unsupported: false,
            listed: true,
            download_failures: 0,
        }
    }

    pub fn with_latest(mut self, period_key: &str, volume_measure: &str, classification_scheme: &str) -> Self {
        self.latest = Some(LatestInfo {
            period_key: period_key.to_string(),
            volume_measure: volume_measure.to_string(),
            classification_scheme: classification_scheme.to_string(),
        });
        self
    }

    pub fn with_artifact(mut self, artifact: PathBuf) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

#[derive(Debug, Default)]
struct ExportState {
    request: Option<ExportRequest>,
    submitted: bool,
    polls: u32,
    ready: bool,
}

pub struct ReplaySession {
    portal: PortalDescription,
    base_dir: PathBuf,
    selected: Option<usize>,
    export: ExportState,
    downloads_failed: HashMap<String, u32>,
    deletions: usize,
}

impl ReplaySession {
    pub fn new(portal: PortalDescription, base_dir: PathBuf) -> Self {
        Self {
            portal,
            base_dir,
            selected: None,
            export: ExportState::default(),
            downloads_failed: HashMap::new(),
            deletions: 0,
        }
    }

    pub fn from_file(path: &Path) -> SessionResult<Self> {
        let text = fs::read_to_string(path)?;
        let portal: PortalDescription =
            serde_json::from_str(&text).map_err(|e| SessionError::Portal {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        log::debug!(
            "Loaded replay portal with {} entities from {}",
            portal.entities.len(),
            path.display()
        );
        Ok(Self::new(portal, base_dir))
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    fn find(&self, entity: &str) -> Option<usize> {
        self.portal.entities.iter().position(|e| e.name == entity)
    }

    fn selected_entity(&self) -> SessionResult<&PortalEntity> {
        self.selected
            .map(|i| &self.portal.entities[i])
            .ok_or_else(|| SessionError::ElementNotFound("selected entity".to_string()))
    }
}

impl BrowserSession for ReplaySession {
    fn list_entities(&mut self) -> SessionResult<Vec<String>> {
        Ok(self
            .portal
            .entities
            .iter()
            .filter(|e| e.listed)
            .map(|e| e.name.clone())
            .collect())
    }

    fn fetch_latest_query_info(&mut self, entity: &str) -> SessionResult<Option<QueryRecord>> {
        let info = self
            .find(entity)
            .and_then(|i| self.portal.entities[i].latest.as_ref());

        Ok(info.map(|latest| {
            QueryRecord::new(
                entity,
                latest.period_key.as_str(),
                latest.volume_measure.as_str(),
                latest.classification_scheme.as_str(),
            )
        }))
    }

    fn select_entity(&mut self, entity: &str) -> SessionResult<()> {
        let index = self
            .find(entity)
            .filter(|&i| self.portal.entities[i].listed)
            .ok_or_else(|| SessionError::ElementNotFound(entity.to_string()))?;

        self.selected = Some(index);
        self.export = ExportState::default();
        Ok(())
    }

    fn configure_export(&mut self, _record: &QueryRecord, request: &ExportRequest) -> SessionResult<()> {
        let entity = self.selected_entity()?;
        if entity.unsupported {
            return Err(SessionError::NoMatchingReport(entity.name.clone()));
        }

        self.export.request = Some(request.clone());
        Ok(())
    }

    fn submit_export(&mut self) -> SessionResult<()> {
        if self.export.request.is_none() {
            return Err(SessionError::ElementNotFound("export form".to_string()));
        }

        self.export.submitted = true;
        self.export.polls = 0;
        Ok(())
    }

    fn poll_ready(&mut self) -> SessionResult<bool> {
        if !self.export.submitted {
            return Err(SessionError::Transport("no export in progress".to_string()));
        }

        let needed = self.selected_entity()?.polls_until_ready;
        self.export.polls += 1;
        self.export.ready = self.export.polls > needed;
        Ok(self.export.ready)
    }

    fn download_artifact(&mut self, dest_dir: &Path) -> SessionResult<PathBuf> {
        if !self.export.ready {
            return Err(SessionError::ElementNotFound("download link".to_string()));
        }

        let entity = self.selected_entity()?.clone();
        let failed = self.downloads_failed.entry(entity.name.clone()).or_insert(0);
        if *failed < entity.download_failures {
            *failed += 1;
            return Err(SessionError::HttpStatus(503));
        }

        let artifact = entity
            .artifact
            .ok_or_else(|| SessionError::ElementNotFound("download link".to_string()))?;
        let source = if artifact.is_absolute() {
            artifact
        } else {
            self.base_dir.join(artifact)
        };

        let file_name = source
            .file_name()
            .ok_or_else(|| SessionError::Transport(format!("bad artifact path {}", source.display())))?;

        fs::create_dir_all(dest_dir)?;
        let target = dest_dir.join(file_name);
        fs::copy(&source, &target)?;

        Ok(target)
    }

    fn delete_generated_artifact(&mut self) -> SessionResult<()> {
        self.export = ExportState::default();
        self.deletions += 1;
        Ok(())
    }
}

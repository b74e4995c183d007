// Thu Oct 15 2026 - Alex

use super::failure::RetrievalFailure;
use super::integrity::IntegrityCheck;
use crate::archive::ArchiveExtractor;
use crate::config::Config;
use crate::query::QueryRecord;
use crate::session::{BrowserSession, ExportRequest, SessionError};
use crate::utils::{normalize_name, Pacer};
use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Field-free mirror of `RetrievalState`, used in traces and error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    SelectEntity,
    ConfigureExport,
    SubmitExport,
    PollReady,
    Download,
    VerifyIntegrity,
    Commit,
    Failed,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::SelectEntity => "select-entity",
            StateKind::ConfigureExport => "configure-export",
            StateKind::SubmitExport => "submit-export",
            StateKind::PollReady => "poll-ready",
            StateKind::Download => "download",
            StateKind::VerifyIntegrity => "verify-integrity",
            StateKind::Commit => "commit",
            StateKind::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug)]
pub enum RetrievalState {
    SelectEntity,
    ConfigureExport,
    SubmitExport,
    PollReady,
    Download,
    VerifyIntegrity { artifact: PathBuf },
    Commit { artifact: PathBuf },
    Failed(RetrievalFailure),
}

impl RetrievalState {
    pub fn kind(&self) -> StateKind {
        match self {
            RetrievalState::SelectEntity => StateKind::SelectEntity,
            RetrievalState::ConfigureExport => StateKind::ConfigureExport,
            RetrievalState::SubmitExport => StateKind::SubmitExport,
            RetrievalState::PollReady => StateKind::PollReady,
            RetrievalState::Download => StateKind::Download,
            RetrievalState::VerifyIntegrity { .. } => StateKind::VerifyIntegrity,
            RetrievalState::Commit { .. } => StateKind::Commit,
            RetrievalState::Failed(_) => StateKind::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub report_code: String,
    pub export_format: String,
    pub max_name_chars: usize,
    pub max_poll_attempts: u32,
    pub poll_interval: Duration,
    pub download_attempts: u32,
    pub download_dir: PathBuf,
    pub extract_dir: PathBuf,
    pub pacer: Pacer,
}

impl RetrievalSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            report_code: config.report_code.clone(),
            export_format: config.export_format.clone(),
            max_name_chars: config.max_name_chars,
            max_poll_attempts: config.max_poll_attempts.max(1),
            poll_interval: config.poll_interval(),
            download_attempts: config.download_attempts.max(1),
            download_dir: config.download_dir(),
            extract_dir: config.extract_dir(),
            pacer: Pacer::from_config(config),
        }
    }
}

/// A retrieval that reached `Commit`. Making it durable is up to the caller.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub record: QueryRecord,
    pub artifact: PathBuf,
    pub polls: u32,
    pub trace: Vec<StateKind>,
}

/// Drives one query through select → configure → submit → poll → download
/// → verify. Every step may fail; nothing here touches the durable stores.
pub struct RetrievalMachine<'a> {
    settings: RetrievalSettings,
    extractor: &'a dyn ArchiveExtractor,
    integrity: IntegrityCheck,
}

impl<'a> RetrievalMachine<'a> {
    pub fn new(settings: RetrievalSettings, extractor: &'a dyn ArchiveExtractor) -> Self {
        let integrity = IntegrityCheck::new(&settings.report_code, settings.max_name_chars);
        Self {
            settings,
            extractor,
            integrity,
        }
    }

    pub fn run<S: BrowserSession + ?Sized>(
        &self,
        session: &mut S,
        record: &QueryRecord,
    ) -> Result<Retrieval, RetrievalFailure> {
        let mut state = RetrievalState::SelectEntity;
        let mut trace = Vec::new();
        let mut polls = 0;

        loop {
            trace.push(state.kind());
            log::trace!("{}: {}", record.entity_id(), state.kind());

            state = match state {
                RetrievalState::SelectEntity => self.select(session, record),
                RetrievalState::ConfigureExport => self.configure(session, record),
                RetrievalState::SubmitExport => self.submit(session),
                RetrievalState::PollReady => {
                    let (next, used) = self.poll(session);
                    polls = used;
                    next
                }
                RetrievalState::Download => self.download(session),
                RetrievalState::VerifyIntegrity { artifact } => self.verify(record, artifact),
                RetrievalState::Commit { artifact } => {
                    return Ok(Retrieval {
                        record: record.clone(),
                        artifact,
                        polls,
                        trace,
                    });
                }
                RetrievalState::Failed(failure) => {
                    log::debug!("{} failed after {:?}", record.entity_id(), trace);
                    return Err(failure);
                }
            };
        }
    }

    fn select<S: BrowserSession + ?Sized>(&self, session: &mut S, record: &QueryRecord) -> RetrievalState {
        self.settings.pacer.pause();

        // Leftover exports on the portal confuse the download link lookup
        if let Err(e) = session.delete_generated_artifact() {
            log::warn!("Could not clear previous exports: {}", e);
        }

        match session.select_entity(record.entity_id()) {
            Ok(()) => RetrievalState::ConfigureExport,
            Err(SessionError::ElementNotFound(_)) => {
                RetrievalState::Failed(RetrievalFailure::EntityNotFound(record.entity_id().to_string()))
            }
            Err(source) => session_failure(StateKind::SelectEntity, source),
        }
    }

    fn configure<S: BrowserSession + ?Sized>(&self, session: &mut S, record: &QueryRecord) -> RetrievalState {
        self.settings.pacer.pause();

        let request = ExportRequest {
            report_code: self.settings.report_code.clone(),
            format: self.settings.export_format.clone(),
            file_name: normalize_name(record.entity_id(), self.settings.max_name_chars),
        };

        match session.configure_export(record, &request) {
            Ok(()) => RetrievalState::SubmitExport,
            Err(SessionError::NoMatchingReport(_)) => {
                RetrievalState::Failed(RetrievalFailure::UnsupportedReportType {
                    entity: record.entity_id().to_string(),
                    report_code: self.settings.report_code.clone(),
                })
            }
            Err(source) => session_failure(StateKind::ConfigureExport, source),
        }
    }

    fn submit<S: BrowserSession + ?Sized>(&self, session: &mut S) -> RetrievalState {
        self.settings.pacer.pause();

        match session.submit_export() {
            Ok(()) => RetrievalState::PollReady,
            Err(source) => session_failure(StateKind::SubmitExport, source),
        }
    }

    /// Bounded readiness poll. A failed check counts as an attempt.
    fn poll<S: BrowserSession + ?Sized>(&self, session: &mut S) -> (RetrievalState, u32) {
        let max = self.settings.max_poll_attempts;

        for attempt in 1..=max {
            match session.poll_ready() {
                Ok(true) => {
                    log::debug!("Export ready after {} poll(s)", attempt);
                    return (RetrievalState::Download, attempt);
                }
                Ok(false) => {}
                Err(e) => log::warn!("Readiness check {}/{} failed: {}", attempt, max, e),
            }

            if attempt < max && !self.settings.poll_interval.is_zero() {
                thread::sleep(self.settings.poll_interval);
            }
        }

        (
            RetrievalState::Failed(RetrievalFailure::ExportTimeout { attempts: max }),
            max,
        )
    }

    fn download<S: BrowserSession + ?Sized>(&self, session: &mut S) -> RetrievalState {
        let max = self.settings.download_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match session.download_artifact(&self.settings.download_dir) {
                Ok(artifact) => {
                    log::debug!("Downloaded {}", artifact.display());
                    return RetrievalState::VerifyIntegrity { artifact };
                }
                Err(e) if e.is_transient() && attempt < max => {
                    log::warn!("Download attempt {}/{} failed: {}", attempt, max, e);
                    self.settings.pacer.pause();
                }
                Err(e) => {
                    return RetrievalState::Failed(RetrievalFailure::DownloadFailure {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn verify(&self, record: &QueryRecord, artifact: PathBuf) -> RetrievalState {
        if let Err(e) = self.extractor.extract(&artifact, &self.settings.extract_dir) {
            return RetrievalState::Failed(e.into());
        }

        match self.integrity.verify(record, &artifact, &self.settings.extract_dir) {
            Ok(()) => RetrievalState::Commit { artifact },
            Err(issue) => RetrievalState::Failed(issue.into()),
        }
    }
}

fn session_failure(state: StateKind, source: SessionError) -> RetrievalState {
    RetrievalState::Failed(RetrievalFailure::Session { state, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::write_report_archive;
    use crate::archive::{ManifestGuard, ZipExtractor};
    use crate::retrieval::IntegrityIssue;
    use crate::session::{PortalDescription, PortalEntity, ReplaySession};

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_path_buf();
            let config = Config::new()
                .with_data_dir(root.join("data"))
                .without_delays()
                .with_max_poll_attempts(3);
            Self { _dir: dir, root, config }
        }

        fn portal_dir(&self) -> PathBuf {
            self.root.join("portal")
        }

        fn session(&self, entities: Vec<PortalEntity>) -> ReplaySession {
            ReplaySession::new(PortalDescription { entities }, self.portal_dir())
        }

        fn brazil(&self) -> PortalEntity {
            write_report_archive(&self.portal_dir(), "brazil", "brazil", "Brazil");
            PortalEntity::new("Brazil")
                .with_latest("2021", "100", "HS")
                .with_artifact(PathBuf::from("brazil_TL.zip"))
        }
    }

    fn record(entity: &str) -> QueryRecord {
        QueryRecord::new(entity, "2021", "100", "HS")
    }

    fn run(fixture: &Fixture, session: &mut ReplaySession, entity: &str) -> Result<Retrieval, RetrievalFailure> {
        let extractor = ManifestGuard::new(ZipExtractor::new());
        let machine = RetrievalMachine::new(RetrievalSettings::from_config(&fixture.config), &extractor);
        machine.run(session, &record(entity))
    }

    #[test]
    fn test_happy_path_reaches_commit() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.polls_until_ready = 1;
        let mut session = fixture.session(vec![entity]);

        let retrieval = run(&fixture, &mut session, "Brazil").unwrap();

        assert_eq!(
            retrieval.trace,
            vec![
                StateKind::SelectEntity,
                StateKind::ConfigureExport,
                StateKind::SubmitExport,
                StateKind::PollReady,
                StateKind::Download,
                StateKind::VerifyIntegrity,
                StateKind::Commit,
            ]
        );
        assert_eq!(retrieval.polls, 2);
        assert!(retrieval.artifact.starts_with(fixture.config.download_dir()));
        assert!(fixture.config.extract_dir().join("brazil_DutyDetails_TL.txt").exists());
        assert_eq!(session.deletions(), 1);
    }

    #[test]
    fn test_unlisted_entity_is_terminal() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.listed = false;
        let mut session = fixture.session(vec![entity]);

        let failure = run(&fixture, &mut session, "Brazil").unwrap_err();
        assert!(matches!(failure, RetrievalFailure::EntityNotFound(_)));
        assert!(failure.is_terminal());
    }

    #[test]
    fn test_missing_report_type_is_terminal() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.unsupported = true;
        let mut session = fixture.session(vec![entity]);

        let failure = run(&fixture, &mut session, "Brazil").unwrap_err();
        assert!(matches!(failure, RetrievalFailure::UnsupportedReportType { .. }));
        assert!(failure.is_terminal());
    }

    #[test]
    fn test_poll_is_bounded() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.polls_until_ready = 10;
        let mut session = fixture.session(vec![entity]);

        let failure = run(&fixture, &mut session, "Brazil").unwrap_err();
        assert!(matches!(failure, RetrievalFailure::ExportTimeout { attempts: 3 }));
        assert!(!failure.is_terminal());
    }

    #[test]
    fn test_download_retries_then_succeeds() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.download_failures = 2;
        let mut session = fixture.session(vec![entity]);

        assert!(run(&fixture, &mut session, "Brazil").is_ok());
    }

    #[test]
    fn test_download_gives_up() {
        let fixture = Fixture::new();
        let mut entity = fixture.brazil();
        entity.download_failures = 5;
        let mut session = fixture.session(vec![entity]);

        let failure = run(&fixture, &mut session, "Brazil").unwrap_err();
        assert!(matches!(failure, RetrievalFailure::DownloadFailure { attempts: 3, .. }));
    }

    #[test]
    fn test_foreign_artifact_fails_integrity() {
        let fixture = Fixture::new();
        write_report_archive(&fixture.portal_dir(), "brazil", "brazil", "Argentina");
        let entity = PortalEntity::new("Brazil")
            .with_latest("2021", "100", "HS")
            .with_artifact(PathBuf::from("brazil_TL.zip"));
        let mut session = fixture.session(vec![entity]);

        let failure = run(&fixture, &mut session, "Brazil").unwrap_err();
        assert!(matches!(
            failure,
            RetrievalFailure::IntegrityMismatch(IntegrityIssue::NameMismatch { .. })
        ));
        assert!(!failure.is_terminal());
    }
}

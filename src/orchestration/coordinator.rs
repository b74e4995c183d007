// Thu Oct 15 2026 - Alex

use super::observer::{NullObserver, Pass, PassObserver};
use super::report::{DiscoveryReport, DrainFailure, DrainReport, RunReport};
use crate::archive::{ArchiveExtractor, ManifestGuard, ZipExtractor};
use crate::config::Config;
use crate::query::QueryRecord;
use crate::retrieval::{Retrieval, RetrievalFailure, RetrievalMachine, RetrievalSettings};
use crate::session::{BrowserSession, SessionError};
use crate::store::{ErrorLog, FreshnessLog, PendingQueue, StoreError};
use crate::utils::logging::scoped_timer;
use chrono::{Local, NaiveDate};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Could not list entities: {0}")]
    EntityListing(#[source] SessionError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Drain whatever is already queued before discovering.
    pub resume_first: bool,
    pub skip_discovery: bool,
}

/// Owns the durable stores and the portal session for one process run and
/// sequences discovery and drain passes over them.
pub struct Orchestrator<'a, S: BrowserSession> {
    config: &'a Config,
    session: S,
    freshness: FreshnessLog,
    errors: ErrorLog,
    queue: PendingQueue,
    extractor: Box<dyn ArchiveExtractor + 'a>,
    observer: Box<dyn PassObserver + 'a>,
    today: Option<NaiveDate>,
}

impl<'a, S: BrowserSession> Orchestrator<'a, S> {
    pub fn new(config: &'a Config, session: S) -> Self {
        Self {
            config,
            session,
            freshness: FreshnessLog::new(config),
            errors: ErrorLog::new(config),
            queue: PendingQueue::new(config),
            extractor: Box::new(ManifestGuard::new(ZipExtractor::new())),
            observer: Box::new(NullObserver),
            today: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn PassObserver + 'a>) -> Self {
        self.observer = observer;
        self
    }

    /// Pins the date written to the logs.
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    pub fn freshness(&self) -> &FreshnessLog {
        &self.freshness
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.errors
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Queues every entity whose portal metadata is newer than its last
    /// completion. Lookup failures go to the error log and never stop the
    /// pass; store failures do.
    pub fn discover(&mut self, entities: &[String]) -> Result<DiscoveryReport, RunError> {
        let _timer = scoped_timer("discovery");
        let mut report = DiscoveryReport::default();
        self.observer.begin(Pass::Discovery, entities.len());

        for entity in entities {
            self.observer.advance(entity);
            report.checked += 1;

            let latest = match self.session.fetch_latest_query_info(entity) {
                Ok(latest) => latest,
                Err(e) => {
                    log::warn!("Metadata lookup for '{}' raised: {}", entity, e);
                    None
                }
            };

            let query = match latest {
                Some(query) => query,
                None => {
                    log::warn!("No metadata for '{}', recording discovery failure", entity);
                    self.errors.record(entity, self.today())?;
                    report.failed += 1;
                    continue;
                }
            };

            if self.freshness.is_fresh(&query)? {
                log::debug!("{} is up to date", query);
                report.already_fresh += 1;
            } else if self.queue.enqueue(&query)? {
                report.queued += 1;
            } else {
                report.already_queued += 1;
            }
        }

        self.observer.finish(&report.to_string());
        log::info!("Discovery: {}", report);
        Ok(report)
    }

    /// One retrieval attempt per queued query, in queue order. Recoverable
    /// failures stay queued for a later pass; terminal ones are dropped.
    pub fn drain(&mut self) -> Result<DrainReport, RunError> {
        let _timer = scoped_timer("drain");
        let pending = self.queue.load()?;
        let mut report = DrainReport::default();
        self.observer.begin(Pass::Drain, pending.len());

        let machine = RetrievalMachine::new(RetrievalSettings::from_config(self.config), &*self.extractor);
        let today = self.today();

        for record in pending {
            self.observer.advance(record.entity_id());

            match machine.run(&mut self.session, &record) {
                Ok(retrieval) => {
                    commit(&self.queue, &self.freshness, &retrieval, today)?;
                    report.completed += 1;
                }
                Err(failure) if failure.is_terminal() => {
                    log::warn!("Dropping {}: {}", record, failure);
                    self.queue.dequeue(&record)?;
                    report.dropped += 1;
                    report.failures.push(drain_failure(record, &failure));
                }
                Err(failure) => {
                    log::warn!("Leaving {} queued: {}", record, failure);
                    report.left_pending += 1;
                    report.failures.push(drain_failure(record, &failure));
                }
            }
        }

        self.observer.finish(&report.to_string());
        log::info!("Drain: {}", report);
        Ok(report)
    }

    /// Discovery over every listed entity, then a drain.
    pub fn run_once(&mut self) -> Result<RunReport, RunError> {
        self.run(RunOptions::default())
    }

    /// Drains the backlog left by an earlier run before discovering.
    pub fn run_resuming(&mut self) -> Result<RunReport, RunError> {
        self.run(RunOptions {
            resume_first: true,
            ..Default::default()
        })
    }

    pub fn run(&mut self, options: RunOptions) -> Result<RunReport, RunError> {
        let mut report = RunReport::default();

        if options.resume_first && !self.queue.is_empty()? {
            log::info!("Resuming {} queued quer(ies)", self.queue.len()?);
            report.resumed = Some(self.drain()?);
        }

        if !options.skip_discovery {
            let entities = self.session.list_entities().map_err(RunError::EntityListing)?;
            log::info!("Portal lists {} entities", entities.len());
            report.discovery = Some(self.discover(&entities)?);
        }

        report.drain = self.drain()?;
        Ok(report)
    }
}

/// Dequeue first, then record the completion. A crash in between leaves the
/// entity stale, so the next discovery queues it again.
fn commit(
    queue: &PendingQueue,
    freshness: &FreshnessLog,
    retrieval: &Retrieval,
    completed_on: NaiveDate,
) -> Result<(), StoreError> {
    queue.dequeue(&retrieval.record)?;
    freshness.record_success(&retrieval.record, completed_on)?;
    log::info!(
        "Completed {} from {}",
        retrieval.record,
        retrieval.artifact.display()
    );
    Ok(())
}

fn drain_failure(record: QueryRecord, failure: &RetrievalFailure) -> DrainFailure {
    DrainFailure {
        record,
        severity: failure.severity(),
        reason: failure.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::fixtures::write_report_archive;
    use crate::retrieval::Severity;
    use crate::session::{ExportRequest, PortalDescription, PortalEntity, ReplaySession, SessionResult};
    use std::cell::RefCell;
    use std::fs;
    use std::path::{Path, PathBuf};

    struct Fixture {
        _dir: tempfile::TempDir,
        portal_dir: PathBuf,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let portal_dir = dir.path().join("portal");
            let config = Config::new()
                .with_data_dir(dir.path().join("data"))
                .without_delays()
                .with_max_poll_attempts(2);
            Self {
                _dir: dir,
                portal_dir,
                config,
            }
        }

        /// Listed entity with metadata and a matching export archive.
        fn entity(&self, name: &str) -> PortalEntity {
            let normalized = name.to_lowercase();
            write_report_archive(&self.portal_dir, &normalized, &normalized, name);
            PortalEntity::new(name)
                .with_latest("2021", "100", "HS")
                .with_artifact(PathBuf::from(format!("{}_TL.zip", normalized)))
        }

        fn orchestrator(&self, entities: Vec<PortalEntity>) -> Orchestrator<'_, ReplaySession> {
            let session = ReplaySession::new(PortalDescription { entities }, self.portal_dir.clone());
            Orchestrator::new(&self.config, session).with_fixed_date(date())
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn q(entity: &str) -> QueryRecord {
        QueryRecord::new(entity, "2021", "100", "HS")
    }

    fn names(entities: &[&str]) -> Vec<String> {
        entities.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_discovery_queues_stale_and_logs_failures() {
        let fixture = Fixture::new();
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR"), PortalEntity::new("CL")]);

        let report = orch.discover(&names(&["BR", "CL"])).unwrap();

        assert_eq!(report.checked, 2);
        assert_eq!(report.queued, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(orch.queue().load().unwrap(), vec![q("BR")]);

        let errors = orch.error_log().entries().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entity_id, "CL");
        assert_eq!(errors[0].error_date, date());
    }

    /// Replays the portal but times out the metadata lookup for one entity.
    struct TimeoutOnLookup {
        inner: ReplaySession,
        failing: &'static str,
    }

    impl BrowserSession for TimeoutOnLookup {
        fn list_entities(&mut self) -> SessionResult<Vec<String>> {
            self.inner.list_entities()
        }

        fn fetch_latest_query_info(&mut self, entity: &str) -> SessionResult<Option<QueryRecord>> {
            if entity == self.failing {
                return Err(SessionError::Timeout(format!("metadata for {}", entity)));
            }
            self.inner.fetch_latest_query_info(entity)
        }

        fn select_entity(&mut self, entity: &str) -> SessionResult<()> {
            self.inner.select_entity(entity)
        }

        fn configure_export(&mut self, record: &QueryRecord, request: &ExportRequest) -> SessionResult<()> {
            self.inner.configure_export(record, request)
        }

        fn submit_export(&mut self) -> SessionResult<()> {
            self.inner.submit_export()
        }

        fn poll_ready(&mut self) -> SessionResult<bool> {
            self.inner.poll_ready()
        }

        fn download_artifact(&mut self, dest_dir: &Path) -> SessionResult<PathBuf> {
            self.inner.download_artifact(dest_dir)
        }

        fn delete_generated_artifact(&mut self) -> SessionResult<()> {
            self.inner.delete_generated_artifact()
        }
    }

    #[test]
    fn test_lookup_error_is_logged_and_discovery_continues() {
        let fixture = Fixture::new();
        let portal = PortalDescription {
            entities: vec![fixture.entity("BR"), fixture.entity("CL"), fixture.entity("PE")],
        };
        let session = TimeoutOnLookup {
            inner: ReplaySession::new(portal, fixture.portal_dir.clone()),
            failing: "CL",
        };
        let mut orch = Orchestrator::new(&fixture.config, session).with_fixed_date(date());

        let report = orch.discover(&names(&["BR", "CL", "PE"])).unwrap();

        assert_eq!(report.checked, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.queued, 2);
        assert_eq!(orch.queue().load().unwrap(), vec![q("BR"), q("PE")]);

        let errors = orch.error_log().entries().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entity_id, "CL");
        assert_eq!(errors[0].error_date, date());
    }

    #[test]
    fn test_discovery_skips_fresh_entities() {
        let fixture = Fixture::new();
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR"), fixture.entity("PE")]);
        orch.freshness().record_success(&q("BR"), date()).unwrap();
        orch.freshness()
            .record_success(&QueryRecord::new("PE", "2020", "100", "HS"), date())
            .unwrap();

        let report = orch.discover(&names(&["BR", "PE", "PE"])).unwrap();

        assert_eq!(report.already_fresh, 1);
        assert_eq!(report.queued, 1);
        assert_eq!(report.already_queued, 1);
        assert_eq!(orch.queue().load().unwrap(), vec![q("PE")]);
    }

    #[test]
    fn test_drain_success_commits() {
        let fixture = Fixture::new();
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR")]);
        orch.queue().enqueue(&q("BR")).unwrap();

        let report = orch.drain().unwrap();

        assert_eq!(report.completed, 1);
        assert!(orch.queue().is_empty().unwrap());
        let entry = orch.freshness().entry_for("BR").unwrap().unwrap();
        assert_eq!(entry.record, q("BR"));
        assert_eq!(entry.completed_on, date());
    }

    #[test]
    fn test_drain_integrity_failure_keeps_query() {
        let fixture = Fixture::new();
        write_report_archive(&fixture.portal_dir, "br", "br", "AR");
        let entity = PortalEntity::new("BR")
            .with_latest("2021", "100", "HS")
            .with_artifact(PathBuf::from("br_TL.zip"));
        let mut orch = fixture.orchestrator(vec![entity]);
        orch.queue().enqueue(&q("BR")).unwrap();

        let report = orch.drain().unwrap();

        assert_eq!(report.left_pending, 1);
        assert_eq!(report.failures[0].severity, Severity::Recoverable);
        assert!(orch.queue().contains(&q("BR")).unwrap());
        assert!(orch.freshness().entry_for("BR").unwrap().is_none());
    }

    #[test]
    fn test_drain_drops_terminal_failures() {
        let fixture = Fixture::new();
        let mut unsupported = fixture.entity("CL");
        unsupported.unsupported = true;
        let mut orch = fixture.orchestrator(vec![unsupported]);
        orch.queue().enqueue(&q("CL")).unwrap();
        orch.queue().enqueue(&q("XX")).unwrap();

        let report = orch.drain().unwrap();

        assert_eq!(report.dropped, 2);
        assert!(orch.queue().is_empty().unwrap());
        assert!(orch.freshness().entries().unwrap().is_empty());
    }

    #[test]
    fn test_stuck_query_does_not_block_the_rest() {
        let fixture = Fixture::new();
        let mut slow = fixture.entity("BR");
        slow.polls_until_ready = 10;
        let mut orch = fixture.orchestrator(vec![slow, fixture.entity("CL")]);
        orch.queue().enqueue(&q("BR")).unwrap();
        orch.queue().enqueue(&q("CL")).unwrap();

        let report = orch.drain().unwrap();

        assert_eq!(report.completed, 1);
        assert_eq!(report.left_pending, 1);
        assert_eq!(orch.queue().load().unwrap(), vec![q("BR")]);
        assert!(orch.freshness().entry_for("CL").unwrap().is_some());
    }

    #[test]
    fn test_run_once_discovers_listed_entities_then_drains() {
        let fixture = Fixture::new();
        let mut hidden = fixture.entity("PE");
        hidden.listed = false;
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR"), hidden]);

        let report = orch.run_once().unwrap();

        assert!(report.resumed.is_none());
        assert_eq!(report.discovery.as_ref().unwrap().checked, 1);
        assert_eq!(report.drain.completed, 1);
        assert!(orch.queue().is_empty().unwrap());

        // Nothing changed on the portal, so a second run has nothing to do
        let again = orch.run_once().unwrap();
        assert_eq!(again.discovery.unwrap().already_fresh, 1);
        assert_eq!(again.drain.attempted(), 0);
    }

    #[test]
    fn test_run_resuming_drains_backlog_first() {
        let fixture = Fixture::new();
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR"), fixture.entity("CL")]);
        orch.queue().enqueue(&q("CL")).unwrap();

        let report = orch.run_resuming().unwrap();

        assert_eq!(report.resumed.as_ref().unwrap().completed, 1);
        assert_eq!(report.discovery.as_ref().unwrap().queued, 1);
        assert_eq!(report.total_completed(), 2);
    }

    #[test]
    fn test_corrupt_queue_aborts_the_pass() {
        let fixture = Fixture::new();
        let mut orch = fixture.orchestrator(vec![fixture.entity("BR")]);
        let path = orch.queue().path().to_path_buf();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            orch.drain(),
            Err(RunError::Store(StoreError::CorruptQueue { .. }))
        ));
        assert!(matches!(orch.discover(&names(&["BR"])), Err(RunError::Store(_))));
    }

    struct RecordingObserver<'r> {
        events: &'r RefCell<Vec<String>>,
    }

    impl PassObserver for RecordingObserver<'_> {
        fn begin(&self, pass: Pass, total: usize) {
            self.events.borrow_mut().push(format!("begin {} {}", pass, total));
        }

        fn advance(&self, item: &str) {
            self.events.borrow_mut().push(item.to_string());
        }

        fn finish(&self, _summary: &str) {
            self.events.borrow_mut().push("finish".to_string());
        }
    }

    #[test]
    fn test_observer_sees_each_item() {
        let fixture = Fixture::new();
        let events = RefCell::new(Vec::new());
        let mut orch = fixture
            .orchestrator(vec![fixture.entity("BR")])
            .with_observer(Box::new(RecordingObserver { events: &events }));

        orch.discover(&names(&["BR"])).unwrap();
        drop(orch);

        assert_eq!(*events.borrow(), vec!["begin Discovery 1", "BR", "finish"]);
    }
}

//! Staging coordinator behavior against an in-memory staging service.

use release_steward::config::{ReleaseTarget, StagingConfig};
use release_steward::error::{ConfigError, PublishError, ReleaseError, Result, StagingError};
use release_steward::staging::{Sleeper, StagingCoordinator, StagingService};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    List(String),
    Sleep(Duration),
    Upload(String),
    Release(String),
}

/// Staging service returning scripted repository counts
#[derive(Default)]
struct FakeStagingService {
    counts: Mutex<VecDeque<usize>>,
    events: Mutex<Vec<Event>>,
    fail_release: bool,
}

impl FakeStagingService {
    fn with_counts(counts: &[usize]) -> Self {
        Self {
            counts: Mutex::new(counts.iter().copied().collect()),
            ..Self::default()
        }
    }

    fn failing_release(counts: &[usize]) -> Self {
        Self {
            fail_release: true,
            ..Self::with_counts(counts)
        }
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl StagingService for FakeStagingService {
    async fn list_staging_repositories(&self, profile: &str) -> Result<usize> {
        self.record(Event::List(profile.to_string()));
        Ok(self.counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn release_sole_staging_repository(&self, profile: &str) -> Result<()> {
        self.record(Event::Release(profile.to_string()));
        if self.fail_release {
            return Err(StagingError::CloseFailed {
                repository: "orgacme-1001".to_string(),
                state: "open".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Records sleeps into the service's event log instead of waiting
struct RecordingSleeper<'a>(&'a FakeStagingService);

impl Sleeper for RecordingSleeper<'_> {
    async fn sleep(&self, duration: Duration) {
        self.0.record(Event::Sleep(duration));
    }
}

fn staging_config() -> StagingConfig {
    StagingConfig {
        profile: Some("org.acme".to_string()),
        username: Some("deployer".to_string()),
        password: Some("s3cret".to_string()),
        poll_interval: Duration::from_millis(250),
        ..StagingConfig::default()
    }
}

fn release_target() -> ReleaseTarget {
    ReleaseTarget::new(
        "https://repo.example/releases",
        Some("ci".to_string()),
        Some("ci-pass".to_string()),
    )
}

#[tokio::test]
async fn test_waits_until_slot_is_free() {
    let service = FakeStagingService::with_counts(&[1, 1, 0]);
    let config = staging_config();
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));

    let waits = coordinator.wait_for_free_slot("org.acme").await.unwrap();

    assert_eq!(waits, 2);
    let poll = Duration::from_millis(250);
    assert_eq!(
        service.events(),
        vec![
            Event::List("org.acme".to_string()),
            Event::Sleep(poll),
            Event::List("org.acme".to_string()),
            Event::Sleep(poll),
            Event::List("org.acme".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_upload_sees_staging_target_then_original_is_restored() {
    let service = FakeStagingService::with_counts(&[1, 0]);
    let config = staging_config();
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));
    let mut target = release_target();
    let log = &service;

    let seen = coordinator
        .release(&mut target, move |staged| async move {
            log.record(Event::Upload(staged.url.clone()));
            Ok::<_, ReleaseError>(staged)
        })
        .await
        .unwrap();

    assert_eq!(seen.url, config.staging_url.as_str());
    assert_eq!(seen.username.as_deref(), Some("deployer"));
    assert_eq!(seen.password.as_deref(), Some("s3cret"));
    assert_eq!(target, release_target());

    let events = service.events();
    assert_eq!(events.len(), 5);
    assert!(matches!(events[1], Event::Sleep(_)));
    assert_eq!(events[3], Event::Upload(config.staging_url.to_string()));
    assert_eq!(events[4], Event::Release("org.acme".to_string()));
}

#[tokio::test]
async fn test_target_restored_after_upload_failure() {
    let service = FakeStagingService::with_counts(&[0]);
    let config = staging_config();
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));
    let mut target = release_target();

    let err = coordinator
        .release(&mut target, |_staged| async {
            Err::<(), _>(ReleaseError::from(PublishError::Rejected {
                location: "https://staging.example/x.jar".to_string(),
                status: 400,
            }))
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::Publish(PublishError::Rejected { status: 400, .. })));
    assert_eq!(target, release_target());
    assert!(
        !service
            .events()
            .iter()
            .any(|e| matches!(e, Event::Release(_))),
        "nothing is released when the upload fails"
    );
}

#[tokio::test]
async fn test_target_restored_after_finalize_failure() {
    let service = FakeStagingService::failing_release(&[0]);
    let config = staging_config();
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));
    let mut target = release_target();

    let err = coordinator
        .release(&mut target, |_staged| async { Ok::<_, ReleaseError>(()) })
        .await
        .unwrap_err();

    assert!(matches!(err, ReleaseError::Staging(StagingError::CloseFailed { .. })));
    assert_eq!(target, release_target());
}

#[tokio::test]
async fn test_target_restored_when_release_is_cancelled() {
    let service = FakeStagingService::with_counts(&[0]);
    let config = staging_config();
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));
    let mut target = release_target();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        coordinator.release(&mut target, |_staged| {
            std::future::pending::<std::result::Result<(), ReleaseError>>()
        }),
    )
    .await;

    assert!(outcome.is_err(), "upload never completes");
    assert_eq!(target, release_target());
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_remote_call() {
    let service = FakeStagingService::with_counts(&[0]);
    let config = StagingConfig {
        password: None,
        ..staging_config()
    };
    let coordinator = StagingCoordinator::with_sleeper(&service, &config, RecordingSleeper(&service));
    let mut target = release_target();

    let err = coordinator
        .release(&mut target, |_staged| async { Ok::<_, ReleaseError>(()) })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReleaseError::Config(ConfigError::MissingValue { ref name, .. }) if name == "staging password"
    ));
    assert!(service.events().is_empty());
    assert_eq!(target, release_target());
}

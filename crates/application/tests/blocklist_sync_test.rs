mod helpers;

use dnstrap_application::ports::DomainFilterPort;
use dnstrap_application::use_cases::{BlocklistCommand, SyncBlocklistUseCase, UpdateBlocklistUseCase};
use dnstrap_domain::{BlocklistRules, DomainError};
use helpers::{MockBlocklistSource, MockDomainFilter};
use std::sync::Arc;
use tokio::sync::mpsc;

fn rules() -> BlocklistRules {
    BlocklistRules {
        blocked: vec!["ads.example.com".into(), "tracker.example.net".into()],
        wildcards: vec!["*.telemetry.example.org".into()],
        allowed: vec!["cdn.example.com".into()],
    }
}

#[tokio::test]
async fn test_sync_publishes_blocked_wildcards_and_allows() {
    let filter = Arc::new(MockDomainFilter::new());
    let source = Arc::new(MockBlocklistSource::with_rules(rules()));
    let use_case = SyncBlocklistUseCase::new(source, filter.clone());

    let total = use_case.execute().await.unwrap();

    assert_eq!(total, 4);
    assert_eq!(filter.bulk_updates(), 1);
    assert!(filter.blocked().contains("ads.example.com"));
    assert!(filter.wildcards().contains("*.telemetry.example.org"));
    assert!(filter.allowed().contains("cdn.example.com"));
}

#[tokio::test]
async fn test_resync_drops_stale_allows_and_keeps_live_ones() {
    let filter = Arc::new(MockDomainFilter::new());
    let source = Arc::new(MockBlocklistSource::with_rules(rules()));
    let use_case = SyncBlocklistUseCase::new(source.clone(), filter.clone());
    use_case.execute().await.unwrap();
    filter.allow_domain("ads.example.com");

    source.set_rules(BlocklistRules {
        blocked: vec!["ads.example.com".into(), "cdn.example.com".into()],
        wildcards: vec![],
        allowed: vec![],
    });
    use_case.execute().await.unwrap();

    assert_eq!(filter.bulk_updates(), 2);
    assert!(filter.is_blocked("cdn.example.com"));
    assert!(!filter.is_blocked("ads.example.com"));
    assert!(!filter.allowed().contains("cdn.example.com"));
}

#[tokio::test]
async fn test_sync_failure_leaves_filter_untouched() {
    let filter = Arc::new(MockDomainFilter::new());
    filter.add_domain("kept.example.com");
    let source = Arc::new(MockBlocklistSource::failing(DomainError::IoError(
        "rule store offline".into(),
    )));
    let use_case = SyncBlocklistUseCase::new(source, filter.clone());

    let result = use_case.execute().await;

    assert!(matches!(result, Err(DomainError::IoError(_))));
    assert_eq!(filter.bulk_updates(), 0);
    assert!(filter.is_blocked("kept.example.com"));
}

#[tokio::test]
async fn test_commands_apply_live_edits() {
    let filter = Arc::new(MockDomainFilter::new());
    let use_case = UpdateBlocklistUseCase::new(filter.clone());

    use_case.execute(BlocklistCommand::Add("a.example.com".into()));
    use_case.execute(BlocklistCommand::Add("b.example.com".into()));
    use_case.execute(BlocklistCommand::Remove("a.example.com".into()));
    use_case.execute(BlocklistCommand::Allow("b.example.com".into()));

    assert!(!filter.is_blocked("a.example.com"));
    assert!(!filter.is_blocked("b.example.com"));

    use_case.execute(BlocklistCommand::Disallow("b.example.com".into()));
    assert!(filter.is_blocked("b.example.com"));
}

#[tokio::test]
async fn test_listener_drains_channel_until_closed() {
    let filter = Arc::new(MockDomainFilter::new());
    let use_case = UpdateBlocklistUseCase::new(filter.clone());
    let (tx, rx) = mpsc::channel(8);

    let handle = tokio::spawn(use_case.listen(rx));

    tx.send(BlocklistCommand::AddWildcard("*.ads.example.com".into()))
        .await
        .unwrap();
    tx.send(BlocklistCommand::Bulk {
        domains: vec!["x.example.com".into()],
        wildcards: vec![],
    })
    .await
    .unwrap();
    drop(tx);

    handle.await.unwrap();

    assert_eq!(filter.bulk_updates(), 1);
    assert!(filter.is_blocked("x.example.com"));
    assert!(filter.wildcards().is_empty());
}

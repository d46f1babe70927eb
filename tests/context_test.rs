use async_trait::async_trait;
use pipecraft::api::directory::{Account, CurrentContext, Enterprise};
use pipecraft::context::{ContextCache, ContextEvent, ContextSource};
use pipecraft::error::NetworkError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
struct FakeDirectory {
    fetches: AtomicUsize,
    offline: AtomicBool,
}

fn acme() -> CurrentContext {
    CurrentContext {
        account_id: "acc-1".to_string(),
        account_name: "Acme".to_string(),
        enterprise_id: "ent-1".to_string(),
        enterprise_name: "Acme Retail".to_string(),
    }
}

impl FakeDirectory {
    fn check(&self) -> Result<(), NetworkError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(NetworkError::api(502, "bad gateway"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContextSource for FakeDirectory {
    async fn fetch_context(&self) -> Result<Option<CurrentContext>, NetworkError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(Some(acme()))
    }

    async fn store_context(&self, _context: &CurrentContext) -> Result<(), NetworkError> {
        self.check()
    }

    async fn accounts(&self) -> Result<Vec<Account>, NetworkError> {
        self.check()?;
        Ok(vec![Account { id: "acc-1".to_string(), name: "Acme".to_string() }])
    }

    async fn enterprises(&self) -> Result<Vec<Enterprise>, NetworkError> {
        self.check()?;
        Ok(vec![Enterprise { id: "ent-1".to_string(), name: "Acme Retail".to_string() }])
    }

    async fn entities(&self, enterprise_id: &str) -> Result<Vec<String>, NetworkError> {
        self.check()?;
        Ok(vec![format!("{}-payments", enterprise_id)])
    }
}

#[tokio::test]
async fn test_context_fetched_once_and_cached() {
    let source = Arc::new(FakeDirectory::default());
    let cache = ContextCache::new(source.clone());

    assert_eq!(cache.get().await, Some(acme()));
    assert_eq!(cache.get().await, Some(acme()));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

    cache.invalidate().await;
    cache.get().await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_retried() {
    let source = Arc::new(FakeDirectory::default());
    source.offline.store(true, Ordering::SeqCst);
    let cache = ContextCache::new(source.clone());

    assert_eq!(cache.get().await, None);
    source.offline.store(false, Ordering::SeqCst);
    assert_eq!(cache.get().await, Some(acme()));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_set_broadcasts_even_when_persist_fails() {
    let source = Arc::new(FakeDirectory::default());
    source.offline.store(true, Ordering::SeqCst);
    let cache = ContextCache::new(source.clone());
    let mut header = cache.subscribe();
    let mut breadcrumb = cache.subscribe();

    let mut selection = acme();
    selection.enterprise_id = "ent-2".to_string();
    cache.set(selection.clone()).await;

    assert_eq!(header.recv().await.unwrap(), ContextEvent::Changed(selection.clone()));
    assert_eq!(breadcrumb.recv().await.unwrap(), ContextEvent::Changed(selection.clone()));
    assert_eq!(cache.get().await, Some(selection));
    assert_eq!(source.fetches.load(Ordering::SeqCst), 0);

    cache.invalidate().await;
    assert_eq!(header.recv().await.unwrap(), ContextEvent::Invalidated);
}

#[tokio::test]
async fn test_directory_lists_degrade_to_empty() {
    let source = Arc::new(FakeDirectory::default());
    let cache = ContextCache::new(source.clone());

    assert_eq!(cache.accounts().await.len(), 1);
    assert_eq!(cache.entities("ent-1").await, vec!["ent-1-payments"]);

    source.offline.store(true, Ordering::SeqCst);
    assert!(cache.accounts().await.is_empty());
    assert!(cache.enterprises().await.is_empty());
    assert!(cache.entities("ent-1").await.is_empty());
}

/// Directory whose context fetch takes a while and returns a fixed account.
struct SlowDirectory;

fn with_account(account_id: &str) -> CurrentContext {
    CurrentContext {
        account_id: account_id.to_string(),
        ..acme()
    }
}

#[async_trait]
impl ContextSource for SlowDirectory {
    async fn fetch_context(&self) -> Result<Option<CurrentContext>, NetworkError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(Some(with_account("old")))
    }
    async fn store_context(&self, _context: &CurrentContext) -> Result<(), NetworkError> {
        Ok(())
    }
    async fn accounts(&self) -> Result<Vec<Account>, NetworkError> {
        Ok(Vec::new())
    }
    async fn enterprises(&self) -> Result<Vec<Enterprise>, NetworkError> {
        Ok(Vec::new())
    }
    async fn entities(&self, _enterprise_id: &str) -> Result<Vec<String>, NetworkError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_set_during_slow_fetch_wins() {
    let cache = Arc::new(ContextCache::new(Arc::new(SlowDirectory)));

    let pending = tokio::spawn({
        let cache = cache.clone();
        async move { cache.get().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.set(with_account("new")).await;
    pending.await.unwrap();

    assert_eq!(cache.get().await.map(|c| c.account_id), Some("new".to_string()));
}

#[tokio::test]
async fn test_invalidate_during_slow_fetch_is_not_overwritten() {
    let cache = Arc::new(ContextCache::new(Arc::new(SlowDirectory)));
    let mut events = cache.subscribe();

    let pending = tokio::spawn({
        let cache = cache.clone();
        async move { cache.get().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    cache.invalidate().await;
    assert_eq!(pending.await.unwrap().map(|c| c.account_id), Some("old".to_string()));
    assert_eq!(events.recv().await.unwrap(), ContextEvent::Invalidated);

    cache.set(with_account("new")).await;
    assert_eq!(cache.get().await.map(|c| c.account_id), Some("new".to_string()));
}

#[tokio::test]
async fn test_changes_without_subscribers_still_apply() {
    let cache = ContextCache::new(Arc::new(FakeDirectory::default()));
    cache.set(with_account("solo")).await;
    assert_eq!(cache.get().await.map(|c| c.account_id), Some("solo".to_string()));
    cache.invalidate().await;
    assert_eq!(cache.get().await, Some(acme()));
}

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh node/edge/template ids.
///
/// Implementations must stay unique when called concurrently from several
/// tasks, since several drops can be in flight at once.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// `<prefix>-<uuid v4>`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }
}

/// `<prefix>-<session>-<n>` with a counter owned by one editing session.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    session: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Uses the first block of a random uuid as session tag.
    pub fn random_session() -> Self {
        let uuid = Uuid::new_v4().simple().to_string();
        Self::new(&uuid[..8])
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}-{}", prefix, self.session, n)
    }
}

//! Hot-swappable config value.
//!
//! The classifier tables live in a `ConfigStore<ClassifierConfig>` so a
//! SIGHUP reload can replace them while monitors keep polling. Each poll
//! takes a [`ConfigStore::snapshot`] up front and classifies the whole
//! timeline against it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A shared, versioned value.
pub struct ConfigStore<T> {
    inner: Arc<ConfigStoreInner<T>>,
}

struct ConfigStoreInner<T> {
    data: RwLock<Arc<T>>,
    version: AtomicU64,
}

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ConfigStoreInner {
                data: RwLock::new(Arc::new(initial)),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the stored value. Snapshots taken earlier keep the old one.
    pub async fn update(&self, value: T) {
        let mut guard = self.inner.data.write().await;
        *guard = Arc::new(value);
        self.inner.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value, detached from the lock.
    pub async fn snapshot(&self) -> Arc<T> {
        Arc::clone(&*self.inner.data.read().await)
    }

    /// Number of updates applied since creation.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Relaxed)
    }
}

impl<T: Default> Default for ConfigStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use kickfeed_sdk::objects::{MatchEventType, Period};

    #[tokio::test]
    async fn test_snapshot_survives_update() {
        let store = ConfigStore::new(ClassifierConfig::default());
        let handle = store.clone();
        let before = store.snapshot().await;

        handle
            .update(ClassifierConfig::with_overrides([26], None, Default::default()))
            .await;

        assert_eq!(store.version(), 1);
        assert!(!before.is_suppressed(MatchEventType::MatchEnd, Period::SecondHalf));
        assert!(
            store
                .snapshot()
                .await
                .is_suppressed(MatchEventType::MatchEnd, Period::SecondHalf)
        );
    }
}

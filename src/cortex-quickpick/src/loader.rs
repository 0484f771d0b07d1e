//! Memoized item loading.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::item::PickItem;
use crate::supply::ItemSupply;

type LoadFn<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<Vec<PickItem<T>>>> + Send + Sync>;

/// Wraps an async item loader and remembers its last successful batch.
///
/// [`QuickPickPrompter::refresh_items`](crate::QuickPickPrompter::refresh_items)
/// invalidates the memo before reloading.
pub struct CachedLoader<T> {
    load: LoadFn<T>,
    cached: Arc<Mutex<Option<Vec<PickItem<T>>>>>,
}

impl<T> Clone for CachedLoader<T> {
    fn clone(&self) -> Self {
        Self {
            load: Arc::clone(&self.load),
            cached: Arc::clone(&self.cached),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> CachedLoader<T> {
    pub fn new<F, Fut>(load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<PickItem<T>>>> + Send + 'static,
    {
        Self {
            load: Arc::new(move || load().boxed()),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.lock().is_some()
    }

    pub fn invalidate(&self) {
        self.cached.lock().take();
    }

    /// The memoized batch when present, otherwise a deferred load that fills the memo.
    pub fn supply(&self) -> ItemSupply<T> {
        if let Some(items) = self.cached.lock().as_ref() {
            return ItemSupply::Items(items.clone());
        }

        let load = Arc::clone(&self.load);
        let cached = Arc::clone(&self.cached);
        ItemSupply::deferred(async move {
            let items = load().await?;
            *cached.lock() = Some(items.clone());
            Ok(items)
        })
    }
}

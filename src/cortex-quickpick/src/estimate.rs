//! Step estimation for multi-step flows.
//!
//! When the picker is one step of a larger flow, each row can add further
//! steps once picked. The flow supplies a [`StepEstimator`]; results are
//! memoized per row in a [`StepEstimateCache`] keyed by the row's visible text.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::item::{PickItem, PickValue};

/// Predicts how many extra steps picking a value adds to the flow.
#[async_trait]
pub trait StepEstimator<T>: Send + Sync {
    async fn estimate(&self, value: &T) -> anyhow::Result<usize>;
}

struct FnEstimator<F>(F);

#[async_trait]
impl<T, F, Fut> StepEstimator<T> for FnEstimator<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<usize>> + Send,
{
    async fn estimate(&self, value: &T) -> anyhow::Result<usize> {
        (self.0)(value.clone()).await
    }
}

/// Wrap an async closure as an estimator.
pub fn estimator_fn<T, F, Fut>(f: F) -> Arc<dyn StepEstimator<T>>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<usize>> + Send + 'static,
{
    Arc::new(FnEstimator(f))
}

/// Cache key: the row's label, description and detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EstimateKey {
    pub label: String,
    pub description: Option<String>,
    pub detail: Option<String>,
}

impl EstimateKey {
    pub fn of<T>(item: &PickItem<T>) -> Self {
        Self {
            label: item.label.clone(),
            description: item.description.clone(),
            detail: item.detail.clone(),
        }
    }
}

/// Shared memo of step estimates. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct StepEstimateCache {
    entries: Arc<Mutex<HashMap<EstimateKey, usize>>>,
}

impl StepEstimateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &EstimateKey) -> Option<usize> {
        self.entries.lock().get(key).copied()
    }

    pub fn insert(&self, key: EstimateKey, steps: usize) {
        self.entries.lock().insert(key, steps);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Maps a resolved value the same way the flow maps its results.
pub type ResultTransform<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// Estimator, cache and optional result transform for one flow.
pub struct StepEstimates<T> {
    estimator: Arc<dyn StepEstimator<T>>,
    cache: StepEstimateCache,
    transform: Option<ResultTransform<T>>,
}

impl<T> Clone for StepEstimates<T> {
    fn clone(&self) -> Self {
        Self {
            estimator: Arc::clone(&self.estimator),
            cache: self.cache.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> StepEstimates<T> {
    pub fn new(estimator: Arc<dyn StepEstimator<T>>, cache: StepEstimateCache) -> Self {
        Self {
            estimator,
            cache,
            transform: None,
        }
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn cache(&self) -> &StepEstimateCache {
        &self.cache
    }

    /// Extra steps picking `item` would add.
    ///
    /// Rows that skip estimation or cannot be accepted count as 0 without
    /// consulting the estimator. Failures count as 0 and are not cached.
    pub async fn estimate(&self, item: &PickItem<T>) -> usize {
        if item.skip_estimate || item.invalid_selection {
            return 0;
        }

        let key = EstimateKey::of(item);
        if let Some(steps) = self.cache.get(&key) {
            return steps;
        }

        let value = match &item.value {
            PickValue::Immediate(value) => value.clone(),
            PickValue::Deferred(thunk) => match thunk().await {
                Ok(value) => value,
                Err(err) => {
                    debug!(label = %item.label, error = %err, "Deferred value failed during step estimation");
                    return 0;
                }
            },
            PickValue::CustomInput | PickValue::None => return 0,
        };
        let value = match &self.transform {
            Some(transform) => transform(value),
            None => value,
        };

        match self.estimator.estimate(&value).await {
            Ok(steps) => {
                self.cache.insert(key, steps);
                steps
            }
            Err(err) => {
                debug!(label = %item.label, error = %err, "Step estimator failed");
                0
            }
        }
    }

    /// Largest estimate over `items`; 0 when empty.
    pub async fn max_estimate(&self, items: &[PickItem<T>]) -> usize {
        let mut max = 0;
        for item in items {
            max = max.max(self.estimate(item).await);
        }
        max
    }
}

/// Where the picker sits in an enclosing flow.
pub struct StepContext<T> {
    pub step: usize,
    pub total_steps: usize,
    pub estimates: Option<StepEstimates<T>>,
}

impl<T> StepContext<T> {
    pub fn new(step: usize, total_steps: usize) -> Self {
        Self {
            step,
            total_steps,
            estimates: None,
        }
    }

    pub fn with_estimates(mut self, estimates: StepEstimates<T>) -> Self {
        self.estimates = Some(estimates);
        self
    }
}

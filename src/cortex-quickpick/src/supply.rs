//! Item supply normalization.
//!
//! Items reach the prompter as a ready list, a single deferred batch, or an
//! open-ended stream. [`normalize`] turns all three into one stream of
//! [`SupplyEvent`]s: zero or more appends, optionally ended by a single failure.
//! End of stream means the load completed.

use std::future::Future;

use async_stream::stream;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::{FutureExt, Stream, StreamExt};

use crate::item::PickItem;

/// One element yielded by an incremental supply.
pub enum SupplyChunk<T> {
    One(PickItem<T>),
    Batch(Vec<PickItem<T>>),
}

impl<T> SupplyChunk<T> {
    pub fn into_vec(self) -> Vec<PickItem<T>> {
        match self {
            SupplyChunk::One(item) => vec![item],
            SupplyChunk::Batch(items) => items,
        }
    }
}

impl<T> From<PickItem<T>> for SupplyChunk<T> {
    fn from(item: PickItem<T>) -> Self {
        SupplyChunk::One(item)
    }
}

impl<T> From<Vec<PickItem<T>>> for SupplyChunk<T> {
    fn from(items: Vec<PickItem<T>>) -> Self {
        SupplyChunk::Batch(items)
    }
}

/// Where a load's items come from.
pub enum ItemSupply<T> {
    /// Already resolved
    Items(Vec<PickItem<T>>),
    /// One batch, available once the future resolves
    Deferred(BoxFuture<'static, anyhow::Result<Vec<PickItem<T>>>>),
    /// Pulled element by element until exhausted or abandoned
    Stream(BoxStream<'static, anyhow::Result<SupplyChunk<T>>>),
}

impl<T> ItemSupply<T> {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Vec<PickItem<T>>>> + Send + 'static,
    {
        ItemSupply::Deferred(future.boxed())
    }

    pub fn stream<S>(stream: S) -> Self
    where
        S: Stream<Item = anyhow::Result<SupplyChunk<T>>> + Send + 'static,
    {
        ItemSupply::Stream(stream.boxed())
    }

    /// Whether items arrive asynchronously.
    pub fn is_async(&self) -> bool {
        !matches!(self, ItemSupply::Items(_))
    }

    pub fn mode(&self) -> &'static str {
        match self {
            ItemSupply::Items(_) => "items",
            ItemSupply::Deferred(_) => "deferred",
            ItemSupply::Stream(_) => "stream",
        }
    }
}

impl<T> From<Vec<PickItem<T>>> for ItemSupply<T> {
    fn from(items: Vec<PickItem<T>>) -> Self {
        ItemSupply::Items(items)
    }
}

/// Normalized load progress.
pub enum SupplyEvent<T> {
    Append(Vec<PickItem<T>>),
    Failed(anyhow::Error),
}

/// Convert any supply mode into a stream of appends, ended by at most one failure.
///
/// The returned stream pulls from an incremental supply only when polled, so
/// dropping it abandons the remaining elements.
pub fn normalize<T: Send + 'static>(supply: ItemSupply<T>) -> BoxStream<'static, SupplyEvent<T>> {
    match supply {
        ItemSupply::Items(items) => {
            futures::stream::once(async move { SupplyEvent::Append(items) }).boxed()
        }
        ItemSupply::Deferred(batch) => futures::stream::once(async move {
            match batch.await {
                Ok(items) => SupplyEvent::Append(items),
                Err(err) => SupplyEvent::Failed(err),
            }
        })
        .boxed(),
        ItemSupply::Stream(mut chunks) => stream! {
            while let Some(next) = chunks.next().await {
                match next {
                    Ok(chunk) => yield SupplyEvent::Append(chunk.into_vec()),
                    Err(err) => {
                        yield SupplyEvent::Failed(err);
                        break;
                    }
                }
            }
        }
        .boxed(),
    }
}

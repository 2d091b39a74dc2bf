// SPDX-License-Identifier: GPL-3.0-only

//! Deferred work returned from `update`
//!
//! A task is a batch of futures; each resolves to a message that is fed back
//! into the model. The terminal runtime spawns them on tokio, tests can
//! simply await them with [`Task::collect`].

use futures::future::{BoxFuture, FutureExt, join_all};
use std::future::Future;

#[must_use = "tasks do nothing unless they are run"]
pub struct Task<M> {
    futures: Vec<BoxFuture<'static, M>>,
}

impl<M: Send + 'static> Task<M> {
    /// A task that does nothing
    pub fn none() -> Self {
        Self {
            futures: Vec::new(),
        }
    }

    /// Run a future and map its output to a message
    pub fn perform<T, F>(future: F, map: impl FnOnce(T) -> M + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            futures: vec![future.map(map).boxed()],
        }
    }

    pub fn is_none(&self) -> bool {
        self.futures.is_empty()
    }

    /// Take the futures out for spawning
    pub fn into_futures(self) -> Vec<BoxFuture<'static, M>> {
        self.futures
    }

    /// Wait for every future and return the messages in order
    pub async fn collect(self) -> Vec<M> {
        join_all(self.futures).await
    }
}

impl<M> std::fmt::Debug for Task<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("futures", &self.futures.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_perform_maps_output() {
        let task = Task::perform(async { 2 }, |n| n * 10);
        assert!(!task.is_none());
        assert_eq!(task.collect().await, vec![20]);
    }

    #[tokio::test]
    async fn test_none_collects_nothing() {
        let task: Task<u8> = Task::none();
        assert!(task.is_none());
        assert!(task.collect().await.is_empty());
    }
}

//! The pending-battle FIFO shared by the movement and battle workers.
//!
//! The queue has its own lock, independent of the registry lock. Callers
//! never hold both: the movement scan collects tasks under the registry
//! read lock, releases it, and only then pushes the batch here.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use skirmish_types::AgentId;
use tokio::sync::Mutex;

/// An attacker/target pair awaiting dice resolution.
///
/// Holds ids only; the battle worker looks both agents up again and
/// re-checks liveness before acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BattleTask {
    /// The agent that attacks.
    pub attacker: AgentId,
    /// The agent being attacked.
    pub target: AgentId,
}

/// Concurrent FIFO of [`BattleTask`]s.
///
/// Closing the queue tells the consumer that no further tasks will arrive,
/// so it may exit once the queue is empty. Pushes after close are still
/// accepted and still drained.
#[derive(Debug, Default)]
pub struct BattleQueue {
    pending: Mutex<VecDeque<BattleTask>>,
    total_enqueued: AtomicU64,
    closed: AtomicBool,
}

impl BattleQueue {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of tasks under a single lock acquisition.
    pub async fn push_batch(&self, tasks: Vec<BattleTask>) {
        if tasks.is_empty() {
            return;
        }
        let count = u64::try_from(tasks.len()).unwrap_or(u64::MAX);
        self.pending.lock().await.extend(tasks);
        self.total_enqueued.fetch_add(count, Ordering::AcqRel);
    }

    /// Remove and return the oldest task, if any.
    pub async fn pop(&self) -> Option<BattleTask> {
        self.pending.lock().await.pop_front()
    }

    /// Number of tasks waiting.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Whether no tasks are waiting.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Tasks ever pushed onto this queue.
    pub fn total_enqueued(&self) -> u64 {
        self.total_enqueued.load(Ordering::Acquire)
    }

    /// Mark the producer side finished.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> BattleTask {
        BattleTask {
            attacker: AgentId::new(),
            target: AgentId::new(),
        }
    }

    #[tokio::test]
    async fn pops_in_fifo_order() {
        let queue = BattleQueue::new();
        let (first, second, third) = (task(), task(), task());
        queue.push_batch(vec![first]).await;
        queue.push_batch(vec![second, third]).await;

        assert_eq!(queue.len().await, 3);
        assert_eq!(queue.pop().await, Some(first));
        assert_eq!(queue.pop().await, Some(second));
        assert_eq!(queue.pop().await, Some(third));
        assert_eq!(queue.pop().await, None);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn total_counts_every_push() {
        let queue = BattleQueue::new();
        queue.push_batch(vec![task(), task()]).await;
        queue.push_batch(Vec::new()).await;
        queue.push_batch(vec![task()]).await;
        let _ = queue.pop().await;
        assert_eq!(queue.total_enqueued(), 3);
    }

    #[tokio::test]
    async fn close_keeps_pending_tasks() {
        let queue = BattleQueue::new();
        queue.push_batch(vec![task()]).await;
        assert!(!queue.is_closed());
        queue.close();
        assert!(queue.is_closed());
        assert!(queue.pop().await.is_some());
    }
}

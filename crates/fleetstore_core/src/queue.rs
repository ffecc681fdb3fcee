//! Concurrent FIFO queue of pending mutations.

use crate::message::Mutation;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// An unbounded FIFO of pending mutation messages.
///
/// Safe for any number of concurrent producers; the flush path is the
/// single consumer. Messages come out in exactly the order they went in.
///
/// Draining is not a snapshot: a consumer loops on [`pop`] until it
/// returns `None`, and pushes that land during the loop are picked up in
/// the same pass or the next, depending on interleaving.
///
/// [`pop`]: MutationQueue::pop
#[derive(Debug, Default)]
pub struct MutationQueue {
    inner: Mutex<VecDeque<Mutation>>,
}

impl MutationQueue {
    /// Creates a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mutation at the tail. Always succeeds.
    pub fn push(&self, mutation: Mutation) {
        self.inner.lock().push_back(mutation);
    }

    /// Removes and returns the head, or `None` when the queue is empty.
    #[must_use]
    pub fn pop(&self) -> Option<Mutation> {
        self.inner.lock().pop_front()
    }

    /// Returns true when no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Category;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn new_queue_is_empty() {
        let queue = MutationQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pop_is_fifo() {
        let queue = MutationQueue::new();
        queue.push(Mutation::upsert(Category::Config, "first"));
        queue.push(Mutation::delete(Category::Config, "first"));
        queue.push(Mutation::upsert(Category::Machine, "second"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Mutation::upsert(Category::Config, "first")));
        assert_eq!(queue.pop(), Some(Mutation::delete(Category::Config, "first")));
        assert_eq!(
            queue.pop(),
            Some(Mutation::upsert(Category::Machine, "second"))
        );
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn concurrent_pushers_lose_nothing() {
        let queue = Arc::new(MutationQueue::new());
        let producers = 8;
        let per_producer = 100;

        let handles: Vec<_> = (0..producers)
            .map(|p| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..per_producer {
                        queue.push(Mutation::upsert(
                            Category::Machine,
                            format!("host-{p}-{i}"),
                        ));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), producers * per_producer);

        let mut ids = std::collections::HashSet::new();
        while let Some(mutation) = queue.pop() {
            assert!(ids.insert(mutation.id));
        }
        assert_eq!(ids.len(), producers * per_producer);
    }

    #[test]
    fn per_producer_order_is_preserved() {
        let queue = Arc::new(MutationQueue::new());
        {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..50 {
                    queue.push(Mutation::upsert(Category::Config, format!("cfg-{i}")));
                }
            })
            .join()
            .unwrap();
        }

        let mut last = None;
        while let Some(mutation) = queue.pop() {
            let n: u32 = mutation.id.strip_prefix("cfg-").unwrap().parse().unwrap();
            if let Some(prev) = last {
                assert!(n > prev);
            }
            last = Some(n);
        }
    }
}

//! The wallet action queue: a single worker thread serializes every signed
//! block construction (`send`/`receive`/`change`) and work precache request
//! so at most one wallet-store write transaction is open at a time.
//!
//! Entries are ordered by priority (descending), then by insertion order.
//! Representative changes jump the queue; receives are weighted by amount
//! so a large incoming payment isn't stuck behind a pile of dust; work
//! precaching runs at the lowest priority, opportunistically.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use bln_types::Account;

/// Relative ordering of a queued action. Higher values run first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u64);

impl Priority {
    /// Representative changes: always serviced before anything else queued.
    pub fn high_priority() -> Self {
        Priority(u64::MAX)
    }

    /// Receives: larger incoming amounts are serviced first.
    pub fn amount(raw: u128) -> Self {
        Priority(raw.min(u64::MAX as u128 - 1) as u64)
    }

    /// Work precaching: fills idle time, never ahead of real wallet actions.
    pub fn generate_priority() -> Self {
        Priority(0)
    }
}

type Action = Box<dyn FnOnce() + Send>;

struct QueuedAction {
    priority: Priority,
    sequence: u64,
    wallet: Account,
    action: Action,
}

impl PartialEq for QueuedAction {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for QueuedAction {}

impl Ord for QueuedAction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct State {
    heap: BinaryHeap<QueuedAction>,
    next_sequence: u64,
}

/// Shared handle to the wallet action queue. Cheap to clone; producers
/// (`Wallet::send`/`receive`/`change`) push from any thread, the single
/// worker thread spawned by [`ActionQueue::spawn_worker`] drains it.
#[derive(Clone)]
pub struct ActionQueue {
    state: Arc<Mutex<State>>,
    condvar: Arc<Condvar>,
    stopped: Arc<AtomicBool>,
    /// Observable signal: true while the worker is executing an action.
    busy: Arc<AtomicBool>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                heap: BinaryHeap::new(),
                next_sequence: 0,
            })),
            condvar: Arc::new(Condvar::new()),
            stopped: Arc::new(AtomicBool::new(false)),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue an action for `wallet` at the given priority.
    pub fn push(&self, priority: Priority, wallet: Account, action: impl FnOnce() + Send + 'static) {
        let mut state = self.state.lock().expect("action queue mutex poisoned");
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.heap.push(QueuedAction {
            priority,
            sequence,
            wallet,
            action: Box::new(action),
        });
        drop(state);
        self.condvar.notify_one();
    }

    /// Whether the worker is currently executing an action.
    pub fn is_busy(&self) -> bool {
        self.busy.load(AtomicOrdering::Acquire)
    }

    /// Spawn the dedicated worker thread (spec §5 "wallet actions": a
    /// single worker thread per process, draining the priority queue).
    pub fn spawn_worker(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let condvar = Arc::clone(&self.condvar);
        let stopped = Arc::clone(&self.stopped);
        let busy = Arc::clone(&self.busy);

        std::thread::Builder::new()
            .name("wallet-actions".into())
            .spawn(move || loop {
                let mut guard = state.lock().expect("action queue mutex poisoned");
                loop {
                    if stopped.load(AtomicOrdering::Acquire) {
                        return;
                    }
                    if let Some(next) = guard.heap.pop() {
                        drop(guard);
                        busy.store(true, AtomicOrdering::Release);
                        let _ = next.wallet; // observability only; action owns its own context
                        (next.action)();
                        busy.store(false, AtomicOrdering::Release);
                        break;
                    }
                    guard = condvar.wait(guard).expect("action queue mutex poisoned");
                }
            })
            .expect("failed to spawn wallet-actions thread")
    }

    /// Signal the worker to stop after draining any in-flight action, then
    /// wake it so it observes the flag promptly.
    pub fn stop(&self) {
        self.stopped.store(true, AtomicOrdering::Release);
        self.condvar.notify_all();
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn account(suffix: &str) -> Account {
        Account::new(format!("bln_{suffix}"))
    }

    #[test]
    fn higher_priority_runs_first() {
        let queue = ActionQueue::new();
        let (tx, rx) = mpsc::channel();

        let tx1 = tx.clone();
        queue.push(Priority::generate_priority(), account("a"), move || {
            tx1.send(1).unwrap();
        });
        let tx2 = tx.clone();
        queue.push(Priority::high_priority(), account("b"), move || {
            tx2.send(2).unwrap();
        });

        let handle = queue.spawn_worker();
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, 2);
        assert_eq!(second, 1);

        queue.stop();
        handle.join().unwrap();
    }

    #[test]
    fn equal_priority_is_fifo() {
        let queue = ActionQueue::new();
        let (tx, rx) = mpsc::channel();

        for i in 0..3 {
            let tx = tx.clone();
            queue.push(Priority::amount(100), account("a"), move || {
                tx.send(i).unwrap();
            });
        }

        let handle = queue.spawn_worker();
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(rx.recv_timeout(Duration::from_secs(2)).unwrap());
        }
        assert_eq!(seen, vec![0, 1, 2]);

        queue.stop();
        handle.join().unwrap();
    }

    #[test]
    fn stop_drains_in_flight_then_exits() {
        let queue = ActionQueue::new();
        let handle = queue.spawn_worker();
        assert!(!queue.is_busy());
        queue.stop();
        handle.join().unwrap();
    }
}

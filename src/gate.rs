//! Counting gate that bounds how many write operations run at once.
//!
//! Callers past the ceiling are parked in arrival order and resumed one at a
//! time as permits are dropped. A freed slot is handed straight to the head
//! of the queue, so a newcomer can never overtake a parked caller.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

#[derive(Debug)]
struct GateState {
    in_flight: usize,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// FIFO counting gate.
///
/// The lock only guards counter and queue updates; it is never held across
/// an `.await`.
#[derive(Debug)]
pub struct Gate {
    limit: usize,
    state: Mutex<GateState>,
}

/// Proof of an acquired slot. Dropping it releases the slot.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct GatePermit<'a> {
    gate: &'a Gate,
}

impl Gate {
    /// Creates a gate admitting at most `limit` holders.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero, since no caller could ever proceed.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        assert!(limit > 0, "gate limit must be at least 1");
        Self {
            limit,
            state: Mutex::new(GateState {
                in_flight: 0,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Maximum number of simultaneous holders.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of permits currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Number of callers parked in [`Gate::acquire`].
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Waits until a slot is free and takes it.
    pub async fn acquire(&self) -> GatePermit<'_> {
        loop {
            let rx = {
                let mut state = self.state.lock();
                if state.in_flight < self.limit && state.waiters.is_empty() {
                    state.in_flight += 1;
                    return GatePermit { gate: self };
                }
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                rx
            };

            let mut pending = PendingSlot {
                gate: self,
                rx,
                granted: false,
            };

            // The sender only disappears without a value if the gate dropped
            // it; queue up again in that case.
            if (&mut pending.rx).await.is_ok() {
                pending.granted = true;
                return GatePermit { gate: self };
            }
        }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.in_flight > 0, "gate released more often than acquired");
        state.in_flight = state.in_flight.saturating_sub(1);

        while let Some(waiter) = state.waiters.pop_front() {
            // The slot is counted before the waiter runs so nobody can slip
            // in between.
            state.in_flight += 1;
            if waiter.send(()).is_ok() {
                return;
            }
            // Waiter gave up before being resumed.
            state.in_flight -= 1;
        }
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// Parked acquire. If the future is dropped after a slot was handed over but
/// before it was observed, the slot goes back to the gate.
struct PendingSlot<'a> {
    gate: &'a Gate,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if self.granted {
            return;
        }
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            self.gate.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn wait_for_waiters(gate: &Gate, count: usize) {
        while gate.waiting() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_acquire_below_limit_is_immediate() {
        let gate = Gate::new(2);
        let first = gate.acquire().await;
        let second = gate.acquire().await;

        assert_eq!(gate.in_flight(), 2);
        assert_eq!(gate.waiting(), 0);

        drop(first);
        drop(second);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let gate = Arc::new(Gate::new(3));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let gate = Arc::clone(&gate);
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            tasks.spawn(async move {
                let _permit = gate.acquire().await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(done.load(Ordering::SeqCst), 20);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_waiters_resume_in_arrival_order() {
        let gate = Arc::new(Gate::new(1));
        let order = Arc::new(Mutex::new(Vec::new()));
        let held = gate.acquire().await;

        let mut tasks = tokio::task::JoinSet::new();
        for id in 0..5 {
            let waiter_gate = Arc::clone(&gate);
            let order = Arc::clone(&order);
            tasks.spawn(async move {
                let _permit = waiter_gate.acquire().await;
                order.lock().push(id);
            });
            wait_for_waiters(&gate, id + 1).await;
        }

        drop(held);
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_release_hands_slot_to_waiter() {
        let gate = Arc::new(Gate::new(1));
        let held = gate.acquire().await;

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let _permit = gate.acquire().await;
            })
        };
        wait_for_waiters(&gate, 1).await;

        drop(held);
        // Slot is already counted for the waiter before it runs.
        assert_eq!(gate.in_flight(), 1);
        assert_eq!(gate.waiting(), 0);

        waiter.await.unwrap();
        assert_eq!(gate.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_is_skipped() {
        let gate = Gate::new(1);
        let held = gate.acquire().await;

        let timed_out =
            tokio::time::timeout(Duration::from_millis(5), gate.acquire()).await;
        assert!(timed_out.is_err());

        drop(held);
        assert_eq!(gate.in_flight(), 0);

        let _again = gate.acquire().await;
        assert_eq!(gate.in_flight(), 1);
    }

    #[test]
    #[should_panic(expected = "gate limit must be at least 1")]
    fn test_zero_limit_rejected() {
        let _ = Gate::new(0);
    }
}

//! The fork-join pool.
//!
//! Worker threads park on a condvar and wake when the job sequence number
//! advances. The calling thread never parks during a fork: it runs its own
//! share of the partitions and then steals, so small jobs do not pay a
//! wake-up latency for the common case.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::slot::WorkerSlot;

/// High bit of the job sequence doubles as the shutdown signal.
const STOP_BIT: u64 = 1 << 63;

/// Fork-join pool over partition indices.
///
/// `run(parts, task)` calls `task(i)` exactly once for every
/// `i in 0..parts`, from any thread and in any order, and returns after all
/// calls have finished. One job runs at a time; concurrent `run` calls
/// serialize on an internal mutex.
pub struct ForkPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

struct Shared {
    /// Threads in the pool, counting the caller as thread 0.
    width: usize,

    /// Monotonic job counter; workers diff it against the last value they
    /// saw to detect new work.
    job_seq: AtomicU64,

    /// Threads still working on the current job.
    pending: AtomicUsize,

    /// One partition range per thread.
    slots: Box<[WorkerSlot]>,

    /// Type-erased task for the current job, valid only while `fork_gate`
    /// is held by the submitting thread.
    job: Mutex<Option<ErasedJob>>,

    /// Serializes jobs; held for the whole fork-join.
    fork_gate: Mutex<()>,

    wake_mutex: Mutex<()>,
    wake: Condvar,
    done_mutex: Mutex<()>,
    done: Condvar,
}

/// Raw function pointer + context standing in for a generic closure, so the
/// shared state stays unparameterized.
struct ErasedJob {
    call: unsafe fn(*const (), usize),
    ctx: *const (),
}

// The context pointer refers to a closure on the submitting thread's stack;
// it stays valid because that thread blocks in `run` until the job is done.
unsafe impl Send for ErasedJob {}
unsafe impl Sync for ErasedJob {}

impl ForkPool {
    /// Create a pool spanning `width` threads, the caller included, so
    /// `ForkPool::new(4)` spawns three workers.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "pool width must be at least 1");

        let slots: Box<[WorkerSlot]> = (0..width)
            .map(|_| WorkerSlot::new())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let shared = Arc::new(Shared {
            width,
            job_seq: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            slots,
            job: Mutex::new(None),
            fork_gate: Mutex::new(()),
            wake_mutex: Mutex::new(()),
            wake: Condvar::new(),
            done_mutex: Mutex::new(()),
            done: Condvar::new(),
        });

        let workers = (1..width)
            .map(|idx| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(shared, idx))
            })
            .collect();

        debug!(width, "fork pool started");
        ForkPool { shared, workers }
    }

    /// Pool width, caller included.
    pub fn width(&self) -> usize {
        self.shared.width
    }

    /// Run `task` once per partition index in `0..parts` and join.
    pub fn run<F>(&self, parts: usize, task: F)
    where
        F: Fn(usize) + Sync,
    {
        if parts == 0 {
            return;
        }

        let _gate = self.shared.fork_gate.lock().unwrap();

        unsafe fn trampoline<F: Fn(usize)>(ctx: *const (), part: usize) {
            (*(ctx as *const F))(part);
        }

        *self.shared.job.lock().unwrap() = Some(ErasedJob {
            call: trampoline::<F>,
            ctx: &task as *const F as *const (),
        });

        self.deal_partitions(parts);
        self.shared
            .pending
            .store(self.shared.width, Ordering::Release);

        // Publish the new job under the wake mutex so no worker misses it.
        {
            let _w = self.shared.wake_mutex.lock().unwrap();
            self.shared.job_seq.fetch_add(1, Ordering::Release);
        }
        self.shared.wake.notify_all();

        // Thread 0 works too.
        drain_slot(&self.shared, 0);

        if self.shared.pending.fetch_sub(1, Ordering::AcqRel) > 1 {
            let guard = self.shared.done_mutex.lock().unwrap();
            let _guard = self
                .shared
                .done
                .wait_while(guard, |_| {
                    self.shared.pending.load(Ordering::Acquire) > 0
                })
                .unwrap();
        }

        *self.shared.job.lock().unwrap() = None;
    }

    /// Split `0..parts` into per-thread ranges; the first `parts % width`
    /// threads take one extra partition.
    fn deal_partitions(&self, parts: usize) {
        let width = self.shared.width;
        let each = parts / width;
        let extra = parts % width;

        let mut start = 0;
        for (idx, slot) in self.shared.slots.iter().enumerate() {
            let count = each + usize::from(idx < extra);
            slot.assign(start, start + count);
            start += count;
        }
    }
}

impl Default for ForkPool {
    /// Pool sized to the machine's available parallelism.
    fn default() -> Self {
        let width = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(width)
    }
}

impl Drop for ForkPool {
    fn drop(&mut self) {
        {
            let _w = self.shared.wake_mutex.lock().unwrap();
            self.shared.job_seq.fetch_or(STOP_BIT, Ordering::Release);
        }
        self.shared.wake.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        debug!("fork pool stopped");
    }
}

fn worker_loop(shared: Arc<Shared>, idx: usize) {
    let mut seen = 0u64;

    loop {
        let seq = {
            let guard = shared.wake_mutex.lock().unwrap();
            let _guard = shared
                .wake
                .wait_while(guard, |_| {
                    let seq = shared.job_seq.load(Ordering::Acquire);
                    seq == seen && seq & STOP_BIT == 0
                })
                .unwrap();
            shared.job_seq.load(Ordering::Acquire)
        };

        if seq & STOP_BIT != 0 {
            break;
        }
        seen = seq;

        drain_slot(&shared, idx);

        if shared.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _d = shared.done_mutex.lock().unwrap();
            shared.done.notify_one();
        }
    }
}

/// Run this thread's own partitions, then steal leftovers from the others.
fn drain_slot(shared: &Shared, idx: usize) {
    let (call, ctx) = {
        let guard = shared.job.lock().unwrap();
        let job = guard.as_ref().expect("drained without a current job");
        (job.call, job.ctx)
    };

    while let Some(part) = shared.slots[idx].claim_front() {
        unsafe { call(ctx, part) };
    }

    let width = shared.width;
    for offset in 1..width {
        let victim = (idx + width - offset) % width;
        while let Some(part) = shared.slots[victim].claim_back() {
            unsafe { call(ctx, part) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_width() {
        assert_eq!(ForkPool::new(1).width(), 1);
        assert_eq!(ForkPool::new(4).width(), 4);
        assert!(ForkPool::default().width() >= 1);
    }

    #[test]
    fn test_zero_partitions_is_a_noop() {
        let pool = ForkPool::new(4);
        let hits = AtomicUsize::new(0);
        pool.run(0, |_| {
            hits.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_every_partition_runs_exactly_once() {
        for width in [1, 2, 3, 4, 8] {
            for parts in [1, 2, 7, 8, 63, 64, 65, 100, 256] {
                let pool = ForkPool::new(width);
                let hits: Vec<AtomicUsize> =
                    (0..parts).map(|_| AtomicUsize::new(0)).collect();

                pool.run(parts, |i| {
                    hits[i].fetch_add(1, Ordering::Relaxed);
                });

                for (i, hit) in hits.iter().enumerate() {
                    assert_eq!(
                        hit.load(Ordering::SeqCst),
                        1,
                        "width={width}, parts={parts}: partition {i} ran {} times",
                        hit.load(Ordering::SeqCst)
                    );
                }
            }
        }
    }

    #[test]
    fn test_partition_indices_in_bounds() {
        let pool = ForkPool::new(4);
        let out_of_range = AtomicUsize::new(0);
        pool.run(128, |i| {
            if i >= 128 {
                out_of_range.fetch_add(1, Ordering::Relaxed);
            }
        });
        assert_eq!(out_of_range.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sequential_reuse() {
        let pool = ForkPool::new(4);
        let total = AtomicUsize::new(0);
        for _ in 0..50 {
            pool.run(64, |_| {
                total.fetch_add(1, Ordering::Relaxed);
            });
        }
        assert_eq!(total.load(Ordering::SeqCst), 50 * 64);
    }

    #[test]
    fn test_task_reads_captured_context() {
        let pool = ForkPool::new(4);
        let values: Vec<AtomicUsize> = (0..64).map(|_| AtomicUsize::new(0)).collect();
        let factor = 3usize;

        pool.run(64, |i| {
            values[i].store(i * factor, Ordering::Relaxed);
        });

        for (i, v) in values.iter().enumerate() {
            assert_eq!(v.load(Ordering::SeqCst), i * 3);
        }
    }

    #[test]
    fn test_drop_is_clean() {
        for _ in 0..10 {
            let pool = ForkPool::new(3);
            pool.run(16, |_| {});
        }
    }

    #[test]
    fn test_sum_matches_sequential() {
        let pool = ForkPool::new(4);
        let sum = AtomicUsize::new(0);
        pool.run(1000, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::SeqCst), (0..1000).sum());
    }
}

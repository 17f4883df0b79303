//! Cooperative cycle scheduler.
//!
//! One periodic task on a single thread: run a control cycle to
//! completion, then wait out the sample interval. The wait is the only
//! suspension point and it can be cut short by a [`ShutdownSignal`], so
//! simulation and test harnesses stop cleanly instead of killing a thread
//! mid-sleep. A cycle that has started is never interrupted.
//!
//! ```text
//!  futures_lite::block_on
//!   └─ edge_executor::LocalExecutor
//!       └─ cycle task:  ┌──────────┐   ┌───────────────────────────────┐
//!                       │  cycle() │──▶│ or(Timer::after, shutdown)    │──┐
//!                       └──────────┘   └───────────────────────────────┘  │
//!                            ▲                   timer fired              │
//!                            └────────────────────────────────────────────┘
//! ```

use core::time::Duration;

use async_io_mini::Timer;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::info;

/// Request for the scheduler to stop after the current cycle.
///
/// Safe to trigger from any thread (or a `static`).
pub struct ShutdownSignal {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    pub fn request(&self) {
        self.signal.signal(());
    }

    pub fn is_requested(&self) -> bool {
        self.signal.signaled()
    }

    async fn wait(&self) {
        self.signal.wait().await;
    }
}

/// Runs one cycle every `interval`.
pub struct CycleScheduler {
    interval: Duration,
}

impl CycleScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(interval_ms: u32) -> Self {
        Self::new(Duration::from_millis(u64::from(interval_ms)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `cycle(n)` for n = 1, 2, … until `shutdown` is requested.
    /// Returns the number of cycles that ran.
    pub async fn run<F>(&self, mut cycle: F, shutdown: &ShutdownSignal) -> u64
    where
        F: FnMut(u64),
    {
        let mut count = 0u64;
        while !shutdown.is_requested() {
            count += 1;
            cycle(count);

            let stop = future::or(
                async {
                    Timer::after(self.interval).await;
                    false
                },
                async {
                    shutdown.wait().await;
                    true
                },
            )
            .await;
            if stop {
                break;
            }
        }
        info!("Scheduler: stopped after {} cycles", count);
        count
    }

    /// Drive [`run`](Self::run) to completion on the calling thread.
    pub fn run_blocking<F>(&self, cycle: F, shutdown: &ShutdownSignal) -> u64
    where
        F: FnMut(u64),
    {
        let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
        let task = executor.spawn(self.run(cycle, shutdown));
        info!(
            "Scheduler: running, interval {} ms",
            self.interval.as_millis()
        );
        future::block_on(executor.run(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_requested_shutdown_runs_nothing() {
        let shutdown = ShutdownSignal::new();
        shutdown.request();
        let mut ran = 0;
        let n = CycleScheduler::from_millis(1).run_blocking(|_| ran += 1, &shutdown);
        assert_eq!(n, 0);
        assert_eq!(ran, 0);
    }

    #[test]
    fn stops_after_cycle_that_requests_shutdown() {
        let shutdown = ShutdownSignal::new();
        let mut seen = Vec::new();
        let n = CycleScheduler::from_millis(1).run_blocking(
            |i| {
                seen.push(i);
                if i == 3 {
                    shutdown.request();
                }
            },
            &shutdown,
        );
        assert_eq!(n, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }
}

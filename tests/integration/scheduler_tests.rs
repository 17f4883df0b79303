//! Integration tests for the cycle scheduler.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::mock_hw::{nominal, FixedClock, MockHardware, RecordingSink};

use irrigator::app::service::IrrigationService;
use irrigator::config::SystemConfig;
use irrigator::scheduler::{CycleScheduler, ShutdownSignal};

#[test]
fn shutdown_from_another_thread_cuts_a_long_wait_short() {
    let shutdown = Arc::new(ShutdownSignal::new());
    let remote = Arc::clone(&shutdown);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.request();
    });

    let started = Instant::now();
    let n = CycleScheduler::new(Duration::from_secs(3600)).run_blocking(|_| {}, &shutdown);
    stopper.join().unwrap();

    assert_eq!(n, 1);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn cycles_are_spaced_by_the_interval() {
    let shutdown = ShutdownSignal::new();
    let mut stamps = Vec::new();
    CycleScheduler::from_millis(20).run_blocking(
        |i| {
            stamps.push(Instant::now());
            if i == 3 {
                shutdown.request();
            }
        },
        &shutdown,
    );

    assert_eq!(stamps.len(), 3);
    for w in stamps.windows(2) {
        assert!(w[1] - w[0] >= Duration::from_millis(20));
    }
}

#[test]
fn scheduler_drives_the_service() {
    let mut svc = IrrigationService::new(&SystemConfig::default());
    let mut hw = MockHardware::new(nominal());
    let mut sink = RecordingSink::new();
    let clock = FixedClock::default();
    let shutdown = ShutdownSignal::new();

    svc.start(&mut hw, &mut sink);
    let n = CycleScheduler::from_millis(1).run_blocking(
        |i| {
            svc.run_cycle(&mut hw, &clock, &mut sink);
            if i == 4 {
                shutdown.request();
            }
        },
        &shutdown,
    );
    svc.stop(&mut hw);

    assert_eq!(n, 4);
    assert_eq!(svc.cycle_count(), 4);
    assert_eq!(hw.pump_writes().len(), 4);
}

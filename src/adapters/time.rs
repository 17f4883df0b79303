//! Time adapters: monotonic uptime, SNTP wall clock, and the bounded
//! wait for the first sync.
//!
//! - **`feature = "espidf"`**: `esp_timer_get_time()` for uptime,
//!   `gettimeofday()` for wall time, `EspSntp` for sync status.
//! - **`not(feature = "espidf")`**: `std::time::Instant` for uptime and an
//!   injectable epoch for host-side testing and simulation.
//!
//! Wall-clock time only decorates telemetry. If SNTP has not completed
//! after `time_sync_max_polls` cycles the clock reports itself
//! [`TimeSyncState::Unavailable`] and the controller carries on; a late
//! sync still upgrades it to `Synced`.

use log::{info, warn};

use crate::app::ports::ClockPort;
use crate::app::telemetry::WallClock;
use crate::config::SystemConfig;

/// Anything earlier is an unsynced RTC still counting from 1970.
const EPOCH_2020: i64 = 1_577_836_800;

// ───────────────────────────────────────────────────────────────
// System clock
// ───────────────────────────────────────────────────────────────

pub struct SystemClock {
    #[cfg(not(feature = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(feature = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(feature = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        // SAFETY: esp_timer_get_time is a lock-free read of the system timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(feature = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Unix seconds, `None` if the RTC has clearly never been set.
    #[cfg(feature = "espidf")]
    pub fn epoch_secs(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        // SAFETY: tv is a valid out-pointer; timezone argument may be null.
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as i64;
        (secs >= EPOCH_2020).then_some(secs)
    }

    #[cfg(not(feature = "espidf"))]
    pub fn epoch_secs(&self) -> Option<i64> {
        sim::epoch().filter(|s| *s >= EPOCH_2020)
    }
}

#[cfg(not(feature = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicI64, Ordering};

    const UNSET: i64 = i64::MIN;
    static SIM_EPOCH: AtomicI64 = AtomicI64::new(UNSET);

    pub fn set(epoch: Option<i64>) {
        SIM_EPOCH.store(epoch.unwrap_or(UNSET), Ordering::Relaxed);
    }

    pub fn epoch() -> Option<i64> {
        match SIM_EPOCH.load(Ordering::Relaxed) {
            UNSET => None,
            s => Some(s),
        }
    }
}

/// Simulate SNTP: `Some(epoch)` marks the clock synced at that time.
#[cfg(not(feature = "espidf"))]
pub fn sim_set_epoch(epoch: Option<i64>) {
    sim::set(epoch);
}

// ───────────────────────────────────────────────────────────────
// Sync state machine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSyncState {
    /// Waiting for the first sync; `polls` cycles so far.
    Pending { polls: u16 },
    Synced,
    /// Gave up waiting. Telemetry shows the time as unavailable.
    Unavailable,
}

/// Bounded wait for the first SNTP sync, advanced once per cycle.
#[derive(Debug)]
pub struct TimeSync {
    state: TimeSyncState,
    max_polls: u16,
}

impl TimeSync {
    pub fn new(max_polls: u16) -> Self {
        Self {
            state: TimeSyncState::Pending { polls: 0 },
            max_polls,
        }
    }

    pub fn state(&self) -> TimeSyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == TimeSyncState::Synced
    }

    /// Feed this cycle's sync status.
    pub fn poll(&mut self, synced: bool) -> TimeSyncState {
        self.state = match (self.state, synced) {
            (TimeSyncState::Synced, _) => TimeSyncState::Synced,
            (_, true) => {
                info!("Time: SNTP sync complete");
                TimeSyncState::Synced
            }
            (TimeSyncState::Pending { polls }, false) => {
                let polls = polls.saturating_add(1);
                if polls >= self.max_polls {
                    warn!(
                        "Time: no SNTP sync after {} cycles, wall clock unavailable",
                        polls
                    );
                    TimeSyncState::Unavailable
                } else {
                    TimeSyncState::Pending { polls }
                }
            }
            (TimeSyncState::Unavailable, false) => TimeSyncState::Unavailable,
        };
        self.state
    }
}

// ───────────────────────────────────────────────────────────────
// Network clock (ClockPort)
// ───────────────────────────────────────────────────────────────

/// Uptime plus SNTP-backed local time of day.
pub struct NetworkClock {
    system: SystemClock,
    sync: TimeSync,
    utc_offset_secs: i32,
    #[cfg(feature = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
}

impl NetworkClock {
    /// Start SNTP against the configured server. Failure to start leaves
    /// the clock permanently unsynced; it never blocks.
    pub fn start(cfg: &SystemConfig) -> Self {
        #[cfg(feature = "espidf")]
        let sntp = {
            let mut conf = esp_idf_svc::sntp::SntpConf::default();
            conf.servers[0] = cfg.ntp_server.as_str();
            match esp_idf_svc::sntp::EspSntp::new(&conf) {
                Ok(sntp) => {
                    info!("Time: SNTP started ({})", cfg.ntp_server);
                    Some(sntp)
                }
                Err(e) => {
                    warn!("Time: SNTP start failed: {}", e);
                    None
                }
            }
        };

        #[cfg(not(feature = "espidf"))]
        info!("Time(sim): SNTP server {}", cfg.ntp_server);

        Self {
            system: SystemClock::new(),
            sync: TimeSync::new(cfg.time_sync_max_polls),
            utc_offset_secs: cfg.utc_offset_secs,
            #[cfg(feature = "espidf")]
            sntp,
        }
    }

    /// Advance the bounded sync wait. Call once per cycle.
    pub fn poll(&mut self) -> TimeSyncState {
        let synced = self.sntp_completed() && self.system.epoch_secs().is_some();
        self.sync.poll(synced)
    }

    pub fn sync_state(&self) -> TimeSyncState {
        self.sync.state()
    }

    #[cfg(feature = "espidf")]
    fn sntp_completed(&self) -> bool {
        self.sntp
            .as_ref()
            .is_some_and(|s| s.get_sync_status() == esp_idf_svc::sntp::SyncStatus::Completed)
    }

    #[cfg(not(feature = "espidf"))]
    fn sntp_completed(&self) -> bool {
        sim::epoch().is_some()
    }
}

impl ClockPort for NetworkClock {
    fn uptime_ms(&self) -> u64 {
        self.system.uptime_ms()
    }

    fn wall_clock(&self) -> Option<WallClock> {
        if !self.sync.is_synced() {
            return None;
        }
        self.system
            .epoch_secs()
            .map(|e| WallClock::from_epoch_secs(e, self.utc_offset_secs))
    }
}

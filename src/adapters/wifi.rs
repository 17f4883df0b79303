//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity. The network only serves SNTP; irrigation never waits
//! on it.
//!
//! ## cfg gating
//!
//! - **`feature = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Retry policy
//!
//! Association is never awaited. [`ConnectivityPort::poll`] is called once
//! per control cycle and advances a small state machine:
//!
//! - an attempt that is not up within [`CONNECT_TIMEOUT_MS`] counts as failed;
//! - failed attempts back off exponentially (2 s → 4 s → 8 s … capped at
//!   60 s);
//! - after `wifi_max_attempts` consecutive failures the adapter stops
//!   trying and stays [`WifiState::Failed`] for this boot.

use core::fmt;
use log::{info, warn};

use crate::config::SystemConfig;

use super::utils::is_printable_ascii;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    DriverFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverFailed => write!(f, "WiFi driver error"),
        }
    }
}

impl std::error::Error for ConnectivityError {}

pub trait ConnectivityPort {
    /// Advance association / backoff. Never blocks.
    fn poll(&mut self, now_ms: u64) -> WifiState;
    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    /// Credentials set, no attempt made yet.
    Idle,
    /// Attempt `attempt` (1-based) issued at `since_ms`.
    Connecting { attempt: u8, since_ms: u64 },
    Connected,
    /// `attempt` attempts have failed; the next one starts at `retry_at_ms`.
    Backoff { attempt: u8, retry_at_ms: u64 },
    /// Gave up for this boot.
    Failed,
}

pub const CONNECT_TIMEOUT_MS: u64 = 10_000;
const INITIAL_BACKOFF_MS: u64 = 2_000;
const MAX_BACKOFF_MS: u64 = 60_000;

/// Delay before retrying after `failures` consecutive failed attempts.
pub fn backoff_ms(failures: u8) -> u64 {
    let shift = u32::from(failures.saturating_sub(1)).min(16);
    (INITIAL_BACKOFF_MS << shift).min(MAX_BACKOFF_MS)
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() {
        return Err(ConnectivityError::NoCredentials);
    }
    if ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    max_attempts: u8,
    #[cfg(feature = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    /// Simulation: attempts still to fail before one succeeds.
    #[cfg(not(feature = "espidf"))]
    sim_failures_left: u8,
    #[cfg(not(feature = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    /// Bring up the STA driver with the configured credentials. The first
    /// association attempt happens on the first [`poll`](ConnectivityPort::poll).
    #[cfg(feature = "espidf")]
    pub fn new(
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
        cfg: &SystemConfig,
    ) -> Result<Self, ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

        validate_ssid(&cfg.wifi_ssid)?;
        validate_password(&cfg.wifi_password)?;

        let mut wifi = EspWifi::new(modem, sysloop, Some(nvs)).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            ConnectivityError::DriverFailed
        })?;
        let client = ClientConfiguration {
            ssid: cfg
                .wifi_ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: cfg
                .wifi_password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if cfg.wifi_password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client))
            .and_then(|()| wifi.start())
            .map_err(|e| {
                warn!("WiFi: driver start failed: {}", e);
                ConnectivityError::DriverFailed
            })?;
        info!("WiFi: STA started (SSID='{}')", cfg.wifi_ssid);

        Ok(Self {
            state: WifiState::Idle,
            max_attempts: cfg.wifi_max_attempts.max(1),
            wifi,
        })
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new(cfg: &SystemConfig) -> Result<Self, ConnectivityError> {
        validate_ssid(&cfg.wifi_ssid)?;
        validate_password(&cfg.wifi_password)?;
        info!("WiFi(sim): STA started (SSID='{}')", cfg.wifi_ssid);
        Ok(Self {
            state: WifiState::Idle,
            max_attempts: cfg.wifi_max_attempts.max(1),
            sim_failures_left: 0,
            sim_link_up: false,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Simulation: make the next `n` attempts time out.
    #[cfg(not(feature = "espidf"))]
    pub fn sim_fail_next(&mut self, n: u8) {
        self.sim_failures_left = n;
    }

    /// Simulation: drop the link as if the AP went away.
    #[cfg(not(feature = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_up = false;
    }

    fn begin_attempt(&mut self, attempt: u8, now_ms: u64) -> WifiState {
        info!("WiFi: association attempt {}/{}", attempt, self.max_attempts);
        match self.platform_connect() {
            Ok(()) => WifiState::Connecting {
                attempt,
                since_ms: now_ms,
            },
            Err(e) => {
                warn!("WiFi: attempt {} could not start: {}", attempt, e);
                self.after_failure(attempt, now_ms)
            }
        }
    }

    fn after_failure(&mut self, attempt: u8, now_ms: u64) -> WifiState {
        if attempt >= self.max_attempts {
            warn!(
                "WiFi: giving up after {} attempts, continuing without network",
                attempt
            );
            return WifiState::Failed;
        }
        let wait = backoff_ms(attempt);
        info!("WiFi: retry in {} ms", wait);
        WifiState::Backoff {
            attempt,
            retry_at_ms: now_ms + wait,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(feature = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        // Non-blocking: esp_wifi_connect() returns immediately, the link
        // comes up asynchronously.
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_failures_left > 0 {
            self.sim_failures_left -= 1;
            self.sim_link_up = false;
        } else {
            self.sim_link_up = true;
        }
        Ok(())
    }

    #[cfg(feature = "espidf")]
    fn platform_is_up(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_is_up(&self) -> bool {
        self.sim_link_up
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn poll(&mut self, now_ms: u64) -> WifiState {
        self.state = match self.state {
            WifiState::Idle => self.begin_attempt(1, now_ms),
            WifiState::Connecting { attempt, since_ms } => {
                if self.platform_is_up() {
                    info!("WiFi: connected (attempt {})", attempt);
                    WifiState::Connected
                } else if now_ms.saturating_sub(since_ms) >= CONNECT_TIMEOUT_MS {
                    warn!("WiFi: attempt {} timed out", attempt);
                    self.after_failure(attempt, now_ms)
                } else {
                    self.state
                }
            }
            WifiState::Connected => {
                if self.platform_is_up() {
                    WifiState::Connected
                } else {
                    warn!("WiFi: connection lost, reconnecting");
                    self.begin_attempt(1, now_ms)
                }
            }
            WifiState::Backoff {
                attempt,
                retry_at_ms,
            } => {
                if now_ms >= retry_at_ms {
                    self.begin_attempt(attempt + 1, now_ms)
                } else {
                    self.state
                }
            }
            WifiState::Failed => WifiState::Failed,
        };
        self.state
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected && self.platform_is_up()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `hardware`  | SensorPort         | ESP32 ADC1, GPIO, DHT22       |
//! |             | ActuatorPort       | Relay + indicator GPIOs       |
//! | `log_sink`  | EventSink          | Serial log output (flat facts)|
//! | `json_sink` | EventSink          | JSON lines on stdout          |
//! | `nvs`       | ConfigPort         | NVS / in-memory store         |
//! | `time`      | ClockPort          | System timer + SNTP           |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod hardware;
pub mod json_sink;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub(super) mod utils;
pub mod wifi;

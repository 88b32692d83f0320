//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements         | Connects to              |
//! |-----------------|--------------------|--------------------------|
//! | `hardware`      | RelayPort          | Relay GPIO (active-low)  |
//! | `time`          | ClockPort          | ESP32 system timer       |
//! | `log_sink`      | EventSink          | Serial log output        |
//! | `wifi`          | ConnectivityPort   | ESP-IDF WiFi STA         |
//! | `http_listener` | —                  | ESP-IDF httpd / std::net |

pub mod hardware;
pub mod http_listener;
pub mod log_sink;
pub mod time;
pub mod wifi;

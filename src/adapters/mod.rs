//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements        | Connects to                    |
//! |---------------|-------------------|--------------------------------|
//! | `cloud`       | UploadPort        | HTTP(S) logging channel        |
//! | `hardware`    | RadioPort         | Radio driver mailbox           |
//! |               | IndoorSensorPort  | Indoor sensor mailbox + delay  |
//! | `log_display` | DisplayPort       | Serial log output              |
//! | `log_sink`    | EventSink         | Serial log output              |
//! | `nvs`         | ConfigPort        | NVS / in-memory store          |
//! |               | HistoryStore      |                                |
//! | `time`        | ClockPort         | System clock, SNTP             |
//! | `wifi`        | ConnectivityPort  | ESP-IDF WiFi STA               |

pub mod cloud;
pub mod hardware;
pub mod log_display;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;

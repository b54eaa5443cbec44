//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements                 | Connects to                 |
//! |------------------|----------------------------|-----------------------------|
//! | `bolt_lock`      | LockActuator               | Simulated bolt motor        |
//! | `device_config`  | DevicePort                 | NVS erase / esp_restart     |
//! | `hardware`       | all of the above (bundle)  | `DeviceAdapter` for AppTask |
//! | `log_sink`       | LockTraitSink              | Serial log output           |
//! | `time`           | Clock                      | ESP32 system timer          |
//! | `update_manager` | UpdateControl              | Simulated update manager    |
//! |                  | UpdateCallbacks            |                             |

pub mod bolt_lock;
pub mod device_config;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod update_manager;

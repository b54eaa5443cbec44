//! Configuration manager adapter: firmware revision and factory reset.
//!
//! - **`target_os = "espidf"`**: factory reset erases the default NVS
//!   partition and restarts the chip.
//! - **`not(target_os = "espidf")`**: records the request so tests can
//!   observe it.

use log::info;

use crate::app::ports::{DevicePort, FirmwareRevision};
use crate::error::Error;

pub struct DeviceConfig {
    revision: &'static str,
    #[cfg(not(target_os = "espidf"))]
    factory_reset_requested: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceConfig {
    /// Revision is the crate version baked in at build time.
    pub fn new() -> Self {
        Self::with_revision(env!("CARGO_PKG_VERSION"))
    }

    pub fn with_revision(revision: &'static str) -> Self {
        Self {
            revision,
            #[cfg(not(target_os = "espidf"))]
            factory_reset_requested: false,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn factory_reset_requested(&self) -> bool {
        self.factory_reset_requested
    }
}

impl DevicePort for DeviceConfig {
    fn firmware_revision(&self) -> Result<FirmwareRevision, Error> {
        if self.revision.is_empty() {
            return Err(Error::Init("firmware revision missing"));
        }
        FirmwareRevision::try_from(self.revision).map_err(|()| Error::Init("firmware revision too long"))
    }

    #[cfg(target_os = "espidf")]
    fn initiate_factory_reset(&mut self) {
        info!("config: erasing NVS and restarting");
        // SAFETY: plain ESP-IDF calls with no pointer arguments.
        unsafe {
            let ret = esp_idf_svc::sys::nvs_flash_erase();
            if ret != esp_idf_svc::sys::ESP_OK {
                log::error!("config: nvs_flash_erase failed (rc={})", ret);
            }
            esp_idf_svc::sys::esp_restart();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn initiate_factory_reset(&mut self) {
        info!("config(sim): factory reset requested");
        self.factory_reset_requested = true;
    }
}

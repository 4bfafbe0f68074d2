//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`HistoryStore`] for the station.
//!
//! - Blobs are `postcard`-encoded; `f32` extremes round-trip bit-exact.
//! - Config validation: all fields are range-checked before persistence.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!
//! On host builds a `RefCell<HashMap>` stands in for flash.

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort, HistoryError, HistoryStore};
use crate::config::StationConfig;
use crate::stats::{DayRecord, HISTORY_DAYS};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &str = "wstation";
const CONFIG_KEY: &str = "stncfg";
const HISTORY_KEY: &str = "history";

/// Largest blob either backend accepts.
const MAX_BLOB_SIZE: usize = 4000;

/// Backend failure for a raw blob operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlobError {
    NotFound,
    Io,
}

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter and initialise NVS flash.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably. On first boot or after a version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    // ── Raw blob access ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.store
            .borrow()
            .get(key)
            .cloned()
            .ok_or(BlobError::NotFound)
    }

    #[cfg(not(target_os = "espidf"))]
    fn put_blob(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        if bytes.len() > MAX_BLOB_SIZE {
            warn!("NvsAdapter: blob '{}' too large ({} bytes)", key, bytes.len());
            return Err(BlobError::Io);
        }
        self.store.borrow_mut().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let key = c_key(key);
        let result = Self::with_nvs_handle(false, |handle| {
            let mut size: usize = 0;
            // First call: get size
            let ret = unsafe {
                nvs_get_blob(handle, key.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            if size == 0 || size > MAX_BLOB_SIZE {
                return Err(ESP_FAIL);
            }
            let mut buf = vec![0u8; size];
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(buf)
        });
        match result {
            Ok(buf) => Ok(buf),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(BlobError::NotFound),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(BlobError::Io)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn put_blob(&self, key: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let key = c_key(key);
        Self::with_nvs_handle(true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key.as_ptr() as *const _,
                    bytes.as_ptr() as *const _,
                    bytes.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            BlobError::Io
        })
    }

    /// Open the station namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = c_key(NAMESPACE);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// NUL-terminated NVS key (max 15 chars).
#[cfg(target_os = "espidf")]
fn c_key(key: &str) -> [u8; 16] {
    let mut buf = [0u8; 16];
    let bytes = key.as_bytes();
    let len = bytes.len().min(15);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

// ── ConfigPort ────────────────────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<StationConfig, ConfigError> {
        match self.get_blob(CONFIG_KEY) {
            Ok(bytes) => {
                let cfg: StationConfig =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                cfg.validate()?;
                info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
                Ok(cfg)
            }
            Err(BlobError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(StationConfig::default())
            }
            Err(BlobError::Io) => Err(ConfigError::IoError),
        }
    }

    fn save(&self, config: &StationConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.put_blob(CONFIG_KEY, &bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

// ── HistoryStore ──────────────────────────────────────────────

impl HistoryStore for NvsAdapter {
    fn load_daily_history(&self) -> Result<[DayRecord; HISTORY_DAYS], HistoryError> {
        let bytes = self.get_blob(HISTORY_KEY).map_err(|e| match e {
            BlobError::NotFound => HistoryError::NotFound,
            BlobError::Io => HistoryError::IoError,
        })?;
        postcard::from_bytes(&bytes).map_err(|_| {
            warn!("NvsAdapter: history blob corrupted ({} bytes)", bytes.len());
            HistoryError::Corrupted
        })
    }

    fn save_daily_history(&mut self, history: &[DayRecord; HISTORY_DAYS]) -> Result<(), HistoryError> {
        let bytes = postcard::to_allocvec(history).map_err(|_| HistoryError::IoError)?;
        self.put_blob(HISTORY_KEY, &bytes)
            .map_err(|_| HistoryError::IoError)?;
        info!("NvsAdapter: history saved ({} bytes)", bytes.len());
        Ok(())
    }
}

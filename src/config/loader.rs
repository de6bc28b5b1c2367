//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading ledger
//! settings from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{LedgerError, LedgerResult};

use super::types::LedgerSettings;

/// Largest number of fractional digits accepted for formatted amounts.
const MAX_DECIMAL_PLACES: u32 = 10;

/// Loads and validates ledger settings.
///
/// # Example
///
/// ```no_run
/// use payroll_ledger::config::ConfigLoader;
///
/// let settings = ConfigLoader::load("./config/payroll.yaml")?;
/// println!("Listening on {}", settings.server.bind);
/// # Ok::<(), payroll_ledger::error::LedgerError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads settings from the specified YAML file.
    ///
    /// # Returns
    ///
    /// Returns the validated settings, or an error if:
    /// - The file does not exist (`NotFound`)
    /// - The file contains invalid YAML or fails validation (`ConfigParse`)
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<LedgerSettings> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| LedgerError::NotFound {
            operation: "load_config",
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content, &path_str)
    }

    /// Parses settings from YAML text. `origin` names the source in errors.
    pub fn from_yaml_str(content: &str, origin: &str) -> LedgerResult<LedgerSettings> {
        let settings: LedgerSettings =
            serde_yaml::from_str(content).map_err(|e| LedgerError::ConfigParse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        Self::validate(&settings).map_err(|message| LedgerError::ConfigParse {
            path: origin.to_string(),
            message,
        })?;

        Ok(settings)
    }

    fn validate(settings: &LedgerSettings) -> Result<(), String> {
        let amounts = &settings.amounts;

        if amounts.min > amounts.max {
            return Err(format!(
                "amounts.min ({}) is greater than amounts.max ({})",
                amounts.min, amounts.max
            ));
        }
        if amounts.default < amounts.min || amounts.default > amounts.max {
            return Err(format!(
                "amounts.default ({}) must lie between {} and {}",
                amounts.default, amounts.min, amounts.max
            ));
        }
        if amounts.decimal_places > MAX_DECIMAL_PLACES {
            return Err(format!(
                "amounts.decimal_places must be at most {}",
                MAX_DECIMAL_PLACES
            ));
        }
        if settings.server.bind.trim().is_empty() {
            return Err("server.bind must not be empty".to_string());
        }

        Ok(())
    }
}

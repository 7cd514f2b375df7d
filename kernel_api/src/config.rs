//! Kernel configuration

use crate::KernelError;
use hal::DEFAULT_TICK_QUANTUM_MICROS;
use serde::{Deserialize, Serialize};

/// Tunables fixed at kernel construction
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
///
/// # Example
///
/// ```
/// use kernel_api::KernelConfig;
///
/// let config = KernelConfig::from_json(r#"{ "tick_quantum_micros": 500 }"#).unwrap();
/// assert_eq!(config.tick_quantum_micros, 500);
/// assert_eq!(config.retry_budget_ticks, KernelConfig::default().retry_budget_ticks);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Length of one tick in microseconds
    pub tick_quantum_micros: u64,
    /// Default tick budget for bounded-retry sends and receives
    pub retry_budget_ticks: u64,
}

impl KernelConfig {
    /// Parses a configuration from JSON and validates it
    pub fn from_json(text: &str) -> Result<Self, KernelError> {
        let config: KernelConfig =
            serde_json::from_str(text).map_err(|e| KernelError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to JSON
    pub fn to_json(&self) -> Result<String, KernelError> {
        serde_json::to_string(self).map_err(|e| KernelError::InvalidConfig(e.to_string()))
    }

    /// Rejects values the kernel cannot run with
    pub fn validate(&self) -> Result<(), KernelError> {
        if self.tick_quantum_micros == 0 {
            return Err(KernelError::InvalidConfig(
                "tick_quantum_micros must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the tick length as a [`core::time::Duration`]
    pub fn tick_quantum(&self) -> core::time::Duration {
        core::time::Duration::from_micros(self.tick_quantum_micros)
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tick_quantum_micros: DEFAULT_TICK_QUANTUM_MICROS,
            retry_budget_ticks: 50,
        }
    }
}

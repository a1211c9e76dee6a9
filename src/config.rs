//! Construction-time configuration for a [`TimerWheel`](crate::TimerWheel).

use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_WHEEL_SIZE: usize = 512;
const DEFAULT_TICK_DURATION: Duration = Duration::from_millis(200);
const DEFAULT_THREAD_NAME_PREFIX: &str = "timer-wheel";

/// Configuration for a [`TimerWheel`](crate::TimerWheel).
///
/// `wheel_size * tick_duration` is the scheduling horizon: timers whose
/// delay exceeds it take up to one extra revolution to fire. The defaults
/// (512 spokes, 200ms ticks) give roughly a 100 second horizon.
#[derive(Debug, Clone)]
pub struct WheelConfig {
    pub(crate) wheel_size: usize,
    pub(crate) tick_duration: Duration,
    pub(crate) thread_name_prefix: String,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            wheel_size: DEFAULT_WHEEL_SIZE,
            tick_duration: DEFAULT_TICK_DURATION,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl WheelConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of spokes in the wheel.
    pub fn with_wheel_size(mut self, wheel_size: usize) -> Self {
        self.wheel_size = wheel_size;
        self
    }

    /// Set the tick duration (the wheel's resolution).
    pub fn with_tick_duration(mut self, tick_duration: Duration) -> Self {
        self.tick_duration = tick_duration;
        self
    }

    /// Set the worker thread's name prefix.
    ///
    /// The wheel size and tick duration are always appended to the final
    /// thread name, regardless of this prefix, to aid diagnostics.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.wheel_size == 0 {
            return Err(ConfigError::ZeroWheelSize);
        }
        if self.tick_duration.is_zero() {
            return Err(ConfigError::ZeroTickDuration);
        }
        Ok(())
    }

    pub(crate) fn thread_name(&self) -> String {
        format!(
            "{}[size={},tick={}ms]",
            self.thread_name_prefix,
            self.wheel_size,
            self.tick_duration.as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WheelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = WheelConfig::new()
            .with_wheel_size(8)
            .with_tick_duration(Duration::from_millis(10))
            .with_thread_name_prefix("custom");

        assert_eq!(config.wheel_size, 8);
        assert_eq!(config.tick_duration, Duration::from_millis(10));
        assert_eq!(config.thread_name_prefix, "custom");
    }

    #[test]
    fn test_zero_wheel_size_rejected() {
        let config = WheelConfig::new().with_wheel_size(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWheelSize)));
    }

    #[test]
    fn test_zero_tick_duration_rejected() {
        let config = WheelConfig::new().with_tick_duration(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTickDuration)
        ));
    }

    #[test]
    fn test_thread_name_encodes_config() {
        let config = WheelConfig::new()
            .with_wheel_size(64)
            .with_tick_duration(Duration::from_millis(10))
            .with_thread_name_prefix("wheel");
        assert_eq!(config.thread_name(), "wheel[size=64,tick=10ms]");
    }
}

//! Host configuration
//!
//! One TOML file picks the device to run and carries its settings. Missing
//! sections and keys fall back to the defaults the devices ship with.

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use ego_devices::{MotionConfig, RangerConfig, RemoteConfig};
use ego_protocol::BUS_PORT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Invalid(String),
}

/// Which controller the host runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    #[default]
    Motion,
    Ranger,
    Remote,
}

/// UDP broadcast settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub port: u16,
    /// Local address to bind
    pub bind: IpAddr,
    /// Address datagrams are sent to
    pub broadcast: IpAddr,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: BUS_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            broadcast: IpAddr::V4(Ipv4Addr::BROADCAST),
        }
    }
}

/// Simulated hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Initial sensor reading, unset means no obstacle in sight
    pub range_mm: Option<u16>,
    /// Ticks a button stays down for a `press` command
    pub press_ticks: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            range_mm: None,
            press_ticks: 1,
        }
    }
}

/// Complete host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub device: DeviceKind,
    /// Tick period in milliseconds
    pub tick_ms: u64,
    /// Pretend the device hardware failed to come up
    pub setup_ok: bool,
    pub network: NetworkConfig,
    pub sim: SimConfig,
    pub motion: MotionConfig,
    pub ranger: RangerConfig,
    pub remote: RemoteConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            device: DeviceKind::Motion,
            tick_ms: 100,
            setup_ok: true,
            network: NetworkConfig::default(),
            sim: SimConfig::default(),
            motion: MotionConfig::default(),
            ranger: RangerConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

impl HostConfig {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: HostConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the devices cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        if self.network.port == 0 {
            return Err(ConfigError::Invalid("network.port must not be 0".into()));
        }
        let press = match self.device {
            DeviceKind::Motion => self.motion.press,
            DeviceKind::Ranger => self.ranger.press,
            DeviceKind::Remote => self.remote.press,
        };
        if press.long_ticks == 0 || press.double_gap_ticks == 0 {
            return Err(ConfigError::Invalid(
                "press timings must be at least one tick".into(),
            ));
        }
        if self.motion.collision_range_mm > self.motion.clear_range_mm {
            return Err(ConfigError::Invalid(format!(
                "motion.collision_range_mm ({}) exceeds motion.clear_range_mm ({})",
                self.motion.collision_range_mm, self.motion.clear_range_mm
            )));
        }
        if self.ranger.medium_mm >= self.ranger.far_mm {
            return Err(ConfigError::Invalid(format!(
                "ranger.medium_mm ({}) must be below ranger.far_mm ({})",
                self.ranger.medium_mm, self.ranger.far_mm
            )));
        }
        if !self.ranger.paused_blink.is_valid() {
            return Err(ConfigError::Invalid(
                "ranger.paused_blink needs non-zero on and off ticks".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ego_devices::{Arbitration, NetworkRole};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.network.port, 4839);
    }

    #[test]
    fn test_parse_motion_section() {
        let config = HostConfig::from_toml_str(
            r#"
            device = "motion"
            tick_ms = 50

            [motion]
            network = "access_point"
            arbitration = "layered"
            servo_trim = -12

            [motion.press]
            long_ticks = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.tick_ms, 50);
        assert_eq!(config.motion.network, NetworkRole::AccessPoint);
        assert_eq!(config.motion.arbitration, Arbitration::Layered);
        assert_eq!(config.motion.servo_trim, -12);
        assert_eq!(config.motion.press.long_ticks, 10);
        assert_eq!(config.motion.press.double_gap_ticks, 3);
        assert_eq!(config.motion.clear_range_mm, 300);
    }

    #[test]
    fn test_parse_ranger_and_sim() {
        let config = HostConfig::from_toml_str(
            r#"
            device = "ranger"
            setup_ok = false

            [sim]
            range_mm = 420

            [ranger.paused_blink]
            on_ticks = 2
            off_ticks = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.device, DeviceKind::Ranger);
        assert!(!config.setup_ok);
        assert_eq!(config.sim.range_mm, Some(420));
        assert_eq!(config.ranger.paused_blink.on_ticks, 2);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = HostConfig::from_toml_str(include_str!("../ego.toml")).unwrap();
        assert_eq!(config.device, DeviceKind::Motion);
        assert_eq!(config.sim.range_mm, Some(800));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            HostConfig::from_toml_str("tick_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            HostConfig::from_toml_str("[ranger]\nmedium_mm = 2000"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            HostConfig::from_toml_str("device = \"toaster\""),
            Err(ConfigError::Parse(_))
        ));
    }
}

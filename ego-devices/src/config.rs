//! Device configuration types
//!
//! Defaults reproduce the behavior of the deployed controllers running at
//! 10 Hz. All periods are counted in ticks.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the bus link is brought up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NetworkRole {
    /// Join an existing network and wait for the link
    #[default]
    Station,
    /// Host the network, the bus opens immediately
    AccessPoint,
}

/// Gesture timing for press recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PressTiming {
    /// Ticks a button must be held to count as a long press
    pub long_ticks: u16,
    /// Ticks after a release in which a second press makes a double press
    pub double_gap_ticks: u16,
}

impl Default for PressTiming {
    fn default() -> Self {
        Self {
            long_ticks: 8,
            double_gap_ticks: 3,
        }
    }
}

/// On/off period of a blinking LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlinkPattern {
    /// Ticks the LED is lit
    pub on_ticks: u32,
    /// Ticks the LED is dark
    pub off_ticks: u32,
}

impl BlinkPattern {
    pub const fn new(on_ticks: u32, off_ticks: u32) -> Self {
        Self {
            on_ticks,
            off_ticks,
        }
    }

    /// Check that a full cycle takes time
    pub const fn is_valid(&self) -> bool {
        self.on_ticks > 0 && self.off_ticks > 0
    }
}

/// Screen dimmer of the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DimmerConfig {
    /// Brightness while awake
    pub max_brightness: u8,
    /// Ticks without a wakeup before dimming starts
    pub awake_period: u32,
    /// Ticks per brightness step while dimming down
    pub step_period: u32,
}

/// Dimming stops at this brightness
pub const MIN_BRIGHTNESS: u8 = 7;

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            max_brightness: 10,
            awake_period: 50,
            step_period: 5,
        }
    }
}

/// Which press wins when local buttons and the remote act in the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Arbitration {
    /// A local button press suppresses the remote press of that tick
    #[default]
    Suppress,
    /// The remote press is applied on top of the local result
    Layered,
}

/// Drive unit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Bus bring-up
    pub network: NetworkRole,
    /// Intent arbitration policy
    pub arbitration: Arbitration,
    /// Button gesture timing
    pub press: PressTiming,
    /// Servo balance offset in microseconds
    pub servo_trim: i16,
    /// Auto mode drives forward while the range is above this
    pub clear_range_mm: u16,
    /// Manual mode stops a forward push below this range
    pub collision_range_mm: u16,
    /// Ticks of forward driving before the rotation direction flips
    pub rotation_toggle_ticks: u32,
    /// Forward speed in auto mode
    pub cruise_speed: i8,
    /// Rotation speed in auto mode
    pub rotate_speed: i8,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            network: NetworkRole::Station,
            arbitration: Arbitration::Suppress,
            press: PressTiming::default(),
            servo_trim: 0,
            clear_range_mm: 300,
            collision_range_mm: 80,
            rotation_toggle_ticks: 50,
            cruise_speed: 80,
            rotate_speed: 100,
        }
    }
}

/// Ranging unit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangerConfig {
    /// Bus bring-up
    pub network: NetworkRole,
    /// Button gesture timing
    pub press: PressTiming,
    /// Ranges above this show green
    pub far_mm: u16,
    /// Ranges above this show yellow, below red
    pub medium_mm: u16,
    /// White blink while ranging is paused
    pub paused_blink: BlinkPattern,
}

impl Default for RangerConfig {
    fn default() -> Self {
        Self {
            network: NetworkRole::Station,
            press: PressTiming::default(),
            far_mm: 1000,
            medium_mm: 300,
            paused_blink: BlinkPattern::new(5, 10),
        }
    }
}

/// Handheld remote configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemoteConfig {
    /// Bus bring-up
    pub network: NetworkRole,
    /// Button gesture timing
    pub press: PressTiming,
    /// Screen dimmer
    pub dimmer: DimmerConfig,
}

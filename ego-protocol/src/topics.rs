//! Topics and their payloads
//!
//! | topic    | id | payload                                    |
//! |----------|----|--------------------------------------------|
//! | RANGE    | 52 | u16 LE millimetres, `0xFFFF` = undefined   |
//! | JOYSTICK | 53 | x (i8), y (i8), button (u8, 0/1)           |
//! | INTENT   | 54 | STOP=0, START_MANU=1, START_AUTO=2, QUIT=3 |
//! | PRESS    | 55 | NO=0, SHORT=1, LONG=2, DOUBLE=3            |
//!
//! Payloads longer than a topic needs are accepted; the extra bytes are
//! ignored.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::datagram::{CodecError, Datagram, MAX_PAYLOAD_SIZE};

/// Range value meaning "no valid measurement"
pub const UNDEF_RANGE: u16 = 0xFFFF;

/// Known topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum Topic {
    /// Distance to the next obstacle
    Range = 52,
    /// Remote joystick position and button
    Joystick = 53,
    /// Operating intent of the drive unit
    Intent = 54,
    /// Button press gesture from the remote or ranger
    Press = 55,
}

impl Topic {
    /// Wire identifier
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Look up a topic by wire identifier
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            52 => Some(Topic::Range),
            53 => Some(Topic::Joystick),
            54 => Some(Topic::Intent),
            55 => Some(Topic::Press),
            _ => None,
        }
    }
}

/// A value that travels on a topic
pub trait Payload: Sized {
    /// Topic this payload is published on
    const TOPIC: Topic;

    /// Serialize into payload bytes
    fn to_bytes(&self) -> Vec<u8, MAX_PAYLOAD_SIZE>;

    /// Parse payload bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError>;

    /// Wrap into a datagram ready for broadcast
    fn to_datagram(&self) -> Datagram {
        Datagram {
            topic: Self::TOPIC.id(),
            payload: self.to_bytes(),
        }
    }
}

fn bytes_of(data: &[u8]) -> Vec<u8, MAX_PAYLOAD_SIZE> {
    // topic payloads are a few bytes, far below the datagram limit
    Vec::from_slice(data).unwrap_or_default()
}

/// Distance in millimetres, [`UNDEF_RANGE`] when unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Range(pub u16);

impl Range {
    /// No valid measurement
    pub const UNDEF: Range = Range(UNDEF_RANGE);

    /// Check if this is a real measurement
    pub const fn is_defined(self) -> bool {
        self.0 != UNDEF_RANGE
    }

    /// Millimetres, if defined
    pub const fn millimetres(self) -> Option<u16> {
        if self.is_defined() {
            Some(self.0)
        } else {
            None
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Range::UNDEF
    }
}

impl Payload for Range {
    const TOPIC: Topic = Topic::Range;

    fn to_bytes(&self) -> Vec<u8, MAX_PAYLOAD_SIZE> {
        bytes_of(&self.0.to_le_bytes())
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        match bytes {
            [lo, hi, ..] => Ok(Range(u16::from_le_bytes([*lo, *hi]))),
            _ => Err(CodecError::Truncated),
        }
    }
}

/// Joystick sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joystick {
    /// Left (-) / right (+)
    pub x: i8,
    /// Backward (-) / forward (+)
    pub y: i8,
    /// Stick pressed down
    pub button: bool,
}

impl Payload for Joystick {
    const TOPIC: Topic = Topic::Joystick;

    fn to_bytes(&self) -> Vec<u8, MAX_PAYLOAD_SIZE> {
        bytes_of(&[self.x as u8, self.y as u8, self.button as u8])
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        match bytes {
            [x, y, button, ..] => Ok(Joystick {
                x: *x as i8,
                y: *y as i8,
                button: *button != 0,
            }),
            _ => Err(CodecError::Truncated),
        }
    }
}

/// Operating intent of the drive unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Intent {
    /// Standing still, waiting for a start
    #[default]
    Stop = 0,
    /// Driving from the remote joystick
    StartManu = 1,
    /// Driving autonomously around obstacles
    StartAuto = 2,
    /// Shut down until reset
    Quit = 3,
}

impl TryFrom<u8> for Intent {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Intent::Stop),
            1 => Ok(Intent::StartManu),
            2 => Ok(Intent::StartAuto),
            3 => Ok(Intent::Quit),
            other => Err(CodecError::UnknownValue(other)),
        }
    }
}

impl Payload for Intent {
    const TOPIC: Topic = Topic::Intent;

    fn to_bytes(&self) -> Vec<u8, MAX_PAYLOAD_SIZE> {
        bytes_of(&[*self as u8])
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let first = bytes.first().ok_or(CodecError::Truncated)?;
        Intent::try_from(*first)
    }
}

/// Button gesture, valid for exactly one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Press {
    /// Nothing pressed
    #[default]
    No = 0,
    /// Pressed and released quickly
    Short = 1,
    /// Held down
    Long = 2,
    /// Two short presses in a row
    Double = 3,
}

impl Press {
    /// Check if any gesture was recognized
    pub const fn is_some(self) -> bool {
        !matches!(self, Press::No)
    }
}

impl TryFrom<u8> for Press {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Press::No),
            1 => Ok(Press::Short),
            2 => Ok(Press::Long),
            3 => Ok(Press::Double),
            other => Err(CodecError::UnknownValue(other)),
        }
    }
}

impl Payload for Press {
    const TOPIC: Topic = Topic::Press;

    fn to_bytes(&self) -> Vec<u8, MAX_PAYLOAD_SIZE> {
        bytes_of(&[*self as u8])
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let first = bytes.first().ok_or(CodecError::Truncated)?;
        Press::try_from(*first)
    }
}

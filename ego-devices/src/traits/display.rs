//! Screen trait and the views the remote draws

use super::light::Rgb;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Screen contents, one per remote state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Page {
    #[default]
    Blank,
    /// Setup failed
    Error,
    /// Waiting for the network
    Connecting,
    /// Drive unit stopped, shows the start gestures
    Stop,
    Manual,
    Auto,
    /// Drive unit shut down
    Quit,
}

impl Page {
    /// Text lines of the page, top to bottom
    pub fn lines(self) -> &'static [&'static str] {
        match self {
            Page::Blank => &[],
            Page::Error => &["ERROR"],
            Page::Connecting => &["CONNECTING"],
            Page::Stop => &["1x: Manual", "2x: Auto"],
            Page::Manual => &["MANUAL"],
            Page::Auto => &["AUTO"],
            Page::Quit => &["QUIT", "reset me!"],
        }
    }

    /// Background colour of the page
    pub fn background(self) -> Rgb {
        match self {
            Page::Error => Rgb::RED,
            Page::Blank => Rgb::BLACK,
            _ => Rgb::WHITE,
        }
    }
}

/// Everything drawn on the remote's screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenView {
    pub page: Page,
    /// Frame around the screen edge
    pub border: Option<Rgb>,
    /// Progress dot below the text
    pub spinner: Option<Rgb>,
}

impl ScreenView {
    /// Fresh page without border or spinner
    pub const fn page(page: Page) -> Self {
        Self {
            page,
            border: None,
            spinner: None,
        }
    }
}

/// Display with adjustable backlight
pub trait Screen {
    /// Push a complete view to the display
    fn draw(&mut self, view: &ScreenView);

    /// Set the backlight level
    fn set_brightness(&mut self, level: u8);
}

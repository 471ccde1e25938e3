//! Console commands
//!
//! A reader thread parses stdin lines into [`Command`]s and queues them on
//! [`COMMANDS`](crate::channels::COMMANDS). The device task turns button
//! commands into per-tick levels with a [`ButtonScript`].

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::str::{FromStr, SplitWhitespace};
use std::thread;

use thiserror::Error;
use tracing::{info, warn};

use crate::channels::COMMANDS;

/// Buttons across all devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Main,
    Red,
    Blue,
    A,
    B,
}

impl Button {
    const ALL: [Button; 5] = [Button::Main, Button::Red, Button::Blue, Button::A, Button::B];

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Button {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" | "m" => Ok(Button::Main),
            "red" | "r" => Ok(Button::Red),
            "blue" => Ok(Button::Blue),
            "a" => Ok(Button::A),
            "b" => Ok(Button::B),
            other => Err(CommandError::UnknownButton(other.to_string())),
        }
    }
}

/// Gesture or level change on a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Short,
    Long,
    Double,
    Hold,
    Release,
}

/// One console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Button(Button, Gesture),
    /// New sensor reading, `None` for nothing in sight
    Range(Option<u16>),
    Joystick { x: i8, y: i8 },
    /// Joystick button down for one tick
    Click,
    Link(bool),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("unknown button `{0}`")]
    UnknownButton(String),
    #[error("missing argument for `{0}`")]
    MissingArgument(&'static str),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
}

fn button(words: &mut SplitWhitespace<'_>, command: &'static str) -> Result<Button, CommandError> {
    words
        .next()
        .ok_or(CommandError::MissingArgument(command))?
        .parse()
}

fn number<T: FromStr>(word: Option<&str>, command: &'static str) -> Result<T, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(command))?;
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(CommandError::Empty)?;
        let command = match head {
            "press" | "p" => Command::Button(button(&mut words, "press")?, Gesture::Short),
            "long" | "l" => Command::Button(button(&mut words, "long")?, Gesture::Long),
            "double" | "d" => Command::Button(button(&mut words, "double")?, Gesture::Double),
            "hold" => Command::Button(button(&mut words, "hold")?, Gesture::Hold),
            "release" => Command::Button(button(&mut words, "release")?, Gesture::Release),
            "range" => match words.next() {
                Some("off") | Some("undef") => Command::Range(None),
                word => Command::Range(Some(number(word, "range")?)),
            },
            "joy" | "j" => Command::Joystick {
                x: number(words.next(), "joy")?,
                y: number(words.next(), "joy")?,
            },
            "click" => Command::Click,
            "link" => match words.next() {
                Some("up") => Command::Link(true),
                Some("down") => Command::Link(false),
                Some(other) => return Err(CommandError::Unknown(format!("link {other}"))),
                None => return Err(CommandError::MissingArgument("link")),
            },
            "quit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Per-tick button levels produced from gestures
#[derive(Debug, Default)]
pub struct ButtonScript {
    queued: [VecDeque<bool>; 5],
    held: [bool; 5],
}

impl ButtonScript {
    /// Queue the levels of `gesture`
    ///
    /// `press_ticks` is how long a short press is held, `long_ticks` the
    /// hold time the device needs to see a long press.
    pub fn push(&mut self, button: Button, gesture: Gesture, press_ticks: u16, long_ticks: u16) {
        let queue = &mut self.queued[button.index()];
        let mut down = |ticks: u16| {
            queue.extend((0..ticks.max(1)).map(|_| true));
            queue.push_back(false);
        };
        match gesture {
            Gesture::Short => down(press_ticks),
            Gesture::Long => down(long_ticks),
            Gesture::Double => {
                down(press_ticks);
                down(press_ticks);
            }
            Gesture::Hold => self.held[button.index()] = true,
            Gesture::Release => self.held[button.index()] = false,
        }
    }

    /// Levels of all buttons for the next tick
    pub fn next_levels(&mut self) -> ButtonLevels {
        let mut levels = [false; 5];
        for button in Button::ALL {
            let i = button.index();
            levels[i] = self.queued[i].pop_front().unwrap_or(self.held[i]);
        }
        ButtonLevels(levels)
    }
}

/// Button levels of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonLevels([bool; 5]);

impl ButtonLevels {
    pub fn get(&self, button: Button) -> bool {
        self.0[button.index()]
    }
}

/// Read commands from stdin on a background thread
pub fn spawn_reader() -> io::Result<()> {
    thread::Builder::new()
        .name("keyboard".into())
        .spawn(|| {
            info!("reading commands from stdin");
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(%err, "stdin closed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if COMMANDS.try_send(command).is_err() {
                            warn!(?command, "command queue full, dropping");
                        }
                    }
                    Err(err) => warn!(%err, "ignoring `{}`", line.trim()),
                }
            }
        })
        .map(|_| ())
}

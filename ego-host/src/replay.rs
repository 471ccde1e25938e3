//! Recording and offline replay
//!
//! A recording is a sequence of COBS framed postcard records: a header with
//! the host configuration, then one [`Sample`] per tick. Devices are
//! deterministic, so replaying the samples reproduces the outputs of the
//! recorded run.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::HostConfig;
use crate::device::{self, Outputs, Sample};

/// Bumped whenever [`Sample`] or the header changes shape
const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("recording I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed record: {0}")]
    Codec(#[from] postcard::Error),
    #[error("recording has no header")]
    Empty,
    #[error("recording format {found} is not supported (expected {FORMAT_VERSION})")]
    Version { found: u8 },
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    version: u8,
    config: HostConfig,
}

/// Writes samples as they are taken
pub struct Recorder<W: Write> {
    out: W,
    samples: u64,
}

impl Recorder<BufWriter<File>> {
    pub fn create(path: &Path, config: &HostConfig) -> Result<Self, ReplayError> {
        Recorder::new(BufWriter::new(File::create(path)?), config)
    }
}

impl<W: Write> Recorder<W> {
    pub fn new(mut out: W, config: &HostConfig) -> Result<Self, ReplayError> {
        let header = Header {
            version: FORMAT_VERSION,
            config: config.clone(),
        };
        out.write_all(&postcard::to_allocvec_cobs(&header)?)?;
        Ok(Self { out, samples: 0 })
    }

    pub fn record(&mut self, sample: &Sample) -> Result<(), ReplayError> {
        self.out.write_all(&postcard::to_allocvec_cobs(sample)?)?;
        self.samples += 1;
        // flushed every tick so an interrupted run keeps its recording
        self.out.flush()?;
        Ok(())
    }

    /// Samples written so far
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// A recorded run
#[derive(Debug)]
pub struct Recording {
    pub config: HostConfig,
    pub samples: Vec<Sample>,
}

impl Recording {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        Self::from_bytes(fs::read(path)?)
    }

    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, ReplayError> {
        let mut records = bytes.split_mut(|b| *b == 0).filter(|r| !r.is_empty());
        let header: Header = postcard::from_bytes_cobs(records.next().ok_or(ReplayError::Empty)?)?;
        if header.version != FORMAT_VERSION {
            return Err(ReplayError::Version {
                found: header.version,
            });
        }
        let samples = records
            .map(|record| postcard::from_bytes_cobs(record))
            .collect::<Result<Vec<Sample>, _>>()?;
        Ok(Self {
            config: header.config,
            samples,
        })
    }

    /// Run the recorded samples through a fresh device
    pub fn replay(&self) -> Vec<Outputs> {
        let mut device = device::build(&self.config);
        self.samples
            .iter()
            .map(|sample| device.step(sample.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceKind;
    use ego_protocol::{Intent, Payload, Press};

    fn remote_run() -> (HostConfig, Vec<Sample>) {
        let config = HostConfig {
            device: DeviceKind::Remote,
            ..HostConfig::default()
        };
        let mut samples = vec![Sample::default()];
        for tick in 0..40 {
            let mut sample = Sample {
                link_up: true,
                button_a: (3..5).contains(&tick),
                ..Sample::default()
            };
            if tick == 10 {
                let frame = Intent::StartManu.to_datagram().encode_to_vec();
                sample.frames.push(frame).unwrap();
            }
            samples.push(sample);
        }
        (config, samples)
    }

    #[test]
    fn test_record_then_load() {
        let (config, samples) = remote_run();
        let mut recorder = Recorder::new(Vec::new(), &config).unwrap();
        for sample in &samples {
            recorder.record(sample).unwrap();
        }
        assert_eq!(recorder.samples(), samples.len() as u64);

        let recording = Recording::from_bytes(recorder.into_inner()).unwrap();
        assert_eq!(recording.config, config);
        assert_eq!(recording.samples, samples);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let (config, samples) = remote_run();
        let recording = Recording { config, samples };
        let first = recording.replay();
        let second = recording.replay();
        assert_eq!(first, second);

        let presses: Vec<_> = first
            .iter()
            .flat_map(|out| out.publishes().iter())
            .filter_map(|d| Press::from_bytes(&d.payload).ok().filter(|_| d.topic == Press::TOPIC.id()))
            .collect();
        assert_eq!(presses, [Press::No, Press::Short, Press::No]);
    }

    #[test]
    fn test_rejects_other_versions() {
        let header = Header {
            version: FORMAT_VERSION + 1,
            config: HostConfig::default(),
        };
        let bytes = postcard::to_allocvec_cobs(&header).unwrap();
        assert!(matches!(
            Recording::from_bytes(bytes),
            Err(ReplayError::Version { .. })
        ));
        assert!(matches!(
            Recording::from_bytes(Vec::new()),
            Err(ReplayError::Empty)
        ));
    }
}

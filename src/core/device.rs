//! Ballbar device interface

use crate::entities::RawSample;

/// Source of raw ballbar readings
///
/// Real adapters own their transport and any retry policy; the collector only
/// sees the finished list of samples.
pub trait BallbarDevice {
    fn read_samples(&mut self) -> Vec<RawSample>;
}

/// Stand-in device returning a fixed circular test
#[derive(Debug, Clone, Default)]
pub struct SampleDevice;

impl BallbarDevice for SampleDevice {
    fn read_samples(&mut self) -> Vec<RawSample> {
        vec![
            RawSample::new("XY", 0.0, 150.0, 149.98),
            RawSample::new("XY", 90.0, 150.0, 150.02),
            RawSample::new("XY", 180.0, 150.0, 149.97),
        ]
    }
}

/// Device replaying a caller-supplied list of samples
#[derive(Debug, Clone, Default)]
pub struct ReplayDevice {
    samples: Vec<RawSample>,
}

impl ReplayDevice {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self { samples }
    }
}

impl BallbarDevice for ReplayDevice {
    fn read_samples(&mut self) -> Vec<RawSample> {
        self.samples.clone()
    }
}

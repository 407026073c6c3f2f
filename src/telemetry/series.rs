use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use super::event::DeviceId;

pub const DEFAULT_CAPACITY: usize = 300;

/// One plotted point: shared sample index on the x-axis, weight in kg on the y-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub index: u64,
    pub weight: f64,
}

/// Fixed-capacity FIFO of samples for one device.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    capacity: usize,
    points: VecDeque<Sample>,
}

impl SampleSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a sample, evicting the single oldest one first when full.
    pub fn push(&mut self, sample: Sample) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<Sample> {
        self.points.back().copied()
    }

    /// Owned copy in arrival order, detached from further mutation.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.points.iter().copied().collect()
    }
}

/// Per-device series sharing one monotonic sample counter.
///
/// The counter advances once per weight sample from any device so both series
/// stay roughly aligned on a common x-axis.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    series: BTreeMap<DeviceId, SampleSeries>,
    sample_counter: u64,
}

impl SeriesBuffer {
    pub fn new<I>(devices: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = DeviceId>,
    {
        let series = devices
            .into_iter()
            .map(|device| (device, SampleSeries::with_capacity(capacity)))
            .collect();
        Self {
            series,
            sample_counter: 0,
        }
    }

    /// Appends at an explicit index. Unknown devices are ignored.
    pub fn append(&mut self, device: DeviceId, sample_index: u64, weight: f64) {
        match self.series.get_mut(&device) {
            Some(series) => series.push(Sample {
                index: sample_index,
                weight,
            }),
            None => debug!("Dropping sample for unknown device {}", device),
        }
    }

    /// Advances the shared counter and appends at the new index.
    ///
    /// Returns the index assigned to the sample.
    pub fn record(&mut self, device: DeviceId, weight: f64) -> u64 {
        self.sample_counter += 1;
        let index = self.sample_counter;
        self.append(device, index, weight);
        index
    }

    pub fn snapshot(&self, device: DeviceId) -> Vec<Sample> {
        self.series
            .get(&device)
            .map(SampleSeries::snapshot)
            .unwrap_or_default()
    }

    pub fn sample_counter(&self) -> u64 {
        self.sample_counter
    }
}

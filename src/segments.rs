//! Split a track into speed-banded polyline segments for map rendering
//!
//! Bands are quartiles of the speed range observed *so far* in a single
//! forward pass, so early points are classified against a narrower range than
//! later ones.

use crate::models::{GeoPoint, GpsSample, SpeedBand, SpeedBandSegment};

/// Band of `speed_mph` within the `[min_mph, max_mph]` range
pub fn classify_speed(min_mph: f64, max_mph: f64, speed_mph: f64) -> SpeedBand {
    let range = max_mph - min_mph;
    if speed_mph < min_mph + range * 0.25 {
        SpeedBand::Slowest
    } else if speed_mph < min_mph + range * 0.5 {
        SpeedBand::Slow
    } else if speed_mph < min_mph + range * 0.75 {
        SpeedBand::Fast
    } else {
        SpeedBand::Fastest
    }
}

/// Online speed-band segmenter.
///
/// Points can be pushed one at a time while a workout is in progress, or a
/// whole track can be run through [`SpeedBandSegmenter::segment`].
#[derive(Debug, Clone)]
pub struct SpeedBandSegmenter {
    min_mph: f64,
    max_mph: f64,
    current_band: Option<SpeedBand>,
    open: Vec<GeoPoint>,
    finished: Vec<SpeedBandSegment>,
}

impl SpeedBandSegmenter {
    pub fn new() -> Self {
        Self {
            min_mph: f64::INFINITY,
            max_mph: f64::NEG_INFINITY,
            current_band: None,
            open: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Segment a complete track
    pub fn segment(samples: &[GpsSample]) -> Vec<SpeedBandSegment> {
        let mut segmenter = Self::new();
        for sample in samples {
            segmenter.push(sample);
        }
        segmenter.finish()
    }

    /// Classify one point and extend, close or restart the open segment
    pub fn push(&mut self, sample: &GpsSample) -> SpeedBand {
        let speed_mph = sample.speed_mph();
        self.min_mph = self.min_mph.min(speed_mph);
        self.max_mph = self.max_mph.max(speed_mph);

        let band = classify_speed(self.min_mph, self.max_mph, speed_mph);

        if let Some(previous) = self.current_band {
            if previous != band {
                self.close_open_segment(previous);
            }
        }

        self.open.push(sample.point());
        self.current_band = Some(band);
        band
    }

    /// Segments closed so far, not counting the one still being built
    pub fn completed(&self) -> &[SpeedBandSegment] {
        &self.finished
    }

    /// Flush the open segment and return every segment in track order
    pub fn finish(mut self) -> Vec<SpeedBandSegment> {
        if let Some(band) = self.current_band {
            self.close_open_segment(band);
        }
        self.finished
    }

    // Single points would render as degenerate polylines, so they are dropped
    fn close_open_segment(&mut self, band: SpeedBand) {
        let points = std::mem::take(&mut self.open);
        if points.len() >= 2 {
            self.finished.push(SpeedBandSegment { band, points });
        }
    }
}

impl Default for SpeedBandSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

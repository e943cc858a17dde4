//! Gain automation: scheduled gain curves for a single voice.
//!
//! Points are evaluated the way an audio-parameter timeline is: a `Set`
//! jumps at its time, ramps interpolate from the previous point's value and
//! time to their own end value and end time. After the last point the final
//! value holds.

/// One point on a gain timeline. All times are absolute, in seconds on the
/// audio clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainPoint {
    /// Jump to `value` at `at`.
    Set { value: f64, at: f64 },
    /// Linear ramp from the previous point to `value`, arriving at `end`.
    LinearRamp { value: f64, end: f64 },
    /// Exponential ramp from the previous point to `value`, arriving at `end`.
    ExponentialRamp { value: f64, end: f64 },
}

impl GainPoint {
    /// The time at which this point's value is reached.
    pub fn time(&self) -> f64 {
        match *self {
            GainPoint::Set { at, .. } => at,
            GainPoint::LinearRamp { end, .. } | GainPoint::ExponentialRamp { end, .. } => end,
        }
    }

    /// The value reached at [`time`](GainPoint::time).
    pub fn value(&self) -> f64 {
        match *self {
            GainPoint::Set { value, .. }
            | GainPoint::LinearRamp { value, .. }
            | GainPoint::ExponentialRamp { value, .. } => value,
        }
    }
}

/// A time-ordered gain curve.
#[derive(Debug, Clone, PartialEq)]
pub struct GainAutomation {
    initial: f64,
    points: Vec<GainPoint>,
}

impl GainAutomation {
    /// Create an automation that holds `initial` until the first point.
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            points: Vec::new(),
        }
    }

    /// Insert a point, keeping the timeline sorted. Points with equal times
    /// keep their insertion order.
    pub fn push(&mut self, point: GainPoint) {
        let idx = self.points.partition_point(|p| p.time() <= point.time());
        self.points.insert(idx, point);
    }

    /// Scheduled points, in time order.
    pub fn points(&self) -> &[GainPoint] {
        &self.points
    }

    /// Highest scheduled value, or the initial value when nothing is
    /// scheduled.
    pub fn peak(&self) -> f64 {
        self.points
            .iter()
            .map(GainPoint::value)
            .reduce(f64::max)
            .unwrap_or(self.initial)
    }

    /// Gain at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        let mut prev_value = self.initial;
        let mut prev_time = 0.0;

        for point in &self.points {
            let time = point.time();
            if t < time {
                return match *point {
                    GainPoint::Set { .. } => prev_value,
                    GainPoint::LinearRamp { value, end } => {
                        let span = end - prev_time;
                        if span <= 0.0 {
                            value
                        } else {
                            let frac = ((t - prev_time) / span).clamp(0.0, 1.0);
                            prev_value + (value - prev_value) * frac
                        }
                    }
                    GainPoint::ExponentialRamp { value, end } => {
                        // A ramp from zero, or across zero, holds the start value.
                        if prev_value == 0.0 || prev_value.signum() != value.signum() {
                            prev_value
                        } else {
                            let span = end - prev_time;
                            if span <= 0.0 {
                                value
                            } else {
                                let frac = ((t - prev_time) / span).clamp(0.0, 1.0);
                                prev_value * (value / prev_value).powf(frac)
                            }
                        }
                    }
                };
            }
            prev_value = point.value();
            prev_time = time;
        }

        prev_value
    }
}

impl Default for GainAutomation {
    fn default() -> Self {
        Self::new(1.0)
    }
}

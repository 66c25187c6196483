//! Interpolated delay line.
//!
//! | Effect | Delay Range | Modulation |
//! |--------|-------------|------------|
//! | Flanger | 1-6ms | LFO |
//! | Chorus | 15-20ms | LFO |
//! | Echo/Delay | 1ms-5s | None |

/// Interpolation method for fractional delay reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Linear interpolation between two samples.
    #[default]
    Linear,
    /// 4-point cubic interpolation, smoother for swept delays.
    Cubic,
}

/// Heap-allocated circular delay line with fractional reads.
///
/// `read(0.0)` returns the most recently written sample.
///
/// ```rust
/// use cadenza_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(8);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    interpolation: Interpolation,
}

impl InterpolatedDelay {
    /// Creates a delay line holding `max_delay_samples` samples.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");

        Self {
            buffer: vec![0.0; max_delay_samples],
            write_pos: 0,
            interpolation: Interpolation::Linear,
        }
    }

    /// Creates a delay line long enough for `max_seconds` at `sample_rate`.
    pub fn from_time(sample_rate: f32, max_seconds: f32) -> Self {
        Self::new((sample_rate * max_seconds) as usize + 1)
    }

    /// Selects the interpolation used by [`read`](Self::read).
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Reads `delay_samples` behind the last write, clamped to the capacity.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        debug_assert!(delay_samples >= 0.0);

        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);
        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        // Slot holding the sample written `delay_int` writes ago.
        let pos = (self.write_pos + len - delay_int - 1) % len;
        let older = (pos + len - 1) % len;

        match self.interpolation {
            Interpolation::Linear => {
                let a = self.buffer[pos];
                a + (self.buffer[older] - a) * frac
            }
            Interpolation::Cubic => {
                let y0 = self.buffer[(pos + 1) % len];
                let y1 = self.buffer[pos];
                let y2 = self.buffer[older];
                let y3 = self.buffer[(pos + len - 2) % len];

                let a0 = y3 - y2 - y0 + y1;
                let a1 = y0 - y1 - a0;
                let a2 = y2 - y0;
                ((a0 * frac + a1) * frac + a2) * frac + y1
            }
        }
    }

    /// Writes one sample and advances.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zeroes the line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Linear mapping from a data domain to a pixel range for one axis.
///
/// The range may be inverted (`range.0 > range.1`), which is how the y axis
/// puts larger values at the top of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleMapping {
    domain: (f64, f64),
    range: (f64, f64),
}

impl ScaleMapping {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidDomain(
                "scale domain must be finite".to_owned(),
            ));
        }
        if domain.0 > domain.1 {
            return Err(ChartError::InvalidDomain(format!(
                "scale domain min {} exceeds max {}",
                domain.0, domain.1
            )));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }
        Ok(Self { domain, range })
    }

    /// Fits a padded domain to `values` and maps it onto `range`.
    ///
    /// `values` must be non-empty and finite. The domain is
    /// `[min * padding_low, max * padding_high]`, with `padding_low` in
    /// `(0, 1]` and `padding_high >= 1`. For a negative extremum the factor is
    /// mirrored around 1 so padding always widens the domain.
    pub fn fit<I>(
        values: I,
        range: (f64, f64),
        padding_low: f64,
        padding_high: f64,
    ) -> ChartResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        validate_padding(padding_low, padding_high)?;
        let (min, max) = extent(values)?;
        Self::new(padded_extent(min, max, padding_low, padding_high), range)
    }

    /// Pixel-for-pixel mapping over the exact extent of `values`.
    ///
    /// Used in pack mode, where coordinates are already laid out in pixels.
    pub fn identity_over<I>(values: I) -> ChartResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let extent = extent(values)?;
        Self::new(extent, extent)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    /// Maps a domain value to a pixel. A zero-width domain maps everything to
    /// the middle of the range.
    #[must_use]
    pub fn map(self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        let normalized = if span == 0.0 {
            0.5
        } else {
            (value - self.domain.0) / span
        };
        self.range.0 + normalized * (self.range.1 - self.range.0)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            return self.domain.0;
        }
        let normalized = (pixel - self.range.0) / span;
        self.domain.0 + normalized * (self.domain.1 - self.domain.0)
    }

    /// Human-friendly tick values (1/2/5 multiples of a power of ten)
    /// covering the domain, roughly `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        let (start, stop) = self.domain;
        if start == stop {
            return vec![start];
        }
        let Some(spec) = tick_spec(start, stop, count as f64) else {
            return Vec::new();
        };
        (spec.first..=spec.last)
            .map(|index| spec.value_at(index))
            .collect()
    }

    /// Distance between consecutive ticks for `count`, used to pick label
    /// precision.
    #[must_use]
    pub fn tick_step(self, count: usize) -> Option<f64> {
        let (start, stop) = self.domain;
        tick_spec(start, stop, count as f64).map(|spec| spec.step())
    }
}

pub(crate) fn validate_padding(padding_low: f64, padding_high: f64) -> ChartResult<()> {
    if !padding_low.is_finite() || padding_low <= 0.0 || padding_low > 1.0 {
        return Err(ChartError::InvalidConfig(format!(
            "low padding factor must be in (0, 1], got {padding_low}"
        )));
    }
    if !padding_high.is_finite() || padding_high < 1.0 {
        return Err(ChartError::InvalidConfig(format!(
            "high padding factor must be finite and >= 1, got {padding_high}"
        )));
    }
    Ok(())
}

fn extent<I>(values: I) -> ChartResult<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut bounds: Option<(f64, f64)> = None;
    for value in values {
        if !value.is_finite() {
            return Err(ChartError::InvalidDomain(format!(
                "scale input contains non-finite value {value}"
            )));
        }
        bounds = Some(match bounds {
            None => (value, value),
            Some((min, max)) => (min.min(value), max.max(value)),
        });
    }
    bounds.ok_or_else(|| ChartError::InvalidDomain("scale input is empty".to_owned()))
}

fn padded_extent(min: f64, max: f64, padding_low: f64, padding_high: f64) -> (f64, f64) {
    let low = if min >= 0.0 {
        min * padding_low
    } else {
        min * (2.0 - padding_low)
    };
    let high = if max >= 0.0 {
        max * padding_high
    } else {
        max * (2.0 - padding_high)
    };
    (low, high)
}

#[derive(Debug, Clone, Copy)]
struct TickSpec {
    first: i64,
    last: i64,
    /// Positive: step size. Negative: reciprocal of the step size, which
    /// keeps sub-unit ticks free of accumulated float error.
    increment: f64,
}

impl TickSpec {
    fn value_at(self, index: i64) -> f64 {
        if self.increment < 0.0 {
            index as f64 / -self.increment
        } else {
            index as f64 * self.increment
        }
    }

    fn step(self) -> f64 {
        if self.increment < 0.0 {
            1.0 / -self.increment
        } else {
            self.increment
        }
    }
}

const MAX_TICKS_PER_REQUESTED: f64 = 4.0;
const MAX_TICKS: f64 = 100_000.0;

fn tick_spec(start: f64, stop: f64, count: f64) -> Option<TickSpec> {
    if !start.is_finite() || !stop.is_finite() || count <= 0.0 || start >= stop {
        return None;
    }

    let raw_step = (stop - start) / count;
    let power = raw_step.log10().floor();
    let error = raw_step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let (mut first, mut last, increment);
    if power < 0.0 {
        let inverse = 10f64.powf(-power) / factor;
        first = (start * inverse).round();
        last = (stop * inverse).round();
        if first / inverse < start {
            first += 1.0;
        }
        if last / inverse > stop {
            last -= 1.0;
        }
        increment = -inverse;
    } else {
        let step = 10f64.powf(power) * factor;
        first = (start / step).round();
        last = (stop / step).round();
        if first * step < start {
            first += 1.0;
        }
        if last * step > stop {
            last -= 1.0;
        }
        increment = step;
    }

    if !first.is_finite() || !last.is_finite() || !increment.is_finite() {
        return None;
    }
    if last < first {
        if (0.5..2.0).contains(&count) {
            return tick_spec(start, stop, count * 2.0);
        }
        return None;
    }

    // A 1/2/5 step never yields more than a few ticks per requested one.
    if last - first > (count * MAX_TICKS_PER_REQUESTED).min(MAX_TICKS) {
        return None;
    }

    Some(TickSpec {
        first: first as i64,
        last: last as i64,
        increment,
    })
}

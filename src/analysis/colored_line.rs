//! Builds multi-segment lines whose color varies along the line.
//!
//! A forecast run is drawn as consecutive segments; each segment carries a
//! value that a chart maps to a color intensity. The recency scale makes the
//! first days of a run (the nearest forecasts) the most intense.

/// Linear mapping of values onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Spans the smallest to largest value; `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let (vmin, vmax) = values
            .iter()
            .fold((first, first), |(low, high), &v| (low.min(v), high.max(v)));
        Some(Self { vmin, vmax })
    }

    /// Maps `value` linearly; a degenerate range maps everything to zero.
    /// Values outside the range are not clipped.
    pub fn apply(&self, value: f64) -> f64 {
        let range = self.vmax - self.vmin;
        if range == 0.0 {
            0.0
        } else {
            (value - self.vmin) / range
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Raw color value, before normalization.
    pub value: f64,
}

/// Segments of one line together with the normalization of their values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColoredLine {
    segments: Vec<Segment>,
    norm: Normalize,
}

impl ColoredLine {
    /// Joins consecutive points `(x[i], y[i])` and `(x[i + 1], y[i + 1])`,
    /// giving segment `i` the color value `c[i]`.
    ///
    /// The number of segments is bounded by the shortest input. A missing `y`
    /// value breaks the line: both segments touching it are left out. Without
    /// an explicit `norm`, the values in `c` set the range.
    pub fn new(x: &[f64], y: &[Option<f64>], c: &[f64], norm: Option<Normalize>) -> Self {
        let segments: Vec<Segment> = x
            .windows(2)
            .zip(y.windows(2))
            .zip(c)
            .filter_map(|((xs, ys), &value)| match (ys[0], ys[1]) {
                (Some(y0), Some(y1)) => Some(Segment {
                    start: (xs[0], y0),
                    end: (xs[1], y1),
                    value,
                }),
                _ => None,
            })
            .collect();

        let norm = norm
            .or_else(|| Normalize::from_values(c))
            .unwrap_or(Normalize::new(0.0, 1.0));
        Self { segments, norm }
    }

    /// A line colored by [`recency_scale`] and normalized by [`recency_norm`].
    pub fn fading(x: &[f64], y: &[Option<f64>], divisor: i64) -> Self {
        let n = x.len().min(y.len());
        Self::new(x, y, &recency_scale(n), Some(recency_norm(n, divisor)))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn norm(&self) -> Normalize {
        self.norm
    }

    /// Normalized color value per segment.
    pub fn intensities(&self) -> Vec<f64> {
        self.segments
            .iter()
            .map(|segment| self.norm.apply(segment.value))
            .collect()
    }
}

/// Color values `n, n - 1, ..., 2`, one per segment of an `n`-point line.
pub fn recency_scale(n: usize) -> Vec<f64> {
    (0..n.saturating_sub(1)).map(|i| (n - i) as f64).collect()
}

/// Normalization from `floor(-n / divisor)` to `n`. The negative lower bound
/// keeps the oldest segments visible.
pub fn recency_norm(n: usize, divisor: i64) -> Normalize {
    let n = n as i64;
    let vmin = (-n).div_euclid(divisor.max(1));
    Normalize::new(vmin as f64, n as f64)
}

/// Quantizes a normalized intensity into one of `levels` shades.
pub fn shade_level(intensity: f64, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    let level = (intensity * levels as f64).floor();
    if level.is_nan() || level < 0.0 {
        0
    } else {
        (level as usize).min(levels - 1)
    }
}

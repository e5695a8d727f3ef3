// Choropleth classification and the sequential blue palette shared by the
// map legend and the national-average gauge.
use crate::pipeline::YearView;

/// Anchor colours of the sequential "Blues" ramp, lightest first.
const BLUES: [(u8, u8, u8); 9] = [
    (0xf7, 0xfb, 0xff),
    (0xde, 0xeb, 0xf7),
    (0xc6, 0xdb, 0xef),
    (0x9e, 0xca, 0xe1),
    (0x6b, 0xae, 0xd6),
    (0x42, 0x92, 0xc6),
    (0x21, 0x71, 0xb5),
    (0x08, 0x51, 0x9c),
    (0x08, 0x30, 0x6b),
];

/// Natural-breaks (Jenks) classification.
///
/// Returns the upper bound of each class in ascending order; the last bound
/// is the maximum value. With `k` or fewer distinct values every distinct
/// value becomes its own class. Non-finite values are ignored.
pub fn natural_breaks(values: &[f64], k: usize) -> Vec<f64> {
    let mut data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() || k == 0 {
        return Vec::new();
    }
    data.sort_by(f64::total_cmp);

    let mut distinct = data.clone();
    distinct.dedup();
    if distinct.len() <= k {
        return distinct;
    }

    let n = data.len();
    // 1-based tables: lower[l][j] is the first element of class j when the
    // first l values are split into j classes; variance holds the matching
    // within-class sum of squared deviations.
    let mut lower = vec![vec![0usize; k + 1]; n + 1];
    let mut variance = vec![vec![f64::INFINITY; k + 1]; n + 1];
    for j in 1..=k {
        lower[1][j] = 1;
        variance[1][j] = 0.0;
    }

    for l in 2..=n {
        let (mut sum, mut sum_sq, mut count) = (0.0, 0.0, 0.0);
        let mut within = 0.0;
        for m in 1..=l {
            let first = l - m + 1;
            let value = data[first - 1];
            count += 1.0;
            sum += value;
            sum_sq += value * value;
            within = sum_sq - (sum * sum) / count;
            let prev = first - 1;
            if prev != 0 {
                // j - 1 classes need at least j - 1 values before `first`
                for j in 2..=k.min(prev + 1) {
                    let candidate = within + variance[prev][j - 1];
                    if variance[l][j] >= candidate {
                        lower[l][j] = first;
                        variance[l][j] = candidate;
                    }
                }
            }
        }
        lower[l][1] = 1;
        variance[l][1] = within;
    }

    let mut breaks = vec![data[n - 1]];
    let mut end = n;
    for j in (2..=k).rev() {
        let first = lower[end][j];
        if first < 2 {
            break;
        }
        breaks.push(data[first - 2]);
        end = first - 1;
    }
    breaks.reverse();
    breaks.dedup();
    breaks
}

/// Zero-based class of `value` given the upper bounds from
/// [`natural_breaks`]. Values above the last bound land in the last class.
pub fn class_of(value: f64, breaks: &[f64]) -> usize {
    breaks
        .iter()
        .position(|upper| value <= *upper)
        .unwrap_or_else(|| breaks.len().saturating_sub(1))
}

/// Scale `value` into `0.0..=1.0` against the year's range. A flat range
/// maps everything to 0.0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return 0.0;
    }
    ((value - min) / range).clamp(0.0, 1.0)
}

/// Hex colour at position `t` (0.0 lightest, 1.0 darkest) on the ramp.
pub fn blues_hex(t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (BLUES.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = scaled - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r0, g0, b0) = BLUES[lo];
    let (r1, g1, b1) = BLUES[hi];
    format!("#{:02x}{:02x}{:02x}", mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// Colour for class `class` out of `classes`, spread evenly over the ramp.
pub fn class_color(class: usize, classes: usize) -> String {
    if classes <= 1 {
        return blues_hex(1.0);
    }
    blues_hex(class as f64 / (classes - 1) as f64)
}

/// Colour of the centre label text.
pub fn label_color(norm: f64) -> &'static str {
    if norm > 0.5 {
        "blue"
    } else {
        "black"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub value: f64,
    pub fill: String,
    pub label: &'static str,
}

/// Donut fill and label colours for the national mean of a year.
pub fn gauge(view: &YearView) -> Option<Gauge> {
    let value = view.national_mean?;
    let norm = normalize(value, view.min?, view.max?);
    Some(Gauge {
        value,
        fill: blues_hex(norm),
        label: label_color(norm),
    })
}

/// Class assignment of every row in a year slice.
#[derive(Debug, Clone)]
pub struct MapClasses {
    pub breaks: Vec<f64>,
    /// Parallel to the slice the classes were computed from.
    pub assignments: Vec<usize>,
}

impl MapClasses {
    pub fn count_in(&self, class: usize) -> usize {
        self.assignments.iter().filter(|c| **c == class).count()
    }
}

pub fn classify_year(view: &YearView, k: usize) -> MapClasses {
    let values: Vec<f64> = view.slice.iter().map(|r| r.rainfall_mm).collect();
    let breaks = natural_breaks(&values, k);
    let assignments = values.iter().map(|v| class_of(*v, &breaks)).collect();
    MapClasses {
        breaks,
        assignments,
    }
}

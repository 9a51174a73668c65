//! Fallback fills applied after the correlation pass

use chrono::{DateTime, FixedOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FallbackMethod {
    Time,
    ForwardFill,
    BackwardFill,
}

impl FallbackMethod {
    /// Order in which fallbacks are tried.
    pub const ORDER: [FallbackMethod; 3] = [
        FallbackMethod::Time,
        FallbackMethod::ForwardFill,
        FallbackMethod::BackwardFill,
    ];

    pub fn apply(
        self,
        datetime: &[DateTime<FixedOffset>],
        values: &[Option<f64>],
    ) -> Vec<Option<f64>> {
        match self {
            FallbackMethod::Time => time_interpolate(datetime, values),
            FallbackMethod::ForwardFill => forward_fill(values),
            FallbackMethod::BackwardFill => backward_fill(values),
        }
    }
}

/// Linear interpolation weighted by elapsed time between the surrounding
/// known values. Leading and trailing gaps take the nearest known value.
pub fn time_interpolate(
    datetime: &[DateTime<FixedOffset>],
    values: &[Option<f64>],
) -> Vec<Option<f64>> {
    let n = values.len();
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut next: Vec<Option<usize>> = vec![None; n];

    let mut last = None;
    for i in 0..n {
        if values[i].is_some() {
            last = Some(i);
        }
        prev[i] = last;
    }
    last = None;
    for i in (0..n).rev() {
        if values[i].is_some() {
            last = Some(i);
        }
        next[i] = last;
    }

    (0..n)
        .map(|i| {
            if values[i].is_some() {
                return values[i];
            }
            match (prev[i], next[i]) {
                (Some(a), Some(b)) => {
                    let (va, vb) = (values[a]?, values[b]?);
                    let span = (datetime[b] - datetime[a]).num_seconds() as f64;
                    if span <= 0.0 {
                        return Some(va);
                    }
                    let t = (datetime[i] - datetime[a]).num_seconds() as f64 / span;
                    Some(va + (vb - va) * t)
                }
                (Some(a), None) => values[a],
                (None, Some(b)) => values[b],
                (None, None) => None,
            }
        })
        .collect()
}

pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|v| {
            if v.is_some() {
                last = *v;
            }
            last
        })
        .collect()
}

pub fn backward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = forward_fill(&values.iter().rev().copied().collect::<Vec<_>>());
    out.reverse();
    out
}

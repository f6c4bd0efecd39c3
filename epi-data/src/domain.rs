use serde::Serialize;

/// The value range a chart axis spans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueDomain {
    pub lower: f64,
    pub upper: f64,
}

impl ValueDomain {
    pub fn new(lower: f64, upper: f64) -> ValueDomain {
        ValueDomain { lower, upper }
    }
}

/// Smallest and largest finite value, or `None` if there are none.
pub fn finite_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |extent, v| match extent {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::finite_extent;

    #[test]
    fn test_finite_extent_skips_nan_and_infinity() {
        let extent = finite_extent(vec![3.0, f64::NAN, -2.0, f64::INFINITY, 7.5]);
        assert_eq!(extent, Some((-2.0, 7.5)));
        assert_eq!(finite_extent(vec![f64::NAN]), None);
        assert_eq!(finite_extent(Vec::new()), None);
    }
}

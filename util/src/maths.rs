//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

/// Whether `value` lies within the closed interval `[min, max]`.
pub fn in_closed_range<T>(value: T, min: T, max: T) -> bool
where
    T: Float
{
    value >= min && value <= max
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 10f64), 0f64), 5f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 10f64), 1f64), 10f64);
        assert_eq!(lin_map((0f64, 1f64), (-90f64, -70f64), 0.5f64), -80f64);
    }

    #[test]
    fn test_in_closed_range() {
        assert!(in_closed_range(-90f64, -90f64, -70f64));
        assert!(in_closed_range(-70f64, -90f64, -70f64));
        assert!(!in_closed_range(-69.9f64, -90f64, -70f64));
        assert!(!in_closed_range(f64::NAN, -90f64, -70f64));
    }
}

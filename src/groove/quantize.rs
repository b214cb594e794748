// Step Quantization - Maps absolute time onto the fixed-rate step grid
// Floor semantics: a time exactly on a step boundary belongs to the step starting there

/// Quantize a time in seconds to a step index
///
/// `step_index = floor(time_seconds / step_duration)`. Negative times yield
/// negative indices; bounds checking against a grid is the caller's job.
pub fn quantize(time_seconds: f64, step_duration: f64) -> i64 {
    (time_seconds / step_duration).floor() as i64
}

/// Quantize, rejecting inputs that do not produce a finite step
/// (NaN or infinite times, zero step duration)
pub fn quantize_checked(time_seconds: f64, step_duration: f64) -> Option<i64> {
    let raw = (time_seconds / step_duration).floor();
    if raw.is_finite() {
        Some(raw as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_floors_into_step() {
        assert_eq!(quantize(0.0, 0.05), 0);
        assert_eq!(quantize(0.02, 0.05), 0);
        assert_eq!(quantize(0.049, 0.05), 0);
        assert_eq!(quantize(0.07, 0.05), 1);
    }

    #[test]
    fn test_quantize_exact_multiple() {
        // Exact binary fractions avoid float representation noise
        assert_eq!(quantize(0.25, 0.25), 1);
        assert_eq!(quantize(1.0, 0.25), 4);
        assert_eq!(quantize(0.999, 0.25), 3);
    }

    #[test]
    fn test_quantize_is_deterministic() {
        let a = quantize(12.345, 0.05);
        let b = quantize(12.345, 0.05);
        assert_eq!(a, b);
    }

    #[test]
    fn test_quantize_negative_time() {
        assert_eq!(quantize(-0.01, 0.05), -1);
    }

    #[test]
    fn test_quantize_checked_rejects_non_finite() {
        assert_eq!(quantize_checked(f64::NAN, 0.05), None);
        assert_eq!(quantize_checked(f64::INFINITY, 0.05), None);
        assert_eq!(quantize_checked(1.0, 0.0), None);
        assert_eq!(quantize_checked(0.5, 0.25), Some(2));
    }
}

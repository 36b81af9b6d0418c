//! Activation functions.

/// Logistic sigmoid, `1 / (1 + e^-x)`.
///
/// Evaluated with the exponent always non-positive, so `exp` never overflows
/// for large-magnitude arguments. The result is finite for every finite input
/// and strictly inside `(0, 1)` until `f32` saturates (beyond roughly ±17 the
/// value rounds to an endpoint).
///
/// # Examples
///
/// ```
/// use flapnet_network::activation::sigmoid;
///
/// assert_eq!(sigmoid(0.0), 0.5);
/// assert!(sigmoid(1000.0) <= 1.0);
/// assert!(sigmoid(-1000.0) >= 0.0);
/// assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Dot product of two equally long slices.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_bounded_and_finite() {
        for i in -1000..=1000 {
            #[expect(clippy::cast_precision_loss)]
            let x = i as f32;
            let y = sigmoid(x);
            assert!(y.is_finite(), "sigmoid({x}) = {y}");
            assert!((0.0..=1.0).contains(&y), "sigmoid({x}) = {y}");
        }
    }

    #[test]
    fn test_sigmoid_strictly_inside_for_moderate_inputs() {
        for x in [-15.0, -5.0, -0.5, 0.5, 5.0, 15.0] {
            let y = sigmoid(x);
            assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
        }
    }

    #[test]
    fn test_sigmoid_monotonic() {
        let mut prev = sigmoid(-20.0);
        for i in -199..=200 {
            #[expect(clippy::cast_precision_loss)]
            let y = sigmoid(i as f32 / 10.0);
            assert!(y >= prev);
            prev = y;
        }
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0);
    }
}

use num_traits::{Float, FloatConst};

/// Unwrap a phase sequence by replacing jumps larger than `π` with their `2π` complement,
/// as `numpy.unwrap` with the default discontinuity.
///
/// ```
/// use approx::assert_relative_eq;
/// use biopeaks_core::num_rs::unwrap;
///
/// let wrapped = [3.0f64, -3.0];
/// let unwrapped = unwrap(&wrapped);
/// assert_relative_eq!(unwrapped[1], -3.0 + 2.0 * core::f64::consts::PI, epsilon = 1e-12);
/// ```
pub fn unwrap<F>(phase: &[F]) -> Vec<F>
where
    F: Float + FloatConst,
{
    let pi = F::PI();
    let two_pi = pi + pi;
    let mut out = Vec::with_capacity(phase.len());
    let Some(&first) = phase.first() else {
        return out;
    };
    out.push(first);

    let mut correction = F::zero();
    for w in phase.windows(2) {
        let d = w[1] - w[0];
        let mut m = (d + pi) % two_pi;
        if m < F::zero() {
            m = m + two_pi;
        }
        let mut dd = m - pi;
        if dd == -pi && d > F::zero() {
            dd = pi;
        }
        if d.abs() >= pi {
            correction = correction + (dd - d);
        }
        out.push(w[1] + correction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core::f64::consts::PI;

    #[test]
    fn unwrap_restores_linear_phase_ramp() {
        let ramp: Vec<f64> = (0..50).map(|i| i as f64 * 0.7).collect();
        let wrapped: Vec<f64> = ramp.iter().map(|p| p.sin().atan2(p.cos())).collect();
        let unwrapped = unwrap(&wrapped);
        for (u, r) in unwrapped.iter().zip(ramp.iter()) {
            assert_relative_eq!(*u, *r, epsilon = 1e-9);
        }
    }

    #[test]
    fn unwrap_leaves_small_steps_alone() {
        let x = [0.0f64, 0.5, 1.0, PI - 0.1];
        assert_eq!(unwrap(&x), x.to_vec());
        assert!(unwrap::<f64>(&[]).is_empty());
    }
}

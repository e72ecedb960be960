//! Special functions and quadrature for the analytical BER model

/// Complementary error function (Abramowitz & Stegun 7.1.26 rational
/// approximation, max error < 1.5 × 10⁻⁷).
pub fn erfc(x: f64) -> f64 {
    if x >= 0.0 {
        erfc_positive(x)
    } else {
        2.0 - erfc_positive(-x)
    }
}

fn erfc_positive(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736
                + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    poly * (-x * x).exp()
}

/// Modified Bessel function of the first kind, order 0.
/// Power series `I0(x) = Σ ((x/2)^k / k!)²` with early termination.
pub fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let x_half = x / 2.0;
    for k in 1..200 {
        term *= x_half / k as f64;
        let t2 = term * term;
        sum += t2;
        if t2 < 1e-16 * sum {
            break;
        }
    }
    sum
}

/// Composite Simpson integration over uniformly spaced samples.
/// Falls back to a trapezoid on the final interval when the sample count
/// is even.
pub fn simpson(values: &[f64], step: f64) -> f64 {
    match values.len() {
        0 | 1 => 0.0,
        2 => 0.5 * step * (values[0] + values[1]),
        _ => {
            let odd_count = if values.len() % 2 == 1 {
                values.len()
            } else {
                values.len() - 1
            };
            let mut sum = values[0] + values[odd_count - 1];
            for (i, &v) in values[1..odd_count - 1].iter().enumerate() {
                sum += if i % 2 == 0 { 4.0 * v } else { 2.0 * v };
            }
            let mut integral = sum * step / 3.0;
            if values.len() % 2 == 0 {
                integral +=
                    0.5 * step * (values[values.len() - 2] + values[values.len() - 1]);
            }
            integral
        }
    }
}

//! Credit formulas, one per schema.
//!
//! Every function takes an author count `n >= 1` (checked by the caller in
//! `catalogue`) and returns `n` credits indexed by byline rank, rank 0 being
//! the first author.

/// Every author gets `1/n`.
pub fn fractional_equal(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Last author gets 0.5, the others split the remaining 0.5 equally.
pub fn fractional_lae(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let mut credits = vec![0.5 / (n - 1) as f64; n - 1];
    credits.push(0.5);
    credits
}

/// First author gets 0.5, the others split the remaining 0.5 equally.
pub fn fractional_fae(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let mut credits = Vec::with_capacity(n);
    credits.push(0.5);
    credits.extend(std::iter::repeat(0.5 / (n - 1) as f64).take(n - 1));
    credits
}

/// First and last authors get 0.4 each, the middle authors split 0.2.
pub fn fractional_flae(n: usize) -> Vec<f64> {
    match n {
        1 => vec![1.0],
        2 => vec![0.5, 0.5],
        _ => {
            let mut credits = Vec::with_capacity(n);
            credits.push(0.4);
            credits.extend(std::iter::repeat(0.2 / (n - 2) as f64).take(n - 2));
            credits.push(0.4);
            credits
        }
    }
}

/// Proportional credit falling linearly with rank.
pub fn arithmetic_standard(n: usize) -> Vec<f64> {
    let nf = n as f64;
    (0..n)
        .map(|i| 2.0 * (1.0 - (i + 1) as f64 / (nf + 1.0)) / nf)
        .collect()
}

/// V-shaped arithmetic credit: highest at both ends, lowest in the middle.
pub fn arithmetic_v(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let nf = n as f64;
    let denominator = if n % 2 == 0 {
        0.5 * nf * nf + nf
    } else {
        0.5 * nf * nf + nf * (1.0 - 1.0 / (2.0 * nf))
    };
    let span = n as i64 + 1;
    (0..n)
        .map(|i| {
            let distance = (span - 2 * (i as i64 + 1)).abs();
            (1 + distance) as f64 / denominator
        })
        .collect()
}

/// Each author gets twice the credit of the next one.
///
/// Evaluated as `0.5^(i+1) / (1 - 0.5^n)`, which equals
/// `2^(n-i-1) / (2^n - 1)` but never overflows for long bylines.
pub fn geometric_standard(n: usize) -> Vec<f64> {
    let tail = 1.0 - 0.5f64.powi(saturating_i32(n));
    (0..n)
        .map(|i| 0.5f64.powi(saturating_i32(i + 1)) / tail)
        .collect()
}

/// Geometric credit whose rank ratio `n^(1/(n-1))` shrinks as the byline grows.
pub fn geometric_adaptive(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let nf = n as f64;
    let ratio = nf.powf(1.0 / (nf - 1.0));
    let denominator = nf.powf(nf / (nf - 1.0)) - 1.0;
    (0..n)
        .map(|i| (ratio - 1.0) * nf.powf((nf - (i + 1) as f64) / (nf - 1.0)) / denominator)
        .collect()
}

/// Credit proportional to `1/rank`.
pub fn harmonic_standard(n: usize) -> Vec<f64> {
    normalize((1..=n).map(|rank| 1.0 / rank as f64).collect())
}

/// Harmonic credit mirrored around the middle of the byline.
pub fn harmonic_parabolic(n: usize) -> Vec<f64> {
    normalize(
        (0..n)
            .map(|i| 1.0 / (i + 1).min(n - i) as f64)
            .collect(),
    )
}

/// Harmonic credit where first and last authors share the top two harmonic
/// terms (1 + 1/2) equally and the middle authors shift down one rank.
pub fn harmonic_flae(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let denominator: f64 = (1..=n).map(|rank| 1.0 / rank as f64).sum();
    let end = 1.5 / (2.0 * denominator);

    let mut credits = Vec::with_capacity(n);
    credits.push(end);
    credits.extend((1..n - 1).map(|i| (1.0 / (i + 2) as f64) / denominator));
    credits.push(end);
    credits
}

/// Powers of 0.618, the golden ratio conjugate.
///
/// Not normalized: the literal constant makes the vector sum fall slightly
/// short of 1 (0.999924 for two authors). Outputs keep these values as-is.
pub fn golden_share(n: usize) -> Vec<f64> {
    const PHI: f64 = 0.618;
    if n == 1 {
        return vec![1.0];
    }
    let mut credits: Vec<f64> = (0..n - 1)
        .map(|i| PHI.powi(saturating_i32(2 * (i + 1) - 1)))
        .collect();
    credits.push(PHI.powi(saturating_i32(2 * n - 2)));
    credits
}

/// Harmonic credit with a last-author bonus fitted from survey data.
///
/// The two-author case is a fixed literal pair, not derived from the
/// general formula.
pub fn harmonic_lab(n: usize) -> Vec<f64> {
    const SLOPE: f64 = 0.5226;
    const INTERCEPT: f64 = 0.5643;
    match n {
        1 => vec![1.0],
        2 => vec![0.5659, 0.4341],
        _ => {
            let mut raw: Vec<f64> = (1..n).map(|rank| 1.0 / rank as f64).collect();
            let penultimate = 1.0 / (n - 1) as f64;
            raw.push(penultimate * ((n - 2) as f64 * SLOPE + INTERCEPT));
            normalize(raw)
        }
    }
}

fn normalize(raw: Vec<f64>) -> Vec<f64> {
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|credit| credit / total).collect()
}

// Exponents beyond i32 only arise for absurd bylines; powi underflows to 0 long before.
fn saturating_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_credits(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len(), "length of {:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = epsilon);
        }
    }

    #[test]
    fn test_fractional_equal() {
        assert_credits(&fractional_equal(4), &[0.25, 0.25, 0.25, 0.25], 1e-12);
    }

    #[test]
    fn test_fractional_lae() {
        assert_credits(&fractional_lae(1), &[1.0], 1e-12);
        assert_credits(&fractional_lae(3), &[0.25, 0.25, 0.5], 1e-12);
    }

    #[test]
    fn test_fractional_fae() {
        assert_credits(&fractional_fae(1), &[1.0], 1e-12);
        assert_credits(&fractional_fae(3), &[0.5, 0.25, 0.25], 1e-12);
    }

    #[test]
    fn test_fractional_flae_two_authors() {
        assert_credits(&fractional_flae(2), &[0.5, 0.5], 1e-12);
    }

    #[test]
    fn test_fractional_flae_five_authors() {
        let third = 0.2 / 3.0;
        assert_credits(&fractional_flae(5), &[0.4, third, third, third, 0.4], 1e-12);
    }

    #[test]
    fn test_arithmetic_standard() {
        // n=3: 2*(1 - k/4)/3 for k = 1..3
        assert_credits(&arithmetic_standard(3), &[0.5, 1.0 / 3.0, 1.0 / 6.0], 1e-12);
        assert_credits(&arithmetic_standard(1), &[1.0], 1e-12);
    }

    #[test]
    fn test_arithmetic_v_even() {
        // raw 4,2,2,4 over 0.5*16 + 4 = 12
        assert_credits(
            &arithmetic_v(4),
            &[4.0 / 12.0, 2.0 / 12.0, 2.0 / 12.0, 4.0 / 12.0],
            1e-12,
        );
    }

    #[test]
    fn test_arithmetic_v_odd() {
        // raw 3,1,3 over 4.5 + 2.5 = 7
        assert_credits(&arithmetic_v(3), &[3.0 / 7.0, 1.0 / 7.0, 3.0 / 7.0], 1e-12);
    }

    #[test]
    fn test_geometric_standard() {
        assert_credits(&geometric_standard(3), &[4.0 / 7.0, 2.0 / 7.0, 1.0 / 7.0], 1e-12);
        assert_credits(&geometric_standard(1), &[1.0], 1e-12);
    }

    #[test]
    fn test_geometric_standard_long_byline_stays_finite() {
        let credits = geometric_standard(3000);
        assert!(credits.iter().all(|c| c.is_finite()));
        assert_relative_eq!(credits[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_geometric_adaptive_two_authors() {
        // ratio n^(1/(n-1)) = 2, so the pair is [2/3, 1/3]
        assert_credits(&geometric_adaptive(2), &[2.0 / 3.0, 1.0 / 3.0], 1e-12);
        assert_credits(&geometric_adaptive(1), &[1.0], 1e-12);
    }

    #[test]
    fn test_geometric_adaptive_constant_ratio() {
        let credits = geometric_adaptive(5);
        let ratio = 5f64.powf(0.25);
        for pair in credits.windows(2) {
            assert_relative_eq!(pair[0] / pair[1], ratio, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_harmonic_standard() {
        let credits = harmonic_standard(3);
        assert_credits(&credits, &[6.0 / 11.0, 3.0 / 11.0, 2.0 / 11.0], 1e-12);
        assert_relative_eq!(credits[0], 0.5455, epsilon = 1e-4);
        assert_relative_eq!(credits[1], 0.2727, epsilon = 1e-4);
        assert_relative_eq!(credits[2], 0.1818, epsilon = 1e-4);
    }

    #[test]
    fn test_harmonic_parabolic_is_symmetric() {
        let credits = harmonic_parabolic(5);
        // raw 1, 1/2, 1/3, 1/2, 1 with sum 10/3
        assert_credits(&credits, &[0.3, 0.15, 0.1, 0.15, 0.3], 1e-12);
        let credits = harmonic_parabolic(6);
        for i in 0..3 {
            assert_relative_eq!(credits[i], credits[5 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_harmonic_flae() {
        // D = 1 + 1/2 + 1/3 + 1/4 = 25/12; ends get 1.5/(2D), middle 1/3/D and 1/4/D
        let d = 25.0 / 12.0;
        assert_credits(
            &harmonic_flae(4),
            &[0.75 / d, (1.0 / 3.0) / d, 0.25 / d, 0.75 / d],
            1e-12,
        );
        assert_credits(&harmonic_flae(2), &[0.5, 0.5], 1e-12);
    }

    #[test]
    fn test_golden_share_literal_values() {
        assert_credits(&golden_share(1), &[1.0], 1e-12);
        assert_credits(&golden_share(2), &[0.618, 0.381924], 1e-12);
        assert_credits(
            &golden_share(3),
            &[0.618, 0.618f64.powi(3), 0.618f64.powi(4)],
            1e-12,
        );
    }

    #[test]
    fn test_golden_share_sum_falls_short_of_one() {
        let total: f64 = golden_share(2).iter().sum();
        assert_relative_eq!(total, 0.999924, epsilon = 1e-12);
    }

    #[test]
    fn test_harmonic_lab_two_authors_literal() {
        assert_eq!(harmonic_lab(2), vec![0.5659, 0.4341]);
    }

    #[test]
    fn test_harmonic_lab_three_authors() {
        // raw 1, 1/2, then 1/2 * (0.5226 + 0.5643)
        let last = 0.5 * (0.5226 + 0.5643);
        let total = 1.5 + last;
        assert_credits(
            &harmonic_lab(3),
            &[1.0 / total, 0.5 / total, last / total],
            1e-12,
        );
    }
}

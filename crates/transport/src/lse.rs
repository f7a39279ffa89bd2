use warmkhorn_core::Entropy;

/// Streaming log-sum-exp accumulator.
///
/// Keeps the running maximum and the sum of `exp(v - max)`, rescaling the sum
/// whenever a larger value arrives. Lets batched geometries reduce over source
/// samples one block at a time without holding a full column.
#[derive(Debug, Clone, Copy)]
pub struct LogSumExp {
    max: Entropy,
    sum: Entropy,
}

impl Default for LogSumExp {
    fn default() -> Self {
        Self {
            max: Entropy::NEG_INFINITY,
            sum: 0.,
        }
    }
}

impl LogSumExp {
    pub fn push(&mut self, v: Entropy) {
        if v == Entropy::NEG_INFINITY {
            return;
        }
        if v > self.max {
            self.sum = self.sum * (self.max - v).exp() + 1.;
            self.max = v;
        } else {
            self.sum += (v - self.max).exp();
        }
    }
    /// ln Σ exp(v). Negative infinity for an empty accumulator.
    pub fn value(&self) -> Entropy {
        if self.sum == 0. {
            Entropy::NEG_INFINITY
        } else {
            self.max + self.sum.ln()
        }
    }
}

impl FromIterator<Entropy> for LogSumExp {
    fn from_iter<I: IntoIterator<Item = Entropy>>(iter: I) -> Self {
        let mut lse = Self::default();
        iter.into_iter().for_each(|v| lse.push(v));
        lse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_naive_sum() {
        let values = [0.5f32, -1.0, 2.0, 0.0];
        let naive = values.iter().map(|v| v.exp()).sum::<f32>().ln();
        let lse = values.into_iter().collect::<LogSumExp>().value();
        assert!((naive - lse).abs() < 1e-6);
    }

    #[test]
    fn survives_large_magnitudes() {
        let lse = [1000.0f32, 1000.0].into_iter().collect::<LogSumExp>();
        assert!((lse.value() - (1000.0 + 2f32.ln())).abs() < 1e-3);
        let lse = [-1000.0f32, -1001.0].into_iter().collect::<LogSumExp>();
        assert!(lse.value().is_finite());
    }

    #[test]
    fn ignores_negative_infinity() {
        let lse = [Entropy::NEG_INFINITY, 0.0].into_iter().collect::<LogSumExp>();
        assert_eq!(lse.value(), 0.0);
        let empty = std::iter::empty::<Entropy>().collect::<LogSumExp>();
        assert_eq!(empty.value(), Entropy::NEG_INFINITY);
    }
}

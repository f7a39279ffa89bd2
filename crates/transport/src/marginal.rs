use super::density::Density;
use super::error::TransportError;
use rand::Rng;
use warmkhorn_core::Arbitrary;
use warmkhorn_core::Entropy;
use warmkhorn_core::Probability;

/// Weights of one side of a transport problem, indexed by sample position.
#[derive(Debug, Clone, PartialEq)]
pub struct Marginal(Vec<Probability>);

impl Marginal {
    /// Equal mass 1/n on each of n samples.
    pub fn uniform(n: usize) -> Self {
        Self(vec![1. / n as Probability; n])
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn weights(&self) -> &[Probability] {
        &self.0
    }
    pub fn mass(&self) -> Probability {
        self.0.iter().sum()
    }
    /// Log weights; zero weights map to negative infinity.
    pub fn ln(&self) -> Vec<Entropy> {
        self.0.iter().map(|w| w.ln()).collect()
    }
    /// Rescales to unit mass.
    pub fn normalized(self) -> Self {
        let mass = self.mass();
        Self(self.0.into_iter().map(|w| w / mass).collect())
    }
    /// Checks length, sign, and total mass against one side of a problem.
    pub fn validate(&self, side: &'static str, expected: usize) -> Result<(), TransportError> {
        if self.len() != expected {
            return Err(TransportError::Length {
                side,
                expected,
                got: self.len(),
            });
        }
        if let Some((index, &weight)) = self
            .0
            .iter()
            .enumerate()
            .find(|(_, w)| !w.is_finite() || **w < 0.)
        {
            return Err(TransportError::Weight {
                side,
                index,
                weight,
            });
        }
        if self.mass() <= 0. {
            return Err(TransportError::Mass(side));
        }
        Ok(())
    }
}

impl Density for Marginal {
    type Support = usize;
    fn density(&self, x: &Self::Support) -> Probability {
        self.0.get(*x).copied().unwrap_or(0.)
    }
    fn support(&self) -> impl Iterator<Item = Self::Support> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > 0.)
            .map(|(i, _)| i)
    }
}

impl From<Vec<Probability>> for Marginal {
    fn from(weights: Vec<Probability>) -> Self {
        Self(weights)
    }
}

impl AsRef<[Probability]> for Marginal {
    fn as_ref(&self) -> &[Probability] {
        &self.0
    }
}

impl Arbitrary for Marginal {
    /// Random positive weights over 8 to 32 samples, normalized to unit mass.
    fn random() -> Self {
        let ref mut rng = rand::rng();
        let n = rng.random_range(8..=32);
        Self((0..n).map(|_| rng.random_range(0.1..1.0)).collect()).normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_has_unit_mass() {
        let marginal = Marginal::uniform(30);
        assert_eq!(marginal.len(), 30);
        assert!((marginal.mass() - 1.).abs() < 1e-5);
        assert_eq!(marginal.support().count(), 30);
    }

    #[test]
    fn random_is_normalized() {
        let marginal = Marginal::random();
        assert!((marginal.mass() - 1.).abs() < 1e-5);
        assert!(marginal.weights().iter().all(|w| *w > 0.));
    }

    #[test]
    fn support_skips_empty_samples() {
        let marginal = Marginal::from(vec![0.5, 0.0, 0.5]);
        assert_eq!(marginal.support().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(marginal.density(&1), 0.);
        assert_eq!(marginal.density(&7), 0.);
        assert_eq!(marginal.ln()[1], Entropy::NEG_INFINITY);
    }

    #[test]
    fn validation_rejects_bad_weights() {
        let marginal = Marginal::from(vec![0.5, -0.1, 0.6]);
        assert!(matches!(
            marginal.validate("source", 3),
            Err(TransportError::Weight { index: 1, .. })
        ));
        assert!(matches!(
            Marginal::uniform(4).validate("target", 5),
            Err(TransportError::Length { expected: 5, got: 4, .. })
        ));
        assert_eq!(
            Marginal::from(vec![0.0, 0.0]).validate("target", 2),
            Err(TransportError::Mass("target"))
        );
        assert!(Marginal::uniform(5).validate("target", 5).is_ok());
    }
}

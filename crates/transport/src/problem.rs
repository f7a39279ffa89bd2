use super::axis::Axis;
use super::error::TransportError;
use super::marginal::Marginal;
use super::pointcloud::PointCloud;
use warmkhorn_core::Energy;
use warmkhorn_core::Entropy;

/// A linear (Kantorovich) transport problem: a geometry and its two marginals.
///
/// Sample counts are fixed by the geometry; the marginals are validated
/// against them once at construction and never change afterwards.
#[derive(Debug, Clone)]
pub struct LinearProblem {
    geom: PointCloud,
    a: Marginal,
    b: Marginal,
}

impl LinearProblem {
    pub fn new(geom: PointCloud, a: Marginal, b: Marginal) -> Result<Self, TransportError> {
        let (n, m) = geom.shape();
        a.validate("source", n)?;
        b.validate("target", m)?;
        Ok(Self { geom, a, b })
    }
    pub fn geometry(&self) -> &PointCloud {
        &self.geom
    }
    pub fn a(&self) -> &Marginal {
        &self.a
    }
    pub fn b(&self) -> &Marginal {
        &self.b
    }
    pub fn shape(&self) -> (usize, usize) {
        self.geom.shape()
    }
    pub fn epsilon(&self) -> Entropy {
        self.geom.epsilon()
    }
    /// Entropic dual objective of a pair of potentials:
    ///
    /// `⟨a, f⟩ + ⟨b, g⟩ − eps·(Σ_ij exp((f_i + g_j − C_ij)/eps) − |a|·|b|)`
    ///
    /// Samples with zero weight do not contribute to the linear terms.
    pub fn dual_objective(&self, f: &[Entropy], g: &[Entropy]) -> Energy {
        let eps = self.epsilon();
        let linear = |weights: &Marginal, potential: &[Entropy]| {
            weights
                .weights()
                .iter()
                .zip(potential)
                .filter(|(w, _)| **w > 0.)
                .map(|(w, p)| w * p)
                .sum::<Energy>()
        };
        let mass = self
            .geom
            .marginal_from_potentials(f, g, eps, Axis::X)
            .into_iter()
            .sum::<Energy>();
        linear(&self.a, f) + linear(&self.b, g) - eps * (mass - self.a.mass() * self.b.mass())
    }
}

impl From<PointCloud> for LinearProblem {
    /// Uniform weights on both sides.
    fn from(geom: PointCloud) -> Self {
        let (n, m) = geom.shape();
        Self {
            geom,
            a: Marginal::uniform(n),
            b: Marginal::uniform(m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geom() -> PointCloud {
        PointCloud::new(vec![0.0, 1.0, 2.0], vec![0.5, 1.5], 1)
            .unwrap()
            .with_epsilon(0.1)
            .unwrap()
    }

    #[test]
    fn uniform_from_geometry() {
        let problem = LinearProblem::from(geom());
        assert_eq!(problem.shape(), (3, 2));
        assert!((problem.a().mass() - 1.).abs() < 1e-6);
        assert!((problem.b().mass() - 1.).abs() < 1e-6);
        assert_eq!(problem.epsilon(), 0.1);
    }

    #[test]
    fn rejects_mismatched_marginals() {
        let err = LinearProblem::new(geom(), Marginal::uniform(2), Marginal::uniform(2));
        assert!(matches!(
            err,
            Err(TransportError::Length { side: "source", expected: 3, got: 2 })
        ));
        let err = LinearProblem::new(
            geom(),
            Marginal::uniform(3),
            Marginal::from(vec![f32::NAN, 0.5]),
        );
        assert!(matches!(err, Err(TransportError::Weight { side: "target", .. })));
    }

    #[test]
    fn dual_objective_of_c_transform() {
        let problem = LinearProblem::from(geom());
        let eps = problem.epsilon();
        let f = vec![0.1, 0.0, -0.2];
        let g = problem
            .geometry()
            .update_potential(&f, &[0., 0.], &problem.b().ln(), eps, Axis::X);
        // the mass term vanishes once g is the c-transform of f
        let linear = f.iter().map(|x| x / 3.).sum::<f32>() + g.iter().map(|x| x / 2.).sum::<f32>();
        assert!((problem.dual_objective(&f, &g) - linear).abs() < 1e-4);
    }
}

use crate::source::Source;
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

/// Gaussian samples are rejected beyond this many standard deviations.
pub const SIX_SIGMA: f64 = 6.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("gaussian standard deviation must be finite and positive, got {0}")]
    InvalidSigma(f64),
    #[error(transparent)]
    Normal(#[from] NormalError),
}

/// Distributions of small signed coefficients used for secrets and errors.
#[derive(Clone, Copy, Debug)]
pub enum Distributions {
    /// Uniform over {-1, 0, 1}.
    Ternary,
    /// Rounded gaussian, rejected outside [-bound, bound].
    Gaussian { normal: Normal<f64>, bound: f64 },
}

impl Distributions {
    /// Returns the bounded discrete gaussian of standard deviation `sigma`.
    /// Rejects any sigma that is not finite and strictly positive, so the
    /// rejection bound in [Distributions::sample] is always reachable.
    pub fn gaussian(sigma: f64) -> Result<Self, DistributionError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(DistributionError::InvalidSigma(sigma));
        }
        let normal: Normal<f64> = Normal::new(0.0, sigma)?;
        Ok(Distributions::Gaussian {
            normal,
            bound: SIX_SIGMA * sigma,
        })
    }

    #[inline(always)]
    pub fn sample(&self, source: &mut Source) -> i64 {
        match self {
            Distributions::Ternary => source.next_u64n(3, 0b11) as i64 - 1,
            Distributions::Gaussian { normal, bound } => loop {
                let x: f64 = normal.sample(source);
                if x.abs() <= *bound {
                    return x.round() as i64;
                }
            },
        }
    }

    pub fn fill(&self, source: &mut Source, a: &mut [i64]) {
        a.iter_mut().for_each(|x| *x = self.sample(source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ternary_is_small() {
        let mut source: Source = Source::from_u64(1);
        let mut a: Vec<i64> = vec![0; 4096];
        Distributions::Ternary.fill(&mut source, &mut a);
        assert!(a.iter().all(|x| (-1..=1).contains(x)));
        assert!(a.contains(&-1) && a.contains(&0) && a.contains(&1));
    }

    #[test]
    fn gaussian_is_bounded() {
        let sigma: f64 = 3.19;
        let dist: Distributions = Distributions::gaussian(sigma).unwrap();
        let mut source: Source = Source::from_u64(2);
        let mut a: Vec<i64> = vec![0; 1 << 14];
        dist.fill(&mut source, &mut a);
        let bound: i64 = (SIX_SIGMA * sigma).round() as i64;
        assert!(a.iter().all(|x| x.abs() <= bound));
        let mean: f64 = a.iter().sum::<i64>() as f64 / a.len() as f64;
        assert!(mean.abs() < 0.2, "mean={}", mean);
    }

    #[test]
    fn gaussian_rejects_negative_sigma() {
        assert_eq!(
            Distributions::gaussian(-1.0).err(),
            Some(DistributionError::InvalidSigma(-1.0))
        );
    }

    #[test]
    fn gaussian_rejects_degenerate_sigma() {
        assert!(Distributions::gaussian(0.0).is_err());
        assert!(Distributions::gaussian(f64::NAN).is_err());
        assert!(Distributions::gaussian(f64::INFINITY).is_err());
        assert!(Distributions::gaussian(f64::MIN_POSITIVE).is_ok());
    }
}

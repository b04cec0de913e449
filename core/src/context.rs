use crate::error::Result;
use crate::parameters::{Parameters, ParametersLiteral};
use hedist_backend::ring::RingRNS;
use tracing::debug;

/// Resolved parameters together with the rings they define.
pub struct Context {
    params: Parameters,
    ring_q: RingRNS<u64>,
    /// Q followed by the special prime P, when there is one.
    ring_qp: RingRNS<u64>,
}

impl Context {
    pub fn new(literal: &ParametersLiteral) -> Result<Self> {
        let params: Parameters = Parameters::new(literal)?;

        let ring_q: RingRNS<u64> = RingRNS::new(params.n(), params.q());
        let ring_qp: RingRNS<u64> = match params.p() {
            Some(p) => ring_q.extended_with(&RingRNS::new(params.n(), &[p])),
            None => ring_q.clone(),
        };

        debug!(
            scheme = ?params.scheme(),
            n = params.n(),
            t = params.plaintext_modulus(),
            q = ?params.q(),
            p = ?params.p(),
            log_qp = params.log_qp(),
            "context ready"
        );

        Ok(Self {
            params,
            ring_q,
            ring_qp,
        })
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn n(&self) -> usize {
        self.params.n()
    }

    pub fn max_level(&self) -> usize {
        self.params.max_level()
    }

    /// Ring over q_0, ..., q_level.
    pub fn ring_q(&self, level: usize) -> RingRNS<u64> {
        self.ring_q.at_level(level)
    }

    /// Ring over q_0, ..., q_L and the special prime, if any.
    pub fn ring_qp(&self) -> &RingRNS<u64> {
        &self.ring_qp
    }

    /// Ring over q_0, ..., q_level and the special prime.
    /// Panics without special prime.
    pub(crate) fn ring_q_level_p(&self, level: usize) -> RingRNS<u64> {
        let special: usize = self.ring_qp.level();
        assert!(special > self.max_level(), "context has no special prime");
        self.ring_q
            .at_level(level)
            .extended_with(&RingRNS(vec![self.ring_qp.0[special].clone()]))
    }
}

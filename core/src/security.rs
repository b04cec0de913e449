use serde::{Deserialize, Serialize};

/// Target security of the ring-LWE instance, classical model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SecurityLevel {
    /// No bound is enforced; the ring degree must then be given explicitly.
    NotSet,
    #[default]
    Classic128,
    Classic192,
    Classic256,
}

/// Largest log2(Q*P) for a ternary secret, per ring degree, as published by
/// the homomorphic encryption standard. The last row extrapolates the
/// doubling pattern of the table to N = 65536.
const MAX_LOG_QP: [(usize, [usize; 3]); 7] = [
    (1 << 10, [27, 19, 14]),
    (1 << 11, [54, 37, 29]),
    (1 << 12, [109, 75, 58]),
    (1 << 13, [218, 152, 118]),
    (1 << 14, [438, 305, 237]),
    (1 << 15, [881, 611, 476]),
    (1 << 16, [1761, 1228, 958]),
];

impl SecurityLevel {
    fn column(&self) -> Option<usize> {
        match self {
            SecurityLevel::NotSet => None,
            SecurityLevel::Classic128 => Some(0),
            SecurityLevel::Classic192 => Some(1),
            SecurityLevel::Classic256 => Some(2),
        }
    }

    /// Returns the largest admissible log2(Q*P) for ring degree n, None when
    /// no bound applies (NotSet) and Some(0) for degrees outside the table.
    pub fn max_log_qp(&self, n: usize) -> Option<usize> {
        let column: usize = self.column()?;
        Some(
            MAX_LOG_QP
                .iter()
                .find(|(degree, _)| *degree == n)
                .map(|(_, bounds)| bounds[column])
                .unwrap_or(0),
        )
    }

    /// Returns the smallest tabulated ring degree supporting log_qp bits.
    pub fn min_ring_degree(&self, log_qp: usize) -> Option<usize> {
        let column: usize = self.column()?;
        MAX_LOG_QP
            .iter()
            .find(|(_, bounds)| bounds[column] >= log_qp)
            .map(|(degree, _)| *degree)
    }

    /// Largest tabulated ring degree.
    pub fn max_ring_degree() -> usize {
        MAX_LOG_QP[MAX_LOG_QP.len() - 1].0
    }
}

//! RNS arithmetic over the negacyclic ring `Z_Q[X]/(X^N + 1)` with
//! `Q = q_0 * ... * q_L` a product of NTT-friendly primes below 2^61.
//!
//! * [modulus] word-size modular arithmetic (Barrett, Montgomery) and prime generation.
//! * [dft] the negacyclic number theoretic transform.
//! * [poly] the [poly::Poly] and [poly::PolyRNS] layouts.
//! * [ring] [ring::Ring] and [ring::RingRNS], the arithmetic entry points.

pub mod dft;
pub mod modulus;
pub mod poly;
pub mod ring;

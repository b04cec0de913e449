//! Built-in parameter tables and JSON loading.
//!
//! Some entries are known not to decrypt correctly (a single-prime chain, or
//! a modulus too small for the relinearization noise). They stay in the
//! tables: the sweep reports them as mismatches or faults.

use crate::descriptor::{
    BgvModulus, BgvParams, BgvRnsParams, CkksParams, Rescaling, SchemeDescriptor,
};
use crate::error::Result;
use hedist_core::{KeySwitching, SecurityLevel};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BGVRNS_SIGMA: f64 = 3.2;
const BGV_WINDOW: u32 = 1;
const CKKS_WINDOW: u32 = 10;
const CKKS_BATCH: usize = 5;

fn bgvrns_set(plaintext_modulus: u64, ring_dimension: usize, depth: usize) -> SchemeDescriptor {
    SchemeDescriptor::BgvRns(BgvRnsParams {
        plaintext_modulus,
        ring_dimension,
        depth,
        security: SecurityLevel::Classic128,
        sigma: BGVRNS_SIGMA,
        max_relin_degree: 2,
        key_switching: KeySwitching::Hybrid,
    })
}

fn bgv_set(plaintext_modulus: u64, cyclotomic_order: usize, modulus: BgvModulus, std_dev: f64) -> SchemeDescriptor {
    SchemeDescriptor::Bgv(BgvParams {
        plaintext_modulus,
        cyclotomic_order,
        modulus,
        relin_window: BGV_WINDOW,
        std_dev,
    })
}

fn ckks_explicit(cyclotomic_order: usize, primes: usize, scale_bits: u32) -> SchemeDescriptor {
    SchemeDescriptor::Ckks(CkksParams::Explicit {
        cyclotomic_order,
        primes,
        scale_bits,
        relin_window: CKKS_WINDOW,
        batch_size: CKKS_BATCH,
    })
}

/// RNS variant of BGV, security-driven.
pub fn bgvrns() -> BTreeMap<u32, SchemeDescriptor> {
    BTreeMap::from([
        (1, bgvrns_set(536903681, 65536, 3)),
        (2, bgvrns_set(536903681, 32768, 3)),
        (3, bgvrns_set(536903681, 16384, 3)),
        (4, bgvrns_set(536903681, 16384, 1)),
        (5, bgvrns_set(536903681, 16384, 0)),
        (6, bgvrns_set(207748, 8192, 1)),
    ])
}

/// Single-modulus BGV with bit-wise relinearization.
pub fn bgv() -> BTreeMap<u32, SchemeDescriptor> {
    let explicit = |q: &str| BgvModulus::Explicit(q.to_string());
    BTreeMap::from([
        (1, bgv_set(207755, 131072, explicit("1073872897"), 2.0)),
        (2, bgv_set(207755, 131072, explicit("1074266113"), 2.0)),
        (3, bgv_set(207749, 256, BgvModulus::Bits(60), 4.0)),
        (4, bgv_set(207749, 128, BgvModulus::Bits(60), 4.0)),
        (5, bgv_set(207749, 64, BgvModulus::Bits(60), 4.0)),
        (6, bgv_set(207749, 8192, BgvModulus::Bits(70), 4.0)),
        (7, bgv_set(207749, 16384, BgvModulus::Bits(80), 4.0)),
        (8, bgv_set(207749, 65536, BgvModulus::Bits(100), 4.0)),
        (9, bgv_set(207749, 65536, BgvModulus::Bits(90), 4.0)),
        (10, bgv_set(207749, 65536, BgvModulus::Bits(80), 4.0)),
    ])
}

/// CKKS in its explicit, security-driven and chain forms. Sets 3 to 7 ask
/// for a 2^20 ring and are rejected by validation.
pub fn ckks() -> BTreeMap<u32, SchemeDescriptor> {
    BTreeMap::from([
        (1, ckks_explicit(131072, 1, 57)),
        (
            2,
            SchemeDescriptor::Ckks(CkksParams::SecurityDriven {
                depth: 5,
                scale_bits: 50,
                batch_size: 8,
                security: SecurityLevel::Classic128,
                ring_dimension: 0,
                rescaling: Rescaling::Exact,
            }),
        ),
        (3, ckks_explicit(2097152, 1, 47)),
        (4, ckks_explicit(2097152, 6, 47)),
        (5, ckks_explicit(2097152, 5, 47)),
        (6, ckks_explicit(2097152, 3, 47)),
        (7, ckks_explicit(2097152, 2, 47)),
        (8, ckks_explicit(256, 2, 52)),
        (9, ckks_explicit(256, 2, 58)),
        (10, ckks_explicit(8192, 4, 40)),
        (11, ckks_explicit(16384, 4, 40)),
        (12, ckks_explicit(32768, 4, 40)),
        (13, seal_ckks()),
    ])
}

/// N = 8192 with a {60, 40, 40, 60} chain and a 2^40 scale, at 128 bits.
pub fn seal_ckks() -> SchemeDescriptor {
    SchemeDescriptor::Ckks(CkksParams::Chain {
        ring_dimension: 8192,
        chain_bits: vec![60, 40, 40, 60],
        scale: 2f64.powi(40),
        security: SecurityLevel::Classic128,
    })
}

/// Reads a table of descriptors keyed by parameter set id.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, SchemeDescriptor>> {
    let json: String = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;

    #[test]
    fn builtin_tables_are_keyed_in_order() {
        assert_eq!(bgvrns().keys().copied().collect::<Vec<u32>>(), (1..=6).collect::<Vec<u32>>());
        assert_eq!(bgv().len(), 10);
        assert_eq!(ckks().len(), 13);
    }

    #[test]
    fn oversized_rings_are_unsupported_not_invalid() {
        let table: BTreeMap<u32, SchemeDescriptor> = ckks();
        (3..=7).for_each(|id| {
            assert!(matches!(
                table[&id].validate(),
                Err(HarnessError::Unsupported(_))
            ))
        });
        [1, 2, 8, 9, 10, 11, 12, 13]
            .iter()
            .for_each(|id| assert!(table[id].validate().is_ok(), "set {}", id));
        bgvrns().values().for_each(|d| assert!(d.validate().is_ok()));
        bgv().values().for_each(|d| assert!(d.validate().is_ok()));
    }

    #[test]
    fn table_survives_json() {
        let dir: std::path::PathBuf = std::env::temp_dir().join("hedist-presets-test");
        fs::create_dir_all(&dir).unwrap();
        let path: std::path::PathBuf = dir.join("bgv.json");
        fs::write(&path, serde_json::to_string_pretty(&bgv()).unwrap()).unwrap();
        assert_eq!(load_table(&path).unwrap(), bgv());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_table("/nonexistent/hedist/table.json"),
            Err(HarnessError::Io(_))
        ));
    }
}

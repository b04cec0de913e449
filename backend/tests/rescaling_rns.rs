use hedist_backend::poly::PolyRNS;
use hedist_backend::ring::RingRNS;
use hedist_sampling::source::Source;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

const MODULI: [u64; 3] = [0x1fffffffffe00001, 0x1fffffffffc80001, 0x1fffffffffb40001];

#[test]
fn div_round_by_last_modulus_rounds() {
    let ring_rns: RingRNS<u64> = RingRNS::new(1 << 10, &MODULI);
    test_div_round_by_last_modulus(&ring_rns, 1);
}

#[test]
fn div_round_by_last_modulus_preserves_plaintext_modulus() {
    let ring_rns: RingRNS<u64> = RingRNS::new(1 << 10, &MODULI);
    test_div_round_by_last_modulus(&ring_rns, 65537);
    test_div_round_by_last_modulus(&ring_rns, 536903681);
}

#[test]
fn div_round_by_last_moduli_drops_every_requested_limb() {
    let ring_rns: RingRNS<u64> = RingRNS::new(1 << 6, &MODULI);
    let coeffs: Vec<i128> = (0..ring_rns.n() as i128).map(|i| (i - 32) << 100).collect();
    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.from_i128_inplace(&coeffs, &mut a);
    ring_rns.ntt_inplace(&mut a);

    ring_rns.div_round_by_last_moduli_ntt_inplace(2, 1, &mut a);
    assert_eq!(a.level(), 0);

    let ring_0: RingRNS<u64> = ring_rns.at_level(0);
    ring_0.intt_inplace(&mut a);
    let mut out: Vec<BigInt> = vec![BigInt::zero(); a.n()];
    ring_0.to_bigint_inplace(&a, &mut out);

    let q_12: BigInt = BigInt::from(MODULI[1]) * BigInt::from(MODULI[2]);
    coeffs.iter().zip(out.iter()).for_each(|(c, o)| {
        // Two successive roundings stay within one unit of the exact quotient.
        let diff: BigInt = o * &q_12 - BigInt::from(*c);
        assert!(diff.abs() <= q_12, "{} {}", c, o);
    });
}

fn test_div_round_by_last_modulus(ring_rns: &RingRNS<u64>, t: u64) {
    let mut source: Source = Source::new([0u8; 32]);

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.fill_uniform(&mut source, &mut a);

    let mut coeffs_a: Vec<BigInt> = vec![BigInt::zero(); a.n()];
    ring_rns.to_bigint_inplace(&a, &mut coeffs_a);

    ring_rns.ntt_inplace(&mut a);
    ring_rns.div_round_by_last_modulus_ntt_inplace(t, &mut a);

    let ring_out: RingRNS<u64> = ring_rns.at_level(ring_rns.level() - 1);
    assert_eq!(a.level(), ring_out.level());
    ring_out.intt_inplace(&mut a);

    let mut coeffs_c: Vec<BigInt> = vec![BigInt::zero(); a.n()];
    ring_out.to_bigint_inplace(&a, &mut coeffs_c);

    let q: BigInt = ring_rns.modulus();
    let q_half: BigInt = &q >> 1;
    let q_last: BigInt = BigInt::from(ring_rns.0[ring_rns.level()].modulus.q);
    let t_big: BigInt = BigInt::from(t);
    let bound: BigInt = &t_big * &q_last / 2;

    coeffs_a.iter().zip(coeffs_c.iter()).for_each(|(a, c)| {
        // c * q_L = a + delta mod Q, with delta a small multiple of t.
        let mut delta: BigInt = ((c * &q_last - a) % &q + &q) % &q;
        if delta > q_half {
            delta -= &q;
        }
        assert!(delta.abs() <= bound, "|delta|={} > {}", delta, bound);
        assert!((&delta % &t_big).is_zero(), "delta={} != 0 mod {}", delta, t);
    });
}

use num::Integer;
use num_bigint::BigInt;

/// Returns x^-1 mod m for any modulus m > 1, None if gcd(x, m) != 1.
pub(crate) fn inv_mod(x: u64, m: u64) -> Option<u64> {
    let egcd = (x as i128).extended_gcd(&(m as i128));
    (egcd.gcd == 1).then(|| egcd.x.rem_euclid(m as i128) as u64)
}

/// Returns x * y mod m.
#[inline(always)]
pub(crate) fn mul_mod(x: u64, y: u64, m: u64) -> u64 {
    (x as u128 * y as u128 % m as u128) as u64
}

/// Maps x mod m to (-m/2, m/2].
#[inline(always)]
pub(crate) fn center(x: u64, m: u64) -> i64 {
    if x > m >> 1 {
        x as i64 - m as i64
    } else {
        x as i64
    }
}

/// Returns x mod m in [0, m).
pub(crate) fn bigint_mod(x: &BigInt, m: u64) -> u64 {
    x.mod_floor(&BigInt::from(m))
        .iter_u64_digits()
        .next()
        .unwrap_or(0)
}

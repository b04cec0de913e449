use crate::modulus::barrett::Barrett;
use crate::modulus::{BARRETT, ONCE};
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use std::rc::Rc;

impl RingRNS<u64> {
    /// Updates a to (a + delta) / q_L and drops its last limb, where q_L is the
    /// last prime of the ring and delta is the smallest multiple of t with
    /// a + delta = 0 mod q_L.
    ///
    /// With t = 1 this is the rounded division by q_L. With t > 1 the result
    /// stays congruent to a * q_L^-1 mod t, which is the BGV modulus switch.
    /// Expects a in the NTT domain with a.level() == self.level().
    pub fn div_round_by_last_modulus_ntt_inplace(&self, t: u64, a: &mut PolyRNS<u64>) {
        let level: usize = self.level();
        assert!(level >= 1, "invalid ring: cannot drop the last modulus at level 0");
        assert!(
            a.level() == level,
            "invalid argument a: a.level()={} != self.level()={}",
            a.level(),
            level
        );

        let last: &Rc<Ring<u64>> = &self.0[level];
        let q_last: u64 = last.modulus.q;

        // w = -a_L * t^-1 mod q_L.
        let mut w: Poly<u64> = last.new_poly();
        last.intt(a.at(level), &mut w);
        let t_inv: u64 = last.modulus.inv(last.modulus.barrett.reduce::<BARRETT>(&t));
        let neg_t_inv: Barrett<u64> = last.modulus.barrett.prepare(q_last - t_inv);
        last.mul_scalar_barrett_inplace::<ONCE>(&neg_t_inv, &mut w);

        let mut delta: Poly<u64> = last.new_poly();

        for (i, ring) in self.0[..level].iter().enumerate() {
            // delta_i = t * centered(w) mod q_i.
            ring.from_centered(&w, q_last, &mut delta);
            ring.mul_scalar_barrett_inplace::<ONCE>(&ring.barrett(t), &mut delta);
            ring.ntt_inplace(&mut delta);

            let a_i: &mut Poly<u64> = a.at_mut(i);
            ring.add_inplace::<ONCE>(&delta, a_i);
            ring.mul_scalar_barrett_inplace::<ONCE>(&ring.inv_barrett(q_last), a_i);
        }

        a.truncate(level - 1);
    }

    /// Applies [Self::div_round_by_last_modulus_ntt_inplace] nb_moduli times.
    pub fn div_round_by_last_moduli_ntt_inplace(&self, nb_moduli: usize, t: u64, a: &mut PolyRNS<u64>) {
        assert!(
            nb_moduli <= self.level(),
            "invalid argument nb_moduli: nb_moduli={} > self.level()={}",
            nb_moduli,
            self.level()
        );
        (0..nb_moduli).for_each(|i| {
            self.at_level(self.level() - i)
                .div_round_by_last_modulus_ntt_inplace(t, a)
        });
    }
}

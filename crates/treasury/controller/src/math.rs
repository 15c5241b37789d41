use ruint::aliases::{U256, U512};

/// `floor(x * y / denominator)` with a 512-bit intermediate product.
///
/// Returns `None` if `denominator` is zero or the quotient exceeds 256 bits.
pub fn mul_div(x: U256, y: U256, denominator: U256) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let product: U512 = x.widening_mul(y);
    let d = denominator.as_limbs();
    let quotient = product / U512::from_limbs([d[0], d[1], d[2], d[3], 0, 0, 0, 0]);
    let limbs = quotient.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

use super::F;

use std::array::from_fn;

#[inline]
pub fn sub<const N: usize>(a: [F; N], b: [F; N]) -> [F; N] {
    from_fn(|i| a[i] - b[i])
}

#[inline]
pub fn dot<const N: usize>(a: [F; N], b: [F; N]) -> F {
    (0..N).map(|i| a[i] * b[i]).sum()
}

/// L-2 norm of a vector
pub fn length<const N: usize>(v: [F; N]) -> F {
    dot(v, v).sqrt()
}

/// Whether `a` and `b` lie within euclidean distance `t` of each other.
///
/// Identical points are always within, even at infinity. The difference is scaled by its
/// largest component before squaring so that neither tiny nor huge distances under- or
/// overflow. Points with a NaN coordinate are never within anything but never equal either.
pub fn within<const N: usize>(a: [F; N], b: [F; N], t: F) -> bool {
    if a == b {
        return true;
    }
    let d = sub(a, b);
    if d.iter().any(|c| c.is_nan()) {
        return false;
    }
    let m = d.iter().fold(0. as F, |m, c| m.max(c.abs()));
    if m.is_infinite() {
        // a finite pair whose difference overflowed is still a finite distance apart
        return t == F::INFINITY && a.iter().chain(&b).all(|c| c.is_finite());
    }
    m * length(d.map(|c| c / m)) <= t
}

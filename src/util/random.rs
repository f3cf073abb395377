use rand::Rng;

/// Uniform integer in `[min, max]`, inclusive at both ends.
///
/// Bounds given in reverse order are swapped.
pub fn random_int(min: i32, max: i32) -> i32 {
    random_int_with(&mut rand::thread_rng(), min, max)
}

/// Same as [`random_int`] but drawing from a caller-supplied generator
pub fn random_int_with<R: Rng + ?Sized>(rng: &mut R, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(lo..=hi)
}

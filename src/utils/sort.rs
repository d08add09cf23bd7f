/// Sorts a set of three values in increasing order.
///
/// This is a three-comparison sorting network; equal values keep their relative order.
#[inline]
pub fn sort3<'a, T: PartialOrd>(a: &'a T, b: &'a T, c: &'a T) -> (&'a T, &'a T, &'a T) {
    let (a, b) = if a > b { (b, a) } else { (a, b) };
    let (b, c) = if b > c { (c, b) } else { (b, c) };
    let (a, b) = if a > b { (b, a) } else { (a, b) };
    (a, b, c)
}

//! Partial ordering of slices along a key.
//!
//! This is a quickselect with median-of-three pivots that degrades to
//! insertion sort on short ranges. It only orders elements relative to
//! the requested position, which is all a top-down tree build needs.

use crate::utils::sort3;

/// Ranges of at most this many elements are insertion-sorted instead of partitioned.
pub const DEFAULT_INSERTION_THRESHOLD: usize = 16;

/// Sorts `elts` in increasing order of `key` with an insertion sort.
///
/// The sort is stable. It runs in `O(n²)` and is only meant for short slices.
pub fn insertion_sort_by_key<T, K: PartialOrd>(elts: &mut [T], mut key: impl FnMut(&T) -> K) {
    for i in 1..elts.len() {
        let mut j = i;
        while j > 0 && key(&elts[j]) < key(&elts[j - 1]) {
            elts.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Reorders `elts` so that the element at position `n` separates smaller and greater keys.
///
/// After this call, every element of `elts[..n]` has a key smaller than or equal
/// to the key of every element of `elts[n..]`, and `elts[n]` holds the element that
/// would be at position `n` if `elts` were fully sorted. The order within both
/// sides is unspecified.
///
/// Ranges with at most `insertion_threshold` elements (but never less than 3)
/// are finished with an insertion sort. Does nothing if `n >= elts.len()`.
pub fn partition_nth<T, K: PartialOrd + Copy>(
    elts: &mut [T],
    n: usize,
    mut key: impl FnMut(&T) -> K,
    insertion_threshold: usize,
) {
    if n >= elts.len() {
        return;
    }

    let threshold = insertion_threshold.max(3);
    let mut begin = 0;
    let mut end = elts.len();

    while end - begin > threshold {
        let range = &mut elts[begin..end];
        let mid = range.len() / 2;
        let last = range.len() - 1;
        let (k0, k1, k2) = (key(&range[0]), key(&range[mid]), key(&range[last]));
        let pivot = *sort3(&k0, &k1, &k2).1;

        match hoare_partition(range, pivot, &mut key) {
            Some(cut) => {
                let cut = begin + cut;
                if cut <= n {
                    begin = cut;
                } else {
                    end = cut;
                }
            }
            // Keys that can't be ordered (NaN) don't split the range.
            None => break,
        }
    }

    insertion_sort_by_key(&mut elts[begin..end], key);
}

/// Splits `elts` around `pivot`.
///
/// Returns `i` such that keys in `elts[..i]` are `<= pivot` and keys in
/// `elts[i..]` are `>= pivot`, or `None` if that split would leave one side empty.
fn hoare_partition<T, K: PartialOrd>(
    elts: &mut [T],
    pivot: K,
    key: &mut impl FnMut(&T) -> K,
) -> Option<usize> {
    let len = elts.len();
    let mut i = 0;
    let mut j = len;

    loop {
        while i < len && key(&elts[i]) < pivot {
            i += 1;
        }

        j -= 1;
        while j > 0 && pivot < key(&elts[j]) {
            j -= 1;
        }

        if i >= j {
            return (i > 0 && i < len).then_some(i);
        }

        elts.swap(i, j);
        i += 1;
    }
}

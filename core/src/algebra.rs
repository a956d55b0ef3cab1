//! Set algebra over sorted sequences. Two distinct, explicitly named
//! operations so an OR-merge can never be mistaken for an AND-merge; both are
//! generic over the comparison key, with an explicit resolver for elements
//! present on both sides.

use std::cmp::Ordering;

/// Union of two sequences sorted by `key`. When both sides hold an element
/// with the same key, `resolve` decides what survives.
pub fn union_sorted_by<T, K, F, R>(a: Vec<T>, b: Vec<T>, key: F, mut resolve: R) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
    R: FnMut(T, T) -> T,
{
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();

    loop {
        let ord = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => key(x).cmp(&key(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match ord {
            Ordering::Less => out.push(a.next().unwrap()),
            Ordering::Greater => out.push(b.next().unwrap()),
            Ordering::Equal => {
                let x = a.next().unwrap();
                let y = b.next().unwrap();
                out.push(resolve(x, y));
            }
        }
    }
    out
}

/// Intersection of two sequences sorted by `key`; keeps only keys present on
/// both sides, combined through `resolve`.
pub fn intersect_sorted_by<T, K, F, R>(a: Vec<T>, b: Vec<T>, key: F, mut resolve: R) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
    R: FnMut(T, T) -> T,
{
    let mut out = Vec::new();
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();

    while let (Some(x), Some(y)) = (a.peek(), b.peek()) {
        match key(x).cmp(&key(y)) {
            Ordering::Less => {
                a.next();
            }
            Ordering::Greater => {
                b.next();
            }
            Ordering::Equal => {
                let x = a.next().unwrap();
                let y = b.next().unwrap();
                out.push(resolve(x, y));
            }
        }
    }
    out
}

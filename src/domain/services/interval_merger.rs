use crate::domain::models::interval::Interval;

/// Collapses busy ranges into a sorted, pairwise disjoint set with the same union.
/// Ranges that merely touch (`next.start == current.end`) are merged too.
pub fn merge(periods: &[Interval]) -> Vec<Interval> {
    if periods.is_empty() {
        return Vec::new();
    }

    let mut sorted = periods.to_vec();
    sorted.sort();

    let mut merged = Vec::with_capacity(sorted.len());
    let mut current = sorted[0];

    for next in sorted.into_iter().skip(1) {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}

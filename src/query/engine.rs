//! Data-parallel filter, sort, and reshaping over record slices.
//!
//! Filtering is two passes. Pass one maps every input to `Some(record)` or
//! `None` into its own slot. Pass two counts live slots per chunk, sizes the
//! output exactly, splits it into one disjoint window per chunk, and copies
//! each chunk's survivors into its window in order. No stage shares mutable
//! state; every task owns a distinct index range.

use super::matcher::{field_text, Matcher};
use crate::store::RecordView;
use crate::types::Field;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// Chunks per worker thread used by the compaction pass.
const CHUNKS_PER_THREAD: usize = 4;

fn chunk_len(len: usize) -> usize {
    let chunks = rayon::current_num_threads().max(1) * CHUNKS_PER_THREAD;
    len.div_ceil(chunks).max(1)
}

/// A slot survives compaction when it holds a record.
#[inline]
pub fn is_live<R>(slot: &Option<R>) -> bool {
    slot.is_some()
}

/// Keep the records the matcher accepts, in input order.
pub fn filter<R>(records: &[R], matcher: &Matcher) -> Vec<R>
where
    R: RecordView + Clone + Default + Send + Sync,
{
    let slots: Vec<Option<R>> = records
        .par_iter()
        .map(|record| matcher.matches(record).then(|| record.clone()))
        .collect();
    compact(slots)
}

/// Move live slots into an exactly sized vector, preserving order.
pub fn compact<R>(mut slots: Vec<Option<R>>) -> Vec<R>
where
    R: Default + Send + Sync,
{
    let chunk = chunk_len(slots.len());
    let counts: Vec<usize> = slots
        .par_chunks(chunk)
        .map(|part| part.iter().filter(|slot| is_live(slot)).count())
        .collect();
    let total: usize = counts.par_iter().sum();

    let mut out: Vec<R> = Vec::with_capacity(total);
    out.resize_with(total, R::default);

    let mut windows: Vec<&mut [R]> = Vec::with_capacity(counts.len());
    let mut rest = out.as_mut_slice();
    for &count in &counts {
        let (window, tail) = std::mem::take(&mut rest).split_at_mut(count);
        windows.push(window);
        rest = tail;
    }

    slots
        .par_chunks_mut(chunk)
        .zip(windows.into_par_iter())
        .for_each(|(part, window)| {
            let live = part.iter_mut().filter_map(Option::take);
            for (dst, record) in window.iter_mut().zip(live) {
                *dst = record;
            }
        });
    out
}

/// Stable parallel sort, ascending. Text fields compare by bytes, size
/// numerically.
pub fn sort_by_field<R>(records: &mut [R], field: Field)
where
    R: RecordView + Send,
{
    match field {
        Field::Size => records.par_sort_by_key(|record| record.size()),
        _ => records.par_sort_by(|a, b| {
            let left = field_text(a, field).unwrap_or_default().as_bytes();
            let right = field_text(b, field).unwrap_or_default().as_bytes();
            left.cmp(right)
        }),
    }
}

/// Reverse in place by swapping mirrored pairs in parallel.
pub fn reverse<R: Send>(records: &mut [R]) {
    let mid = records.len() / 2;
    let (front, back) = records.split_at_mut(mid);
    front
        .par_iter_mut()
        .zip(back.par_iter_mut().rev())
        .for_each(|(a, b)| std::mem::swap(a, b));
}

pub fn shuffle<R>(records: &mut [R]) {
    records.shuffle(&mut rand::thread_rng());
}

/// Drop the first `n` records.
pub fn skip<R>(mut records: Vec<R>, n: usize) -> Vec<R> {
    records.drain(..n.min(records.len()));
    records
}

/// Keep at most the first `n` records.
pub fn take<R>(mut records: Vec<R>, n: usize) -> Vec<R> {
    records.truncate(n);
    records
}

/// Sum of sizes.
pub fn total_size<R: RecordView + Sync>(records: &[R]) -> u64 {
    records.par_iter().map(|record| record.size()).sum()
}

/// Record count per device label.
pub fn devices<R: RecordView + Sync>(records: &[R]) -> BTreeMap<String, usize> {
    records
        .par_iter()
        .fold(BTreeMap::new, |mut counts, record| {
            *counts.entry(record.device().to_string()).or_insert(0) += 1;
            counts
        })
        .reduce(BTreeMap::new, |mut left, right| {
            for (device, count) in right {
                *left.entry(device).or_insert(0) += count;
            }
            left
        })
}

/// Records whose digest was already seen with a different size.
///
/// Empty digests and zero sizes are ignored. The first size seen for a digest
/// is the reference.
pub fn digest_conflicts<R>(records: &[R]) -> Vec<R>
where
    R: RecordView + Clone,
{
    let mut first_size: HashMap<&str, u64> = HashMap::new();
    let mut conflicts = Vec::new();
    for record in records {
        if record.digest().is_empty() || record.size() == 0 {
            continue;
        }
        match first_size.get(record.digest()) {
            None => {
                first_size.insert(record.digest(), record.size());
            }
            Some(size) if *size != record.size() => conflicts.push(record.clone()),
            Some(_) => {}
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;
    use crate::types::MatchMethod;

    fn rec(key: &str, size: u64) -> Record {
        Record {
            key: key.to_string(),
            digest: String::new(),
            size,
            modified: String::new(),
        }
    }

    fn keys(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_filter_preserves_order() {
        let input: Vec<Record> = (0..1000).map(|i| rec(&format!("d:/f{}", i), i)).collect();
        let matcher = Matcher::new(MatchMethod::EndWith, Field::Path, "7", false).unwrap();
        let out = filter(&input, &matcher);
        assert_eq!(out.len(), 100);
        assert!(out.windows(2).all(|w| w[0].size < w[1].size));
        assert!(out.iter().all(|r| r.key.ends_with('7')));
    }

    #[test]
    fn test_negation_is_exact_complement() {
        let input: Vec<Record> = (0..257).map(|i| rec(&format!("d:/{}", i), i)).collect();
        let yes = Matcher::new(MatchMethod::Contain, Field::Path, "1", false).unwrap();
        let no = Matcher::new(MatchMethod::Contain, Field::Path, "1", true).unwrap();
        let matched = filter(&input, &yes);
        let unmatched = filter(&input, &no);
        assert_eq!(matched.len() + unmatched.len(), input.len());
        assert!(matched.iter().all(|r| !unmatched.contains(r)));
    }

    #[test]
    fn test_compact_handles_empty_and_all_dead() {
        assert!(compact::<Record>(Vec::new()).is_empty());
        assert!(compact::<Record>(vec![None, None, None]).is_empty());
        let out = compact(vec![None, Some(rec("a", 1)), None, Some(rec("b", 2))]);
        assert_eq!(keys(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_by_size_ascending() {
        let mut records = vec![rec("c", 3), rec("a", 1), rec("b", 2)];
        sort_by_field(&mut records, Field::Size);
        assert_eq!(records.iter().map(|r| r.size).collect::<Vec<_>>(), vec![1, 2, 3]);
        reverse(&mut records);
        assert_eq!(records.iter().map(|r| r.size).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_reverse_mirrors_ties() {
        let mut records = vec![rec("2a", 2), rec("1x", 1), rec("2b", 2), rec("1y", 1)];
        sort_by_field(&mut records, Field::Size);
        assert_eq!(keys(&records), vec!["1x", "1y", "2a", "2b"]);
        reverse(&mut records);
        assert_eq!(keys(&records), vec!["2b", "2a", "1y", "1x"]);
    }

    #[test]
    fn test_reverse_odd_length() {
        let mut records = vec![rec("a", 0), rec("b", 0), rec("c", 0)];
        reverse(&mut records);
        assert_eq!(keys(&records), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_text_by_bytes() {
        let mut records = vec![rec("d:/b", 0), rec("d:/B", 0), rec("d:/a", 0)];
        sort_by_field(&mut records, Field::Path);
        assert_eq!(keys(&records), vec!["d:/B", "d:/a", "d:/b"]);
    }

    #[test]
    fn test_skip_take_and_totals() {
        let records: Vec<Record> = (1..=5).map(|i| rec(&format!("d{}:/x", i % 2), i)).collect();
        assert_eq!(skip(records.clone(), 3).len(), 2);
        assert_eq!(skip(records.clone(), 30).len(), 0);
        assert_eq!(take(records.clone(), 2).len(), 2);
        assert_eq!(total_size(&records), 15);
        let devices = devices(&records);
        assert_eq!(devices.get("d0"), Some(&2));
        assert_eq!(devices.get("d1"), Some(&3));
    }

    #[test]
    fn test_shuffle_keeps_members() {
        let mut records: Vec<Record> = (0..50).map(|i| rec(&format!("{:02}", i), i)).collect();
        shuffle(&mut records);
        sort_by_field(&mut records, Field::Path);
        assert_eq!(records[0].key, "00");
        assert_eq!(records.len(), 50);
    }

    #[test]
    fn test_digest_conflicts() {
        let mut a = rec("a", 10);
        a.digest = "x".repeat(32);
        let mut b = rec("b", 10);
        b.digest = a.digest.clone();
        let mut c = rec("c", 11);
        c.digest = a.digest.clone();
        let mut d = rec("d", 0);
        d.digest = a.digest.clone();
        let conflicts = digest_conflicts(&[a, b, c, d]);
        assert_eq!(keys(&conflicts), vec!["c"]);
    }
}

use rayon::prelude::*;

use super::descriptor::Descriptor;

/// A query descriptor paired with its nearest train descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}

/// The two nearest train descriptors of every query descriptor by Hamming
/// distance. Fewer than two are returned when `train` is that small.
pub fn knn_match_2(query: &[Descriptor], train: &[Descriptor]) -> Vec<Vec<DescriptorMatch>> {
    query
        .par_iter()
        .enumerate()
        .map(|(query_idx, q)| {
            let mut best: Option<DescriptorMatch> = None;
            let mut second: Option<DescriptorMatch> = None;
            for (train_idx, t) in train.iter().enumerate() {
                let m = DescriptorMatch {
                    query_idx,
                    train_idx,
                    distance: q.hamming(t),
                };
                if best.map_or(true, |b| m.distance < b.distance) {
                    second = best;
                    best = Some(m);
                } else if second.map_or(true, |s| m.distance < s.distance) {
                    second = Some(m);
                }
            }
            best.into_iter().chain(second).collect()
        })
        .collect()
}

/// Keep a match only when its distance is below `ratio` times the distance
/// of the runner-up. Queries without a runner-up are dropped.
pub fn ratio_test_matches(
    query: &[Descriptor],
    train: &[Descriptor],
    ratio: f32,
) -> Vec<DescriptorMatch> {
    knn_match_2(query, train)
        .into_iter()
        .filter_map(|m| {
            if m.len() == 2 && (m[0].distance as f32) < ratio * m[1].distance as f32 {
                Some(m[0])
            } else {
                None
            }
        })
        .collect()
}

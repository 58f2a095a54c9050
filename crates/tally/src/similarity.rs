use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Squared Euclidean distance. Lower is more similar.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
  a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
  position: usize,
  distance: f32,
}

// Max-heap on (distance, position): the worst candidate sits on top
impl Ord for Candidate {
  fn cmp(&self, other: &Self) -> Ordering {
    self.distance.total_cmp(&other.distance).then(self.position.cmp(&other.position))
  }
}

impl PartialOrd for Candidate {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl PartialEq for Candidate {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Candidate {}

/// Exact k-nearest search over `vectors`.
///
/// Returns `(position, distance)` pairs nearest first; equal distances keep
/// the lower position first.
pub fn nearest<'a, I>(vectors: I, query: &[f32], k: usize) -> Vec<(usize, f32)>
where
  I: IntoIterator<Item = &'a [f32]>,
{
  if k == 0 {
    return Vec::new();
  }

  let mut heap = BinaryHeap::with_capacity(k + 1);
  for (position, vector) in vectors.into_iter().enumerate() {
    heap.push(Candidate { position, distance: squared_l2(query, vector) });
    if heap.len() > k {
      heap.pop();
    }
  }

  heap.into_sorted_vec().into_iter().map(|c| (c.position, c.distance)).collect()
}

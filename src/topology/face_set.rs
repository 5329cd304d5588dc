//! Collector for offending face identifiers.

use crate::topology::ids::FaceId;
use hashbrown::HashSet;

/// Unordered set of face ids, filled by quality checks.
///
/// Insertion order is not kept; use [`FaceSet::to_sorted_vec`] when a
/// deterministic listing is needed (e.g. for selection tooling).
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FaceSet {
    faces: HashSet<FaceId>,
}

impl FaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `face` was not already present.
    #[inline]
    pub fn insert(&mut self, face: FaceId) -> bool {
        self.faces.insert(face)
    }

    #[inline]
    pub fn contains(&self, face: FaceId) -> bool {
        self.faces.contains(&face)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.iter().copied()
    }

    /// Face ids in ascending order.
    pub fn to_sorted_vec(&self) -> Vec<FaceId> {
        let mut out: Vec<_> = self.faces.iter().copied().collect();
        out.sort_unstable();
        out
    }
}

impl Extend<FaceId> for FaceSet {
    fn extend<T: IntoIterator<Item = FaceId>>(&mut self, iter: T) {
        self.faces.extend(iter);
    }
}

impl FromIterator<FaceId> for FaceSet {
    fn from_iter<T: IntoIterator<Item = FaceId>>(iter: T) -> Self {
        Self {
            faces: iter.into_iter().collect(),
        }
    }
}

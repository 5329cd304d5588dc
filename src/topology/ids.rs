//! `FaceId` and `CellId`: strong, zero-cost handles for mesh entities
//!
//! Faces and cells are addressed by dense zero-based indices into the
//! per-face and per-cell arrays of a mesh view. Wrapping the raw `usize`
//! keeps the two index spaces from being mixed up: an owner lookup returns a
//! `CellId`, never something that can be used to index face areas.

use std::fmt;

macro_rules! dense_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wraps a raw zero-based index.
            #[inline]
            pub const fn new(raw: usize) -> Self {
                $name(raw)
            }

            /// Returns the raw index.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(raw: usize) -> Self {
                $name(raw)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(id: $name) -> usize {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(
    /// Index of a face in a mesh view. Internal faces occupy `0..n_internal_faces`.
    FaceId
);

dense_id!(
    /// Index of a cell in a mesh view.
    CellId
);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display() {
        let f = FaceId::new(7);
        assert_eq!(format!("{:?}", f), "FaceId(7)");
        assert_eq!(format!("{}", f), "7");
        assert_eq!(format!("{:?}", CellId::new(3)), "CellId(3)");
    }

    #[test]
    fn ordering_follows_raw_index() {
        assert!(FaceId::new(1) < FaceId::new(2));
        assert_eq!(usize::from(CellId::new(9)), 9);
        assert_eq!(CellId::from(4).get(), 4);
    }

    #[test]
    fn serializes_as_plain_integer() {
        let s = serde_json::to_string(&FaceId::new(12)).unwrap();
        assert_eq!(s, "12");
        let back: FaceId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, FaceId::new(12));
    }
}

//! Packed (mesh, triangle) references stored in octree leaves.

use std::fmt;

use crate::accel::AccelError;

/// A triangle of one of the registered meshes, packed into 64 bits.
///
/// The mesh index occupies the high 32 bits and the triangle index the low
/// 32 bits, so a leaf stores one flat `Vec<FaceRef>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceRef(u64);

impl FaceRef {
    #[inline]
    pub const fn new(mesh: u32, face: u32) -> Self {
        Self(((mesh as u64) << 32) | face as u64)
    }

    /// Range-checked constructor from `usize` indices.
    pub fn try_new(mesh: usize, face: usize) -> Result<Self, AccelError> {
        let mesh_index = u32::try_from(mesh).map_err(|_| AccelError::TooManyMeshes(mesh))?;
        let face_index = u32::try_from(face).map_err(|_| AccelError::TooManyTriangles {
            mesh,
            triangles: face,
        })?;
        Ok(Self::new(mesh_index, face_index))
    }

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn mesh_index(self) -> usize {
        (self.0 >> 32) as usize
    }

    #[inline]
    pub const fn face_index(self) -> usize {
        (self.0 & 0xffff_ffff) as usize
    }
}

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh {}, face {}", self.mesh_index(), self.face_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_ref_layout() {
        let face = FaceRef::new(3, 17);

        assert_eq!(face.mesh_index(), 3);
        assert_eq!(face.face_index(), 17);
        assert_eq!(face.raw(), (3u64 << 32) | 17);
        assert_eq!(FaceRef::from_raw(face.raw()), face);
    }

    #[test]
    fn test_face_ref_extremes() {
        let face = FaceRef::new(u32::MAX, u32::MAX);
        assert_eq!(face.mesh_index(), u32::MAX as usize);
        assert_eq!(face.face_index(), u32::MAX as usize);

        // The triangle index never bleeds into the mesh index
        let face = FaceRef::new(0, u32::MAX);
        assert_eq!(face.mesh_index(), 0);
    }

    #[test]
    fn test_face_ref_try_new_range() {
        assert_eq!(FaceRef::try_new(1, 2), Ok(FaceRef::new(1, 2)));

        #[cfg(target_pointer_width = "64")]
        {
            let too_big = u32::MAX as usize + 1;
            assert_eq!(
                FaceRef::try_new(too_big, 0),
                Err(AccelError::TooManyMeshes(too_big))
            );
            assert!(matches!(
                FaceRef::try_new(0, too_big),
                Err(AccelError::TooManyTriangles { mesh: 0, .. })
            ));
        }
    }

    #[test]
    fn test_face_ref_display() {
        assert_eq!(FaceRef::new(2, 5).to_string(), "mesh 2, face 5");
    }
}

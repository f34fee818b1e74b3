use crate::Vec3;

/// Orthonormal basis `(s, t, n)` around a surface normal.
///
/// `to_local` maps world directions into the frame, where the normal is +Z.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    pub s: Vec3,
    pub t: Vec3,
    pub n: Vec3,
}

impl Frame {
    /// Build a frame around a unit normal.
    ///
    /// Tangents come from the branchless construction of Duff et al.,
    /// which stays continuous everywhere except across `n.z = 0` sign flips.
    pub fn from_normal(n: Vec3) -> Self {
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        let s = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let t = Vec3::new(b, sign + n.y * n.y * a, -n.y);

        Self { s, t, n }
    }

    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.s), v.dot(self.t), v.dot(self.n))
    }

    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.s * v.x + self.t * v.y + self.n * v.z
    }

    /// Cosine of the angle between a local direction and the normal.
    #[inline]
    pub fn cos_theta(v: Vec3) -> f32 {
        v.z
    }

    #[inline]
    pub fn sin_theta2(v: Vec3) -> f32 {
        (1.0 - v.z * v.z).max(0.0)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            s: Vec3::X,
            t: Vec3::Y,
            n: Vec3::Z,
        }
    }
}

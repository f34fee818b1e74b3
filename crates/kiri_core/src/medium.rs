//! Participating-media bookkeeping carried by surfaces.
//!
//! The media themselves live in the renderer's shading layer; surfaces and
//! intersections only refer to them by handle.

/// Opaque handle into the renderer's medium table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediumId(pub u32);

/// The media on the inside and outside of a surface.
///
/// `None` means vacuum. "Outside" is the side the interpolated shading
/// normal points to, which is the side `Intersection::medium_towards`
/// picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediumInterface {
    pub inside: Option<MediumId>,
    pub outside: Option<MediumId>,
}

impl MediumInterface {
    /// Same medium on both sides.
    pub fn new(medium: Option<MediumId>) -> Self {
        Self {
            inside: medium,
            outside: medium,
        }
    }

    pub fn with_sides(inside: Option<MediumId>, outside: Option<MediumId>) -> Self {
        Self { inside, outside }
    }

    /// True when crossing the surface changes the medium.
    pub fn is_transition(&self) -> bool {
        self.inside != self.outside
    }
}

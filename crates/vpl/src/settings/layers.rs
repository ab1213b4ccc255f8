use bitflags::bitflags;

// Debug visualization layers drawn on top of the lit scene. All of them are
// line geometry handed to the backend after the lighting passes.
bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DebugLayers: u32 {
        /// ray segments that hit something
        const PATH_RAYS = 1 << 0;
        /// final segments of paths that escaped the scene
        const LOST_RAYS = 1 << 1;
        /// small crosses at every VPL position
        const HIT_POINTS = 1 << 2;
        /// short segments along each VPL normal
        const HIT_NORMALS = 1 << 3;

        const PATHS =
            DebugLayers::PATH_RAYS.bits()
            | DebugLayers::LOST_RAYS.bits();

        const VPLS =
            DebugLayers::HIT_POINTS.bits()
            | DebugLayers::HIT_NORMALS.bits();
    }
}

impl Default for DebugLayers {
    fn default() -> Self {
        DebugLayers::HIT_POINTS
    }
}

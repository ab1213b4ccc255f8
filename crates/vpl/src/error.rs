use thiserror::Error;

/// Structural problems with the scene description. All of these are fatal:
/// they are detected before (or instead of) simulating a frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("object name `{0}` is used by more than one object")]
    DuplicateObjectName(String),

    #[error("object `{0}` has no shape to intersect against")]
    MissingShape(String),

    #[error("object `{0}` has a singular transform (zero scale?)")]
    SingularTransform(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// floor(rho^bounce * N) reached zero, so a VPL at this depth has no
    /// defined weight
    #[error(
        "no surviving rays at bounce {bounce} (particle count {particle_count}, \
         mean reflectivity {mean_reflectivity}); VPL compensation would divide by zero"
    )]
    ZeroSurvivors {
        particle_count: u32,
        mean_reflectivity: f32,
        bounce: u32,
    },
}

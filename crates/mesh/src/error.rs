use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug, Error)]
pub enum MeshError {
    /// The model output carried more (or fewer) than one mesh in its batch dimension.
    #[error("expected a batch of exactly one mesh, got {batch}")]
    BatchSize { batch: usize },

    #[error("face {face} has {got} vertices, expected {expected}")]
    RaggedFace {
        face: usize,
        expected: usize,
        got: usize,
    },

    #[error("expected {expected} points for the declared shape, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("vertices per face must be positive")]
    EmptyFaces,

    /// The requested face arity does not match the tensor it is applied to.
    #[error("cannot reshape faces of {actual} vertices into faces of {requested} vertices")]
    FaceArity { requested: usize, actual: usize },

    #[error("face index {index} exceeds vertex count {vertex_count}")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("face index count {indices} is not a multiple of {vertices_per_face}")]
    PartialFace {
        indices: usize,
        vertices_per_face: usize,
    },

    #[error("malformed face coordinates: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::geometry::{Triangle, Vector3};

/// Raw per-face vertex coordinates as produced by a mesh generation model.
///
/// Logically this is a tensor of shape `(1, F, V, 3)`: a batch of one mesh with `F` faces of
/// `V` vertices each. Vertices shared between faces are repeated for every face that uses them,
/// so the points are stored flat, face after face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCoordinates {
    faces: usize,
    vertices_per_face: usize,
    points: Vec<Vector3>,
}

/// Nested JSON form of the tensor: `[[[[x, y, z], ...], ...]]`.
type BatchJson = Vec<Vec<Vec<[f32; 3]>>>;

impl FaceCoordinates {
    /// Wraps an already flattened point list.
    ///
    /// `points` must hold exactly `faces * vertices_per_face` entries.
    pub fn new(faces: usize, vertices_per_face: usize, points: Vec<Vector3>) -> Result<Self> {
        let expected = faces * vertices_per_face;
        if points.len() != expected {
            return Err(MeshError::ShapeMismatch {
                expected,
                got: points.len(),
            });
        }
        Ok(Self {
            faces,
            vertices_per_face,
            points,
        })
    }

    /// Builds the tensor from its nested batch form, dropping the batch dimension.
    pub fn from_batch(batch: BatchJson) -> Result<Self> {
        if batch.len() != 1 {
            return Err(MeshError::BatchSize { batch: batch.len() });
        }
        let faces = batch.into_iter().next().unwrap_or_default();
        let vertices_per_face = faces.first().map_or(0, Vec::len);

        let mut points = Vec::with_capacity(faces.len() * vertices_per_face);
        for (face, vertices) in faces.iter().enumerate() {
            if vertices.len() != vertices_per_face {
                return Err(MeshError::RaggedFace {
                    face,
                    expected: vertices_per_face,
                    got: vertices.len(),
                });
            }
            points.extend(vertices.iter().map(|&[x, y, z]| Vector3::new(x, y, z)));
        }

        Self::new(faces.len(), vertices_per_face, points)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_batch(serde_json::from_str(json)?)
    }

    pub fn read_json<P: AsRef<Path>>(p: P) -> Result<Self> {
        let json = std::fs::read_to_string(p)?;
        Self::from_json(&json)
    }

    /// Serializes back to the nested batch form.
    pub fn to_json(&self) -> Result<String> {
        let faces: Vec<Vec<[f32; 3]>> = self
            .points
            .chunks(self.vertices_per_face.max(1))
            .map(|face| face.iter().map(|p| [p.x, p.y, p.z]).collect())
            .collect();
        Ok(serde_json::to_string(&vec![faces])?)
    }

    /// Unrolls a triangle list into per-face coordinates, three points per face.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        Self {
            faces: triangles.len(),
            vertices_per_face: 3,
            points: triangles.iter().flat_map(|t| [t.p0, t.p1, t.p2]).collect(),
        }
    }

    /// The logical tensor shape, batch dimension included.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.faces, self.vertices_per_face, 3]
    }

    pub fn faces(&self) -> usize {
        self.faces
    }

    pub fn vertices_per_face(&self) -> usize {
        self.vertices_per_face
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }
}

mod error;
mod face_coordinates;
mod geometry;
mod vertex_index;

pub use error::{MeshError, Result};
pub use face_coordinates::*;
pub use geometry::*;
pub use vertex_index::*;

/// A reasonable default mesh to select for unopinionated consumers.
pub type DefaultMesh = VertexIndex;

pub trait TriangleMesh: Sized {
    /// Creates a TriangleMesh from a list of triangles, such as the facets of an STL file.
    ///
    /// # Arguments
    ///
    /// * `triangles` - A vector of the triangles of the mesh.
    fn from_triangles(triangles: Vec<Triangle>) -> Self;

    /// Returns the number of triangles that comprises this mesh.
    fn triangle_count(&self) -> usize;

    /// Iterates the triangles of the mesh, in face order.
    fn triangles(&self) -> impl Iterator<Item = Triangle> + '_;
}

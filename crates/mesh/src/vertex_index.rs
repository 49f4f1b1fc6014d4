use log::debug;
use ordered_float::OrderedFloat;

use crate::error::{MeshError, Result};
use crate::face_coordinates::FaceCoordinates;
use crate::geometry::{Triangle, Vector3};
use crate::TriangleMesh;

/// An indexed mesh: a list of distinct points plus faces that refer to them by position.
///
/// Faces all have the same number of vertices and are stored flat in `indices`, one run of
/// `vertices_per_face` indices per face. Storing a 4 byte index instead of a 12 byte point per
/// face vertex pays off as soon as points are shared, which is the common case. A closed
/// triangle mesh reuses each point about six times.
///
/// ```text
///    *-------*
///    |\     /|      5 points, 4 faces
///    | \   / |
///    |   *   |      unrolled:  4 faces * 3 points * 12b = 144b
///    | /   \ |      indexed:   5 points * 12b + 4 faces * 3 * 4b = 108b
///    |/     \|
///    *-------*
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VertexIndex {
    points: Vec<Vector3>,
    indices: Vec<u32>,
    vertices_per_face: usize,
}

type PointKey = [OrderedFloat<f32>; 3];

fn point_key(p: &Vector3) -> PointKey {
    [OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z)]
}

/// Collapses coordinate-identical points.
///
/// Equality is exact: points that differ in any bit of any coordinate (other than the sign of
/// zero) stay distinct. The distinct points come back sorted by `(x, y, z)` along with the
/// position of every input point in that sorted list.
fn dedup_points(points: &[Vector3]) -> (Vec<Vector3>, Vec<u32>) {
    let keys: Vec<PointKey> = points.iter().map(point_key).collect();

    let mut distinct = keys.clone();
    distinct.sort_unstable();
    distinct.dedup();

    // Every key is present in `distinct`, so the partition point is its exact position.
    let indices = keys
        .iter()
        .map(|key| distinct.partition_point(|d| d < key) as u32)
        .collect();
    let points = distinct
        .into_iter()
        .map(|[x, y, z]| Vector3::new(x.0, y.0, z.0))
        .collect();
    (points, indices)
}

/// Turns raw per-face coordinates into an indexed mesh.
///
/// The batch dimension is already gone from `coords`; its `F * V` points are deduplicated and
/// the per-point indices regrouped into `F` faces of `vertices_per_face` indices. The result is
/// valid by construction, every index lands inside the point list.
///
/// Fails when `vertices_per_face` is zero or does not match the face arity of `coords`.
pub fn reconstruct(coords: &FaceCoordinates, vertices_per_face: usize) -> Result<VertexIndex> {
    if vertices_per_face == 0 {
        return Err(MeshError::EmptyFaces);
    }
    if coords.faces() > 0 && coords.vertices_per_face() != vertices_per_face {
        return Err(MeshError::FaceArity {
            requested: vertices_per_face,
            actual: coords.vertices_per_face(),
        });
    }

    let (points, indices) = dedup_points(coords.points());
    debug!(
        "deduplicated {} face vertices into {} points",
        coords.points().len(),
        points.len()
    );
    Ok(VertexIndex {
        points,
        indices,
        vertices_per_face,
    })
}

impl VertexIndex {
    /// Builds an indexed mesh from its parts, checking every index against `points`.
    pub fn new(points: Vec<Vector3>, indices: Vec<u32>, vertices_per_face: usize) -> Result<Self> {
        let mesh = Self::from_raw_parts(points, indices, vertices_per_face)?;
        mesh.validate()?;
        Ok(mesh)
    }

    /// Builds an indexed mesh without checking index bounds.
    ///
    /// Only the face layout is checked. Consumers such as the exporters call
    /// [`VertexIndex::validate`] before touching the points.
    pub fn from_raw_parts(
        points: Vec<Vector3>,
        indices: Vec<u32>,
        vertices_per_face: usize,
    ) -> Result<Self> {
        if vertices_per_face == 0 {
            return Err(MeshError::EmptyFaces);
        }
        if indices.len() % vertices_per_face != 0 {
            return Err(MeshError::PartialFace {
                indices: indices.len(),
                vertices_per_face,
            });
        }
        Ok(Self {
            points,
            indices,
            vertices_per_face,
        })
    }

    /// Checks that every face index is an offset into the point list.
    pub fn validate(&self) -> Result<()> {
        match self.max_index() {
            Some(index) if index as usize >= self.points.len() => Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: self.points.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn max_index(&self) -> Option<u32> {
        self.indices.iter().copied().max()
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / self.vertices_per_face
    }

    pub fn vertices_per_face(&self) -> usize {
        self.vertices_per_face
    }

    /// `(F, V)`, the shape of the face index array.
    pub fn face_shape(&self) -> (usize, usize) {
        (self.face_count(), self.vertices_per_face)
    }

    pub fn faces(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.indices.chunks_exact(self.vertices_per_face)
    }

    /// The coordinates of each face, in face order.
    ///
    /// Faces that refer to a missing point are skipped.
    pub fn face_points(&self) -> impl Iterator<Item = Vec<Vector3>> + '_ {
        self.faces().filter_map(|face| {
            face.iter()
                .map(|&i| self.points.get(i as usize).copied())
                .collect::<Option<Vec<_>>>()
        })
    }
}

impl TriangleMesh for VertexIndex {
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let (points, indices) = dedup_points(FaceCoordinates::from_triangles(&triangles).points());
        VertexIndex {
            points,
            indices,
            vertices_per_face: 3,
        }
    }

    fn triangle_count(&self) -> usize {
        self.face_count() * self.vertices_per_face.saturating_sub(2)
    }

    /// Triangles of the mesh; polygons are split into a fan around their first vertex.
    fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.face_points().flat_map(|face| {
            (1..face.len().saturating_sub(1))
                .map(|i| Triangle {
                    p0: face[0],
                    p1: face[i],
                    p2: face[i + 1],
                })
                .collect::<Vec<_>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vector3 {
        Vector3::new(x, y, z)
    }

    #[test]
    fn distinct_points_are_sorted() {
        let (points, indices) = dedup_points(&[v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)]);
        assert_eq!(vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)], points);
        assert_eq!(vec![1, 0, 1], indices);
    }

    #[test]
    fn near_duplicates_stay_distinct() {
        let (points, _) = dedup_points(&[v(0.1, 0.0, 0.0), v(0.1 + f32::EPSILON, 0.0, 0.0)]);
        assert_eq!(2, points.len());
    }

    #[test]
    fn signed_zeros_collapse() {
        let (points, indices) = dedup_points(&[v(0.0, 0.0, 0.0), v(-0.0, 0.0, 0.0)]);
        assert_eq!(1, points.len());
        assert_eq!(vec![0, 0], indices);
    }

    #[test]
    fn reject_zero_vertices_per_face() {
        let coords = FaceCoordinates::new(0, 3, Vec::new()).unwrap();
        assert!(matches!(
            reconstruct(&coords, 0),
            Err(MeshError::EmptyFaces)
        ));
    }

    #[test]
    fn reject_mismatched_arity() {
        let coords = FaceCoordinates::new(1, 4, vec![v(0.0, 0.0, 0.0); 4]).unwrap();
        assert!(matches!(
            reconstruct(&coords, 3),
            Err(MeshError::FaceArity {
                requested: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn validate_catches_index_equal_to_vertex_count() {
        let mesh = VertexIndex::from_raw_parts(vec![v(0.0, 0.0, 0.0); 3], vec![0, 1, 3], 3).unwrap();
        let err = mesh.validate().unwrap_err();
        assert!(matches!(
            err,
            MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        ));
        assert!(VertexIndex::new(vec![v(0.0, 0.0, 0.0); 3], vec![0, 1, 3], 3).is_err());
    }

    #[test]
    fn reject_partial_face() {
        assert!(matches!(
            VertexIndex::from_raw_parts(Vec::new(), vec![0, 1], 3),
            Err(MeshError::PartialFace { .. })
        ));
    }

    #[test]
    fn quads_are_fanned_into_triangles() {
        let mesh = VertexIndex::new(
            vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(1.0, 1.0, 0.0), v(0.0, 1.0, 0.0)],
            vec![0, 1, 2, 3],
            4,
        )
        .unwrap();
        assert_eq!(2, mesh.triangle_count());
        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(2, triangles.len());
        assert_eq!(v(1.0, 1.0, 0.0), triangles[1].p1);
        assert_eq!(v(0.0, 1.0, 0.0), triangles[1].p2);
    }
}

//! Reconstruction of indexed meshes from raw model output.

use std::collections::BTreeSet;

use cad_builder_mesh::{reconstruct, FaceCoordinates, Vector3};
use cad_builder_test_data::{COLLAPSED_FACES, TWO_TRIANGLES_ONE_SHARED_VERTEX};
use float_eq::assert_float_eq;
use proptest::prelude::*;

#[test]
fn two_triangles_sharing_one_vertex() {
    let coords = FaceCoordinates::from_json(TWO_TRIANGLES_ONE_SHARED_VERTEX).unwrap();
    let mesh = reconstruct(&coords, 3).unwrap();

    assert_eq!(5, mesh.vertex_count());
    assert_eq!((2, 3), mesh.face_shape());

    let faces: Vec<&[u32]> = mesh.faces().collect();
    let first: BTreeSet<u32> = faces[0].iter().copied().collect();
    let second: BTreeSet<u32> = faces[1].iter().copied().collect();
    let shared: Vec<u32> = first.intersection(&second).copied().collect();
    assert_eq!(1, shared.len());

    let corner = mesh.points()[shared[0] as usize];
    assert_float_eq!(corner.x, 1.0, abs <= 0.0);
    assert_float_eq!(corner.y, 0.0, abs <= 0.0);
    assert_float_eq!(corner.z, 0.0, abs <= 0.0);
}

#[test]
fn identical_points_collapse_to_one_vertex() {
    let coords = FaceCoordinates::from_json(COLLAPSED_FACES).unwrap();
    let mesh = reconstruct(&coords, 3).unwrap();

    assert_eq!(1, mesh.vertex_count());
    assert_eq!((3, 3), mesh.face_shape());
    assert!(mesh.indices().iter().all(|&i| i == 0));
}

#[test]
fn empty_output_reconstructs_to_empty_mesh() {
    let coords = FaceCoordinates::from_json("[[]]").unwrap();
    let mesh = reconstruct(&coords, 3).unwrap();
    assert_eq!(0, mesh.vertex_count());
    assert_eq!(0, mesh.face_count());
    assert_eq!(None, mesh.max_index());
}

/// Faces drawn from a small coordinate grid so that shared points are common.
fn arb_coords() -> impl Strategy<Value = FaceCoordinates> {
    let coord = (0..4i8).prop_map(|c| c as f32 * 0.5);
    let point = (coord.clone(), coord.clone(), coord).prop_map(|(x, y, z)| Vector3::new(x, y, z));
    (1..5usize, 1..40usize).prop_flat_map(move |(arity, faces)| {
        prop::collection::vec(point.clone(), arity * faces)
            .prop_map(move |points| FaceCoordinates::new(faces, arity, points).unwrap())
    })
}

fn realized_faces(coords: &FaceCoordinates, arity: usize) -> Vec<Vec<[u32; 3]>> {
    let mesh = reconstruct(coords, arity).unwrap();
    mesh.face_points()
        .map(|face| face.iter().map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]).collect())
        .collect()
}

proptest! {
    #[test]
    fn indices_stay_in_range(coords in arb_coords()) {
        let arity = coords.vertices_per_face();
        let mesh = reconstruct(&coords, arity).unwrap();

        prop_assert!(mesh.vertex_count() <= coords.faces() * arity);
        prop_assert_eq!((coords.faces(), arity), mesh.face_shape());
        prop_assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
        prop_assert!(mesh.validate().is_ok());
    }

    #[test]
    fn points_are_distinct(coords in arb_coords()) {
        let mesh = reconstruct(&coords, coords.vertices_per_face()).unwrap();
        let distinct: BTreeSet<[u32; 3]> = mesh
            .points()
            .iter()
            .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
            .collect();
        prop_assert_eq!(distinct.len(), mesh.vertex_count());
    }

    #[test]
    fn faces_realize_the_input(coords in arb_coords()) {
        let arity = coords.vertices_per_face();
        let realized = realized_faces(&coords, arity);
        let input: Vec<Vec<[u32; 3]>> = coords
            .points()
            .chunks(arity)
            .map(|face| face.iter().map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]).collect())
            .collect();
        prop_assert_eq!(&input, &realized);
        prop_assert_eq!(realized, realized_faces(&coords, arity));
    }
}

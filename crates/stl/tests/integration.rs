use cad_builder_mesh::{TriangleMesh, VertexIndex};
use cad_builder_stl::{parse_stl, read_stl, save_stl, to_stl_bytes, StlEncoding, StlReader};
use cad_builder_test_data::STL_CUBE;
use float_eq::assert_float_eq;

#[test]
fn parse_cube() {
    let mesh = parse_stl::<VertexIndex>(STL_CUBE.bytes).unwrap();
    // Expect 12 triangles (2 per face x 6 faces)
    assert_eq!(12, mesh.triangle_count());
}

#[test]
fn read_cube_through_reader_trait() {
    let mut cursor = std::io::Cursor::new(STL_CUBE.bytes);
    let mesh: VertexIndex = cursor.read_stl().unwrap();
    assert_eq!(STL_CUBE.distinct_points, mesh.vertex_count());
}

#[test]
fn ascii_and_binary_encode_the_same_cube() {
    let cube = parse_stl::<VertexIndex>(STL_CUBE.bytes).unwrap();
    for encoding in [StlEncoding::Binary, StlEncoding::Ascii] {
        let again = parse_stl::<VertexIndex>(&to_stl_bytes(&cube, "cube", encoding).unwrap()).unwrap();
        assert_eq!(cube, again, "{encoding:?}");
    }
}

#[test]
fn saved_cube_keeps_its_extent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.stl");
    let cube = parse_stl::<VertexIndex>(STL_CUBE.bytes).unwrap();
    save_stl(&path, &cube, StlEncoding::Binary).unwrap();

    let saved = read_stl::<VertexIndex, _>(&path).unwrap();
    let max_x = saved.points().iter().map(|p| p.x).fold(f32::MIN, f32::max);
    assert_float_eq!(max_x, 20.0, abs <= 0.0001);
}

//! # Primitive Shape Generation
//!
//! Box generation for the backdrop architecture. All shapes are generated
//! with proper face normals.

use super::GeometryData;

/// Generate a box centered at the origin
///
/// Returns a box extending half of each dimension along the respective axis.
/// Each face has four dedicated vertices with normals pointing outward.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let hw = width * 0.5;
    let hh = height * 0.5;
    let hd = depth * 0.5;

    let positions = [
        // Front face
        [-hw, -hh, hd],
        [hw, -hh, hd],
        [hw, hh, hd],
        [-hw, hh, hd],
        // Back face
        [-hw, -hh, -hd],
        [-hw, hh, -hd],
        [hw, hh, -hd],
        [hw, -hh, -hd],
        // Left face
        [-hw, -hh, -hd],
        [-hw, -hh, hd],
        [-hw, hh, hd],
        [-hw, hh, -hd],
        // Right face
        [hw, -hh, hd],
        [hw, -hh, -hd],
        [hw, hh, -hd],
        [hw, hh, hd],
        // Top face
        [-hw, hh, hd],
        [hw, hh, hd],
        [hw, hh, -hd],
        [-hw, hh, -hd],
        // Bottom face
        [-hw, -hh, -hd],
        [hw, -hh, -hd],
        [hw, -hh, hd],
        [-hw, -hh, hd],
    ];

    let normals = [
        // Front face (positive Z)
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        // Back face (negative Z)
        [0.0, 0.0, -1.0],
        [0.0, 0.0, -1.0],
        [0.0, 0.0, -1.0],
        [0.0, 0.0, -1.0],
        // Left face (negative X)
        [-1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        // Right face (positive X)
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        // Top face (positive Y)
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        // Bottom face (negative Y)
        [0.0, -1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = normals.to_vec();

    // Indices for each face (2 triangles per face, counter-clockwise)
    data.indices = vec![
        // Front face
        0, 1, 2, 2, 3, 0, //
        // Back face
        4, 5, 6, 6, 7, 4, //
        // Left face
        8, 9, 10, 10, 11, 8, //
        // Right face
        12, 13, 14, 14, 15, 12, //
        // Top face
        16, 17, 18, 18, 19, 16, //
        // Bottom face
        20, 21, 22, 22, 23, 20,
    ];

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_generation() {
        let block = generate_box(4.0, 6.0, 4.0);
        assert_eq!(block.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(block.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(block.vertex_count(), 24);
        assert_eq!(block.triangle_count(), 12);
    }

    #[test]
    fn test_box_extents() {
        let block = generate_box(2.0, 8.0, 2.0);
        for v in &block.vertices {
            assert!(v[0].abs() <= 1.0);
            assert!(v[1].abs() <= 4.0);
            assert!(v[2].abs() <= 1.0);
        }
    }

    #[test]
    fn test_box_normals_are_unit_axes() {
        let block = generate_box(1.0, 1.0, 1.0);
        assert_eq!(block.vertices.len(), block.normals.len());
        for n in &block.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }
}

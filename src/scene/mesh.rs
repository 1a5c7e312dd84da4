use bon::bon;

use crate::{
    accel::GeometryError,
    geometry::{FloatType, TexturePoint, Triangle, WorldPoint, WorldVector},
};

/// Indexed triangle mesh in object space.
/// All buffers are flat: positions and normals are xyz triples, texture
/// coordinates are uv pairs and faces are triples of vertex indices.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    positions: Vec<FloatType>,
    faces: Vec<u32>,
    normals: Option<Vec<FloatType>>,
    texcoords: Option<Vec<FloatType>>,
}

#[bon]
impl Mesh {
    #[builder]
    pub fn new(
        positions: Vec<FloatType>,
        faces: Vec<u32>,
        normals: Option<Vec<FloatType>>,
        texcoords: Option<Vec<FloatType>>,
    ) -> Self {
        Mesh {
            positions,
            faces,
            normals,
            texcoords,
        }
    }
}

impl Mesh {
    pub fn positions(&self) -> &[FloatType] {
        &self.positions
    }

    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    pub fn normals(&self) -> Option<&[FloatType]> {
        self.normals.as_deref()
    }

    pub fn texcoords(&self) -> Option<&[FloatType]> {
        self.texcoords.as_deref()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len() / 3
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len() / 3
    }

    /// Checks that every buffer has a whole number of elements and that all
    /// faces reference existing vertices.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.positions.len() % 3 != 0 {
            return Err(GeometryError::PositionsNotTriples(self.positions.len()));
        }
        if self.faces.len() % 3 != 0 {
            return Err(GeometryError::FacesNotTriples(self.faces.len()));
        }

        let vertex_count = self.num_vertices();
        if let Some(normals) = &self.normals {
            if normals.len() != 3 * vertex_count {
                return Err(GeometryError::NormalsMismatch {
                    len: normals.len(),
                    expected: 3 * vertex_count,
                });
            }
        }
        if let Some(texcoords) = &self.texcoords {
            if texcoords.len() != 2 * vertex_count {
                return Err(GeometryError::TexcoordsMismatch {
                    len: texcoords.len(),
                    expected: 2 * vertex_count,
                });
            }
        }

        if let Some((i, &vertex)) = self
            .faces
            .iter()
            .enumerate()
            .find(|(_, vertex)| **vertex as usize >= vertex_count)
        {
            return Err(GeometryError::VertexOutOfRange {
                face: i / 3,
                vertex,
                vertex_count,
            });
        }

        Ok(())
    }

    /// Vertex indices of a face. Panics if the face doesn't exist.
    pub fn face(&self, face_index: usize) -> Triangle<usize> {
        let f = &self.faces[3 * face_index..3 * face_index + 3];
        Triangle::new(f[0] as usize, f[1] as usize, f[2] as usize)
    }

    pub fn position(&self, vertex: usize) -> WorldPoint {
        WorldPoint::from_slice(&self.positions[3 * vertex..3 * vertex + 3])
    }

    /// Vertex normal, None if the mesh has no normals or the vertex doesn't exist.
    pub fn normal(&self, vertex: usize) -> Option<WorldVector> {
        let n = self.normals.as_ref()?.get(3 * vertex..3 * vertex + 3)?;
        Some(WorldVector::from_column_slice(n))
    }

    pub fn texcoord(&self, vertex: usize) -> Option<TexturePoint> {
        let t = self.texcoords.as_ref()?.get(2 * vertex..2 * vertex + 2)?;
        Some(TexturePoint::from_slice(t))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use assert2::{assert, let_assert};

    fn quad() -> Mesh {
        Mesh::builder()
            .positions(vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, //
            ])
            .faces(vec![0, 1, 2, 0, 2, 3])
            .build()
    }

    #[test]
    fn counts() {
        let mesh = quad();
        assert!(mesh.num_faces() == 2);
        assert!(mesh.num_vertices() == 4);
        assert!(mesh.normals().is_none());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn face_lookup() {
        let mesh = quad();
        assert!(mesh.face(1) == Triangle::new(0, 2, 3));
        assert!(mesh.position(2) == WorldPoint::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn attribute_lookup_past_the_end() {
        let mesh = Mesh::builder()
            .positions(vec![0.0; 9])
            .faces(vec![0, 1, 2])
            .normals(vec![0.0, 0.0, 1.0])
            .texcoords(vec![0.5, 0.5])
            .build();
        assert!(mesh.normal(0) == Some(WorldVector::new(0.0, 0.0, 1.0)));
        assert!(mesh.normal(1).is_none());
        assert!(mesh.texcoord(0) == Some(TexturePoint::new(0.5, 0.5)));
        assert!(mesh.texcoord(2).is_none());
        assert!(quad().normal(0).is_none());
    }

    #[test]
    fn out_of_range_vertex() {
        let mesh = Mesh::builder()
            .positions(vec![0.0; 9])
            .faces(vec![0, 1, 2, 2, 1, 3])
            .build();
        let_assert!(
            Err(GeometryError::VertexOutOfRange {
                face,
                vertex,
                vertex_count
            }) = mesh.validate()
        );
        assert!(face == 1);
        assert!(vertex == 3);
        assert!(vertex_count == 3);
    }

    #[test]
    fn truncated_buffers() {
        let positions = Mesh::builder().positions(vec![0.0; 8]).faces(vec![]).build();
        assert!(positions.validate() == Err(GeometryError::PositionsNotTriples(8)));

        let faces = Mesh::builder().positions(vec![0.0; 9]).faces(vec![0, 1]).build();
        assert!(faces.validate() == Err(GeometryError::FacesNotTriples(2)));
    }

    #[test]
    fn attribute_length_mismatch() {
        let normals = Mesh::builder()
            .positions(vec![0.0; 9])
            .faces(vec![0, 1, 2])
            .normals(vec![0.0; 6])
            .build();
        assert!(normals.validate() == Err(GeometryError::NormalsMismatch { len: 6, expected: 9 }));

        let texcoords = Mesh::builder()
            .positions(vec![0.0; 9])
            .faces(vec![0, 1, 2])
            .texcoords(vec![0.0; 9])
            .build();
        let expected = GeometryError::TexcoordsMismatch { len: 9, expected: 6 };
        assert!(texcoords.validate() == Err(expected));
    }
}

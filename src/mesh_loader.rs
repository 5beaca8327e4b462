// src/mesh_loader.rs
//! glTF import collaborator: reads the first mesh primitive of a file into
//! a `Geometry` through the same producer interface the generators use.
//! Missing normal or texture-coordinate sets fall back to zeroes.

use crate::error::{EngineError, Result};
use crate::geometry::{Geometry, Vertex};

pub fn load_gltf_bytes(bytes: &[u8]) -> Result<Geometry> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|err| EngineError::Asset(err.to_string()))?;

    let mesh = document
        .meshes()
        .next()
        .ok_or_else(|| EngineError::Asset("glTF file contains no mesh".to_string()))?;
    let primitive = mesh
        .primitives()
        .next()
        .ok_or_else(|| EngineError::Asset("glTF mesh contains no primitive".to_string()))?;

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| EngineError::Asset("glTF primitive has no positions".to_string()))?
        .collect();

    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|normals| normals.collect())
        .unwrap_or_else(|| vec![[0.0; 3]; positions.len()]);

    let tex_coords: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0; 2]; positions.len()]);

    let vertices: Vec<Vertex> = positions
        .into_iter()
        .zip(normals)
        .zip(tex_coords)
        .map(|((position, normal), tex_coord)| Vertex {
            position,
            normal,
            tex_coord,
        })
        .collect();

    let indices: Option<Vec<u32>> = reader.read_indices().map(|i| i.into_u32().collect());

    log::info!(
        "loaded glTF mesh: {} vertices, {} indices",
        vertices.len(),
        indices.as_ref().map_or(0, Vec::len)
    );

    Ok(Geometry::new(vertices, indices))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_gltf_file(path: impl AsRef<std::path::Path>) -> Result<Geometry> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|err| EngineError::Asset(format!("{}: {err}", path.display())))?;
    load_gltf_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_bytes() {
        let result = load_gltf_bytes(b"not a gltf file");
        assert!(matches!(result, Err(EngineError::Asset(_))));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_reports_path() {
        let result = load_gltf_file("does/not/exist.glb");
        match result {
            Err(EngineError::Asset(message)) => assert!(message.contains("exist.glb")),
            Err(other) => panic!("expected asset error, got {other:?}"),
            Ok(_) => panic!("expected asset error, got a geometry"),
        }
    }
}

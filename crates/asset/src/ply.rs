//! Minimal PLY reading: vertex positions, per-vertex normals and
//! fan-triangulated face indices.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, anyhow};
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Ply, Property},
};

/// Read vertex positions from a PLY file.
pub fn read_mesh_v(path: impl AsRef<Path>) -> Result<Vec<[f32; 3]>> {
    let ply = read_ply(path.as_ref())?;
    positions(&ply)
}

/// Read vertex positions and triangulated face indices from a PLY file.
/// A file without faces yields an empty face vector.
pub fn read_mesh_vf(path: impl AsRef<Path>) -> Result<(Vec<[f32; 3]>, Vec<[u32; 3]>)> {
    let ply = read_ply(path.as_ref())?;
    Ok((positions(&ply)?, faces(&ply)?))
}

/// Read vertex positions and per-vertex normals from a PLY file.
/// A file without normals yields an empty normal vector.
pub fn read_mesh_vn(path: impl AsRef<Path>) -> Result<(Vec<[f32; 3]>, Vec<[f32; 3]>)> {
    let ply = read_ply(path.as_ref())?;
    Ok((positions(&ply)?, normals(&ply)?))
}

fn read_ply(path: &Path) -> Result<Ply<DefaultElement>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open PLY file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    Parser::<DefaultElement>::new()
        .read_ply(&mut reader)
        .with_context(|| format!("Failed to parse PLY file: {}", path.display()))
}

fn positions(ply: &Ply<DefaultElement>) -> Result<Vec<[f32; 3]>> {
    let Some(rows) = ply.payload.get("vertex") else {
        return Ok(Vec::new());
    };
    rows.iter()
        .enumerate()
        .map(|(row_no, row)| {
            Ok([
                scalar(row, "x", row_no)?,
                scalar(row, "y", row_no)?,
                scalar(row, "z", row_no)?,
            ])
        })
        .collect()
}

fn normals(ply: &Ply<DefaultElement>) -> Result<Vec<[f32; 3]>> {
    let Some(rows) = ply.payload.get("vertex") else {
        return Ok(Vec::new());
    };
    // The header applies to every row; probing the first is enough.
    if rows.first().is_none_or(|row| row.get("nx").is_none()) {
        return Ok(Vec::new());
    }
    rows.iter()
        .enumerate()
        .map(|(row_no, row)| {
            Ok([
                scalar(row, "nx", row_no)?,
                scalar(row, "ny", row_no)?,
                scalar(row, "nz", row_no)?,
            ])
        })
        .collect()
}

fn faces(ply: &Ply<DefaultElement>) -> Result<Vec<[u32; 3]>> {
    let Some(rows) = ply.payload.get("face") else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let prop = row
            .get("vertex_indices")
            .or_else(|| row.get("vertex_index"))
            .ok_or_else(|| anyhow!("Face {} has no vertex index list", row_no))?;
        let indices = index_list(prop)
            .ok_or_else(|| anyhow!("Face {} has a malformed vertex index list", row_no))?;
        if indices.len() < 3 {
            continue;
        }
        // Triangulate fan
        for tri in 1..(indices.len() - 1) {
            out.push([indices[0], indices[tri], indices[tri + 1]]);
        }
    }
    Ok(out)
}

fn scalar(row: &DefaultElement, name: &str, row_no: usize) -> Result<f32> {
    row.get(name)
        .and_then(scalar_value)
        .ok_or_else(|| anyhow!("Vertex {} has no scalar '{}' property", row_no, name))
}

fn scalar_value(prop: &Property) -> Option<f32> {
    match prop {
        Property::Float(v) => Some(*v),
        Property::Double(v) => Some(*v as f32),
        Property::Char(v) => Some(f32::from(*v)),
        Property::UChar(v) => Some(f32::from(*v)),
        Property::Short(v) => Some(f32::from(*v)),
        Property::UShort(v) => Some(f32::from(*v)),
        Property::Int(v) => Some(*v as f32),
        Property::UInt(v) => Some(*v as f32),
        _ => None,
    }
}

fn index_list(prop: &Property) -> Option<Vec<u32>> {
    let from_i64 = |value: i64| u32::try_from(value).ok();
    match prop {
        Property::ListChar(v) => v.iter().map(|i| from_i64(i64::from(*i))).collect(),
        Property::ListUChar(v) => Some(v.iter().map(|i| u32::from(*i)).collect()),
        Property::ListShort(v) => v.iter().map(|i| from_i64(i64::from(*i))).collect(),
        Property::ListUShort(v) => Some(v.iter().map(|i| u32::from(*i)).collect()),
        Property::ListInt(v) => v.iter().map(|i| from_i64(i64::from(*i))).collect(),
        Property::ListUInt(v) => Some(v.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_WITH_NORMALS: &str = "ply\n\
format ascii 1.0\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
property float nx\n\
property float ny\n\
property float nz\n\
element face 2\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0 0 0 1\n\
1 0 0 0 0 1\n\
1 1 0 0 0 1\n\
0 1 0 0 0 1\n\
3 0 1 2\n\
3 0 2 3\n";

    const QUAD_ONE_FACE: &str = "ply\n\
format ascii 1.0\n\
element vertex 4\n\
property float x\n\
property float y\n\
property float z\n\
element face 1\n\
property list uchar int vertex_indices\n\
end_header\n\
0 0 0\n\
1 0 0\n\
1 1 0\n\
0 1 0\n\
4 0 1 2 3\n";

    fn write_fixture(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fixture.ply");
        std::fs::write(&path, contents).expect("write fixture");
        (dir, path)
    }

    #[test]
    fn reads_positions() {
        let (_dir, path) = write_fixture(QUAD_WITH_NORMALS);
        let v = read_mesh_v(&path).expect("read v");
        assert_eq!(v.len(), 4);
        assert_eq!(v[2], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn reads_faces_as_triangles() {
        let (_dir, path) = write_fixture(QUAD_WITH_NORMALS);
        let (v, f) = read_mesh_vf(&path).expect("read vf");
        assert_eq!(v.len(), 4);
        assert_eq!(f, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn quad_face_is_fan_triangulated() {
        let (_dir, path) = write_fixture(QUAD_ONE_FACE);
        let (_, f) = read_mesh_vf(&path).expect("read vf");
        assert_eq!(f, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn reads_normals_when_present() {
        let (_dir, path) = write_fixture(QUAD_WITH_NORMALS);
        let (v, n) = read_mesh_vn(&path).expect("read vn");
        assert_eq!(v.len(), n.len());
        assert_eq!(n[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_normals_yield_empty_vector() {
        let (_dir, path) = write_fixture(QUAD_ONE_FACE);
        let (v, n) = read_mesh_vn(&path).expect("read vn");
        assert_eq!(v.len(), 4);
        assert!(n.is_empty());
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let (_dir, path) = write_fixture("not a ply file\n");
        assert!(read_mesh_v(&path).is_err());
    }
}

//! Integrity-checked mesh loading into tensors.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Instant,
};

use anyhow::{Result, bail};
use candle_core::{DType, Device, Tensor};
use thiserror::Error;

use crate::ply;
use data::{checksum, repo, repo::DataLayout};

const CAR_MESH_1_MD5: &str = "969f91abdf00bad792ca2af347c58499";
const CAR_MESH_2_MD5: &str = "d4aa0dd4f4609ea1b19aca7d8618d22a";

/// Which mesh attributes to extract, in the order they are returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Vertex positions only.
    V,
    /// Vertex positions and face indices.
    Vf,
    /// Vertex positions and per-vertex normals.
    Vn,
}

impl FromStr for Mode {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v" => Ok(Mode::V),
            "vf" => Ok(Mode::Vf),
            "vn" => Ok(Mode::Vn),
            other => Err(LoadError::UnsupportedMode(other.to_string())),
        }
    }
}

/// Errors surfaced while validating and loading a sample mesh.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Checksum for {path} is incorrect, expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("Unsupported mode {0}")]
    UnsupportedMode(String),
    #[error("Failed to load mesh {path}, missing {attribute} attribute")]
    MissingAttribute {
        path: PathBuf,
        attribute: &'static str,
    },
    #[error("skip_every must be at least 1")]
    ZeroStride,
}

/// Source of raw mesh attributes, one reader per extraction mode.
pub trait MeshSource {
    fn read_v(&self, path: &Path) -> Result<Vec<[f32; 3]>>;
    fn read_vf(&self, path: &Path) -> Result<(Vec<[f32; 3]>, Vec<[u32; 3]>)>;
    fn read_vn(&self, path: &Path) -> Result<(Vec<[f32; 3]>, Vec<[f32; 3]>)>;
}

/// Default source backed by the PLY reader.
pub struct PlySource;

impl MeshSource for PlySource {
    fn read_v(&self, path: &Path) -> Result<Vec<[f32; 3]>> {
        ply::read_mesh_v(path)
    }

    fn read_vf(&self, path: &Path) -> Result<(Vec<[f32; 3]>, Vec<[u32; 3]>)> {
        ply::read_mesh_vf(path)
    }

    fn read_vn(&self, path: &Path) -> Result<(Vec<[f32; 3]>, Vec<[f32; 3]>)> {
        ply::read_mesh_vn(path)
    }
}

enum RawAttribute {
    Float(Vec<[f32; 3]>),
    Index(Vec<[u32; 3]>),
}

impl RawAttribute {
    fn is_empty(&self) -> bool {
        match self {
            RawAttribute::Float(rows) => rows.is_empty(),
            RawAttribute::Index(rows) => rows.is_empty(),
        }
    }

    /// Keep every `skip_every`-th row, starting at row 0.
    fn subsample(self, skip_every: usize) -> Self {
        match self {
            RawAttribute::Float(rows) => {
                RawAttribute::Float(rows.into_iter().step_by(skip_every).collect())
            }
            RawAttribute::Index(rows) => {
                RawAttribute::Index(rows.into_iter().step_by(skip_every).collect())
            }
        }
    }

    fn into_tensor(self, device: &Device, dtype: DType) -> Result<Tensor> {
        let tensor = match self {
            RawAttribute::Float(rows) => {
                let n = rows.len();
                let flat: Vec<f32> = rows.into_iter().flatten().collect();
                Tensor::from_vec(flat, (n, 3), device)?
            }
            RawAttribute::Index(rows) => {
                let n = rows.len();
                let flat: Vec<u32> = rows.into_iter().flatten().collect();
                Tensor::from_vec(flat, (n, 3), device)?
            }
        };
        Ok(tensor.to_dtype(dtype)?)
    }
}

/// Load mesh attributes from `path` after verifying its MD5 digest.
///
/// `skip_every` keeps every Nth row starting at row 0, applied to each
/// attribute independently. Attributes come back in the order named by
/// `mode`: `"v"` -> `[vertices]`, `"vf"` -> `[vertices, faces]`,
/// `"vn"` -> `[vertices, normals]`.
pub fn load_mesh(
    path: impl AsRef<Path>,
    expected_md5: &str,
    skip_every: usize,
    mode: &str,
    device: &Device,
    dtype: DType,
) -> Result<Vec<Tensor>> {
    load_mesh_with(
        &PlySource,
        path.as_ref(),
        expected_md5,
        skip_every,
        mode,
        device,
        dtype,
    )
}

/// Same as [`load_mesh`], reading raw attributes through `source`.
pub fn load_mesh_with(
    source: &dyn MeshSource,
    path: &Path,
    expected_md5: &str,
    skip_every: usize,
    mode: &str,
    device: &Device,
    dtype: DType,
) -> Result<Vec<Tensor>> {
    if skip_every == 0 {
        bail!(LoadError::ZeroStride);
    }
    let mode: Mode = mode.parse()?;

    let actual = checksum::md5_hex(path)?;
    if actual != expected_md5 {
        bail!(LoadError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected_md5.to_string(),
            actual,
        });
    }

    log::info!("Loading mesh {}...", path.display());
    let start = Instant::now();

    let attrs: Vec<(RawAttribute, &'static str)> = match mode {
        Mode::V => {
            let v = source.read_v(path)?;
            vec![(RawAttribute::Float(v), "vertex")]
        }
        Mode::Vf => {
            let (v, f) = source.read_vf(path)?;
            vec![
                (RawAttribute::Float(v), "vertex"),
                (RawAttribute::Index(f), "face"),
            ]
        }
        Mode::Vn => {
            let (v, n) = source.read_vn(path)?;
            vec![
                (RawAttribute::Float(v), "vertex"),
                (RawAttribute::Float(n), "normal"),
            ]
        }
    };

    let mut tensors = Vec::with_capacity(attrs.len());
    for (attr, name) in attrs {
        if attr.is_empty() {
            bail!(LoadError::MissingAttribute {
                path: path.to_path_buf(),
                attribute: name,
            });
        }
        tensors.push(attr.subsample(skip_every).into_tensor(device, dtype)?);
    }

    log::info!("Done in {:.3}s", start.elapsed().as_secs_f64());
    Ok(tensors)
}

/// Load the first sample car mesh from the pinned example-data
/// repository, fetching the repository first if needed.
pub fn load_car_1_mesh(
    layout: &DataLayout,
    skip_every: usize,
    mode: &str,
    device: &Device,
    dtype: DType,
) -> Result<Vec<Tensor>> {
    let root = repo::fetch_example_data(layout)?;
    load_mesh(
        root.join("meshes").join("car-mesh-1.ply"),
        CAR_MESH_1_MD5,
        skip_every,
        mode,
        device,
        dtype,
    )
}

/// Load the second sample car mesh from the pinned example-data
/// repository, fetching the repository first if needed.
pub fn load_car_2_mesh(
    layout: &DataLayout,
    skip_every: usize,
    mode: &str,
    device: &Device,
    dtype: DType,
) -> Result<Vec<Tensor>> {
    let root = repo::fetch_example_data(layout)?;
    load_mesh(
        root.join("meshes").join("car-mesh-2.ply"),
        CAR_MESH_2_MD5,
        skip_every,
        mode,
        device,
        dtype,
    )
}

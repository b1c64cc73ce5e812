//! Sample-asset loading for the example scripts.
//! Integrity-checked PLY mesh extraction into tensors, plus the named
//! entry points for the pinned sample meshes.

pub mod mesh;
pub mod ply;

pub use mesh::{LoadError, Mode, load_car_1_mesh, load_car_2_mesh, load_mesh};

//! Demo entry point: fetch the pinned example data and load one of the
//! sample car meshes, standing in for the visualization scripts.

use anyhow::Result;
use candle_core::{DType, Device};
use data::repo::DataLayout;

fn parse_mesh_arg() -> u32 {
    // Accept: --mesh=1|2
    let mut mesh = 1;
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--mesh=") {
            mesh = match val {
                "1" => 1,
                "2" => 2,
                other => {
                    eprintln!("[warn] Unknown mesh '{}', falling back to 1.", other);
                    1
                }
            };
        }
    }
    mesh
}

fn parse_stride_arg() -> usize {
    // --stride=N, keep every Nth row; default 1 (keep everything)
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--stride=") {
            match val.parse::<usize>() {
                Ok(n) if n >= 1 => return n,
                _ => {
                    eprintln!("[warn] Invalid stride '{}', falling back to 1.", val);
                    return 1;
                }
            }
        }
    }
    1
}

fn parse_mode_arg() -> String {
    // --mode=v|vf|vn; the loader validates the value
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--mode=") {
            return val.to_string();
        }
    }
    "vf".to_string()
}

fn parse_dtype_arg() -> DType {
    // --dtype=f32|f64
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--dtype=") {
            return match val.to_ascii_lowercase().as_str() {
                "f32" => DType::F32,
                "f64" => DType::F64,
                other => {
                    eprintln!("[warn] Unknown dtype '{}', falling back to f32.", other);
                    DType::F32
                }
            };
        }
    }
    DType::F32
}

fn parse_layout_arg() -> DataLayout {
    // --data-root=PATH puts the checkout under PATH/external/;
    // without it the system temp dir is used.
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--data-root=") {
            return DataLayout::SourceCheckout {
                source_root: val.into(),
            };
        }
    }
    DataLayout::Installed
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mesh = parse_mesh_arg();
    let stride = parse_stride_arg();
    let mode = parse_mode_arg();
    let dtype = parse_dtype_arg();
    let layout = parse_layout_arg();
    log::info!(
        "Loading car mesh {} (stride={}, mode={}, dtype={:?})",
        mesh,
        stride,
        mode,
        dtype
    );

    let device = Device::Cpu;
    let tensors = match mesh {
        2 => asset::load_car_2_mesh(&layout, stride, &mode, &device, dtype)?,
        _ => asset::load_car_1_mesh(&layout, stride, &mode, &device, dtype)?,
    };

    for (i, tensor) in tensors.iter().enumerate() {
        log::info!(
            "Attribute {}: shape {:?}, dtype {:?}, {} elements",
            i,
            tensor.dims(),
            tensor.dtype(),
            tensor.elem_count()
        );
    }

    log::info!("Done. Bye!");
    Ok(())
}

//! Where the weights live and at which precision

use crate::{ModelConfig, Precision};
use anyhow::Result;
use candle_core::{DType, Device, utils};

/// Pick the device and weight dtype for a checkpoint.
///
/// Accelerators get bf16 and the CPU gets f32 unless the config names a
/// precision.
pub fn placement(config: &ModelConfig) -> Result<(Device, DType)> {
    let device = if config.cpu {
        Device::Cpu
    } else {
        accelerator()?
    };

    let precision = config.dtype.unwrap_or(if device.is_cpu() {
        Precision::F32
    } else {
        Precision::Bf16
    });
    Ok((device, precision.into()))
}

fn accelerator() -> Result<Device> {
    if utils::cuda_is_available() {
        return Ok(Device::new_cuda(0)?);
    }
    if utils::metal_is_available() {
        return Ok(Device::new_metal(0)?);
    }

    let feature = if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        "metal"
    } else {
        "cuda"
    };
    tracing::warn!(
        "no accelerator found, generating on the CPU (rebuild with `--features {feature}`)"
    );
    Ok(Device::Cpu)
}

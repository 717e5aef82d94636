// ============================================================
// Layer 6 — Backend Device Placement
// ============================================================
// Maps the backend-neutral DeviceTag onto a concrete Burn
// device and back. Each backend the crate runs on says what
// its host device is and which accelerators it can address.
//
//   NdArray          host only
//   Wgpu             Cpu adapter as host, GPUs by ordinal
//   Autodiff<B>      whatever B supports

use burn::backend::ndarray::NdArrayDevice;
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::prelude::*;

use crate::domain::placement::DeviceTag;
use crate::error::{CheckpointError, Result};

pub trait PlacementBackend: Backend {
    /// Device backed by host memory.
    fn host_device() -> Self::Device;

    /// Accelerator by ordinal, `None` when the backend has none.
    fn accelerator_device(index: usize) -> Option<Self::Device>;

    /// Describe a concrete device.
    fn device_tag(device: &Self::Device) -> DeviceTag;

    /// Concrete device for a tag.
    fn place(target: DeviceTag) -> Result<Self::Device> {
        match target {
            DeviceTag::Host => Ok(Self::host_device()),
            DeviceTag::Accelerator(index) => {
                Self::accelerator_device(index).ok_or(CheckpointError::DeviceUnavailable(index))
            }
        }
    }
}

impl PlacementBackend for NdArray {
    fn host_device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }

    fn accelerator_device(_index: usize) -> Option<NdArrayDevice> {
        None
    }

    fn device_tag(_device: &NdArrayDevice) -> DeviceTag {
        DeviceTag::Host
    }
}

impl PlacementBackend for Wgpu {
    fn host_device() -> WgpuDevice {
        WgpuDevice::Cpu
    }

    fn accelerator_device(index: usize) -> Option<WgpuDevice> {
        Some(WgpuDevice::DiscreteGpu(index))
    }

    fn device_tag(device: &WgpuDevice) -> DeviceTag {
        match device {
            WgpuDevice::Cpu => DeviceTag::Host,
            WgpuDevice::DiscreteGpu(index)
            | WgpuDevice::IntegratedGpu(index)
            | WgpuDevice::VirtualGpu(index) => DeviceTag::Accelerator(*index),
            _ => DeviceTag::Accelerator(0),
        }
    }
}

impl<B: PlacementBackend> PlacementBackend for Autodiff<B> {
    fn host_device() -> B::Device {
        B::host_device()
    }

    fn accelerator_device(index: usize) -> Option<B::Device> {
        B::accelerator_device(index)
    }

    fn device_tag(device: &B::Device) -> DeviceTag {
        B::device_tag(device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndarray_is_host_only() {
        assert_eq!(NdArray::device_tag(&NdArray::host_device()), DeviceTag::Host);
        assert!(matches!(
            NdArray::place(DeviceTag::Accelerator(0)),
            Err(CheckpointError::DeviceUnavailable(0))
        ));
        assert!(NdArray::place(DeviceTag::Host).is_ok());
    }

    #[test]
    fn test_wgpu_tags() {
        assert_eq!(Wgpu::device_tag(&WgpuDevice::Cpu), DeviceTag::Host);
        assert_eq!(Wgpu::device_tag(&WgpuDevice::DiscreteGpu(2)), DeviceTag::Accelerator(2));
        assert_eq!(Wgpu::device_tag(&WgpuDevice::IntegratedGpu(1)), DeviceTag::Accelerator(1));
    }

    #[test]
    fn test_autodiff_delegates() {
        type Ad = Autodiff<NdArray>;
        assert_eq!(Ad::device_tag(&Ad::host_device()), DeviceTag::Host);
        assert!(Ad::accelerator_device(0).is_none());
    }
}

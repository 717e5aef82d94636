// ============================================================
// Layer 3 — Device Placement
// ============================================================
// Where tensors lived when a checkpoint was written, and where
// the caller wants them when it is read back.
//
// The remapping rule only touches accelerator-tagged storage:
//
//   origin        policy            target
//   ──────────    ───────────────   ────────────────
//   Host          any               Host
//   Accelerator   KeepOrigin        same accelerator
//   Accelerator   ForceHost         Host
//   Accelerator   ForceDevice(n)    Accelerator(n)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-neutral description of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceTag {
    /// Host memory (CPU)
    Host,

    /// An accelerator (GPU) by ordinal
    Accelerator(usize),
}

impl DeviceTag {
    pub fn is_accelerator(&self) -> bool {
        matches!(self, Self::Accelerator(_))
    }
}

impl fmt::Display for DeviceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Accelerator(index) => write!(f, "accelerator:{index}"),
        }
    }
}

/// Placement policy applied while a checkpoint is deserialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Restore tensors where they were saved from
    #[default]
    KeepOrigin,

    /// Keep everything in host memory
    ForceHost,

    /// Move accelerator-resident tensors onto this accelerator
    ForceDevice(usize),
}

impl Placement {
    /// Interpret a numeric device selector.
    ///
    /// `None` keeps the origin, a negative value means host only,
    /// anything else selects that accelerator.
    pub fn from_selector(selector: Option<i32>) -> Self {
        match selector {
            None => Self::KeepOrigin,
            Some(index) if index < 0 => Self::ForceHost,
            Some(index) => Self::ForceDevice(index as usize),
        }
    }

    /// Apply the policy to a saved origin and return the target device.
    pub fn resolve(&self, origin: DeviceTag) -> DeviceTag {
        match (origin, self) {
            (DeviceTag::Host, _) => DeviceTag::Host,
            (DeviceTag::Accelerator(_), Self::ForceHost) => DeviceTag::Host,
            (DeviceTag::Accelerator(index), Self::KeepOrigin) => DeviceTag::Accelerator(index),
            (DeviceTag::Accelerator(_), Self::ForceDevice(index)) => DeviceTag::Accelerator(*index),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_mapping() {
        assert_eq!(Placement::from_selector(None), Placement::KeepOrigin);
        assert_eq!(Placement::from_selector(Some(-1)), Placement::ForceHost);
        assert_eq!(Placement::from_selector(Some(0)), Placement::ForceDevice(0));
        assert_eq!(Placement::from_selector(Some(3)), Placement::ForceDevice(3));
    }

    #[test]
    fn test_host_origin_is_never_moved() {
        for policy in [Placement::KeepOrigin, Placement::ForceHost, Placement::ForceDevice(2)] {
            assert_eq!(policy.resolve(DeviceTag::Host), DeviceTag::Host);
        }
    }

    #[test]
    fn test_accelerator_origin_follows_policy() {
        let origin = DeviceTag::Accelerator(1);
        assert_eq!(Placement::KeepOrigin.resolve(origin), DeviceTag::Accelerator(1));
        assert_eq!(Placement::ForceHost.resolve(origin), DeviceTag::Host);
        assert_eq!(Placement::ForceDevice(0).resolve(origin), DeviceTag::Accelerator(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceTag::Host.to_string(), "host");
        assert_eq!(DeviceTag::Accelerator(2).to_string(), "accelerator:2");
    }
}

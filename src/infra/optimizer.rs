// ============================================================
// Layer 6 — Optimizer State
// ============================================================
// Opaque snapshot of an optimizer's internal state (Adam
// moments and so on). The checkpoint never looks inside: it
// stores the bytes Burn's record system produces and hands
// them back on restore.

use burn::{
    module::AutodiffModule,
    optim::Optimizer,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::error::{CheckpointError, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct OptimizerState {
    bytes: Vec<u8>,
}

impl OptimizerState {
    /// Record the current state of `optimizer`.
    pub fn capture<B, M, O>(optimizer: &O) -> Result<Self>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let bytes = Recorder::<B>::record(&recorder, optimizer.to_record(), ())
            .map_err(|e| CheckpointError::Record(format!("optimizer: {e}")))?;
        Ok(Self { bytes })
    }

    /// Load the recorded state into `optimizer`.
    pub fn restore<B, M, O>(&self, optimizer: O, device: &B::Device) -> Result<O>
    where
        B: AutodiffBackend,
        M: AutodiffModule<B>,
        O: Optimizer<M, B>,
    {
        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::default();
        let record = Recorder::<B>::load(&recorder, self.bytes.clone(), device)
            .map_err(|e| CheckpointError::Record(format!("optimizer: {e}")))?;
        Ok(optimizer.load_record(record))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for OptimizerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OptimizerState({} bytes)", self.bytes.len())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::AdamConfig;

    use crate::ml::model::TransformerTagger;

    type Ad = Autodiff<NdArray>;

    #[test]
    fn test_capture_and_restore() {
        let device = Default::default();
        let optim = AdamConfig::new().init::<Ad, TransformerTagger<Ad>>();

        let state = OptimizerState::capture::<Ad, TransformerTagger<Ad>, _>(&optim).unwrap();
        assert!(!state.as_bytes().is_empty());

        let fresh = AdamConfig::new().init::<Ad, TransformerTagger<Ad>>();
        let restored = state
            .restore::<Ad, TransformerTagger<Ad>, _>(fresh, &device)
            .unwrap();
        let again = OptimizerState::capture::<Ad, TransformerTagger<Ad>, _>(&restored).unwrap();
        assert_eq!(again, state);
    }

    #[test]
    fn test_garbage_bytes_fail_to_restore() {
        let device = Default::default();
        let optim = AdamConfig::new().init::<Ad, TransformerTagger<Ad>>();
        let state = OptimizerState::from_bytes(vec![1, 2, 3]);
        assert!(state.restore::<Ad, TransformerTagger<Ad>, _>(optim, &device).is_err());
    }
}

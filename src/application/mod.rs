// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one user-facing goal each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// Fresh checkpoint from a parallel corpus
pub mod init_use_case;

// Checkpoint discovery and top-k prediction
pub mod predict_use_case;

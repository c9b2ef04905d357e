// =============================================================================
// HTTP API — REST surface for the analysis backend
// =============================================================================

pub mod rest;

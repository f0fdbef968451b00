//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the orchestrator
//! against mock adapters.  All tests run on the host with no real
//! hardware required.

mod mock_hw;
mod orchestrator_tests;
mod refresh_flow_tests;
mod resume_tests;

//! Composable shading modules with a contract-checked program linker.
//!
//! The camera, light and fog uniform contracts are declared exactly once
//! and imported into five rendering programs with different vertex layouts.
//! The linker assigns each program its own binding slots, verifies that
//! every importer sees the one canonical layout of each contract, and
//! rejects any mismatched vertex/fragment pairing before anything reaches
//! the GPU.  Geometry, textures and window plumbing stay outside the crate;
//! it consumes well-formed buffers and attribute streams and hands back
//! linked programs and pipelines.

pub mod contract;
pub mod error;
pub mod linker;
pub mod pipeline;
pub mod shading;
pub mod uniform;
pub mod variant;

pub use contract::{Contract, ContractField, WgslType};
pub use error::LinkError;
pub use linker::{BindingAssignment, LinkedProgram, ProgramLinker};
pub use pipeline::Pipelines;
pub use uniform::{CameraState, FogState, LightState, UniformStore};

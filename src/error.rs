// src/error.rs
//! Crate-wide error type and `Result` alias.
//!
//! Configuration errors (shader compilation, uniform-block table drift) are
//! fatal: they are propagated up to startup, reported, and never retried.

use thiserror::Error;

use crate::material::MaterialType;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// Shader compilation or program linking failed for a material type.
    /// Carries the backend's diagnostic log verbatim.
    #[error("shader program for material type {material_type:?} failed to build:\n{log}")]
    ShaderBuild {
        material_type: MaterialType,
        log: String,
    },

    /// A uniform-block role resolved to a name the compiled program does not
    /// declare. The block-role table and the shader source have drifted.
    #[error("uniform block \"{block}\" is not declared by the {material_type:?} shader program")]
    UnknownBlockName {
        block: &'static str,
        material_type: MaterialType,
    },

    /// The buffer set handed to a draw call does not cover every uniform
    /// block the program declares.
    #[error("draw call for material type {material_type:?} bound {bound} uniform blocks, program declares {declared}")]
    IncompleteBlockBindings {
        material_type: MaterialType,
        bound: usize,
        declared: usize,
    },

    /// No suitable graphics adapter was found at startup.
    #[error("no suitable graphics adapter available")]
    AdapterUnavailable,

    #[error("device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("window creation failed: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Mesh file could not be loaded or is missing required data.
    #[error("asset error: {0}")]
    Asset(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Engine error type.
//!
//! Every fallible engine operation returns [`Result`]. The variants split into
//! the same families the frame driver cares about:
//! - setup invariants (duplicate attribute index, attachment point reuse)
//! - exhaustion of a hardware-limited resource
//! - lookups of named things that were never declared or attached
//! - shader build failures, reported with the driver's info log
//! - device/driver failures

use std::path::PathBuf;

use crate::device::{AttachmentPoint, ShaderStage};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no free {resource}: all {limit} are in use")]
    ResourceExhausted { resource: &'static str, limit: u32 },

    #[error("vertex attribute index {index} is declared more than once")]
    DuplicateAttribute { index: u32 },

    #[error("framebuffer already has an attachment named `{name}`")]
    DuplicateAttachment { name: String },

    #[error("framebuffer attachment point {point:?} is already used by `{existing}`")]
    AttachmentPointInUse {
        point: AttachmentPoint,
        existing: String,
    },

    #[error("framebuffer has no attachment named `{name}`")]
    AttachmentNotFound { name: String },

    #[error("framebuffer supports at most {limit} color attachments")]
    TooManyColorAttachments { limit: u32 },

    #[error("framebuffer is incomplete: {status}")]
    IncompleteFramebuffer { status: String },

    #[error("render target has no configured size")]
    UnconfiguredSurface,

    #[error("uniform `{name}` is not an active uniform of the program")]
    UniformNotFound { name: String },

    #[error("shader storage block `{name}` is not declared by the program")]
    StorageBlockNotFound { name: String },

    #[error("{stage:?} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{log}")]
    ProgramLink { log: String },

    #[error("texture has no storage yet; call `init` first")]
    TextureUninitialized,

    #[error("pixel data too short: expected {expected} bytes, got {actual}")]
    PixelDataTooShort { expected: usize, actual: usize },

    #[error("{0} is not supported by this device")]
    Unsupported(&'static str),

    #[error("failed to create {object}: {message}")]
    Device {
        object: &'static str,
        message: String,
    },

    #[error("driver reported error 0x{code:04X}")]
    Driver { code: u32 },

    #[error("failed to decode image {path:?}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Shorthand for the common `Device` case.
    pub(crate) fn device(object: &'static str, message: impl Into<String>) -> Self {
        Self::Device {
            object,
            message: message.into(),
        }
    }
}

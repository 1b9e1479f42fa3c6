use crate::capability::CapabilityLevel;

/// Errors raised while setting up or driving the GPU scene.
///
/// Everything except [`SceneError::NotInitialised`] and
/// [`SceneError::AlreadyInitialised`] is fatal: there is no degraded rendering
/// path, so the driver is expected to shut down.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("requires {required} capabilities, adapter provides {found}")]
    MissingCapability {
        required: CapabilityLevel,
        found: String,
    },
    #[error("shader stage not found: {0}")]
    ShaderNotFound(String),
    #[error("failed to compile shader stage {stage}: {message}")]
    ShaderCompile { stage: String, message: String },
    #[error("failed to link shader program: {0}")]
    ShaderLink(String),
    #[error("resource creation failed: {0}")]
    Resource(String),
    #[error("scene used before initialise()")]
    NotInitialised,
    #[error("scene already initialised")]
    AlreadyInitialised,
}

impl SceneError {
    /// Whether the process must stop rendering after this error.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            SceneError::NotInitialised | SceneError::AlreadyInitialised
        )
    }
}

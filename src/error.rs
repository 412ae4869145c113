use thiserror::Error;

/// Link-time contract violations.  Every variant aborts program composition
/// before anything is submitted to the GPU; there is no recoverable path
/// inside the shading core itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("program `{program}` imports unknown contract `{import}`")]
    MissingImport { program: String, import: String },

    #[error("program `{program}` lists contract `{import}` more than once")]
    DuplicateImport { program: String, import: String },

    #[error(
        "contract `{import}` requires `{required}`, which program `{program}` does not import"
    )]
    MissingDependency {
        program: String,
        import: String,
        required: String,
    },

    #[error("contract `{0}` is already registered with a different layout")]
    LayoutMismatch(String),

    #[error(
        "program `{program}`: fragment stage reads `{field}` but the vertex stage does not provide it"
    )]
    FieldMismatch { program: String, field: String },

    #[error("program `{program}` assigns (group {group}, binding {binding}) twice")]
    BindingCollision {
        program: String,
        group: u32,
        binding: u32,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown fault class index: {0}")]
    UnknownFaultClass(usize),
}

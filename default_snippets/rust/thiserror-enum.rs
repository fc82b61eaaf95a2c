#[derive(Debug, thiserror::Error)]
pub enum ${1:Error} {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

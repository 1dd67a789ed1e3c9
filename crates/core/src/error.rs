#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Context field '{0}' missing from the fetched record")]
    MissingContext(String),
}

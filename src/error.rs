use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("load ruby grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("parser produced no syntax tree for {path}")]
    Parse { path: String },
    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge { path: String, size: u64, limit: u64 },
}

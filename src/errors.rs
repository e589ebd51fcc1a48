use generational_arena::Index;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Node not found in tree arena: {0:?}")]
    NodeNotFound(Index),

    #[error("Invalid tree option {field}: {reason}")]
    InvalidOptions {
        field: &'static str,
        reason: String,
    },

    #[error("Config error: {message}")]
    Config { message: String },
}

pub type TreeResult<T> = Result<T, TreeError>;

use std::path::PathBuf;

pub type DeckResult<T> = Result<T, DeckError>;

#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("deck '{0}' has no slides")]
    EmptyDeck(String),

    #[error("no deck found: {0}")]
    NoDeckFound(String),

    #[error("not renderable: {0}")]
    NotRenderable(String),

    #[error("key {key} is bound twice in {mode} mode")]
    DuplicateBinding { key: String, mode: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn no_deck(msg: impl Into<String>) -> Self {
        Self::NoDeckFound(msg.into())
    }

    pub fn not_renderable(msg: impl Into<String>) -> Self {
        Self::NotRenderable(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

use geochallenge::error::GeoChallengeError;

#[derive(thiserror::Error, Debug)]
pub enum GeoChallengeCliError {
    #[error("Anyhow error")]
    Anyhow(#[from] anyhow::Error),
    #[error("serde JSON error")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("invalid config file")]
    TomlError(#[from] toml::de::Error),
    #[error("geochallenge error")]
    GeoChallengeError(#[from] GeoChallengeError),
    #[error("std IO error")]
    IOError(#[from] std::io::Error),
}

pub type GeoChallengeCliResult<T> = Result<T, GeoChallengeCliError>;

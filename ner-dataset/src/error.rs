//! Tipos de erro do `ner-dataset`.
//!
//! Há dois níveis de falha no pipeline:
//! - **Por documento** ([`Error::EmptyDocument`]): capturadas na
//!   fronteira de cada documento; o documento é descartado e o processamento continua.
//! - **Do corpus** ([`Error::Io`], [`Error::Serialization`], [`Error::Config`]): devolvidas
//!   ao chamador e abortam apenas a etapa de saída em questão.

use thiserror::Error;

/// Result com o erro do crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// O documento não contém nenhuma sentença não vazia.
    #[error("documento {0} não contém texto anotável")]
    EmptyDocument(u32),

    /// Entrada inválida (ex: proporções de split que somam mais de 100%).
    #[error("entrada inválida: {0}")]
    InvalidInput(String),

    /// Falha de E/S ao persistir arquivos do corpus.
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// Falha ao serializar/deserializar JSON.
    #[error("erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuração inválida ou ilegível.
    #[error("erro de configuração: {0}")]
    Config(#[from] config::ConfigError),
}

impl Error {
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// `true` para falhas que afetam só um documento (o pipeline segue em frente).
    pub fn is_document_level(&self) -> bool {
        matches!(self, Error::EmptyDocument(_))
    }
}

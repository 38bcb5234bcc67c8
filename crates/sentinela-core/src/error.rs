use thiserror::Error;

/// Erros comuns da biblioteca Sentinela
#[derive(Error, Debug)]
pub enum Error {
    /// Erro de comunicação com o node Ethereum
    #[error("Erro de RPC: {0}")]
    RpcError(String),

    /// Erro de decodificação de dados on-chain
    #[error("Erro de decodificação: {0}")]
    DecodeError(String),

    /// Entrada fora do contrato esperado
    #[error("Erro de validação: {0}")]
    ValidationError(String),

    /// Erro genérico
    #[error("{0}")]
    Other(String),
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;

/*!
 * Sentinela Traits
 *
 * Traits comuns usados em toda a workspace Sentinela
 */

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{Finding, TransactionEvent};
use ethereum_types::Address;

/// Trait para provedores RPC somente leitura
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Chama um método de contrato em um bloco específico (`None` = latest)
    async fn call(&self, to: Address, data: Vec<u8>, block: Option<u64>) -> Result<Vec<u8>>;

    /// Obtém o código de um contrato
    async fn get_code(&self, address: Address) -> Result<Vec<u8>>;

    /// Obtém o número do bloco atual
    async fn get_block_number(&self) -> Result<u64>;
}

/// Trait para detectores de transações
///
/// Um detector nunca devolve erro ao hospedeiro: falhas de verificação são
/// contidas por log e resultam apenas na ausência do alerta correspondente.
#[async_trait]
pub trait TransactionDetector: Send + Sync {
    /// Nome do detector
    fn name(&self) -> &str;

    /// Processa uma transação e retorna os alertas detectados
    async fn scan(&self, tx: &TransactionEvent) -> Vec<Finding>;
}

use async_trait::async_trait;
use ethereum_types::{Address, H256, U256};
use ethers::abi::{AbiParser, Event, EventExt, RawLog, Token};
use ethers::types::{Log, I256};
use once_cell::sync::Lazy;
use sentinela_core::traits::{RpcProvider, TransactionDetector};
use sentinela_core::types::{Finding, FindingType, Severity, TransactionEvent};
use sentinela_core::utils::{format_address, keccak256};
use std::collections::HashMap;
use std::sync::Arc;

use crate::pool_verifier::PoolVerifier;
use crate::verification_cache::VerificationCache;

/// Assinatura do evento Swap de um pool Uniswap V3
const SWAP_EVENT_ABI: &str = "event Swap(address indexed sender, address indexed recipient, int256 amount0, int256 amount1, uint160 sqrtPriceX96, uint128 liquidity, int24 tick)";

static SWAP_EVENT: Lazy<(H256, Event)> = Lazy::new(|| {
    let event = AbiParser::default().parse_event(SWAP_EVENT_ABI).unwrap();
    let topic = H256::from(keccak256(event.abi_signature().as_bytes()));
    (topic, event)
});

/// Primeiro tópico do evento Swap, para montagem de filtros de logs
pub fn swap_event_topic() -> H256 {
    SWAP_EVENT.0
}

/// Log Swap decodificado com campos nomeados
#[derive(Debug, Clone)]
pub struct SwapLog {
    pub pool: Address,
    pub sender: Address,
    pub recipient: Address,
    pub amount0: I256,
    pub amount1: I256,
    pub sqrt_price_x96: U256,
    pub liquidity: U256,
    pub tick: I256,
}

/// Extrai os logs Swap decodificáveis de uma transação, na ordem original
///
/// Logs com o tópico certo mas corpo indecodificável são descartados aqui.
pub fn filter_swap_logs(logs: &[Log]) -> Vec<SwapLog> {
    logs.iter().filter_map(decode_swap_log).collect()
}

fn decode_swap_log(log: &Log) -> Option<SwapLog> {
    let (topic, event) = &*SWAP_EVENT;
    if log.topics.first() != Some(topic) {
        return None;
    }

    let raw = RawLog {
        topics: log.topics.clone(),
        data: log.data.to_vec(),
    };
    let decoded = event.parse_log(raw).ok()?;
    let mut params: HashMap<String, Token> = decoded
        .params
        .into_iter()
        .map(|p| (p.name, p.value))
        .collect();

    Some(SwapLog {
        pool: log.address,
        sender: params.remove("sender")?.into_address()?,
        recipient: params.remove("recipient")?.into_address()?,
        amount0: I256::from_raw(params.remove("amount0")?.into_int()?),
        amount1: I256::from_raw(params.remove("amount1")?.into_int()?),
        sqrt_price_x96: params.remove("sqrtPriceX96")?.into_uint()?,
        liquidity: params.remove("liquidity")?.into_uint()?,
        tick: I256::from_raw(params.remove("tick")?.into_int()?),
    })
}

/// Detector de swaps em pools Uniswap V3
///
/// Emite um alerta por log Swap cujo endereço emissor é comprovadamente um
/// pool da factory configurada. Logs não verificáveis são apenas ignorados.
pub struct SwapScanner<P> {
    verifier: PoolVerifier<P>,
}

impl<P> SwapScanner<P> {
    /// Cria um scanner para a factory informada
    pub fn new(provider: P, factory: Address) -> Self {
        Self {
            verifier: PoolVerifier::new(provider, factory),
        }
    }

    /// Cria um scanner com cache de verificação compartilhado
    pub fn with_cache(provider: P, factory: Address, cache: Arc<VerificationCache>) -> Self {
        Self {
            verifier: PoolVerifier::with_cache(provider, factory, cache),
        }
    }

    /// Acesso ao verificador de pools
    pub fn verifier(&self) -> &PoolVerifier<P> {
        &self.verifier
    }
}

impl<P: RpcProvider> SwapScanner<P> {
    /// Processa uma transação e emite um alerta por swap em pool legítimo
    pub async fn scan(&self, tx: &TransactionEvent) -> Vec<Finding> {
        let mut findings = Vec::new();

        for swap in filter_swap_logs(&tx.logs) {
            match self.verifier.is_pool(swap.pool, tx.block_number).await {
                Ok(true) => findings.push(swap_finding(&swap)),
                Ok(false) => {
                    tracing::debug!(
                        pool = %format_address(&swap.pool),
                        "log Swap emitido fora de um pool Uniswap V3"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        pool = %format_address(&swap.pool),
                        error = %e,
                        "falha ao verificar pool; log ignorado"
                    );
                }
            }
        }

        findings
    }
}

#[async_trait]
impl<P: RpcProvider> TransactionDetector for SwapScanner<P> {
    fn name(&self) -> &str {
        "UniswapV3SwapDetector"
    }

    async fn scan(&self, tx: &TransactionEvent) -> Vec<Finding> {
        SwapScanner::scan(self, tx).await
    }
}

fn swap_finding(swap: &SwapLog) -> Finding {
    let mut metadata = HashMap::new();
    metadata.insert("poolAddress".to_string(), format_address(&swap.pool));
    metadata.insert("sender".to_string(), format_address(&swap.sender));
    metadata.insert("recipient".to_string(), format_address(&swap.recipient));
    metadata.insert("amount0".to_string(), swap.amount0.to_string());
    metadata.insert("amount1".to_string(), swap.amount1.to_string());
    metadata.insert("liquidity".to_string(), swap.liquidity.to_string());

    Finding {
        name: "Uniswap V3 Swap Detector".to_string(),
        description: "This Bot detects the Swaps executed on Uniswap V3".to_string(),
        alert_id: "FORTA-1".to_string(),
        severity: Severity::Info,
        finding_type: FindingType::Info,
        protocol: "UniswapV3".to_string(),
        metadata,
    }
}

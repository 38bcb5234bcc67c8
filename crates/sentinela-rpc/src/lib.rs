/*!
 * Sentinela RPC
 *
 * Cliente RPC somente leitura para interação com nodes Ethereum
 */

use ethereum_types::{Address, H256};
use ethers::types::Log;
use parking_lot::RwLock;
use sentinela_core::{error::Result, Error};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use web3::{
    transports::{Http, WebSocket},
    types::{BlockId, BlockNumber, Bytes, CallRequest, FilterBuilder, H160, H256 as Web3H256, U64},
    Web3,
};
use async_trait::async_trait;

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub use_cache: bool,
    pub cache_ttl: Duration,
    pub connection_pool_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8545".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            use_cache: true,
            cache_ttl: Duration::from_secs(60),
            connection_pool_size: 10,
        }
    }
}

/// Enum para diferentes tipos de transporte
pub enum TransportType {
    Http(Web3<Http>),
    WebSocket(Web3<WebSocket>),
}

type CallCacheKey = (Address, Vec<u8>, u64);

/// Cliente RPC para Ethereum
///
/// Chamadas fixadas em um bloco histórico são imutáveis e podem ser
/// servidas do cache enquanto a entrada estiver fresca.
pub struct SentinelaRpcClient {
    transport: TransportType,
    config: RpcConfig,
    call_cache: Arc<RwLock<HashMap<CallCacheKey, (Vec<u8>, Instant)>>>,
}

impl SentinelaRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub async fn new_http(config: RpcConfig) -> Result<Self> {
        let transport = Http::new(&config.endpoint)
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via HTTP: {}", e)))?;

        let web3 = Web3::new(transport);

        // Verifica a conexão
        web3.eth()
            .block_number()
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar ao node Ethereum: {}", e)))?;

        Ok(Self {
            transport: TransportType::Http(web3),
            config,
            call_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Cria um novo cliente RPC WebSocket
    pub async fn new_websocket(config: RpcConfig) -> Result<Self> {
        let transport = WebSocket::new(&config.endpoint)
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar via WebSocket: {}", e)))?;

        let web3 = Web3::new(transport);

        // Verifica a conexão
        web3.eth()
            .block_number()
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao conectar ao node Ethereum: {}", e)))?;

        Ok(Self {
            transport: TransportType::WebSocket(web3),
            config,
            call_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Cria um novo cliente baseado na URL
    pub async fn new(config: RpcConfig) -> Result<Self> {
        if config.endpoint.starts_with("ws") {
            Self::new_websocket(config).await
        } else {
            Self::new_http(config).await
        }
    }

    /// Executa um `eth_call` no bloco informado (`None` = latest)
    pub async fn call_at(&self, to: Address, data: Vec<u8>, block: Option<u64>) -> Result<Vec<u8>> {
        // Apenas chamadas fixadas em bloco histórico são cacheáveis
        if self.config.use_cache {
            if let Some(bn) = block {
                let cache = self.call_cache.read();
                if let Some((out, timestamp)) = cache.get(&(to, data.clone(), bn)) {
                    if timestamp.elapsed() < self.config.cache_ttl {
                        return Ok(out.clone());
                    }
                }
            }
        }

        let request = CallRequest {
            to: Some(H160::from_slice(to.as_bytes())),
            data: Some(Bytes(data.clone())),
            ..Default::default()
        };
        let block_id = block.map(|bn| BlockId::Number(BlockNumber::Number(U64::from(bn))));

        let result = match &self.transport {
            TransportType::Http(web3) => web3
                .eth()
                .call(request, block_id)
                .await
                .map_err(|e| Error::RpcError(format!("Falha na chamada RPC: {}", e)))?,
            TransportType::WebSocket(web3) => web3
                .eth()
                .call(request, block_id)
                .await
                .map_err(|e| Error::RpcError(format!("Falha na chamada RPC: {}", e)))?,
        };

        if self.config.use_cache {
            if let Some(bn) = block {
                let mut cache = self.call_cache.write();
                cache.insert((to, data, bn), (result.0.clone(), Instant::now()));
            }
        }

        Ok(result.0)
    }

    /// Obtém o código de um contrato
    pub async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        let result = match &self.transport {
            TransportType::Http(web3) => web3
                .eth()
                .code(H160::from_slice(address.as_bytes()), None)
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter código do contrato: {}", e)))?,
            TransportType::WebSocket(web3) => web3
                .eth()
                .code(H160::from_slice(address.as_bytes()), None)
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter código do contrato: {}", e)))?,
        };

        Ok(result.0)
    }

    /// Obtém o número do bloco atual
    pub async fn get_block_number(&self) -> Result<u64> {
        let block_number = match &self.transport {
            TransportType::Http(web3) => web3
                .eth()
                .block_number()
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter número do bloco: {}", e)))?,
            TransportType::WebSocket(web3) => web3
                .eth()
                .block_number()
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter número do bloco: {}", e)))?,
        };

        Ok(block_number.as_u64())
    }

    /// Busca logs de um intervalo de blocos filtrados pelo primeiro tópico
    pub async fn get_logs(&self, from_block: u64, to_block: u64, topic0: H256) -> Result<Vec<Log>> {
        let filter = FilterBuilder::default()
            .from_block(BlockNumber::Number(U64::from(from_block)))
            .to_block(BlockNumber::Number(U64::from(to_block)))
            .topics(Some(vec![Web3H256::from_slice(topic0.as_bytes())]), None, None, None)
            .build();

        let logs = match &self.transport {
            TransportType::Http(web3) => web3
                .eth()
                .logs(filter)
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter logs: {}", e)))?,
            TransportType::WebSocket(web3) => web3
                .eth()
                .logs(filter)
                .await
                .map_err(|e| Error::RpcError(format!("Falha ao obter logs: {}", e)))?,
        };

        Ok(logs.into_iter().map(convert_log).collect())
    }

    /// Limpa o cache de chamadas
    pub fn clear_cache(&self) {
        let mut cache = self.call_cache.write();
        cache.clear();
    }

    /// Obtém estatísticas do cache
    pub fn cache_stats(&self) -> CacheStats {
        let cache = self.call_cache.read();
        let now = Instant::now();
        let mut expired = 0;

        for (_, (_, timestamp)) in cache.iter() {
            if now.duration_since(*timestamp) > self.config.cache_ttl {
                expired += 1;
            }
        }

        CacheStats {
            total_entries: cache.len(),
            expired_entries: expired,
        }
    }
}

/// Converte um log do formato web3 para o formato consumido pelos detectores
fn convert_log(log: web3::types::Log) -> Log {
    Log {
        address: Address::from_slice(log.address.as_bytes()),
        topics: log
            .topics
            .iter()
            .map(|t| H256::from_slice(t.as_bytes()))
            .collect(),
        data: ethers::types::Bytes::from(log.data.0),
        block_number: log.block_number.map(|n| ethers::types::U64::from(n.as_u64())),
        transaction_hash: log
            .transaction_hash
            .map(|h| H256::from_slice(h.as_bytes())),
        log_index: log.log_index.map(|i| ethers::types::U256::from(i.as_u64())),
        ..Default::default()
    }
}

/// Implementação da trait RpcProvider do sentinela-core
#[async_trait]
impl sentinela_core::traits::RpcProvider for SentinelaRpcClient {
    async fn call(&self, to: Address, data: Vec<u8>, block: Option<u64>) -> Result<Vec<u8>> {
        self.call_at(to, data, block).await
    }

    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        self.get_code(address).await
    }

    async fn get_block_number(&self) -> Result<u64> {
        self.get_block_number().await
    }
}

/// Estatísticas do cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}

/// Pool de conexões RPC
pub struct RpcConnectionPool {
    clients: Vec<Arc<SentinelaRpcClient>>,
    current_index: std::sync::atomic::AtomicUsize,
}

impl RpcConnectionPool {
    /// Cria um novo pool de conexões
    pub async fn new(config: RpcConfig, pool_size: usize) -> Result<Self> {
        let mut clients = Vec::with_capacity(pool_size);

        for _ in 0..pool_size {
            let client = Arc::new(SentinelaRpcClient::new(config.clone()).await?);
            clients.push(client);
        }

        Ok(Self {
            clients,
            current_index: std::sync::atomic::AtomicUsize::new(0),
        })
    }

    /// Obtém o próximo cliente do pool (round-robin)
    pub fn get_client(&self) -> Arc<SentinelaRpcClient> {
        let index = self
            .current_index
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.clients.len();
        self.clients[index].clone()
    }
}

/// Cliente RPC com balanceamento de carga
pub struct LoadBalancedRpcClient {
    pool: RpcConnectionPool,
}

impl LoadBalancedRpcClient {
    /// Cria um novo cliente com balanceamento de carga
    pub async fn new(config: RpcConfig) -> Result<Self> {
        let pool = RpcConnectionPool::new(config.clone(), config.connection_pool_size).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl sentinela_core::traits::RpcProvider for LoadBalancedRpcClient {
    async fn call(&self, to: Address, data: Vec<u8>, block: Option<u64>) -> Result<Vec<u8>> {
        let client = self.pool.get_client();
        client.call_at(to, data, block).await
    }

    async fn get_code(&self, address: Address) -> Result<Vec<u8>> {
        let client = self.pool.get_client();
        client.get_code(address).await
    }

    async fn get_block_number(&self) -> Result<u64> {
        let client = self.pool.get_client();
        client.get_block_number().await
    }
}

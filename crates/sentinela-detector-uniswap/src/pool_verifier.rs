use ethereum_types::{Address, U256};
use sentinela_core::error::{Error, Result};
use sentinela_core::traits::RpcProvider;
use std::sync::Arc;

use crate::pool_address::{compute_pool_address, PoolIdentity};
use crate::verification_cache::VerificationCache;

// Seletores das funções de identidade de um pool Uniswap V3
const TOKEN0_SELECTOR: [u8; 4] = [0x0d, 0xfe, 0x16, 0x81]; // token0()
const TOKEN1_SELECTOR: [u8; 4] = [0xd2, 0x12, 0x20, 0xa7]; // token1()
const FEE_SELECTOR: [u8; 4] = [0xdd, 0xca, 0x3f, 0x43]; // fee()

/// Verificador de identidade de pools Uniswap V3
///
/// Compara o endereço candidato com o endereço derivado da identidade
/// (token0, token1, fee) declarada pelo próprio contrato no bloco da
/// transação, e memoiza o veredito por endereço.
pub struct PoolVerifier<P> {
    provider: P,
    factory: Address,
    cache: Arc<VerificationCache>,
}

impl<P> PoolVerifier<P> {
    /// Cria um verificador com cache próprio de capacidade padrão
    pub fn new(provider: P, factory: Address) -> Self {
        Self {
            provider,
            factory,
            cache: Arc::new(VerificationCache::default()),
        }
    }

    /// Cria um verificador compartilhando um cache existente
    pub fn with_cache(provider: P, factory: Address, cache: Arc<VerificationCache>) -> Self {
        Self {
            provider,
            factory,
            cache,
        }
    }

    /// Acesso ao cache de verificação
    pub fn cache(&self) -> &VerificationCache {
        &self.cache
    }
}

impl<P: RpcProvider> PoolVerifier<P> {
    /// Verifica se `candidate` é um pool legítimo da factory configurada
    ///
    /// Uma falha em qualquer das três leituras propaga como `Err`; cabe ao
    /// chamador tratar o log correspondente como não verificável e seguir
    /// para o próximo.
    pub async fn is_pool(&self, candidate: Address, block: u64) -> Result<bool> {
        if let Some(verified) = self.cache.get(&candidate) {
            return Ok(verified);
        }

        // As três leituras são independentes e aguardadas em conjunto
        let (token0, token1, fee) = futures::try_join!(
            self.read_address(candidate, TOKEN0_SELECTOR, block),
            self.read_address(candidate, TOKEN1_SELECTOR, block),
            self.read_fee(candidate, block),
        )?;

        let expected = compute_pool_address(
            self.factory,
            &PoolIdentity {
                token0,
                token1,
                fee,
            },
        );
        let verified = expected == candidate;

        self.cache.insert(candidate, verified);
        Ok(verified)
    }

    async fn read_word(&self, to: Address, selector: [u8; 4], block: u64) -> Result<[u8; 32]> {
        let out = self.provider.call(to, selector.to_vec(), Some(block)).await?;
        if out.len() < 32 {
            return Err(Error::DecodeError(format!(
                "resposta curta de 0x{:x}",
                to
            )));
        }
        let mut word = [0u8; 32];
        word.copy_from_slice(&out[0..32]);
        Ok(word)
    }

    async fn read_address(&self, to: Address, selector: [u8; 4], block: u64) -> Result<Address> {
        let word = self.read_word(to, selector, block).await?;
        Ok(Address::from_slice(&word[12..32]))
    }

    async fn read_fee(&self, to: Address, block: u64) -> Result<u32> {
        let word = self.read_word(to, FEE_SELECTOR, block).await?;
        Ok(U256::from_big_endian(&word).low_u32())
    }
}

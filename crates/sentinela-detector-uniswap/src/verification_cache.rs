use ethereum_types::Address;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Capacidade padrão do cache de verificação
pub const DEFAULT_CACHE_CAPACITY: usize = 1_000_000;

/// Estatísticas de cache
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub inserts: usize,
    pub evictions: usize,
}

/// Cache LRU de classificações de pools
///
/// A classificação de um endereço (pool legítimo ou não) é um fato estável:
/// uma vez gravada, a entrada só sai por pressão de capacidade. Corridas
/// entre verificações concorrentes da mesma chave produzem apenas buscas
/// redundantes, nunca resultados divergentes.
pub struct VerificationCache {
    cache: Mutex<LruCache<Address, bool>>,
    stats: Mutex<CacheStats>,
}

impl VerificationCache {
    /// Cria um cache com a capacidade informada
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());

        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Obtém uma classificação, atualizando a recência da entrada
    ///
    /// Um `false` gravado é um acerto válido; apenas a ausência da chave
    /// conta como miss.
    pub fn get(&self, address: &Address) -> Option<bool> {
        let mut cache = self.cache.lock();
        match cache.get(address).copied() {
            Some(verified) => {
                self.stats.lock().hits += 1;
                Some(verified)
            }
            None => {
                self.stats.lock().misses += 1;
                None
            }
        }
    }

    /// Insere uma classificação, expulsando a entrada menos recente se o cache estiver cheio
    pub fn insert(&self, address: Address, verified: bool) {
        let mut cache = self.cache.lock();

        if cache.push(address, verified).is_some() {
            self.stats.lock().evictions += 1;
        }

        self.stats.lock().inserts += 1;
    }

    /// Obtém estatísticas do cache
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    /// Obtém o tamanho do cache
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Verifica se o cache está vazio
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for VerificationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

use ethereum_types::{Address, H256, U256};
use once_cell::sync::Lazy;
use sentinela_core::utils::{calculate_create2_address, hex_to_address, hex_to_h256, keccak256};

/// Endereço da factory Uniswap V3 na mainnet
pub static UNISWAP_V3_FACTORY: Lazy<Address> =
    Lazy::new(|| hex_to_address("0x1F98431c8aD98523631AE4a59f267346ea31F984").unwrap());

/// Hash do init code dos pools Uniswap V3
pub static POOL_INIT_CODE_HASH: Lazy<H256> = Lazy::new(|| {
    hex_to_h256("0xe34f199b19b2b4f47f68442619d555527d244f78a3297ea89325f843f87b8b54").unwrap()
});

/// Identidade que determina o endereço de um pool
///
/// A tripla (token0, token1, fee) é imutável depois do deploy; o endereço do
/// pool é uma função pura dela.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolIdentity {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

/// Calcula o endereço determinístico de um pool a partir da factory e da identidade
///
/// O salt é o keccak256 de abi.encode(token0, token1, fee); o endereço segue a
/// derivação CREATE2 com o hash fixo do init code dos pools.
pub fn compute_pool_address(factory: Address, identity: &PoolIdentity) -> Address {
    // abi.encode(address, address, uint24): três palavras de 32 bytes
    let mut encoded = [0u8; 96];
    encoded[12..32].copy_from_slice(identity.token0.as_bytes());
    encoded[44..64].copy_from_slice(identity.token1.as_bytes());
    U256::from(identity.fee).to_big_endian(&mut encoded[64..96]);

    let salt = H256::from(keccak256(&encoded));
    calculate_create2_address(&factory, &salt, &POOL_INIT_CODE_HASH)
}

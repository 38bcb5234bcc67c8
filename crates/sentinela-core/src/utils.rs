/*!
 * Sentinela Utils
 *
 * Utilitários comuns usados em toda a workspace Sentinela
 */

use ethereum_types::{Address, H256, U256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let hex_str = if hex.starts_with("0x") { &hex[2..] } else { hex };
    Address::from_str(hex_str).ok()
}

/// Converte uma string hexadecimal para H256
pub fn hex_to_h256(hex: &str) -> Option<H256> {
    let hex_str = if hex.starts_with("0x") { &hex[2..] } else { hex };
    H256::from_str(hex_str).ok()
}

/// Formata um Address para exibição (hexadecimal minúsculo)
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Formata um U256 em decimal
pub fn format_u256(value: &U256) -> String {
    value.to_string()
}

/// Calcula o hash Keccak-256 de dados
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut result = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut result);
    result
}

/// Calcula o endereço de um contrato criado via CREATE2
///
/// Segue a EIP-1014: keccak256(0xff ++ criador ++ salt ++ hash do init code),
/// com o endereço nos últimos 20 bytes do hash.
pub fn calculate_create2_address(sender: &Address, salt: &H256, init_code_hash: &H256) -> Address {
    let mut buffer = Vec::with_capacity(1 + 20 + 32 + 32);
    buffer.push(0xff);
    buffer.extend_from_slice(sender.as_bytes());
    buffer.extend_from_slice(salt.as_bytes());
    buffer.extend_from_slice(init_code_hash.as_bytes());

    let hash = keccak256(&buffer);
    Address::from_slice(&hash[12..32])
}

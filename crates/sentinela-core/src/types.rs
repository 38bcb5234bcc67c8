/*!
 * Sentinela Types
 *
 * Tipos comuns usados em toda a workspace Sentinela
 */

use ethereum_types::{Address, H256};
use ethers::types::Log;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Severidade de um alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Classificação de um alerta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingType {
    Info,
    Suspicious,
    Degraded,
    Exploit,
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingType::Info => write!(f, "info"),
            FindingType::Suspicious => write!(f, "suspicious"),
            FindingType::Degraded => write!(f, "degraded"),
            FindingType::Exploit => write!(f, "exploit"),
        }
    }
}

/// Alerta imutável emitido por um detector
///
/// Construído uma única vez por evento detectado; nunca modificado depois.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub name: String,
    pub description: String,
    pub alert_id: String,
    pub severity: Severity,
    pub finding_type: FindingType,
    pub protocol: String,
    pub metadata: HashMap<String, String>,
}

/// Chamada interna observada no trace de uma transação
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallFrame {
    pub from: Address,
    pub to: Address,
    pub input: Vec<u8>,
}

/// Evento de transação decodificado, consumido pelos detectores
///
/// Montado pelo runtime hospedeiro a partir do recibo e do trace da
/// transação. Os logs permanecem brutos; cada detector decodifica os
/// eventos que lhe interessam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionEvent {
    pub tx_hash: TransactionHash,
    pub from: Address,
    pub to: Option<Address>,
    pub block_number: u64,
    pub logs: Vec<Log>,
    pub traces: Vec<CallFrame>,
}

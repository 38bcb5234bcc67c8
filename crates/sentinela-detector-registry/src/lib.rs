/*!
 * Sentinela Detector Registry
 *
 * Detecção de criação, atualização e remoção de bots em um registro
 * on-chain por um deployer conhecido.
 */

mod findings;

pub use findings::*;

use async_trait::async_trait;
use ethereum_types::{Address, U256};
use ethers::abi::{AbiParser, Function, Token};
use once_cell::sync::Lazy;
use sentinela_core::traits::TransactionDetector;
use sentinela_core::types::{CallFrame, Finding, TransactionEvent};
use sentinela_core::utils::hex_to_address;

/// Deployer monitorado
pub static DEFAULT_DEPLOYER: Lazy<Address> =
    Lazy::new(|| hex_to_address("0x88dC3a2284FA62e0027d6D6B1fCfDd2141a143b8").unwrap());

/// Registro de bots monitorado
pub static DEFAULT_REGISTRY: Lazy<Address> =
    Lazy::new(|| hex_to_address("0x61447385B019187daa48e91c55c02AF1F1f3F863").unwrap());

/// ABI da criação de bots
pub const CREATE_AGENT_ABI: &str =
    "function createAgent(uint256 agentId, address owner, string metadata, uint256[] chainIds)";
/// ABI da atualização de bots
pub const UPDATE_AGENT_ABI: &str =
    "function updateAgent(uint256 agentId, string metadata, uint256[] chainIds)";
/// ABI da remoção de bots
pub const DELETE_AGENT_ABI: &str = "function deleteAgent(uint256 agentId)";

static REGISTRY_FUNCTIONS: Lazy<Vec<(RegistryAction, [u8; 4], Function)>> = Lazy::new(|| {
    let mut parser = AbiParser::default();
    [
        (RegistryAction::Creation, CREATE_AGENT_ABI),
        (RegistryAction::Update, UPDATE_AGENT_ABI),
        (RegistryAction::Deletion, DELETE_AGENT_ABI),
    ]
    .into_iter()
    .map(|(action, abi)| {
        let function = parser.parse_function(abi).expect("abi parse");
        let selector = function.short_signature();
        (action, selector, function)
    })
    .collect()
});

/// Scanner do registro de bots
///
/// Percorre as chamadas internas de uma transação originada pelo deployer
/// monitorado e emite um alerta por chamada relevante dirigida ao registro.
/// Puro: não faz chamadas on-chain.
pub struct RegistryScanner {
    deployer: Address,
    registry: Address,
}

impl RegistryScanner {
    /// Cria um scanner para o deployer e registro informados
    pub fn new(deployer: Address, registry: Address) -> Self {
        Self { deployer, registry }
    }

    /// Processa uma transação e emite um alerta por chamada relevante
    pub fn scan(&self, tx: &TransactionEvent) -> Vec<Finding> {
        let mut findings = Vec::new();

        if tx.from != self.deployer {
            return findings;
        }

        for frame in &tx.traces {
            if frame.to != self.registry {
                continue;
            }
            if let Some(call) = decode_registry_call(frame) {
                findings.push(registry_finding(&self.deployer, &call));
            }
        }

        findings
    }
}

impl Default for RegistryScanner {
    fn default() -> Self {
        Self::new(*DEFAULT_DEPLOYER, *DEFAULT_REGISTRY)
    }
}

#[async_trait]
impl TransactionDetector for RegistryScanner {
    fn name(&self) -> &str {
        "BotRegistryDetector"
    }

    async fn scan(&self, tx: &TransactionEvent) -> Vec<Finding> {
        RegistryScanner::scan(self, tx)
    }
}

fn decode_registry_call(frame: &CallFrame) -> Option<RegistryCall> {
    if frame.input.len() < 4 {
        return None;
    }
    let selector = [
        frame.input[0],
        frame.input[1],
        frame.input[2],
        frame.input[3],
    ];

    let (action, _, function) = REGISTRY_FUNCTIONS
        .iter()
        .find(|(_, candidate, _)| *candidate == selector)?;

    let tokens = match function.decode_input(&frame.input[4..]) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!(error = %e, "calldata indecodificável para o registro; frame ignorado");
            return None;
        }
    };
    let mut tokens = tokens.into_iter();

    let agent_id = tokens.next()?.into_uint()?;
    match action {
        RegistryAction::Creation => {
            // o segundo argumento (owner) não entra no alerta
            let _owner = tokens.next()?.into_address()?;
            let metadata = tokens.next()?.into_string()?;
            let chain_ids = uint_array(tokens.next()?)?;
            Some(RegistryCall {
                action: *action,
                agent_id,
                metadata,
                chain_ids,
            })
        }
        RegistryAction::Update => {
            let metadata = tokens.next()?.into_string()?;
            let chain_ids = uint_array(tokens.next()?)?;
            Some(RegistryCall {
                action: *action,
                agent_id,
                metadata,
                chain_ids,
            })
        }
        RegistryAction::Deletion => Some(RegistryCall {
            action: *action,
            agent_id,
            metadata: String::new(),
            chain_ids: Vec::new(),
        }),
    }
}

fn uint_array(token: Token) -> Option<Vec<U256>> {
    token
        .into_array()?
        .into_iter()
        .map(Token::into_uint)
        .collect()
}

use ethereum_types::{Address, U256};
use sentinela_core::types::{Finding, FindingType, Severity};
use sentinela_core::utils::{format_address, format_u256};
use std::collections::HashMap;

/// Ação observada sobre o registro de bots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryAction {
    Creation,
    Update,
    Deletion,
}

impl RegistryAction {
    fn label(&self) -> &'static str {
        match self {
            RegistryAction::Creation => "Creation",
            RegistryAction::Update => "Update",
            RegistryAction::Deletion => "Deletion",
        }
    }
}

/// Argumentos decodificados de uma chamada relevante ao registro
///
/// `metadata` e `chain_ids` ficam vazios para remoções, que só carregam o id.
#[derive(Debug, Clone)]
pub struct RegistryCall {
    pub action: RegistryAction,
    pub agent_id: U256,
    pub metadata: String,
    pub chain_ids: Vec<U256>,
}

/// Monta o alerta correspondente a uma chamada observada no registro
pub fn registry_finding(deployer: &Address, call: &RegistryCall) -> Finding {
    let description = match call.action {
        RegistryAction::Creation => format!("New bot created with id: {}", call.agent_id),
        RegistryAction::Update => format!("New update for bot with id: {}", call.agent_id),
        RegistryAction::Deletion => format!("Bot deleted with id: {}", call.agent_id),
    };
    let alert_id = match call.action {
        RegistryAction::Creation => "Nethermind-Bot-Creation",
        RegistryAction::Update => "Nethermind-Bot-Update",
        RegistryAction::Deletion => "Nethermind-Bot-Deletion",
    };

    let mut metadata = HashMap::new();
    metadata.insert("deployer".to_string(), format_address(deployer));
    metadata.insert("agentId".to_string(), format_u256(&call.agent_id));
    metadata.insert("metadata".to_string(), call.metadata.clone());
    metadata.insert(
        "chainIds".to_string(),
        call.chain_ids
            .iter()
            .map(format_u256)
            .collect::<Vec<_>>()
            .join(","),
    );

    Finding {
        name: format!("Nethermind Bots {} Detector", call.action.label()),
        description,
        alert_id: alert_id.to_string(),
        severity: Severity::Info,
        finding_type: FindingType::Info,
        protocol: "ethereum".to_string(),
        metadata,
    }
}

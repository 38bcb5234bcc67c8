use anyhow::Result;
use sentinela_core::types::TransactionEvent;
use sentinela_detector_uniswap::{swap_event_topic, SwapScanner, UNISWAP_V3_FACTORY};
use sentinela_rpc::{RpcConfig, SentinelaRpcClient};
use std::collections::BTreeMap;

/// Varre os últimos blocos em busca de swaps Uniswap V3 verificados.
///
/// Uso: `cargo run --example scan_swaps -- <endpoint RPC>`
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8545".to_string());
    let client = SentinelaRpcClient::new(RpcConfig {
        endpoint,
        ..Default::default()
    })
    .await?;

    let head = client.get_block_number().await?;
    let logs = client
        .get_logs(head.saturating_sub(5), head, swap_event_topic())
        .await?;
    println!("{} logs Swap nos últimos blocos", logs.len());

    // agrupa os logs pela transação de origem
    let mut by_tx: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for log in logs {
        let tx_hash = log.transaction_hash.unwrap_or_default();
        let block_number = log.block_number.map(|n| n.as_u64()).unwrap_or(head);
        by_tx.entry((tx_hash, block_number)).or_default().push(log);
    }

    let scanner = SwapScanner::new(client, *UNISWAP_V3_FACTORY);
    for ((tx_hash, block_number), logs) in by_tx {
        let event = TransactionEvent {
            tx_hash,
            block_number,
            logs,
            ..Default::default()
        };
        for finding in scanner.scan(&event).await {
            println!(
                "[{}] pool {}: {}",
                finding.alert_id,
                finding.metadata.get("poolAddress").map(String::as_str).unwrap_or("?"),
                finding.description
            );
        }
    }

    Ok(())
}

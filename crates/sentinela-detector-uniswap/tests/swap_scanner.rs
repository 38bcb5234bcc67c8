use async_trait::async_trait;
use ethereum_types::{Address, H256, U256};
use ethers::abi::{self, Token};
use ethers::types::{Bytes, Log, I256};
use sentinela_core::error::{Error, Result};
use sentinela_core::traits::{RpcProvider, TransactionDetector};
use sentinela_core::types::TransactionEvent;
use sentinela_core::utils::format_address;
use sentinela_detector_uniswap::{
    compute_pool_address, swap_event_topic, PoolIdentity, SwapScanner, UNISWAP_V3_FACTORY,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// seletores token0() / token1() / fee()
const TOKEN0: [u8; 4] = [0x0d, 0xfe, 0x16, 0x81];
const TOKEN1: [u8; 4] = [0xd2, 0x12, 0x20, 0xa7];
const FEE: [u8; 4] = [0xdd, 0xca, 0x3f, 0x43];

#[derive(Default)]
struct MockChainProvider {
    responses: HashMap<(Address, [u8; 4]), Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl MockChainProvider {
    fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn register_identity(&mut self, target: Address, token0: Address, token1: Address, fee: u32) {
        self.responses.insert((target, TOKEN0), address_word(token0));
        self.responses.insert((target, TOKEN1), address_word(token1));
        self.responses.insert((target, FEE), uint_word(fee as u64));
    }
}

#[async_trait]
impl RpcProvider for MockChainProvider {
    async fn call(&self, to: Address, data: Vec<u8>, _block: Option<u64>) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let selector = [data[0], data[1], data[2], data[3]];
        self.responses
            .get(&(to, selector))
            .cloned()
            .ok_or_else(|| Error::RpcError("execution reverted".into()))
    }

    async fn get_code(&self, _address: Address) -> Result<Vec<u8>> {
        Ok(vec![])
    }

    async fn get_block_number(&self) -> Result<u64> {
        Ok(0)
    }
}

fn address_word(addr: Address) -> Vec<u8> {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(addr.as_bytes());
    word.to_vec()
}

fn uint_word(value: u64) -> Vec<u8> {
    let mut word = [0u8; 32];
    U256::from(value).to_big_endian(&mut word);
    word.to_vec()
}

fn topic_address(addr: Address) -> H256 {
    let mut word = [0u8; 32];
    word[12..32].copy_from_slice(addr.as_bytes());
    H256::from(word)
}

fn swap_log(pool: Address, sender: Address, recipient: Address) -> Log {
    let amount0 = I256::from_dec_str("-5378335736229591174395").unwrap();
    let amount1 = I256::from_dec_str("266508884993980604").unwrap();
    let sqrt_price = U256::from_dec_str("555620238891309147094159455").unwrap();
    let liquidity = U256::from_dec_str("14900188386820019615173").unwrap();

    let data = abi::encode(&[
        Token::Int(amount0.into_raw()),
        Token::Int(amount1.into_raw()),
        Token::Uint(sqrt_price),
        Token::Uint(liquidity),
        Token::Int(I256::from(-99206).into_raw()),
    ]);

    Log {
        address: pool,
        topics: vec![
            swap_event_topic(),
            topic_address(sender),
            topic_address(recipient),
        ],
        data: Bytes::from(data),
        ..Default::default()
    }
}

fn tx_with_logs(logs: Vec<Log>) -> TransactionEvent {
    TransactionEvent {
        block_number: 0,
        logs,
        ..Default::default()
    }
}

fn genuine_pool(provider: &mut MockChainProvider, seed: u8) -> Address {
    let identity = PoolIdentity {
        token0: Address::repeat_byte(seed),
        token1: Address::repeat_byte(seed + 1),
        fee: 10000,
    };
    let pool = compute_pool_address(*UNISWAP_V3_FACTORY, &identity);
    provider.register_identity(pool, identity.token0, identity.token1, identity.fee);
    pool
}

#[tokio::test]
async fn emits_finding_for_swap_in_genuine_pool() {
    let mut provider = MockChainProvider::default();
    let pool = genuine_pool(&mut provider, 0x11);
    let sender = Address::repeat_byte(0x23);
    let recipient = Address::repeat_byte(0x34);

    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let findings = scanner
        .scan(&tx_with_logs(vec![swap_log(pool, sender, recipient)]))
        .await;

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.name, "Uniswap V3 Swap Detector");
    assert_eq!(finding.alert_id, "FORTA-1");
    assert_eq!(finding.protocol, "UniswapV3");
    assert_eq!(finding.metadata["poolAddress"], format_address(&pool));
    assert_eq!(finding.metadata["sender"], format_address(&sender));
    assert_eq!(finding.metadata["recipient"], format_address(&recipient));
    assert_eq!(finding.metadata["amount0"], "-5378335736229591174395");
    assert_eq!(finding.metadata["amount1"], "266508884993980604");
    assert_eq!(finding.metadata["liquidity"], "14900188386820019615173");
}

#[tokio::test]
async fn ignores_swap_from_address_outside_factory() {
    let mut provider = MockChainProvider::default();
    let impostor = Address::repeat_byte(0x66);
    provider.register_identity(
        impostor,
        Address::repeat_byte(0x11),
        Address::repeat_byte(0x22),
        10000,
    );

    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let findings = scanner
        .scan(&tx_with_logs(vec![swap_log(
            impostor,
            Address::repeat_byte(0x23),
            Address::repeat_byte(0x34),
        )]))
        .await;

    assert!(findings.is_empty());
}

#[tokio::test]
async fn transaction_without_swap_logs_yields_nothing() {
    let provider = MockChainProvider::default();
    let calls = provider.call_counter();
    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);

    // log com tópico alheio não chega ao verificador
    let unrelated = Log {
        address: Address::repeat_byte(0x55),
        topics: vec![H256::repeat_byte(0xab)],
        ..Default::default()
    };
    let findings = scanner.scan(&tx_with_logs(vec![unrelated])).await;

    assert!(findings.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mixed_logs_keep_only_genuine_pool() {
    let mut provider = MockChainProvider::default();
    let pool = genuine_pool(&mut provider, 0x11);
    let impostor = Address::repeat_byte(0x66);
    provider.register_identity(
        impostor,
        Address::repeat_byte(0x41),
        Address::repeat_byte(0x42),
        10000,
    );

    let sender = Address::repeat_byte(0x23);
    let recipient = Address::repeat_byte(0x34);
    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let findings = scanner
        .scan(&tx_with_logs(vec![
            swap_log(impostor, sender, recipient),
            swap_log(pool, sender, recipient),
        ]))
        .await;

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].metadata["poolAddress"], format_address(&pool));
}

#[tokio::test]
async fn findings_follow_log_order() {
    let mut provider = MockChainProvider::default();
    let first = genuine_pool(&mut provider, 0x11);
    let second = genuine_pool(&mut provider, 0x31);

    let sender = Address::repeat_byte(0x23);
    let recipient = Address::repeat_byte(0x34);
    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let findings = scanner
        .scan(&tx_with_logs(vec![
            swap_log(first, sender, recipient),
            swap_log(second, sender, recipient),
        ]))
        .await;

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].metadata["poolAddress"], format_address(&first));
    assert_eq!(findings[1].metadata["poolAddress"], format_address(&second));
}

#[tokio::test]
async fn verification_failure_skips_single_log() {
    let mut provider = MockChainProvider::default();
    let pool = genuine_pool(&mut provider, 0x11);
    // endereço sem respostas registradas: as leituras revertem
    let unreachable = Address::repeat_byte(0x99);

    let sender = Address::repeat_byte(0x23);
    let recipient = Address::repeat_byte(0x34);
    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let findings = scanner
        .scan(&tx_with_logs(vec![
            swap_log(unreachable, sender, recipient),
            swap_log(pool, sender, recipient),
        ]))
        .await;

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].metadata["poolAddress"], format_address(&pool));
}

#[tokio::test]
async fn repeated_scans_reuse_the_verification_cache() {
    let mut provider = MockChainProvider::default();
    let pool = genuine_pool(&mut provider, 0x11);
    let calls = provider.call_counter();

    let sender = Address::repeat_byte(0x23);
    let recipient = Address::repeat_byte(0x34);
    let scanner = SwapScanner::new(provider, *UNISWAP_V3_FACTORY);
    let event = tx_with_logs(vec![swap_log(pool, sender, recipient)]);

    assert_eq!(scanner.scan(&event).await.len(), 1);
    assert_eq!(scanner.scan(&event).await.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn scanner_works_as_boxed_detector() {
    let mut provider = MockChainProvider::default();
    let pool = genuine_pool(&mut provider, 0x11);

    let detector: Box<dyn TransactionDetector> =
        Box::new(SwapScanner::new(provider, *UNISWAP_V3_FACTORY));
    assert_eq!(detector.name(), "UniswapV3SwapDetector");

    let findings = detector
        .scan(&tx_with_logs(vec![swap_log(
            pool,
            Address::repeat_byte(0x23),
            Address::repeat_byte(0x34),
        )]))
        .await;
    assert_eq!(findings.len(), 1);
}

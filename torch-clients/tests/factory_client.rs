//! Message building over in-memory factory, vault and wallet state.

mod common;

use std::sync::Arc;

use common::{address, MockProvider};
use more_asserts::assert_gt;
use test_context::{test_context, AsyncTestContext};
use torch_clients::prelude::*;
use torch_idl::accounts::FactoryData;
use torch_idl::constants::{op, ContractType, Size};
use torch_idl::message_builders::{deposit_body, swap_body, withdraw_body};

const NOW: u64 = 1_700_000_000;
const ONE_TON: u128 = 1_000_000_000;

struct Addresses {
  factory: Address,
  sender: Address,
  pool: Address,
  meta_pool: Address,
  usdt: Address,
  usdc: Address,
  ton_vault: Address,
  usdt_vault: Address,
  usdc_vault: Address,
  lp_vault: Address,
  usdt_wallet: Address,
  usdc_wallet: Address,
  lp_wallet: Address,
}

impl Addresses {
  fn new() -> Self {
    Self {
      factory: address(0xfa),
      sender: address(0x5e),
      pool: address(0x90),
      meta_pool: address(0x91),
      usdt: address(0x11),
      usdc: address(0x12),
      ton_vault: address(0xa0),
      usdt_vault: address(0xa1),
      usdc_vault: address(0xa2),
      lp_vault: address(0xa3),
      usdt_wallet: address(0xb1),
      usdc_wallet: address(0xb2),
      lp_wallet: address(0xb3),
    }
  }
}

struct FactoryTestContext {
  at: Addresses,
  provider: Arc<MockProvider>,
  factory: FactoryClient<Arc<MockProvider>>,
}

impl AsyncTestContext for FactoryTestContext {
  async fn setup() -> Self {
    let at = Addresses::new();
    let mut provider = MockProvider::default();
    provider.stub_vault(at.factory, &Asset::Ton, at.ton_vault);
    provider.stub_vault(at.factory, &Asset::Jetton(at.usdt), at.usdt_vault);
    provider.stub_vault(at.factory, &Asset::Jetton(at.usdc), at.usdc_vault);
    provider.stub_vault(at.factory, &Asset::Jetton(at.pool), at.lp_vault);
    provider.stub_wallet(at.usdt, at.sender, at.usdt_wallet);
    provider.stub_wallet(at.usdc, at.sender, at.usdc_wallet);
    provider.stub_wallet(at.pool, at.sender, at.lp_wallet);
    let provider = Arc::new(provider);
    let factory = FactoryClient::new(at.factory, provider.clone())
      .with_clock(FixedClock(NOW));
    Self {
      at,
      provider,
      factory,
    }
  }
}

fn swap(at: &Addresses, asset_in: Asset, asset_out: Asset) -> SwapPayload {
  SwapPayload {
    query_id: 7,
    pool: at.pool,
    asset_in,
    amount_in: ONE_TON,
    asset_out,
    config: None,
    next: None,
  }
}

fn pool_allocations(at: &Addresses, values: [u128; 3]) -> Vec<Allocation> {
  let assets = [Asset::Ton, Asset::Jetton(at.usdt), Asset::Jetton(at.usdc)];
  Allocation::zip(&assets, &values).expect("allocations")
}

fn deposit(at: &Addresses, values: [u128; 3]) -> DepositPayload {
  DepositPayload {
    query_id: 3,
    pool: at.pool,
    allocations: pool_allocations(at, values),
    config: None,
    next: None,
  }
}

struct Transfer {
  query_id: u64,
  amount: u128,
  destination: Address,
  response: Address,
  forward_ton: u128,
  payload: Option<Arc<Cell>>,
}

fn read_transfer(body: &Cell) -> Transfer {
  let mut slice = body.parse();
  assert_eq!(
    slice.load_u64(Size::OP).expect("op"),
    u64::from(op::jetton::TRANSFER)
  );
  let query_id = slice.load_u64(Size::QUERY_ID).expect("query id");
  let amount = slice.load_coins().expect("amount");
  let destination = slice.load_required_address().expect("destination");
  let response = slice.load_required_address().expect("response");
  assert!(!slice.load_bit().expect("custom payload bit"));
  let forward_ton = slice.load_coins().expect("forward ton");
  let payload = slice.load_maybe_ref().expect("forward payload");
  Transfer {
    query_id,
    amount,
    destination,
    response,
    forward_ton,
    payload,
  }
}

/// Reads a TON vault wrapper, returning (op, query id, amount, body).
fn read_ton_wrapper(body: &Cell) -> (u32, u64, u128, Arc<Cell>) {
  let mut slice = body.parse();
  let op = slice.load_u64(Size::OP).expect("op");
  let query_id = slice.load_u64(Size::QUERY_ID).expect("query id");
  let amount = slice.load_coins().expect("amount");
  let inner = slice.load_ref().expect("inner body");
  (u32::try_from(op).expect("u32 op"), query_id, amount, inner)
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn ton_swap_goes_to_ton_vault(ctx: &FactoryTestContext) {
  let payload = swap(&ctx.at, Asset::Ton, Asset::Jetton(ctx.at.usdt));
  let message = ctx
    .factory
    .swap_payload(ctx.at.sender, &payload)
    .await
    .expect("swap message");

  assert_eq!(message.to, ctx.at.ton_vault);
  // Bare swap into a jetton: fixed allowance plus a one-hop relay fee.
  assert_eq!(message.value, ONE_TON + 180_000_000 + 731_198);

  let (op, query_id, amount, inner) = read_ton_wrapper(&message.body);
  assert_eq!(op, op::vault::SWAP);
  assert_eq!(query_id, 7);
  assert_eq!(amount, ONE_TON);
  let expected = swap_body(&payload, &FixedClock(NOW)).expect("swap body");
  assert_eq!(inner.hash(), expected.hash());
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn jetton_swap_transfers_from_sender_wallet(ctx: &FactoryTestContext) {
  let payload = swap(&ctx.at, Asset::Jetton(ctx.at.usdt), Asset::Ton);
  let message = ctx
    .factory
    .swap_payload(ctx.at.sender, &payload)
    .await
    .expect("swap message");

  let body = swap_body(&payload, &FixedClock(NOW)).expect("swap body");
  let gas =
    GasConfig::default().swap_gas(&ForwardFeeConfig::default(), &body, 0);
  assert_eq!(message.to, ctx.at.usdt_wallet);
  assert_eq!(message.value, gas + 50_000_000);

  let transfer = read_transfer(&message.body);
  assert_eq!(transfer.query_id, 7);
  assert_eq!(transfer.amount, ONE_TON);
  assert_eq!(transfer.destination, ctx.at.usdt_vault);
  assert_eq!(transfer.response, ctx.at.sender);
  assert_eq!(transfer.forward_ton, gas);
  assert_eq!(
    transfer.payload.as_ref().map(|cell| *cell.hash()),
    Some(*body.hash())
  );
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn chained_swap_budgets_follow_ups(ctx: &FactoryTestContext) {
  let mut payload = swap(&ctx.at, Asset::Ton, Asset::Jetton(ctx.at.usdt));
  payload.next = Some(SwapFollowUp::Swap(SwapNext {
    next_pool: ctx.at.meta_pool,
    asset_out: Asset::Jetton(ctx.at.pool),
    min_amount_out: 0,
    next: Some(Box::new(SwapFollowUp::Withdraw(WithdrawNext {
      next_pool: ctx.at.pool,
      mode: None,
    }))),
  }));
  let message = ctx
    .factory
    .swap_payload(ctx.at.sender, &payload)
    .await
    .expect("swap message");

  let body = swap_body(&payload, &FixedClock(NOW)).expect("swap body");
  let gas =
    GasConfig::default().swap_gas(&ForwardFeeConfig::default(), &body, 2);
  assert_eq!(message.value, ONE_TON + gas);
  assert_gt!(gas, 180_000_000 + 50_000_000 + 350_000_000);
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn extra_currency_swap_is_rejected(ctx: &FactoryTestContext) {
  let payload = swap(&ctx.at, Asset::ExtraCurrency(7), Asset::Ton);
  let err = ctx
    .factory
    .swap_payload(ctx.at.sender, &payload)
    .await
    .expect_err("extra currency input");
  assert!(matches!(
    err.downcast_ref::<CoreError>(),
    Some(CoreError::UnsupportedAssetClass(_))
  ));
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn unknown_jetton_surfaces_provider_error(ctx: &FactoryTestContext) {
  let payload = swap(&ctx.at, Asset::Jetton(address(0x33)), Asset::Ton);
  let err = ctx
    .factory
    .swap_payload(ctx.at.sender, &payload)
    .await
    .expect_err("unresolvable vault");
  assert!(err.to_string().contains("failed on"));
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn deposit_sends_one_message_per_funded_leg(ctx: &FactoryTestContext) {
  let payload = deposit(&ctx.at, [2 * ONE_TON, 0, 3_000_000]);
  let messages = ctx
    .factory
    .deposit_payload(ctx.at.sender, &payload)
    .await
    .expect("deposit messages");
  assert_eq!(messages.len(), 2);

  let body = deposit_body(&payload).expect("deposit body");
  let gas = GasConfig::default().deposit_gas(
    &ForwardFeeConfig::default(),
    &body,
    false,
  );

  assert_eq!(messages[0].to, ctx.at.ton_vault);
  assert_eq!(messages[0].value, 2 * ONE_TON + gas);
  let (op, query_id, amount, inner) = read_ton_wrapper(&messages[0].body);
  assert_eq!(op, op::vault::DEPOSIT);
  assert_eq!(query_id, 3);
  assert_eq!(amount, 2 * ONE_TON);
  assert_eq!(inner.hash(), body.hash());

  assert_eq!(messages[1].to, ctx.at.usdc_wallet);
  assert_eq!(messages[1].value, gas + 50_000_000);
  let transfer = read_transfer(&messages[1].body);
  assert_eq!(transfer.destination, ctx.at.usdc_vault);
  assert_eq!(transfer.amount, 3_000_000);
  assert_eq!(
    transfer.payload.as_ref().map(|cell| *cell.hash()),
    Some(*body.hash())
  );
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn chained_deposit_funds_meta_asset(ctx: &FactoryTestContext) {
  let mut payload = deposit(&ctx.at, [ONE_TON, 0, 0]);
  payload.next = Some(DepositFollowUp::Deposit(DepositNext {
    next_pool: ctx.at.meta_pool,
    meta_allocation: Allocation::new(Asset::Jetton(ctx.at.usdt), 4_000),
    min_lp_amount: 0,
  }));
  let messages = ctx
    .factory
    .deposit_payload(ctx.at.sender, &payload)
    .await
    .expect("deposit messages");

  let body = deposit_body(&payload).expect("deposit body");
  let gas =
    GasConfig::default().deposit_gas(&ForwardFeeConfig::default(), &body, true);
  let targets = messages.iter().map(|m| m.to).collect::<Vec<_>>();
  assert_eq!(targets, vec![ctx.at.ton_vault, ctx.at.usdt_wallet]);
  assert_eq!(messages[0].value, ONE_TON + gas);
  assert_eq!(read_transfer(&messages[1].body).amount, 4_000);
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn empty_deposit_is_rejected(ctx: &FactoryTestContext) {
  let payload = deposit(&ctx.at, [0, 0, 0]);
  let result = ctx.factory.deposit_payload(ctx.at.sender, &payload).await;
  assert!(result.is_err());
  assert!(ctx.provider.calls().is_empty());
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn withdraw_sends_lp_tokens_to_lp_vault(ctx: &FactoryTestContext) {
  let payload = WithdrawPayload {
    query_id: 1,
    pool: ctx.at.pool,
    burn_lp_amount: 10_000,
    recipient: None,
    signed_rate: None,
    extra_payload: None,
    mode: Some(WithdrawMode::Single {
      asset_out: Asset::Ton,
      min_amount_out: 0,
    }),
    next: None,
  };
  let message = ctx
    .factory
    .withdraw_payload(ctx.at.sender, &payload)
    .await
    .expect("withdraw message");

  let body = withdraw_body(&payload).expect("withdraw body");
  let gas = GasConfig::default().withdraw_gas(
    &ForwardFeeConfig::default(),
    &body,
    false,
  );
  assert_eq!(message.to, ctx.at.lp_wallet);
  assert_eq!(message.value, gas + 50_000_000);
  let transfer = read_transfer(&message.body);
  assert_eq!(transfer.destination, ctx.at.lp_vault);
  assert_eq!(transfer.amount, 10_000);
  assert_eq!(transfer.forward_ton, gas);
}

#[test_context(FactoryTestContext)]
#[tokio::test]
async fn vault_lookup_passes_proof(ctx: &FactoryTestContext) {
  let vault = ctx
    .factory
    .vault_address(&Asset::Jetton(ctx.at.usdc))
    .await
    .expect("vault address");
  assert_eq!(vault, ctx.at.usdc_vault);
  let args = ctx.provider.last_args("get_address").expect("call recorded");
  assert_eq!(args.len(), 1);
  assert!(matches!(args[0], StackItem::Int(_)));
}

#[tokio::test]
async fn factory_data_decodes_stack() {
  let code = CellBuilder::new()
    .store_uint(0xc0de, 16)
    .and_then(|builder| builder.build_ref())
    .expect("code cell");
  let mut admin_fee_config = Dictionary::new(Size::DICT_KEY);
  admin_fee_config
    .insert(0, 5_000_000_000u128)
    .expect("dict insert");
  let data = FactoryData {
    contract_type: ContractType::Factory,
    admin: address(0xad),
    base_code: code.clone(),
    lp_account_code: code.clone(),
    vault_codes: Dictionary::new(Size::DICT_KEY),
    signer_key: [7; 32],
    pool_codes: Dictionary::new(Size::DICT_KEY),
    lp_wallet_code: code,
    admin_fee_config,
  };
  let mut provider = MockProvider::default();
  provider.stub(
    address(0xfa),
    "get_factory_data",
    None,
    data.to_stack().expect("factory stack"),
  );
  let factory = FactoryClient::new(address(0xfa), provider);
  let back = factory.factory_data().await.expect("factory data");
  assert_eq!(back, data);
}

//! Candy Mint Fake Ledger
//!
//! Used for tests and demonstrations where no ledger node is available.
//! Transactions are executed on submission and their status becomes visible
//! after the configured confirmation delay.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use candy_mint_common::layout::{
    CandyMachineAccount, CandyMachineData, Creator, DISCRIMINATOR_LEN,
};
use candy_mint_common::clock::{ledger_now, unix_time};
use candy_mint_common::{
    AccountInfo, AccountMeta, Address, Amount, Blockhash, Commitment, Instruction,
    MintConfigSnapshot, MintProgram, MintTransaction, NetworkClient, ProgramErrorCode,
    SetupState, Signature, SignatureStatus, SignedTransaction, UnsignedTransaction,
};
use execute::{Accounts, MINT_TAG, PASS_TAG, SETUP_TAG};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::instrument;

pub mod error;
mod execute;
mod gating;
mod signer;

pub use error::Error;
pub use execute::GATEWAY_TOKEN_MISSING;
pub use gating::FakePassIssuer;
pub use signer::FakeSigner;

/// Program id of the fake mint program
pub const FAKE_PROGRAM_ID: Address = Address::new([0xC4; 32]);
/// Owner of mints and token accounts
pub const TOKEN_PROGRAM_ID: Address = Address::new([0x06; 32]);
/// Discriminator written in front of machine accounts
pub const MACHINE_DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [51, 173, 177, 113, 25, 241, 109, 189];

const COLLECTION_SEED: u8 = 0x11;
const METADATA_SEED: u8 = 0x22;
const TOKEN_ACCOUNT_SEED: u8 = 0x33;

static NEXT_SIGNATURE: AtomicU64 = AtomicU64::new(1);

/// Deterministic address derived from `base`. Not a real PDA.
pub fn derive_address(seed: u8, base: &Address) -> Address {
    let mut bytes = base.to_bytes();
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = byte.rotate_left((i % 7) as u32 + 1) ^ seed.wrapping_mul(i as u8 | 1);
    }
    Address::new(bytes)
}

/// Unique signature made by `signer`
pub fn fake_signature(signer: &Address) -> Signature {
    let n = NEXT_SIGNATURE.fetch_add(1, Ordering::Relaxed);
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(signer.as_bytes());
    bytes[32..40].copy_from_slice(&n.to_be_bytes());
    Signature::new(bytes)
}

/// Sign `transaction` as `signer`; the wire format is the JSON encoded transaction
pub fn sign_as(
    signer: &Address,
    transaction: UnsignedTransaction,
) -> Result<SignedTransaction, candy_mint_common::Error> {
    let wire = serde_json::to_vec(&transaction)?;
    Ok(SignedTransaction {
        signature: fake_signature(signer),
        wire,
        transaction,
    })
}

/// Machine account with one item sold out of 3333, live since a minute, priced
/// at one native coin and paying `treasury`
pub fn sample_machine(treasury: Address) -> CandyMachineAccount {
    let now = ledger_now();
    CandyMachineAccount {
        authority: treasury,
        wallet: treasury,
        token_mint: None,
        items_redeemed: 1,
        data: CandyMachineData {
            uuid: "FAKE01".to_string(),
            price: 1_000_000_000,
            symbol: "FAKE".to_string(),
            seller_fee_basis_points: 500,
            max_supply: 0,
            is_mutable: true,
            retain_authority: true,
            go_live_date: Some(now - 60),
            end_settings: None,
            creators: vec![Creator {
                address: treasury,
                verified: true,
                share: 100,
            }],
            hidden_settings: None,
            whitelist_mint_settings: None,
            items_available: 3333,
            gatekeeper: None,
        },
    }
}

/// Kind of a submitted transaction, by its instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Setup only
    Setup,
    /// Mint only, consuming an earlier setup
    Mint,
    /// Setup and mint in one transaction
    SetupAndMint,
    /// Gating pass issuance
    Pass,
    /// Anything else
    Other,
}

impl TransactionKind {
    fn of(transaction: &UnsignedTransaction) -> Self {
        let tags: Vec<Option<u8>> = transaction
            .instructions
            .iter()
            .map(|instruction| instruction.data.first().copied())
            .collect();

        match tags.as_slice() {
            [Some(SETUP_TAG)] => Self::Setup,
            [Some(MINT_TAG)] => Self::Mint,
            [Some(SETUP_TAG), Some(MINT_TAG)] => Self::SetupAndMint,
            [Some(PASS_TAG)] => Self::Pass,
            _ => Self::Other,
        }
    }
}

/// Record of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    /// Signature
    pub signature: Signature,
    /// Kind
    pub kind: TransactionKind,
    /// Fee payer
    pub fee_payer: Address,
    /// Dropped by the network, never confirms
    pub dropped: bool,
    /// Landed with an execution error
    pub failed: bool,
}

/// Scriptable behaviour
#[derive(Debug, Clone, Default)]
pub struct FakeBehavior {
    /// The next mint instruction fails with this code
    pub fail_next_mint: Option<ProgramErrorCode>,
    /// Transactions of these kinds are dropped
    pub drop: HashSet<TransactionKind>,
    /// Status of landed transactions becomes visible after this delay
    pub confirmation_delay: Duration,
    /// Mints succeed without creating the metadata account
    pub skip_metadata: bool,
    /// Account and balance reads fail
    pub fail_reads: bool,
    /// Number of upcoming status reads that fail
    pub fail_status_reads: u32,
}

#[derive(Debug)]
struct Landed {
    status: SignatureStatus,
    visible_at: Instant,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: Accounts,
    landed: HashMap<Signature, Landed>,
    submitted: Vec<SubmittedTransaction>,
    behavior: FakeBehavior,
    slot: u64,
    next_mint: u64,
}

/// In-memory ledger and fake mint program
#[derive(Debug, Clone, Default)]
pub struct FakeLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl FakeLedger {
    /// Create new [`FakeLedger`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the scripted behaviour
    pub async fn set_behavior(&self, behavior: FakeBehavior) {
        self.state.lock().await.behavior = behavior;
    }

    /// Fail the next mint instruction with `code`
    pub async fn fail_next_mint(&self, code: ProgramErrorCode) {
        self.state.lock().await.behavior.fail_next_mint = Some(code);
    }

    /// Drop transactions of `kind`
    pub async fn drop_transactions(&self, kind: TransactionKind) {
        self.state.lock().await.behavior.drop.insert(kind);
    }

    /// Delay the visibility of confirmations
    pub async fn delay_confirmations(&self, delay: Duration) {
        self.state.lock().await.behavior.confirmation_delay = delay;
    }

    /// Skip the metadata account of mints
    pub async fn skip_metadata(&self, skip: bool) {
        self.state.lock().await.behavior.skip_metadata = skip;
    }

    /// Fail account and balance reads
    pub async fn fail_reads(&self, fail: bool) {
        self.state.lock().await.behavior.fail_reads = fail;
    }

    /// Fail the next `count` status reads
    pub async fn fail_status_reads(&self, count: u32) {
        self.state.lock().await.behavior.fail_status_reads = count;
    }

    /// Set the native balance of `address`
    pub async fn fund(&self, address: Address, lamports: u64) {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .accounts
            .entry(address)
            .or_insert_with(|| AccountInfo {
                owner: Address::default(),
                lamports: Amount::ZERO,
                data: Vec::new(),
            });
        account.lamports = Amount::from(lamports);
    }

    /// Set the `mint` token balance of `owner`
    pub async fn set_token_balance(&self, owner: Address, mint: Address, amount: u64) {
        self.state
            .lock()
            .await
            .accounts
            .token_balances
            .insert((owner, mint), amount);
    }

    /// Give `wallet` a valid pass for `network`
    pub async fn grant_pass(&self, network: Address, wallet: Address) {
        self.state
            .lock()
            .await
            .accounts
            .passes
            .insert((network, wallet));
    }

    /// `wallet` holds a valid pass for `network`
    pub async fn has_pass(&self, network: &Address, wallet: &Address) -> bool {
        self.state
            .lock()
            .await
            .accounts
            .passes
            .contains(&(*network, *wallet))
    }

    /// `wallet` held a pass for `network` that a mint consumed
    pub async fn has_expired_pass(&self, network: &Address, wallet: &Address) -> bool {
        self.state
            .lock()
            .await
            .accounts
            .expired_passes
            .contains(&(*network, *wallet))
    }

    /// Write a machine account owned by the fake program
    pub async fn create_machine(
        &self,
        address: Address,
        machine: &CandyMachineAccount,
    ) -> Result<(), Error> {
        let data = machine.encode(MACHINE_DISCRIMINATOR)?;
        self.insert_account(
            address,
            AccountInfo {
                owner: FAKE_PROGRAM_ID,
                lamports: Amount::from(5_000_000),
                data,
            },
        )
        .await;
        Ok(())
    }

    /// Create the collection link account of `machine`
    pub async fn create_collection(&self, machine: &Address) {
        self.insert_account(
            derive_address(COLLECTION_SEED, machine),
            AccountInfo {
                owner: FAKE_PROGRAM_ID,
                lamports: Amount::from(1_000_000),
                data: vec![1],
            },
        )
        .await;
    }

    /// Write any account
    pub async fn insert_account(&self, address: Address, account: AccountInfo) {
        self.state
            .lock()
            .await
            .accounts
            .accounts
            .insert(address, account);
    }

    /// Decoded machine account
    pub async fn machine(&self, address: &Address) -> Result<Option<CandyMachineAccount>, Error> {
        let state = self.state.lock().await;
        match state.accounts.accounts.get(address) {
            Some(account) => Ok(Some(CandyMachineAccount::decode(&account.data)?)),
            None => Ok(None),
        }
    }

    /// Native balance of `address`
    pub async fn lamports(&self, address: &Address) -> Amount {
        self.state.lock().await.accounts.lamports(address)
    }

    /// `mint` token balance of `owner`
    pub async fn token_balance(&self, owner: &Address, mint: &Address) -> u64 {
        self.state.lock().await.accounts.token_balance(owner, mint)
    }

    /// Submissions in order
    pub async fn submitted(&self) -> Vec<SubmittedTransaction> {
        self.state.lock().await.submitted.clone()
    }

    /// Kinds of the submissions in order
    pub async fn submitted_kinds(&self) -> Vec<TransactionKind> {
        self.state
            .lock()
            .await
            .submitted
            .iter()
            .map(|submitted| submitted.kind)
            .collect()
    }

    async fn new_mint(&self) -> Address {
        let mut state = self.state.lock().await;
        state.next_mint += 1;
        let mut bytes = [0xA1; 32];
        bytes[24..].copy_from_slice(&state.next_mint.to_be_bytes());
        Address::new(bytes)
    }

    fn setup_instruction(&self, payer: &Address, mint: &Address, token_account: &Address) -> Instruction {
        Instruction {
            program_id: FAKE_PROGRAM_ID,
            accounts: vec![
                AccountMeta::writable(*payer, true),
                AccountMeta::writable(*mint, true),
                AccountMeta::writable(*token_account, false),
                AccountMeta::readonly(TOKEN_PROGRAM_ID, false),
            ],
            data: vec![SETUP_TAG],
        }
    }

    fn mint_instruction(
        &self,
        snapshot: &MintConfigSnapshot,
        payer: &Address,
        mint: &Address,
        token_account: &Address,
    ) -> Instruction {
        let mut accounts = vec![
            AccountMeta::writable(snapshot.address, false),
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(snapshot.treasury, false),
            AccountMeta::writable(*mint, false),
            AccountMeta::writable(*token_account, false),
            AccountMeta::writable(self.metadata_address(mint), false),
        ];
        if snapshot.has_collection {
            accounts.push(AccountMeta::readonly(
                self.collection_address(&snapshot.address),
                false,
            ));
        }
        if let Some(token_mint) = snapshot.token_mint {
            accounts.push(AccountMeta::readonly(token_mint, false));
        }
        if let Some(rule) = &snapshot.allowlist {
            accounts.push(if rule.burn_on_use {
                AccountMeta::writable(rule.mint, false)
            } else {
                AccountMeta::readonly(rule.mint, false)
            });
        }
        if let Some(rule) = &snapshot.gating {
            accounts.push(AccountMeta::readonly(rule.network, false));
        }

        Instruction {
            program_id: FAKE_PROGRAM_ID,
            accounts,
            data: vec![MINT_TAG],
        }
    }
}

/// Issuance instruction granting `wallet` a pass for `network`
pub fn pass_instruction(network: &Address, wallet: &Address) -> Instruction {
    Instruction {
        program_id: FAKE_PROGRAM_ID,
        accounts: vec![
            AccountMeta::readonly(*wallet, false),
            AccountMeta::readonly(*network, false),
        ],
        data: vec![PASS_TAG],
    }
}

#[async_trait]
impl NetworkClient for FakeLedger {
    async fn read_account(
        &self,
        address: &Address,
        _commitment: Commitment,
    ) -> Result<Option<AccountInfo>, candy_mint_common::Error> {
        let state = self.state.lock().await;
        if state.behavior.fail_reads {
            return Err(candy_mint_common::Error::RpcUnavailable(
                "fake ledger reads are failing".to_string(),
            ));
        }
        Ok(state.accounts.accounts.get(address).cloned())
    }

    async fn get_balance(
        &self,
        address: &Address,
        _commitment: Commitment,
    ) -> Result<Amount, candy_mint_common::Error> {
        let state = self.state.lock().await;
        if state.behavior.fail_reads {
            return Err(candy_mint_common::Error::RpcUnavailable(
                "fake ledger reads are failing".to_string(),
            ));
        }
        Ok(state.accounts.lamports(address))
    }

    async fn get_token_balance(
        &self,
        owner: &Address,
        mint: &Address,
        _commitment: Commitment,
    ) -> Result<u64, candy_mint_common::Error> {
        let state = self.state.lock().await;
        if state.behavior.fail_reads {
            return Err(candy_mint_common::Error::RpcUnavailable(
                "fake ledger reads are failing".to_string(),
            ));
        }
        Ok(state.accounts.token_balance(owner, mint))
    }

    #[instrument(skip_all)]
    async fn submit(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<Signature, candy_mint_common::Error> {
        let decoded: UnsignedTransaction =
            serde_json::from_slice(&transaction.wire).map_err(Error::from)?;
        if decoded.recent_blockhash.is_none() {
            return Err(Error::MissingBlockhash.into());
        }
        if decoded.instructions.is_empty() {
            return Err(Error::EmptyTransaction.into());
        }

        let signature = transaction.signature;
        let kind = TransactionKind::of(&decoded);
        let mut state = self.state.lock().await;

        if state.behavior.drop.contains(&kind) {
            tracing::debug!("Dropping {:?} transaction {}", kind, signature);
            state.submitted.push(SubmittedTransaction {
                signature,
                kind,
                fee_payer: decoded.fee_payer,
                dropped: true,
                failed: false,
            });
            return Ok(signature);
        }

        let mut fail_mint = state.behavior.fail_next_mint.take();
        let skip_metadata = state.behavior.skip_metadata;
        let mut scratch = state.accounts.clone();
        let result = decoded.instructions.iter().try_for_each(|instruction| {
            scratch.execute(instruction, &decoded.fee_payer, &mut fail_mint, skip_metadata)
        });
        // An unconsumed failure stays armed for the next mint
        state.behavior.fail_next_mint = fail_mint;

        let err = match result {
            Ok(()) => {
                state.accounts = scratch;
                None
            }
            Err(err) => {
                tracing::debug!("Transaction {} failed: {}", signature, err);
                Some(err)
            }
        };

        state.slot += 1;
        let visible_at = Instant::now() + state.behavior.confirmation_delay;
        state.submitted.push(SubmittedTransaction {
            signature,
            kind,
            fee_payer: decoded.fee_payer,
            dropped: false,
            failed: err.is_some(),
        });
        let slot = state.slot;
        state.landed.insert(
            signature,
            Landed {
                status: SignatureStatus {
                    slot,
                    confirmation: Some(Commitment::Finalized),
                    err,
                },
                visible_at,
            },
        );

        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, candy_mint_common::Error> {
        let mut state = self.state.lock().await;
        if state.behavior.fail_status_reads > 0 {
            state.behavior.fail_status_reads -= 1;
            return Err(candy_mint_common::Error::RpcUnavailable(
                "fake ledger status read failed".to_string(),
            ));
        }

        Ok(state
            .landed
            .get(signature)
            .filter(|landed| Instant::now() >= landed.visible_at)
            .map(|landed| landed.status.clone()))
    }

    async fn latest_blockhash(
        &self,
        _commitment: Commitment,
    ) -> Result<Blockhash, candy_mint_common::Error> {
        let slot = self.state.lock().await.slot;
        Ok(Blockhash(format!("FakeBlockhash{}", slot)))
    }
}

#[async_trait]
impl MintProgram for FakeLedger {
    fn program_id(&self) -> Address {
        FAKE_PROGRAM_ID
    }

    fn collection_address(&self, machine: &Address) -> Address {
        derive_address(COLLECTION_SEED, machine)
    }

    fn metadata_address(&self, mint: &Address) -> Address {
        derive_address(METADATA_SEED, mint)
    }

    async fn setup_transaction(
        &self,
        snapshot: &MintConfigSnapshot,
        payer: &Address,
    ) -> Result<SetupState, candy_mint_common::Error> {
        let mint = self.new_mint().await;
        let token_account = derive_address(TOKEN_ACCOUNT_SEED, &mint);

        let mut transaction = UnsignedTransaction::new(
            *payer,
            vec![self.setup_instruction(payer, &mint, &token_account)],
        );
        transaction.partial_signers.push(mint);

        Ok(SetupState {
            wallet: *payer,
            fingerprint: snapshot.fingerprint(),
            mint,
            token_account,
            metadata: self.metadata_address(&mint),
            transaction,
        })
    }

    async fn mint_transaction(
        &self,
        snapshot: &MintConfigSnapshot,
        payer: &Address,
        setup: Option<&SetupState>,
    ) -> Result<MintTransaction, candy_mint_common::Error> {
        let (mint, instructions) = match setup {
            Some(setup) => (
                setup.mint,
                vec![self.mint_instruction(snapshot, payer, &setup.mint, &setup.token_account)],
            ),
            None => {
                let mint = self.new_mint().await;
                let token_account = derive_address(TOKEN_ACCOUNT_SEED, &mint);
                (
                    mint,
                    vec![
                        self.setup_instruction(payer, &mint, &token_account),
                        self.mint_instruction(snapshot, payer, &mint, &token_account),
                    ],
                )
            }
        };

        let mut transaction = UnsignedTransaction::new(*payer, instructions);
        if setup.is_none() {
            transaction.partial_signers.push(mint);
        }

        Ok(MintTransaction {
            transaction,
            mint,
            metadata: self.metadata_address(&mint),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: Address = Address::new([0x01; 32]);
    const TREASURY: Address = Address::new([0x02; 32]);
    const MACHINE: Address = Address::new([0x03; 32]);

    async fn ledger() -> FakeLedger {
        let ledger = FakeLedger::new();
        ledger
            .create_machine(MACHINE, &sample_machine(TREASURY))
            .await
            .unwrap();
        ledger.fund(WALLET, 5_000_000_000).await;
        ledger
    }

    async fn snapshot(ledger: &FakeLedger) -> MintConfigSnapshot {
        let machine = ledger.machine(&MACHINE).await.unwrap().unwrap();
        MintConfigSnapshot::from_account(MACHINE, &machine, Commitment::Confirmed, unix_time())
    }

    async fn submit(ledger: &FakeLedger, transaction: UnsignedTransaction) -> SignatureStatus {
        let transaction = transaction.with_blockhash(ledger.latest_blockhash(Commitment::Confirmed).await.unwrap());
        let signed = sign_as(&WALLET, transaction).unwrap();
        let signature = ledger.submit(&signed).await.unwrap();
        ledger.get_signature_status(&signature).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_mint_in_one_transaction() {
        let ledger = ledger().await;
        let snapshot = snapshot(&ledger).await;

        let mint = ledger.mint_transaction(&snapshot, &WALLET, None).await.unwrap();
        let status = submit(&ledger, mint.transaction).await;

        assert!(status.err.is_none());
        assert!(ledger.read_account(&mint.metadata, Commitment::Processed).await.unwrap().is_some());
        assert_eq!(ledger.machine(&MACHINE).await.unwrap().unwrap().items_redeemed, 2);
        assert_eq!(ledger.lamports(&WALLET).await, Amount::from(4_000_000_000));
        assert_eq!(ledger.lamports(&TREASURY).await, Amount::from(1_000_000_000));
        assert_eq!(ledger.submitted_kinds().await, vec![TransactionKind::SetupAndMint]);
    }

    #[tokio::test]
    async fn test_split_mint_needs_setup() {
        let ledger = ledger().await;
        let snapshot = snapshot(&ledger).await;

        let setup = ledger.setup_transaction(&snapshot, &WALLET).await.unwrap();
        let mint = ledger
            .mint_transaction(&snapshot, &WALLET, Some(&setup))
            .await
            .unwrap();

        // Mint before setup lands fails without a program code
        let early = submit(&ledger, mint.transaction.clone()).await;
        assert_eq!(early.err.unwrap().code, None);

        assert!(submit(&ledger, setup.transaction).await.err.is_none());
        assert!(submit(&ledger, mint.transaction).await.err.is_none());
        assert_eq!(mint.mint, setup.mint);
    }

    #[tokio::test]
    async fn test_failed_transaction_changes_nothing() {
        let ledger = ledger().await;
        let snapshot = snapshot(&ledger).await;
        ledger.fail_next_mint(ProgramErrorCode::CANDY_MACHINE_EMPTY).await;

        let mint = ledger.mint_transaction(&snapshot, &WALLET, None).await.unwrap();
        let status = submit(&ledger, mint.transaction).await;

        assert_eq!(status.err.unwrap().code, Some(ProgramErrorCode::CANDY_MACHINE_EMPTY));
        assert_eq!(ledger.machine(&MACHINE).await.unwrap().unwrap().items_redeemed, 1);
        assert_eq!(ledger.lamports(&WALLET).await, Amount::from(5_000_000_000));
        assert!(ledger.read_account(&mint.mint, Commitment::Processed).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insufficient_funds() {
        let ledger = ledger().await;
        ledger.fund(WALLET, 10).await;
        let snapshot = snapshot(&ledger).await;

        let mint = ledger.mint_transaction(&snapshot, &WALLET, None).await.unwrap();
        let status = submit(&ledger, mint.transaction).await;

        assert_eq!(status.err.unwrap().code, Some(ProgramErrorCode::NOT_ENOUGH_FUNDS));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_and_delayed() {
        let ledger = ledger().await;
        let snapshot = snapshot(&ledger).await;
        ledger.delay_confirmations(Duration::from_secs(2)).await;

        let mint = ledger.mint_transaction(&snapshot, &WALLET, None).await.unwrap();
        let transaction = mint.transaction.with_blockhash(Blockhash("hash".to_string()));
        let signature = ledger.submit(&sign_as(&WALLET, transaction).unwrap()).await.unwrap();
        assert!(ledger.get_signature_status(&signature).await.unwrap().is_none());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(ledger.get_signature_status(&signature).await.unwrap().is_some());

        ledger.drop_transactions(TransactionKind::Pass).await;
        let pass = UnsignedTransaction::new(WALLET, vec![pass_instruction(&TREASURY, &WALLET)])
            .with_blockhash(Blockhash("hash".to_string()));
        let signature = ledger.submit(&sign_as(&WALLET, pass).unwrap()).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(ledger.get_signature_status(&signature).await.unwrap().is_none());
        assert!(!ledger.has_pass(&TREASURY, &WALLET).await);
    }

    #[tokio::test]
    async fn test_unsigned_blockhash_rejected() {
        let ledger = ledger().await;
        let snapshot = snapshot(&ledger).await;
        let mint = ledger.mint_transaction(&snapshot, &WALLET, None).await.unwrap();

        let err = ledger
            .submit(&sign_as(&WALLET, mint.transaction).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, candy_mint_common::Error::TransactionRejected(_)));
    }

    #[test]
    fn test_derived_addresses_differ() {
        let mint = Address::new([9; 32]);
        assert_ne!(derive_address(METADATA_SEED, &mint), derive_address(TOKEN_ACCOUNT_SEED, &mint));
        assert_ne!(derive_address(METADATA_SEED, &mint), mint);
    }
}

//! Shared fixtures: an in-memory ledger and a signer that records what it
//! was asked to submit.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pulse_sdk::{
    filters::matches_all, rpc::ProgramAccounts, AccountFilter, AccountRecord, IndexState,
    LedgerError, LedgerRpc, ManualClock, MemoryStore, PdaBuilder, PlatformConfig, PulseClient,
    SdkConfig, TransactionSigner, DEFAULT_PLATFORM_FEE_BPS, DEFAULT_QUORUM_VOTES,
    DEFAULT_VOTING_PERIOD_SECONDS, MIN_PROPOSAL_POWER, PRICE_SCALE,
};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};

pub const START: i64 = 1_700_000_000;

// ============================================================================
// Ledger
// ============================================================================

#[derive(Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    offline: AtomicBool,
    not_indexed: AtomicBool,
    failure: Mutex<Option<LedgerError>>,
    reads: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put<T: AccountRecord>(&self, address: Pubkey, record: &T) {
        let data = record.encode().unwrap();
        self.accounts.lock().unwrap().insert(address, data);
    }

    pub fn remove(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_not_indexed(&self, not_indexed: bool) {
        self.not_indexed.store(not_indexed, Ordering::SeqCst);
    }

    /// Refuse every read with `err` until cleared
    pub fn fail_with(&self, err: Option<LedgerError>) {
        *self.failure.lock().unwrap() = err;
    }

    /// Number of RPC calls served or refused
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), LedgerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::unreachable("connection refused"));
        }
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        self.check_online()?;
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Vec<u8>>>, LedgerError> {
        self.check_online()?;
        let accounts = self.accounts.lock().unwrap();
        Ok(addresses.iter().map(|a| accounts.get(a).cloned()).collect())
    }

    async fn get_program_accounts(
        &self,
        _program: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<IndexState<ProgramAccounts>, LedgerError> {
        self.check_online()?;
        if self.not_indexed.load(Ordering::SeqCst) {
            return Ok(IndexState::NotIndexed);
        }
        let accounts = self.accounts.lock().unwrap();
        let mut matching: ProgramAccounts = accounts
            .iter()
            .filter(|(_, data)| matches_all(filters, data))
            .map(|(address, data)| (*address, data.clone()))
            .collect();
        matching.sort_by_key(|(address, _)| *address);
        Ok(IndexState::Ready(matching))
    }
}

// ============================================================================
// Signer
// ============================================================================

pub struct RecordingSigner {
    authority: Pubkey,
    submitted: Mutex<Vec<Vec<Instruction>>>,
    reject_with: Mutex<Option<LedgerError>>,
}

impl RecordingSigner {
    pub fn new(authority: Pubkey) -> Arc<Self> {
        Arc::new(Self {
            authority,
            submitted: Mutex::new(Vec::new()),
            reject_with: Mutex::new(None),
        })
    }

    pub fn reject_next(&self, err: LedgerError) {
        *self.reject_with.lock().unwrap() = Some(err);
    }

    pub fn submitted(&self) -> Vec<Vec<Instruction>> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for RecordingSigner {
    fn authority(&self) -> Pubkey {
        self.authority
    }

    async fn sign_and_submit(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<Signature, LedgerError> {
        if let Some(err) = self.reject_with.lock().unwrap().take() {
            return Err(err);
        }
        self.submitted.lock().unwrap().push(instructions);
        Ok(Signature::new_unique())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub client: PulseClient,
    pub ledger: Arc<InMemoryLedger>,
    pub signer: Arc<RecordingSigner>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub pda: PdaBuilder,
    pub user: Pubkey,
}

pub fn platform_config(price_scale: u64) -> PlatformConfig {
    PlatformConfig {
        authority: Pubkey::new_unique(),
        platform_fee_bps: DEFAULT_PLATFORM_FEE_BPS,
        price_scale,
        min_proposal_power: MIN_PROPOSAL_POWER,
        quorum_votes: DEFAULT_QUORUM_VOTES,
        voting_period_seconds: DEFAULT_VOTING_PERIOD_SECONDS,
        paused: false,
        bump: 255,
    }
}

pub fn harness() -> Harness {
    harness_with(SdkConfig {
        program_id: Pubkey::new_unique(),
        ..SdkConfig::default()
    })
}

pub fn harness_with(config: SdkConfig) -> Harness {
    let ledger = InMemoryLedger::new();
    let user = Pubkey::new_unique();
    let signer = RecordingSigner::new(user);
    let clock = Arc::new(ManualClock::new(START));
    let store = Arc::new(MemoryStore::new());
    let pda = PdaBuilder::new(config.program_id);

    ledger.put(
        pda.platform_config().unwrap().address,
        &platform_config(PRICE_SCALE),
    );

    let client = PulseClient::with_clock(
        config,
        ledger.clone(),
        Some(signer.clone()),
        store.clone(),
        clock.clone(),
    )
    .unwrap();

    Harness {
        client,
        ledger,
        signer,
        clock,
        store,
        pda,
        user,
    }
}

//! In-memory reference implementations of the collaborator traits.
//!
//! These adapters are deterministic and test-friendly. Guards are never held
//! across a call out of the store, so a callback may re-enter any of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use ruint::aliases::U256;
use tracing::debug;
use treasury_types::{
    Address, BallotState, ConfigurationId, ControllerEvent, FundingCycle, FundingCycleData,
    Operation, PackedMetadata, ProjectId, ProjectMetadata, Split, SplitGroup,
    SPLITS_TOTAL_PERCENT,
};

use crate::model::{FundAccessKey, IssuedToken, ProjectRecord, TokenBalance};
use crate::traits::{
    AllocatorRegistry, ControllerStateStore, EventSink, FundingCycleStore, OperatorStore,
    ProjectDirectory, ProjectRegistry, SplitAllocator, SplitsStore, TokenStore,
};
use crate::{StorageError, StorageResult};

fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> StorageResult<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| StorageError::Backend(format!("{name} lock poisoned")))
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> StorageResult<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| StorageError::Backend(format!("{name} lock poisoned")))
}

// ── Project registry ────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryProjectRegistry {
    projects: RwLock<Vec<ProjectRecord>>,
}

impl InMemoryProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> StorageResult<u64> {
        Ok(read(&self.projects, "projects")?.len() as u64)
    }

    pub fn project(&self, project_id: ProjectId) -> StorageResult<Option<ProjectRecord>> {
        let guard = read(&self.projects, "projects")?;
        Ok(guard.iter().find(|p| p.project_id == project_id).cloned())
    }

    /// Hand a project to a new owner.
    pub fn transfer(&self, project_id: ProjectId, new_owner: Address) -> StorageResult<()> {
        let mut guard = write(&self.projects, "projects")?;
        let record = guard
            .iter_mut()
            .find(|p| p.project_id == project_id)
            .ok_or_else(|| StorageError::NotFound(format!("project {}", project_id)))?;
        record.owner = new_owner;
        Ok(())
    }
}

impl ProjectRegistry for InMemoryProjectRegistry {
    fn create_for(&self, owner: Address, metadata: ProjectMetadata) -> StorageResult<ProjectId> {
        if owner.is_zero() {
            return Err(StorageError::InvalidInput(
                "project owner cannot be the zero address".to_string(),
            ));
        }
        let mut guard = write(&self.projects, "projects")?;
        let project_id = ProjectId(guard.len() as u64 + 1);
        guard.push(ProjectRecord {
            project_id,
            owner,
            metadata,
        });
        debug!(project = %project_id, owner = %owner, "Project created");
        Ok(project_id)
    }

    fn owner_of(&self, project_id: ProjectId) -> StorageResult<Address> {
        let guard = read(&self.projects, "projects")?;
        guard
            .iter()
            .find(|p| p.project_id == project_id)
            .map(|p| p.owner)
            .ok_or_else(|| StorageError::NotFound(format!("project {}", project_id)))
    }
}

// ── Funding cycles ──────────────────────────────────────────────────

/// Funding-cycle store without ballots or roll-over arithmetic.
///
/// A configuration takes effect at `max(now, must_start_at_or_after)` and
/// stays current until a later configuration starts.
#[derive(Default)]
pub struct InMemoryFundingCycleStore {
    cycles: RwLock<HashMap<ProjectId, Vec<FundingCycle>>>,
    /// Pinned clock in unix seconds. Zero follows the wall clock.
    pinned_now: AtomicU64,
}

impl InMemoryFundingCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose clock starts pinned at `timestamp`.
    pub fn at(timestamp: u64) -> Self {
        let store = Self::default();
        store.set_timestamp(timestamp);
        store
    }

    pub fn now(&self) -> u64 {
        match self.pinned_now.load(Ordering::SeqCst) {
            0 => Utc::now().timestamp().max(0) as u64,
            pinned => pinned,
        }
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.pinned_now.store(timestamp, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        let next = self.now().saturating_add(seconds);
        self.set_timestamp(next);
    }

    fn current_in(history: &[FundingCycle], now: u64) -> Option<&FundingCycle> {
        history.iter().rev().find(|c| c.start <= now)
    }
}

impl FundingCycleStore for InMemoryFundingCycleStore {
    fn configure_for(
        &self,
        project_id: ProjectId,
        data: FundingCycleData,
        metadata: PackedMetadata,
        must_start_at_or_after: u64,
    ) -> StorageResult<FundingCycle> {
        let now = self.now();
        let mut guard = write(&self.cycles, "funding cycles")?;
        let history = guard.entry(project_id).or_default();

        let (configuration, number) = match history.last() {
            Some(latest) => (
                now.max(latest.configuration.as_u64() + 1),
                latest.number + 1,
            ),
            None => (now.max(1), 1),
        };
        let based_on = Self::current_in(history, now)
            .map(|c| c.configuration)
            .unwrap_or(ConfigurationId::NONE);

        let cycle = FundingCycle {
            number,
            configuration: ConfigurationId(configuration),
            based_on,
            start: now.max(must_start_at_or_after),
            duration: data.duration,
            weight: data.weight,
            discount_rate: data.discount_rate,
            ballot: data.ballot,
            metadata,
        };
        history.push(cycle.clone());

        debug!(
            project = %project_id,
            configuration = %cycle.configuration,
            start = cycle.start,
            "Funding cycle configured"
        );
        Ok(cycle)
    }

    fn get(
        &self,
        project_id: ProjectId,
        configuration: ConfigurationId,
    ) -> StorageResult<FundingCycle> {
        let guard = read(&self.cycles, "funding cycles")?;
        Ok(guard
            .get(&project_id)
            .and_then(|h| h.iter().find(|c| c.configuration == configuration))
            .cloned()
            .unwrap_or_else(FundingCycle::empty))
    }

    fn current_of(&self, project_id: ProjectId) -> StorageResult<Option<FundingCycle>> {
        let now = self.now();
        let guard = read(&self.cycles, "funding cycles")?;
        Ok(guard
            .get(&project_id)
            .and_then(|h| Self::current_in(h, now))
            .cloned())
    }

    fn queued_of(&self, project_id: ProjectId) -> StorageResult<Option<FundingCycle>> {
        let now = self.now();
        let guard = read(&self.cycles, "funding cycles")?;
        Ok(guard
            .get(&project_id)
            .and_then(|h| h.iter().rev().find(|c| c.start > now))
            .cloned())
    }

    fn latest_configured_of(
        &self,
        project_id: ProjectId,
    ) -> StorageResult<(FundingCycle, BallotState)> {
        let guard = read(&self.cycles, "funding cycles")?;
        let latest = guard
            .get(&project_id)
            .and_then(|h| h.last())
            .cloned()
            .unwrap_or_else(FundingCycle::empty);
        Ok((latest, BallotState::Approved))
    }

    fn latest_configuration_of(&self, project_id: ProjectId) -> StorageResult<ConfigurationId> {
        let guard = read(&self.cycles, "funding cycles")?;
        Ok(guard
            .get(&project_id)
            .and_then(|h| h.last())
            .map(|c| c.configuration)
            .unwrap_or(ConfigurationId::NONE))
    }
}

// ── Splits ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySplitsStore {
    groups: RwLock<HashMap<(ProjectId, u64, u64), Vec<Split>>>,
}

impl InMemorySplitsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SplitsStore for InMemorySplitsStore {
    fn set(&self, project_id: ProjectId, domain: u64, groups: &[SplitGroup]) -> StorageResult<()> {
        if let Some(group) = groups
            .iter()
            .find(|g| g.total_percent() > SPLITS_TOTAL_PERCENT)
        {
            return Err(StorageError::InvalidInput(format!(
                "split group {} totals {} of {}",
                group.group,
                group.total_percent(),
                SPLITS_TOTAL_PERCENT
            )));
        }

        let mut guard = write(&self.groups, "splits")?;
        for group in groups {
            guard.insert((project_id, domain, group.group), group.splits.clone());
        }
        Ok(())
    }

    fn splits_of(
        &self,
        project_id: ProjectId,
        domain: u64,
        group: u64,
    ) -> StorageResult<Vec<Split>> {
        let guard = read(&self.groups, "splits")?;
        Ok(guard
            .get(&(project_id, domain, group))
            .cloned()
            .unwrap_or_default())
    }
}

// ── Tokens ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<ProjectId, IssuedToken>>,
    balances: RwLock<HashMap<(ProjectId, Address), TokenBalance>>,
    supply: RwLock<HashMap<ProjectId, U256>>,
}

/// Issued token contracts are placed above this address.
const TOKEN_ADDRESS_BASE: u64 = 0x7000_0000;

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued_token(&self, project_id: ProjectId) -> StorageResult<Option<IssuedToken>> {
        Ok(read(&self.tokens, "tokens")?.get(&project_id).cloned())
    }
}

impl TokenStore for InMemoryTokenStore {
    fn issue_for(&self, project_id: ProjectId, name: &str, symbol: &str) -> StorageResult<Address> {
        if name.is_empty() || symbol.is_empty() {
            return Err(StorageError::InvalidInput(
                "token name and symbol are required".to_string(),
            ));
        }
        let mut guard = write(&self.tokens, "tokens")?;
        if guard.contains_key(&project_id) {
            return Err(StorageError::Conflict(format!(
                "project {} already has a token",
                project_id
            )));
        }
        let address = Address::from_low_u64(TOKEN_ADDRESS_BASE + project_id.as_u64());
        guard.insert(
            project_id,
            IssuedToken {
                address,
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
        );
        debug!(project = %project_id, token = %address, symbol, "Token issued");
        Ok(address)
    }

    fn token_of(&self, project_id: ProjectId) -> StorageResult<Option<Address>> {
        Ok(read(&self.tokens, "tokens")?
            .get(&project_id)
            .map(|t| t.address))
    }

    fn mint_for(
        &self,
        holder: Address,
        project_id: ProjectId,
        amount: U256,
        prefer_claimed: bool,
    ) -> StorageResult<()> {
        let claimed = prefer_claimed && self.token_of(project_id)?.is_some();

        let mut balances = write(&self.balances, "balances")?;
        let mut supply = write(&self.supply, "supply")?;
        let total = supply.entry(project_id).or_default();
        *total = total
            .checked_add(amount)
            .ok_or_else(|| StorageError::InvalidInput("total supply overflow".to_string()))?;

        let balance = balances.entry((project_id, holder)).or_default();
        if claimed {
            balance.claimed += amount;
        } else {
            balance.unclaimed += amount;
        }

        debug!(project = %project_id, holder = %holder, amount = %amount, claimed, "Tokens minted");
        Ok(())
    }

    fn burn_from(
        &self,
        holder: Address,
        project_id: ProjectId,
        amount: U256,
        prefer_claimed: bool,
    ) -> StorageResult<()> {
        let mut balances = write(&self.balances, "balances")?;
        let balance = balances.entry((project_id, holder)).or_default();
        let available = balance.total();
        if available < amount {
            return Err(StorageError::InsufficientBalance {
                requested: amount.to_string(),
                available: available.to_string(),
            });
        }

        let (from_claimed, from_unclaimed) = if prefer_claimed {
            let claimed = balance.claimed.min(amount);
            (claimed, amount - claimed)
        } else {
            let unclaimed = balance.unclaimed.min(amount);
            (amount - unclaimed, unclaimed)
        };
        balance.claimed -= from_claimed;
        balance.unclaimed -= from_unclaimed;

        let mut supply = write(&self.supply, "supply")?;
        let total = supply.entry(project_id).or_default();
        *total = total.saturating_sub(amount);

        debug!(project = %project_id, holder = %holder, amount = %amount, "Tokens burned");
        Ok(())
    }

    fn balance_of(&self, holder: Address, project_id: ProjectId) -> StorageResult<TokenBalance> {
        Ok(read(&self.balances, "balances")?
            .get(&(project_id, holder))
            .copied()
            .unwrap_or_default())
    }

    fn total_supply_of(&self, project_id: ProjectId) -> StorageResult<U256> {
        Ok(read(&self.supply, "supply")?
            .get(&project_id)
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

// ── Directory ───────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryProjectDirectory {
    controllers: RwLock<HashMap<ProjectId, Address>>,
    terminals: RwLock<HashMap<ProjectId, Vec<Address>>>,
}

impl InMemoryProjectDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectDirectory for InMemoryProjectDirectory {
    fn controller_of(&self, project_id: ProjectId) -> StorageResult<Option<Address>> {
        Ok(read(&self.controllers, "controllers")?
            .get(&project_id)
            .copied())
    }

    fn set_controller_of(&self, project_id: ProjectId, controller: Address) -> StorageResult<()> {
        write(&self.controllers, "controllers")?.insert(project_id, controller);
        Ok(())
    }

    fn terminals_of(&self, project_id: ProjectId) -> StorageResult<Vec<Address>> {
        Ok(read(&self.terminals, "terminals")?
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }

    fn set_terminals_of(&self, project_id: ProjectId, terminals: &[Address]) -> StorageResult<()> {
        let mut unique: Vec<Address> = Vec::with_capacity(terminals.len());
        for terminal in terminals {
            if unique.contains(terminal) {
                return Err(StorageError::Conflict(format!(
                    "terminal {} listed twice",
                    terminal
                )));
            }
            unique.push(*terminal);
        }
        write(&self.terminals, "terminals")?.insert(project_id, unique);
        Ok(())
    }

    fn is_terminal_of(&self, project_id: ProjectId, terminal: Address) -> StorageResult<bool> {
        Ok(read(&self.terminals, "terminals")?
            .get(&project_id)
            .is_some_and(|t| t.contains(&terminal)))
    }
}

// ── Operators ───────────────────────────────────────────────────────

/// Operator registry storing one permission word per (operator, account,
/// domain), one bit per operation index.
#[derive(Default)]
pub struct InMemoryOperatorStore {
    permissions: RwLock<HashMap<(Address, Address, u64), U256>>,
}

impl InMemoryOperatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn permission_word(
        &self,
        operator: Address,
        account: Address,
        domain: u64,
    ) -> StorageResult<U256> {
        Ok(read(&self.permissions, "operators")?
            .get(&(operator, account, domain))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

impl OperatorStore for InMemoryOperatorStore {
    fn has_permission(
        &self,
        operator: Address,
        account: Address,
        domain: u64,
        operation: Operation,
    ) -> StorageResult<bool> {
        Ok(self
            .permission_word(operator, account, domain)?
            .bit(operation.index()))
    }

    fn set_operator(
        &self,
        account: Address,
        operator: Address,
        domain: u64,
        operations: &[Operation],
    ) -> StorageResult<()> {
        let mut word = U256::ZERO;
        for operation in operations {
            word.set_bit(operation.index(), true);
        }
        write(&self.permissions, "operators")?.insert((operator, account, domain), word);
        Ok(())
    }
}

// ── Allocators ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryAllocatorRegistry {
    allocators: RwLock<HashMap<Address, Arc<dyn SplitAllocator>>>,
}

impl InMemoryAllocatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        address: Address,
        allocator: Arc<dyn SplitAllocator>,
    ) -> StorageResult<()> {
        write(&self.allocators, "allocators")?.insert(address, allocator);
        Ok(())
    }
}

impl AllocatorRegistry for InMemoryAllocatorRegistry {
    fn allocator_of(&self, address: Address) -> StorageResult<Option<Arc<dyn SplitAllocator>>> {
        Ok(read(&self.allocators, "allocators")?.get(&address).cloned())
    }
}

// ── Controller state ────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryControllerState {
    distribution_limits: RwLock<HashMap<FundAccessKey, U256>>,
    overflow_allowances: RwLock<HashMap<FundAccessKey, U256>>,
    reserved: RwLock<HashMap<ProjectId, U256>>,
}

impl InMemoryControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored fund-access words across both families.
    pub fn stored_word_count(&self) -> StorageResult<usize> {
        Ok(read(&self.distribution_limits, "distribution limits")?.len()
            + read(&self.overflow_allowances, "overflow allowances")?.len())
    }
}

impl ControllerStateStore for InMemoryControllerState {
    fn packed_distribution_limit_of(&self, key: &FundAccessKey) -> StorageResult<U256> {
        Ok(read(&self.distribution_limits, "distribution limits")?
            .get(key)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn set_packed_distribution_limit_of(
        &self,
        key: FundAccessKey,
        word: U256,
    ) -> StorageResult<()> {
        write(&self.distribution_limits, "distribution limits")?.insert(key, word);
        Ok(())
    }

    fn packed_overflow_allowance_of(&self, key: &FundAccessKey) -> StorageResult<U256> {
        Ok(read(&self.overflow_allowances, "overflow allowances")?
            .get(key)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn set_packed_overflow_allowance_of(
        &self,
        key: FundAccessKey,
        word: U256,
    ) -> StorageResult<()> {
        write(&self.overflow_allowances, "overflow allowances")?.insert(key, word);
        Ok(())
    }

    fn reserved_token_balance_of(&self, project_id: ProjectId) -> StorageResult<U256> {
        Ok(read(&self.reserved, "reserved balances")?
            .get(&project_id)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn add_reserved_tokens(&self, project_id: ProjectId, amount: U256) -> StorageResult<U256> {
        let mut guard = write(&self.reserved, "reserved balances")?;
        let balance = guard.entry(project_id).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| StorageError::InvalidInput("reserved balance overflow".to_string()))?;
        Ok(*balance)
    }

    fn take_reserved_tokens(&self, project_id: ProjectId) -> StorageResult<U256> {
        let mut guard = write(&self.reserved, "reserved balances")?;
        Ok(guard.remove(&project_id).unwrap_or(U256::ZERO))
    }
}

// ── Events ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<ControllerEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> StorageResult<Vec<ControllerEvent>> {
        Ok(read(&self.events, "events")?.clone())
    }

    pub fn events_for(&self, project_id: ProjectId) -> StorageResult<Vec<ControllerEvent>> {
        Ok(read(&self.events, "events")?
            .iter()
            .filter(|e| e.project_id() == project_id)
            .cloned()
            .collect())
    }

    pub fn names(&self) -> StorageResult<Vec<&'static str>> {
        Ok(read(&self.events, "events")?
            .iter()
            .map(|e| e.name())
            .collect())
    }
}

impl EventSink for InMemoryEventLog {
    fn emit(&self, event: ControllerEvent) -> StorageResult<()> {
        write(&self.events, "events")?.push(event);
        Ok(())
    }
}

/// Concrete handles to one in-memory instance of every collaborator.
///
/// Controllers built from the same set share projects, tokens and the
/// directory, which is what migrations between them need.
#[derive(Clone, Default)]
pub struct InMemoryCollaborators {
    pub projects: Arc<InMemoryProjectRegistry>,
    pub funding_cycles: Arc<InMemoryFundingCycleStore>,
    pub splits: Arc<InMemorySplitsStore>,
    pub tokens: Arc<InMemoryTokenStore>,
    pub directory: Arc<InMemoryProjectDirectory>,
    pub operators: Arc<InMemoryOperatorStore>,
    pub allocators: Arc<InMemoryAllocatorRegistry>,
    pub events: Arc<InMemoryEventLog>,
}

impl InMemoryCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collaborators whose funding-cycle clock is pinned at `timestamp`.
    pub fn at(timestamp: u64) -> Self {
        Self {
            funding_cycles: Arc::new(InMemoryFundingCycleStore::at(timestamp)),
            ..Self::default()
        }
    }
}

//! The account ledger engine.

use std::sync::Arc;

use bank_common::{round_money, AccountId, BankError, Balances, Currency, Result};
use bank_fx::{seed_default_rates, CurrencyConverter, InMemoryRateTable};
use bank_ledger::{InMemoryTransactionStore, LedgerBatch, LedgerWriter, Transaction, TransactionKind};
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use crate::account::Account;
use crate::config::EngineConfig;
use crate::locks::{AccountGuard, AccountLocks};
use crate::metrics::{EngineMetrics, EngineMetricsSnapshot};
use crate::notify::{AccountEvent, AccountEventKind, NoopNotifier, Notifier};
use crate::store::{AccountStore, InMemoryAccountStore};

/// Owns account state and applies deposits, debits and exchanges.
///
/// Every operation runs as one unit of work under the account's lock: the
/// account is loaded, a working copy is mutated, ledger rows are staged in a
/// [`LedgerBatch`], then the account is saved and the batch committed. A
/// failed commit restores the saved snapshot, so callers observe either the
/// whole operation or none of it.
pub struct AccountLedgerEngine {
    /// Account persistence.
    accounts: Arc<dyn AccountStore>,
    /// Sole writer of transaction rows.
    ledger: LedgerWriter,
    /// Currency conversion.
    converter: CurrencyConverter,
    /// Post-operation event sink.
    notifier: Arc<dyn Notifier>,
    /// Per-account serialization.
    locks: AccountLocks,
    /// Operation counters.
    metrics: EngineMetrics,
}

impl AccountLedgerEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        ledger: LedgerWriter,
        converter: CurrencyConverter,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            converter,
            notifier,
            locks: AccountLocks::new(),
            metrics: EngineMetrics::new(),
        }
    }

    /// Create an engine backed entirely by in-memory stores.
    pub fn in_memory(config: &EngineConfig) -> Result<Self> {
        Self::in_memory_with_notifier(config, Arc::new(NoopNotifier))
    }

    /// Same as [`AccountLedgerEngine::in_memory`] with a custom notifier.
    pub fn in_memory_with_notifier(
        config: &EngineConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate().map_err(BankError::invalid_argument)?;

        let rates = Arc::new(InMemoryRateTable::new());
        if config.seed_rates {
            let inserted = seed_default_rates(&rates)?;
            info!(inserted, "Rate table ready");
        }

        Ok(Self::new(
            Arc::new(InMemoryAccountStore::new()),
            LedgerWriter::new(Arc::new(InMemoryTransactionStore::new())),
            CurrencyConverter::new(rates),
            notifier,
        ))
    }

    /// Open a new account with every currency at zero.
    #[instrument(skip(self))]
    pub async fn create_account(&self, account_number: &str) -> Result<Account> {
        let result = self.open_account(account_number).await;
        self.settle("create_account", result)
    }

    /// Add `amount`, rounded half-up to two places, to one currency.
    #[instrument(skip(self))]
    pub async fn deposit(
        &self,
        account_id: &AccountId,
        currency: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let result = self.apply_deposit(account_id, currency, amount).await;
        self.settle("deposit", result)
    }

    /// Remove `amount`, rounded half-up to two places, from one currency.
    #[instrument(skip(self))]
    pub async fn debit(
        &self,
        account_id: &AccountId,
        currency: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let result = self.apply_debit(account_id, currency, amount).await;
        self.settle("debit", result)
    }

    /// Convert `amount` of `from` into `to` at the table rate.
    ///
    /// The outgoing ledger row carries the amount exactly as given; only the
    /// incoming row is rounded.
    #[instrument(skip(self))]
    pub async fn exchange(
        &self,
        account_id: &AccountId,
        from: Currency,
        to: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let result = self.apply_exchange(account_id, from, to, amount).await;
        self.settle("exchange", result)
    }

    /// Current balance per currency.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, account_id: &AccountId) -> Result<Balances> {
        let _guard = self.lock_existing(account_id).await?;
        let account = self.load(account_id).await?;

        self.notifier
            .notify(AccountEvent::new(account.id, AccountEventKind::Queried));

        Ok(account.balances)
    }

    /// Every transaction of the account in insertion order.
    #[instrument(skip(self))]
    pub async fn get_transaction_history(&self, account_id: &AccountId) -> Result<Vec<Transaction>> {
        let _guard = self.lock_existing(account_id).await?;
        self.load(account_id).await?;

        let history = self.ledger.history(account_id).await?;
        self.notifier
            .notify(AccountEvent::new(*account_id, AccountEventKind::Queried));

        Ok(history)
    }

    /// Full account view.
    pub async fn find_account(&self, account_id: &AccountId) -> Result<Account> {
        let _guard = self.lock_existing(account_id).await?;
        self.load(account_id).await
    }

    /// Check that the ledger replays to the stored balances.
    #[instrument(skip(self))]
    pub async fn verify_account(&self, account_id: &AccountId) -> Result<bool> {
        let _guard = self.lock_existing(account_id).await?;
        let account = self.load(account_id).await?;
        let net = self.ledger.net_positions(account_id).await?;

        let mut consistent = true;
        for (currency, balance) in account.balances.iter() {
            let replayed = net.get(currency);
            if replayed != balance {
                warn!(
                    account = %account_id,
                    currency = %currency,
                    balance = %balance,
                    replayed = %replayed,
                    "Ledger does not match balance"
                );
                consistent = false;
            }
        }

        Ok(consistent)
    }

    /// Get current metrics snapshot.
    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn open_account(&self, account_number: &str) -> Result<Account> {
        let account = Account::open(account_number)?;
        self.accounts.save(&account).await?;

        self.metrics.account_created();
        info!(account = %account.id, "Account created");
        self.notifier.notify(AccountEvent::new(
            account.id,
            AccountEventKind::Created {
                account_number: account.account_number.clone(),
            },
        ));

        Ok(account)
    }

    async fn apply_deposit(
        &self,
        account_id: &AccountId,
        currency: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let amount = round_money(non_negative(amount)?);

        let _guard = self.lock_existing(account_id).await?;
        let snapshot = self.load(account_id).await?;

        let mut account = snapshot.clone();
        account.balances.credit(currency, amount)?;
        account.touch();

        let mut batch = LedgerBatch::new(account.id);
        batch.add_entry(
            self.ledger
                .entry(account.id, currency, amount, TransactionKind::Deposit),
        );
        self.persist(&snapshot, &account, batch).await?;

        self.metrics.deposit_applied();
        info!(account = %account.id, currency = %currency, amount = %amount, "Deposit applied");
        self.notifier.notify(AccountEvent::new(
            account.id,
            AccountEventKind::Deposited { currency, amount },
        ));

        Ok(account)
    }

    async fn apply_debit(
        &self,
        account_id: &AccountId,
        currency: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let amount = round_money(non_negative(amount)?);

        let _guard = self.lock_existing(account_id).await?;
        let snapshot = self.load(account_id).await?;

        let mut account = snapshot.clone();
        account.balances.debit(currency, amount)?;
        account.touch();

        let mut batch = LedgerBatch::new(account.id);
        batch.add_entry(
            self.ledger
                .entry(account.id, currency, outflow(amount), TransactionKind::Debit),
        );
        self.persist(&snapshot, &account, batch).await?;

        self.metrics.debit_applied();
        info!(account = %account.id, currency = %currency, amount = %amount, "Debit applied");
        self.notifier.notify(AccountEvent::new(
            account.id,
            AccountEventKind::Debited { currency, amount },
        ));

        Ok(account)
    }

    async fn apply_exchange(
        &self,
        account_id: &AccountId,
        from: Currency,
        to: Currency,
        amount: Decimal,
    ) -> Result<Account> {
        let amount = non_negative(amount)?;

        let _guard = self.lock_existing(account_id).await?;
        let snapshot = self.load(account_id).await?;

        let mut account = snapshot.clone();
        let conversion = self
            .converter
            .convert(&mut account.balances, from, to, amount)
            .await?;
        account.touch();

        let mut batch = LedgerBatch::new(account.id);
        batch.add_entry(self.ledger.entry(
            account.id,
            from,
            outflow(conversion.debited),
            TransactionKind::Exchange,
        ));
        batch.add_entry(self.ledger.entry(
            account.id,
            to,
            conversion.credited,
            TransactionKind::Exchange,
        ));
        self.persist(&snapshot, &account, batch).await?;

        self.metrics.exchange_applied();
        info!(
            account = %account.id,
            pair = %conversion.pair,
            rate = %conversion.rate,
            debited = %conversion.debited,
            credited = %conversion.credited,
            "Exchange applied"
        );
        self.notifier.notify(AccountEvent::new(
            account.id,
            AccountEventKind::Exchanged {
                from,
                to,
                debited: conversion.debited,
                credited: conversion.credited,
            },
        ));

        Ok(account)
    }

    /// Lock an account that is known to exist.
    ///
    /// Accounts are never removed, so checking first keeps the lock table
    /// bounded by the number of accounts.
    async fn lock_existing(&self, account_id: &AccountId) -> Result<AccountGuard> {
        self.load(account_id).await?;
        Ok(self.locks.acquire(account_id).await)
    }

    async fn load(&self, account_id: &AccountId) -> Result<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| BankError::account_not_found(account_id))
    }

    /// Save `account` then commit `batch`, restoring `snapshot` if the commit fails.
    async fn persist(&self, snapshot: &Account, account: &Account, batch: LedgerBatch) -> Result<()> {
        self.accounts.save(account).await?;

        if let Err(err) = self.ledger.commit(batch).await {
            self.metrics.rolled_back();
            match self.accounts.save(snapshot).await {
                Ok(()) => warn!(account = %account.id, error = %err, "Ledger commit failed, account restored"),
                Err(restore) => error!(
                    account = %account.id,
                    error = %err,
                    restore_error = %restore,
                    "Ledger commit failed and account could not be restored"
                ),
            }
            return Err(err);
        }

        Ok(())
    }

    fn settle<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.metrics.operation_rejected();
            warn!(operation, code = err.error_code(), error = %err, "Operation rejected");
        }
        result
    }
}

fn non_negative(amount: Decimal) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(BankError::invalid_argument("Amount must be positive"));
    }
    // `-0` passes the check above; drop its sign.
    Ok(amount.abs())
}

/// Signed ledger amount for funds leaving the account.
fn outflow(amount: Decimal) -> Decimal {
    if amount.is_zero() {
        amount
    } else {
        -amount
    }
}

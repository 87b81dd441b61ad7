//! Fire-and-forget account notifications.

use bank_common::{AccountId, Currency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// What happened to an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountEventKind {
    /// Account opened.
    Created { account_number: String },
    /// Funds deposited.
    Deposited { currency: Currency, amount: Decimal },
    /// Funds debited.
    Debited { currency: Currency, amount: Decimal },
    /// Funds exchanged between two currencies.
    Exchanged {
        from: Currency,
        to: Currency,
        debited: Decimal,
        credited: Decimal,
    },
    /// Balance or history read.
    Queried,
}

/// Event emitted after a successful engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    /// Account concerned.
    pub account_id: AccountId,
    /// Event payload.
    #[serde(flatten)]
    pub kind: AccountEventKind,
    /// When the event was raised.
    pub occurred_at: DateTime<Utc>,
}

impl AccountEvent {
    /// Create an event stamped with the current time.
    pub fn new(account_id: AccountId, kind: AccountEventKind) -> Self {
        Self {
            account_id,
            kind,
            occurred_at: Utc::now(),
        }
    }
}

/// Sink for account events.
///
/// `notify` must not block and must not fail the calling operation.
pub trait Notifier: Send + Sync {
    /// Hand an event off.
    fn notify(&self, event: AccountEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _event: AccountEvent) {}
}

/// Forwards events into a bounded channel, dropping them when it is full.
pub struct ChannelNotifier {
    sender: mpsc::Sender<AccountEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AccountEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: AccountEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(account = %event.account_id, "Notification channel full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(account = %event.account_id, "Notification channel closed, event dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_channel_delivers_events() {
        let (notifier, mut receiver) = ChannelNotifier::new(4);
        let account = AccountId::new();

        notifier.notify(AccountEvent::new(
            account,
            AccountEventKind::Deposited {
                currency: Currency::Usd,
                amount: dec!(10.00),
            },
        ));

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.account_id, account);
        assert!(matches!(event.kind, AccountEventKind::Deposited { .. }));
    }

    #[tokio::test]
    async fn test_full_channel_drops_without_blocking() {
        let (notifier, mut receiver) = ChannelNotifier::new(1);
        let account = AccountId::new();

        notifier.notify(AccountEvent::new(account, AccountEventKind::Queried));
        notifier.notify(AccountEvent::new(account, AccountEventKind::Queried));

        assert!(receiver.recv().await.is_some());
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (notifier, receiver) = ChannelNotifier::new(1);
        drop(receiver);

        notifier.notify(AccountEvent::new(AccountId::new(), AccountEventKind::Queried));
    }

    #[test]
    fn test_event_serializes_flat() {
        let event = AccountEvent::new(
            AccountId::new(),
            AccountEventKind::Created {
                account_number: "12345".to_string(),
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "created");
        assert_eq!(json["account_number"], "12345");
    }
}

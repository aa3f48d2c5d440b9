// 💰 Fund Tracker - view state for the fixed-split screen
//
// Owns the current FundState and last-saved day. A save goes:
// parse -> pure deposit -> persist both keys in one write -> swap in memory.
// If the write fails the in-memory state is untouched.

use anyhow::Context;
use chrono::NaiveDate;

use crate::error::SavingsError;
use crate::funds::{self, FundDeposit, FundState};
use crate::input::parse_deposit;
use crate::store::{Event, KeyValueStore, FUNDS_KEY, LAST_SAVED_KEY};

#[derive(Debug, Clone)]
pub struct FundTracker {
    funds: FundState,
    last_saved: Option<NaiveDate>,
    actor: &'static str,
}

impl FundTracker {
    pub fn new(funds: FundState, last_saved: Option<NaiveDate>) -> Self {
        FundTracker {
            funds,
            last_saved,
            actor: "app",
        }
    }

    /// Load from storage; missing keys mean a fresh start
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, SavingsError> {
        let state: FundState = match store.get(FUNDS_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored funds")?,
            None => FundState::default(),
        };

        // An unreadable date only costs the daily gate for one day
        let last_saved = store.get(LAST_SAVED_KEY)?.as_deref().and_then(funds::parse_day);

        Ok(FundTracker::new(state, last_saved))
    }

    /// Name recorded on audit events
    pub fn with_actor(mut self, actor: &'static str) -> Self {
        self.actor = actor;
        self
    }

    pub fn funds(&self) -> FundState {
        self.funds
    }

    pub fn last_saved(&self) -> Option<NaiveDate> {
        self.last_saved
    }

    pub fn has_saved_on(&self, day: NaiveDate) -> bool {
        self.last_saved == Some(day)
    }

    /// Record today's deposit from raw input text
    pub fn save<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        input: &str,
        today: NaiveDate,
    ) -> Result<FundDeposit, SavingsError> {
        let amount = parse_deposit(input)?;
        let outcome = funds::deposit(&self.funds, amount, today, self.last_saved)?;

        let funds_json = serde_json::to_string(&outcome.funds).context("Failed to serialize funds")?;
        store
            .set_many(&[
                (FUNDS_KEY, funds_json),
                (LAST_SAVED_KEY, funds::format_day(today)),
            ])
            .context("Failed to save funds")?;

        self.funds = outcome.funds;
        self.last_saved = Some(today);

        let _ = store.append_event(&Event::new(
            "funds_deposited",
            "funds",
            FUNDS_KEY,
            serde_json::json!({
                "amount": amount,
                "split": outcome.split,
                "saved_on": funds::format_day(today),
            }),
            self.actor,
        ));
        if outcome.weekly_goal_reached {
            let _ = store.append_event(&Event::new(
                "weekly_goal_reached",
                "funds",
                FUNDS_KEY,
                serde_json::json!({ "threshold": funds::WEEKLY_THRESHOLD }),
                self.actor,
            ));
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SqliteStore};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_load_defaults_when_empty() {
        let store = MemoryStore::new();
        let tracker = FundTracker::load(&store).unwrap();

        assert_eq!(tracker.funds(), FundState::default());
        assert_eq!(tracker.last_saved(), None);
    }

    #[test]
    fn test_save_persists_funds_and_date_together() {
        let mut store = MemoryStore::new();
        let mut tracker = FundTracker::load(&store).unwrap();

        tracker.save(&mut store, "110", day(1)).unwrap();

        assert_eq!(store.get(LAST_SAVED_KEY).unwrap().as_deref(), Some("2025-06-01"));

        let reloaded = FundTracker::load(&store).unwrap();
        assert_eq!(reloaded.funds(), tracker.funds());
        assert!(reloaded.has_saved_on(day(1)));
        assert_eq!(store.events()[0].event_type, "funds_deposited");
    }

    #[test]
    fn test_second_save_same_day_rejected() {
        let mut store = MemoryStore::new();
        let mut tracker = FundTracker::load(&store).unwrap();

        tracker.save(&mut store, "50", day(2)).unwrap();
        let snapshot = store.get(FUNDS_KEY).unwrap();
        let funds_before = tracker.funds();

        let second = tracker.save(&mut store, "50", day(2));

        assert_eq!(second.unwrap_err(), SavingsError::DuplicateSaveToday);
        assert_eq!(tracker.funds(), funds_before);
        assert_eq!(store.get(FUNDS_KEY).unwrap(), snapshot);
    }

    #[test]
    fn test_daily_gate_survives_restart() {
        let mut store = MemoryStore::new();
        FundTracker::load(&store).unwrap().save(&mut store, "50", day(3)).unwrap();

        let mut restarted = FundTracker::load(&store).unwrap();
        assert_eq!(
            restarted.save(&mut store, "20", day(3)).unwrap_err(),
            SavingsError::DuplicateSaveToday
        );
    }

    #[test]
    fn test_invalid_input_leaves_state_unchanged() {
        let mut store = MemoryStore::new();
        let mut tracker = FundTracker::load(&store).unwrap();

        for bad in ["-5", "abc", ""] {
            let err = tracker.save(&mut store, bad, day(4)).unwrap_err();
            assert!(matches!(err, SavingsError::InvalidAmount { .. }));
        }

        assert_eq!(tracker.funds(), FundState::default());
        assert_eq!(tracker.last_saved(), None);
        assert_eq!(store.get(FUNDS_KEY).unwrap(), None);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_consistent() {
        let mut store = MemoryStore::new();
        let mut tracker = FundTracker::load(&store).unwrap();
        store.set_fail_writes(true);

        let err = tracker.save(&mut store, "100", day(5)).unwrap_err();

        assert!(err.is_storage());
        assert_eq!(tracker.funds(), FundState::default());
        assert_eq!(tracker.last_saved(), None);

        // Same day works once storage recovers
        store.set_fail_writes(false);
        assert!(tracker.save(&mut store, "100", day(5)).is_ok());
    }

    #[test]
    fn test_weekly_reset_recorded() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut tracker = FundTracker::new(
            FundState {
                gym: 10.0,
                weekly: 95.0,
                protein: 10.0,
            },
            Some(day(9)),
        )
        .with_actor("test");

        let outcome = tracker.save(&mut store, "22", day(10)).unwrap();

        assert!(outcome.weekly_goal_reached);
        assert_eq!(tracker.funds().weekly, 0.0);

        let events = store.events_for_entity("funds", FUNDS_KEY).unwrap();
        assert_eq!(events[0].event_type, "weekly_goal_reached");
        assert_eq!(events[0].actor, "test");
    }

    #[test]
    fn test_huge_deposit_reloads() {
        let mut store = MemoryStore::new();
        let mut tracker = FundTracker::load(&store).unwrap();

        tracker.save(&mut store, "1e308", day(6)).unwrap();

        let reloaded = FundTracker::load(&store).unwrap().funds();
        let saved = tracker.funds();
        assert!(reloaded.total().is_finite());
        assert!(((reloaded.gym - saved.gym) / saved.gym).abs() < 1e-12);
        assert!(((reloaded.protein - saved.protein) / saved.protein).abs() < 1e-12);

        println!("✅ Huge deposit test PASSED");
    }

    #[test]
    fn test_overflowing_balance_rejected() {
        let mut store = MemoryStore::new();
        let start = FundState {
            gym: f64::MAX,
            weekly: 0.0,
            protein: 0.0,
        };
        let mut tracker = FundTracker::new(start, Some(day(6)));

        let err = tracker.save(&mut store, "1e308", day(7)).unwrap_err();

        assert!(matches!(err, SavingsError::InvalidAmount { .. }));
        assert_eq!(tracker.funds(), start);
        assert_eq!(store.get(FUNDS_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_funds_is_storage_error() {
        let mut store = MemoryStore::new();
        store.set(FUNDS_KEY, "not json").unwrap();

        assert!(FundTracker::load(&store).unwrap_err().is_storage());
    }
}

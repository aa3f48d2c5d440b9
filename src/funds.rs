// 🏋️ Fixed-Split Funds - one pool, three sub-funds
//
// Every deposit is split gym 45 : weekly 25 : protein 40 (out of 110, so the
// three shares add up to the whole deposit). At most one deposit per calendar
// day. The weekly fund empties itself once it reaches the threshold.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SavingsError;

pub const GYM_PARTS: f64 = 45.0;
pub const WEEKLY_PARTS: f64 = 25.0;
pub const PROTEIN_PARTS: f64 = 40.0;
pub const TOTAL_PARTS: f64 = GYM_PARTS + WEEKLY_PARTS + PROTEIN_PARTS;

/// Weekly fund resets to zero once it reaches this balance
pub const WEEKLY_THRESHOLD: f64 = 100.0;

/// Date format used for the persisted last-saved day
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// FUND STATE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundState {
    #[serde(default)]
    pub gym: f64,
    #[serde(default)]
    pub weekly: f64,
    #[serde(default)]
    pub protein: f64,
}

impl FundState {
    pub fn total(&self) -> f64 {
        self.gym + self.weekly + self.protein
    }
}

/// How one deposit is divided
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundSplit {
    pub gym: f64,
    pub weekly: f64,
    pub protein: f64,
}

impl FundSplit {
    pub fn of(amount: f64) -> Self {
        // Divide first so huge finite amounts stay finite
        let gym = amount / TOTAL_PARTS * GYM_PARTS;
        let weekly = amount / TOTAL_PARTS * WEEKLY_PARTS;
        // Remainder, so the shares never drift from the deposit
        let protein = amount - gym - weekly;

        FundSplit { gym, weekly, protein }
    }
}

/// Result of a successful deposit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FundDeposit {
    pub funds: FundState,
    pub split: FundSplit,
    pub saved_on: NaiveDate,
    /// Weekly crossed the threshold and was reset to 0
    pub weekly_goal_reached: bool,
}

// ============================================================================
// DEPOSIT
// ============================================================================

/// Apply one deposit to `state`.
///
/// `last_saved` is the day of the previous successful deposit, if any.
/// Rejections leave nothing changed; the caller only persists on `Ok`.
pub fn deposit(
    state: &FundState,
    amount: f64,
    today: NaiveDate,
    last_saved: Option<NaiveDate>,
) -> Result<FundDeposit, SavingsError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(SavingsError::invalid_amount(amount.to_string()));
    }

    if last_saved == Some(today) {
        return Err(SavingsError::DuplicateSaveToday);
    }

    let split = FundSplit::of(amount);
    let mut funds = FundState {
        gym: state.gym + split.gym,
        weekly: state.weekly + split.weekly,
        protein: state.protein + split.protein,
    };

    // Balances are stored as JSON numbers; inf would persist as null
    if !(funds.gym.is_finite() && funds.weekly.is_finite() && funds.protein.is_finite()) {
        return Err(SavingsError::invalid_amount(amount.to_string()));
    }

    let weekly_goal_reached = funds.weekly >= WEEKLY_THRESHOLD;
    if weekly_goal_reached {
        funds.weekly = 0.0;
    }

    Ok(FundDeposit {
        funds,
        split,
        saved_on: today,
        weekly_goal_reached,
    })
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

pub fn parse_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

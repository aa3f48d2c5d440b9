// 🎯 Priority Goals - proportional allocation by priority weight
//
// Two ways money moves between goals:
// - allocate_deposit: new money is ADDED to every goal by weight
// - redistribute_edit: one goal is set by hand, the rest of the total is
//   REBUILT across the other goals by weight (previous amounts discarded)
//
// Integer units throughout. Leftover from flooring goes to the first High
// goal in list order, or the first goal when there is no High goal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SavingsError;

// ============================================================================
// PRIORITY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn weight(&self) -> u64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// High -> Medium -> Low -> High (priority selector)
    pub fn next(&self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low => Priority::High,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}' (expected High, Medium or Low)", other)),
        }
    }
}

// ============================================================================
// GOAL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Stable identity (UUID), never changes across edits
    pub id: String,
    pub name: String,
    pub amount: u64,
    pub target: u64,
    #[serde(default)]
    pub priority: Priority,
}

impl Goal {
    pub fn new(name: &str, target: u64, priority: Priority) -> Self {
        Goal {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            amount: 0,
            target,
            priority,
        }
    }

    /// Saved at least the target
    pub fn is_complete(&self) -> bool {
        self.amount >= self.target
    }

    pub fn remaining(&self) -> u64 {
        self.target.saturating_sub(self.amount)
    }
}

/// One goal's share of a deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub goal_id: String,
    pub goal_name: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalDeposit {
    pub goals: Vec<Goal>,
    pub allocations: Vec<Allocation>,
}

pub fn total_savings(goals: &[Goal]) -> Option<u64> {
    goals.iter().try_fold(0u64, |sum, g| sum.checked_add(g.amount))
}

// ============================================================================
// WEIGHTED SPLIT
// ============================================================================

/// Split `total` over `priorities` proportionally to weight.
///
/// Each share is floored and clamped to what is left; the leftover goes to
/// the first High entry, else the first entry. The shares always sum to
/// `total` when `priorities` is non-empty.
pub fn weighted_split(total: u64, priorities: &[Priority]) -> Vec<u64> {
    let total_weight: u64 = priorities.iter().map(Priority::weight).sum();
    let mut remaining = total;

    let mut shares: Vec<u64> = priorities
        .iter()
        .map(|p| {
            let share = if total_weight > 0 {
                // u128 so total * weight cannot overflow
                (total as u128 * p.weight() as u128 / total_weight as u128) as u64
            } else {
                0
            };
            let share = share.min(remaining);
            remaining -= share;
            share
        })
        .collect();

    if remaining > 0 && !shares.is_empty() {
        let index = priorities
            .iter()
            .position(|p| *p == Priority::High)
            .unwrap_or(0);
        shares[index] += remaining;
    }

    shares
}

// ============================================================================
// DEPOSIT ALLOCATION
// ============================================================================

/// Add `deposit` to every goal by priority weight.
pub fn allocate_deposit(goals: &[Goal], deposit: u64) -> Result<GoalDeposit, SavingsError> {
    if deposit == 0 {
        return Err(SavingsError::invalid_amount(deposit.to_string()));
    }
    if goals.is_empty() {
        return Err(SavingsError::EmptyGoalList);
    }

    let priorities: Vec<Priority> = goals.iter().map(|g| g.priority).collect();
    let shares = weighted_split(deposit, &priorities);

    let mut updated = Vec::with_capacity(goals.len());
    let mut allocations = Vec::with_capacity(goals.len());

    for (goal, share) in goals.iter().zip(shares) {
        let amount = goal
            .amount
            .checked_add(share)
            .ok_or_else(|| SavingsError::invalid_amount(deposit.to_string()))?;

        allocations.push(Allocation {
            goal_id: goal.id.clone(),
            goal_name: goal.name.clone(),
            amount: share,
        });
        updated.push(Goal {
            amount,
            ..goal.clone()
        });
    }

    Ok(GoalDeposit {
        goals: updated,
        allocations,
    })
}

// ============================================================================
// EDIT REDISTRIBUTION
// ============================================================================

/// Set goal `id` to `new_amount` and rebuild every other goal from what is
/// left of the total, by weight. The total is conserved exactly.
///
/// With no other goals the edited goal simply takes the new value.
pub fn redistribute_edit(goals: &[Goal], id: &str, new_amount: u64) -> Result<Vec<Goal>, SavingsError> {
    let edited = goals
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| SavingsError::GoalNotFound { id: id.to_string() })?;

    if goals.len() == 1 {
        let mut updated = goals.to_vec();
        updated[edited].amount = new_amount;
        return Ok(updated);
    }

    let total = total_savings(goals).ok_or_else(|| SavingsError::invalid_amount(new_amount.to_string()))?;
    if new_amount > total {
        return Err(SavingsError::ExceedsTotalSavings {
            requested: new_amount,
            available: total,
        });
    }

    let others: Vec<Priority> = goals
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != edited)
        .map(|(_, g)| g.priority)
        .collect();
    let mut shares = weighted_split(total - new_amount, &others).into_iter();

    let updated = goals
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let amount = if i == edited {
                new_amount
            } else {
                shares.next().unwrap_or(0)
            };
            Goal { amount, ..g.clone() }
        })
        .collect();

    Ok(updated)
}

// ============================================================================
// CRUD
// ============================================================================

/// Validate raw form input and build a new goal (amount 0)
pub fn new_goal(name: &str, target_input: &str, priority: Priority) -> Result<Goal, SavingsError> {
    if name.trim().is_empty() {
        return Err(SavingsError::MissingRequiredField { field: "goal name" });
    }
    let target = crate::input::parse_target(target_input)?;

    Ok(Goal::new(name, target, priority))
}

/// Remove goal `id`. Callers confirm with the user first.
pub fn remove_goal(goals: &[Goal], id: &str) -> Result<Vec<Goal>, SavingsError> {
    if !goals.iter().any(|g| g.id == id) {
        return Err(SavingsError::GoalNotFound { id: id.to_string() });
    }
    Ok(goals.iter().filter(|g| g.id != id).cloned().collect())
}

/// Zero one goal. The others are left alone.
pub fn reset_goal(goals: &[Goal], id: &str) -> Result<Vec<Goal>, SavingsError> {
    if !goals.iter().any(|g| g.id == id) {
        return Err(SavingsError::GoalNotFound { id: id.to_string() });
    }
    Ok(goals
        .iter()
        .map(|g| if g.id == id { Goal { amount: 0, ..g.clone() } } else { g.clone() })
        .collect())
}

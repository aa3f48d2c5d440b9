// 📋 Goal Tracker - view state for the priority-goal screen
//
// Same discipline as the fund tracker: every command computes a new goal list
// with the pure functions in `goals`, writes it, and only then replaces the
// list held in memory.

use anyhow::Context;

use crate::error::SavingsError;
use crate::goals::{self, Goal, GoalDeposit, Priority};
use crate::input::{parse_positive_whole, parse_whole};
use crate::store::{Event, KeyValueStore, GOALS_KEY};

#[derive(Debug, Clone)]
pub struct GoalTracker {
    goals: Vec<Goal>,
    actor: &'static str,
}

impl GoalTracker {
    pub fn new(goals: Vec<Goal>) -> Self {
        GoalTracker { goals, actor: "app" }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, SavingsError> {
        let goals: Vec<Goal> = match store.get(GOALS_KEY)? {
            Some(json) => serde_json::from_str(&json).context("Failed to parse stored goals")?,
            None => Vec::new(),
        };
        Ok(GoalTracker::new(goals))
    }

    /// Name recorded on audit events
    pub fn with_actor(mut self, actor: &'static str) -> Self {
        self.actor = actor;
        self
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Sum of every goal's amount
    pub fn total(&self) -> u64 {
        self.goals.iter().map(|g| g.amount).fold(0u64, u64::saturating_add)
    }

    /// Exact id, or a prefix matching exactly one goal
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String, SavingsError> {
        let needle = id_or_prefix.trim();
        if let Some(goal) = self.get(needle) {
            return Ok(goal.id.clone());
        }

        let mut matches = self.goals.iter().filter(|g| !needle.is_empty() && g.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(goal), None) => Ok(goal.id.clone()),
            _ => Err(SavingsError::GoalNotFound {
                id: needle.to_string(),
            }),
        }
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Spread a deposit over all goals by priority
    pub fn deposit<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        input: &str,
    ) -> Result<GoalDeposit, SavingsError> {
        let amount = parse_positive_whole(input)?;
        let outcome = goals::allocate_deposit(&self.goals, amount)?;

        self.commit(store, outcome.goals.clone())?;
        self.record(
            store,
            "goal_deposit",
            "goals",
            serde_json::json!({ "amount": amount, "allocations": outcome.allocations }),
        );

        Ok(outcome)
    }

    pub fn add_goal<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        name: &str,
        target_input: &str,
        priority: Priority,
    ) -> Result<Goal, SavingsError> {
        let goal = goals::new_goal(name, target_input, priority)?;

        let mut updated = self.goals.clone();
        updated.push(goal.clone());
        self.commit(store, updated)?;
        self.record(
            store,
            "goal_added",
            &goal.id,
            serde_json::json!({ "name": goal.name, "target": goal.target, "priority": goal.priority }),
        );

        Ok(goal)
    }

    /// Set one goal by hand and rebuild the others from the remaining total
    pub fn edit_amount<S: KeyValueStore + ?Sized>(
        &mut self,
        store: &mut S,
        id: &str,
        input: &str,
    ) -> Result<Goal, SavingsError> {
        let new_amount = parse_whole(input)?;
        let previous = self
            .get(id)
            .map(|g| g.amount)
            .ok_or_else(|| SavingsError::GoalNotFound { id: id.to_string() })?;

        let updated = goals::redistribute_edit(&self.goals, id, new_amount)?;
        self.commit(store, updated)?;
        self.record(
            store,
            "goal_amount_edited",
            id,
            serde_json::json!({ "from": previous, "to": new_amount, "total": self.total() }),
        );

        self.get(id)
            .cloned()
            .ok_or_else(|| SavingsError::GoalNotFound { id: id.to_string() })
    }

    /// Zero one goal; nothing is redistributed
    pub fn reset<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, id: &str) -> Result<(), SavingsError> {
        let previous = self.get(id).map(|g| g.amount).unwrap_or(0);

        let updated = goals::reset_goal(&self.goals, id)?;
        self.commit(store, updated)?;
        self.record(store, "goal_reset", id, serde_json::json!({ "from": previous }));

        Ok(())
    }

    /// Remove a goal. Only call after the user confirmed.
    pub fn delete<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, id: &str) -> Result<Goal, SavingsError> {
        let removed = self
            .get(id)
            .cloned()
            .ok_or_else(|| SavingsError::GoalNotFound { id: id.to_string() })?;

        let updated = goals::remove_goal(&self.goals, id)?;
        self.commit(store, updated)?;
        self.record(
            store,
            "goal_deleted",
            id,
            serde_json::json!({ "name": removed.name, "amount": removed.amount }),
        );

        Ok(removed)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn commit<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, updated: Vec<Goal>) -> Result<(), SavingsError> {
        let json = serde_json::to_string(&updated).context("Failed to serialize goals")?;
        store.set(GOALS_KEY, &json).context("Failed to save goals")?;
        self.goals = updated;
        Ok(())
    }

    fn record<S: KeyValueStore + ?Sized>(&self, store: &mut S, event_type: &str, entity_id: &str, data: serde_json::Value) {
        // Audit trail is best effort; the command already succeeded
        let _ = store.append_event(&Event::new(event_type, "goal", entity_id, data, self.actor));
    }
}

//! Food selection model behind the "which food goes here?" sheet.
//!
//! The sheet is opened for one [`Target`]. It lists every cart item, starts
//! with the items already assigned to that target selected, and produces an
//! [`OrderAction::ConfirmSelection`] when the user confirms.

use crate::session::{OrderAction, OrderSession};
use crate::types::{Assignment, CartItem, CartItemId, Target};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One row of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEntry<'a> {
    /// The cart item
    pub item: &'a CartItem,
    /// Whether it is ticked
    pub selected: bool,
    /// Whether it belongs elsewhere and cannot be toggled
    pub locked: bool,
}

/// Ticked items for one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodSelection {
    target: Target,
    selected: BTreeSet<CartItemId>,
}

impl FoodSelection {
    /// Opens the sheet for `target`, preselecting what is already there
    #[must_use]
    pub fn open(session: &OrderSession, target: Target) -> Self {
        Self {
            target,
            selected: session.items_for(target).map(|item| item.id.clone()).collect(),
        }
    }

    /// Context the sheet was opened for
    #[must_use]
    pub const fn target(&self) -> Target {
        self.target
    }

    /// Currently ticked ids
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<CartItemId> {
        &self.selected
    }

    /// Whether `id` is ticked
    #[must_use]
    pub fn is_selected(&self, id: &CartItemId) -> bool {
        self.selected.contains(id)
    }

    /// In a stop context, anything not at `Current` or at this stop is locked.
    /// Nothing is locked in the `Current` context.
    #[must_use]
    pub fn is_locked(&self, item: &CartItem) -> bool {
        match self.target {
            Target::Current => false,
            Target::Stop(_) => {
                let assigned = item.assigned_to();
                assigned != Assignment::Current && !assigned.is(self.target)
            },
        }
    }

    /// Rows for every cart item, in cart order
    #[must_use]
    pub fn entries<'a>(&self, session: &'a OrderSession) -> Vec<SelectionEntry<'a>> {
        session
            .cart_items()
            .iter()
            .map(|item| SelectionEntry {
                item,
                selected: self.is_selected(&item.id),
                locked: self.is_locked(item),
            })
            .collect()
    }

    /// Flips the tick on `id`; returns whether anything changed
    ///
    /// Locked rows ignore the toggle. In the `Current` context the last
    /// ticked item that sits at `Current` can't be unticked.
    pub fn toggle(&mut self, session: &OrderSession, id: &CartItemId) -> bool {
        let Some(item) = session.item(id) else {
            return false;
        };
        if self.is_locked(item) {
            tracing::debug!(item = %id, target = %self.target, "Toggle ignored: item is locked");
            return false;
        }

        if self.selected.contains(id) {
            if self.target == Target::Current
                && item.assigned_to() == Assignment::Current
                && self.selected_at_current(session) <= 1
            {
                tracing::debug!(item = %id, "Toggle ignored: last item at current location");
                return false;
            }
            self.selected.remove(id);
        } else {
            self.selected.insert(id.clone());
        }
        true
    }

    /// The action that commits this selection
    #[must_use]
    pub fn confirm(&self) -> OrderAction {
        OrderAction::ConfirmSelection {
            target: self.target,
            item_ids: self.selected.clone(),
        }
    }

    fn selected_at_current(&self, session: &OrderSession) -> usize {
        self.selected
            .iter()
            .filter_map(|id| session.item(id))
            .filter(|item| item.assigned_to() == Assignment::Current)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::session::{OrderSessionReducer, SessionEnvironment};
    use crate::types::{Food, FoodId, StopId, StoreId};
    use foodies_core::reducer::Reducer;
    use foodies_testing::SequentialIdGenerator;
    use std::sync::Arc;
    use uuid::Uuid;

    fn stop(n: u128) -> StopId {
        StopId::from_uuid(Uuid::from_u128(n))
    }

    fn id(s: &str) -> CartItemId {
        CartItemId::new(s)
    }

    fn add(name: &str) -> OrderAction {
        let food = Food {
            id: FoodId::new(name),
            store_id: StoreId::new("store-1"),
            store_name: "Hungry Lion".to_string(),
            name: name.to_string(),
            image: String::new(),
            price: 10,
            category: "Sides".to_string(),
        };
        OrderAction::AddToCart {
            item: CartItem::from_food(id(name), &food),
        }
    }

    fn session_with(actions: Vec<OrderAction>) -> OrderSession {
        let reducer = OrderSessionReducer::new();
        let env = SessionEnvironment::new(Arc::new(SequentialIdGenerator::new()));
        let mut session = OrderSession::new(3);
        for action in actions {
            let _ = reducer.reduce(&mut session, action, &env);
        }
        session
    }

    /// x at S1, y at Current, z at S2, w unassigned
    fn mixed_session() -> OrderSession {
        session_with(vec![
            add("x"),
            add("y"),
            add("z"),
            add("w"),
            OrderAction::AddStop,
            OrderAction::AddStop,
            OrderAction::AssignItem {
                item_id: id("x"),
                target: Target::Stop(stop(1)),
            },
            OrderAction::AssignItem {
                item_id: id("z"),
                target: Target::Stop(stop(2)),
            },
            OrderAction::UnassignItem {
                item_id: id("w"),
                from: Target::Current,
            },
        ])
    }

    #[test]
    fn opening_preselects_items_at_target() {
        let session = mixed_session();
        let selection = FoodSelection::open(&session, Target::Stop(stop(1)));
        assert_eq!(selection.selected().iter().collect::<Vec<_>>(), vec![&id("x")]);
    }

    #[test]
    fn stop_context_locks_items_elsewhere() {
        let session = mixed_session();
        let selection = FoodSelection::open(&session, Target::Stop(stop(1)));
        let locked: Vec<&str> = selection
            .entries(&session)
            .into_iter()
            .filter(|entry| entry.locked)
            .map(|entry| entry.item.id.as_str())
            .collect();
        assert_eq!(locked, vec!["z", "w"]);
    }

    #[test]
    fn current_context_locks_nothing() {
        let session = mixed_session();
        let selection = FoodSelection::open(&session, Target::Current);
        assert!(selection.entries(&session).iter().all(|entry| !entry.locked));
    }

    #[test]
    fn locked_entries_ignore_toggle() {
        let session = mixed_session();
        let mut selection = FoodSelection::open(&session, Target::Stop(stop(1)));
        assert!(!selection.toggle(&session, &id("z")));
        assert!(!selection.is_selected(&id("z")));
    }

    #[test]
    fn last_current_item_cannot_be_deselected() {
        let session = mixed_session();
        let mut selection = FoodSelection::open(&session, Target::Current);
        assert!(selection.is_selected(&id("y")));
        assert!(!selection.toggle(&session, &id("y")));
        assert!(selection.is_selected(&id("y")));

        // With a second Current item ticked, y may go.
        let session = session_with(vec![add("a"), add("b")]);
        let mut selection = FoodSelection::open(&session, Target::Current);
        assert!(selection.toggle(&session, &id("a")));
        assert!(!selection.toggle(&session, &id("b")));
    }

    #[test]
    fn confirm_carries_target_and_ticks() {
        let session = mixed_session();
        let mut selection = FoodSelection::open(&session, Target::Stop(stop(1)));
        assert!(selection.toggle(&session, &id("y")));
        assert!(selection.toggle(&session, &id("x")));

        match selection.confirm() {
            OrderAction::ConfirmSelection { target, item_ids } => {
                assert_eq!(target, Target::Stop(stop(1)));
                assert_eq!(item_ids.into_iter().collect::<Vec<_>>(), vec![id("y")]);
            },
            other => unreachable!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn unknown_item_toggle_is_ignored() {
        let session = mixed_session();
        let mut selection = FoodSelection::open(&session, Target::Current);
        assert!(!selection.toggle(&session, &id("ghost")));
    }
}

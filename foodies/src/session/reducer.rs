//! Reducer for the order session.

use super::state::OrderSession;
use crate::types::{Address, CartItem, CartItemId, StopId, Target};
use foodies_core::{
    effect::Effect, environment::IdGenerator, reducer::Reducer, SmallVec,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Every way the order session can change
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderAction {
    /// Put a new purchase in the cart
    AddToCart {
        /// Item to insert; its assignment is reset to `Current`
        item: CartItem,
    },
    /// Delete a purchase from the cart
    RemoveFromCart {
        /// Item to delete
        item_id: CartItemId,
    },
    /// Set where the customer orders from
    UpdatePrimaryLocation {
        /// Resolved address
        address: Address,
    },
    /// Append an empty stop, if the cap allows
    AddStop,
    /// Remove a stop, returning its items to the unassigned pool
    RemoveStop {
        /// Stop to remove
        stop_id: StopId,
    },
    /// Set a stop's address
    UpdateStopAddress {
        /// Stop to update
        stop_id: StopId,
        /// Resolved address
        address: Address,
    },
    /// Drop stops that have neither an address nor items
    CleanStops,
    /// Assign an item to a target, overwriting its current assignment
    AssignItem {
        /// Item to assign
        item_id: CartItemId,
        /// Destination
        target: Target,
    },
    /// Unassign an item, only if it is currently assigned to `from`
    UnassignItem {
        /// Item to unassign
        item_id: CartItemId,
        /// Expected current assignment
        from: Target,
    },
    /// Reconcile a confirmed food selection against one target
    ConfirmSelection {
        /// Context the selection was made in
        target: Target,
        /// Items the user left selected
        item_ids: BTreeSet<CartItemId>,
    },
}

/// Dependencies of the order session reducer
#[derive(Clone)]
pub struct SessionEnvironment {
    /// Source of stop ids
    pub ids: Arc<dyn IdGenerator>,
}

impl SessionEnvironment {
    /// Creates a new `SessionEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }
}

/// Reducer owning every mutation of [`OrderSession`]
#[derive(Clone, Debug, Default)]
pub struct OrderSessionReducer;

impl OrderSessionReducer {
    /// Creates a new `OrderSessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies a confirmed selection for `target`.
    ///
    /// Items previously assigned to `target` but no longer selected go back
    /// to the pool. Newly selected items move only along the allowed
    /// direction: anything may come back to `Current`, but a stop only takes
    /// items that are currently at `Current`.
    fn reconcile(session: &mut OrderSession, target: Target, selected: &BTreeSet<CartItemId>) {
        if !session.is_valid_target(target) {
            tracing::debug!(%target, "Ignoring selection for a stop that no longer exists");
            return;
        }

        let previously_assigned: Vec<CartItemId> = session
            .items_for(target)
            .map(|item| item.id.clone())
            .collect();

        for id in previously_assigned.iter().filter(|id| !selected.contains(*id)) {
            session.unassign(id, target);
        }

        for id in selected {
            let Some(item) = session.item(id) else {
                continue;
            };
            let current = item.assigned_to();
            if current.is(target) {
                continue;
            }

            let eligible = match target {
                Target::Current => true,
                Target::Stop(_) => current.is(Target::Current),
            };
            if eligible {
                session.assign(id, target);
            } else {
                tracing::debug!(item = %id, ?current, %target, "Item not eligible for target");
            }
        }
    }
}

impl Reducer for OrderSessionReducer {
    type State = OrderSession;
    type Action = OrderAction;
    type Environment = SessionEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            OrderAction::AddToCart { item } => {
                let id = item.id.clone();
                if state.insert_item(item) {
                    tracing::debug!(item = %id, "Added to cart");
                } else {
                    tracing::warn!(item = %id, "Rejected cart item: duplicate id or zero quantity");
                }
            },

            OrderAction::RemoveFromCart { item_id } => {
                if !state.remove_item(&item_id) {
                    tracing::debug!(item = %item_id, "Remove ignored: item not in cart");
                }
            },

            OrderAction::UpdatePrimaryLocation { address } => {
                tracing::debug!(place = %address.place_id, "Primary location updated");
                state.set_primary_location(address);
            },

            OrderAction::AddStop => {
                let id = StopId::from_uuid(env.ids.next_id());
                if state.push_stop(id) {
                    tracing::debug!(stop = %id, stops = state.stops().len(), "Stop added");
                } else {
                    metrics::counter!("foodies.stops.rejected").increment(1);
                    tracing::warn!(max_stops = state.max_stops(), "Stop cap reached");
                }
            },

            OrderAction::RemoveStop { stop_id } => match state.remove_stop(stop_id) {
                Some(released) => {
                    tracing::debug!(stop = %stop_id, released, "Stop removed");
                },
                None => tracing::debug!(stop = %stop_id, "Remove ignored: unknown stop"),
            },

            OrderAction::UpdateStopAddress { stop_id, address } => {
                if !state.set_stop_address(stop_id, address) {
                    tracing::debug!(stop = %stop_id, "Address ignored: unknown stop");
                }
            },

            OrderAction::CleanStops => {
                let removed = state.clean_stops();
                if !removed.is_empty() {
                    tracing::debug!(removed = removed.len(), "Cleaned empty stops");
                }
            },

            OrderAction::AssignItem { item_id, target } => {
                if !state.assign(&item_id, target) {
                    tracing::warn!(item = %item_id, %target, "Assignment ignored: unknown item or stop");
                }
            },

            OrderAction::UnassignItem { item_id, from } => {
                if !state.unassign(&item_id, from) {
                    tracing::debug!(item = %item_id, %from, "Unassign ignored: not assigned there");
                }
            },

            OrderAction::ConfirmSelection { target, item_ids } => {
                Self::reconcile(state, target, &item_ids);
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::{Assignment, Food, FoodId, Stop, StoreId};
    use foodies_testing::{assertions, ReducerTest, SequentialIdGenerator};
    use uuid::Uuid;

    fn env() -> SessionEnvironment {
        SessionEnvironment::new(Arc::new(SequentialIdGenerator::new()))
    }

    fn stop(n: u128) -> StopId {
        StopId::from_uuid(Uuid::from_u128(n))
    }

    fn item(id: &str, price: u32) -> CartItem {
        let food = Food {
            id: FoodId::new(format!("food-{id}")),
            store_id: StoreId::new("store-1"),
            store_name: "Hungry Lion".to_string(),
            name: id.to_string(),
            image: String::new(),
            price,
            category: "Burgers".to_string(),
        };
        CartItem::from_food(CartItemId::new(id), &food)
    }

    fn add(id: &str, price: u32) -> OrderAction {
        OrderAction::AddToCart {
            item: item(id, price),
        }
    }

    fn id(id: &str) -> CartItemId {
        CartItemId::new(id)
    }

    fn confirm(target: Target, ids: &[&str]) -> OrderAction {
        OrderAction::ConfirmSelection {
            target,
            item_ids: ids.iter().map(|s| CartItemId::new(*s)).collect(),
        }
    }

    fn assignment(session: &OrderSession, item: &str) -> Assignment {
        session.item(&id(item)).unwrap().assigned_to()
    }

    #[test]
    fn add_to_cart_assigns_current() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .when_action(add("x", 10))
            .then_state(|s| {
                assert_eq!(s.cart_items().len(), 1);
                assert_eq!(assignment(s, "x"), Assignment::Current);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn duplicate_cart_id_is_ignored() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([add("x", 10)])
            .when_action(add("x", 99))
            .then_state(|s| {
                assert_eq!(s.cart_items().len(), 1);
                assert_eq!(s.item(&id("x")).unwrap().price, 10);
            })
            .run();
    }

    #[test]
    fn remove_from_cart_leaves_others() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([add("x", 10), add("y", 25)])
            .when_action(OrderAction::RemoveFromCart { item_id: id("x") })
            .then_state(|s| {
                assert!(s.item(&id("x")).is_none());
                assert_eq!(assignment(s, "y"), Assignment::Current);
            })
            .run();
    }

    #[test]
    fn add_stop_at_cap_keeps_count() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([OrderAction::AddStop, OrderAction::AddStop, OrderAction::AddStop])
            .when_action(OrderAction::AddStop)
            .then_state(|s| {
                assert_eq!(s.stops().len(), 3);
                assert!(!s.can_add_stop());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stops_are_numbered_in_route_order() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([OrderAction::AddStop, OrderAction::AddStop, OrderAction::AddStop])
            .when_action(OrderAction::RemoveStop { stop_id: stop(2) })
            .then_state(|s| {
                assert_eq!(s.stop_number(stop(1)), Some(1));
                assert_eq!(s.stop_number(stop(3)), Some(2));
                assert_eq!(s.stop_number(stop(2)), None);
                assert!(s.can_add_stop());
            })
            .run();
    }

    #[test]
    fn move_to_stop_then_remove_stop_unassigns() {
        // X and Y at Current, X confirmed for S1, then S1 removed.
        let session = {
            let reducer = OrderSessionReducer::new();
            let env = env();
            let mut s = OrderSession::new(3);
            for action in [add("x", 10), add("y", 25), OrderAction::AddStop] {
                let _ = reducer.reduce(&mut s, action, &env);
            }
            let _ = reducer.reduce(&mut s, confirm(Target::Stop(stop(1)), &["x"]), &env);
            assert_eq!(assignment(&s, "x"), Assignment::Stop(stop(1)));
            assert_eq!(assignment(&s, "y"), Assignment::Current);
            s
        };

        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(session)
            .when_action(OrderAction::RemoveStop { stop_id: stop(1) })
            .then_state(|s| {
                assert_eq!(assignment(s, "x"), Assignment::Unassigned);
                assert_eq!(assignment(s, "y"), Assignment::Current);
                assert_eq!(s.unassigned_items().count(), 1);
                assert!(s.is_consistent());
            })
            .run();
    }

    #[test]
    fn unassign_from_wrong_target_is_noop() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([
                add("x", 10),
                OrderAction::AddStop,
                OrderAction::AddStop,
                OrderAction::AssignItem {
                    item_id: id("x"),
                    target: Target::Stop(stop(2)),
                },
            ])
            .when_action(OrderAction::UnassignItem {
                item_id: id("x"),
                from: Target::Current,
            })
            .then_state(|s| assert_eq!(assignment(s, "x"), Assignment::Stop(stop(2))))
            .run();
    }

    #[test]
    fn assign_to_unknown_stop_is_rejected() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([add("x", 10)])
            .when_action(OrderAction::AssignItem {
                item_id: id("x"),
                target: Target::Stop(stop(42)),
            })
            .then_state(|s| {
                assert_eq!(assignment(s, "x"), Assignment::Current);
                assert!(s.is_consistent());
            })
            .run();
    }

    #[test]
    fn confirming_for_another_stop_does_not_steal_items() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([
                add("x", 10),
                OrderAction::AddStop,
                OrderAction::AddStop,
                confirm(Target::Stop(stop(1)), &["x"]),
            ])
            .when_action(confirm(Target::Stop(stop(2)), &["x"]))
            .then_state(|s| assert_eq!(assignment(s, "x"), Assignment::Stop(stop(1))))
            .run();
    }

    #[test]
    fn stop_does_not_claim_unassigned_items() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([
                add("x", 10),
                OrderAction::AddStop,
                OrderAction::UnassignItem {
                    item_id: id("x"),
                    from: Target::Current,
                },
            ])
            .when_action(confirm(Target::Stop(stop(1)), &["x"]))
            .then_state(|s| assert_eq!(assignment(s, "x"), Assignment::Unassigned))
            .run();
    }

    #[test]
    fn current_confirmation_pulls_items_back_and_releases_deselected() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([
                add("x", 10),
                add("y", 25),
                add("z", 5),
                OrderAction::AddStop,
                confirm(Target::Stop(stop(1)), &["x"]),
            ])
            .when_action(confirm(Target::Current, &["x", "y"]))
            .then_state(|s| {
                assert_eq!(assignment(s, "x"), Assignment::Current);
                assert_eq!(assignment(s, "y"), Assignment::Current);
                assert_eq!(assignment(s, "z"), Assignment::Unassigned);
            })
            .run();
    }

    #[test]
    fn confirmation_is_idempotent() {
        let reducer = OrderSessionReducer::new();
        let env = env();
        let mut once = OrderSession::new(3);
        for action in [add("x", 10), add("y", 25), OrderAction::AddStop] {
            let _ = reducer.reduce(&mut once, action, &env);
        }
        let mut twice = once.clone();

        let selection = confirm(Target::Stop(stop(1)), &["x"]);
        let _ = reducer.reduce(&mut once, selection.clone(), &env);
        let _ = reducer.reduce(&mut twice, selection.clone(), &env);
        let _ = reducer.reduce(&mut twice, selection, &env);

        assert_eq!(once, twice);
    }

    #[test]
    fn confirming_for_removed_stop_is_noop() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([add("x", 10)])
            .when_action(confirm(Target::Stop(stop(7)), &["x"]))
            .then_state(|s| assert_eq!(assignment(s, "x"), Assignment::Current))
            .run();
    }

    #[test]
    fn clean_stops_keeps_addressed_or_loaded_stops() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([
                add("x", 10),
                OrderAction::AddStop,
                OrderAction::AddStop,
                OrderAction::AddStop,
                OrderAction::UpdateStopAddress {
                    stop_id: stop(1),
                    address: Address::new("p1", "Cairo Road"),
                },
                confirm(Target::Stop(stop(2)), &["x"]),
            ])
            .when_action(OrderAction::CleanStops)
            .then_state(|s| {
                let ids: Vec<StopId> = s.stops().iter().map(Stop::id).collect();
                assert_eq!(ids, vec![stop(1), stop(2)]);
            })
            .run();
    }

    #[test]
    fn update_unknown_stop_address_is_noop() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([OrderAction::AddStop])
            .when_action(OrderAction::UpdateStopAddress {
                stop_id: stop(9),
                address: Address::new("p", "Nowhere"),
            })
            .then_state(|s| assert!(s.stop(stop(1)).unwrap().address().is_none()))
            .run();
    }

    #[test]
    fn store_totals_sum_line_totals() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .given_actions([add("x", 10)])
            .when_action(OrderAction::AddToCart {
                item: item("y", 25).with_quantity(2),
            })
            .then_state(|s| {
                let store = StoreId::new("store-1");
                assert_eq!(s.cart_count_for_store(&store), 2);
                assert_eq!(s.cart_total_for_store(&store), 60);
                assert_eq!(s.cart_count_for_store(&StoreId::new("store-2")), 0);
            })
            .run();
    }

    #[test]
    fn primary_location_is_set() {
        ReducerTest::new(OrderSessionReducer::new())
            .with_env(env())
            .given_state(OrderSession::new(3))
            .when_action(OrderAction::UpdatePrimaryLocation {
                address: Address::new("p", "Kabulonga Road"),
            })
            .then_state(|s| {
                assert_eq!(s.primary_location().unwrap().description, "Kabulonga Road");
            })
            .run();
    }
}

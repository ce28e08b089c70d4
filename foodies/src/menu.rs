//! Menu screen: browse one store's foods and fill the cart.

use crate::app::{FoodiesEnvironment, FoodiesState};
use crate::session::{self, OrderAction, OrderSession};
use crate::types::{CartItem, CartItemId, Food, FoodId, StoreId};
use foodies_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde::Serialize;

/// Store opened when none is chosen
pub const DEFAULT_STORE_ID: &str = "store-1";

/// Display name of [`DEFAULT_STORE_ID`]
pub const DEFAULT_STORE_NAME: &str = "Hungry Lion";

/// Menu screen state
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuState {
    /// Store being browsed
    pub store_id: StoreId,
    /// Its display name
    pub store_name: String,
    /// Foods on its menu
    pub foods: Vec<Food>,
    /// Food highlighted after being added
    pub recently_added: Option<FoodId>,
    /// Bumped on every add; a pending highlight clear only applies to its own add
    pub highlight_generation: u64,
    /// Whether the user moved on to the route screen
    pub advanced_to_route: bool,
}

impl MenuState {
    /// Whether any cart item was bought from `food_id`
    #[must_use]
    pub fn is_in_cart(session: &OrderSession, food_id: &FoodId) -> bool {
        session
            .cart_items()
            .iter()
            .any(|item| &item.food_id == food_id)
    }

    /// Items in the cart from the open store
    #[must_use]
    pub fn cart_count(&self, session: &OrderSession) -> usize {
        session.cart_count_for_store(&self.store_id)
    }

    /// Cart total for the open store
    #[must_use]
    pub fn cart_total(&self, session: &OrderSession) -> u64 {
        session.cart_total_for_store(&self.store_id)
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            store_id: StoreId::new(DEFAULT_STORE_ID),
            store_name: DEFAULT_STORE_NAME.to_string(),
            foods: Vec::new(),
            recently_added: None,
            highlight_generation: 0,
            advanced_to_route: false,
        }
    }
}

/// Menu screen actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Load a store's menu
    Open {
        /// Store to browse
        store_id: StoreId,
        /// Its display name
        store_name: String,
    },
    /// Put one unit of a food in the cart
    AddFood {
        /// Food to buy
        food_id: FoodId,
    },
    /// Take one unit of a food out of the cart
    RemoveFood {
        /// Food to drop
        food_id: FoodId,
    },
    /// Fired by the highlight timer
    ClearHighlight {
        /// Generation the timer was started for
        generation: u64,
    },
    /// Continue to the route screen
    CompleteOrder,
}

/// Reducer for the menu screen
#[derive(Clone, Debug, Default)]
pub struct MenuReducer;

impl MenuReducer {
    /// Creates a new `MenuReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Purchase id from the clock, suffixed if two adds land on the same millisecond
    fn purchase_id(session: &OrderSession, food_id: &FoodId, env: &FoodiesEnvironment) -> CartItemId {
        let base = CartItemId::for_purchase(food_id, env.clock.now());
        if session.item(&base).is_none() {
            return base;
        }
        let mut n: u32 = 2;
        loop {
            let id = CartItemId::new(format!("{base}-{n}"));
            if session.item(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }
}

impl Reducer for MenuReducer {
    type State = FoodiesState;
    type Action = MenuAction;
    type Environment = FoodiesEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            MenuAction::Open {
                store_id,
                store_name,
            } => {
                let foods = env.catalog.foods_by_store(&store_id);
                tracing::debug!(store = %store_id, foods = foods.len(), "Menu opened");
                state.menu = MenuState {
                    store_id,
                    store_name,
                    foods,
                    // Timers from the previous visit must not match the next add
                    highlight_generation: state.menu.highlight_generation,
                    ..MenuState::default()
                };
                SmallVec::new()
            },

            MenuAction::AddFood { food_id } => {
                let Some(food) = state.menu.foods.iter().find(|food| food.id == food_id) else {
                    tracing::warn!(food = %food_id, "Add ignored: food not on this menu");
                    return SmallVec::new();
                };

                let id = Self::purchase_id(&state.session, &food_id, env);
                let item = CartItem::from_food(id, food);
                session::apply(&mut state.session, OrderAction::AddToCart { item }, &env.session);

                state.menu.highlight_generation += 1;
                state.menu.recently_added = Some(food_id);

                smallvec![Effect::Delay {
                    duration: env.config.highlight_duration,
                    action: Box::new(MenuAction::ClearHighlight {
                        generation: state.menu.highlight_generation,
                    }),
                }]
            },

            MenuAction::RemoveFood { food_id } => {
                let target = state
                    .session
                    .cart_items()
                    .iter()
                    .find(|item| item.food_id == food_id)
                    .map(|item| item.id.clone());

                match target {
                    Some(item_id) => session::apply(
                        &mut state.session,
                        OrderAction::RemoveFromCart { item_id },
                        &env.session,
                    ),
                    None => tracing::debug!(food = %food_id, "Remove ignored: food not in cart"),
                }
                SmallVec::new()
            },

            MenuAction::ClearHighlight { generation } => {
                if generation == state.menu.highlight_generation {
                    state.menu.recently_added = None;
                }
                SmallVec::new()
            },

            MenuAction::CompleteOrder => {
                if state.menu.cart_count(&state.session) == 0 {
                    tracing::debug!(store = %state.menu.store_id, "Complete ignored: cart is empty");
                } else {
                    state.menu.advanced_to_route = true;
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::providers::{InMemoryAddressBook, StaticCatalog};
    use crate::types::Assignment;
    use foodies_testing::{assertions, test_clock, ReducerTest, SequentialIdGenerator};
    use std::sync::Arc;
    use std::time::Duration;

    fn env() -> FoodiesEnvironment {
        FoodiesEnvironment::new(
            SessionConfig::default(),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(test_clock()),
            Arc::new(StaticCatalog::demo()),
            Arc::new(InMemoryAddressBook::demo()),
        )
    }

    fn open() -> MenuAction {
        MenuAction::Open {
            store_id: StoreId::new("store-1"),
            store_name: "Hungry Lion".to_string(),
        }
    }

    fn add(food: &str) -> MenuAction {
        MenuAction::AddFood {
            food_id: FoodId::new(food),
        }
    }

    #[test]
    fn open_loads_the_store_menu() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .when_action(open())
            .then_state(|s| {
                assert_eq!(s.menu.foods.len(), 5);
                assert_eq!(s.menu.store_name, "Hungry Lion");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unknown_store_has_empty_menu() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .when_action(MenuAction::Open {
                store_id: StoreId::new("store-404"),
                store_name: "Closed".to_string(),
            })
            .then_state(|s| assert!(s.menu.foods.is_empty()))
            .run();
    }

    #[test]
    fn add_food_creates_current_item_and_schedules_clear() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open()])
            .when_action(add("hl-1"))
            .then_state(|s| {
                let item = &s.session.cart_items()[0];
                assert_eq!(item.id.as_str(), "hl-1-1735689600000");
                assert_eq!(item.quantity, 1);
                assert_eq!(item.assigned_to(), Assignment::Current);
                assert_eq!(s.menu.recently_added, Some(FoodId::new("hl-1")));
                assert!(MenuState::is_in_cart(&s.session, &FoodId::new("hl-1")));
            })
            .then_effects(|effects| match effects {
                [Effect::Delay { duration, action }] => {
                    assert_eq!(*duration, Duration::from_millis(500));
                    assert_eq!(**action, MenuAction::ClearHighlight { generation: 1 });
                },
                other => unreachable!("unexpected effects {other:?}"),
            })
            .run();
    }

    #[test]
    fn same_millisecond_adds_get_distinct_ids() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1"), add("hl-1")])
            .when_action(add("hl-1"))
            .then_state(|s| {
                let ids: Vec<&str> = s.session.cart_items().iter().map(|i| i.id.as_str()).collect();
                assert_eq!(
                    ids,
                    vec!["hl-1-1735689600000", "hl-1-1735689600000-2", "hl-1-1735689600000-3"]
                );
            })
            .run();
    }

    #[test]
    fn unknown_food_is_ignored() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open()])
            .when_action(add("nope"))
            .then_state(|s| assert!(s.session.cart_items().is_empty()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_highlight_clear_is_ignored() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1"), add("hl-2")])
            .when_action(MenuAction::ClearHighlight { generation: 1 })
            .then_state(|s| assert_eq!(s.menu.recently_added, Some(FoodId::new("hl-2"))))
            .run();
    }

    #[test]
    fn reopening_keeps_pending_clears_stale() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1"), open(), add("hl-2")])
            .when_action(MenuAction::ClearHighlight { generation: 1 })
            .then_state(|s| assert_eq!(s.menu.recently_added, Some(FoodId::new("hl-2"))))
            .run();
    }

    #[test]
    fn latest_highlight_clear_applies() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1"), add("hl-2")])
            .when_action(MenuAction::ClearHighlight { generation: 2 })
            .then_state(|s| assert_eq!(s.menu.recently_added, None))
            .run();
    }

    #[test]
    fn remove_food_drops_first_matching_item() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1"), add("hl-2"), add("hl-1")])
            .when_action(MenuAction::RemoveFood {
                food_id: FoodId::new("hl-1"),
            })
            .then_state(|s| {
                let ids: Vec<&str> = s.session.cart_items().iter().map(|i| i.id.as_str()).collect();
                assert_eq!(ids, vec!["hl-2-1735689600000", "hl-1-1735689600000-2"]);
            })
            .run();
    }

    #[test]
    fn totals_cover_the_open_store() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-1")])
            .when_action(add("hl-3"))
            .then_state(|s| {
                assert_eq!(s.menu.cart_count(&s.session), 2);
                assert_eq!(s.menu.cart_total(&s.session), 90);
            })
            .run();
    }

    #[test]
    fn complete_order_requires_items() {
        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open()])
            .when_action(MenuAction::CompleteOrder)
            .then_state(|s| assert!(!s.menu.advanced_to_route))
            .run();

        ReducerTest::new(MenuReducer::new())
            .with_env(env())
            .given_state(FoodiesState::default())
            .given_actions([open(), add("hl-2")])
            .when_action(MenuAction::CompleteOrder)
            .then_state(|s| assert!(s.menu.advanced_to_route))
            .run();
    }
}

//! Route screen: primary location, stops, address search and food placement.

use crate::app::{FoodiesEnvironment, FoodiesState};
use crate::providers::AddressError;
use crate::selection::FoodSelection;
use crate::session::{self, OrderAction, OrderSession};
use crate::types::{Address, CartItemId, StopId, Target};
use foodies_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use serde::Serialize;

/// Label shown for the primary location before an address is picked
pub const CURRENT_LOCATION_LABEL: &str = "Current Location";

/// Label shown for a stop before an address is picked
pub const EMPTY_STOP_LABEL: &str = "Add stop";

/// Which address the search modal edits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AddressTarget {
    /// The primary location
    Primary,
    /// A stop
    Stop(StopId),
}

/// Address search modal
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddressSearch {
    /// Text typed so far
    pub query: String,
    /// Candidates for the latest query
    pub suggestions: Vec<Address>,
    /// Message of the last failed lookup, cleared by the next success
    pub last_error: Option<String>,
}

impl AddressSearch {
    /// The "use current location" shortcut is always available
    #[must_use]
    pub const fn offers_current_location(&self) -> bool {
        true
    }
}

/// Modal currently shown over the route
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RouteModal {
    /// Nothing open
    #[default]
    None,
    /// Editing an address
    AddressSearch {
        /// Address being edited
        target: AddressTarget,
        /// Search state
        search: AddressSearch,
    },
    /// Picking the food for a target
    FoodSelection(FoodSelection),
}

/// Route screen state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouteState {
    /// Open modal
    pub modal: RouteModal,
    /// Bumped on every query change; responses for older generations are dropped
    pub search_generation: u64,
    /// Whether the user moved on to delivery
    pub advanced_to_delivery: bool,
}

impl RouteState {
    /// Closes any modal and invalidates in-flight searches.
    fn close_modal(&mut self) {
        if matches!(self.modal, RouteModal::AddressSearch { .. }) {
            self.search_generation += 1;
        }
        self.modal = RouteModal::None;
    }

    fn modal_targets_stop(&self, stop_id: StopId) -> bool {
        match &self.modal {
            RouteModal::AddressSearch { target, .. } => *target == AddressTarget::Stop(stop_id),
            RouteModal::FoodSelection(selection) => selection.target() == Target::Stop(stop_id),
            RouteModal::None => false,
        }
    }
}

/// One line of the route list
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteRow {
    /// What the row stands for
    pub target: Target,
    /// "Stop N" for stops; the primary location has none
    pub title: Option<String>,
    /// Address, or a placeholder
    pub address: String,
    /// Items delivered here
    pub item_count: usize,
}

/// Rows for the primary location followed by every stop
#[must_use]
pub fn route_rows(session: &OrderSession) -> Vec<RouteRow> {
    let primary = RouteRow {
        target: Target::Current,
        title: None,
        address: session
            .primary_location()
            .map_or_else(|| CURRENT_LOCATION_LABEL.to_string(), |a| a.description.clone()),
        item_count: session.items_for(Target::Current).count(),
    };

    std::iter::once(primary)
        .chain(session.stops().iter().enumerate().map(|(index, stop)| RouteRow {
            target: Target::Stop(stop.id()),
            title: Some(format!("Stop {}", index + 1)),
            address: stop
                .address()
                .map_or_else(|| EMPTY_STOP_LABEL.to_string(), |a| a.description.clone()),
            item_count: session.items_for(Target::Stop(stop.id())).count(),
        }))
        .collect()
}

/// Route screen actions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAction {
    /// Open the address search for the primary location or a stop
    EditAddress {
        /// Address to edit
        target: AddressTarget,
    },
    /// The search text changed
    SearchAddresses {
        /// New text
        query: String,
    },
    /// Provider answered
    SuggestionsLoaded {
        /// Generation of the query that was answered
        generation: u64,
        /// Candidates
        results: Vec<Address>,
    },
    /// Provider failed
    SearchFailed {
        /// Generation of the query that failed
        generation: u64,
        /// What went wrong
        error: AddressError,
    },
    /// Pick a suggestion
    SelectAddress {
        /// Chosen address
        address: Address,
    },
    /// Pick the device location
    UseCurrentLocation,
    /// Close the open modal without saving
    Dismiss,
    /// Append a stop
    AddStop,
    /// Remove a stop
    RemoveStop {
        /// Stop to remove
        stop_id: StopId,
    },
    /// Open the food sheet for a target
    ViewFood {
        /// Context
        target: Target,
    },
    /// Tick or untick an item in the open food sheet
    ToggleFood {
        /// Item to flip
        item_id: CartItemId,
    },
    /// Commit the open food sheet
    ConfirmFood,
    /// Send an item at the current location back to the pool
    RemoveItemFromCurrent {
        /// Item to release
        item_id: CartItemId,
    },
    /// Drop empty stops and continue to delivery
    GoToDelivery,
}

/// Reducer for the route screen
#[derive(Clone, Debug, Default)]
pub struct RouteReducer;

impl RouteReducer {
    /// Creates a new `RouteReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn edit_address(state: &mut FoodiesState, target: AddressTarget) {
        if let AddressTarget::Stop(stop_id) = target {
            if state.session.stop(stop_id).is_none() {
                tracing::debug!(stop = %stop_id, "Edit ignored: unknown stop");
                return;
            }
        }
        state.route.close_modal();
        state.route.modal = RouteModal::AddressSearch {
            target,
            search: AddressSearch::default(),
        };
    }

    /// Applies a provider answer unless a newer query superseded it.
    fn search_answered(
        state: &mut FoodiesState,
        generation: u64,
        answer: Result<Vec<Address>, AddressError>,
    ) {
        if generation != state.route.search_generation {
            tracing::debug!(generation, "Discarding stale search answer");
            return;
        }
        let RouteModal::AddressSearch { search, .. } = &mut state.route.modal else {
            return;
        };
        match answer {
            Ok(results) => {
                search.suggestions = results;
                search.last_error = None;
            },
            Err(error) => {
                tracing::warn!(%error, "Address search failed");
                search.suggestions.clear();
                search.last_error = Some(error.to_string());
            },
        }
    }

    fn view_food(state: &mut FoodiesState, target: Target) {
        if !state.session.is_valid_target(target) {
            tracing::debug!(%target, "Food sheet ignored: unknown stop");
            return;
        }
        state.route.close_modal();
        state.route.modal = RouteModal::FoodSelection(FoodSelection::open(&state.session, target));
    }

    fn confirm_food(state: &mut FoodiesState, env: &FoodiesEnvironment) {
        let RouteModal::FoodSelection(selection) = &state.route.modal else {
            return;
        };
        let action = selection.confirm();
        state.route.close_modal();
        session::apply(&mut state.session, action, &env.session);
    }

    fn save_address(state: &mut FoodiesState, address: Address, env: &FoodiesEnvironment) {
        let RouteModal::AddressSearch { target, .. } = &state.route.modal else {
            tracing::debug!("Address ignored: no address search open");
            return;
        };

        let action = match *target {
            AddressTarget::Primary => OrderAction::UpdatePrimaryLocation { address },
            AddressTarget::Stop(stop_id) => OrderAction::UpdateStopAddress { stop_id, address },
        };
        session::apply(&mut state.session, action, &env.session);
        state.route.close_modal();
    }

    fn search(
        state: &mut FoodiesState,
        query: String,
        env: &FoodiesEnvironment,
    ) -> SmallVec<[Effect<RouteAction>; 4]> {
        let RouteModal::AddressSearch { search, .. } = &mut state.route.modal else {
            tracing::debug!("Search ignored: no address search open");
            return SmallVec::new();
        };

        state.route.search_generation += 1;
        let generation = state.route.search_generation;
        search.query.clone_from(&query);

        if query.trim().is_empty() {
            search.suggestions.clear();
            search.last_error = None;
            return SmallVec::new();
        }

        let addresses = env.addresses.clone();
        smallvec![Effect::Future(Box::pin(async move {
            Some(match addresses.search(&query).await {
                Ok(results) => RouteAction::SuggestionsLoaded {
                    generation,
                    results,
                },
                Err(error) => RouteAction::SearchFailed { generation, error },
            })
        }))]
    }
}

impl Reducer for RouteReducer {
    type State = FoodiesState;
    type Action = RouteAction;
    type Environment = FoodiesEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RouteAction::EditAddress { target } => Self::edit_address(state, target),

            RouteAction::SearchAddresses { query } => return Self::search(state, query, env),

            RouteAction::SuggestionsLoaded {
                generation,
                results,
            } => Self::search_answered(state, generation, Ok(results)),

            RouteAction::SearchFailed { generation, error } => {
                Self::search_answered(state, generation, Err(error));
            },

            RouteAction::SelectAddress { address } => Self::save_address(state, address, env),

            RouteAction::UseCurrentLocation => {
                let address = env.addresses.current_location();
                Self::save_address(state, address, env);
            },

            RouteAction::Dismiss => state.route.close_modal(),

            RouteAction::AddStop => {
                session::apply(&mut state.session, OrderAction::AddStop, &env.session);
            },

            RouteAction::RemoveStop { stop_id } => {
                if state.route.modal_targets_stop(stop_id) {
                    state.route.close_modal();
                }
                session::apply(&mut state.session, OrderAction::RemoveStop { stop_id }, &env.session);
            },

            RouteAction::ViewFood { target } => Self::view_food(state, target),

            RouteAction::ToggleFood { item_id } => {
                if let RouteModal::FoodSelection(selection) = &mut state.route.modal {
                    selection.toggle(&state.session, &item_id);
                }
            },

            RouteAction::ConfirmFood => Self::confirm_food(state, env),

            RouteAction::RemoveItemFromCurrent { item_id } => {
                session::apply(
                    &mut state.session,
                    OrderAction::UnassignItem {
                        item_id,
                        from: Target::Current,
                    },
                    &env.session,
                );
            },

            RouteAction::GoToDelivery => {
                state.route.close_modal();
                session::apply(&mut state.session, OrderAction::CleanStops, &env.session);
                state.route.advanced_to_delivery = true;
            },
        }

        SmallVec::new()
    }
}

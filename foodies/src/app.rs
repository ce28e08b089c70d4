//! Root state, action and reducer for the whole ordering flow.
//!
//! The menu and route screens each own a slice of presentation state and share
//! one [`OrderSession`]. [`FoodiesReducer`] routes every [`FoodiesAction`] to
//! the reducer for its feature and lifts the returned effects back into
//! [`FoodiesAction`] so the runtime can feed them in again.

use crate::config::SessionConfig;
use crate::menu::{MenuAction, MenuReducer, MenuState};
use crate::providers::{AddressProvider, FoodCatalog, InMemoryAddressBook, StaticCatalog};
use crate::route::{RouteAction, RouteReducer, RouteState};
use crate::session::{OrderAction, OrderSession, OrderSessionReducer, SessionEnvironment};
use foodies_core::{
    effect::Effect,
    environment::{Clock, IdGenerator, SystemClock, UuidGenerator},
    reducer::Reducer,
    SmallVec,
};
use serde::Serialize;
use std::sync::Arc;

/// Everything the flow keeps in memory
#[derive(Clone, Debug, Serialize)]
pub struct FoodiesState {
    /// Cart and route
    pub session: OrderSession,
    /// Menu screen
    pub menu: MenuState,
    /// Route screen
    pub route: RouteState,
}

impl FoodiesState {
    /// Fresh state for a new ordering session
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            session: OrderSession::from_config(config),
            menu: MenuState::default(),
            route: RouteState::default(),
        }
    }
}

impl Default for FoodiesState {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

/// Root action
#[derive(Clone, Debug, PartialEq)]
pub enum FoodiesAction {
    /// Direct session operation
    Session(OrderAction),
    /// Menu screen intent or effect result
    Menu(MenuAction),
    /// Route screen intent or effect result
    Route(RouteAction),
}

/// Dependencies of the whole flow
#[derive(Clone)]
pub struct FoodiesEnvironment {
    /// Session dependencies
    pub session: SessionEnvironment,
    /// Time source for purchase ids
    pub clock: Arc<dyn Clock>,
    /// Menu data
    pub catalog: Arc<dyn FoodCatalog>,
    /// Address search and device location
    pub addresses: Arc<dyn AddressProvider>,
    /// Tunables
    pub config: SessionConfig,
}

impl FoodiesEnvironment {
    /// Creates a new `FoodiesEnvironment`
    #[must_use]
    pub fn new(
        config: SessionConfig,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        catalog: Arc<dyn FoodCatalog>,
        addresses: Arc<dyn AddressProvider>,
    ) -> Self {
        Self {
            session: SessionEnvironment::new(ids),
            clock,
            catalog,
            addresses,
            config,
        }
    }

    /// System clock, random stop ids and the built-in demo catalog and
    /// address book
    #[must_use]
    pub fn demo(config: SessionConfig) -> Self {
        Self::new(
            config,
            Arc::new(UuidGenerator),
            Arc::new(SystemClock),
            Arc::new(StaticCatalog::demo()),
            Arc::new(InMemoryAddressBook::demo()),
        )
    }
}

/// Root reducer
#[derive(Clone, Debug, Default)]
pub struct FoodiesReducer {
    session: OrderSessionReducer,
    menu: MenuReducer,
    route: RouteReducer,
}

impl FoodiesReducer {
    /// Creates a new `FoodiesReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: OrderSessionReducer::new(),
            menu: MenuReducer::new(),
            route: RouteReducer::new(),
        }
    }
}

impl Reducer for FoodiesReducer {
    type State = FoodiesState;
    type Action = FoodiesAction;
    type Environment = FoodiesEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FoodiesAction::Session(action) => self
                .session
                .reduce(&mut state.session, action, &env.session)
                .into_iter()
                .map(|effect| effect.map(FoodiesAction::Session))
                .collect(),
            FoodiesAction::Menu(action) => self
                .menu
                .reduce(state, action, env)
                .into_iter()
                .map(|effect| effect.map(FoodiesAction::Menu))
                .collect(),
            FoodiesAction::Route(action) => self
                .route
                .reduce(state, action, env)
                .into_iter()
                .map(|effect| effect.map(FoodiesAction::Route))
                .collect(),
        }
    }
}

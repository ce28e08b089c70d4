//! Food ordering flow: cart, multi-stop route and cart-to-stop assignment.
//!
//! A customer browses a store's menu, fills a cart, then lays out a route: a
//! primary location plus up to [`SessionConfig::max_stops`] delivery stops.
//! Every cart item is delivered to the current location, to one stop, or sits
//! in the unassigned pool.
//!
//! - [`session`]: the [`OrderSession`] aggregate and its reducer
//! - [`selection`]: the food sheet's selection model
//! - [`menu`] and [`route`]: the two screens, as reducers over [`FoodiesState`]
//! - [`app`]: the root reducer the runtime store drives
//!
//! # Quick Start
//!
//! ```no_run
//! use foodies::{FoodiesAction, FoodiesEnvironment, FoodiesReducer, FoodiesState, MenuAction};
//! use foodies::{FoodId, SessionConfig, StoreId};
//! use foodies_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SessionConfig::default();
//! let store = Store::new(
//!     FoodiesState::new(&config),
//!     FoodiesReducer::new(),
//!     FoodiesEnvironment::demo(config),
//! );
//!
//! store.send(FoodiesAction::Menu(MenuAction::Open {
//!     store_id: StoreId::new("store-1"),
//!     store_name: "Hungry Lion".to_string(),
//! })).await?;
//! store.send(FoodiesAction::Menu(MenuAction::AddFood {
//!     food_id: FoodId::new("hl-1"),
//! })).await?;
//!
//! let in_cart = store.state(|s| s.session.cart_items().len()).await;
//! assert_eq!(in_cart, 1);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod menu;
pub mod providers;
pub mod route;
pub mod selection;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use app::{FoodiesAction, FoodiesEnvironment, FoodiesReducer, FoodiesState};
pub use config::{ConfigError, SessionConfig};
pub use menu::{MenuAction, MenuReducer, MenuState};
pub use providers::{AddressError, AddressProvider, FoodCatalog, InMemoryAddressBook, StaticCatalog};
pub use route::{AddressTarget, RouteAction, RouteModal, RouteReducer, RouteState};
pub use selection::FoodSelection;
pub use session::{OrderAction, OrderSession, OrderSessionReducer, SessionEnvironment};
pub use types::{
    Address, Assignment, CartItem, CartItemId, Food, FoodId, FoodiesRoute, Stop, StopId, StoreId,
    Target,
};

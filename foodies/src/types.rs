//! Domain types shared by the session, the selection model and the screens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one purchase in the cart
///
/// Distinct from the catalog id: adding the same food twice yields two cart
/// items with two ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartItemId(String);

impl CartItemId {
    /// Creates a `CartItemId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id for a purchase of `food` made at `at`: `<food id>-<unix millis>`
    #[must_use]
    pub fn for_purchase(food: &FoodId, at: DateTime<Utc>) -> Self {
        Self(format!("{food}-{}", at.timestamp_millis()))
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CartItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog identifier of a food
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(String);

impl FoodId {
    /// Creates a `FoodId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a store in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(String);

impl StoreId {
    /// Creates a `StoreId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a delivery stop, stable for the stop's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopId(Uuid);

impl StopId {
    /// Creates a `StopId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stop-{}", self.0)
    }
}

/// A resolved address as returned by an address provider
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Provider-specific place identifier
    pub place_id: String,
    /// Human-readable description
    pub description: String,
}

impl Address {
    /// Creates an address value
    #[must_use]
    pub fn new(place_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            description: description.into(),
        }
    }
}

/// Where food can be sent: the current (pickup) location or one of the stops
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// The primary location the customer orders from
    Current,
    /// A delivery stop on the route
    Stop(StopId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => f.write_str("CURRENT"),
            Self::Stop(id) => write!(f, "{id}"),
        }
    }
}

/// Assignment of a cart item
///
/// ```text
/// Unassigned ──assign──▶ Current ──assign──▶ Stop(id)
///      ▲                    │                   │
///      └──────unassign──────┴──unassign/remove──┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assignment {
    /// In the unassigned pool
    #[default]
    Unassigned,
    /// Delivered to the current location
    Current,
    /// Delivered to a stop
    Stop(StopId),
}

impl Assignment {
    /// The target this assignment points at, if any
    #[must_use]
    pub const fn target(self) -> Option<Target> {
        match self {
            Self::Unassigned => None,
            Self::Current => Some(Target::Current),
            Self::Stop(id) => Some(Target::Stop(id)),
        }
    }

    /// Whether this assignment points at `target`
    #[must_use]
    pub fn is(self, target: Target) -> bool {
        self.target() == Some(target)
    }
}

impl From<Target> for Assignment {
    fn from(target: Target) -> Self {
        match target {
            Target::Current => Self::Current,
            Target::Stop(id) => Self::Stop(id),
        }
    }
}

/// A purchasable item from a store's menu
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    /// Catalog id
    pub id: FoodId,
    /// Store selling it
    pub store_id: StoreId,
    /// Display name of that store
    pub store_name: String,
    /// Food name
    pub name: String,
    /// Image URL
    pub image: String,
    /// Unit price in whole currency units
    pub price: u32,
    /// Menu category ("Burgers", "Sides", ...)
    pub category: String,
}

/// One purchased unit in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Purchase id
    pub id: CartItemId,
    /// Catalog id of the food bought
    pub food_id: FoodId,
    /// Store it was bought from
    pub store_id: StoreId,
    /// Display name of that store
    pub store_name: String,
    /// Food name
    pub name: String,
    /// Image URL
    pub image: String,
    /// Unit price in whole currency units
    pub price: u32,
    /// Number of units, at least 1
    pub quantity: u32,
    assigned_to: Assignment,
}

impl CartItem {
    /// A single unit of `food`, not yet in any cart
    #[must_use]
    pub fn from_food(id: CartItemId, food: &Food) -> Self {
        Self {
            id,
            food_id: food.id.clone(),
            store_id: food.store_id.clone(),
            store_name: food.store_name.clone(),
            name: food.name.clone(),
            image: food.image.clone(),
            price: food.price,
            quantity: 1,
            assigned_to: Assignment::Unassigned,
        }
    }

    /// Sets the quantity
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Current assignment; only the order session changes it
    #[must_use]
    pub const fn assigned_to(&self) -> Assignment {
        self.assigned_to
    }

    /// Price × quantity
    #[must_use]
    pub fn line_total(&self) -> u64 {
        u64::from(self.price) * u64::from(self.quantity)
    }

    pub(crate) const fn set_assignment(&mut self, assignment: Assignment) {
        self.assigned_to = assignment;
    }
}

/// A delivery waypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stop {
    id: StopId,
    address: Option<Address>,
}

impl Stop {
    pub(crate) const fn new(id: StopId) -> Self {
        Self { id, address: None }
    }

    /// Stop id
    #[must_use]
    pub const fn id(&self) -> StopId {
        self.id
    }

    /// Resolved address, if one was chosen
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub(crate) fn set_address(&mut self, address: Address) {
        self.address = Some(address);
    }
}

/// Primary location plus the ordered stops
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodiesRoute {
    primary_location: Option<Address>,
    stops: Vec<Stop>,
}

impl FoodiesRoute {
    /// Where the customer orders from, once resolved
    #[must_use]
    pub const fn primary_location(&self) -> Option<&Address> {
        self.primary_location.as_ref()
    }

    /// Stops in route order
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub(crate) fn set_primary_location(&mut self, address: Address) {
        self.primary_location = Some(address);
    }

    pub(crate) const fn stops_mut(&mut self) -> &mut Vec<Stop> {
        &mut self.stops
    }
}

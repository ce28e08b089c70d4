//! The order session aggregate.

use crate::config::SessionConfig;
use crate::types::{
    Address, Assignment, CartItem, CartItemId, FoodiesRoute, Stop, StopId, StoreId, Target,
};
use serde::Serialize;

/// Cart plus route for one ordering session
///
/// Fields are private: reads go through the accessors below and every
/// mutation goes through [`OrderSessionReducer`](super::OrderSessionReducer),
/// which keeps each item's assignment pointing at `Current`, nothing, or a
/// stop that still exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSession {
    cart: Vec<CartItem>,
    route: FoodiesRoute,
    max_stops: usize,
}

impl OrderSession {
    /// An empty session allowing at most `max_stops` stops
    #[must_use]
    pub fn new(max_stops: usize) -> Self {
        Self {
            cart: Vec::new(),
            route: FoodiesRoute::default(),
            max_stops,
        }
    }

    /// An empty session configured from `config`
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.max_stops)
    }

    // ========== Reads ==========

    /// Cart items in insertion order
    #[must_use]
    pub fn cart_items(&self) -> &[CartItem] {
        &self.cart
    }

    /// Looks up a cart item
    #[must_use]
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.cart.iter().find(|item| &item.id == id)
    }

    /// The route: primary location and stops
    #[must_use]
    pub const fn route(&self) -> &FoodiesRoute {
        &self.route
    }

    /// Stops in route order
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        self.route.stops()
    }

    /// Looks up a stop
    #[must_use]
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops().iter().find(|stop| stop.id() == id)
    }

    /// 1-based position of the stop on the route
    #[must_use]
    pub fn stop_number(&self, id: StopId) -> Option<usize> {
        self.stops()
            .iter()
            .position(|stop| stop.id() == id)
            .map(|index| index + 1)
    }

    /// Primary location, once resolved
    #[must_use]
    pub const fn primary_location(&self) -> Option<&Address> {
        self.route.primary_location()
    }

    /// Configured stop cap
    #[must_use]
    pub const fn max_stops(&self) -> usize {
        self.max_stops
    }

    /// Whether another stop fits under the cap
    #[must_use]
    pub fn can_add_stop(&self) -> bool {
        self.stops().len() < self.max_stops
    }

    /// Items in the unassigned pool
    pub fn unassigned_items(&self) -> impl Iterator<Item = &CartItem> + '_ {
        self.cart
            .iter()
            .filter(|item| item.assigned_to() == Assignment::Unassigned)
    }

    /// Items delivered to `target`
    pub fn items_for(&self, target: Target) -> impl Iterator<Item = &CartItem> + '_ {
        self.cart
            .iter()
            .filter(move |item| item.assigned_to().is(target))
    }

    /// `Current` always; a stop only while it is on the route
    #[must_use]
    pub fn is_valid_target(&self, target: Target) -> bool {
        match target {
            Target::Current => true,
            Target::Stop(id) => self.stop(id).is_some(),
        }
    }

    /// Number of cart items bought from `store_id`
    #[must_use]
    pub fn cart_count_for_store(&self, store_id: &StoreId) -> usize {
        self.cart
            .iter()
            .filter(|item| &item.store_id == store_id)
            .count()
    }

    /// Sum of price × quantity over items bought from `store_id`
    #[must_use]
    pub fn cart_total_for_store(&self, store_id: &StoreId) -> u64 {
        self.cart
            .iter()
            .filter(|item| &item.store_id == store_id)
            .map(CartItem::line_total)
            .sum()
    }

    /// Every assignment targets `Current`, nothing, or a stop on the route
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.cart.iter().all(|item| match item.assigned_to() {
            Assignment::Unassigned | Assignment::Current => true,
            Assignment::Stop(id) => self.stop(id).is_some(),
        })
    }

    // ========== Mutations (reducer only) ==========

    /// New items start at the current location.
    pub(super) fn insert_item(&mut self, mut item: CartItem) -> bool {
        if item.quantity == 0 || self.item(&item.id).is_some() {
            return false;
        }
        item.set_assignment(Assignment::Current);
        self.cart.push(item);
        true
    }

    pub(super) fn remove_item(&mut self, id: &CartItemId) -> bool {
        let before = self.cart.len();
        self.cart.retain(|item| &item.id != id);
        self.cart.len() != before
    }

    pub(super) fn set_primary_location(&mut self, address: Address) {
        self.route.set_primary_location(address);
    }

    pub(super) fn push_stop(&mut self, id: StopId) -> bool {
        if !self.can_add_stop() || self.stop(id).is_some() {
            return false;
        }
        self.route.stops_mut().push(Stop::new(id));
        true
    }

    /// Removes the stop and returns how many items fell back to the pool.
    pub(super) fn remove_stop(&mut self, id: StopId) -> Option<usize> {
        let stops = self.route.stops_mut();
        let index = stops.iter().position(|stop| stop.id() == id)?;
        stops.remove(index);
        Some(self.release_items_of(id))
    }

    pub(super) fn set_stop_address(&mut self, id: StopId, address: Address) -> bool {
        match self.route.stops_mut().iter_mut().find(|stop| stop.id() == id) {
            Some(stop) => {
                stop.set_address(address);
                true
            },
            None => false,
        }
    }

    /// Drops stops with neither an address nor items; returns the removed ids.
    pub(super) fn clean_stops(&mut self) -> Vec<StopId> {
        let (keep, removed): (Vec<Stop>, Vec<Stop>) = std::mem::take(self.route.stops_mut())
            .into_iter()
            .partition(|stop| {
                stop.address().is_some() || self.items_for(Target::Stop(stop.id())).next().is_some()
            });
        *self.route.stops_mut() = keep;
        removed.iter().map(Stop::id).collect()
    }

    pub(super) fn assign(&mut self, id: &CartItemId, target: Target) -> bool {
        if !self.is_valid_target(target) {
            return false;
        }
        match self.cart.iter_mut().find(|item| &item.id == id) {
            Some(item) => {
                item.set_assignment(target.into());
                true
            },
            None => false,
        }
    }

    /// Clears the assignment only when it currently equals `from`.
    pub(super) fn unassign(&mut self, id: &CartItemId, from: Target) -> bool {
        match self
            .cart
            .iter_mut()
            .find(|item| &item.id == id && item.assigned_to().is(from))
        {
            Some(item) => {
                item.set_assignment(Assignment::Unassigned);
                true
            },
            None => false,
        }
    }

    fn release_items_of(&mut self, id: StopId) -> usize {
        let mut released = 0;
        for item in &mut self.cart {
            if item.assigned_to() == Assignment::Stop(id) {
                item.set_assignment(Assignment::Unassigned);
                released += 1;
            }
        }
        released
    }
}

impl Default for OrderSession {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

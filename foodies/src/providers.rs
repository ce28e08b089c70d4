//! External collaborators: the food catalog and the address provider.
//!
//! The flow only depends on the traits. The in-memory implementations back
//! the demo binary and the tests.

use crate::types::{Address, Food, FoodId, StoreId};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Errors an address provider can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The lookup backend could not answer
    #[error("address lookup unavailable: {0}")]
    Unavailable(String),
}

/// Future returned by [`AddressProvider::search`]
pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Address>, AddressError>> + Send + 'a>>;

/// Source of the foods a store sells
pub trait FoodCatalog: Send + Sync {
    /// Foods on the store's menu; empty for unknown stores
    fn foods_by_store(&self, store_id: &StoreId) -> Vec<Food>;
}

/// Address search and device location
///
/// `search` returns a boxed future rather than being an `async fn` so the
/// provider can live behind `Arc<dyn AddressProvider>` in an environment.
pub trait AddressProvider: Send + Sync {
    /// Candidate addresses for a free-text query
    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a>;

    /// Address of the device's current location
    fn current_location(&self) -> Address;
}

/// Catalog over a fixed list of foods
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    foods: Vec<Food>,
}

impl StaticCatalog {
    /// Catalog serving exactly these foods
    #[must_use]
    pub const fn new(foods: Vec<Food>) -> Self {
        Self { foods }
    }

    /// A small menu for the default store
    #[must_use]
    pub fn demo() -> Self {
        let food = |id: &str, name: &str, price: u32, category: &str| Food {
            id: FoodId::new(id),
            store_id: StoreId::new("store-1"),
            store_name: "Hungry Lion".to_string(),
            name: name.to_string(),
            image: format!("https://images.example.com/foods/{id}.jpg"),
            price,
            category: category.to_string(),
        };

        Self::new(vec![
            food("hl-1", "Lion Burger", 65, "Burgers"),
            food("hl-2", "Chicken Wings (6pc)", 55, "Chicken"),
            food("hl-3", "Large Chips", 25, "Sides"),
            food("hl-4", "Chicken Wrap", 48, "Wraps"),
            food("hl-5", "Soft Serve", 15, "Desserts"),
        ])
    }
}

impl FoodCatalog for StaticCatalog {
    fn foods_by_store(&self, store_id: &StoreId) -> Vec<Food> {
        self.foods
            .iter()
            .filter(|food| &food.store_id == store_id)
            .cloned()
            .collect()
    }
}

/// Address provider matching queries against a fixed address list
#[derive(Debug, Clone)]
pub struct InMemoryAddressBook {
    addresses: Vec<Address>,
    current: Address,
    latency: Duration,
}

impl InMemoryAddressBook {
    /// Address book with the given entries and device location
    #[must_use]
    pub const fn new(addresses: Vec<Address>, current: Address) -> Self {
        Self {
            addresses,
            current,
            latency: Duration::ZERO,
        }
    }

    /// Delay every search by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// A handful of Lusaka addresses
    #[must_use]
    pub fn demo() -> Self {
        Self::new(
            vec![
                Address::new("place-cairo-rd", "Cairo Road, Lusaka"),
                Address::new("place-manda-hill", "Manda Hill Mall, Great East Road, Lusaka"),
                Address::new("place-arcades", "Arcades Shopping Mall, Great East Road, Lusaka"),
                Address::new("place-levy", "Levy Junction, Church Road, Lusaka"),
                Address::new("place-east-park", "East Park Mall, Great East Road, Lusaka"),
            ],
            Address::new("place-current", "Kabulonga Road, Lusaka"),
        )
    }
}

impl AddressProvider for InMemoryAddressBook {
    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let needle = query.trim().to_lowercase();
            if needle.is_empty() {
                return Ok(Vec::new());
            }

            Ok(self
                .addresses
                .iter()
                .filter(|address| address.description.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        })
    }

    fn current_location(&self) -> Address {
        self.current.clone()
    }
}

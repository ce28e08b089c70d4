//! Scripted walk through the ordering flow against the demo catalog and
//! address book.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); the final session is
//! printed to stdout as JSON.

use anyhow::Context;
use foodies::route::{route_rows, RouteRow};
use foodies::{
    AddressTarget, FoodId, FoodiesAction, FoodiesEnvironment, FoodiesReducer, FoodiesState,
    MenuAction, RouteAction, SessionConfig, StoreId, Target,
};
use foodies_runtime::Store;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = SessionConfig::from_env().context("reading session configuration")?;
    tracing::info!(max_stops = config.max_stops, "Starting order session");

    let store = Store::new(
        FoodiesState::new(&config),
        FoodiesReducer::new(),
        FoodiesEnvironment::demo(config),
    );

    // Menu
    store
        .send(FoodiesAction::Menu(MenuAction::Open {
            store_id: StoreId::new("store-1"),
            store_name: "Hungry Lion".to_string(),
        }))
        .await?;
    for food in ["hl-1", "hl-2", "hl-3"] {
        store
            .send(FoodiesAction::Menu(MenuAction::AddFood {
                food_id: FoodId::new(food),
            }))
            .await?;
    }
    store.send(FoodiesAction::Menu(MenuAction::CompleteOrder)).await?;

    let (count, total) = store
        .state(|s| (s.menu.cart_count(&s.session), s.menu.cart_total(&s.session)))
        .await;
    tracing::info!(count, total, "Cart filled");

    // Route: primary location from the device, one stop found by search
    store
        .send(FoodiesAction::Route(RouteAction::EditAddress {
            target: AddressTarget::Primary,
        }))
        .await?;
    store.send(FoodiesAction::Route(RouteAction::UseCurrentLocation)).await?;

    store.send(FoodiesAction::Route(RouteAction::AddStop)).await?;
    store.send(FoodiesAction::Route(RouteAction::AddStop)).await?;
    let stop_id = store
        .state(|s| s.session.stops().first().map(foodies::Stop::id))
        .await
        .context("stop was not added")?;

    store
        .send(FoodiesAction::Route(RouteAction::EditAddress {
            target: AddressTarget::Stop(stop_id),
        }))
        .await?;
    let loaded = store
        .send_and_wait_for(
            FoodiesAction::Route(RouteAction::SearchAddresses {
                query: "great east".to_string(),
            }),
            |action| {
                matches!(
                    action,
                    FoodiesAction::Route(
                        RouteAction::SuggestionsLoaded { .. } | RouteAction::SearchFailed { .. }
                    )
                )
            },
            SEARCH_TIMEOUT,
        )
        .await?;
    let results = match loaded {
        FoodiesAction::Route(RouteAction::SuggestionsLoaded { results, .. }) => results,
        other => anyhow::bail!("address search failed: {other:?}"),
    };
    let address = results.into_iter().next().context("no address matched")?;
    store
        .send(FoodiesAction::Route(RouteAction::SelectAddress { address }))
        .await?;

    // Send the first item to the stop
    let first_item = store
        .state(|s| s.session.cart_items().first().map(|item| item.id.clone()))
        .await
        .context("cart is empty")?;
    store
        .send(FoodiesAction::Route(RouteAction::ViewFood {
            target: Target::Stop(stop_id),
        }))
        .await?;
    store
        .send(FoodiesAction::Route(RouteAction::ToggleFood { item_id: first_item }))
        .await?;
    store.send(FoodiesAction::Route(RouteAction::ConfirmFood)).await?;

    // The second, empty stop is dropped here
    store.send(FoodiesAction::Route(RouteAction::GoToDelivery)).await?;

    let (rows, session) = store
        .state(|s| (route_rows(&s.session), s.session.clone()))
        .await;
    for RouteRow {
        title,
        address,
        item_count,
        ..
    } in &rows
    {
        tracing::info!(
            stop = title.as_deref().unwrap_or("Current"),
            %address,
            item_count,
            "Route"
        );
    }

    println!("{}", serde_json::to_string_pretty(&session)?);

    store
        .shutdown(Duration::from_secs(1))
        .await
        .context("waiting for pending effects")?;
    Ok(())
}

//! Order session: the single source of truth for cart and route.
//!
//! [`OrderSession`] is only ever mutated by [`OrderSessionReducer`]; the
//! screens read it and send [`OrderAction`]s.

mod reducer;
mod state;

pub use reducer::{OrderAction, OrderSessionReducer, SessionEnvironment};
pub use state::OrderSession;

use foodies_core::{effect::Effect, reducer::Reducer};

/// Runs one action through the session reducer inline.
///
/// The session reducer never returns effects, so screens that own a session
/// can drive it without routing through the store.
pub(crate) fn apply(session: &mut OrderSession, action: OrderAction, env: &SessionEnvironment) {
    let effects = OrderSessionReducer::new().reduce(session, action, env);
    debug_assert!(effects.iter().all(Effect::is_none));
}

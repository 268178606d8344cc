/// Router Module Index
///
/// Routes are split by access level; authentication is applied as a layer on the
/// `authenticated` router, never per handler.

/// Routes open to any client.
pub mod public;

/// Routes behind the `AuthUser` middleware. Staff-only operations additionally check the
/// role inside the handler.
pub mod authenticated;

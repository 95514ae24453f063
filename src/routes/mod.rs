/// Router Module Index
///
/// Routes are split by who may reach them. Access control is attached to each
/// router as a layer in `create_router`, so a route cannot be exposed by accident.

/// Routes open to everyone, logged in or not.
pub mod public;

/// Routes that require a valid session.
pub mod authenticated;

/// The `/admin` area. Requires a session; the admin flag is checked in each handler.
pub mod admin;

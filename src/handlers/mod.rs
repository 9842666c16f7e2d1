// handlers/mod.rs - HTTP adapters
//
// Handlers extract path, query, body and the authenticated identity, call
// the matching service operation and wrap the result in the success
// envelope. Failures bubble up as `ApiError`, which renders itself.

pub mod bootcamps;
pub mod reviews;
pub mod system;
pub mod users;

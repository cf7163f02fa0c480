/*!
 * Validation of structured completion payloads.
 *
 * Every external call site runs its raw output through `schema::validate`
 * independently, so a malformed payload at one call site never affects
 * another.
 *
 * # Architecture
 *
 * - `schema`: JSON-object parsing, `error` field detection, required-field
 *   checks and typed decoding
 */

pub mod schema;

// Re-export main types
pub use schema::{ResponseSchema, validate};

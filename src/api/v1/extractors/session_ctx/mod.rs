/*!
 * Session context extractor
 *
 * Responsibility:
 * - Hand the session verified by the gate middleware to handlers
 * - Handlers depend on this type only, never on how the credential arrived
 *
 * Public API:
 * - CurrentSession
 */

mod core;

pub use core::CurrentSession;

/*
 * Responsibility
 * - Public surface of the middleware stack
 * - auth: session pipeline for protected route families
 * - cors / http: cross-cutting layers applied once in app.rs
 */
pub mod auth;
pub mod cors;
pub mod http;

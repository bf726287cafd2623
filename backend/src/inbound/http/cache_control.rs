//! Shared cache-control policies for HTTP handlers.

/// Page state changes with every action, so responses are never reused.
pub const NO_STORE: &str = "no-store";

/// Build the cache-control header tuple for page state responses.
pub const fn no_store_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_STORE)
}

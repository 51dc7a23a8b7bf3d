//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route under the proxied prefix)
//!     → cors.rs (answer preflight requests)
//!     → request.rs (request ID, upstream URL, outbound request)
//!     → [payload normalization]
//!     → client.rs (send upstream)
//!     → response.rs (relay, add CORS headers)
//!     → Send to client
//! ```

pub mod client;
pub mod cors;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::HttpServer;

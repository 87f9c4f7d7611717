// proxy module - signing reverse proxy in front of the VMS

pub mod config;
pub mod credentials;
pub mod endpoints;
pub mod server;
pub mod session;
pub mod signer;
pub mod tls;

pub mod common; // Common tools
pub mod handlers; // API endpoint handlers
pub mod mappers; // Envelope mappers
pub mod middleware; // Axum middleware
pub mod upstream; // Upstream transport and dispatcher

pub use config::ProxyConfig;
pub use server::AxumServer;
pub use session::SessionManager;

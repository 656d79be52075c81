pub mod cookies;
pub mod factory;
pub mod password;
pub mod renewal;
pub mod session;
pub mod token;

pub use factory::build_session_service;
pub use session::SessionService;

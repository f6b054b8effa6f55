pub mod csrf;
pub mod gates;
pub mod middleware;
pub mod session;

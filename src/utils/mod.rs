pub mod hash;
pub mod jwt;
pub mod net;
pub mod notify;
pub mod upload;

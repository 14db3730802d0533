pub mod booking;
pub mod complaint;
pub mod credential;
pub mod message;
pub mod payment;
pub mod sell_request;
pub mod session;
pub mod timestamp;
pub mod user;

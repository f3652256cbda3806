pub mod fcm;
pub mod health;
pub mod request;
pub mod response;

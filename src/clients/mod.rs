pub mod fcm;
pub mod health;

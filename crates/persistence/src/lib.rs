//! Room and message storage

pub mod store;

pub use store::InMemoryChatStore;

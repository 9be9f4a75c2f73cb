mod proxy;
mod server;

pub use server::{start_server, AppState};

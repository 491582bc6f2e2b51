pub mod hub;
pub mod ws_session;

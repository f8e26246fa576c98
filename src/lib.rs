#[macro_use]
extern crate nonblock_logger;
#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod handlers;
pub mod mailer;
pub mod middlewares;
pub mod models;
pub mod persisters;
pub mod state;
pub mod validate;

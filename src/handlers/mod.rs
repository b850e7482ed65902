pub mod graphql_handler;
pub mod health_handler;

use actix_web::web;

pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(graphql)
        .service(graphiql)
        .service(health_check)
        .service(health_check_live);
}

pub mod returns;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(returns::ticker_returns);
}

use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use sqlx::SqlitePool;

use crate::configuration::Settings;
use crate::routes;

pub fn run(
    listener: TcpListener,
    pool: SqlitePool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let pool = web::Data::new(pool);
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(routes::auth_config)
            .configure(routes::users_config)
            .configure(routes::stylists_config)
            .configure(routes::services_config)
            .configure(routes::bookings_config)
            .configure(routes::reviews_config)
            .configure(routes::admin_config)
            .app_data(pool.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

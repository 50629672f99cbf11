use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};

use nexium_server::{
    app_state::AppState, auth::AuthMiddleware, config::Config, graphql::create_schema, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();

    if config.is_production() {
        if let Err(e) = config.validate_for_production() {
            log::error!("Invalid production configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let schema = create_schema(state.clone());
    let jwt_service = web::Data::from(state.jwt_service.clone());
    let state = web::Data::new(state);
    let schema = web::Data::new(schema);

    log::info!("Starting HTTP server on {}:{}", host, port);
    log::info!("GraphiQL playground: http://{}:{}/graphiql", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(schema.clone())
            .app_data(jwt_service.clone())
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .wrap(AuthMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Logger::new(
                r#"%a "%r" %s %b %T request_id=%{x-request-id}o"#,
            ))
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

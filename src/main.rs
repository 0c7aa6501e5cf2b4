mod config;
mod error;
mod route;
mod service;
mod util;

use crate::config::Config;
use crate::service::mailer::SmtpMailer;
use crate::service::subscriber::SubscriberStore;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use std::process::exit;
use std::time::Duration;
use std::{env, fs, io};
use tokio::time;
use tokio_postgres::NoTls;
use tracing::{error, info, warn};

/// Structure shared across the server.
pub struct GlobalData {
	/// Gateway to the subscriber store.
	pub store: SubscriberStore,
	/// The email transport.
	pub mailer: SmtpMailer,
	/// The password granting access to the admin routes.
	pub admin_password: Option<String>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
	// Enable logging
	env::set_var("RUST_LOG", "info");
	env_logger::init();

	info!("read configuration");
	let config = fs::read_to_string("config.toml").unwrap_or_else(|error| {
		error!(%error, "cannot read configuration file");
		exit(1);
	});
	let config: Config = toml::from_str(&config).unwrap_or_else(|error| {
		error!(%error, "invalid configuration file");
		exit(1);
	});

	// Open database connection
	let (store, pg) = match config.store {
		Some(store_config) => {
			info!("connect to database");
			let (client, connection) = tokio_postgres::connect(&store_config.db, NoTls)
				.await
				.unwrap_or_else(|error| {
					error!(%error, "postgres: connection");
					exit(1);
				});
			(
				SubscriberStore::connected(client),
				Some((connection, store_config.db)),
			)
		}
		None => {
			warn!("subscriber store is not configured");
			(SubscriberStore::Unconfigured, None)
		}
	};

	let mailer = SmtpMailer::from_config(config.email.as_ref()).unwrap_or_else(|error| {
		error!(%error, "smtp: invalid configuration");
		exit(1);
	});
	if matches!(mailer, SmtpMailer::Unconfigured) {
		warn!("email transport is not configured");
	}

	let data = web::Data::new(GlobalData {
		store,
		mailer,
		admin_password: config.admin_password,
	});

	// Handle connection errors
	if let Some((connection, db_url)) = pg {
		let data_clone = data.clone();
		tokio::spawn(async move {
			let data = data_clone;
			let mut connection = connection;
			loop {
				// Wait for the connection to close
				if let Err(error) = connection.await {
					error!(%error, "postgres: connection");
				}

				// Try to reconnect
				let mut interval = time::interval(Duration::from_secs(10));
				loop {
					interval.tick().await;

					info!("postgres: attempting to reconnect");
					match tokio_postgres::connect(&db_url, NoTls).await {
						Ok((client, c)) => {
							info!("postgres: reconnected successfully");
							data.store.replace_client(client).await;
							connection = c;
							break;
						}
						Err(error) => {
							error!(%error, "postgres: connection");
							continue;
						}
					}
				}
			}
		});
	}

	info!("start http server");

	HttpServer::new(move || {
		App::new()
			.service(Files::new("/assets", "./assets"))
			.service(route::root)
			.service(route::health)
			.service(route::robots)
			.service(route::newsletter::subscribe)
			.service(route::newsletter::unsubscribe)
			.service(route::admin::login)
			.service(route::admin::logout)
			.service(route::admin::session_check)
			.service(route::admin::subscribers)
			.service(route::admin::analytics)
			.service(route::admin::email_status)
			.service(route::admin::database_status)
			.service(route::admin::send_newsletter)
			.app_data(data.clone())
			.app_data(web::PayloadConfig::new(1024 * 1024))
			.wrap(Logger::new("[%t] %a: %r - Response: %s (in %D ms)"))
	})
	.bind(format!("0.0.0.0:{}", config.port))?
	.run()
	.await
}

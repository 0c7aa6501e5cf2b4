use serde::Deserialize;

/// Subscriber store configuration.
#[derive(Deserialize)]
pub struct StoreConfig {
	/// The connection string for the database.
	pub db: String,
}

/// SMTP transport configuration.
#[derive(Deserialize)]
pub struct EmailConfig {
	/// The address of the relay server.
	pub host: String,
	/// The login of the account on the server.
	pub login: String,
	/// The password of the account on the server.
	pub password: String,
	/// The sender identity, e.g. `DedCore <newsletter@dedcore.dev>`.
	pub from: String,
}

/// Server configuration.
///
/// The store, email and admin sections are optional. A missing section yields
/// an unconfigured gateway which reports itself as such on use, instead of
/// aborting the whole server at startup.
#[derive(Deserialize)]
pub struct Config {
	/// The HTTP server's port.
	pub port: u16,
	/// The password granting access to the admin routes.
	pub admin_password: Option<String>,

	/// Subscriber store configuration.
	pub store: Option<StoreConfig>,
	/// SMTP transport configuration.
	pub email: Option<EmailConfig>,
}

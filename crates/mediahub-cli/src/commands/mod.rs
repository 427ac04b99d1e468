//! CLI command definitions and dispatch.

pub mod account;
pub mod channel;
pub mod migrate;
pub mod session;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use mediahub_auth::SessionManager;
use mediahub_core::config::AppConfig;
use mediahub_core::error::AppError;
use mediahub_database::{RelationStore, Stores};
use mediahub_service::{AccountService, AggregatorService};

use crate::output::OutputFormat;

/// MediaHub: accounts, sessions and channel pages
#[derive(Debug, Parser)]
#[command(name = "mediahub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate,
    /// Create an account
    Register(account::RegisterArgs),
    /// Exchange credentials for a token pair
    Login(session::LoginArgs),
    /// Rotate a refresh token
    Refresh(session::RefreshArgs),
    /// End the session of the token's owner
    Logout(session::TokenArgs),
    /// Change the password of the token's owner
    ChangePassword(session::ChangePasswordArgs),
    /// Show a channel page
    Channel(channel::ChannelArgs),
    /// Subscribe the token's owner to a channel
    Subscribe(channel::SubscriptionArgs),
    /// Remove the token owner's subscription to a channel
    Unsubscribe(channel::SubscriptionArgs),
    /// Show the watch history of the token's owner
    History(session::TokenArgs),
}

impl Cli {
    /// Execute the CLI command against an already loaded configuration
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let format = self.format;
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Register(args) => {
                account::register(args, &Services::from_config(config).await?, format).await
            }
            Commands::Login(args) => {
                session::login(args, &Services::from_config(config).await?, format).await
            }
            Commands::Refresh(args) => {
                session::refresh(args, &Services::from_config(config).await?, format).await
            }
            Commands::Logout(args) => {
                session::logout(args, &Services::from_config(config).await?).await
            }
            Commands::ChangePassword(args) => {
                session::change_password(args, &Services::from_config(config).await?).await
            }
            Commands::Channel(args) => {
                channel::profile(args, &Services::from_config(config).await?, format).await
            }
            Commands::Subscribe(args) => {
                channel::subscribe(args, &Services::from_config(config).await?).await
            }
            Commands::Unsubscribe(args) => {
                channel::unsubscribe(args, &Services::from_config(config).await?).await
            }
            Commands::History(args) => {
                channel::history(args, &Services::from_config(config).await?, format).await
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// The services every command runs against.
#[derive(Debug, Clone)]
pub struct Services {
    /// Login, refresh, logout and password changes.
    pub sessions: Arc<SessionManager>,
    /// Registration and profile updates.
    pub accounts: Arc<AccountService>,
    /// Channel pages and watch history.
    pub aggregator: Arc<AggregatorService>,
    /// Subscription edges.
    pub relations: Arc<dyn RelationStore>,
}

impl Services {
    /// Wires the configured store and asset host into the services.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let stores = Stores::from_config(config).await?;
        let assets = mediahub_storage::asset_host_from_config(&config.assets).await?;
        Self::new(&stores, assets, config)
    }

    /// Builds the services over existing stores.
    pub fn new(
        stores: &Stores,
        assets: Arc<dyn mediahub_core::traits::AssetHost>,
        config: &AppConfig,
    ) -> Result<Self, AppError> {
        let timeout = config.store.operation_timeout();
        let sessions = SessionManager::from_config(Arc::clone(&stores.accounts), config)?;
        let accounts = AccountService::new(
            Arc::clone(&stores.accounts),
            assets,
            sessions.hasher(),
            &config.auth,
            timeout,
        );
        let aggregator = AggregatorService::new(stores, timeout);

        Ok(Self {
            sessions: Arc::new(sessions),
            accounts: Arc::new(accounts),
            aggregator: Arc::new(aggregator),
            relations: Arc::clone(&stores.relations),
        })
    }
}

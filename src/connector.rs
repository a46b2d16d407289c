use crate::backend::Backend;
use crate::bind::BindOptions;
use crate::config::ConnectionConfig;
use sqlx::pool::PoolOptions;
use sqlx::{Connection, Pool};

/// Opens connections and pools for one backend from a [`ConnectionConfig`].
///
/// There is no process-wide connector: each caller owns its `Connector` and
/// passes connections or pools to the statements it runs. Passing `&Pool` to a
/// statement acquires a connection for that statement only and returns it to
/// the pool afterwards, on success and on error alike; passing a connection or
/// a transaction leaves it open for the caller.
///
/// ```rust,no_run
/// use sqlx::MySql;
/// use sqlx_named_params::{ConnectionConfig, Connector, Params, PreparedQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConnectionConfig::from_file("db.properties")?;
/// let connector = Connector::<MySql>::new(config)?;
/// let pool = connector.pool(5).await?;
///
/// let deleted = PreparedQuery::new(
///     "DELETE FROM sessions WHERE user_id = :user_id",
///     Params::new().with("user_id", 42),
/// )?
/// .execute(&pool)
/// .await?;
/// println!("Deleted {deleted} sessions");
/// # Ok(())
/// # }
/// ```
pub struct Connector<DB: Backend> {
    config: ConnectionConfig,
    options: <DB::Connection as Connection>::Options,
}

impl<DB: Backend> Connector<DB> {
    /// Checks that the configured driver names this backend and parses the URL.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`](crate::Error::Configuration) when the driver
    /// does not match or the URL is not understood by the backend.
    pub fn new(config: ConnectionConfig) -> crate::Result<Self> {
        let driver = config.driver().to_ascii_lowercase();
        if !driver.contains(&DB::NAME.to_ascii_lowercase()) {
            return Err(crate::Error::Configuration(format!(
                "driver '{}' is not a {} driver",
                config.driver(),
                DB::NAME
            )));
        }
        let options = DB::connect_options(&config)?;
        Ok(Self { config, options })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Bind options matching the configured timezone.
    pub fn bind_options(&self) -> BindOptions {
        self.config.bind_options()
    }

    /// Opens a new connection. The caller closes it (or drops it).
    pub async fn connect(&self) -> crate::Result<DB::Connection> {
        log::debug!("Opening {} connection", DB::NAME);
        Ok(<DB::Connection as Connection>::connect_with(&self.options).await?)
    }

    /// Opens a pool of at most `max_connections` connections.
    pub async fn pool(&self, max_connections: u32) -> crate::Result<Pool<DB>> {
        log::debug!(
            "Opening {} pool with up to {} connections",
            DB::NAME,
            max_connections
        );
        let pool = PoolOptions::<DB>::new()
            .max_connections(max_connections)
            .connect_with(self.options.clone())
            .await?;
        Ok(pool)
    }
}

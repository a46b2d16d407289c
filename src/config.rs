use crate::bind::BindOptions;
use chrono::{FixedOffset, Offset, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;

/// Connection settings: `url` and `driver` are mandatory, `user`, `password`
/// and `timezone` are optional, anything else is kept as an extra property.
///
/// ```
/// use sqlx_named_params::ConnectionConfig;
///
/// let config = ConnectionConfig::from_connection_string(
///     "url = mysql://127.0.0.1:3306/app; driver = mysql; user = app; password = secret",
/// )?;
/// assert_eq!(config.url(), "mysql://127.0.0.1:3306/app");
/// assert_eq!(config.user(), Some("app"));
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    url: String,
    driver: String,
    user: Option<String>,
    password: Option<String>,
    timezone: Option<FixedOffset>,
    properties: IndexMap<String, String>,
}

impl ConnectionConfig {
    /// Reads `key = value` entries. Entries without `=` are ignored.
    pub fn from_pairs<I, S>(pairs: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let properties: Vec<(String, String)> = pairs
            .into_iter()
            .filter_map(|pair| {
                pair.as_ref()
                    .split_once('=')
                    .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
            })
            .collect();
        Self::from_properties(properties)
    }

    /// Reads `key = value` entries separated by `;`.
    pub fn from_connection_string(connection_string: &str) -> crate::Result<Self> {
        Self::from_pairs(connection_string.split(';'))
    }

    /// Builds the configuration from an already parsed property mapping.
    pub fn from_properties<I, K, V>(properties: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties: IndexMap<String, String> = properties
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_owned(), v.into().trim().to_owned()))
            .collect();

        let url = take_required(&mut properties, "url")?;
        let url = url.strip_prefix("jdbc:").unwrap_or(&url).to_owned();
        let driver = take_required(&mut properties, "driver")?;
        let user = take_optional(&mut properties, "user");
        let password = take_optional(&mut properties, "password");
        let timezone = take_optional(&mut properties, "timezone")
            .map(|tz| parse_offset(&tz))
            .transpose()?;

        Ok(Self {
            url,
            driver,
            user,
            password,
            timezone,
            properties,
        })
    }

    /// Reads a property file of `key=value` lines (`#` comments allowed).
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let unreadable = |e: dotenvy::Error| {
            crate::Error::Configuration(format!("can't read '{}': {}", path.display(), e))
        };
        let properties = dotenvy::from_path_iter(path)
            .map_err(unreadable)?
            .collect::<Result<Vec<(String, String)>, _>>()
            .map_err(unreadable)?;
        log::debug!("Loaded {} connection properties from {}", properties.len(), path.display());
        Self::from_properties(properties)
    }

    /// Reads `DB_URL`, `DB_DRIVER`, `DB_USER`, `DB_PASSWORD` and `DB_TIMEZONE`.
    pub fn from_env() -> crate::Result<Self> {
        let properties = [
            ("url", "DB_URL"),
            ("driver", "DB_DRIVER"),
            ("user", "DB_USER"),
            ("password", "DB_PASSWORD"),
            ("timezone", "DB_TIMEZONE"),
        ]
        .into_iter()
        .filter_map(|(key, var)| std::env::var(var).ok().map(|v| (key, v)));
        Self::from_properties(properties)
    }

    /// Connection URL, without any `jdbc:` prefix.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn timezone(&self) -> Option<FixedOffset> {
        self.timezone
    }

    /// Any property other than the well-known ones.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Bind options derived from `timezone` (UTC when unset).
    pub fn bind_options(&self) -> BindOptions {
        self.timezone
            .map(BindOptions::with_offset)
            .unwrap_or_default()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("driver", &self.driver)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timezone", &self.timezone)
            .field("properties", &self.properties)
            .finish()
    }
}

fn take_required(properties: &mut IndexMap<String, String>, key: &str) -> crate::Result<String> {
    match properties.shift_remove(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(crate::Error::Configuration(format!(
            "missing {key} property"
        ))),
    }
}

fn take_optional(properties: &mut IndexMap<String, String>, key: &str) -> Option<String> {
    properties.shift_remove(key).filter(|v| !v.is_empty())
}

fn parse_offset(value: &str) -> crate::Result<FixedOffset> {
    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return Ok(Utc.fix());
    }
    value
        .parse::<FixedOffset>()
        .map_err(|e| crate::Error::Configuration(format!("invalid timezone '{value}': {e}")))
}

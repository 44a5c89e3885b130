use std::time::Duration;

/// Default port of the administrative interface on every node.
pub const DEFAULT_ADMIN_PORT: u16 = 27017;

/// Administrative interface connection configuration
///
/// Every node is reached at `{scheme}://{addr}:{port}`; the address comes
/// from name resolution, the rest is shared by all nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    /// URL scheme of the admin endpoint
    pub scheme: String,

    /// Admin port (implicit port convention for resolved addresses)
    pub port: u16,

    /// Per-request timeout, covering connect and response
    pub request_timeout: Duration,

    /// Path prefix under which admin commands are exposed
    pub path_prefix: String,
}

impl AdminConfig {
    /// Create a new admin configuration for the given port
    pub fn new(port: u16) -> Self {
        Self {
            scheme: "http".to_string(),
            port,
            request_timeout: Duration::from_secs(10),
            path_prefix: "/admin".to_string(),
        }
    }

    /// Set the URL scheme
    pub fn scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the command path prefix
    pub fn path_prefix(mut self, prefix: &str) -> Self {
        self.path_prefix = prefix.to_string();
        self
    }

    /// Parse from an endpoint template
    ///
    /// Format: "scheme://host:port/prefix". The host part is ignored since
    /// addresses come from name resolution.
    ///
    /// # Examples
    ///
    /// ```
    /// use replset_controller::AdminConfig;
    ///
    /// let config = AdminConfig::from_url("https://mongo:27018/ops").unwrap();
    /// assert_eq!(config.scheme, "https");
    /// assert_eq!(config.port, 27018);
    /// assert_eq!(config.path_prefix, "/ops");
    /// ```
    pub fn from_url(url: &str) -> Result<Self, String> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| "URL must contain a scheme".to_string())?;
        if scheme != "http" && scheme != "https" {
            return Err(format!("Unsupported scheme '{}'", scheme));
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err("Invalid host format".to_string());
        }

        let port = match authority.rsplit_once(':') {
            Some((_, port)) if !authority.ends_with(']') => {
                port.parse().map_err(|_| "Invalid port".to_string())?
            }
            _ => DEFAULT_ADMIN_PORT,
        };

        let mut config = Self::new(port).scheme(scheme);
        if !path.is_empty() {
            config = config.path_prefix(path.trim_end_matches('/'));
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be > 0".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be > 0".to_string());
        }

        if self.scheme.is_empty() {
            return Err("scheme cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default();
        assert_eq!(config.scheme, "http");
        assert_eq!(config.port, 27017);
        assert_eq!(config.path_prefix, "/admin");
    }

    #[test]
    fn test_builder_pattern() {
        let config = AdminConfig::new(1)
            .port(28017)
            .scheme("https")
            .request_timeout(Duration::from_secs(3));

        assert_eq!(config.port, 28017);
        assert_eq!(config.scheme, "https");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_from_url_default_port() {
        let config = AdminConfig::from_url("http://mongo").unwrap();
        assert_eq!(config.port, DEFAULT_ADMIN_PORT);
        assert_eq!(config.path_prefix, "/admin");
    }

    #[test]
    fn test_invalid_url() {
        assert!(AdminConfig::from_url("mongo:27017").is_err());
        assert!(AdminConfig::from_url("ftp://mongo").is_err());
        assert!(AdminConfig::from_url("http://mongo:port").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(AdminConfig::default().validate().is_ok());
        assert!(AdminConfig::default().port(0).validate().is_err());
        assert!(
            AdminConfig::default()
                .request_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}

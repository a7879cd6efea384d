//! Preview server configuration.

use crate::error::Result;
use kiln_config::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Preview server settings.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Server socket address (IP + port)
    pub addr: SocketAddr,

    /// Open browser automatically on start
    pub open: bool,

    /// Absolute directory to serve
    pub base_dir: PathBuf,
}

impl ServeConfig {
    /// Build a serve configuration, probing for an available port.
    ///
    /// # Errors
    ///
    /// Returns an error when the requested port and the ten after it are
    /// all busy, or when the base directory doesn't exist.
    pub fn new(port: u16, open: bool, base_dir: PathBuf) -> Result<Self> {
        if !base_dir.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "base_dir".to_string(),
                value: base_dir.display().to_string(),
                hint: "The served base directory must exist".to_string(),
            }
            .into());
        }

        let addr = Self::find_available_port(port)?;
        Ok(Self {
            addr,
            open,
            base_dir,
        })
    }

    /// Find an available port starting from the requested one.
    ///
    /// Tries the requested port first, then the next ten.
    fn find_available_port(requested_port: u16) -> Result<SocketAddr> {
        use std::net::TcpListener;

        if requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                requested_port
            ));
        }

        let addr = SocketAddr::from(([127, 0, 0, 1], requested_port));
        if TcpListener::bind(addr).is_ok() {
            return Ok(addr);
        }

        for offset in 1..=10 {
            let port = requested_port.saturating_add(offset);
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            if TcpListener::bind(addr).is_ok() {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: requested_port.to_string(),
            hint: format!(
                "Ports {}-{} are all in use. Try a different port range.",
                requested_port,
                requested_port + 10
            ),
        }
        .into())
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_find_available_port() {
        let listener = match TcpListener::bind(("127.0.0.1", 0)) {
            Ok(listener) => listener,
            Err(err) => {
                eprintln!("Skipping test_find_available_port: cannot bind ({})", err);
                return;
            }
        };
        let start_port = listener.local_addr().unwrap().port();
        drop(listener);

        let addr = ServeConfig::find_available_port(start_port).expect("should find port");
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert!(addr.port() >= start_port);
    }

    #[test]
    fn test_missing_base_dir_errors() {
        let err = ServeConfig::new(3000, false, PathBuf::from("/no/such/base")).unwrap_err();
        assert!(err.to_string().contains("base_dir"));
    }

    #[test]
    fn test_server_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServeConfig::new(0, false, dir.path().to_path_buf()).unwrap();
        assert!(config.server_url().starts_with("http://127.0.0.1:"));
    }
}

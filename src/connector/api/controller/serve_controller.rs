use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::Result;
use tracing::info;

use crate::connector::http;

use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Runs the relay until shutdown. `public` binds all interfaces instead of loopback.
    pub async fn serve(&self, port: Option<u16>, public: bool) -> Result<String> {
        let port = port.unwrap_or(self.container.settings().port);
        let ip = if public {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        };

        info!(
            upstream = %self.container.settings().openrouter_base_url,
            "Starting relay"
        );
        http::serve(SocketAddr::new(ip, port), self.container.relay_state()).await?;
        Ok("Relay stopped.".to_string())
    }
}

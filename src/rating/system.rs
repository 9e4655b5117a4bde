use std::net::UdpSocket;
use tracing::debug;

const UNKNOWN: &str = "Unknown";

/// Machine details attached to a rating
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub platform: String,
    pub release: String,
    pub ip_address: String,
    pub device_type: String,
}

impl SystemInfo {
    pub fn collect() -> Self {
        Self {
            platform: platform_name().to_string(),
            release: os_release(),
            ip_address: local_ip(),
            device_type: "Desktop".to_string(),
        }
    }

    /// "Linux 6.1.0" style label
    pub fn os_label(&self) -> String {
        format!("{} {}", self.platform, self.release)
    }
}

fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        other => other,
    }
}

#[cfg(unix)]
fn os_release() -> String {
    nix::sys::utsname::uname()
        .map(|uts| uts.release().to_string_lossy().to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

#[cfg(not(unix))]
fn os_release() -> String {
    UNKNOWN.to_string()
}

/// Address of the interface used for outbound traffic.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
pub fn local_ip() -> String {
    let probe = || -> std::io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip().to_string())
    };

    match probe() {
        Ok(ip) => ip,
        Err(e) => {
            debug!("Could not determine local IP: {}", e);
            UNKNOWN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_fills_every_field() {
        let info = SystemInfo::collect();
        assert!(!info.platform.is_empty());
        assert!(!info.release.is_empty());
        assert!(!info.ip_address.is_empty());
        assert_eq!(info.device_type, "Desktop");
        assert!(info.os_label().starts_with(&info.platform));
    }
}

//! Interface name and index utilities.

use crate::netlink::{Error, Result};

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = 16;

/// Validate an interface name.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("empty interface name".to_string()));
    }

    if name.len() >= IFNAMSIZ {
        return Err(Error::InvalidArgument(format!(
            "interface name too long (max {} chars)",
            IFNAMSIZ - 1
        )));
    }

    if name.contains('/') || name.contains('\0') || name.chars().any(|c| c.is_whitespace()) {
        return Err(Error::InvalidArgument(format!(
            "interface name contains invalid characters: {:?}",
            name
        )));
    }

    Ok(())
}

/// Convert an interface name to its kernel index.
pub fn name_to_index(name: &str) -> Result<u32> {
    validate(name)?;

    let path = format!("/sys/class/net/{}/ifindex", name);
    let content = std::fs::read_to_string(&path).map_err(|_| Error::InterfaceNotFound {
        name: name.to_string(),
    })?;

    content.trim().parse().map_err(|_| Error::InterfaceNotFound {
        name: name.to_string(),
    })
}

/// Convert an interface index to its name.
pub fn index_to_name(index: u32) -> Result<String> {
    if index == 0 {
        return Err(Error::InterfaceNotFound {
            name: "index 0".to_string(),
        });
    }

    let entries = std::fs::read_dir("/sys/class/net").map_err(Error::Io)?;

    for entry in entries.flatten() {
        let path = entry.path().join("ifindex");
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(idx) = content.trim().parse::<u32>()
            && idx == index
        {
            return Ok(entry.file_name().to_string_lossy().to_string());
        }
    }

    Err(Error::InterfaceNotFound {
        name: format!("index {}", index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate("wlan0").is_ok());
        assert!(validate("lo").is_ok());

        assert!(validate("").is_err());
        assert!(validate("this_name_is_way_too_long_for_an_interface").is_err());
        assert!(validate("wlan/0").is_err());
        assert!(validate("wlan 0").is_err());
    }

    #[test]
    fn test_name_to_index_loopback() {
        // Loopback always exists; its index round-trips.
        let index = name_to_index("lo").unwrap();
        assert!(index > 0);
        assert_eq!(index_to_name(index).unwrap(), "lo");
    }

    #[test]
    fn test_unknown_interface() {
        let err = name_to_index("nonesuch0").unwrap_err();
        assert!(matches!(err, Error::InterfaceNotFound { name } if name == "nonesuch0"));
    }
}

//! Coarse device, browser and OS detection from a `User-Agent` string.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUserAgent {
    pub device_type: DeviceType,
    pub browser: &'static str,
    pub os: &'static str,
}

pub fn device_type(user_agent: &str) -> DeviceType {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("mobile") {
        DeviceType::Mobile
    } else if ua.contains("tablet") || ua.contains("ipad") {
        DeviceType::Tablet
    } else {
        DeviceType::Desktop
    }
}

pub fn parse(user_agent: &str) -> ParsedUserAgent {
    let ua = user_agent.to_ascii_lowercase();

    // Chromium-based Edge also advertises Chrome and Safari; Chrome also
    // advertises Safari.
    let browser = if ua.contains("edg") {
        "Edge"
    } else if ua.contains("chrome") {
        "Chrome"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("safari") {
        "Safari"
    } else {
        "Unknown"
    };

    // Android UAs contain "Linux"; iOS UAs contain "Mac OS X".
    let os = if ua.contains("windows") {
        "Windows"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        "iOS"
    } else if ua.contains("macintosh") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else {
        "Unknown"
    };

    ParsedUserAgent {
        device_type: device_type(user_agent),
        browser,
        os,
    }
}

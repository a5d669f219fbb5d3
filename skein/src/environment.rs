//! Describes the environment a worker executes in

use crate::stats::Capabilities;

/// Prefix of apps uploaded to Sauce Labs storage
const STORAGE_PREFIX: &str = "sauce-storage:";

fn value(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn browser(caps: &Capabilities) -> &str {
    value(&caps.browser_name)
        .or_else(|| value(&caps.browser))
        .unwrap_or("")
}

fn version(caps: &Capabilities) -> &str {
    value(&caps.version)
        .or_else(|| value(&caps.platform_version))
        .or_else(|| value(&caps.browser_version))
        .unwrap_or("")
}

fn platform(caps: &Capabilities) -> String {
    if let Some(os) = value(&caps.os) {
        return match value(&caps.os_version) {
            Some(os_version) => format!("{} {}", os, os_version),
            None => os.to_string(),
        };
    }

    value(&caps.platform)
        .or_else(|| value(&caps.platform_name))
        .unwrap_or("")
        .to_string()
}

fn program(caps: &Capabilities) -> Option<&str> {
    value(&caps.app)
        .map(|app| app.strip_prefix(STORAGE_PREFIX).unwrap_or(app))
        .filter(|app| !app.is_empty())
        .or_else(|| value(&caps.browser_name))
}

/// Describe an environment.
///
/// Mobile environments (those with a `deviceName`) read as `iPhone iOS 15` or, verbose,
/// `iPhone on iOS 15 <version> executing Safari`. Desktop ones read as `chrome 100 Windows` or
/// `chrome (v100) on Windows`. Missing fields render as empty strings. Only the desktop compact
/// form and the verbose mobile form without a program are trimmed.
pub fn describe(caps: &Capabilities, verbose: bool) -> String {
    let version = version(caps);
    let platform = platform(caps);

    if let Some(device) = value(&caps.device_name) {
        if !verbose {
            return format!("{} {} {}", device, platform, version);
        }

        let base = format!("{} on {} {}", device, platform, version);
        return match program(caps) {
            Some(program) => format!("{} executing {}", base, program),
            None => base.trim_end().to_string(),
        };
    }

    let browser = browser(caps);
    if !verbose {
        return format!("{} {} {}", browser, version, platform)
            .trim()
            .to_string();
    }

    let mut out = browser.to_string();
    if !version.is_empty() {
        out.push_str(&format!(" (v{})", version));
    }
    if !platform.is_empty() {
        out.push_str(&format!(" on {}", platform));
    }
    out.trim().to_string()
}

//! Opens the user's default browser once the server is listening.

#[cfg(test)]
#[path = "launcher_test.rs"]
mod launcher_test;

use std::process::{Command, Stdio};
use std::time::Duration;

/// Program and arguments that open `url` in the default browser on `os`
/// (as reported by `std::env::consts::OS`). `None` for platforms without a
/// known opener.
pub fn browser_command(os: &str, url: &str) -> Option<(&'static str, Vec<String>)> {
    match os {
        "macos" => Some(("open", vec!["--".into(), url.into()])),
        // Empty string is the window title `start` expects first.
        "windows" => Some(("cmd", vec!["/C".into(), "start".into(), String::new(), url.into()])),
        "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Some(("xdg-open", vec![url.into()])),
        _ => None,
    }
}

/// Launch the browser for `url`. Failures are logged, never fatal.
pub fn open_browser(url: &str) {
    let Some((program, args)) = browser_command(std::env::consts::OS, url) else {
        tracing::warn!(os = std::env::consts::OS, %url, "no browser opener for this platform; open the URL manually");
        return;
    };
    match Command::new(program).args(&args).stdout(Stdio::null()).stderr(Stdio::null()).spawn() {
        Ok(_) => tracing::info!(%url, "opened browser"),
        Err(e) => tracing::warn!(error = %e, program, %url, "failed to open browser"),
    }
}

/// Open the browser after `delay`, giving the listener time to come up.
pub fn spawn_browser_after(url: String, delay: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        open_browser(&url);
    })
}

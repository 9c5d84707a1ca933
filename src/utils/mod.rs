// Utility functions and helpers

use url::Url;

/// Render a server URL for logs with any userinfo removed.
///
/// Unparseable input is never echoed.
pub fn mask_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if !url.username().is_empty() || url.password().is_some() {
                // Both only fail for cannot-be-a-base URLs, which carry no userinfo.
                let _ = url.set_username("");
                let _ = url.set_password(None);
            }
            url.to_string()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}

/// Remove the userinfo of `raw_url` from an arbitrary message.
///
/// Transport errors often embed the request URL verbatim.
pub fn scrub_credentials(message: &str, raw_url: &str) -> String {
    let Ok(url) = Url::parse(raw_url) else {
        return message.to_string();
    };

    let userinfo = match url.password() {
        Some(password) => format!("{}:{}@", url.username(), password),
        None if !url.username().is_empty() => format!("{}@", url.username()),
        None => return message.to_string(),
    };
    message.replace(&userinfo, "")
}

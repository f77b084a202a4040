use url::Url;

/// A short label for a request: its path without the outer slashes, or the
/// host when there is no path. Unparseable input comes back unchanged.
pub fn abbreviated_path(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_owned();
    };

    let path = parsed.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);

    if path.is_empty() {
        return parsed.host_str().unwrap_or_default().to_owned();
    }

    path.to_owned()
}

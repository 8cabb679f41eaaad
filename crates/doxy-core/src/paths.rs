use dirs::home_dir;
use std::path::PathBuf;

/// Returns the doxy home directory, or None if the user's home cannot be resolved.
pub fn try_doxy_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("DOXY_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".doxy"))
}

/// Returns the doxy home directory (`~/.doxy`), falling back to a
/// directory under the system temp dir when no home can be resolved.
pub fn doxy_home() -> PathBuf {
    try_doxy_home().unwrap_or_else(|| std::env::temp_dir().join("doxy"))
}

/// Packaged outputs: ~/.doxy/packages
pub fn packages_path() -> PathBuf {
    doxy_home().join("packages")
}

/// Default output directory for one package: ~/.doxy/packages/<version>/<id>
pub fn package_dir(version: &str, package_id: &str) -> PathBuf {
    packages_path().join(version).join(package_id)
}

/// Work directories: ~/.doxy/build
pub fn build_root() -> PathBuf {
    doxy_home().join("build")
}

/// Default work directory for one package: ~/.doxy/build/<version>-<id>
pub fn work_dir(version: &str, package_id: &str) -> PathBuf {
    build_root().join(format!("{version}-{package_id}"))
}

/// Logs directory: ~/.doxy/logs
pub fn log_dir() -> PathBuf {
    doxy_home().join("logs")
}

/// Generate a build log path for a version
pub fn build_log_path(version: &str) -> PathBuf {
    let timestamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
    log_dir().join(format!("build-doxygen-{version}-{timestamp}.log"))
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}

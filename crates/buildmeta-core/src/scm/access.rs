//! Connection and query settings for the version-control backend.
//!
//! Secrets are masked in every `Display` and `Debug` rendering so the
//! structs can be logged as-is.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::text::{is_blank, mask};

pub const DEFAULT_RETRY_COUNT: u32 = 5;
pub const DEFAULT_QUERY_RANGE_IN_DAYS: u32 = 30;

/// How the change log and status queries are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmAccessInfo {
    pub root_dir: PathBuf,
    pub date_format: String,
    pub query_range_in_days: u32,
    pub retry_count: u32,
    pub fail_on_local_modifications: bool,
    pub ignore_dot_files_in_base_dir: bool,
}

impl ScmAccessInfo {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            date_format: "%Y-%m-%d %H:%M:%S %z".to_string(),
            query_range_in_days: DEFAULT_QUERY_RANGE_IN_DAYS,
            retry_count: DEFAULT_RETRY_COUNT,
            fail_on_local_modifications: false,
            ignore_dot_files_in_base_dir: true,
        }
    }

    /// Local modifications abort the build only when dot-files are not
    /// filtered out of the status result.
    pub fn is_fail_indicated(&self) -> bool {
        self.fail_on_local_modifications && !self.ignore_dot_files_in_base_dir
    }
}

impl fmt::Display for ScmAccessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SCM access info: root_dir={}, date_format={}, query_range_in_days={}, retry_count={}, fail_on_local_modifications={}, ignore_dot_files_in_base_dir={}",
            self.root_dir.display(),
            self.date_format,
            self.query_range_in_days,
            self.retry_count,
            self.fail_on_local_modifications,
            self.ignore_dot_files_in_base_dir
        )
    }
}

/// Credentials for one SCM server, matched by `id` (`host` or `host:port`).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerCredentials {
    pub id: String,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub pass_phrase: Option<String>,
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_deref().map(mask))
            .field("private_key", &self.private_key.as_deref().map(mask))
            .field("pass_phrase", &self.pass_phrase.as_deref().map(mask))
            .finish()
    }
}

/// Credentials used to reach the repository.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScmCredentials {
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub pass_phrase: Option<String>,
}

impl ScmCredentials {
    pub fn is_complete(&self) -> bool {
        self.user_name.is_some() && self.password.is_some()
    }

    /// Fill missing fields from the server entry whose id equals `host`.
    pub fn configure_by_server(&mut self, servers: &[ServerCredentials], host: &str) {
        let Some(server) = servers.iter().find(|s| s.id == host) else {
            return;
        };
        fill(&mut self.user_name, &server.user_name);
        fill(&mut self.password, &server.password);
        fill(&mut self.private_key, &server.private_key);
        fill(&mut self.pass_phrase, &server.pass_phrase);
    }
}

fn fill(target: &mut Option<String>, source: &Option<String>) {
    if target.is_none() {
        target.clone_from(source);
    }
}

impl fmt::Debug for ScmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmCredentials")
            .field("user_name", &self.user_name)
            .field("password", &self.password.as_deref().map(mask))
            .field("private_key", &self.private_key.as_deref().map(mask))
            .field("pass_phrase", &self.pass_phrase.as_deref().map(mask))
            .finish()
    }
}

/// Which repository to talk to, and as whom.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ScmConnectionInfo {
    pub connection_url: String,
    pub credentials: ScmCredentials,
    pub tag_base: Option<String>,
}

impl ScmConnectionInfo {
    pub fn new(connection_url: impl Into<String>) -> Self {
        Self {
            connection_url: connection_url.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for ScmConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SCM connection info: url={}", self.connection_url)?;
        let c = &self.credentials;
        if let Some(user) = c.user_name.as_deref().filter(|v| !is_blank(v)) {
            write!(f, ", user={user}")?;
        }
        for (label, secret) in [
            ("password", &c.password),
            ("privateKey", &c.private_key),
            ("passPhrase", &c.pass_phrase),
        ] {
            if let Some(secret) = secret.as_deref().filter(|v| !is_blank(v)) {
                write!(f, ", {label}={}", mask(secret))?;
            }
        }
        if let Some(tag_base) = self.tag_base.as_deref().filter(|v| !is_blank(v)) {
            write!(f, ", tagBase={tag_base}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScmConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScmConnectionInfo")
            .field("connection_url", &self.connection_url)
            .field("credentials", &self.credentials)
            .field("tag_base", &self.tag_base)
            .finish()
    }
}

/// `host` or `host:port` of a connection URL such as
/// `scm:git:ssh://user@example.com:2222/repo.git`.
///
/// Returns `None` for URLs without a `scheme://` authority (for example the
/// scp-like `git@host:repo.git`).
pub fn host_of(connection_url: &str) -> Option<String> {
    let (_, rest) = connection_url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    if host_port.is_empty() {
        return None;
    }
    match host_port.split_once(':') {
        Some((host, port)) if port.parse::<u16>().is_ok_and(|p| p > 0) => {
            Some(format!("{host}:{port}"))
        }
        Some((host, _)) => Some(host.to_string()),
        None => Some(host_port.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_connection() -> ScmConnectionInfo {
        ScmConnectionInfo {
            connection_url: "scm:git:https://example.com/repo.git".into(),
            credentials: ScmCredentials {
                user_name: Some("ci".into()),
                password: Some("hunter2".into()),
                private_key: None,
                pass_phrase: Some("open".into()),
            },
            tag_base: None,
        }
    }

    #[test]
    fn display_masks_secrets() {
        let text = secret_connection().to_string();
        assert!(text.contains("user=ci"));
        assert!(text.contains("password=*******"));
        assert!(text.contains("passPhrase=****"));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("open"));
    }

    #[test]
    fn debug_masks_secrets() {
        let text = format!("{:?}", secret_connection());
        assert!(!text.contains("hunter2"));
        assert!(text.contains("*******"));
    }

    #[test]
    fn fail_indicated_only_without_dot_file_filter() {
        let mut access = ScmAccessInfo::new("/tmp/x");
        access.fail_on_local_modifications = true;
        assert!(!access.is_fail_indicated());
        access.ignore_dot_files_in_base_dir = false;
        assert!(access.is_fail_indicated());
        access.fail_on_local_modifications = false;
        assert!(!access.is_fail_indicated());
    }

    #[test]
    fn host_parsing() {
        assert_eq!(
            host_of("scm:git:ssh://ci@example.com:2222/repo.git").as_deref(),
            Some("example.com:2222")
        );
        assert_eq!(
            host_of("scm:git:https://github.com/org/repo").as_deref(),
            Some("github.com")
        );
        assert_eq!(host_of("scm:git:git@github.com:org/repo.git"), None);
    }

    #[test]
    fn configure_by_server_fills_only_missing_fields() {
        let servers = vec![ServerCredentials {
            id: "example.com:2222".into(),
            user_name: Some("server-user".into()),
            password: Some("server-pass".into()),
            ..ServerCredentials::default()
        }];
        let mut creds = ScmCredentials {
            user_name: Some("explicit".into()),
            ..ScmCredentials::default()
        };
        creds.configure_by_server(&servers, "example.com:2222");

        assert_eq!(creds.user_name.as_deref(), Some("explicit"));
        assert_eq!(creds.password.as_deref(), Some("server-pass"));
        assert!(creds.is_complete());

        let mut other = ScmCredentials::default();
        other.configure_by_server(&servers, "example.com");
        assert!(other.user_name.is_none());
    }
}

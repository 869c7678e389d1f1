use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StackError, StackResult};
use crate::variables::Variables;
use crate::website::{Certificate, Environment, HostedZone, Mode, WebsiteStackProps};

pub const DEFAULT_RUNTIME: &str = "nodejs20.x";

fn default_runtime() -> String {
    DEFAULT_RUNTIME.to_string()
}

/// the on disk description of a website stack, eg:
///
/// ```toml
/// stack_name = "marketing-site"
/// environment = "production"
/// mode = "static"
/// package = "@acme/marketing"
/// aliases = ["www"]
/// hosted_zone_name = "example.com"
/// hosted_zone_id = "Z0123456789"
/// certificate_arn = "arn:aws:acm:us-east-1:123456789012:certificate/abc"
/// dashboard_name = "marketing"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StackConfig {
    pub stack_name: String,
    pub environment: Environment,
    pub mode: Mode,
    pub package: String,
    #[serde(default = "default_runtime")]
    pub runtime: String,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub hosted_zone_name: Option<String>,
    #[serde(default)]
    pub hosted_zone_id: Option<String>,
    #[serde(default)]
    pub certificate_arn: Option<String>,
    /// when set, a dashboard with this name is created and the
    /// site's widgets are added to it.
    #[serde(default)]
    pub dashboard_name: Option<String>,
    /// directory holding the workspace's root package.json. Relative paths
    /// are resolved against the config file's directory.
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
}

impl StackConfig {
    pub fn parse(contents: &str, path: &Path) -> StackResult<Self> {
        toml::from_str(contents).map_err(|e| StackError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> StackResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StackError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// resolves `workspace_root` against `config_dir`.
    pub fn workspace_root(&self, config_dir: &Path) -> PathBuf {
        match &self.workspace_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => config_dir.join(root),
            None => config_dir.to_path_buf(),
        }
    }

    pub fn to_props(&self, vars: &Variables) -> WebsiteStackProps {
        WebsiteStackProps {
            environment: self.environment,
            mode: self.mode,
            aliases: self.aliases.clone(),
            hosted_zone_name: self.hosted_zone_name.clone(),
            package: self.package.clone(),
            runtime: self.runtime.clone(),
            certificate: self.certificate_arn.clone().map(|arn| Certificate { arn }),
            hosted_zone: self.hosted_zone_id.clone().map(|id| HostedZone { id }),
            web_acl_id: vars.web_acl_id(),
        }
    }
}

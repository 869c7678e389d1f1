use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::error::{StackError, StackResult};

/// optional id (or ARN) of the WAF web acl to attach to the distribution.
pub const WEB_ACL_ID_VAR: &str = "WEB_ACL_ID";

/// reads a `.env` file into a map. Comments, blank lines, quoting and
/// `${VAR}` substitution follow dotenvy's rules.
pub fn load_dot_env(path: &Path) -> StackResult<BTreeMap<String, String>> {
    let iter = dotenvy::from_path_iter(path).map_err(|e| dot_env_error(path, e))?;
    let mut map = BTreeMap::new();
    for item in iter {
        let (key, val) = item.map_err(|e| dot_env_error(path, e))?;
        map.insert(key, val);
    }
    Ok(map)
}

fn dot_env_error(path: &Path, e: dotenvy::Error) -> StackError {
    match e {
        dotenvy::Error::Io(source) => StackError::Read { path: path.to_path_buf(), source },
        other => StackError::Parse { path: path.to_path_buf(), reason: other.to_string() },
    }
}

/// keeps the variables whose name and value are both valid unicode.
fn utf8_vars<I: IntoIterator<Item = (OsString, OsString)>>(vars: I) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, val)| Some((key.into_string().ok()?, val.into_string().ok()?)))
        .collect()
}

/// layered variable lookup. earlier sources win.
#[derive(Debug, Default, Clone)]
pub struct Variables {
    sources: Vec<BTreeMap<String, String>>,
}

impl Variables {
    /// the process environment. Variables that aren't valid unicode are skipped.
    pub fn from_process_env() -> Self {
        Self::default().with_source(utf8_vars(std::env::vars_os()))
    }

    pub fn with_source(mut self, source: BTreeMap<String, String>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sources.iter().find_map(|s| s.get(key)).map(|v| v.as_str())
    }

    /// the web acl id, or None when it's unset or empty.
    pub fn web_acl_id(&self) -> Option<String> {
        self.get(WEB_ACL_ID_VAR)
            .filter(|id| !id.is_empty())
            .map(|id| id.to_string())
    }
}

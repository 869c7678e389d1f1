use super::*;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

pub struct CachePolicy {
    pub name: String,
    pub comment: String,
    pub min_ttl: u64,
    pub default_ttl: u64,
    pub max_ttl: u64,
    pub enable_gzip: bool,
    pub enable_brotli: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            name: String::new(),
            comment: String::new(),
            min_ttl: 0,
            default_ttl: SECONDS_PER_DAY,
            max_ttl: 365 * SECONDS_PER_DAY,
            enable_gzip: true,
            enable_brotli: true,
        }
    }
}

impl CachePolicy {
    /// a policy for content that never changes once it is deployed
    /// (hashed file names etc). Default and max ttl are raised
    /// so they are never below the min ttl.
    pub fn long_lived<S: Into<String>>(name: S, min_ttl_days: u64) -> Self {
        let min_ttl = min_ttl_days * SECONDS_PER_DAY;
        let defaults = Self::default();
        let default_ttl = defaults.default_ttl.max(min_ttl);
        Self {
            name: name.into(),
            min_ttl,
            default_ttl,
            max_ttl: defaults.max_ttl.max(default_ttl),
            ..defaults
        }
    }
}

impl CfnResource for CachePolicy {
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::CachePolicy"
    }

    fn properties(&self) -> Value {
        let mut config = json!({
            "Name": self.name,
            "MinTTL": self.min_ttl,
            "DefaultTTL": self.default_ttl,
            "MaxTTL": self.max_ttl,
            "ParametersInCacheKeyAndForwardedToOrigin": {
                "EnableAcceptEncodingGzip": self.enable_gzip,
                "EnableAcceptEncodingBrotli": self.enable_brotli,
                "CookiesConfig": { "CookieBehavior": "none" },
                "HeadersConfig": { "HeaderBehavior": "none" },
                "QueryStringsConfig": { "QueryStringBehavior": "none" },
            },
        });
        if !self.comment.is_empty() {
            config["Comment"] = Value::String(self.comment.clone());
        }
        json!({ "CachePolicyConfig": config })
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 128 {
            return Err(format!("Invalid cache policy name {:?}\nMust be between 1 and 128 characters", self.name));
        }
        if self.min_ttl > self.default_ttl || self.default_ttl > self.max_ttl {
            return Err(format!(
                "Cache policy ttls must satisfy min <= default <= max. found min={} default={} max={}",
                self.min_ttl, self.default_ttl, self.max_ttl
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lived_raises_default_and_max_to_min() {
        let policy = CachePolicy::long_lived("site-cache", 365);
        assert_eq!(policy.min_ttl, 31_536_000);
        assert_eq!(policy.default_ttl, 31_536_000);
        assert_eq!(policy.max_ttl, 31_536_000);
        assert!(policy.validate().is_ok());
        let props = policy.properties();
        assert_eq!(props["CachePolicyConfig"]["MinTTL"], 31_536_000);
        assert_eq!(props["CachePolicyConfig"]["Name"], "site-cache");
        assert!(props["CachePolicyConfig"].get("Comment").is_none());
    }

    #[test]
    fn unordered_ttls_are_rejected() {
        let policy = CachePolicy {
            name: "bad".into(),
            min_ttl: 10,
            default_ttl: 5,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}

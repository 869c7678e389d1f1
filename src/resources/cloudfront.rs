use super::*;

/// managed "CachingDisabled" policy. used for behaviors that must always
/// reach the origin.
pub const CACHING_DISABLED_POLICY_ID: &str = "4135ea2d-6df8-44a3-9df3-4b5a84be39ad";
/// managed "SecurityHeadersPolicy" response headers policy.
/// https://docs.aws.amazon.com/AmazonCloudFront/latest/DeveloperGuide/using-managed-response-headers-policies.html
pub const SECURITY_HEADERS_POLICY_ID: &str = "67f7725c-6f97-4210-82d7-5512b31e9d03";
/// managed "AllViewerExceptHostHeader" origin request policy, required
/// when the origin is a lambda function url.
pub const ALL_VIEWER_EXCEPT_HOST_HEADER_POLICY_ID: &str = "b689b0a8-53d0-40ab-baf2-68738e2966ac";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceClass {
    All,
    Class200,
    Class100,
}

impl PriceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceClass::All => "PriceClass_All",
            PriceClass::Class200 => "PriceClass_200",
            PriceClass::Class100 => "PriceClass_100",
        }
    }
}

#[derive(Debug, Clone)]
pub enum OriginKind {
    /// a private s3 bucket read through origin access control.
    S3 { origin_access_control_id: Value },
    Custom { origin_protocol_policy: String },
}

#[derive(Debug, Clone)]
pub struct Origin {
    pub id: String,
    pub domain_name: Value,
    pub kind: OriginKind,
}

impl Origin {
    fn to_value(&self) -> Value {
        let mut out = json!({
            "Id": self.id,
            "DomainName": self.domain_name,
        });
        match &self.kind {
            OriginKind::S3 { origin_access_control_id } => {
                // OAC still needs an (empty) origin access identity set
                out["S3OriginConfig"] = json!({ "OriginAccessIdentity": "" });
                out["OriginAccessControlId"] = origin_access_control_id.clone();
            }
            OriginKind::Custom { origin_protocol_policy } => {
                out["CustomOriginConfig"] = json!({
                    "HTTPPort": 80,
                    "HTTPSPort": 443,
                    "OriginProtocolPolicy": origin_protocol_policy,
                    "OriginSSLProtocols": ["TLSv1.2"],
                });
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Behavior {
    /// None for the default cache behavior.
    pub path_pattern: Option<String>,
    pub target_origin_id: String,
    pub cache_policy_id: Value,
    pub origin_request_policy_id: Option<String>,
    pub response_headers_policy_id: Option<String>,
    pub viewer_protocol_policy: String,
    pub allowed_methods: Vec<String>,
    pub compress: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            path_pattern: None,
            target_origin_id: String::new(),
            cache_policy_id: Value::String(CACHING_DISABLED_POLICY_ID.into()),
            origin_request_policy_id: None,
            response_headers_policy_id: None,
            viewer_protocol_policy: "redirect-to-https".into(),
            allowed_methods: vec!["GET".into(), "HEAD".into()],
            compress: true,
        }
    }
}

impl Behavior {
    fn to_value(&self) -> Value {
        let mut out = json!({
            "TargetOriginId": self.target_origin_id,
            "CachePolicyId": self.cache_policy_id,
            "ViewerProtocolPolicy": self.viewer_protocol_policy,
            "AllowedMethods": self.allowed_methods,
            "Compress": self.compress,
        });
        if let Some(pattern) = &self.path_pattern {
            out["PathPattern"] = Value::String(pattern.clone());
        }
        if let Some(id) = &self.origin_request_policy_id {
            out["OriginRequestPolicyId"] = Value::String(id.clone());
        }
        if let Some(id) = &self.response_headers_policy_id {
            out["ResponseHeadersPolicyId"] = Value::String(id.clone());
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error_code: u16,
    pub response_code: u16,
    pub response_page_path: String,
}

#[derive(Debug, Clone)]
pub struct DistributionLogging {
    /// the domain name of the bucket receiving logs, eg: GetAtt Bucket.RegionalDomainName
    pub bucket: Value,
    pub prefix: String,
}

pub const DISTRIBUTION_COMMENT_MAX_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct CloudfrontDistribution {
    pub enabled: bool,
    pub comment: String,
    pub aliases: Vec<String>,
    pub acm_certificate_arn: Option<String>,
    pub origins: Vec<Origin>,
    pub default_behavior: Behavior,
    pub behaviors: Vec<Behavior>,
    pub error_responses: Vec<ErrorResponse>,
    pub price_class: PriceClass,
    pub logging: Option<DistributionLogging>,
    pub web_acl_id: Option<String>,
    pub default_root_object: Option<String>,
}

impl Default for CloudfrontDistribution {
    fn default() -> Self {
        Self {
            enabled: true,
            comment: String::new(),
            aliases: vec![],
            acm_certificate_arn: None,
            origins: vec![],
            default_behavior: Behavior::default(),
            behaviors: vec![],
            error_responses: vec![],
            price_class: PriceClass::All,
            logging: None,
            web_acl_id: None,
            default_root_object: None,
        }
    }
}

impl CfnResource for CloudfrontDistribution {
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::Distribution"
    }

    fn properties(&self) -> Value {
        let origins: Vec<Value> = self.origins.iter().map(|o| o.to_value()).collect();
        let mut config = json!({
            "Enabled": self.enabled,
            "HttpVersion": "http2and3",
            "IPV6Enabled": true,
            "PriceClass": self.price_class.as_str(),
            "Origins": origins,
            "DefaultCacheBehavior": self.default_behavior.to_value(),
        });
        if !self.comment.is_empty() {
            config["Comment"] = Value::String(self.comment.clone());
        }
        if let Some(root) = &self.default_root_object {
            config["DefaultRootObject"] = Value::String(root.clone());
        }
        if !self.behaviors.is_empty() {
            let behaviors: Vec<Value> = self.behaviors.iter().map(|b| b.to_value()).collect();
            config["CacheBehaviors"] = Value::Array(behaviors);
        }
        if !self.aliases.is_empty() {
            config["Aliases"] = json!(self.aliases);
        }
        if let Some(cert_arn) = &self.acm_certificate_arn {
            config["ViewerCertificate"] = json!({
                "AcmCertificateArn": cert_arn,
                "MinimumProtocolVersion": "TLSv1.2_2021",
                "SslSupportMethod": "sni-only",
            });
        }
        if !self.error_responses.is_empty() {
            let responses: Vec<Value> = self.error_responses.iter().map(|e| json!({
                "ErrorCode": e.error_code,
                "ResponseCode": e.response_code,
                "ResponsePagePath": e.response_page_path,
            })).collect();
            config["CustomErrorResponses"] = Value::Array(responses);
        }
        if let Some(logging) = &self.logging {
            config["Logging"] = json!({
                "Bucket": logging.bucket,
                "Prefix": logging.prefix,
                "IncludeCookies": false,
            });
        }
        if let Some(web_acl_id) = &self.web_acl_id {
            config["WebACLId"] = Value::String(web_acl_id.clone());
        }
        json!({ "DistributionConfig": config })
    }

    fn validate(&self) -> Result<(), String> {
        if self.origins.is_empty() {
            return Err("Must provide at least one origin to cloudfront distribution".into());
        }
        if self.comment.len() > DISTRIBUTION_COMMENT_MAX_LEN {
            return Err(format!("Distribution comment must be at most {DISTRIBUTION_COMMENT_MAX_LEN} characters"));
        }
        let behaviors = std::iter::once(&self.default_behavior).chain(self.behaviors.iter());
        for behavior in behaviors {
            if !self.origins.iter().any(|o| o.id == behavior.target_origin_id) {
                return Err(format!("Cache behavior targets unknown origin '{}'", behavior.target_origin_id));
            }
        }
        for behavior in &self.behaviors {
            if behavior.path_pattern.is_none() {
                return Err(format!("Cache behavior for origin '{}' is missing a path pattern", behavior.target_origin_id));
            }
        }
        Ok(())
    }
}

pub struct OriginAccessControl {
    pub name: String,
    pub description: String,
}

impl CfnResource for OriginAccessControl {
    fn type_string(&self) -> &'static str {
        "AWS::CloudFront::OriginAccessControl"
    }

    fn properties(&self) -> Value {
        json!({
            "OriginAccessControlConfig": {
                "Name": self.name,
                "Description": self.description,
                "OriginAccessControlOriginType": "s3",
                "SigningBehavior": "always",
                "SigningProtocol": "sigv4",
            }
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err(format!("Invalid origin access control name {:?}\nMust be between 1 and 64 characters", self.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_origin() -> Origin {
        Origin {
            id: "bucket".into(),
            domain_name: get_att("Bucket", "RegionalDomainName"),
            kind: OriginKind::S3 { origin_access_control_id: get_att("Oac", "Id") },
        }
    }

    #[test]
    fn minimal_distribution_renders_required_fields() {
        let distr = CloudfrontDistribution {
            origins: vec![s3_origin()],
            default_behavior: Behavior { target_origin_id: "bucket".into(), ..Default::default() },
            price_class: PriceClass::Class100,
            ..Default::default()
        };
        assert!(distr.validate().is_ok());
        let config = &distr.properties()["DistributionConfig"];
        assert_eq!(config["PriceClass"], "PriceClass_100");
        assert_eq!(config["Origins"][0]["S3OriginConfig"]["OriginAccessIdentity"], "");
        assert_eq!(config["DefaultCacheBehavior"]["TargetOriginId"], "bucket");
        assert!(config.get("Aliases").is_none());
        assert!(config.get("ViewerCertificate").is_none());
        assert!(config.get("WebACLId").is_none());
        assert!(config.get("Logging").is_none());
        assert!(config.get("CacheBehaviors").is_none());
    }

    #[test]
    fn certificate_and_aliases_are_rendered() {
        let distr = CloudfrontDistribution {
            origins: vec![s3_origin()],
            default_behavior: Behavior { target_origin_id: "bucket".into(), ..Default::default() },
            aliases: vec!["www.example.com".into()],
            acm_certificate_arn: Some("arn:aws:acm:us-east-1:1:certificate/abc".into()),
            web_acl_id: Some("arn:aws:wafv2:acl".into()),
            ..Default::default()
        };
        let config = &distr.properties()["DistributionConfig"];
        assert_eq!(config["Aliases"], json!(["www.example.com"]));
        assert_eq!(config["ViewerCertificate"]["SslSupportMethod"], "sni-only");
        assert_eq!(config["WebACLId"], "arn:aws:wafv2:acl");
    }

    #[test]
    fn behaviors_must_target_known_origins() {
        let distr = CloudfrontDistribution {
            origins: vec![s3_origin()],
            default_behavior: Behavior { target_origin_id: "missing".into(), ..Default::default() },
            ..Default::default()
        };
        assert_eq!(distr.validate().unwrap_err(), "Cache behavior targets unknown origin 'missing'");

        let no_origins = CloudfrontDistribution::default();
        assert!(no_origins.validate().is_err());
    }

    #[test]
    fn extra_behaviors_need_a_path_pattern() {
        let distr = CloudfrontDistribution {
            origins: vec![s3_origin()],
            default_behavior: Behavior { target_origin_id: "bucket".into(), ..Default::default() },
            behaviors: vec![Behavior { target_origin_id: "bucket".into(), ..Default::default() }],
            ..Default::default()
        };
        assert!(distr.validate().is_err());
    }
}

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectOwnership {
    BucketOwnerEnforced,
    BucketOwnerPreferred,
    /// needed by buckets that receive cloudfront standard logs,
    /// since cloudfront writes those with ACLs.
    ObjectWriter,
}

impl ObjectOwnership {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectOwnership::BucketOwnerEnforced => "BucketOwnerEnforced",
            ObjectOwnership::BucketOwnerPreferred => "BucketOwnerPreferred",
            ObjectOwnership::ObjectWriter => "ObjectWriter",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessLogging {
    /// usually a `Ref` to the log bucket.
    pub destination_bucket: Value,
    pub prefix: String,
}

#[derive(Debug, Clone)]
pub struct S3Bucket {
    /// leave empty to let cloudformation generate a name.
    pub bucket_name: String,
    pub block_public_access: bool,
    pub object_ownership: Option<ObjectOwnership>,
    pub access_logging: Option<AccessLogging>,
    /// local directory whose contents belong in this bucket.
    pub asset_path: Option<String>,
}

impl Default for S3Bucket {
    fn default() -> Self {
        Self {
            bucket_name: String::new(),
            block_public_access: true,
            object_ownership: None,
            access_logging: None,
            asset_path: None,
        }
    }
}

impl S3Bucket {
    /// a bucket that only ever receives access logs.
    pub fn log_bucket() -> Self {
        Self {
            object_ownership: Some(ObjectOwnership::ObjectWriter),
            ..Default::default()
        }
    }
}

impl CfnResource for S3Bucket {
    fn type_string(&self) -> &'static str {
        "AWS::S3::Bucket"
    }

    fn properties(&self) -> Value {
        let mut map = Map::new();
        if !self.bucket_name.is_empty() {
            map.insert("BucketName".to_string(), Value::String(self.bucket_name.clone()));
        }
        map.insert("BucketEncryption".to_string(), json!({
            "ServerSideEncryptionConfiguration": [{
                "ServerSideEncryptionByDefault": { "SSEAlgorithm": "AES256" }
            }]
        }));
        if self.block_public_access {
            map.insert("PublicAccessBlockConfiguration".to_string(), json!({
                "BlockPublicAcls": true,
                "BlockPublicPolicy": true,
                "IgnorePublicAcls": true,
                "RestrictPublicBuckets": true,
            }));
        }
        if let Some(ownership) = self.object_ownership {
            map.insert("OwnershipControls".to_string(), json!({
                "Rules": [{ "ObjectOwnership": ownership.as_str() }]
            }));
        }
        if let Some(logging) = &self.access_logging {
            map.insert("LoggingConfiguration".to_string(), json!({
                "DestinationBucketName": logging.destination_bucket,
                "LogFilePrefix": logging.prefix,
            }));
        }
        Value::Object(map)
    }

    fn metadata(&self) -> Option<Value> {
        self.asset_path.as_ref().map(|p| json!({ ASSET_PATH_METADATA_KEY: p }))
    }

    fn validate(&self) -> Result<(), String> {
        let name = &self.bucket_name;
        if name.is_empty() {
            return Ok(());
        }
        if name.len() < 3 || name.len() > 63 {
            return Err(format!("Invalid bucket name {name:?}\nMust be between 3 and 63 characters"));
        }
        if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-') {
            return Err(format!("Invalid bucket name {name:?}\nMust only contain lowercase letters, numbers, dots and hyphens"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PolicyStatement {
    pub effect: String,
    pub action: String,
    pub resource: Value,
    pub principal: Value,
    pub condition: Option<Value>,
}

impl PolicyStatement {
    fn to_value(&self) -> Value {
        let mut out = json!({
            "Effect": self.effect,
            "Action": self.action,
            "Resource": self.resource,
            "Principal": self.principal,
        });
        if let Some(condition) = &self.condition {
            out["Condition"] = condition.clone();
        }
        out
    }
}

pub struct BucketPolicy {
    pub bucket: Value,
    pub statements: Vec<PolicyStatement>,
}

impl BucketPolicy {
    /// allows a single cloudfront distribution (through origin access control)
    /// to read every object in the bucket.
    pub fn cloudfront_read(bucket_logical_id: &str, distribution_logical_id: &str) -> Self {
        let statement = PolicyStatement {
            effect: "Allow".into(),
            action: "s3:GetObject".into(),
            resource: sub(&format!("arn:aws:s3:::${{{bucket_logical_id}}}/*")),
            principal: json!({ "Service": "cloudfront.amazonaws.com" }),
            condition: Some(json!({
                "StringEquals": {
                    "AWS:SourceArn": sub(&format!(
                        "arn:aws:cloudfront::${{AWS::AccountId}}:distribution/${{{distribution_logical_id}}}"
                    ))
                }
            })),
        };
        Self {
            bucket: get_ref(bucket_logical_id),
            statements: vec![statement],
        }
    }
}

impl CfnResource for BucketPolicy {
    fn type_string(&self) -> &'static str {
        "AWS::S3::BucketPolicy"
    }

    fn properties(&self) -> Value {
        let statements: Vec<Value> = self.statements.iter().map(|s| s.to_value()).collect();
        json!({
            "Bucket": self.bucket,
            "PolicyDocument": {
                "Version": "2012-10-17",
                "Statement": statements,
            }
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.statements.is_empty() {
            return Err("Bucket policy must contain at least one statement".into());
        }
        for s in &self.statements {
            if s.effect != "Allow" && s.effect != "Deny" {
                return Err("policy statement effect must be Allow or Deny".into());
            }
        }
        Ok(())
    }
}

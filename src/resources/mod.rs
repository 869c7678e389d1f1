pub use std::collections::BTreeMap;

pub use serde_json::{json, Map, Value};

mod cache_policy;
pub use cache_policy::*;
mod s3_bucket;
pub use s3_bucket::*;
mod cloudfront;
pub use cloudfront::*;
mod lambda;
pub use lambda::*;
mod route53;
pub use route53::*;
mod cloudwatch;
pub use cloudwatch::*;

// higher level resources:
mod web_app;
pub use web_app::*;

/// metadata key used to tell the deployer which local directory
/// belongs to a resource (bucket contents, function code).
pub const ASSET_PATH_METADATA_KEY: &str = "website-stack:asset-path";

/// anything that can be declared in a cloudformation template.
pub trait CfnResource {
    fn type_string(&self) -> &'static str;
    fn properties(&self) -> Value;
    fn metadata(&self) -> Option<Value> {
        None
    }
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// `{ "Ref": logical_id }`
pub fn get_ref(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{ "Fn::GetAtt": [logical_id, attribute] }`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

pub fn sub(s: &str) -> Value {
    json!({ "Fn::Sub": s })
}

/// true if the value is a cloudformation intrinsic function object
/// that only gets resolved at deploy time.
pub fn is_intrinsic(value: &Value) -> bool {
    match value {
        Value::Object(map) if map.len() == 1 => {
            map.keys().all(|k| k == "Ref" || k.starts_with("Fn::"))
        }
        _ => false,
    }
}

pub fn verify_resource_name(resource_name: &str) -> Option<String> {
    if resource_name.len() > 255 {
        return Some(format!("Invalid resource name {:?}\nmust be less than 255 characters", resource_name));
    }
    if resource_name.is_empty() {
        return Some(format!("Invalid resource name {:?}\nMust contain at least 1 character", resource_name));
    }
    if !resource_name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some(format!("Invalid resource name {:?}\nMust contain only alphanumeric characters [A-Za-z0-9]", resource_name));
    }
    None
}

/// strips everything that isnt allowed in a logical id.
/// eg: `www.example-site.com` -> `wwwexamplesitecom`
pub fn logical_name(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// the assume role policy every lambda execution role gets.
pub fn create_assume_role_policy_doc(service: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole",
        }]
    })
}

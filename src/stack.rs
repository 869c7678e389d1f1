use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{StackError, StackResult};
use crate::resources::{verify_resource_name, CfnResource};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

pub struct Resource {
    pub name: String,
    pub properties: Box<dyn CfnResource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResource {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: Value,
    #[serde(rename = "Metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOutput {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParameter {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Description")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub version: String,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "Parameters", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, TemplateParameter>,
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, SavedResource>,
    #[serde(rename = "Outputs", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, ResourceOutput>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            parameters: Default::default(),
            resources: Default::default(),
            outputs: Default::default(),
        }
    }
}

impl Template {
    pub fn resources_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = (&'a String, &'a SavedResource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.ty == ty)
    }
}

/// an in-memory cloudformation stack. resources, parameters and outputs
/// get declared into it, then it's rendered into a [`Template`].
pub struct Stack {
    name: String,
    pub description: Option<String>,
    resources: Vec<Resource>,
    parameters: Vec<(String, TemplateParameter)>,
    outputs: Vec<(String, ResourceOutput)>,
}

impl Stack {
    pub fn new(name: &str) -> StackResult<Self> {
        let name = validate_stack_name("website-stack", name)?;
        Ok(Self {
            name,
            description: None,
            resources: vec![],
            parameters: vec![],
            outputs: vec![],
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_resource<S: Into<String>, R: CfnResource + 'static>(&mut self, name: S, resource: R) {
        let name = name.into();
        debug!(resource = %name, ty = resource.type_string(), "declared resource");
        self.resources.push(Resource { name, properties: Box::new(resource) });
    }

    /// adds a string parameter the deployer has to fill in.
    pub fn add_parameter<S: Into<String>, S1: Into<String>>(&mut self, name: S, description: S1) {
        let param = TemplateParameter {
            ty: "String".to_string(),
            description: description.into(),
        };
        self.parameters.push((name.into(), param));
    }

    pub fn add_output<S: Into<String>, S1: Into<String>>(&mut self, name: S, description: S1, value: Value) {
        let output = ResourceOutput { description: description.into(), value };
        self.outputs.push((name.into(), output));
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn resources_of_type<'a>(&'a self, ty: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources.iter().filter(move |r| r.properties.type_string() == ty)
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn to_template(&self) -> StackResult<Template> {
        let mut out_template = Template {
            description: self.description.clone(),
            ..Default::default()
        };
        for resource in self.resources.iter() {
            if let Some(reason) = verify_resource_name(&resource.name) {
                return Err(StackError::InvalidResource { name: resource.name.clone(), reason });
            }
            if let Err(reason) = resource.properties.validate() {
                return Err(StackError::InvalidResource { name: resource.name.clone(), reason });
            }
            let saved_resource = SavedResource {
                ty: resource.properties.type_string().to_string(),
                properties: resource.properties.properties(),
                metadata: resource.properties.metadata(),
            };
            if out_template.resources.insert(resource.name.clone(), saved_resource).is_some() {
                return Err(StackError::DuplicateResource(resource.name.clone()));
            }
        }
        for (name, param) in self.parameters.iter() {
            out_template.parameters.insert(name.clone(), param.clone());
        }
        for (name, output) in self.outputs.iter() {
            out_template.outputs.insert(name.clone(), output.clone());
        }
        Ok(out_template)
    }

    pub fn to_json_pretty(&self) -> StackResult<String> {
        let template = self.to_template()?;
        // we make it pretty so if a user needs to look at the stack in Cfn console, it looks nice
        Ok(serde_json::to_string_pretty(&template)?)
    }
}

pub fn validate_stack_name(default_name: &str, current_stack_name: &str) -> StackResult<String> {
    let stack_name = if current_stack_name.is_empty() {
        let mut stack_name = default_name.replace('_', "-");
        stack_name.truncate(128);
        stack_name
    } else {
        current_stack_name.to_string()
    };
    // A stack name can contain only alphanumeric characters (case sensitive) and hyphens.
    // It must start with an alphabetical character and can't be longer than 128 characters.
    let restriction = "Must only consist of alphanumeric characters and hyphens, Must start with an alphabetical character, and cannot be longer than 128 characters.";
    let invalid = || StackError::InvalidStackName {
        name: stack_name.clone(),
        reason: restriction.to_string(),
    };
    match stack_name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid()),
    }
    if !stack_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(invalid());
    }
    if stack_name.len() > 128 {
        return Err(invalid());
    }
    Ok(stack_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{get_ref, S3Bucket};

    #[test]
    fn empty_stack_name_uses_default() {
        assert_eq!(validate_stack_name("my_site", "").unwrap(), "my-site");
        assert_eq!(validate_stack_name("x", "prod-site").unwrap(), "prod-site");
    }

    #[test]
    fn invalid_stack_names_are_rejected() {
        assert!(validate_stack_name("x", "1site").is_err());
        assert!(validate_stack_name("x", "my_site").is_err());
        assert!(validate_stack_name("x", &"a".repeat(129)).is_err());
        assert!(Stack::new("bad name").is_err());
    }

    #[test]
    fn template_has_resources_params_and_outputs() {
        let mut stack = Stack::new("site").unwrap();
        stack.add_resource("LogBucket", S3Bucket::log_bucket());
        stack.add_parameter("CodeKey", "key of the code artifact");
        stack.add_output("LogBucketName", "log bucket", get_ref("LogBucket"));
        let template = stack.to_template().unwrap();
        assert_eq!(template.version, "2010-09-09");
        assert_eq!(template.resources["LogBucket"].ty, "AWS::S3::Bucket");
        assert!(template.resources["LogBucket"].metadata.is_none());
        assert_eq!(template.parameters["CodeKey"].ty, "String");
        assert_eq!(template.outputs["LogBucketName"].value, get_ref("LogBucket"));
        assert_eq!(stack.resources_of_type("AWS::S3::Bucket").count(), 1);
    }

    #[test]
    fn empty_sections_are_not_serialized() {
        let stack = Stack::new("site").unwrap();
        let json: Value = serde_json::from_str(&stack.to_json_pretty().unwrap()).unwrap();
        assert!(json.get("Parameters").is_none());
        assert!(json.get("Outputs").is_none());
        assert!(json.get("Description").is_none());
        assert_eq!(json["Resources"], serde_json::json!({}));
    }

    #[test]
    fn duplicate_and_invalid_names_fail() {
        let mut stack = Stack::new("site").unwrap();
        stack.add_resource("Bucket", S3Bucket::default());
        stack.add_resource("Bucket", S3Bucket::default());
        assert!(matches!(stack.to_template(), Err(StackError::DuplicateResource(n)) if n == "Bucket"));

        let mut stack = Stack::new("site").unwrap();
        stack.add_resource("my-bucket", S3Bucket::default());
        assert!(matches!(stack.to_template(), Err(StackError::InvalidResource { .. })));
    }
}

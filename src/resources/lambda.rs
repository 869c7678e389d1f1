use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Arm64,
    X86_64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Arm64 => "arm64",
            Architecture::X86_64 => "x86_64",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingMode {
    Active,
    PassThrough,
}

impl TracingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TracingMode::Active => "Active",
            TracingMode::PassThrough => "PassThrough",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionCode {
    pub s3_bucket: Value,
    pub s3_key: Value,
    /// local directory the code artifact gets built from.
    pub asset_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LambdaFunction {
    /// leave empty to get a generated name.
    pub function_name: String,
    pub description: String,
    pub runtime: String,
    pub handler: String,
    pub code: FunctionCode,
    /// usually GetAtt of the execution role's Arn.
    pub role: Value,
    pub memory_size: u64,
    pub timeout: u32,
    pub architecture: Architecture,
    pub tracing: TracingMode,
    pub environment_variables: BTreeMap<String, String>,
}

impl Default for LambdaFunction {
    fn default() -> Self {
        Self {
            function_name: String::new(),
            description: String::new(),
            runtime: String::new(),
            handler: "index.handler".into(),
            code: FunctionCode {
                s3_bucket: Value::Null,
                s3_key: Value::Null,
                asset_path: None,
            },
            role: Value::Null,
            memory_size: 128,
            timeout: 30,
            architecture: Architecture::Arm64,
            tracing: TracingMode::PassThrough,
            environment_variables: Default::default(),
        }
    }
}

impl CfnResource for LambdaFunction {
    fn type_string(&self) -> &'static str {
        "AWS::Lambda::Function"
    }

    fn properties(&self) -> Value {
        let mut out = json!({
            "Runtime": self.runtime,
            "Handler": self.handler,
            "Code": {
                "S3Bucket": self.code.s3_bucket,
                "S3Key": self.code.s3_key,
            },
            "Role": self.role,
            "MemorySize": self.memory_size,
            "Timeout": self.timeout,
            "Architectures": [self.architecture.as_str()],
            "TracingConfig": { "Mode": self.tracing.as_str() },
        });
        if !self.function_name.is_empty() {
            out["FunctionName"] = Value::String(self.function_name.clone());
        }
        if !self.description.is_empty() {
            out["Description"] = Value::String(self.description.clone());
        }
        if !self.environment_variables.is_empty() {
            out["Environment"] = json!({ "Variables": self.environment_variables });
        }
        out
    }

    fn metadata(&self) -> Option<Value> {
        self.code.asset_path.as_ref().map(|p| json!({ ASSET_PATH_METADATA_KEY: p }))
    }

    fn validate(&self) -> Result<(), String> {
        if self.function_name.len() > 64 {
            return Err(format!("Invalid function name {:?}\nMust be at most 64 characters", self.function_name));
        }
        if self.memory_size < 128 || self.memory_size > 10240 {
            return Err(format!("Invalid memory size {:?}\nMust be between 128 and 10240", self.memory_size));
        }
        if self.timeout < 1 || self.timeout > 900 {
            return Err(format!("Invalid timeout {:?}\nMust be between 1 and 900", self.timeout));
        }
        if self.handler.is_empty() {
            return Err("Lambda function must have a handler".into());
        }
        Ok(())
    }
}

pub const BASIC_EXECUTION_POLICY_ARN: &str = "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";
pub const XRAY_WRITE_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AWSXrayWriteOnlyAccess";

pub struct LambdaExecutionRole {
    pub description: String,
    pub managed_policy_arns: Vec<String>,
}

impl LambdaExecutionRole {
    pub fn new(tracing: TracingMode) -> Self {
        let mut managed_policy_arns = vec![BASIC_EXECUTION_POLICY_ARN.to_string()];
        if tracing == TracingMode::Active {
            managed_policy_arns.push(XRAY_WRITE_POLICY_ARN.to_string());
        }
        Self {
            description: String::new(),
            managed_policy_arns,
        }
    }
}

impl CfnResource for LambdaExecutionRole {
    fn type_string(&self) -> &'static str {
        "AWS::IAM::Role"
    }

    fn properties(&self) -> Value {
        let mut out = json!({
            "AssumeRolePolicyDocument": create_assume_role_policy_doc("lambda.amazonaws.com"),
            "ManagedPolicyArns": self.managed_policy_arns,
        });
        if !self.description.is_empty() {
            out["Description"] = Value::String(self.description.clone());
        }
        out
    }
}

/// a public function url, so cloudfront can use the function as an origin.
pub struct FunctionUrl {
    pub target_function_logical_id: String,
}

impl CfnResource for FunctionUrl {
    fn type_string(&self) -> &'static str {
        "AWS::Lambda::Url"
    }

    fn properties(&self) -> Value {
        json!({
            "AuthType": "NONE",
            "TargetFunctionArn": get_att(&self.target_function_logical_id, "Arn"),
        })
    }
}

pub struct FunctionUrlPermission {
    pub function_logical_id: String,
}

impl CfnResource for FunctionUrlPermission {
    fn type_string(&self) -> &'static str {
        "AWS::Lambda::Permission"
    }

    fn properties(&self) -> Value {
        json!({
            "Action": "lambda:InvokeFunctionUrl",
            "FunctionName": get_att(&self.function_logical_id, "Arn"),
            "FunctionUrlAuthType": "NONE",
            "Principal": "*",
        })
    }
}

/// the function url attribute looks like `https://abc.lambda-url.us-east-1.on.aws/`.
/// cloudfront only wants the host part, so we split on '/' and take the 3rd element.
pub fn select_function_url_domain(function_url_logical_id: &str) -> Value {
    json!({
        "Fn::Select": ["2", { "Fn::Split": ["/", get_att(function_url_logical_id, "FunctionUrl")] }]
    })
}

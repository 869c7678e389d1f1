use super::*;
use crate::stack::Stack;

/// settings for the server side rendering function. When a web app
/// has one, the distribution's default behavior is served by it.
#[derive(Debug, Clone)]
pub struct ServerFunction {
    pub runtime: String,
    pub handler: String,
    pub memory_size: u64,
    pub timeout: u32,
    pub architecture: Architecture,
    pub tracing: TracingMode,
    pub environment_variables: BTreeMap<String, String>,
}

impl Default for ServerFunction {
    fn default() -> Self {
        let func = LambdaFunction::default();
        Self {
            runtime: String::new(),
            handler: func.handler,
            memory_size: func.memory_size,
            timeout: func.timeout,
            architecture: func.architecture,
            tracing: func.tracing,
            environment_variables: Default::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistributionSettings {
    pub cache_policy_id: Value,
    pub domain_names: Vec<String>,
    pub certificate_arn: Option<String>,
    pub error_responses: Vec<ErrorResponse>,
    pub response_headers_policy_id: Option<String>,
    pub price_class: PriceClass,
    pub web_acl_id: Option<String>,
    /// logical id of the bucket receiving distribution access logs.
    pub log_bucket: Option<String>,
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            cache_policy_id: Value::String(CACHING_DISABLED_POLICY_ID.into()),
            domain_names: vec![],
            certificate_arn: None,
            error_responses: vec![],
            response_headers_policy_id: None,
            price_class: PriceClass::All,
            web_acl_id: None,
            log_bucket: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebAppInput {
    /// prefix of every logical id this construct declares.
    pub name: String,
    /// local directory with the build output served from the bucket.
    pub asset_path: String,
    pub distribution: DistributionSettings,
    /// logical id of the bucket receiving the origin bucket's access logs.
    pub bucket_log_bucket: Option<String>,
    pub function: Option<ServerFunction>,
}

/// logical ids of what a web app declared, so other resources can reference them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebApp {
    pub distribution: String,
    pub bucket: String,
    pub function: Option<String>,
}

pub const DISTRIBUTION_LOG_PREFIX: &str = "cdn/";
pub const BUCKET_LOG_PREFIX: &str = "bucket/";
/// requests for anything that looks like a file go to the bucket when
/// the default behavior is a function.
pub const STATIC_FILES_PATH_PATTERN: &str = "*.*";

const BUCKET_ORIGIN_ID: &str = "bucket";
const FUNCTION_ORIGIN_ID: &str = "function";

/// declares a complete web app: the origin bucket, an optional server function,
/// and the distribution in front of both.
pub fn add_web_app(stack: &mut Stack, input: WebAppInput) -> WebApp {
    let WebAppInput { name, asset_path, distribution: settings, bucket_log_bucket, function } = input;
    let bucket_id = format!("{name}Bucket");
    let oac_id = format!("{name}OriginAccessControl");
    let distribution_id = format!("{name}Distribution");

    let bucket = S3Bucket {
        access_logging: bucket_log_bucket.as_deref().map(|log| AccessLogging {
            destination_bucket: get_ref(log),
            prefix: BUCKET_LOG_PREFIX.into(),
        }),
        asset_path: Some(asset_path.clone()),
        ..Default::default()
    };
    stack.add_resource(&bucket_id, bucket);

    let mut oac_name = format!("{}-{}", stack.name(), name);
    oac_name.truncate(64);
    stack.add_resource(&oac_id, OriginAccessControl {
        name: oac_name,
        description: format!("{name} origin bucket access"),
    });
    stack.add_resource(format!("{name}BucketPolicy"), BucketPolicy::cloudfront_read(&bucket_id, &distribution_id));

    let bucket_origin = Origin {
        id: BUCKET_ORIGIN_ID.into(),
        domain_name: get_att(&bucket_id, "RegionalDomainName"),
        kind: OriginKind::S3 { origin_access_control_id: get_att(&oac_id, "Id") },
    };
    let bucket_behavior = Behavior {
        target_origin_id: BUCKET_ORIGIN_ID.into(),
        cache_policy_id: settings.cache_policy_id.clone(),
        response_headers_policy_id: settings.response_headers_policy_id.clone(),
        ..Default::default()
    };

    let mut origins = vec![bucket_origin];
    let mut behaviors = vec![];
    let mut default_root_object = Some("index.html".to_string());
    let function_id = match function {
        Some(server) => {
            let function_id = add_server_function(stack, &name, &asset_path, server);
            let url_id = format!("{function_id}Url");
            origins.push(Origin {
                id: FUNCTION_ORIGIN_ID.into(),
                domain_name: select_function_url_domain(&url_id),
                kind: OriginKind::Custom { origin_protocol_policy: "https-only".into() },
            });
            behaviors.push(Behavior {
                path_pattern: Some(STATIC_FILES_PATH_PATTERN.into()),
                ..bucket_behavior.clone()
            });
            default_root_object = None;
            Some(function_id)
        }
        None => None,
    };
    let default_behavior = match &function_id {
        // rendered pages are never cached, only files from the bucket are
        Some(_) => Behavior {
            target_origin_id: FUNCTION_ORIGIN_ID.into(),
            cache_policy_id: Value::String(CACHING_DISABLED_POLICY_ID.into()),
            origin_request_policy_id: Some(ALL_VIEWER_EXCEPT_HOST_HEADER_POLICY_ID.into()),
            allowed_methods: ["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "POST", "DELETE"]
                .iter().map(|m| m.to_string()).collect(),
            ..bucket_behavior.clone()
        },
        None => bucket_behavior,
    };

    let mut comment = format!("{} {name}", stack.name());
    comment.truncate(DISTRIBUTION_COMMENT_MAX_LEN);
    let distribution = CloudfrontDistribution {
        comment,
        aliases: settings.domain_names,
        acm_certificate_arn: settings.certificate_arn,
        origins,
        default_behavior,
        behaviors,
        error_responses: settings.error_responses,
        price_class: settings.price_class,
        logging: settings.log_bucket.as_deref().map(|log| DistributionLogging {
            bucket: get_att(log, "RegionalDomainName"),
            prefix: DISTRIBUTION_LOG_PREFIX.into(),
        }),
        // an empty id means no web acl
        web_acl_id: settings.web_acl_id.filter(|id| !id.is_empty()),
        default_root_object,
        ..Default::default()
    };
    stack.add_resource(&distribution_id, distribution);

    WebApp {
        distribution: distribution_id,
        bucket: bucket_id,
        function: function_id,
    }
}

/// declares the function, its role and a public url. The code artifact
/// location is left to two template parameters.
fn add_server_function(stack: &mut Stack, name: &str, asset_path: &str, server: ServerFunction) -> String {
    let function_id = format!("{name}Function");
    let role_id = format!("{function_id}Role");
    let bucket_param = format!("{function_id}CodeBucket");
    let key_param = format!("{function_id}CodeKey");
    stack.add_parameter(&bucket_param, format!("S3 bucket holding the {name} function code"));
    stack.add_parameter(&key_param, format!("S3 key of the {name} function code archive"));

    stack.add_resource(&role_id, LambdaExecutionRole::new(server.tracing));
    let func = LambdaFunction {
        runtime: server.runtime,
        handler: server.handler,
        code: FunctionCode {
            s3_bucket: get_ref(&bucket_param),
            s3_key: get_ref(&key_param),
            asset_path: Some(asset_path.to_string()),
        },
        role: get_att(&role_id, "Arn"),
        memory_size: server.memory_size,
        timeout: server.timeout,
        architecture: server.architecture,
        tracing: server.tracing,
        environment_variables: server.environment_variables,
        ..Default::default()
    };
    stack.add_resource(&function_id, func);
    stack.add_resource(format!("{function_id}Url"), FunctionUrl {
        target_function_logical_id: function_id.clone(),
    });
    stack.add_resource(format!("{function_id}UrlPermission"), FunctionUrlPermission {
        function_logical_id: function_id.clone(),
    });
    function_id
}

//! The website stack: everything needed to host one static or server
//! rendered site behind a CDN.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StackResult;
use crate::resources::*;
use crate::stack::{Stack, Template};
use crate::workspace::WorkspacePackages;

pub const CACHE_POLICY_MIN_TTL_DAYS: u64 = 365;
pub const CACHE_POLICY_ID: &str = "CachePolicy";
pub const CACHE_POLICY_NAME_MAX_LEN: usize = 128;
pub const LOG_BUCKET_ID: &str = "LogBucket";
pub const WEB_APP_NAME: &str = "WebApp";
pub const DISTRIBUTION_ID_OUTPUT: &str = "DistributionId";
pub const DISTRIBUTION_DOMAIN_NAME_OUTPUT: &str = "DistributionDomainName";
pub const DOMAIN_ENV_VAR: &str = "DOMAIN";
/// what the function sees in DOMAIN when the site has no custom domain.
pub const UNDEFINED_DOMAIN: &str = "undefined";
pub const NOT_FOUND_PAGE: &str = "/404.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl Environment {
    /// production is served from every edge location, everything
    /// else from the cheapest tier.
    pub fn price_class(&self) -> PriceClass {
        match self {
            Environment::Production => PriceClass::All,
            Environment::Staging | Environment::Development => PriceClass::Class100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Static,
    Ssr,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Static => "static",
            Mode::Ssr => "ssr",
        }
    }

    /// build output directory, relative to the package.
    pub fn dist_dir(&self) -> &'static str {
        match self {
            Mode::Static => "dist",
            Mode::Ssr => "dist/ssr",
        }
    }

    pub fn has_server(&self) -> bool {
        matches!(self, Mode::Ssr)
    }

    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteStackProps {
    pub environment: Environment,
    pub mode: Mode,
    pub aliases: Option<Vec<String>>,
    pub hosted_zone_name: Option<String>,
    /// name of the workspace package whose build output gets served.
    pub package: String,
    /// lambda runtime identifier, eg: nodejs20.x
    pub runtime: String,
    pub certificate: Option<Certificate>,
    pub hosted_zone: Option<HostedZone>,
    pub web_acl_id: Option<String>,
}

/// `alias.hosted_zone_name` for every alias, or just the alias
/// when there is no zone name.
pub fn domain_names(aliases: Option<&[String]>, hosted_zone_name: Option<&str>) -> Option<Vec<String>> {
    let suffix = hosted_zone_name.filter(|s| !s.is_empty());
    aliases.map(|aliases| {
        aliases
            .iter()
            .map(|alias| match suffix {
                Some(suffix) => format!("{alias}.{suffix}"),
                None => alias.clone(),
            })
            .collect()
    })
}

/// one A and one AAAA record per domain name. Nothing without a hosted zone.
pub fn dns_records(
    domain_names: Option<&[String]>,
    hosted_zone: Option<&HostedZone>,
    distribution_id: &str,
) -> Vec<Route53RecordSet> {
    let (Some(domain_names), Some(zone)) = (domain_names, hosted_zone) else {
        return vec![];
    };
    domain_names
        .iter()
        .flat_map(|name| {
            [RecordType::A, RecordType::Aaaa].map(|ty| {
                Route53RecordSet::cloudfront_alias(ty, name, &zone.id, distribution_id)
            })
        })
        .collect()
}

/// the value of the function's DOMAIN variable.
pub fn domain_env_value(domain_names: Option<&[String]>) -> String {
    domain_names
        .and_then(|names| names.first())
        .cloned()
        .unwrap_or_else(|| UNDEFINED_DOMAIN.to_string())
}

/// distribution graphs always, plus a log query and function graphs when
/// there is a function.
pub fn widgets(mode: Mode, distribution_id: &str, function_id: Option<&str>) -> Vec<Widget> {
    let label = mode.label();
    let distribution = get_ref(distribution_id);
    let graph = |title: String, metric: Metric| Widget::Graph(GraphWidget::new(title, vec![metric]));

    let mut out = vec![];
    if let Some(function_id) = function_id {
        let query = join("", vec![
            Value::String("SOURCE '/aws/lambda/".into()),
            get_ref(function_id),
            Value::String("' | fields @timestamp, @message | filter @message like /ERROR/ | sort @timestamp desc | limit 100".into()),
        ]);
        out.push(Widget::LogQuery(LogQueryWidget::new(format!("{label} function errors"), query)));
    }
    let title = format!("{label} 5xx error rate");
    out.push(graph(title.clone(), Metric::cloudfront("5xxErrorRate", distribution.clone(), "Average", title)));
    let title = format!("{label} requests");
    out.push(graph(title.clone(), Metric::cloudfront("Requests", distribution, "Sum", title)));
    if let Some(function_id) = function_id {
        let function = get_ref(function_id);
        let metric = |metric_name: &str, stat: &str, name: &str| {
            Metric::lambda(metric_name, function.clone(), stat, format!("{label} function {name}"))
        };
        // failures are graphed against invocations so the error ratio is visible
        out.push(Widget::Graph(GraphWidget::new(
            format!("{label} function failures and invocations"),
            vec![metric("Errors", "Sum", "failures"), metric("Invocations", "Sum", "invocations")],
        )));
        out.push(graph(format!("{label} function duration"), metric("Duration", "p99", "duration")));
        out.push(graph(format!("{label} function throttles"), metric("Throttles", "Sum", "throttles")));
    }
    out
}

pub struct WebsiteStack {
    stack: Stack,
    web_app: WebApp,
    dist_dir: &'static str,
    domain_names: Option<Vec<String>>,
    widgets: Vec<Widget>,
}

impl WebsiteStack {
    /// declares the whole site into a new stack named `stack_name`.
    /// Fails before declaring anything if `props.package` is not in `workspace`.
    pub fn build(
        stack_name: &str,
        props: &WebsiteStackProps,
        workspace: &WorkspacePackages,
        dashboard: Option<&mut Dashboard>,
    ) -> StackResult<Self> {
        let package_path = workspace.path_of(&props.package)?;
        let dist_dir = props.mode.dist_dir();
        let asset_path = package_path.join(dist_dir);
        let mut stack = Stack::new(stack_name)?;
        stack.description = Some(format!("{} website for {} ({:?})", props.mode, props.package, props.environment));

        // stack names are ascii so truncating can't split a char
        let mut cache_policy_name = format!("{}-{CACHE_POLICY_ID}", stack.name());
        cache_policy_name.truncate(CACHE_POLICY_NAME_MAX_LEN);
        stack.add_resource(
            CACHE_POLICY_ID,
            CachePolicy::long_lived(cache_policy_name, CACHE_POLICY_MIN_TTL_DAYS),
        );
        stack.add_resource(LOG_BUCKET_ID, S3Bucket::log_bucket());

        let domain_names = domain_names(props.aliases.as_deref(), props.hosted_zone_name.as_deref());
        debug!(?domain_names, "resolved domain names");

        let function = props.mode.has_server().then(|| {
            let mut server = ServerFunction {
                runtime: props.runtime.clone(),
                architecture: Architecture::Arm64,
                tracing: TracingMode::Active,
                ..Default::default()
            };
            server.environment_variables.insert(
                DOMAIN_ENV_VAR.to_string(),
                domain_env_value(domain_names.as_deref()),
            );
            server
        });

        let web_app = add_web_app(&mut stack, WebAppInput {
            name: WEB_APP_NAME.into(),
            asset_path: asset_path.display().to_string(),
            distribution: DistributionSettings {
                cache_policy_id: get_ref(CACHE_POLICY_ID),
                domain_names: domain_names.clone().unwrap_or_default(),
                certificate_arn: props.certificate.as_ref().map(|c| c.arn.clone()),
                error_responses: [403, 404].map(|code| ErrorResponse {
                    error_code: code,
                    response_code: 404,
                    response_page_path: NOT_FOUND_PAGE.into(),
                }).to_vec(),
                response_headers_policy_id: Some(SECURITY_HEADERS_POLICY_ID.into()),
                price_class: props.environment.price_class(),
                web_acl_id: props.web_acl_id.clone(),
                log_bucket: Some(LOG_BUCKET_ID.into()),
            },
            bucket_log_bucket: Some(LOG_BUCKET_ID.into()),
            function,
        });

        for record in dns_records(domain_names.as_deref(), props.hosted_zone.as_ref(), &web_app.distribution) {
            stack.add_resource(record.logical_id(), record);
        }

        let widgets = widgets(props.mode, &web_app.distribution, web_app.function.as_deref());
        if let Some(dashboard) = dashboard {
            dashboard.add_widgets(widgets.iter().cloned());
        }

        stack.add_output(DISTRIBUTION_ID_OUTPUT, "id of the cloudfront distribution", get_ref(&web_app.distribution));
        stack.add_output(
            DISTRIBUTION_DOMAIN_NAME_OUTPUT,
            "domain name of the cloudfront distribution",
            get_att(&web_app.distribution, "DomainName"),
        );

        info!(
            stack = stack.name(),
            resources = stack.resources().len(),
            widgets = widgets.len(),
            "assembled website stack"
        );
        Ok(Self { stack, web_app, dist_dir, domain_names, widgets })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn web_app(&self) -> &WebApp {
        &self.web_app
    }

    pub fn dist_dir(&self) -> &str {
        self.dist_dir
    }

    pub fn domain_names(&self) -> Option<&[String]> {
        self.domain_names.as_deref()
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn to_template(&self) -> StackResult<Template> {
        self.stack.to_template()
    }
}

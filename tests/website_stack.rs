use website_stack::resources::{get_att, get_ref, CfnResource, ASSET_PATH_METADATA_KEY, SECURITY_HEADERS_POLICY_ID};
use website_stack::{
    Certificate, Dashboard, Environment, HostedZone, Mode, StackError, WebsiteStack, WebsiteStackProps,
    WorkspacePackages,
};

fn workspace() -> WorkspacePackages {
    [("@acme/site", "/repo/packages/site")].into_iter().collect()
}

fn props(mode: Mode) -> WebsiteStackProps {
    WebsiteStackProps {
        environment: Environment::Staging,
        mode,
        aliases: Some(vec!["www".into(), "docs".into()]),
        hosted_zone_name: Some("example.com".into()),
        package: "@acme/site".into(),
        runtime: "nodejs20.x".into(),
        certificate: None,
        hosted_zone: Some(HostedZone { id: "Z0123".into() }),
        web_acl_id: None,
    }
}

#[test]
fn ssr_site_is_fully_wired() {
    let mut dashboard = Dashboard::new("site");
    let site = WebsiteStack::build("acme-site", &props(Mode::Ssr), &workspace(), Some(&mut dashboard)).unwrap();
    let template = site.to_template().unwrap();

    assert_eq!(template.resources_of_type("AWS::Route53::RecordSet").count(), 4);
    assert_eq!(template.resources_of_type("AWS::Lambda::Function").count(), 1);
    assert_eq!(template.resources_of_type("AWS::CloudFront::CachePolicy").count(), 1);
    assert_eq!(dashboard.widgets.len(), 6);
    assert_eq!(site.widgets().len(), 6);
    assert_eq!(site.dist_dir(), "dist/ssr");
    assert_eq!(
        site.domain_names(),
        Some(&["www.example.com".to_string(), "docs.example.com".to_string()][..])
    );

    let bucket = &template.resources[&site.web_app().bucket];
    let metadata = bucket.metadata.as_ref().unwrap();
    assert_eq!(metadata[ASSET_PATH_METADATA_KEY], "/repo/packages/site/dist/ssr");

    let function = &template.resources["WebAppFunction"].properties;
    assert_eq!(function["Environment"]["Variables"]["DOMAIN"], "www.example.com");
    assert_eq!(function["Architectures"][0], "arm64");
    assert_eq!(function["TracingConfig"]["Mode"], "Active");
    assert!(template.parameters.contains_key("WebAppFunctionCodeBucket"));

    let outputs: Vec<&String> = template.outputs.keys().collect();
    assert_eq!(outputs, vec!["DistributionDomainName", "DistributionId"]);
    assert_eq!(site.stack().output_names(), vec!["DistributionId", "DistributionDomainName"]);
    assert_eq!(template.outputs["DistributionId"].value, get_ref("WebAppDistribution"));
    assert_eq!(template.outputs["DistributionDomainName"].value, get_att("WebAppDistribution", "DomainName"));
}

#[test]
fn distribution_has_error_pages_headers_certificate_and_logging() {
    let mut props = props(Mode::Static);
    props.certificate = Some(Certificate { arn: "arn:aws:acm:us-east-1:1:certificate/abc".into() });
    let site = WebsiteStack::build("acme-site", &props, &workspace(), None).unwrap();

    let distribution = site.stack().resource("WebAppDistribution").unwrap();
    assert_eq!(distribution.properties.type_string(), "AWS::CloudFront::Distribution");
    let template = site.to_template().unwrap();
    let config = &template.resources["WebAppDistribution"].properties["DistributionConfig"];

    let errors = config["CustomErrorResponses"].as_array().unwrap();
    let codes: Vec<u64> = errors.iter().map(|e| e["ErrorCode"].as_u64().unwrap()).collect();
    assert_eq!(codes, vec![403, 404]);
    assert!(errors.iter().all(|e| e["ResponseCode"] == 404 && e["ResponsePagePath"] == "/404.html"));

    assert_eq!(config["DefaultCacheBehavior"]["ResponseHeadersPolicyId"], SECURITY_HEADERS_POLICY_ID);
    assert_eq!(config["ViewerCertificate"]["AcmCertificateArn"], "arn:aws:acm:us-east-1:1:certificate/abc");
    assert_eq!(config["Logging"]["Bucket"], get_att("LogBucket", "RegionalDomainName"));
    assert!(site.stack().resource("LogBucket").is_some());
}

#[test]
fn aliases_differing_in_punctuation_get_their_own_records() {
    let mut props = props(Mode::Static);
    props.aliases = Some(vec!["a-b".into(), "ab".into()]);
    let site = WebsiteStack::build("acme-site", &props, &workspace(), None).unwrap();
    let template = site.to_template().unwrap();
    let names: Vec<&str> = template
        .resources_of_type("AWS::Route53::RecordSet")
        .map(|(_, r)| r.properties["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 4);
    assert_eq!(names.iter().filter(|n| **n == "a-b.example.com").count(), 2);
    assert_eq!(names.iter().filter(|n| **n == "ab.example.com").count(), 2);
}

#[test]
fn longest_valid_stack_name_renders() {
    let stack_name = "a".repeat(128);
    let site = WebsiteStack::build(&stack_name, &props(Mode::Ssr), &workspace(), None).unwrap();
    let template = site.to_template().unwrap();
    let policy_name = template.resources["CachePolicy"].properties["CachePolicyConfig"]["Name"]
        .as_str()
        .unwrap();
    assert_eq!(policy_name.len(), 128);
    assert!(policy_name.starts_with(&stack_name[..100]));
}

#[test]
fn static_site_without_zone_has_no_records_or_function() {
    let mut props = props(Mode::Static);
    props.hosted_zone = None;
    let site = WebsiteStack::build("acme-site", &props, &workspace(), None).unwrap();
    let template = site.to_template().unwrap();

    assert_eq!(template.resources_of_type("AWS::Route53::RecordSet").count(), 0);
    assert_eq!(template.resources_of_type("AWS::Lambda::Function").count(), 0);
    assert_eq!(site.widgets().len(), 2);
    assert_eq!(site.dist_dir(), "dist");
    assert!(template.parameters.is_empty());

    let config = &template.resources["WebAppDistribution"].properties["DistributionConfig"];
    assert_eq!(config["PriceClass"], "PriceClass_100");
    assert_eq!(config["Aliases"][0], "www.example.com");
    assert!(config.get("WebACLId").is_none());
}

#[test]
fn production_site_uses_every_edge_and_web_acl() {
    let mut props = props(Mode::Static);
    props.environment = Environment::Production;
    props.web_acl_id = Some("arn:aws:wafv2:us-east-1:1:global/webacl/site".into());
    let site = WebsiteStack::build("acme-site", &props, &workspace(), None).unwrap();
    let template = site.to_template().unwrap();
    let config = &template.resources["WebAppDistribution"].properties["DistributionConfig"];
    assert_eq!(config["PriceClass"], "PriceClass_All");
    assert_eq!(config["WebACLId"], "arn:aws:wafv2:us-east-1:1:global/webacl/site");
}

#[test]
fn function_domain_is_undefined_without_aliases() {
    let mut props = props(Mode::Ssr);
    props.aliases = None;
    let site = WebsiteStack::build("acme-site", &props, &workspace(), None).unwrap();
    let template = site.to_template().unwrap();
    let function = &template.resources["WebAppFunction"].properties;
    assert_eq!(function["Environment"]["Variables"]["DOMAIN"], "undefined");
    assert_eq!(template.resources_of_type("AWS::Route53::RecordSet").count(), 0);
}

#[test]
fn missing_package_declares_nothing() {
    let mut props = props(Mode::Ssr);
    props.package = "@acme/missing".into();
    let mut dashboard = Dashboard::new("site");
    let err = WebsiteStack::build("acme-site", &props, &workspace(), Some(&mut dashboard))
        .err()
        .unwrap();
    match err {
        StackError::PackageNotFound { package } => assert_eq!(package, "@acme/missing"),
        other => panic!("unexpected error {other}"),
    }
    assert!(dashboard.widgets.is_empty());
}

#[test]
fn rendering_is_deterministic() {
    let render = || {
        WebsiteStack::build("acme-site", &props(Mode::Ssr), &workspace(), None)
            .unwrap()
            .stack()
            .to_json_pretty()
            .unwrap()
    };
    assert_eq!(render(), render());
}

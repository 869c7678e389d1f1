use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn workspace(root: &Path) {
    write(&root.join("package.json"), r#"{ "private": true, "workspaces": ["packages/*"] }"#);
    write(&root.join("packages/site/package.json"), r#"{ "name": "@acme/site" }"#);
}

fn sitestack() -> Command {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    cmd.env_remove("WEB_ACL_ID").env_remove("RUST_LOG");
    cmd
}

#[test]
fn synth_writes_template_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    workspace(dir.path());
    write(&dir.path().join("website.toml"), r#"
stack_name = "acme-site"
environment = "production"
mode = "ssr"
package = "@acme/site"
aliases = ["www"]
hosted_zone_name = "example.com"
hosted_zone_id = "Z0123"
dashboard_name = "acme-site"
"#);

    let out = sitestack()
        .arg("synth")
        .arg("--config")
        .arg(dir.path().join("website.toml"))
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let template: Value = serde_json::from_slice(&out.stdout).unwrap();
    let resources = template["Resources"].as_object().unwrap();
    assert_eq!(resources["WebAppDistribution"]["Type"], "AWS::CloudFront::Distribution");
    assert_eq!(resources["Dashboard"]["Type"], "AWS::CloudWatch::Dashboard");
    assert!(resources.contains_key("RecordAwwwexamplecom305205ed"));
    assert!(resources.contains_key("RecordAAAAwwwexamplecom305205ed"));
    assert_eq!(
        resources["WebAppFunction"]["Properties"]["Environment"]["Variables"]["DOMAIN"],
        "www.example.com"
    );
}

#[test]
fn synth_reads_web_acl_from_dotenv_and_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    workspace(dir.path());
    write(&dir.path().join("website.toml"), r#"
stack_name = "acme-site"
environment = "staging"
mode = "static"
package = "@acme/site"
"#);
    write(&dir.path().join(".env"), "WEB_ACL_ID=arn:aws:wafv2:us-east-1:1:global/webacl/x\n");
    let out_path = dir.path().join("template.json");

    sitestack()
        .arg("synth")
        .arg("--config")
        .arg(dir.path().join("website.toml"))
        .arg("--dotenv")
        .arg(dir.path().join(".env"))
        .arg("--out")
        .arg(&out_path)
        .assert()
        .success();

    let template: Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let config = &template["Resources"]["WebAppDistribution"]["Properties"]["DistributionConfig"];
    assert_eq!(config["WebACLId"], "arn:aws:wafv2:us-east-1:1:global/webacl/x");
    assert_eq!(config["PriceClass"], "PriceClass_100");
}

#[test]
fn synth_fails_on_unknown_package() {
    let dir = tempfile::tempdir().unwrap();
    workspace(dir.path());
    write(&dir.path().join("website.toml"), r#"
stack_name = "acme-site"
environment = "staging"
mode = "static"
package = "@acme/missing"
"#);

    sitestack()
        .arg("synth")
        .arg("--config")
        .arg(dir.path().join("website.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("@acme/missing"));
}

#[test]
fn synth_fails_on_missing_config() {
    sitestack()
        .args(["synth", "--config", "/definitely/not/here/website.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load stack config"));
}

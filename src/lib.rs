//! Declares the hosting infrastructure of a website (CDN distribution, origin
//! bucket, optional server function, DNS records and dashboard widgets) and
//! renders it as a cloudformation template.
//!
//! ```no_run
//! use website_stack::{WebsiteStack, WebsiteStackProps, Environment, Mode, WorkspacePackages};
//!
//! let workspace: WorkspacePackages = [("site", "packages/site")].into_iter().collect();
//! let props = WebsiteStackProps {
//!     environment: Environment::Production,
//!     mode: Mode::Static,
//!     aliases: Some(vec!["www".into()]),
//!     hosted_zone_name: Some("example.com".into()),
//!     package: "site".into(),
//!     runtime: "nodejs20.x".into(),
//!     certificate: None,
//!     hosted_zone: None,
//!     web_acl_id: None,
//! };
//! let site = WebsiteStack::build("site", &props, &workspace, None)?;
//! println!("{}", site.stack().to_json_pretty()?);
//! # Ok::<(), website_stack::StackError>(())
//! ```

pub mod config;
pub mod error;
pub mod resources;
pub mod stack;
pub mod variables;
pub mod website;
pub mod workspace;

pub use config::StackConfig;
pub use error::{StackError, StackResult};
pub use resources::Dashboard;
pub use stack::{Stack, Template};
pub use variables::Variables;
pub use website::{Certificate, Environment, HostedZone, Mode, WebsiteStack, WebsiteStackProps};
pub use workspace::WorkspacePackages;

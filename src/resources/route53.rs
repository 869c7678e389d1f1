use super::*;

/// every cloudfront distribution lives in this hosted zone, it's what
/// alias records targeting a distribution must reference.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";
/// how much of the record name is kept in its logical id.
const LOGICAL_ID_NAME_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Route53RecordSet {
    pub record_type: RecordType,
    pub name: String,
    pub hosted_zone_id: String,
    pub alias_target_dns_name: Value,
    pub alias_target_hosted_zone_id: String,
}

impl Route53RecordSet {
    /// an alias record pointing `name` at a cloudfront distribution.
    pub fn cloudfront_alias(
        record_type: RecordType,
        name: &str,
        hosted_zone_id: &str,
        distribution_logical_id: &str,
    ) -> Self {
        Self {
            record_type,
            name: name.to_string(),
            hosted_zone_id: hosted_zone_id.to_string(),
            alias_target_dns_name: get_att(distribution_logical_id, "DomainName"),
            alias_target_hosted_zone_id: CLOUDFRONT_HOSTED_ZONE_ID.to_string(),
        }
    }

    /// `Record{TYPE}{name}{hash}`. Stripping punctuation from the name can make two
    /// names equal (`a-b.example.com`, `ab.example.com`), the adler32 of the full
    /// name keeps their ids apart.
    pub fn logical_id(&self) -> String {
        let mut name = logical_name(&self.name);
        name.truncate(LOGICAL_ID_NAME_LEN);
        let hash = adler::adler32_slice(self.name.as_bytes());
        format!("Record{}{}{:08x}", self.record_type.as_str(), name, hash)
    }
}

impl CfnResource for Route53RecordSet {
    fn type_string(&self) -> &'static str {
        "AWS::Route53::RecordSet"
    }

    fn properties(&self) -> Value {
        json!({
            "AliasTarget": {
                "DNSName": self.alias_target_dns_name,
                "HostedZoneId": self.alias_target_hosted_zone_id,
            },
            "HostedZoneId": self.hosted_zone_id,
            "Comment": self.name,
            "Name": self.name,
            "Type": self.record_type.as_str(),
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Route53 record must have a name. Example mysubdomain.mywebsite.com".into());
        }
        if self.hosted_zone_id.is_empty() {
            return Err(format!("Route53 record {} must have a hosted zone id", self.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_record_targets_distribution() {
        let record = Route53RecordSet::cloudfront_alias(RecordType::Aaaa, "www.example.com", "Z123", "Distribution");
        assert!(record.validate().is_ok());
        assert_eq!(record.logical_id(), "RecordAAAAwwwexamplecom305205ed");
        let props = record.properties();
        assert_eq!(props["Type"], "AAAA");
        assert_eq!(props["HostedZoneId"], "Z123");
        assert_eq!(props["AliasTarget"]["HostedZoneId"], CLOUDFRONT_HOSTED_ZONE_ID);
        assert_eq!(props["AliasTarget"]["DNSName"], json!({ "Fn::GetAtt": ["Distribution", "DomainName"] }));
    }

    #[test]
    fn names_differing_in_punctuation_get_distinct_ids() {
        let dashed = Route53RecordSet::cloudfront_alias(RecordType::A, "a-b.example.com", "Z123", "Distribution");
        let plain = Route53RecordSet::cloudfront_alias(RecordType::A, "ab.example.com", "Z123", "Distribution");
        assert_eq!(dashed.logical_id(), "RecordAabexamplecom29eb0578");
        assert_eq!(plain.logical_id(), "RecordAabexamplecom2713054b");
        assert!(verify_resource_name(&dashed.logical_id()).is_none());
    }

    #[test]
    fn long_names_keep_ids_within_limits() {
        let name = format!("{}.example.com", "a".repeat(240));
        let record = Route53RecordSet::cloudfront_alias(RecordType::Aaaa, &name, "Z123", "Distribution");
        assert!(verify_resource_name(&record.logical_id()).is_none());
    }

    #[test]
    fn record_needs_name_and_zone() {
        let record = Route53RecordSet::cloudfront_alias(RecordType::A, "", "Z123", "Distribution");
        assert!(record.validate().is_err());
        let record = Route53RecordSet::cloudfront_alias(RecordType::A, "www.example.com", "", "Distribution");
        assert!(record.validate().is_err());
    }
}

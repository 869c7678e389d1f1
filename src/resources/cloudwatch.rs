use super::*;

/// cloudfront publishes its metrics to us-east-1 only.
pub const CLOUDFRONT_METRICS_REGION: &str = "us-east-1";
pub const DASHBOARD_GRID_WIDTH: u32 = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<(String, Value)>,
    pub statistic: String,
    pub period: u32,
    pub label: String,
    /// None means the region the dashboard is deployed in.
    pub region: Option<String>,
}

impl Metric {
    pub fn cloudfront(metric_name: &str, distribution_id: Value, statistic: &str, label: String) -> Self {
        Self {
            namespace: "AWS/CloudFront".into(),
            metric_name: metric_name.into(),
            dimensions: vec![
                ("DistributionId".into(), distribution_id),
                ("Region".into(), Value::String("Global".into())),
            ],
            statistic: statistic.into(),
            period: 300,
            label,
            region: Some(CLOUDFRONT_METRICS_REGION.into()),
        }
    }

    pub fn lambda(metric_name: &str, function_name: Value, statistic: &str, label: String) -> Self {
        Self {
            namespace: "AWS/Lambda".into(),
            metric_name: metric_name.into(),
            dimensions: vec![("FunctionName".into(), function_name)],
            statistic: statistic.into(),
            period: 300,
            label,
            region: None,
        }
    }

    /// dashboard body metric array:
    /// `[namespace, name, dim1, val1, ..., { stat, period, label, region }]`
    fn to_value(&self) -> Value {
        let mut out = vec![
            Value::String(self.namespace.clone()),
            Value::String(self.metric_name.clone()),
        ];
        for (name, value) in &self.dimensions {
            out.push(Value::String(name.clone()));
            out.push(value.clone());
        }
        let mut options = json!({
            "stat": self.statistic,
            "period": self.period,
            "label": self.label,
        });
        if let Some(region) = &self.region {
            options["region"] = Value::String(region.clone());
        }
        out.push(options);
        Value::Array(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphWidget {
    pub title: String,
    pub metrics: Vec<Metric>,
    pub width: u32,
    pub height: u32,
}

impl GraphWidget {
    pub fn new(title: String, metrics: Vec<Metric>) -> Self {
        Self { title, metrics, width: 12, height: 6 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogQueryWidget {
    pub title: String,
    /// the full query including its `SOURCE` clause. May be an intrinsic
    /// when the log group name is only known at deploy time.
    pub query: Value,
    pub width: u32,
    pub height: u32,
}

impl LogQueryWidget {
    pub fn new(title: String, query: Value) -> Self {
        Self { title, query, width: DASHBOARD_GRID_WIDTH, height: 6 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Graph(GraphWidget),
    LogQuery(LogQueryWidget),
}

impl Widget {
    pub fn title(&self) -> &str {
        match self {
            Widget::Graph(g) => &g.title,
            Widget::LogQuery(l) => &l.title,
        }
    }

    fn size(&self) -> (u32, u32) {
        match self {
            Widget::Graph(g) => (g.width, g.height),
            Widget::LogQuery(l) => (l.width, l.height),
        }
    }

    fn to_value(&self, x: u32, y: u32) -> Value {
        let (width, height) = self.size();
        match self {
            Widget::Graph(g) => {
                let metrics: Vec<Value> = g.metrics.iter().map(|m| m.to_value()).collect();
                json!({
                    "type": "metric",
                    "x": x, "y": y, "width": width, "height": height,
                    "properties": {
                        "title": g.title,
                        "view": "timeSeries",
                        "region": get_ref("AWS::Region"),
                        "metrics": metrics,
                    }
                })
            }
            Widget::LogQuery(l) => json!({
                "type": "log",
                "x": x, "y": y, "width": width, "height": height,
                "properties": {
                    "title": l.title,
                    "view": "table",
                    "region": get_ref("AWS::Region"),
                    "query": l.query,
                }
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// leave empty to get a generated name.
    pub name: String,
    pub widgets: Vec<Widget>,
}

impl Dashboard {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), widgets: vec![] }
    }

    pub fn add_widgets<I: IntoIterator<Item = Widget>>(&mut self, widgets: I) {
        self.widgets.extend(widgets);
    }

    /// lays widgets out left to right, wrapping at the grid width.
    fn body(&self) -> Value {
        let mut x = 0;
        let mut y = 0;
        let mut row_height = 0;
        let mut widgets = vec![];
        for widget in &self.widgets {
            let (width, height) = widget.size();
            if x + width > DASHBOARD_GRID_WIDTH {
                x = 0;
                y += row_height;
                row_height = 0;
            }
            widgets.push(widget.to_value(x, y));
            x += width;
            row_height = row_height.max(height);
        }
        json!({ "widgets": widgets })
    }
}

impl CfnResource for Dashboard {
    fn type_string(&self) -> &'static str {
        "AWS::CloudWatch::Dashboard"
    }

    fn properties(&self) -> Value {
        let mut out = json!({ "DashboardBody": render_json_with_intrinsics(&self.body()) });
        if !self.name.is_empty() {
            out["DashboardName"] = Value::String(self.name.clone());
        }
        out
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.len() > 255 {
            return Err(format!("Invalid dashboard name {:?}\nMust be at most 255 characters", self.name));
        }
        if !self.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(format!("Invalid dashboard name {:?}\nMust only contain alphanumerics, dashes and underscores", self.name));
        }
        Ok(())
    }
}

fn placeholder(i: usize) -> String {
    format!("${{Token[{i}]}}")
}

/// swaps every intrinsic in `value` for a placeholder string, collecting the
/// intrinsics in order.
fn extract_intrinsics(value: &Value, found: &mut Vec<Value>) -> Value {
    if is_intrinsic(value) {
        let out = Value::String(placeholder(found.len()));
        found.push(value.clone());
        return out;
    }
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|v| extract_intrinsics(v, found)).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), extract_intrinsics(v, found));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// the parts an intrinsic contributes to the surrounding string. An
/// `Fn::Join` with an empty delimiter is flattened so its literal pieces
/// get json escaped like the rest of the document.
fn splice_parts(intrinsic: &Value, parts: &mut Vec<Value>) {
    if let Some(join) = intrinsic.get("Fn::Join").and_then(Value::as_array) {
        if let (Some(""), Some(Value::Array(items))) = (join.first().and_then(Value::as_str), join.get(1)) {
            for item in items {
                match item {
                    Value::String(s) => push_literal(parts, &escape_json_str(s)),
                    other => splice_parts(other, parts),
                }
            }
            return;
        }
    }
    parts.push(intrinsic.clone());
}

fn escape_json_str(s: &str) -> String {
    let quoted = Value::String(s.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

fn push_literal(parts: &mut Vec<Value>, s: &str) {
    if s.is_empty() {
        return;
    }
    if let Some(Value::String(last)) = parts.last_mut() {
        last.push_str(s);
        return;
    }
    parts.push(Value::String(s.to_string()));
}

/// serializes `value` into a json string. If it contains intrinsics, the
/// result is an `Fn::Join` that cloudformation resolves into that string at
/// deploy time. Intrinsics are assumed to resolve to strings.
pub fn render_json_with_intrinsics(value: &Value) -> Value {
    let mut intrinsics = vec![];
    let replaced = extract_intrinsics(value, &mut intrinsics);
    let rendered = replaced.to_string();
    if intrinsics.is_empty() {
        return Value::String(rendered);
    }
    let mut parts = vec![];
    let mut rest = rendered.as_str();
    for (i, intrinsic) in intrinsics.iter().enumerate() {
        let token = placeholder(i);
        match rest.find(&token) {
            Some(idx) => {
                push_literal(&mut parts, &rest[..idx]);
                splice_parts(intrinsic, &mut parts);
                rest = &rest[idx + token.len()..];
            }
            None => continue,
        }
    }
    push_literal(&mut parts, rest);
    join("", parts)
}

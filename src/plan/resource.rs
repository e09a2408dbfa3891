//! Declared resources and deferred attribute references.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kinds of networking resource a VPC plan declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The VPC itself
    Vpc,
    /// Internet gateway attached to the VPC
    InternetGateway,
    /// One subnet in one availability zone
    Subnet,
    /// Route table shared by a subnet group
    RouteTable,
    /// A single route inside a route table
    Route,
    /// Binds a subnet to a route table
    RouteTableAssociation,
}

impl ResourceKind {
    /// Provider type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "aws:ec2:Vpc",
            ResourceKind::InternetGateway => "aws:ec2:InternetGateway",
            ResourceKind::Subnet => "aws:ec2:Subnet",
            ResourceKind::RouteTable => "aws:ec2:RouteTable",
            ResourceKind::Route => "aws:ec2:Route",
            ResourceKind::RouteTableAssociation => "aws:ec2:RouteTableAssociation",
        }
    }

    /// Prefix used by AWS for identifiers of this kind
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::Subnet => "subnet",
            ResourceKind::RouteTable => "rtb",
            ResourceKind::Route => "r",
            ResourceKind::RouteTableAssociation => "rtbassoc",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A reference to an attribute another resource only gets once it is provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Logical name of the referenced resource
    pub resource: String,
    /// Attribute of that resource, e.g. `id`
    pub attribute: String,
}

impl AttributeRef {
    /// Create a new attribute reference
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Reference to the `id` attribute of `resource`
    pub fn id(resource: impl Into<String>) -> Self {
        Self::new(resource, "id")
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

/// A property value: known at plan time, or deferred until apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// Value fixed at plan time
    Literal(Value),
    /// Value read from another resource once it is provisioned
    Ref(AttributeRef),
}

/// A resource declaration in a network plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique logical name
    pub name: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// Properties in declaration order
    pub properties: IndexMap<String, PropertyValue>,
}

impl Resource {
    /// Create a resource with no properties
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            properties: IndexMap::new(),
        }
    }

    /// Add a literal property
    pub fn with_literal(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .insert(key.into(), PropertyValue::Literal(value.into()));
        self
    }

    /// Add a property resolved from another resource's `id`
    pub fn with_ref(mut self, key: impl Into<String>, resource: impl Into<String>) -> Self {
        self.properties
            .insert(key.into(), PropertyValue::Ref(AttributeRef::id(resource)));
        self
    }

    /// Add a `tags` property
    pub fn with_tags(self, tags: &IndexMap<String, String>) -> Self {
        let tags: serde_json::Map<String, Value> = tags
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.with_literal("tags", Value::Object(tags))
    }

    /// Get a literal property
    pub fn literal(&self, key: &str) -> Option<&Value> {
        match self.properties.get(key) {
            Some(PropertyValue::Literal(value)) => Some(value),
            _ => None,
        }
    }

    /// All deferred references held by this resource
    pub fn references(&self) -> impl Iterator<Item = &AttributeRef> {
        self.properties.values().filter_map(|value| match value {
            PropertyValue::Ref(reference) => Some(reference),
            PropertyValue::Literal(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let subnet = Resource::new("subnet-public-1", ResourceKind::Subnet)
            .with_ref("vpc_id", "vpc")
            .with_literal("cidr_block", "10.0.0.0/28")
            .with_literal("map_public_ip_on_launch", true);

        let keys: Vec<_> = subnet.properties.keys().cloned().collect();
        assert_eq!(keys, vec!["vpc_id", "cidr_block", "map_public_ip_on_launch"]);
        assert_eq!(subnet.literal("cidr_block"), Some(&Value::from("10.0.0.0/28")));
        assert_eq!(subnet.literal("vpc_id"), None);

        let refs: Vec<_> = subnet.references().map(|r| r.to_string()).collect();
        assert_eq!(refs, vec!["vpc.id"]);
    }

    #[test]
    fn test_property_serialization_is_tagged() {
        let json = serde_json::to_value(PropertyValue::Ref(AttributeRef::id("vpc"))).unwrap();
        assert_eq!(json, serde_json::json!({"ref": {"resource": "vpc", "attribute": "id"}}));

        let json = serde_json::to_value(PropertyValue::Literal(Value::from(28))).unwrap();
        assert_eq!(json, serde_json::json!({"literal": 28}));
    }
}

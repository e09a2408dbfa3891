//! Apply phase of the plan/apply pipeline.
//!
//! [`apply`] walks a [`NetworkPlan`] in dependency order. Before a resource
//! is handed to the [`Provisioner`], every [`AttributeRef`] it holds is
//! replaced with the value the referenced resource reported when it was
//! provisioned. The first failure aborts the run; nothing that depends on
//! the failed resource is attempted.
//!
//! The real cloud engine lives outside this crate and plugs in through
//! [`Provisioner`]. [`DryRunProvisioner`] simulates one with deterministic
//! identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::plan::{
    AttributeRef, NetworkPlan, PropertyValue, Resource, ResourceGraph, ResourceKind, VPC,
};

/// A resource with every reference replaced by its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedResource {
    /// Logical name
    pub name: String,
    /// Resource kind
    pub kind: ResourceKind,
    /// Fully resolved properties
    pub properties: IndexMap<String, Value>,
}

/// What the engine reports back for a provisioned resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedResource {
    /// Provider identifier
    pub id: String,
    /// Attributes other resources may reference
    pub attributes: IndexMap<String, Value>,
}

impl ProvisionedResource {
    /// Look up an attribute; `id` always resolves
    pub fn attribute(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return Some(Value::String(self.id.clone()));
        }
        self.attributes.get(name).cloned()
    }
}

/// Adapter to a provisioning engine
#[async_trait::async_trait]
pub trait Provisioner: Send + Sync {
    /// Create or update one resource
    async fn provision(&self, resource: &ResolvedResource) -> Result<ProvisionedResource>;
}

/// Identifiers exported after a successful apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    /// VPC identifier
    pub vpc_id: String,
    /// Public subnet identifiers, in zone order
    pub public_subnet_ids: Vec<String>,
    /// Private subnet identifiers, in zone order
    pub private_subnet_ids: Vec<String>,
    /// Identifier of every resource, in apply order
    pub resources: IndexMap<String, String>,
}

/// Provision every resource of a graph in dependency order.
pub async fn apply_graph(
    graph: &ResourceGraph,
    provisioner: &dyn Provisioner,
) -> Result<IndexMap<String, ProvisionedResource>> {
    let mut provisioned: IndexMap<String, ProvisionedResource> = IndexMap::new();

    for resource in graph.execution_order()? {
        let resolved = resolve(resource, &provisioned)?;
        debug!("Provisioning {} '{}'", resource.kind, resource.name);

        let result = provisioner.provision(&resolved).await.map_err(|e| match e {
            Error::Provisioning { .. } => e,
            other => Error::provisioning(&resource.name, other.to_string()),
        })?;

        info!("Provisioned {} '{}' ({})", resource.kind, resource.name, result.id);
        provisioned.insert(resource.name.clone(), result);
    }

    Ok(provisioned)
}

/// Provision a network plan and collect its exported identifiers.
pub async fn apply(plan: &NetworkPlan, provisioner: &dyn Provisioner) -> Result<ApplyOutcome> {
    let provisioned = apply_graph(&plan.resources, provisioner).await?;

    let id_of = |name: &str| -> Result<String> {
        provisioned
            .get(name)
            .map(|r| r.id.clone())
            .ok_or_else(|| Error::UnresolvedReference {
                resource: plan.name.clone(),
                target: name.to_string(),
                attribute: "id".to_string(),
            })
    };

    Ok(ApplyOutcome {
        vpc_id: id_of(VPC)?,
        public_subnet_ids: plan
            .public_subnets
            .iter()
            .map(|s| id_of(&s.name))
            .collect::<Result<_>>()?,
        private_subnet_ids: plan
            .private_subnets
            .iter()
            .map(|s| id_of(&s.name))
            .collect::<Result<_>>()?,
        resources: provisioned
            .iter()
            .map(|(name, r)| (name.clone(), r.id.clone()))
            .collect(),
    })
}

fn resolve(
    resource: &Resource,
    provisioned: &IndexMap<String, ProvisionedResource>,
) -> Result<ResolvedResource> {
    let lookup = |reference: &AttributeRef| -> Result<Value> {
        provisioned
            .get(&reference.resource)
            .and_then(|r| r.attribute(&reference.attribute))
            .ok_or_else(|| Error::UnresolvedReference {
                resource: resource.name.clone(),
                target: reference.resource.clone(),
                attribute: reference.attribute.clone(),
            })
    };

    let properties = resource
        .properties
        .iter()
        .map(|(key, value)| {
            let value = match value {
                PropertyValue::Literal(v) => v.clone(),
                PropertyValue::Ref(reference) => lookup(reference)?,
            };
            Ok((key.clone(), value))
        })
        .collect::<Result<_>>()?;

    Ok(ResolvedResource {
        name: resource.name.clone(),
        kind: resource.kind,
        properties,
    })
}

/// Simulated engine handing out sequential identifiers like `subnet-00000003`
#[derive(Debug, Default)]
pub struct DryRunProvisioner {
    counter: AtomicU64,
    history: Mutex<Vec<ResolvedResource>>,
}

impl DryRunProvisioner {
    /// Create a new dry-run provisioner
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources seen so far, in order
    pub fn provisioned(&self) -> Vec<ResolvedResource> {
        self.history.lock().clone()
    }
}

#[async_trait::async_trait]
impl Provisioner for DryRunProvisioner {
    async fn provision(&self, resource: &ResolvedResource) -> Result<ProvisionedResource> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("{}-{:08x}", resource.kind.id_prefix(), n);
        debug!("Dry run: {} '{}' -> {}", resource.kind, resource.name, id);
        trace!("Dry run properties for '{}': {:?}", resource.name, resource.properties);

        self.history.lock().push(resource.clone());

        Ok(ProvisionedResource {
            id,
            attributes: resource.properties.clone(),
        })
    }
}

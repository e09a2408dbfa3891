//! Network planning.
//!
//! Planning is the first half of a two-phase pipeline. The planner turns
//! [`VpcSettings`] into a [`NetworkPlan`]: a [`ResourceGraph`] declaring the
//! VPC, its internet gateway, public and private subnets, route tables and
//! associations. Values that only exist once a resource is provisioned (the
//! VPC id, subnet ids, ...) are recorded as [`AttributeRef`]s and resolved
//! later by [`crate::apply`].
//!
//! ## Example
//!
//! ```
//! use vpcplan::plan::{NetworkPlanner, VpcSettings};
//!
//! let settings = VpcSettings {
//!     availability_zones: vec!["us-east-1a".into(), "us-east-1b".into()],
//!     ..VpcSettings::default()
//! };
//! let plan = NetworkPlanner::new(settings).plan().unwrap();
//!
//! assert_eq!(plan.public_subnets[1].cidr_block.to_string(), "10.0.1.0/28");
//! assert_eq!(plan.private_subnets[0].cidr_block.to_string(), "10.0.2.0/28");
//! ```

pub mod graph;
pub mod resource;
pub mod settings;

pub use graph::{DependencyType, ResourceGraph};
pub use resource::{AttributeRef, PropertyValue, Resource, ResourceKind};
pub use settings::VpcSettings;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::network::{NetworkBlock, SubnetGroup};

/// Logical name of the VPC resource
pub const VPC: &str = "vpc";
/// Logical name of the internet gateway resource
pub const INTERNET_GATEWAY: &str = "internet-gateway";

/// One subnet chosen by the planner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSubnet {
    /// Logical resource name
    pub name: String,
    /// Subnet group
    pub group: SubnetGroup,
    /// Availability zone
    pub zone: String,
    /// One-based position inside the group
    pub position: usize,
    /// Allocation index
    pub index: u32,
    /// Allocated block
    pub cidr_block: NetworkBlock,
}

/// The result of planning one VPC
#[derive(Debug, Clone, Serialize)]
pub struct NetworkPlan {
    /// VPC name
    pub name: String,
    /// VPC block
    pub vpc_block: NetworkBlock,
    /// Public subnets, in zone order
    pub public_subnets: Vec<PlannedSubnet>,
    /// Private subnets, in zone order
    pub private_subnets: Vec<PlannedSubnet>,
    /// Every declared resource
    pub resources: ResourceGraph,
}

impl NetworkPlan {
    /// All subnets, public first
    pub fn subnets(&self) -> impl Iterator<Item = &PlannedSubnet> {
        self.public_subnets.iter().chain(self.private_subnets.iter())
    }

    /// Subnets of one group
    pub fn group(&self, group: SubnetGroup) -> &[PlannedSubnet] {
        match group {
            SubnetGroup::Public => &self.public_subnets,
            SubnetGroup::Private => &self.private_subnets,
        }
    }
}

/// Builds a [`NetworkPlan`] from [`VpcSettings`]
#[derive(Debug, Clone)]
pub struct NetworkPlanner {
    settings: VpcSettings,
}

impl NetworkPlanner {
    /// Create a planner for the given settings
    pub fn new(settings: VpcSettings) -> Self {
        Self { settings }
    }

    /// The settings being planned
    pub fn settings(&self) -> &VpcSettings {
        &self.settings
    }

    /// Declare the full VPC network.
    ///
    /// Allocation failure of any subnet aborts the whole plan.
    pub fn plan(&self) -> Result<NetworkPlan> {
        let settings = &self.settings;
        settings.validate()?;

        let vpc_block = settings.base_block()?;
        let zones = settings.zones();

        if zones.is_empty() {
            warn!(
                "No availability zones configured for VPC '{}'; no subnets will be declared",
                settings.name
            );
        } else if settings.availability_zones.len() > zones.len() {
            warn!(
                "VPC '{}' lists {} availability zones, using the first {}",
                settings.name,
                settings.availability_zones.len(),
                zones.len()
            );
        }

        let public_subnets = self.allocate_group(SubnetGroup::Public, zones)?;
        let private_subnets = self.allocate_group(SubnetGroup::Private, zones)?;
        check_subnets(&vpc_block, public_subnets.iter().chain(private_subnets.iter()))?;

        let mut resources = ResourceGraph::new();
        self.declare_vpc(&mut resources)?;

        for subnet in public_subnets.iter().chain(private_subnets.iter()) {
            resources.add_resource(
                Resource::new(subnet.name.clone(), ResourceKind::Subnet)
                    .with_ref("vpc_id", VPC)
                    .with_literal("availability_zone", subnet.zone.clone())
                    .with_literal("cidr_block", subnet.cidr_block.to_string())
                    .with_literal(
                        "map_public_ip_on_launch",
                        subnet.group.map_public_ip_on_launch(),
                    )
                    .with_tags(&self.tags(format!(
                        "{}-{}-{}",
                        settings.name, subnet.group, subnet.position
                    ))),
            )?;
        }

        self.declare_routing(&mut resources, SubnetGroup::Public, &public_subnets)?;
        self.declare_routing(&mut resources, SubnetGroup::Private, &private_subnets)?;

        debug!(
            "Planned VPC '{}' ({}): {} public, {} private subnets, {} resources",
            settings.name,
            vpc_block,
            public_subnets.len(),
            private_subnets.len(),
            resources.len()
        );

        Ok(NetworkPlan {
            name: settings.name.clone(),
            vpc_block,
            public_subnets,
            private_subnets,
            resources,
        })
    }

    fn allocate_group(&self, group: SubnetGroup, zones: &[String]) -> Result<Vec<PlannedSubnet>> {
        let allocator = self.settings.allocator_for(group)?;
        let mut subnets = Vec::with_capacity(zones.len());

        for (i, zone) in zones.iter().enumerate() {
            let position = i + 1;
            let index = self.settings.layout.index_for(group, i, zones.len());

            let cidr_block = allocator
                .allocate(index)
                .map_err(|source| Error::SubnetAllocation {
                    group,
                    position,
                    zone: zone.clone(),
                    index,
                    source: Box::new(source),
                })?;

            debug!(
                "Allocated {} subnet {} in {}: index {} -> {}",
                group, position, zone, index, cidr_block
            );

            subnets.push(PlannedSubnet {
                name: format!("subnet-{}-{}", group, position),
                group,
                zone: zone.clone(),
                position,
                index,
                cidr_block,
            });
        }

        Ok(subnets)
    }

    fn declare_vpc(&self, resources: &mut ResourceGraph) -> Result<()> {
        let settings = &self.settings;

        resources.add_resource(
            Resource::new(VPC, ResourceKind::Vpc)
                .with_literal("cidr_block", settings.cidr_block.clone())
                .with_literal("enable_dns_support", settings.enable_dns_support)
                .with_literal("enable_dns_hostnames", settings.enable_dns_hostnames)
                .with_tags(&self.tags(settings.name.clone())),
        )?;

        resources.add_resource(
            Resource::new(INTERNET_GATEWAY, ResourceKind::InternetGateway)
                .with_ref("vpc_id", VPC)
                .with_tags(&self.tags(format!("{}-igw", settings.name))),
        )?;

        Ok(())
    }

    fn declare_routing(
        &self,
        resources: &mut ResourceGraph,
        group: SubnetGroup,
        subnets: &[PlannedSubnet],
    ) -> Result<()> {
        let table = format!("route-table-{}", group);

        resources.add_resource(
            Resource::new(table.clone(), ResourceKind::RouteTable)
                .with_ref("vpc_id", VPC)
                .with_tags(&self.tags(format!("{}-{}", self.settings.name, group))),
        )?;

        if group == SubnetGroup::Public {
            resources.add_resource(
                Resource::new("route-public-default", ResourceKind::Route)
                    .with_ref("route_table_id", table.clone())
                    .with_literal("destination_cidr_block", "0.0.0.0/0")
                    .with_ref("gateway_id", INTERNET_GATEWAY),
            )?;
        }

        for subnet in subnets {
            resources.add_resource(
                Resource::new(
                    format!("subnet-assoc-{}-{}", group, subnet.position),
                    ResourceKind::RouteTableAssociation,
                )
                .with_ref("subnet_id", subnet.name.clone())
                .with_ref("route_table_id", table.clone()),
            )?;
        }

        Ok(())
    }

    fn tags(&self, name: String) -> IndexMap<String, String> {
        let mut tags = IndexMap::new();
        tags.insert("Name".to_string(), name);
        for (k, v) in &self.settings.tags {
            if k != "Name" {
                tags.insert(k.clone(), v.clone());
            }
        }
        tags
    }
}

/// Plan a VPC in one call
pub fn plan_network(settings: &VpcSettings) -> Result<NetworkPlan> {
    NetworkPlanner::new(settings.clone()).plan()
}

/// Every subnet must sit inside the VPC and share no address with another subnet.
fn check_subnets<'a>(
    vpc: &NetworkBlock,
    subnets: impl Iterator<Item = &'a PlannedSubnet>,
) -> Result<()> {
    let subnets: Vec<_> = subnets.collect();

    for (i, subnet) in subnets.iter().enumerate() {
        if !vpc.contains(&subnet.cidr_block) {
            return Err(Error::SubnetOutsideVpc {
                subnet: subnet.name.clone(),
                block: subnet.cidr_block,
                vpc: *vpc,
            });
        }

        for other in &subnets[i + 1..] {
            if subnet.cidr_block.overlaps(&other.cidr_block) {
                return Err(Error::OverlappingSubnets {
                    first: subnet.name.clone(),
                    first_block: subnet.cidr_block,
                    second: other.name.clone(),
                    second_block: other.cidr_block,
                });
            }
        }
    }

    Ok(())
}

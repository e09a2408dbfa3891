//! Integration tests for VPC network planning
//!
//! These tests verify:
//! - Subnet allocation per group and layout
//! - Zone capping and empty zone lists
//! - Failure propagation with group context
//! - The declared resource graph

use pretty_assertions::assert_eq;
use vpcplan::network::{AllocationStrategy, SubnetGroup, SubnetLayout};
use vpcplan::plan::{
    plan_network, NetworkPlan, NetworkPlanner, PropertyValue, ResourceKind, VpcSettings,
    INTERNET_GATEWAY, VPC,
};
use vpcplan::Error;

fn settings(zones: &[&str]) -> VpcSettings {
    VpcSettings {
        name: "demo".to_string(),
        availability_zones: zones.iter().map(|z| z.to_string()).collect(),
        ..VpcSettings::default()
    }
}

fn cidrs(plan: &NetworkPlan, group: SubnetGroup) -> Vec<String> {
    plan.group(group)
        .iter()
        .map(|s| s.cidr_block.to_string())
        .collect()
}

// ============================================================================
// Subnet Allocation
// ============================================================================

#[test]
fn test_three_zones_produce_six_disjoint_subnets() {
    let plan = plan_network(&settings(&["us-east-1a", "us-east-1b", "us-east-1c"])).unwrap();

    assert_eq!(
        cidrs(&plan, SubnetGroup::Public),
        vec!["10.0.0.0/28", "10.0.1.0/28", "10.0.2.0/28"]
    );
    assert_eq!(
        cidrs(&plan, SubnetGroup::Private),
        vec!["10.0.3.0/28", "10.0.4.0/28", "10.0.5.0/28"]
    );

    let all: Vec<_> = plan.subnets().collect();
    assert_eq!(all.len(), 6);
    for (i, a) in all.iter().enumerate() {
        assert!(plan.vpc_block.contains(&a.cidr_block));
        for b in &all[i + 1..] {
            assert!(!a.cidr_block.overlaps(&b.cidr_block));
        }
    }
}

#[test]
fn test_subnets_follow_zone_order() {
    let plan = plan_network(&settings(&["eu-west-1b", "eu-west-1a"])).unwrap();
    let zones: Vec<_> = plan.public_subnets.iter().map(|s| s.zone.as_str()).collect();
    assert_eq!(zones, vec!["eu-west-1b", "eu-west-1a"]);
    assert_eq!(plan.public_subnets[0].position, 1);
    assert_eq!(plan.private_subnets[1].index, 3);
}

#[test]
fn test_zone_list_is_capped() {
    let plan = plan_network(&settings(&["a", "b", "c", "d", "e"])).unwrap();
    assert_eq!(plan.public_subnets.len(), 3);
    assert_eq!(plan.private_subnets.len(), 3);
    assert_eq!(plan.private_subnets[0].cidr_block.to_string(), "10.0.3.0/28");
}

#[test]
fn test_raised_zone_cap() {
    let plan = plan_network(&VpcSettings {
        max_zones: 5,
        ..settings(&["a", "b", "c", "d", "e"])
    })
    .unwrap();
    assert_eq!(plan.private_subnets[0].cidr_block.to_string(), "10.0.5.0/28");
    assert_eq!(plan.private_subnets[4].cidr_block.to_string(), "10.0.9.0/28");
}

#[test]
fn test_empty_zone_list_is_not_an_error() {
    let plan = plan_network(&settings(&[])).unwrap();
    assert_eq!(plan.subnets().count(), 0);
    assert!(plan.resources.get(VPC).is_some());
    assert!(plan.resources.get(INTERNET_GATEWAY).is_some());
}

#[test]
fn test_interleaved_layout() {
    let plan = plan_network(&VpcSettings {
        layout: SubnetLayout::Interleaved,
        ..settings(&["a", "b", "c"])
    })
    .unwrap();
    assert_eq!(
        cidrs(&plan, SubnetGroup::Public),
        vec!["10.0.0.0/28", "10.0.2.0/28", "10.0.4.0/28"]
    );
    assert_eq!(
        cidrs(&plan, SubnetGroup::Private),
        vec!["10.0.1.0/28", "10.0.3.0/28", "10.0.5.0/28"]
    );
}

#[test]
fn test_bitwise_strategy_plan() {
    let plan = plan_network(&VpcSettings {
        cidr_block: "172.31.0.0/16".to_string(),
        subnet_mask: 20,
        strategy: AllocationStrategy::Bitwise,
        ..settings(&["a", "b", "c"])
    })
    .unwrap();
    assert_eq!(
        cidrs(&plan, SubnetGroup::Private),
        vec!["172.31.48.0/20", "172.31.64.0/20", "172.31.80.0/20"]
    );
}

#[test]
fn test_grouped_layout_reproduces_per_group_blocks() {
    let plan = plan_network(&VpcSettings {
        layout: SubnetLayout::Grouped,
        ..settings(&["us-east-1a", "us-east-1b", "us-east-1c"])
    })
    .unwrap();

    assert_eq!(
        cidrs(&plan, SubnetGroup::Public),
        vec!["10.0.1.0/28", "10.0.1.16/28", "10.0.1.32/28"]
    );
    assert_eq!(
        cidrs(&plan, SubnetGroup::Private),
        vec!["10.0.2.0/28", "10.0.2.16/28", "10.0.2.32/28"]
    );
    assert_eq!(plan.private_subnets[0].zone, "us-east-1a");
    assert_eq!(plan.private_subnets[0].index, 0);
}

#[test]
fn test_grouped_layout_custom_blocks() {
    let plan = plan_network(&VpcSettings {
        layout: SubnetLayout::Grouped,
        public_cidr_block: "10.0.100.0/24".to_string(),
        private_cidr_block: "10.0.200.0/23".to_string(),
        subnet_mask: 26,
        ..settings(&["a", "b"])
    })
    .unwrap();

    assert_eq!(
        cidrs(&plan, SubnetGroup::Public),
        vec!["10.0.100.0/26", "10.0.100.64/26"]
    );
    assert_eq!(
        cidrs(&plan, SubnetGroup::Private),
        vec!["10.0.200.0/26", "10.0.200.64/26"]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_grouped_layout_exhausts_per_group() {
    let zones: Vec<String> = (0..17).map(|i| format!("zone-{}", i)).collect();
    let zone_refs: Vec<&str> = zones.iter().map(String::as_str).collect();

    let fits = plan_network(&VpcSettings {
        layout: SubnetLayout::Grouped,
        max_zones: 16,
        ..settings(&zone_refs)
    })
    .unwrap();
    assert_eq!(fits.public_subnets[15].cidr_block.to_string(), "10.0.1.240/28");

    let err = plan_network(&VpcSettings {
        layout: SubnetLayout::Grouped,
        max_zones: 17,
        ..settings(&zone_refs)
    })
    .unwrap_err();

    assert!(err.is_exhausted());
    match err {
        Error::SubnetAllocation {
            group,
            position,
            index,
            ..
        } => {
            assert_eq!(group, SubnetGroup::Public);
            assert_eq!(position, 17);
            assert_eq!(index, 16);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_exhaustion_aborts_the_plan() {
    let err = plan_network(&VpcSettings {
        cidr_block: "10.0.253.0/16".to_string(),
        ..settings(&["a", "b", "c"])
    })
    .unwrap_err();

    assert!(err.is_exhausted());
    match err {
        Error::SubnetAllocation {
            group,
            position,
            zone,
            index,
            ..
        } => {
            assert_eq!(group, SubnetGroup::Private);
            assert_eq!(position, 1);
            assert_eq!(zone, "a");
            assert_eq!(index, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_invalid_settings() {
    let err = plan_network(&VpcSettings {
        cidr_block: "not-a-cidr".to_string(),
        ..settings(&["a"])
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidCidr { .. }));

    let err = plan_network(&VpcSettings {
        name: String::new(),
        ..settings(&["a"])
    })
    .unwrap_err();
    assert!(matches!(err, Error::InvalidSettings(_)));
}

// ============================================================================
// Resource Graph
// ============================================================================

#[test]
fn test_resource_graph_shape() {
    let plan = NetworkPlanner::new(settings(&["a", "b"])).plan().unwrap();
    let graph = &plan.resources;

    assert_eq!(graph.resources_of_kind(ResourceKind::Subnet).count(), 4);
    assert_eq!(graph.resources_of_kind(ResourceKind::RouteTable).count(), 2);
    assert_eq!(graph.resources_of_kind(ResourceKind::Route).count(), 1);
    assert_eq!(
        graph
            .resources_of_kind(ResourceKind::RouteTableAssociation)
            .count(),
        4
    );

    let order = graph.execution_order().unwrap();
    assert_eq!(order[0].name, VPC);

    // Every subnet depends on the VPC only
    for subnet in graph.resources_of_kind(ResourceKind::Subnet) {
        assert_eq!(graph.dependencies_of(&subnet.name), vec![VPC]);
    }

    // Everything hangs off the VPC
    assert_eq!(graph.dependents_of(VPC).len(), graph.len() - 1);
}

#[test]
fn test_subnet_properties() {
    let plan = plan_network(&settings(&["us-east-1a"])).unwrap();
    let public = plan.resources.get("subnet-public-1").unwrap();
    let private = plan.resources.get("subnet-private-1").unwrap();

    assert_eq!(
        public.properties.get("vpc_id"),
        Some(&PropertyValue::Ref(vpcplan::plan::AttributeRef::id(VPC)))
    );
    assert_eq!(public.literal("map_public_ip_on_launch"), Some(&true.into()));
    assert_eq!(private.literal("map_public_ip_on_launch"), Some(&false.into()));
    assert_eq!(private.literal("availability_zone"), Some(&"us-east-1a".into()));
    assert_eq!(private.literal("cidr_block"), Some(&"10.0.1.0/28".into()));
}

#[test]
fn test_plan_serializes_to_json() {
    let plan = plan_network(&settings(&["a"])).unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["vpc_block"], "10.0.0.0/16");
    assert_eq!(json["public_subnets"][0]["cidr_block"], "10.0.0.0/28");
    assert_eq!(json["private_subnets"][0]["group"], "private");
    assert_eq!(json["resources"][0]["name"], "vpc");
    assert_eq!(json["resources"][1]["depends_on"], serde_json::json!(["vpc"]));
}

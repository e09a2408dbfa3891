//! VPC settings consumed by the network planner.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::{AllocationStrategy, Allocator, NetworkBlock, SubnetGroup, SubnetLayout};

/// Desired shape of one VPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpcSettings {
    /// VPC name, used for the Name tag
    pub name: String,

    /// Base CIDR block of the VPC
    pub cidr_block: String,

    /// Availability zones to spread subnets across
    pub availability_zones: Vec<String>,

    /// Prefix length of every subnet
    pub subnet_mask: u8,

    /// Maximum number of zones used, extra zones are ignored
    pub max_zones: usize,

    /// Public/private index layout
    pub layout: SubnetLayout,

    /// Block public subnets are carved from with the grouped layout
    pub public_cidr_block: String,

    /// Block private subnets are carved from with the grouped layout
    pub private_cidr_block: String,

    /// CIDR allocation strategy
    pub strategy: AllocationStrategy,

    /// Enable DNS resolution in the VPC
    pub enable_dns_support: bool,

    /// Enable DNS hostnames in the VPC
    pub enable_dns_hostnames: bool,

    /// Extra tags applied to every resource
    pub tags: IndexMap<String, String>,
}

impl Default for VpcSettings {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            availability_zones: vec![],
            subnet_mask: 28,
            max_zones: 3,
            layout: SubnetLayout::default(),
            public_cidr_block: "10.0.1.0/24".to_string(),
            private_cidr_block: "10.0.2.0/24".to_string(),
            strategy: AllocationStrategy::default(),
            enable_dns_support: true,
            enable_dns_hostnames: true,
            tags: IndexMap::new(),
        }
    }
}

impl VpcSettings {
    /// Parse the VPC base block
    pub fn base_block(&self) -> Result<NetworkBlock> {
        self.cidr_block.parse()
    }

    /// Zones actually used: the first `max_zones` configured zones
    pub fn zones(&self) -> &[String] {
        let count = self.availability_zones.len().min(self.max_zones);
        &self.availability_zones[..count]
    }

    /// Build the allocator these settings describe
    pub fn allocator(&self) -> Result<Allocator> {
        Ok(Allocator::new(self.base_block()?, self.subnet_mask)?.with_strategy(self.strategy))
    }

    /// Parse the block one group is carved from under the grouped layout
    pub fn group_block(&self, group: SubnetGroup) -> Result<NetworkBlock> {
        match group {
            SubnetGroup::Public => self.public_cidr_block.parse(),
            SubnetGroup::Private => self.private_cidr_block.parse(),
        }
    }

    /// Allocator for one subnet group.
    ///
    /// Shared layouts hand out the VPC-wide allocator. The grouped layout
    /// splits the group's own block bitwise, so `10.0.1.0/24` with a /28
    /// mask yields `10.0.1.0/28`, `10.0.1.16/28`, ...
    pub fn allocator_for(&self, group: SubnetGroup) -> Result<Allocator> {
        if self.layout.shares_index_space() {
            return self.allocator();
        }
        Ok(Allocator::new(self.group_block(group)?, self.subnet_mask)?
            .with_strategy(AllocationStrategy::Bitwise))
    }

    /// Check the settings for errors the planner cannot recover from
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSettings("VPC name must not be empty".to_string()));
        }

        if self.max_zones == 0 {
            return Err(Error::InvalidSettings(
                "max_zones must be at least 1".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for zone in &self.availability_zones {
            if zone.trim().is_empty() {
                return Err(Error::InvalidSettings(
                    "availability zone names must not be empty".to_string(),
                ));
            }
            if !seen.insert(zone.as_str()) {
                return Err(Error::InvalidSettings(format!(
                    "availability zone '{}' is listed more than once",
                    zone
                )));
            }
        }

        let vpc = self.base_block()?;
        self.allocator()?;

        if !self.layout.shares_index_space() {
            let public = self.group_block(SubnetGroup::Public)?;
            let private = self.group_block(SubnetGroup::Private)?;

            for (group, block) in [(SubnetGroup::Public, public), (SubnetGroup::Private, private)] {
                if !vpc.contains(&block) {
                    return Err(Error::InvalidSettings(format!(
                        "{} block {} lies outside VPC block {}",
                        group, block, vpc
                    )));
                }
                self.allocator_for(group)?;
            }

            if public.overlaps(&private) {
                return Err(Error::InvalidSettings(format!(
                    "public block {} overlaps private block {}",
                    public, private
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let settings = VpcSettings::default();
        assert_eq!(settings.cidr_block, "10.0.0.0/16");
        assert_eq!(settings.subnet_mask, 28);
        assert_eq!(settings.max_zones, 3);
        assert!(settings.enable_dns_support);
        assert!(settings.enable_dns_hostnames);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zones_are_capped() {
        let settings = VpcSettings {
            availability_zones: zones(&["a", "b", "c", "d", "e"]),
            ..VpcSettings::default()
        };
        assert_eq!(settings.zones(), &zones(&["a", "b", "c"])[..]);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let settings = VpcSettings {
            availability_zones: zones(&["a", "a"]),
            ..VpcSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn test_validate_rejects_bad_block_and_mask() {
        let bad_block = VpcSettings {
            cidr_block: "10.0.0.0".to_string(),
            ..VpcSettings::default()
        };
        assert!(matches!(bad_block.validate(), Err(Error::InvalidCidr { .. })));

        let wide_mask = VpcSettings {
            subnet_mask: 12,
            ..VpcSettings::default()
        };
        assert!(matches!(
            wide_mask.validate(),
            Err(Error::MaskWiderThanBlock { .. })
        ));
    }

    #[test]
    fn test_grouped_allocators_use_group_blocks() {
        let settings = VpcSettings {
            layout: SubnetLayout::Grouped,
            ..VpcSettings::default()
        };
        assert!(settings.validate().is_ok());

        let public = settings.allocator_for(SubnetGroup::Public).unwrap();
        assert_eq!(public.base().to_string(), "10.0.1.0/24");
        assert_eq!(public.strategy(), AllocationStrategy::Bitwise);
        assert_eq!(public.capacity(), 16);
        assert_eq!(public.allocate(1).unwrap().to_string(), "10.0.1.16/28");

        let private = settings.allocator_for(SubnetGroup::Private).unwrap();
        assert_eq!(private.allocate(0).unwrap().to_string(), "10.0.2.0/28");
    }

    #[test]
    fn test_shared_layout_ignores_group_blocks() {
        let settings = VpcSettings {
            public_cidr_block: "bogus".to_string(),
            ..VpcSettings::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.allocator_for(SubnetGroup::Private).unwrap(),
            settings.allocator().unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_group_blocks() {
        let outside = VpcSettings {
            layout: SubnetLayout::Grouped,
            public_cidr_block: "10.1.1.0/24".to_string(),
            ..VpcSettings::default()
        };
        assert!(matches!(outside.validate(), Err(Error::InvalidSettings(_))));

        let overlapping = VpcSettings {
            layout: SubnetLayout::Grouped,
            private_cidr_block: "10.0.1.128/25".to_string(),
            ..VpcSettings::default()
        };
        assert!(matches!(overlapping.validate(), Err(Error::InvalidSettings(_))));

        let wide_mask = VpcSettings {
            layout: SubnetLayout::Grouped,
            subnet_mask: 20,
            ..VpcSettings::default()
        };
        assert!(matches!(
            wide_mask.validate(),
            Err(Error::MaskWiderThanBlock { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_zones_cap() {
        let settings = VpcSettings {
            max_zones: 0,
            ..VpcSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}

//! IPv4 CIDR arithmetic for cloud-config subnets

use crate::error::{CloudConfigError, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Size of the static IP block carved out below the broadcast address
const STATIC_BLOCK: u32 = 65;

/// An IPv4 network block such as `10.0.16.0/20`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cidr {
    network: u32,
    prefix: u8,
}

/// Address ranges BOSH needs for one manual-network subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetRanges {
    pub range: String,
    pub gateway: String,
    pub reserved: Vec<String>,
    pub static_ips: Vec<String>,
}

impl Cidr {
    /// The `/20` used for zone `index` (zero based): `10.0.16.0/20`, `10.0.32.0/20`, ...
    pub fn for_zone(index: usize) -> Result<Self> {
        format!("10.0.{}.0/20", 16 * (index + 1)).parse()
    }

    fn mask(&self) -> u32 {
        u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0)
    }

    /// Network address
    pub fn first(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// Broadcast address
    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network | !self.mask())
    }

    fn from_first(&self, n: u32) -> Ipv4Addr {
        Ipv4Addr::from(self.network.wrapping_add(n))
    }

    fn from_last(&self, n: u32) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.last()).wrapping_sub(n))
    }

    /// Gateway is the first usable address; the next two and the broadcast
    /// address are reserved; the block just below the broadcast address is static.
    pub fn subnet_ranges(&self) -> SubnetRanges {
        SubnetRanges {
            range: self.to_string(),
            gateway: self.from_first(1).to_string(),
            reserved: vec![
                format!("{}-{}", self.from_first(2), self.from_first(3)),
                self.last().to_string(),
            ],
            static_ips: vec![format!(
                "{}-{}",
                self.from_last(STATIC_BLOCK),
                self.from_last(1)
            )],
        }
    }
}

impl FromStr for Cidr {
    type Err = CloudConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CloudConfigError::InvalidCidr(s.to_string());

        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        if prefix > 32 {
            return Err(invalid());
        }

        let mut cidr = Cidr { network: 0, prefix };
        cidr.network = u32::from(addr) & cidr.mask();
        Ok(cidr)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first(), self.prefix)
    }
}

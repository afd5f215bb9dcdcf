//! IPv4 helpers used by access-control code: classification, integer
//! conversion in network byte order, and CIDR arithmetic.

use std::net::Ipv4Addr;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetError {
    #[error("prefix length {0} is out of range (0-32)")]
    PrefixOutOfRange(u8),
}

/// True for RFC 1918 private, loopback and link-local addresses.
pub fn is_private(addr: Ipv4Addr) -> bool {
    addr.is_private() || addr.is_loopback() || addr.is_link_local()
}

/// The address as an integer whose most significant byte is the first octet.
#[inline]
pub fn to_u32(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

#[inline]
pub fn from_u32(bits: u32) -> Ipv4Addr {
    Ipv4Addr::from(bits)
}

/// Same bit pattern as `to_u32`, reinterpreted as signed.
#[inline]
pub fn to_i32(addr: Ipv4Addr) -> i32 {
    to_u32(addr) as i32
}

#[inline]
pub fn from_i32(bits: i32) -> Ipv4Addr {
    from_u32(bits as u32)
}

/// Netmask for a prefix length, e.g. `/24` is `255.255.255.0`.
pub fn cidr_mask(prefix: u8) -> Result<Ipv4Addr, NetError> {
    Ok(from_u32(mask_bits(prefix)?))
}

/// Inclusive lowest and highest address of `addr/prefix`.
pub fn cidr_range(addr: Ipv4Addr, prefix: u8) -> Result<(Ipv4Addr, Ipv4Addr), NetError> {
    let mask = mask_bits(prefix)?;
    let low = to_u32(addr) & mask;
    Ok((from_u32(low), from_u32(low | !mask)))
}

fn mask_bits(prefix: u8) -> Result<u32, NetError> {
    match prefix {
        0 => Ok(0),
        1..=32 => Ok(u32::MAX << (32 - u32::from(prefix))),
        _ => Err(NetError::PrefixOutOfRange(prefix)),
    }
}

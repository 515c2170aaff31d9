//! Service and port definitions from the device inventory.

/// Transport protocol of a service port entry.
///
/// Variant order fixes the protocol order in compressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Proto {
    Tcp,
    Udp,
    UdpLite,
    Sctp,
}

impl Proto {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Proto::Tcp => "tcp",
            Proto::Udp => "udp",
            Proto::UdpLite => "udplite",
            Proto::Sctp => "sctp",
        }
    }
}

/// Single port or inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpec {
    Single(u16),
    Range(u16, u16),
}

impl PortSpec {
    /// Parse `"80"` or `"7000-7009"`. Reversed or malformed ranges
    /// yield `None`.
    pub fn parse(token: &str) -> Option<PortSpec> {
        match token.split_once('-') {
            None => token.parse().ok().map(PortSpec::Single),
            Some((start, end)) => {
                let start: u16 = start.parse().ok()?;
                let end: u16 = end.parse().ok()?;
                (start <= end).then_some(PortSpec::Range(start, end))
            }
        }
    }

    /// Every port covered by this spec, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        match *self {
            PortSpec::Single(port) => port..=port,
            PortSpec::Range(start, end) => start..=end,
        }
    }
}

/// One protocol/ports row of a service definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortEntry {
    /// Transport protocol
    pub proto: Proto,
    /// Port or inclusive range
    pub ports: PortSpec,
}

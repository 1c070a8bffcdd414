//! # Connectors
//!
//! A connector is a tagged socket on a part. Growth happens by attaching
//! an *inbound* connector of a new part onto an *outbound* connector that
//! is still open in the level.
//!
//! ## Matching Rule
//!
//! Two connectors are compatible when they sit on different parts, share
//! a tag, and one of them allows outbound while the other allows inbound.

use labyrinth_shared::Pose;

/// Index of a connector within its owning prototype.
pub type ConnectorId = usize;

/// A labeled socket on a part prototype.
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    /// Matching tag. Only equal tags can join.
    pub tag: String,
    /// Open sockets of this kind grow new parts.
    pub allow_outbound: bool,
    /// A new part may attach through this socket.
    pub allow_inbound: bool,
    /// Spin the attached part to a random angle about the socket's forward axis.
    pub random_rotation: bool,
    /// Pose relative to the owning part. Forward (`+Z`) points out of the part.
    pub local_pose: Pose,
    /// Position in the owning prototype's connector list.
    ///
    /// Assigned when the prototype is built.
    pub id: ConnectorId,
}

impl Connector {
    /// Creates a two-way connector.
    #[must_use]
    pub fn new(tag: impl Into<String>, local_pose: Pose) -> Self {
        Self {
            tag: tag.into(),
            allow_outbound: true,
            allow_inbound: true,
            random_rotation: false,
            local_pose,
            id: 0,
        }
    }

    /// Restricts the connector to growing new parts.
    #[must_use]
    pub fn outbound_only(mut self) -> Self {
        self.allow_outbound = true;
        self.allow_inbound = false;
        self
    }

    /// Restricts the connector to attaching onto the level.
    #[must_use]
    pub fn inbound_only(mut self) -> Self {
        self.allow_outbound = false;
        self.allow_inbound = true;
        self
    }

    /// Requests a random spin when this socket is used.
    #[must_use]
    pub fn with_random_rotation(mut self) -> Self {
        self.random_rotation = true;
        self
    }

    /// Tag and direction compatibility.
    ///
    /// The "different parts" half of the rule is the caller's concern: two
    /// connectors of one prototype are never offered to each other.
    #[must_use]
    pub fn can_connect_to(&self, other: &Connector) -> bool {
        self.tag == other.tag
            && ((self.allow_outbound && other.allow_inbound)
                || (self.allow_inbound && other.allow_outbound))
    }

    /// Whether this connector can attach onto `outbound`.
    #[must_use]
    pub fn accepts(&self, outbound: &Connector) -> bool {
        self.allow_inbound && outbound.allow_outbound && self.tag == outbound.tag
    }
}

/// A connector on a placed instance: `(instance index, connector index)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorRef {
    /// Index into the generator's instance list.
    pub instance: usize,
    /// Index into the instance prototype's connector list.
    pub connector: ConnectorId,
}

impl ConnectorRef {
    /// Creates a new connector reference.
    #[inline]
    #[must_use]
    pub const fn new(instance: usize, connector: ConnectorId) -> Self {
        Self { instance, connector }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_rules() {
        let out = Connector::new("door", Pose::IDENTITY).outbound_only();
        let inb = Connector::new("door", Pose::IDENTITY).inbound_only();
        let both = Connector::new("door", Pose::IDENTITY);

        assert!(out.can_connect_to(&inb));
        assert!(inb.can_connect_to(&out));
        assert!(!out.can_connect_to(&out.clone()), "two outbound-only sockets never join");
        assert!(!inb.can_connect_to(&inb.clone()), "two inbound-only sockets never join");
        assert!(both.can_connect_to(&both.clone()));

        assert!(inb.accepts(&out));
        assert!(!out.accepts(&inb));
    }

    #[test]
    fn test_tags_must_match() {
        let a = Connector::new("door", Pose::IDENTITY);
        let b = Connector::new("hatch", Pose::IDENTITY);
        assert!(!a.can_connect_to(&b));
        assert!(!a.accepts(&b));
    }
}

//! Port declarations and the connection netlist.
//!
//! Every object in the hierarchy declares its ports here before anything is wired. It provides:
//! 1. **Roles:** Request (master) ports issue transactions; response (slave) ports accept them.
//! 2. **Kinds:** Scalar ports take exactly one peer; vector ports hand out a fresh index per peer.
//! 3. **Deferred ports:** Declared but left to the simulation engine to bind (interrupt fabric).
//! 4. **Validation:** After assembly, no declared non-deferred port may be left unconnected.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::common::WiringError;

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortRole {
    /// Issues requests (a master port).
    Request,
    /// Accepts requests (a slave port).
    Response,
}

/// Whether a port takes one peer or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    /// Exactly one peer.
    Scalar,
    /// One peer per allocated index.
    Vector,
}

/// A concrete port endpoint, e.g. `system.l2bus.slave[1]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PortId {
    /// Dotted path of the owning object.
    pub owner: String,
    /// Port name on the owner.
    pub name: &'static str,
    /// Slot index for vector ports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl PortId {
    /// Creates a scalar endpoint.
    pub fn scalar(owner: impl Into<String>, name: &'static str) -> Self {
        Self {
            owner: owner.into(),
            name,
            index: None,
        }
    }

    /// Creates an indexed endpoint of a vector port.
    pub fn indexed(owner: impl Into<String>, name: &'static str, index: usize) -> Self {
        Self {
            owner: owner.into(),
            name,
            index: Some(index),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}.{}[{i}]", self.owner, self.name),
            None => write!(f, "{}.{}", self.owner, self.name),
        }
    }
}

/// Handle to a declared port, held by the object that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRef {
    /// Dotted path of the owning object.
    pub owner: String,
    /// Port name on the owner.
    pub name: &'static str,
    /// Direction.
    pub role: PortRole,
    /// Scalar or vector.
    pub kind: PortKind,
}

impl PortRef {
    /// Returns the scalar endpoint (or the unindexed name of a vector port).
    pub fn id(&self) -> PortId {
        PortId::scalar(self.owner.clone(), self.name)
    }

    /// Returns slot `index` of a vector port.
    pub fn at(&self, index: usize) -> PortId {
        PortId::indexed(self.owner.clone(), self.name, index)
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone)]
struct PortDecl {
    role: PortRole,
    kind: PortKind,
    deferred: bool,
    /// Next free slot for vector ports.
    next_index: usize,
}

/// One request→response binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// The master side.
    pub request: PortId,
    /// The slave side.
    pub response: PortId,
}

/// Registry of declared ports and the bindings between them.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Netlist {
    #[serde(skip)]
    ports: BTreeMap<(String, &'static str), PortDecl>,
    #[serde(skip)]
    peers: BTreeMap<PortId, PortId>,
    connections: Vec<Connection>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a port that must be bound before assembly completes.
    pub fn declare(
        &mut self,
        owner: &str,
        name: &'static str,
        role: PortRole,
        kind: PortKind,
    ) -> Result<PortRef, WiringError> {
        self.insert(owner, name, role, kind, false)
    }

    /// Declares a port whose binding is left to the simulation engine.
    pub fn declare_deferred(
        &mut self,
        owner: &str,
        name: &'static str,
        role: PortRole,
    ) -> Result<PortRef, WiringError> {
        self.insert(owner, name, role, PortKind::Scalar, true)
    }

    fn insert(
        &mut self,
        owner: &str,
        name: &'static str,
        role: PortRole,
        kind: PortKind,
        deferred: bool,
    ) -> Result<PortRef, WiringError> {
        let key = (owner.to_owned(), name);
        if self.ports.contains_key(&key) {
            return Err(WiringError::DuplicatePort(PortId::scalar(owner, name)));
        }
        let _ = self.ports.insert(
            key,
            PortDecl {
                role,
                kind,
                deferred,
                next_index: 0,
            },
        );
        Ok(PortRef {
            owner: owner.to_owned(),
            name,
            role,
            kind,
        })
    }

    /// Binds a request port to a response port.
    ///
    /// Vector ports receive the next free slot, so two peers never share an index.
    /// Scalar ports may only be bound once.
    pub fn connect(
        &mut self,
        request: &PortRef,
        response: &PortRef,
    ) -> Result<Connection, WiringError> {
        let req_decl = self.decl(request)?;
        let resp_decl = self.decl(response)?;
        if req_decl.role != PortRole::Request || resp_decl.role != PortRole::Response {
            return Err(WiringError::RoleMismatch {
                request: request.id(),
                response: response.id(),
                reason: "a request port must be bound to a response port",
            });
        }

        let request_id = self.endpoint(request)?;
        let response_id = self.endpoint(response)?;
        self.claim(request, &request_id);
        self.claim(response, &response_id);

        let _ = self.peers.insert(request_id.clone(), response_id.clone());
        let _ = self.peers.insert(response_id.clone(), request_id.clone());
        debug!(request = %request_id, response = %response_id, "connected");

        let conn = Connection {
            request: request_id,
            response: response_id,
        };
        self.connections.push(conn.clone());
        Ok(conn)
    }

    fn decl(&self, port: &PortRef) -> Result<&PortDecl, WiringError> {
        self.ports
            .get(&(port.owner.clone(), port.name))
            .ok_or_else(|| WiringError::UndeclaredPort(port.id()))
    }

    /// Resolves the endpoint a new connection would use, without claiming it.
    fn endpoint(&self, port: &PortRef) -> Result<PortId, WiringError> {
        let decl = self.decl(port)?;
        match decl.kind {
            PortKind::Vector => Ok(port.at(decl.next_index)),
            PortKind::Scalar => {
                let id = port.id();
                match self.peers.get(&id) {
                    Some(peer) => Err(WiringError::AlreadyBound {
                        port: id,
                        peer: peer.clone(),
                    }),
                    None => Ok(id),
                }
            }
        }
    }

    fn claim(&mut self, port: &PortRef, id: &PortId) {
        if let Some(decl) = self.ports.get_mut(&(port.owner.clone(), port.name)) {
            if let Some(index) = id.index {
                decl.next_index = index + 1;
            }
        }
    }

    /// Returns the peer bound to `port`, if any.
    pub fn peer_of(&self, port: &PortId) -> Option<&PortId> {
        self.peers.get(port)
    }

    /// Returns every peer bound to a port, one per slot for vector ports.
    pub fn peers_of(&self, port: &PortRef) -> Vec<&PortId> {
        match port.kind {
            PortKind::Scalar => self.peer_of(&port.id()).into_iter().collect(),
            PortKind::Vector => self
                .peers
                .range(port.at(0)..)
                .take_while(|(id, _)| id.owner == port.owner && id.name == port.name)
                .map(|(_, peer)| peer)
                .collect(),
        }
    }

    /// Number of slots allocated on a vector port (1 or 0 for scalar ports).
    pub fn bound_count(&self, port: &PortRef) -> usize {
        self.peers_of(port).len()
    }

    /// Connections in the order they were made.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Ports declared as deferred to the simulation engine.
    pub fn deferred_ports(&self) -> Vec<PortId> {
        self.ports
            .iter()
            .filter(|(_, decl)| decl.deferred)
            .map(|((owner, name), _)| PortId::scalar(owner.clone(), name))
            .collect()
    }

    /// Declared, non-deferred ports that have no peer.
    pub fn dangling_ports(&self) -> Vec<PortId> {
        self.ports
            .iter()
            .filter(|(_, decl)| !decl.deferred)
            .filter_map(|((owner, name), decl)| {
                let id = PortId::scalar(owner.clone(), name);
                let bound = match decl.kind {
                    PortKind::Scalar => self.peers.contains_key(&id),
                    PortKind::Vector => decl.next_index > 0,
                };
                (!bound).then_some(id)
            })
            .collect()
    }

    /// Fails on the first dangling port.
    pub fn validate(&self) -> Result<(), WiringError> {
        match self.dangling_ports().into_iter().next() {
            Some(port) => Err(WiringError::Unconnected(port)),
            None => Ok(()),
        }
    }
}

/// Hierarchy builder: topology, policies, overrides, and L3 wiring.
pub mod builder;

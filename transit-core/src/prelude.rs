//! Convenience re-exports of the engine's public surface.

pub use crate::catalogue::{Bus, BusId, Stop, StopId, TransportCatalogue};
pub use crate::render::{MapRenderer, RenderSettings};
pub use crate::requests::{make_base, process_requests};
pub use crate::router::{RouteInfo, RouteItem, RoutingSettings, TransportRouter};
pub use crate::snapshot::Snapshot;
pub use crate::Error;

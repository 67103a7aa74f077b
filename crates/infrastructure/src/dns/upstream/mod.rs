mod client;

pub use client::{RouteTable, UpstreamResolverClient, UpstreamRoute};

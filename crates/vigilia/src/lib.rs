//! Vigilia - Event-Driven Risk Monitoring
//!
//! The watch-keeping layer around the risk engine:
//!
//! - **Bus** ([`EventBus`]): one typed broadcast channel per topic;
//!   closing a channel cancels its subscriber.
//! - **Handlers** ([`handlers::HandlerSet`]): long-running tasks that
//!   drain inbound topics into the engine, catching and logging every
//!   error so a bad event never kills a subscriber.
//! - **Monitor** ([`RiskMonitor`]): periodic re-evaluation of every open
//!   position, isolating failures per account.
//! - **Service** ([`RiskControlService`]): start/stop the whole layer
//!   within a bounded grace window.

pub mod bus;
pub mod events;
pub mod handlers;
pub mod monitor;
pub mod service;

pub use bus::EventBus;
pub use events::{
    AccountUpdated, LimitsUpdated, OrderCreated, PositionUpdated, ProfileUpdated, RiskActionEvent,
    RiskViolationEvent,
};
pub use handlers::HandlerSet;
pub use monitor::{RiskMonitor, DEFAULT_PERIOD};
pub use service::RiskControlService;

//! # Rendering Boundary
//!
//! The entity core never talks to the graphics API directly. It submits one
//! [`EntityDrawCommand`] per live entity per frame to a [`DrawDevice`], and the
//! device implementation (Vulkan renderer, debug recorder, logger) decides what
//! to do with it.
//!
//! The swapchain module holds the presentation negotiation policy: given what a
//! surface supports, pick a format, present mode, extent and image count.

pub mod draw_device;
pub mod swapchain;

pub use draw_device::{DrawCall, DrawDevice, DrawRecorder, EntityDrawCommand};
pub use swapchain::{SwapchainError, SwapchainPlan, SurfaceSupport};

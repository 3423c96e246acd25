//! Headless presentation surface
//!
//! Stands in for the Vulkan swapchain: cycles through the negotiated number of
//! swap images and logs what would have been drawn.

use stunt_engine::prelude::*;
use stunt_engine::render::SwapchainPlan;

pub struct HeadlessSurface {
    image_count: u32,
    next_image: u32,
    draws_this_frame: usize,
    pub total_draws: usize,
}

impl HeadlessSurface {
    pub fn new(plan: &SwapchainPlan) -> Self {
        log::info!(
            "Headless surface {}x{} with {} images ({:?})",
            plan.extent.width,
            plan.extent.height,
            plan.image_count,
            plan.present_mode
        );
        Self {
            image_count: plan.image_count.max(1),
            next_image: 0,
            draws_this_frame: 0,
            total_draws: 0,
        }
    }
}

impl DrawDevice for HeadlessSurface {
    fn draw_entity(&mut self, command: &EntityDrawCommand) {
        log::trace!(
            "draw {:?} #{} at ({:.2}, {:.2}, {:.2}) [{:?}]",
            command.entity_type,
            command.id,
            command.position.x,
            command.position.y,
            command.position.z,
            command.state
        );
        self.draws_this_frame += 1;
    }

    fn draw_marker(&mut self, position: Vec3, label: &str) {
        log::trace!(
            "marker '{label}' at ({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
    }
}

impl FrameSurface for HeadlessSurface {
    fn acquire_frame(&mut self) -> Result<u32, String> {
        let index = self.next_image;
        self.next_image = (self.next_image + 1) % self.image_count;
        self.draws_this_frame = 0;
        Ok(index)
    }

    fn present_frame(&mut self, image_index: u32) -> Result<(), String> {
        log::debug!("present image {image_index} ({} entities)", self.draws_this_frame);
        self.total_draws += self.draws_this_frame;
        Ok(())
    }
}

//! Swapchain negotiation policy
//!
//! Device and swapchain creation live outside the entity core. What lives here
//! is the decision logic: given the capabilities a surface reports, choose the
//! surface format, present mode, extent, image count and sharing mode. The
//! functions only read `ash::vk` data, so they run without a device.

pub use ash::vk;
use thiserror::Error;

use crate::config::SwapchainConfig;

/// Format the engine renders into when the surface offers it
pub const PREFERRED_FORMAT: vk::Format = vk::Format::B8G8R8A8_UNORM;

/// Color space paired with [`PREFERRED_FORMAT`]
pub const PREFERRED_COLOR_SPACE: vk::ColorSpaceKHR = vk::ColorSpaceKHR::SRGB_NONLINEAR;

/// Negotiation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapchainError {
    /// The surface reported no formats
    #[error("swapchain has no usable surface formats")]
    NoSurfaceFormats,

    /// The surface reported no present modes
    #[error("swapchain has no usable presentation modes")]
    NoPresentModes,
}

/// Everything a physical device reports about a surface
#[derive(Debug, Clone, Default)]
pub struct SurfaceSupport {
    /// Surface capabilities (extents, image counts)
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    /// Supported surface formats
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupport {
    /// Validation check run before any choice is made
    pub fn validate(&self) -> Result<(), SwapchainError> {
        if self.present_modes.is_empty() {
            return Err(SwapchainError::NoPresentModes);
        }
        if self.formats.is_empty() {
            return Err(SwapchainError::NoSurfaceFormats);
        }
        Ok(())
    }
}

/// First format matching `preferred` with an sRGB non-linear color space,
/// otherwise the last format the surface listed.
pub fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
    preferred: vk::Format,
) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|sf| sf.format == preferred && sf.color_space == PREFERRED_COLOR_SPACE)
        .or_else(|| formats.last())
        .copied()
}

/// `preferred` if listed, then FIFO if listed, then the last listed mode
pub fn choose_present_mode(
    modes: &[vk::PresentModeKHR],
    preferred: vk::PresentModeKHR,
) -> Option<vk::PresentModeKHR> {
    modes
        .iter()
        .find(|&&mode| mode == preferred)
        .or_else(|| modes.iter().find(|&&mode| mode == vk::PresentModeKHR::FIFO))
        .or_else(|| modes.last())
        .copied()
}

/// Surface's current extent when it defines one, otherwise `requested`
/// clamped to the surface's min/max per axis.
///
/// A defined `current_extent` wins over `requested` rather than being clamped
/// against it.
pub fn choose_extent(caps: &vk::SurfaceCapabilitiesKHR, requested: vk::Extent2D) -> vk::Extent2D {
    if caps.current_extent.width != u32::MAX {
        return caps.current_extent;
    }
    vk::Extent2D {
        width: requested
            .width
            .min(caps.max_image_extent.width)
            .max(caps.min_image_extent.width),
        height: requested
            .height
            .min(caps.max_image_extent.height)
            .max(caps.min_image_extent.height),
    }
}

/// One image more than the minimum, capped by the maximum (0 = unbounded)
pub fn choose_image_count(caps: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let wanted = caps.min_image_count + 1;
    if caps.max_image_count > 0 {
        wanted.min(caps.max_image_count)
    } else {
        wanted
    }
}

/// Exclusive ownership when graphics and present share a queue family
pub fn choose_sharing(graphics_family: u32, present_family: u32) -> (vk::SharingMode, Vec<u32>) {
    if graphics_family == present_family {
        (vk::SharingMode::EXCLUSIVE, Vec::new())
    } else {
        (vk::SharingMode::CONCURRENT, vec![graphics_family, present_family])
    }
}

/// The negotiated swapchain parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainPlan {
    /// Chosen surface format
    pub format: vk::SurfaceFormatKHR,
    /// Chosen present mode
    pub present_mode: vk::PresentModeKHR,
    /// Swap image resolution
    pub extent: vk::Extent2D,
    /// Number of swap images
    pub image_count: u32,
    /// Image sharing between queue families
    pub sharing_mode: vk::SharingMode,
    /// Queue families sharing the images (empty for exclusive)
    pub queue_family_indices: Vec<u32>,
}

impl SwapchainPlan {
    /// Negotiate swapchain parameters for a surface
    pub fn negotiate(
        support: &SurfaceSupport,
        config: &SwapchainConfig,
        graphics_family: u32,
        present_family: u32,
    ) -> Result<Self, SwapchainError> {
        support.validate()?;
        log::debug!(
            "Surface offers {} formats and {} present modes",
            support.formats.len(),
            support.present_modes.len()
        );

        let format = choose_surface_format(&support.formats, PREFERRED_FORMAT)
            .ok_or(SwapchainError::NoSurfaceFormats)?;
        log::debug!("Chose surface format {:?} / {:?}", format.format, format.color_space);

        let preferred_mode = if config.prefer_mailbox {
            vk::PresentModeKHR::MAILBOX
        } else {
            vk::PresentModeKHR::FIFO
        };
        let present_mode = choose_present_mode(&support.present_modes, preferred_mode)
            .ok_or(SwapchainError::NoPresentModes)?;
        log::debug!("Chose present mode {present_mode:?}");

        let requested = vk::Extent2D {
            width: config.width,
            height: config.height,
        };
        let extent = choose_extent(&support.capabilities, requested);
        log::debug!(
            "Requested extent ({}, {}), chose ({}, {})",
            requested.width,
            requested.height,
            extent.width,
            extent.height
        );

        let image_count = choose_image_count(&support.capabilities);
        log::debug!("Using {image_count} swap images");

        let (sharing_mode, queue_family_indices) = choose_sharing(graphics_family, present_family);

        Ok(Self {
            format,
            present_mode,
            extent,
            image_count,
            sharing_mode,
            queue_family_indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
        vk::SurfaceFormatKHR { format, color_space }
    }

    fn caps(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
        vk::SurfaceCapabilitiesKHR {
            min_image_count: min,
            max_image_count: max,
            current_extent: vk::Extent2D { width: u32::MAX, height: u32::MAX },
            min_image_extent: vk::Extent2D { width: 64, height: 64 },
            max_image_extent: vk::Extent2D { width: 1920, height: 1080 },
            ..Default::default()
        }
    }

    fn support() -> SurfaceSupport {
        SurfaceSupport {
            capabilities: caps(2, 3),
            formats: vec![
                format(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
                format(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            ],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
        }
    }

    #[test]
    fn test_preferred_format_is_chosen() {
        let chosen = choose_surface_format(&support().formats, PREFERRED_FORMAT).unwrap();
        assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    }

    #[test]
    fn test_format_falls_back_to_last() {
        let formats = [
            format(vk::Format::R8G8B8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
            format(vk::Format::R16G16B16A16_SFLOAT, vk::ColorSpaceKHR::SRGB_NONLINEAR),
        ];
        let chosen = choose_surface_format(&formats, PREFERRED_FORMAT).unwrap();
        assert_eq!(chosen.format, vk::Format::R16G16B16A16_SFLOAT);
        assert!(choose_surface_format(&[], PREFERRED_FORMAT).is_none());
    }

    #[test]
    fn test_present_mode_preference_and_fallbacks() {
        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            Some(vk::PresentModeKHR::FIFO)
        );

        let modes = [vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO_RELAXED];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            Some(vk::PresentModeKHR::FIFO_RELAXED)
        );

        // More modes than formats: the whole mode list is searched
        let modes = [
            vk::PresentModeKHR::IMMEDIATE,
            vk::PresentModeKHR::FIFO,
            vk::PresentModeKHR::MAILBOX,
        ];
        assert_eq!(
            choose_present_mode(&modes, vk::PresentModeKHR::MAILBOX),
            Some(vk::PresentModeKHR::MAILBOX)
        );
    }

    #[test]
    fn test_extent_uses_current_when_defined() {
        let mut capabilities = caps(2, 3);
        capabilities.current_extent = vk::Extent2D { width: 800, height: 600 };

        let extent = choose_extent(&capabilities, vk::Extent2D { width: 1200, height: 700 });
        assert_eq!(extent, vk::Extent2D { width: 800, height: 600 });
    }

    #[test]
    fn test_extent_clamped_to_surface_limits() {
        let capabilities = caps(2, 3);

        let extent = choose_extent(&capabilities, vk::Extent2D { width: 4000, height: 10 });
        assert_eq!(extent, vk::Extent2D { width: 1920, height: 64 });
    }

    #[test]
    fn test_image_count() {
        assert_eq!(choose_image_count(&caps(2, 3)), 3);
        assert_eq!(choose_image_count(&caps(3, 3)), 3);
        assert_eq!(choose_image_count(&caps(2, 0)), 3);
    }

    #[test]
    fn test_sharing_mode() {
        assert_eq!(choose_sharing(0, 0), (vk::SharingMode::EXCLUSIVE, Vec::new()));
        assert_eq!(choose_sharing(0, 2), (vk::SharingMode::CONCURRENT, vec![0, 2]));
    }

    #[test]
    fn test_negotiate_full_plan() {
        let plan = SwapchainPlan::negotiate(&support(), &SwapchainConfig::default(), 1, 1).unwrap();

        assert_eq!(plan.format.format, vk::Format::B8G8R8A8_UNORM);
        assert_eq!(plan.present_mode, vk::PresentModeKHR::MAILBOX);
        assert_eq!(plan.extent, vk::Extent2D { width: 1200, height: 700 });
        assert_eq!(plan.image_count, 3);
        assert_eq!(plan.sharing_mode, vk::SharingMode::EXCLUSIVE);
    }

    #[test]
    fn test_negotiate_fifo_when_mailbox_not_preferred() {
        let config = SwapchainConfig {
            prefer_mailbox: false,
            ..SwapchainConfig::default()
        };
        let plan = SwapchainPlan::negotiate(&support(), &config, 0, 1).unwrap();

        assert_eq!(plan.present_mode, vk::PresentModeKHR::FIFO);
        assert_eq!(plan.queue_family_indices, vec![0, 1]);
    }

    #[test]
    fn test_negotiate_rejects_empty_support() {
        let mut empty_modes = support();
        empty_modes.present_modes.clear();
        assert_eq!(
            SwapchainPlan::negotiate(&empty_modes, &SwapchainConfig::default(), 0, 0),
            Err(SwapchainError::NoPresentModes)
        );

        let mut empty_formats = support();
        empty_formats.formats.clear();
        assert_eq!(
            SwapchainPlan::negotiate(&empty_formats, &SwapchainConfig::default(), 0, 0),
            Err(SwapchainError::NoSurfaceFormats)
        );
    }
}

/// Multi-target buffer set (MRT group).
///
/// A fixed number of equally sized color buffers, plus optional depth
/// buffers attached to individual slots. Used twice by the pipeline: the
/// three-slot G-buffer and the single-slot result buffer.
///
/// Buffers are never resized in place: a size change allocates a complete
/// new set of buffers and then releases the old ones, so previous contents
/// must be treated as cleared.

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::device::{
    ClearFlags, CommandList, FilterMode, GraphicsDevice, Texture, TextureDesc,
    TextureFormat, TextureUsage,
};
use crate::{ds_error, ds_info, ds_state_err};

// ===== DEPTH SLOT MASK =====

/// Which color slots own a depth attachment (bit i = slot i)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthSlotMask(u32);

impl DepthSlotMask {
    /// Highest number of slots a mask can describe
    pub const MAX_SLOTS: usize = 32;

    /// No owned depth: the set relies on a depth buffer supplied by another set
    pub const NONE: DepthSlotMask = DepthSlotMask(0);

    /// Depth on slot 0 only
    pub const FIRST: DepthSlotMask = DepthSlotMask(1);

    /// Mask from one flag per slot
    ///
    /// `None` if an enabled slot is at or above `MAX_SLOTS`.
    pub fn from_slots(slots: &[bool]) -> Option<Self> {
        slots
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .try_fold(0u32, |bits, (slot, _)| slot_bit(slot).map(|bit| bits | bit))
            .map(Self)
    }

    /// Mask with exactly one slot, `None` at or above `MAX_SLOTS`
    pub fn single(slot: usize) -> Option<Self> {
        slot_bit(slot).map(Self)
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot_bit(slot).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Highest slot with depth, if any
    pub fn highest_slot(&self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(31 - self.0.leading_zeros() as usize)
        }
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

fn slot_bit(slot: usize) -> Option<u32> {
    u32::try_from(slot).ok().and_then(|slot| 1u32.checked_shl(slot))
}

// ===== DESCRIPTOR =====

/// Buffer set creation descriptor
#[derive(Debug, Clone)]
pub struct BufferSetDesc {
    /// Debug label, also used as texture label prefix
    pub label: String,
    /// Number of color buffers (fixed for the lifetime of the set)
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub color_format: TextureFormat,
    /// Format of owned depth buffers (ignored when `depth_slots` is empty)
    pub depth_format: TextureFormat,
    pub filter: FilterMode,
    /// Slots owning a depth buffer
    pub depth_slots: DepthSlotMask,
}

impl BufferSetDesc {
    /// Descriptor without owned depth, depth format defaulting to D24S8
    pub fn new(
        label: &str,
        count: usize,
        width: u32,
        height: u32,
        color_format: TextureFormat,
        filter: FilterMode,
    ) -> Self {
        Self {
            label: label.to_string(),
            count,
            width,
            height,
            color_format,
            depth_format: TextureFormat::D24_UNORM_S8_UINT,
            filter,
            depth_slots: DepthSlotMask::NONE,
        }
    }

    /// Give the listed slots their own depth buffer
    pub fn with_depth(mut self, depth_slots: DepthSlotMask, depth_format: TextureFormat) -> Self {
        self.depth_slots = depth_slots;
        self.depth_format = depth_format;
        self
    }
}

// ===== BUFFER SET =====

/// Fixed-size group of equally sized render targets
pub struct MultiTargetBufferSet {
    label: String,
    count: usize,
    width: u32,
    height: u32,
    color_format: TextureFormat,
    depth_format: TextureFormat,
    filter: FilterMode,
    depth_slots: DepthSlotMask,
    colors: Vec<Arc<dyn Texture>>,
    depths: Vec<Option<Arc<dyn Texture>>>,
    /// Number of allocations performed (1 after create, +1 per effective resize)
    generation: u32,
    destroyed: bool,
}

impl MultiTargetBufferSet {
    /// Allocate `desc.count` color buffers and the owned depth buffers
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if the backend cannot render to the color or depth format
    /// - `InitializationFailed` for a zero count, a count above the backend
    ///   attachment limit, a zero size, or a depth slot outside the set
    pub fn create(device: &mut dyn GraphicsDevice, desc: BufferSetDesc) -> Result<Self> {
        let max_attachments = (device.capabilities().max_color_attachments as usize)
            .min(DepthSlotMask::MAX_SLOTS);
        if desc.count == 0 || desc.count > max_attachments {
            ds_error!("deferred::BufferSet",
                "'{}': color buffer count {} outside 1..={}", desc.label, desc.count, max_attachments);
            return Err(Error::InitializationFailed(format!(
                "buffer set '{}' needs between 1 and {} color buffers, got {}",
                desc.label, max_attachments, desc.count
            )));
        }
        if desc.width == 0 || desc.height == 0 {
            ds_error!("deferred::BufferSet", "'{}': zero size {}x{}", desc.label, desc.width, desc.height);
            return Err(Error::InitializationFailed(format!(
                "buffer set '{}' cannot be created with size {}x{}",
                desc.label, desc.width, desc.height
            )));
        }
        if let Some(slot) = desc.depth_slots.highest_slot() {
            if slot >= desc.count {
                ds_error!("deferred::BufferSet",
                    "'{}': depth slot {} outside {} color slots", desc.label, slot, desc.count);
                return Err(Error::InitializationFailed(format!(
                    "buffer set '{}' has depth on slot {} but only {} slots",
                    desc.label, slot, desc.count
                )));
            }
        }
        if !desc.color_format.is_color() || !device.supports_format(desc.color_format) {
            ds_error!("deferred::BufferSet",
                "'{}': color format {:?} unsupported by backend '{}'",
                desc.label, desc.color_format, device.capabilities().backend_name);
            return Err(Error::UnsupportedFormat(desc.color_format));
        }
        if !desc.depth_slots.is_empty()
            && (!desc.depth_format.is_depth() || !device.supports_format(desc.depth_format))
        {
            ds_error!("deferred::BufferSet",
                "'{}': depth format {:?} unsupported by backend '{}'",
                desc.label, desc.depth_format, device.capabilities().backend_name);
            return Err(Error::UnsupportedFormat(desc.depth_format));
        }

        let mut set = Self {
            label: desc.label,
            count: desc.count,
            width: desc.width,
            height: desc.height,
            color_format: desc.color_format,
            depth_format: desc.depth_format,
            filter: desc.filter,
            depth_slots: desc.depth_slots,
            colors: Vec::new(),
            depths: Vec::new(),
            generation: 0,
            destroyed: false,
        };
        let (colors, depths) = set.allocate(device, set.width, set.height)?;
        set.colors = colors;
        set.depths = depths;
        set.generation = 1;

        ds_info!("deferred::BufferSet", "'{}' created: {} x {:?} at {}x{} (depth slots {:#b})",
            set.label, set.count, set.color_format, set.width, set.height, set.depth_slots.bits());

        Ok(set)
    }

    /// Reallocate every buffer at a new size
    ///
    /// No-op when the size is unchanged. Must run before any binding in a
    /// frame, since the display size can change between frames. If an
    /// allocation fails the set keeps its previous buffers and size.
    ///
    /// # Returns
    ///
    /// `true` when the buffers were reallocated
    pub fn resize(&mut self, device: &mut dyn GraphicsDevice, width: u32, height: u32) -> Result<bool> {
        self.ensure_alive("resize")?;
        if width == self.width && height == self.height {
            return Ok(false);
        }
        if width == 0 || height == 0 {
            return Err(ds_state_err!("deferred::BufferSet",
                "'{}': cannot resize to {}x{}", self.label, width, height));
        }

        let (old_width, old_height) = (self.width, self.height);
        let (colors, depths) = match self.allocate(device, width, height) {
            Ok(buffers) => buffers,
            Err(err) => {
                ds_error!("deferred::BufferSet", "'{}' kept at {}x{}, reallocation to {}x{} failed: {}",
                    self.label, old_width, old_height, width, height, err);
                return Err(err);
            }
        };
        self.colors = colors;
        self.depths = depths;
        self.width = width;
        self.height = height;
        self.generation += 1;

        ds_info!("deferred::BufferSet", "'{}' reallocated {}x{} -> {}x{}",
            self.label, old_width, old_height, width, height);

        Ok(true)
    }

    /// Bind all color buffers of `colors` plus the depth buffer of slot
    /// `depth_source_index` in `depth` as simultaneous render outputs
    ///
    /// Both sets may be the same set.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if either set is destroyed or their sizes differ
    /// - `InvalidResource` if the depth source slot owns no depth buffer
    pub fn bind_as_render_targets(
        cmd: &mut dyn CommandList,
        colors: &MultiTargetBufferSet,
        depth: &MultiTargetBufferSet,
        depth_source_index: usize,
    ) -> Result<()> {
        colors.ensure_alive("bind_as_render_targets")?;
        depth.ensure_alive("bind_as_render_targets")?;
        if colors.size() != depth.size() {
            return Err(ds_state_err!("deferred::BufferSet",
                "'{}' is {}x{} but depth source '{}' is {}x{}",
                colors.label, colors.width, colors.height, depth.label, depth.width, depth.height));
        }
        let depth_texture = depth.depth_texture(depth_source_index).ok_or_else(|| {
            ds_error!("deferred::BufferSet",
                "'{}' slot {} owns no depth buffer", depth.label, depth_source_index);
            Error::InvalidResource(format!(
                "buffer set '{}' has no depth buffer on slot {}", depth.label, depth_source_index
            ))
        })?;

        cmd.set_render_targets(&colors.colors, Some(depth_texture))
    }

    /// Make one color buffer (and its own depth, if any) the only output
    pub fn set_active(&self, cmd: &mut dyn CommandList, index: usize) -> Result<()> {
        self.ensure_alive("set_active")?;
        let color = self.texture(index).ok_or_else(|| {
            ds_error!("deferred::BufferSet", "'{}': slot {} out of range ({} slots)",
                self.label, index, self.count);
            Error::InvalidResource(format!("buffer set '{}' has no slot {}", self.label, index))
        })?;
        cmd.set_render_targets(std::slice::from_ref(color), self.depth_texture(index))
    }

    /// Clear the currently active output
    pub fn clear_active(
        cmd: &mut dyn CommandList,
        clear_color: bool,
        clear_depth: bool,
        color: [f32; 4],
        depth: f32,
    ) -> Result<()> {
        let flags = ClearFlags::from_bools(clear_color, clear_depth);
        if flags.is_empty() {
            return Ok(());
        }
        cmd.clear(flags, color, depth)
    }

    /// Return output to the display
    pub fn reset_active(cmd: &mut dyn CommandList) -> Result<()> {
        cmd.set_display_target()
    }

    /// Release every owned buffer. Safe to call more than once; the set
    /// cannot be used afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.release();
        self.destroyed = true;
        ds_info!("deferred::BufferSet", "'{}' destroyed", self.label);
    }

    // ===== ACCESSORS =====

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of color buffers
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_format(&self) -> TextureFormat {
        self.color_format
    }

    pub fn depth_format(&self) -> TextureFormat {
        self.depth_format
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn depth_slots(&self) -> DepthSlotMask {
        self.depth_slots
    }

    /// True when at least one slot owns a depth buffer
    pub fn owns_depth(&self) -> bool {
        !self.depth_slots.is_empty()
    }

    /// Color buffer of a slot (None after destroy)
    pub fn texture(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.colors.get(index)
    }

    /// All color buffers in slot order
    pub fn textures(&self) -> &[Arc<dyn Texture>] {
        &self.colors
    }

    /// Depth buffer owned by a slot
    pub fn depth_texture(&self, index: usize) -> Option<&Arc<dyn Texture>> {
        self.depths.get(index).and_then(|d| d.as_ref())
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ===== INTERNAL =====

    fn ensure_alive(&self, operation: &str) -> Result<()> {
        if self.destroyed {
            return Err(ds_state_err!("deferred::BufferSet",
                "'{}': {} called after destroy", self.label, operation));
        }
        Ok(())
    }

    /// Build a full set of buffers at the given size without touching the
    /// current ones
    fn allocate(
        &self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(Vec<Arc<dyn Texture>>, Vec<Option<Arc<dyn Texture>>>)> {
        let mut colors = Vec::with_capacity(self.count);
        let mut depths = Vec::with_capacity(self.count);
        for slot in 0..self.count {
            colors.push(device.create_texture(&TextureDesc {
                label: format!("{}.{}", self.label, slot),
                width,
                height,
                format: self.color_format,
                usage: TextureUsage::SampledAndRenderTarget,
                filter: self.filter,
            })?);

            let depth = if self.depth_slots.contains(slot) {
                Some(device.create_texture(&TextureDesc {
                    label: format!("{}.depth{}", self.label, slot),
                    width,
                    height,
                    format: self.depth_format,
                    usage: TextureUsage::DepthStencil,
                    filter: FilterMode::Point,
                })?)
            } else {
                None
            };
            depths.push(depth);
        }
        Ok((colors, depths))
    }

    fn release(&mut self) {
        self.colors.clear();
        self.depths.clear();
    }
}

#[cfg(test)]
#[path = "buffer_set_tests.rs"]
mod tests;

/// Mock graphics device for unit tests (no GPU required)
///
/// Executes every command immediately on CPU-side pixel arrays, so tests
/// can read back what the pipeline produced. The accumulation shader is
/// emulated with simple stand-ins:
///
/// - Directional (passes 0/1): `dst.rgb += diffuse.rgb * color.rgb * intensity`,
///   pass 1 samples with V inverted
/// - Volumetric (pass 2): pixels whose G-buffer position lies inside the
///   transformed mesh bounds get `diffuse.rgb * color.rgb * intensity * atten`
///   with `atten = clamp(1 - distance / range)`
/// - Final composite (pass 3): display = result buffer
///
/// Normalized formats clamp stored values to [0, 1].

use std::sync::{Arc, Mutex, MutexGuard};
use glam::{Mat4, Vec3};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::device::{
    ClearFlags, CommandList, DeviceCapabilities, GraphicsDevice, Mesh, MeshDesc, MeshId,
    ScreenQuad, ShaderPass, Texture, TextureDesc, TextureFormat, TextureId, TextureInfo,
};
use crate::lighting::{AccumulationMaterial, MaterialParam, MaterialTexture};
use crate::ds_error;

// ============================================================================
// Shared storage
// ============================================================================

struct TextureStorage {
    info: TextureInfo,
    pixels: Vec<[f32; 4]>,
}

#[derive(Default)]
struct MockStore {
    textures: SlotMap<TextureId, TextureStorage>,
    meshes: SlotMap<MeshId, f32>,
    display_size: (u32, u32),
    display: Vec<[f32; 4]>,
    created_textures: u32,
}

type SharedStore = Arc<Mutex<MockStore>>;

fn lock(store: &SharedStore) -> MutexGuard<'_, MockStore> {
    store.lock().unwrap()
}

fn store_pixel(format: TextureFormat, value: [f32; 4]) -> [f32; 4] {
    if format.is_normalized() {
        value.map(|c| c.clamp(0.0, 1.0))
    } else {
        value
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    id: TextureId,
    info: TextureInfo,
    store: SharedStore,
}

impl Texture for MockTexture {
    fn id(&self) -> TextureId {
        self.id
    }

    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for MockTexture {
    fn drop(&mut self) {
        lock(&self.store).textures.remove(self.id);
    }
}

// ============================================================================
// Mock Mesh
// ============================================================================

pub struct MockMesh {
    id: MeshId,
    vertex_count: u32,
    index_count: u32,
    bounding_radius: f32,
    store: SharedStore,
}

impl Mesh for MockMesh {
    fn id(&self) -> MeshId {
        self.id
    }

    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}

impl Drop for MockMesh {
    fn drop(&mut self) {
        lock(&self.store).meshes.remove(self.id);
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    capabilities: DeviceCapabilities,
    unsupported: FxHashSet<TextureFormat>,
    /// Texture allocations left before `OutOfMemory` (None = unlimited)
    texture_budget: Option<u32>,
    store: SharedStore,
}

impl MockGraphicsDevice {
    /// Top-left origin backend with 8 color attachments
    pub fn new() -> Self {
        Self {
            capabilities: DeviceCapabilities {
                backend_name: "mock".to_string(),
                origin_is_bottom_left: false,
                max_color_attachments: 8,
            },
            unsupported: FxHashSet::default(),
            texture_budget: None,
            store: Arc::new(Mutex::new(MockStore::default())),
        }
    }

    pub fn with_origin_bottom_left(mut self, bottom_left: bool) -> Self {
        self.capabilities.origin_is_bottom_left = bottom_left;
        self
    }

    pub fn with_max_color_attachments(mut self, count: u32) -> Self {
        self.capabilities.max_color_attachments = count;
        self
    }

    pub fn with_unsupported_format(mut self, format: TextureFormat) -> Self {
        self.unsupported.insert(format);
        self
    }

    /// Let `count` more texture allocations succeed, then fail with `OutOfMemory`
    pub fn fail_textures_after(&mut self, count: u32) {
        self.texture_budget = Some(count);
    }

    /// Remove the allocation limit
    pub fn restore_texture_allocations(&mut self) {
        self.texture_budget = None;
    }

    /// Command list with access to the recorded command log
    pub fn mock_command_list(&self) -> MockCommandList {
        MockCommandList::new(Arc::clone(&self.store))
    }

    /// Textures currently alive
    pub fn live_texture_count(&self) -> usize {
        lock(&self.store).textures.len()
    }

    /// Meshes currently alive
    pub fn live_mesh_count(&self) -> usize {
        lock(&self.store).meshes.len()
    }

    /// Textures created since the device was made
    pub fn created_texture_count(&self) -> u32 {
        lock(&self.store).created_textures
    }

    /// Copy of a texture's pixels, row-major, top row first
    pub fn read_pixels(&self, texture: &Arc<dyn Texture>) -> Vec<[f32; 4]> {
        lock(&self.store)
            .textures
            .get(texture.id())
            .map(|storage| storage.pixels.clone())
            .unwrap_or_default()
    }

    pub fn pixel(&self, texture: &Arc<dyn Texture>, x: u32, y: u32) -> [f32; 4] {
        let store = lock(&self.store);
        let storage = &store.textures[texture.id()];
        storage.pixels[(y * storage.info.width + x) as usize]
    }

    /// Fill a texture with one value (stands in for the host geometry pass)
    pub fn fill_texture(&self, texture: &Arc<dyn Texture>, value: [f32; 4]) {
        self.fill_texture_with(texture, |_, _| value);
    }

    /// Fill a texture from a per-pixel function of `(x, y)`
    pub fn fill_texture_with<F>(&self, texture: &Arc<dyn Texture>, f: F)
    where
        F: Fn(u32, u32) -> [f32; 4],
    {
        let mut store = lock(&self.store);
        let storage = &mut store.textures[texture.id()];
        let width = storage.info.width;
        let format = storage.info.format;
        for (i, pixel) in storage.pixels.iter_mut().enumerate() {
            let (x, y) = (i as u32 % width, i as u32 / width);
            *pixel = store_pixel(format, f(x, y));
        }
    }

    /// Size and pixels of the last composite
    pub fn read_display(&self) -> ((u32, u32), Vec<[f32; 4]>) {
        let store = lock(&self.store);
        (store.display_size, store.display.clone())
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn supports_format(&self, format: TextureFormat) -> bool {
        !self.unsupported.contains(&format)
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        if !self.supports_format(desc.format) {
            return Err(Error::UnsupportedFormat(desc.format));
        }
        if desc.width == 0 || desc.height == 0 {
            ds_error!("deferred::MockDevice", "texture '{}' has zero size", desc.label);
            return Err(Error::BackendError(format!("texture '{}' has zero size", desc.label)));
        }
        match self.texture_budget {
            Some(0) => return Err(Error::OutOfMemory),
            Some(ref mut remaining) => *remaining -= 1,
            None => {}
        }
        let info = TextureInfo::from(desc);
        let mut store = lock(&self.store);
        let id = store.textures.insert(TextureStorage {
            info: info.clone(),
            pixels: vec![[0.0; 4]; (desc.width * desc.height) as usize],
        });
        store.created_textures += 1;
        Ok(Arc::new(MockTexture { id, info, store: Arc::clone(&self.store) }))
    }

    fn create_mesh(&mut self, desc: &MeshDesc) -> Result<Arc<dyn Mesh>> {
        if desc.positions.is_empty() || desc.indices.len() % 3 != 0 {
            return Err(Error::InvalidResource(format!("mesh '{}' is not a triangle list", desc.label)));
        }
        let bounding_radius = desc.bounding_radius();
        let id = lock(&self.store).meshes.insert(bounding_radius);
        Ok(Arc::new(MockMesh {
            id,
            vertex_count: desc.positions.len() as u32,
            index_count: desc.indices.len() as u32,
            bounding_radius,
            store: Arc::clone(&self.store),
        }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(self.mock_command_list()))
    }

    fn submit(&self, _commands: &[&dyn CommandList]) -> Result<()> {
        // Commands run as they are recorded
        Ok(())
    }
}

// ============================================================================
// Mock Command List
// ============================================================================

/// One recorded command
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    SetRenderTargets { colors: Vec<TextureId>, depth: Option<TextureId> },
    SetDisplayTarget,
    Clear { flags: ClearFlags, color: [f32; 4], depth: f32 },
    DrawQuad { pass: ShaderPass },
    DrawMesh { pass: ShaderPass, transform: Mat4 },
}

#[derive(Debug, Clone, PartialEq)]
enum BoundTarget {
    Nothing,
    Display,
    Textures { colors: Vec<TextureId>, depth: Option<TextureId> },
}

/// Point-sampled copy of a texture
struct Sampler {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Sampler {
    fn sample(&self, u: f32, v: f32) -> [f32; 4] {
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }
}

pub struct MockCommandList {
    store: SharedStore,
    bound: BoundTarget,
    commands: Vec<MockCommand>,
}

impl MockCommandList {
    fn new(store: SharedStore) -> Self {
        Self { store, bound: BoundTarget::Nothing, commands: Vec::new() }
    }

    pub fn commands(&self) -> &[MockCommand] {
        &self.commands
    }

    /// Shader passes of every draw, in order
    pub fn passes(&self) -> Vec<ShaderPass> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                MockCommand::DrawQuad { pass } | MockCommand::DrawMesh { pass, .. } => Some(*pass),
                _ => None,
            })
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }

    fn sampler(&self, material: &AccumulationMaterial, slot: MaterialTexture) -> Result<Sampler> {
        let texture = material
            .texture(slot)
            .ok_or_else(|| Error::InvalidResource(format!("{} not bound", slot.binding_name())))?;
        let store = lock(&self.store);
        let storage = store
            .textures
            .get(texture.id())
            .ok_or_else(|| Error::InvalidResource(format!("{} was released", slot.binding_name())))?;
        Ok(Sampler {
            width: storage.info.width,
            height: storage.info.height,
            pixels: storage.pixels.clone(),
        })
    }

    fn single_color_target(&self) -> Result<TextureId> {
        match &self.bound {
            BoundTarget::Textures { colors, .. } if colors.len() == 1 => Ok(colors[0]),
            other => Err(Error::InvalidState(format!("light pass needs one color target, bound {:?}", other))),
        }
    }

    /// `dst += contribution(x, y, u, v)` over the whole target
    fn accumulate<F>(&self, target: TextureId, contribution: F) -> Result<()>
    where
        F: Fn(f32, f32) -> Option<[f32; 3]>,
    {
        let mut store = lock(&self.store);
        let storage = store
            .textures
            .get_mut(target)
            .ok_or_else(|| Error::InvalidResource("render target was released".to_string()))?;
        let (width, height, format) = (storage.info.width, storage.info.height, storage.info.format);
        for (i, pixel) in storage.pixels.iter_mut().enumerate() {
            let x = i as u32 % width;
            let y = i as u32 / width;
            let u = (x as f32 + 0.5) / width as f32;
            let v = (y as f32 + 0.5) / height as f32;
            if let Some(add) = contribution(u, v) {
                let sum = [pixel[0] + add[0], pixel[1] + add[1], pixel[2] + add[2], pixel[3]];
                *pixel = store_pixel(format, sum);
            }
        }
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn set_render_targets(
        &mut self,
        colors: &[Arc<dyn Texture>],
        depth: Option<&Arc<dyn Texture>>,
    ) -> Result<()> {
        if colors.is_empty() {
            return Err(Error::InvalidResource("no color attachment".to_string()));
        }
        let size = (colors[0].info().width, colors[0].info().height);
        let attachments = colors.iter().chain(depth);
        for texture in attachments {
            if (texture.info().width, texture.info().height) != size {
                return Err(Error::InvalidResource(format!(
                    "attachment '{}' does not match {}x{}", texture.info().label, size.0, size.1
                )));
            }
        }

        let colors: Vec<TextureId> = colors.iter().map(|t| t.id()).collect();
        let depth = depth.map(|t| t.id());
        self.commands.push(MockCommand::SetRenderTargets { colors: colors.clone(), depth });
        self.bound = BoundTarget::Textures { colors, depth };
        Ok(())
    }

    fn set_display_target(&mut self) -> Result<()> {
        self.commands.push(MockCommand::SetDisplayTarget);
        self.bound = BoundTarget::Display;
        Ok(())
    }

    fn clear(&mut self, flags: ClearFlags, color: [f32; 4], depth: f32) -> Result<()> {
        self.commands.push(MockCommand::Clear { flags, color, depth });
        let mut store = lock(&self.store);
        match &self.bound {
            BoundTarget::Nothing => {
                return Err(Error::InvalidState("clear without a bound target".to_string()));
            }
            BoundTarget::Display => {
                if flags.contains(ClearFlags::COLOR) {
                    store.display.iter_mut().for_each(|p| *p = color);
                }
            }
            BoundTarget::Textures { colors, depth: depth_id } => {
                if flags.contains(ClearFlags::COLOR) {
                    for id in colors {
                        if let Some(storage) = store.textures.get_mut(*id) {
                            let value = store_pixel(storage.info.format, color);
                            storage.pixels.iter_mut().for_each(|p| *p = value);
                        }
                    }
                }
                if let (true, Some(id)) = (flags.contains(ClearFlags::DEPTH), depth_id) {
                    if let Some(storage) = store.textures.get_mut(*id) {
                        storage.pixels.iter_mut().for_each(|p| *p = [depth, 0.0, 0.0, 0.0]);
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_quad(
        &mut self,
        material: &AccumulationMaterial,
        pass: ShaderPass,
        _quad: &ScreenQuad,
    ) -> Result<()> {
        self.commands.push(MockCommand::DrawQuad { pass });
        match pass {
            ShaderPass::ScreenNormal | ShaderPass::ScreenFlipped => {
                let target = self.single_color_target()?;
                let diffuse = self.sampler(material, MaterialTexture::DiffuseBuffer)?;
                let direction = material.param(MaterialParam::DirLightDir).unwrap_or_default();
                let color = material.param(MaterialParam::DirLightColor).unwrap_or_default();
                let intensity = direction.w;
                let flipped = pass.is_flipped();
                self.accumulate(target, |u, v| {
                    let v = if flipped { 1.0 - v } else { v };
                    let d = diffuse.sample(u, v);
                    Some([
                        d[0] * color.x * intensity,
                        d[1] * color.y * intensity,
                        d[2] * color.z * intensity,
                    ])
                })
            }
            ShaderPass::FinalComposite => {
                if self.bound != BoundTarget::Display {
                    return Err(Error::InvalidState("composite must target the display".to_string()));
                }
                let result = self.sampler(material, MaterialTexture::ResultBuffer)?;
                let mut store = lock(&self.store);
                store.display_size = (result.width, result.height);
                store.display = result.pixels;
                Ok(())
            }
            ShaderPass::Volumetric => {
                Err(Error::InvalidState("volumetric pass drawn with the screen quad".to_string()))
            }
        }
    }

    fn draw_mesh(
        &mut self,
        material: &AccumulationMaterial,
        pass: ShaderPass,
        mesh: &Arc<dyn Mesh>,
        transform: &Mat4,
    ) -> Result<()> {
        self.commands.push(MockCommand::DrawMesh { pass, transform: *transform });
        if pass != ShaderPass::Volumetric {
            return Err(Error::InvalidState(format!("{:?} drawn with a light volume", pass)));
        }
        let target = self.single_color_target()?;
        let diffuse = self.sampler(material, MaterialTexture::DiffuseBuffer)?;
        let positions = self.sampler(material, MaterialTexture::PositionBuffer)?;

        let center = transform.transform_point3(Vec3::ZERO);
        let covered = mesh.bounding_radius() * transform.x_axis.truncate().length();

        let light_pos = material.param(MaterialParam::PointLightPos).unwrap_or_default().truncate();
        let color = material.param(MaterialParam::PointLightColor).unwrap_or_default();
        let range = material.param(MaterialParam::PointLightRange).unwrap_or_default();
        let (inv_range, intensity) = (range.x, range.y);

        self.accumulate(target, |u, v| {
            let p = positions.sample(u, v);
            let world = Vec3::new(p[0], p[1], p[2]);
            if world.distance(center) > covered {
                return None;
            }
            let atten = (1.0 - world.distance(light_pos) * inv_range).clamp(0.0, 1.0);
            let d = diffuse.sample(u, v);
            Some([
                d[0] * color.x * intensity * atten,
                d[1] * color.y * intensity * atten,
                d[2] * color.z * intensity * atten,
            ])
        })
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;

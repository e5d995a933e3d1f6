//! wgpu backend for [`GraphicsDevice`].
//!
//! wgpu has no immediate-mode draw state, so calls made during
//! [`RasterFont::draw`](crate::RasterFont::draw) are recorded and then
//! replayed into a single render pass by [`WgpuDevice::encode`]. The pass
//! loads the existing frame, so host rendering underneath is kept.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::util::DeviceExt;

use crate::device::{BlendFactor, BlendFunc, GraphicsDevice, OverlayState};
use crate::error::OverlayError;
use crate::font::Atlas;
use crate::vertex::GlyphVertex;

/// Per-draw uniform (must match overlay.wgsl DrawUniforms).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub offset: [f32; 2],
    _pad: [f32; 2],
    pub color: [f32; 4],
}

impl DrawUniforms {
    pub fn new(offset: Vec2, color: [f32; 4]) -> Self {
        Self {
            offset: offset.to_array(),
            _pad: [0.0; 2],
            color,
        }
    }
}

/// Pipeline variant; one render pipeline is built per distinct blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blend: Option<BlendFunc>,
}

/// Pipeline binding in effect before `apply_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedBinding(Option<PipelineKey>);

/// One recorded `draw_triangles` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    key: PipelineKey,
    /// Slice of the frame's vertex buffer.
    pub vertices: Range<u32>,
    pub uniforms: DrawUniforms,
}

impl DrawCommand {
    pub fn blend(&self) -> Option<BlendFunc> {
        self.key.blend
    }
}

/// sRGB-encoded channel to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Device calls made during one frame, before any of it reaches the GPU.
///
/// Every `upload_vertices` replaces what later draws see, but the data is
/// appended to one frame-wide vertex list; each draw remembers the slice
/// that was current when it was issued.
#[derive(Debug)]
pub struct FrameRecording {
    /// Colors are linearized for sRGB targets so the blended result shows
    /// the ARGB value as written.
    srgb_target: bool,
    bound: Option<PipelineKey>,
    vertices: Vec<GlyphVertex>,
    current_upload: Range<u32>,
    offset: Vec2,
    color: [f32; 4],
    draws: Vec<DrawCommand>,
}

impl FrameRecording {
    pub fn new(srgb_target: bool) -> Self {
        Self {
            srgb_target,
            bound: None,
            vertices: Vec::new(),
            current_upload: 0..0,
            offset: Vec2::ZERO,
            color: [1.0; 4],
            draws: Vec::new(),
        }
    }

    pub fn save(&self) -> SavedBinding {
        SavedBinding(self.bound)
    }

    pub fn apply(&mut self, state: &OverlayState) {
        self.bound = Some(PipelineKey { blend: state.blend });
    }

    pub fn restore(&mut self, saved: SavedBinding) {
        self.bound = saved.0;
    }

    pub fn upload(&mut self, vertices: &[GlyphVertex]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.current_upload = base..base + vertices.len() as u32;
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn set_color(&mut self, [r, g, b, a]: [f32; 4]) {
        self.color = if self.srgb_target {
            [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
        } else {
            [r, g, b, a]
        };
    }

    /// Record a draw of the current upload's first `vertex_count` vertices.
    /// Dropped when no overlay state is applied.
    pub fn draw(&mut self, vertex_count: u32) {
        let Some(key) = self.bound else {
            log::warn!("Overlay draw issued with no overlay state applied");
            return;
        };
        let start = self.current_upload.start;
        let end = start + vertex_count.min(self.current_upload.len() as u32);
        self.draws.push(DrawCommand {
            key,
            vertices: start..end,
            uniforms: DrawUniforms::new(self.offset, self.color),
        });
    }

    pub fn vertices(&self) -> &[GlyphVertex] {
        &self.vertices
    }

    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }

    /// Hand over the frame's vertices and draws and start a new frame.
    fn take(&mut self) -> (Vec<GlyphVertex>, Vec<DrawCommand>) {
        self.current_upload = 0..0;
        (std::mem::take(&mut self.vertices), std::mem::take(&mut self.draws))
    }
}

pub fn blend_factor(factor: BlendFactor) -> wgpu::BlendFactor {
    match factor {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

pub fn blend_state(func: BlendFunc) -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: blend_factor(func.src_color),
            dst_factor: blend_factor(func.dst_color),
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: blend_factor(func.src_alpha),
            dst_factor: blend_factor(func.dst_alpha),
            operation: wgpu::BlendOperation::Add,
        },
    }
}

/// Round `size` up to a multiple of `alignment`.
fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

pub struct WgpuDevice {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,

    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    atlas_layout: wgpu::BindGroupLayout,
    atlas_bind_group: Option<wgpu::BindGroup>,
    uniform_layout: wgpu::BindGroupLayout,

    vertex_buffer: Option<wgpu::Buffer>,
    uniform_buffer: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    uniform_stride: u64,

    recording: FrameRecording,
}

impl WgpuDevice {
    /// Create the overlay backend for render targets of `format`.
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/overlay.wgsl").into()),
        });

        let atlas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Atlas Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&atlas_layout, &uniform_layout],
            push_constant_ranges: &[],
        });

        let uniform_stride = align_to(
            std::mem::size_of::<DrawUniforms>() as u64,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );

        Self {
            device,
            queue,
            format,
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            atlas_layout,
            atlas_bind_group: None,
            uniform_layout,
            vertex_buffer: None,
            uniform_buffer: None,
            uniform_stride,
            recording: FrameRecording::new(format.is_srgb()),
        }
    }

    fn create_atlas_texture(&self, atlas: &Atlas) -> Result<wgpu::Texture, OverlayError> {
        let expected = atlas.width as usize * atlas.height as usize;
        if atlas.pixels.len() != expected {
            return Err(OverlayError::AtlasSize {
                width: atlas.width,
                height: atlas.height,
                actual: atlas.pixels.len(),
            });
        }

        Ok(self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("Overlay Font Atlas"),
                size: wgpu::Extent3d {
                    width: atlas.width,
                    height: atlas.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            atlas.as_bytes(),
        ))
    }

    fn ensure_pipeline(&mut self, key: PipelineKey) {
        let Self {
            ref device,
            format,
            ref shader,
            ref pipeline_layout,
            ref mut pipelines,
            ..
        } = *self;

        pipelines.entry(key).or_insert_with(|| {
            log::debug!("Creating overlay pipeline for {:?}", key.blend);
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Overlay Pipeline"),
                layout: Some(pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[GlyphVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: key.blend.map(blend_state),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });
    }

    fn ensure_vertex_capacity(&mut self, bytes: u64) {
        let too_small = self.vertex_buffer.as_ref().map_or(true, |b| b.size() < bytes);
        if !too_small {
            return;
        }

        let size = bytes.next_power_of_two().max(4096);
        log::trace!("Growing overlay vertex buffer to {} bytes", size);
        self.vertex_buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertex Buffer"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
    }

    fn ensure_uniform_capacity(&mut self, bytes: u64) {
        let too_small = self.uniform_buffer.as_ref().map_or(true, |(b, _)| b.size() < bytes);
        if !too_small {
            return;
        }

        let size = bytes.next_power_of_two().max(self.uniform_stride * 16);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Uniform Buffer"),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Uniform Bind Group"),
            layout: &self.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        self.uniform_buffer = Some((buffer, bind_group));
    }

    /// Replay this frame's recorded draws into one render pass on `view`,
    /// then clear the recording.
    pub fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let (vertices, draws) = self.recording.take();

        if draws.is_empty() {
            return;
        }
        if self.atlas_bind_group.is_none() {
            log::warn!("Overlay draws recorded before the atlas was uploaded; skipping");
            return;
        }

        for key in draws.iter().map(|d| d.key) {
            self.ensure_pipeline(key);
        }

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        self.ensure_vertex_capacity(vertex_bytes.len() as u64);

        let stride = self.uniform_stride as usize;
        let mut uniform_bytes = vec![0u8; stride * draws.len()];
        for (slot, draw) in uniform_bytes.chunks_exact_mut(stride).zip(&draws) {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        self.ensure_uniform_capacity(uniform_bytes.len() as u64);

        let (
            Some(atlas_bind_group),
            Some(vertex_buffer),
            Some((uniform_buffer, uniform_bind_group)),
        ) = (&self.atlas_bind_group, &self.vertex_buffer, &self.uniform_buffer)
        else {
            return;
        };
        self.queue.write_buffer(vertex_buffer, 0, vertex_bytes);
        self.queue.write_buffer(uniform_buffer, 0, &uniform_bytes);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, atlas_bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));

        let mut current: Option<PipelineKey> = None;
        for (i, draw) in draws.iter().enumerate() {
            if current != Some(draw.key) {
                if let Some(pipeline) = self.pipelines.get(&draw.key) {
                    render_pass.set_pipeline(pipeline);
                }
                current = Some(draw.key);
            }
            let dynamic_offset = (i * stride) as u32;
            render_pass.set_bind_group(1, uniform_bind_group, &[dynamic_offset]);
            render_pass.draw(draw.vertices.clone(), 0..1);
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    type SavedState = SavedBinding;

    fn upload_atlas(&mut self, atlas: &Atlas) {
        let texture = match self.create_atlas_texture(atlas) {
            Ok(texture) => texture,
            Err(e) => {
                log::error!("Overlay atlas upload failed: {}", e);
                return;
            }
        };

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Overlay Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        self.atlas_bind_group = Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Atlas Bind Group"),
            layout: &self.atlas_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        }));
    }

    fn save_state(&mut self) -> SavedBinding {
        self.recording.save()
    }

    fn apply_state(&mut self, state: &OverlayState) {
        self.recording.apply(state);
    }

    fn restore_state(&mut self, saved: SavedBinding) {
        self.recording.restore(saved);
    }

    fn upload_vertices(&mut self, vertices: &[GlyphVertex]) {
        self.recording.upload(vertices);
    }

    fn set_offset(&mut self, offset: Vec2) {
        self.recording.set_offset(offset);
    }

    fn set_color(&mut self, rgba: [f32; 4]) {
        self.recording.set_color(rgba);
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.recording.draw(vertex_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 32);
        let u = DrawUniforms::new(Vec2::new(0.5, -0.25), [1.0, 0.0, 0.0, 1.0]);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&u));
        assert_eq!(floats, &[0.5, -0.25, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn overlay_blend_maps_to_wgpu_factors() {
        let state = blend_state(BlendFunc::OVERLAY);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::Src);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(state.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(state.alpha.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
    }

    fn quad(n: usize, x: f32) -> Vec<GlyphVertex> {
        vec![GlyphVertex::new(x, 0.0, 0.0, 0.0); n]
    }

    #[test]
    fn each_upload_gets_its_own_vertex_range() {
        let shadow = Vec2::new(0.01, -0.02);
        let black = [0.0, 0.0, 0.0, 1.0];
        let white = [1.0; 4];

        let mut rec = FrameRecording::new(false);
        let saved = rec.save();
        rec.apply(&OverlayState::default());

        rec.upload(&quad(12, 1.0));
        rec.set_offset(shadow);
        rec.set_color(black);
        rec.draw(12);
        rec.set_offset(Vec2::ZERO);
        rec.set_color(white);
        rec.draw(12);

        rec.upload(&quad(6, 2.0));
        rec.set_offset(shadow);
        rec.set_color(black);
        rec.draw(6);
        rec.set_offset(Vec2::ZERO);
        rec.set_color(white);
        rec.draw(6);

        rec.restore(saved);

        let ranges: Vec<_> = rec.draws().iter().map(|d| d.vertices.clone()).collect();
        assert_eq!(ranges, vec![0..12, 0..12, 12..18, 12..18]);
        assert_eq!(rec.vertices().len(), 18);
        assert_eq!(rec.vertices()[12].position[0], 2.0);

        let uniforms: Vec<_> = rec.draws().iter().map(|d| d.uniforms).collect();
        assert_eq!(uniforms[0], DrawUniforms::new(shadow, black));
        assert_eq!(uniforms[1], DrawUniforms::new(Vec2::ZERO, white));
        assert_eq!(uniforms[2], DrawUniforms::new(shadow, black));
        assert_eq!(uniforms[3], DrawUniforms::new(Vec2::ZERO, white));
        assert!(rec.draws().iter().all(|d| d.blend() == Some(BlendFunc::OVERLAY)));
    }

    #[test]
    fn draw_without_applied_state_is_dropped() {
        let mut rec = FrameRecording::new(false);
        let saved = rec.save();
        rec.apply(&OverlayState::default());
        rec.upload(&quad(6, 0.0));
        rec.draw(6);
        rec.restore(saved);

        rec.draw(6);
        assert_eq!(rec.draws().len(), 1);
    }

    #[test]
    fn take_starts_a_fresh_frame() {
        let mut rec = FrameRecording::new(false);
        rec.apply(&OverlayState::default());
        rec.upload(&quad(6, 0.0));
        rec.draw(6);

        let (vertices, draws) = rec.take();
        assert_eq!((vertices.len(), draws.len()), (6, 1));

        rec.upload(&quad(6, 0.0));
        rec.draw(6);
        assert_eq!(rec.draws()[0].vertices, 0..6);
    }

    #[test]
    fn srgb_target_linearizes_color_but_not_alpha() {
        let yellow = osd_core::Color::YELLOW.to_rgba_f32();

        let mut linear = FrameRecording::new(false);
        linear.apply(&OverlayState::default());
        linear.set_color(yellow);
        linear.draw(0);
        assert_eq!(linear.draws()[0].uniforms.color, yellow);

        let mut srgb = FrameRecording::new(true);
        srgb.apply(&OverlayState::default());
        srgb.set_color(yellow);
        srgb.draw(0);
        let color = srgb.draws()[0].uniforms.color;
        assert!((color[0] - 1.0).abs() < 1e-6);
        assert!((color[2] - srgb_to_linear(48.0 / 255.0)).abs() < 1e-6);
        assert!(color[2] < 0.04);
        assert_eq!(color[3], yellow[3]);
    }

    #[test]
    fn uniform_stride_is_aligned() {
        assert_eq!(align_to(32, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(257, 256), 512);
    }
}

use bytemuck::{Pod, Zeroable};

use crate::atlas::{AtlasImage, BYTES_PER_TEXEL};
use crate::core::FramePlan;
use crate::render::{RenderCtx, RenderTarget};
use crate::stage::Stage;
use crate::vertex_buffer::{SpriteVertex, VertexBuffer};

/// Draws every entity quad from one shared vertex buffer and one atlas texture.
///
/// GPU resources mirror the stage's CPU shadows:
/// - the vertex buffer holds `capacity` quads; only slots written since the
///   last `sync` are re-uploaded, in runs of consecutive slots
/// - the atlas texture is uploaded whole on creation, then per dirty region
///
/// Each visible entity is one `draw(slot * 6 .. slot * 6 + 6)` call.
#[derive(Default)]
pub struct SpriteRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    view_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_capacity: u32,

    atlas_texture: Option<wgpu::Texture>,
    atlas_size: (u32, u32),
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads quads and atlas pixels changed since the previous call.
    pub fn sync(&mut self, ctx: &RenderCtx<'_>, stage: &mut Stage) {
        self.sync_vertices(ctx, stage.vertex_buffer_mut());
        self.sync_atlas(ctx, stage.atlas_mut());
    }

    /// Clears to the plan's background and draws its quads.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, plan: &FramePlan) {
        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        self.write_view_uniform(ctx, plan);

        let bg = plan.background;
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("reworld sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: bg.r as f64,
                        g: bg.g as f64,
                        b: bg.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if plan.draws.is_empty() {
            return;
        }

        let (Some(pipeline), Some(bind_group), Some(vbo)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.vertex_buffer.as_ref(),
        ) else {
            log::warn!("sprite renderer not synced; skipping {} draws", plan.draws.len());
            return;
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));

        for draw in &plan.draws {
            let first = draw.first_vertex;
            rpass.draw(first..first + draw.vertex_count, 0..1);
        }
    }

    fn sync_vertices(&mut self, ctx: &RenderCtx<'_>, shadow: &mut VertexBuffer) {
        if self.vertex_buffer.is_none() || self.vertex_capacity != shadow.capacity() {
            let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("reworld sprite vbo"),
                size: shadow.byte_size().max(1),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            ctx.queue
                .write_buffer(&buffer, 0, bytemuck::cast_slice(shadow.vertices()));
            shadow.take_dirty();

            log::debug!("sprite vbo created: {} quads", shadow.capacity());
            self.vertex_buffer = Some(buffer);
            self.vertex_capacity = shadow.capacity();
            return;
        }

        let Some(buffer) = self.vertex_buffer.as_ref() else { return };
        for (first, count) in slot_runs(&shadow.take_dirty()) {
            ctx.queue.write_buffer(
                buffer,
                VertexBuffer::byte_offset(first),
                bytemuck::cast_slice(shadow.quads(first, count)),
            );
        }
    }

    fn sync_atlas(&mut self, ctx: &RenderCtx<'_>, shadow: &mut AtlasImage) {
        let size = (shadow.width(), shadow.height());
        if self.atlas_texture.is_none() || self.atlas_size != size {
            let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("reworld atlas"),
                size: wgpu::Extent3d {
                    width: size.0.max(1),
                    height: size.1.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            upload_atlas_rect(ctx, &texture, shadow, 0, 0, size.0, size.1);
            shadow.take_dirty();

            log::debug!("atlas texture created: {}x{}", size.0, size.1);
            self.atlas_texture = Some(texture);
            self.atlas_size = size;
            // The bind group references the old view.
            self.bind_group = None;
            return;
        }

        let Some(texture) = self.atlas_texture.as_ref() else { return };
        for region in shadow.take_dirty() {
            upload_atlas_rect(ctx, texture, shadow, region.x, region.y, region.width, region.height);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reworld sprite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sprite.wgsl").into()),
        });

        let bind_group_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("reworld sprite bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<ViewUniform>() as u64,
                            ),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("reworld sprite pipeline layout"),
                bind_group_layouts: &[&bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("reworld sprite pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let (Some(bgl), Some(texture)) = (self.bind_group_layout.as_ref(), self.atlas_texture.as_ref())
        else {
            return;
        };

        let view_ubo = self.view_ubo.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("reworld sprite view ubo"),
                size: std::mem::size_of::<ViewUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        // Nearest filtering keeps pixel art crisp and stops bleeding between
        // neighbouring atlas regions.
        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("reworld atlas sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Nearest,
                min_filter: wgpu::FilterMode::Nearest,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("reworld sprite bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: view_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.bind_group = Some(bind_group);
    }

    fn write_view_uniform(&self, ctx: &RenderCtx<'_>, plan: &FramePlan) {
        let Some(ubo) = self.view_ubo.as_ref() else { return };
        let u = ViewUniform::from_plan(plan);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

/// Screen size and view offset, matching `View` in `sprite.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct ViewUniform {
    screen_size: [f32; 2],
    offset: [f32; 2],
}

impl ViewUniform {
    fn from_plan(plan: &FramePlan) -> Self {
        let vp = plan.viewport;
        Self {
            screen_size: [vp.width.max(1.0), vp.height.max(1.0)],
            offset: vp.offset.to_array(),
        }
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x2, // position
    1 => Float32x2, // uv
    2 => Float32x3, // tint
    3 => Float32x2, // origin
    4 => Float32    // rotation
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<SpriteVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Copies one rectangle of the atlas shadow into the texture.
fn upload_atlas_rect(
    ctx: &RenderCtx<'_>,
    texture: &wgpu::Texture,
    shadow: &AtlasImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) {
    if width == 0 || height == 0 {
        return;
    }

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x, y, z: 0 },
            aspect: wgpu::TextureAspect::All,
        },
        shadow.pixels(),
        wgpu::TexelCopyBufferLayout {
            offset: shadow.offset_of(x, y) as u64,
            bytes_per_row: Some(shadow.width() * BYTES_PER_TEXEL as u32),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Groups ascending slot indices into `(first, count)` runs of consecutive slots.
fn slot_runs(slots: &[u32]) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for &slot in slots {
        match runs.last_mut() {
            Some((first, count)) if *first + *count == slot => *count += 1,
            _ => runs.push((slot, 1)),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Rgb, Vec2, Viewport};

    #[test]
    fn runs_merge_consecutive_slots() {
        assert_eq!(slot_runs(&[0, 1, 2, 5, 7, 8]), vec![(0, 3), (5, 1), (7, 2)]);
        assert!(slot_runs(&[]).is_empty());
    }

    #[test]
    fn vertex_layout_matches_sprite_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 40);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 8, 16, 28, 36]);
    }

    #[test]
    fn view_uniform_carries_offset() {
        let plan = FramePlan {
            viewport: Viewport::new(800.0, 600.0).with_offset(Vec2::new(-12.0, 4.0)),
            background: Rgb::BLACK,
            draws: Vec::new(),
        };
        let u = ViewUniform::from_plan(&plan);
        assert_eq!(u.screen_size, [800.0, 600.0]);
        assert_eq!(u.offset, [-12.0, 4.0]);
        assert_eq!(std::mem::size_of::<ViewUniform>(), 16);
    }
}

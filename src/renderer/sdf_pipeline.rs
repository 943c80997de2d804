//! SDF-based WebGPU canvas
//!
//! Collects a frame's discs on the CPU and shades them all in one fullscreen
//! fragment pass. Discs beyond `MAX_DISCS` are dropped for that frame.

use bytemuck::{Pod, Zeroable};
use glam::{UVec2, Vec2};
use wgpu::util::DeviceExt;

use super::{Canvas, Paint, SurfaceError};

/// Maximum discs per frame (12 circles x 3 layers fits comfortably)
const MAX_DISCS: usize = 64;

// ============================================================================
// GPU DATA STRUCTURES (must match circles.wgsl)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2], // offset 0
    device_scale: f32,    // offset 8
    disc_count: u32,      // offset 12
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DiscData {
    center: [f32; 2],
    radius: f32,
    kind: u32, // 0 = solid, 1 = radial
    color0: [f32; 4],
    color1: [f32; 4],
    color2: [f32; 4],
    offsets: [f32; 4], // 80 bytes, uniform array stride
}

impl DiscData {
    fn new(center: Vec2, radius: f32, paint: &Paint) -> Self {
        match paint {
            Paint::Solid(color) => Self {
                center: center.to_array(),
                radius,
                kind: 0,
                color0: color.to_array(),
                color1: color.to_array(),
                color2: color.to_array(),
                offsets: [0.0, 1.0, 1.0, 0.0],
            },
            Paint::Radial(stops) => Self {
                center: center.to_array(),
                radius,
                kind: 1,
                color0: stops[0].color.to_array(),
                color1: stops[1].color.to_array(),
                color2: stops[2].color.to_array(),
                offsets: [stops[0].offset, stops[1].offset, stops[2].offset, 0.0],
            },
        }
    }
}

// ============================================================================
// SDF CANVAS
// ============================================================================

pub struct SdfCanvas {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    discs_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    device_scale: f32,
    discs: Vec<DiscData>,
}

impl SdfCanvas {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, SurfaceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("halo-device"),
                required_features: wgpu::Features::empty(),
                // Texture size limits come from the adapter so HiDPI headers fit
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .map_err(|e| SurfaceError::Backend(e.to_string()))?;

        let surface_caps = surface.get_capabilities(adapter);
        log::debug!("Surface formats: {:?}", surface_caps.formats);
        log::debug!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        // Palette values are already sRGB-encoded, so write them straight through
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or(SurfaceError::Unavailable)?;

        // The header must show through, so keep the canvas translucent if we can
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            let fallback = surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto);
            log::warn!(
                "Premultiplied alpha unsupported; using {:?}, the canvas may hide content behind it",
                fallback
            );
            fallback
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.clamp(1, device.limits().max_texture_dimension_2d),
            height: height.clamp(1, device.limits().max_texture_dimension_2d),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "Surface config: {}x{} {:?}, alpha: {:?}",
            config.width,
            config.height,
            config.format,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("circles_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("circles.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [config.width as f32, config.height as f32],
                device_scale: 1.0,
                disc_count: 0,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let discs_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("discs"),
            size: (std::mem::size_of::<DiscData>() * MAX_DISCS) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("circles_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("circles_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: discs_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("circles_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("circles_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            discs_buffer,
            bind_group,
            device_scale: 1.0,
            discs: Vec::with_capacity(MAX_DISCS),
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

impl Canvas for SdfCanvas {
    fn max_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    fn configure(&mut self, backing: UVec2, device_scale: f32) -> Result<(), SurfaceError> {
        if backing.x == 0 || backing.y == 0 {
            return Err(SurfaceError::ZeroSized);
        }
        // Clamping here would desync the shader's logical-to-device mapping
        let max = self.max_dimension();
        if backing.x > max || backing.y > max {
            return Err(SurfaceError::Backend(format!(
                "{}x{} backing exceeds texture limit {}",
                backing.x, backing.y, max
            )));
        }
        self.config.width = backing.x;
        self.config.height = backing.y;
        self.surface.configure(&self.device, &self.config);
        self.device_scale = device_scale;
        Ok(())
    }

    fn clear(&mut self, _size: Vec2) {
        // The render pass clears the whole target; the logical area is all of it
        self.discs.clear();
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        if self.discs.len() >= MAX_DISCS {
            log::trace!("Disc limit reached, dropping draw");
            return;
        }
        self.discs.push(DiscData::new(center, radius, paint));
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                resolution: [self.config.width as f32, self.config.height as f32],
                device_scale: self.device_scale,
                disc_count: self.discs.len() as u32,
            }),
        );
        if !self.discs.is_empty() {
            self.queue
                .write_buffer(&self.discs_buffer, 0, bytemuck::cast_slice(&self.discs));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Err(SurfaceError::Lost);
            }
            Err(e) => return Err(SurfaceError::Backend(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("circles_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("circles_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::GradientStop;
    use crate::sim::Rgba;

    #[test]
    fn test_disc_layout_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<Globals>(), 16);
        assert_eq!(std::mem::size_of::<DiscData>(), 80);
        assert!(std::mem::size_of::<DiscData>() * MAX_DISCS <= 16384);
    }

    #[test]
    fn test_disc_from_radial_paint() {
        let base = Rgba::new(0.5, 0.25, 1.0, 0.3);
        let paint = Paint::Radial([
            GradientStop { offset: 0.0, color: base },
            GradientStop { offset: 0.7, color: base.with_alpha(0.1) },
            GradientStop { offset: 1.0, color: base.with_alpha(0.0) },
        ]);
        let disc = DiscData::new(Vec2::new(10.0, 20.0), 5.0, &paint);
        assert_eq!(disc.kind, 1);
        assert_eq!(disc.center, [10.0, 20.0]);
        assert_eq!(disc.offsets[1], 0.7);
        assert_eq!(disc.color2[3], 0.0);
    }
}

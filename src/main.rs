use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use pollster::block_on;
use wgpu::util::DeviceExt;

use shadelink::pipeline::DepthBuffer;
use shadelink::variant::overlay::OverlayVertex;
use shadelink::variant::solid::ColorVertex;
use shadelink::variant::textured::TexturedVertex;
use shadelink::variant::{self, InstanceRecord};
use shadelink::{Pipelines, ProgramLinker, UniformStore};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let linker = ProgramLinker::new();
    for desc in variant::ALL {
        let program = linker.link(desc)?;
        println!("program `{}`:", program.name());
        for binding in program.bindings() {
            println!(
                "  {} -> (group {}, binding {})",
                binding.name, binding.group, binding.binding
            );
        }
    }

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .context("failed to acquire GPU adapter")?;
    let (device, queue) = block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("shadelink-demo"),
        ..Default::default()
    }))
    .context("failed to create GPU device")?;

    let mut uniforms = UniformStore::new(&device, WIDTH, HEIGHT);
    uniforms.camera.position = Vec3::new(0.0, 1.5, 6.0);
    uniforms.light.position = Vec3::new(0.0, 5.0, 2.0);

    let mut pipelines = Pipelines::new(&device, FORMAT, &linker, &uniforms)?;
    populate_scene(&device, &queue, &mut pipelines);

    uniforms.upload(&queue);
    render_frame(&device, &queue, &pipelines, &uniforms)?;

    println!("rendered one demo frame ({WIDTH}x{HEIGHT})");
    Ok(())
}

fn populate_scene(device: &wgpu::Device, queue: &wgpu::Queue, pipelines: &mut Pipelines) {
    // ground plane for the static program
    let ground = [
        ColorVertex {
            position: [-5.0, 0.0, -5.0],
            color: [0.3, 0.5, 0.3],
            normal: [0.0, 1.0, 0.0],
        },
        ColorVertex {
            position: [5.0, 0.0, -5.0],
            color: [0.3, 0.5, 0.3],
            normal: [0.0, 1.0, 0.0],
        },
        ColorVertex {
            position: [5.0, 0.0, 5.0],
            color: [0.3, 0.5, 0.3],
            normal: [0.0, 1.0, 0.0],
        },
        ColorVertex {
            position: [-5.0, 0.0, 5.0],
            color: [0.3, 0.5, 0.3],
            normal: [0.0, 1.0, 0.0],
        },
    ];
    pipelines
        .solid
        .add_mesh(device, &ground, &[0, 2, 1, 0, 3, 2]);

    // a row of upright quads for the instanced program
    let quad = [
        ColorVertex {
            position: [-0.5, 0.0, 0.0],
            color: [0.8, 0.2, 0.2],
            normal: [0.0, 0.0, 1.0],
        },
        ColorVertex {
            position: [0.5, 0.0, 0.0],
            color: [0.8, 0.2, 0.2],
            normal: [0.0, 0.0, 1.0],
        },
        ColorVertex {
            position: [0.5, 1.0, 0.0],
            color: [0.8, 0.2, 0.2],
            normal: [0.0, 0.0, 1.0],
        },
        ColorVertex {
            position: [-0.5, 1.0, 0.0],
            color: [0.8, 0.2, 0.2],
            normal: [0.0, 0.0, 1.0],
        },
    ];
    let instances: Vec<InstanceRecord> = (0..4)
        .map(|index| {
            let model = Mat4::from_translation(Vec3::new(index as f32 * 1.5 - 2.25, 0.0, -2.0));
            let normal = Mat3::from_mat4(model).inverse().transpose();
            InstanceRecord::new(model, normal)
        })
        .collect();
    pipelines
        .instanced
        .add_mesh(device, &quad, &[0, 1, 2, 0, 2, 3], &instances);

    // a single checker-textured quad for the textured program
    let (texture_view, sampler) = checker_texture(device, queue);
    let textured_quad = [
        TexturedVertex {
            position: [-1.0, 0.0, 1.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0, 1.0, 0.0],
        },
        TexturedVertex {
            position: [1.0, 0.0, 1.0],
            tex_coords: [1.0, 0.0],
            normal: [0.0, 1.0, 0.0],
        },
        TexturedVertex {
            position: [1.0, 0.0, 3.0],
            tex_coords: [1.0, 1.0],
            normal: [0.0, 1.0, 0.0],
        },
        TexturedVertex {
            position: [-1.0, 0.0, 3.0],
            tex_coords: [0.0, 1.0],
            normal: [0.0, 1.0, 0.0],
        },
    ];
    pipelines.textured.add_mesh(
        device,
        &texture_view,
        &sampler,
        &textured_quad,
        &[0, 2, 1, 0, 3, 2],
        &[InstanceRecord::identity()],
    );

    // UI plane in front of the camera
    let overlay_quad = [
        OverlayVertex {
            position: [-0.5, 2.0, 4.0],
            tex_coords: [0.0, 1.0],
        },
        OverlayVertex {
            position: [0.5, 2.0, 4.0],
            tex_coords: [1.0, 1.0],
        },
        OverlayVertex {
            position: [0.5, 3.0, 4.0],
            tex_coords: [1.0, 0.0],
        },
        OverlayVertex {
            position: [-0.5, 3.0, 4.0],
            tex_coords: [0.0, 0.0],
        },
    ];
    pipelines
        .overlay
        .add_quad(device, &texture_view, &sampler, &overlay_quad, &[0, 1, 2, 0, 2, 3]);
}

fn checker_texture(device: &wgpu::Device, queue: &wgpu::Queue) -> (wgpu::TextureView, wgpu::Sampler) {
    let mut pixels = Vec::with_capacity(4 * 4 * 4);
    for y in 0..4u8 {
        for x in 0..4u8 {
            let on = (x + y) % 2 == 0;
            pixels.extend_from_slice(if on {
                &[230, 230, 230, 255]
            } else {
                &[40, 40, 40, 255]
            });
        }
    }
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("demo-checker"),
            size: wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &pixels,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor::default());
    (view, sampler)
}

fn render_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipelines: &Pipelines,
    uniforms: &UniformStore,
) -> Result<()> {
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("demo-target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());
    let depth = DepthBuffer::new(device, WIDTH, HEIGHT);

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("demo-encoder"),
    });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("demo-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(Pipelines::clear_color(&uniforms.fog)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pipelines.record(&mut pass);
    }
    queue.submit(std::iter::once(encoder.finish()));
    Ok(())
}

//! Render a small room and save it as PNG.
//!
//! Usage: cargo run --example render_room -p lume_tracer [config.json] [output.png]

use anyhow::Context;
use lume_core::{Config, Light, Material, Mesh, Observer, Scene};
use lume_math::{Energy, Mat4, Vec3};
use lume_tracer::{prepare_scene, Tracer};
use rayon::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => Config::load(&path).with_context(|| format!("loading {path}"))?,
        None => Config {
            render_occlusion: true,
            render_ambient_colors: true,
            sampler_limit: 8,
            width: 320,
            height: 240,
            ..Default::default()
        },
    };
    let output = args.next().unwrap_or_else(|| "room.png".to_string());

    let start = std::time::Instant::now();
    let mut scene = build_scene(config)?;
    prepare_scene(&mut scene);
    log::info!("Scene ready in {:?}", start.elapsed());

    let start = std::time::Instant::now();
    let tracer = Tracer::new(&scene);
    let observer = scene.observers.first().context("scene has no observer")?;
    let (width, height) = (scene.config.width, scene.config.height);
    let camera = PinholeCamera::new(observer, width, height);

    let pixels: Vec<u8> = (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            let tracer = &tracer;
            let camera = &camera;
            (0..width).flat_map(move |x| {
                let color = tracer.trace(camera.origin, camera.direction(x, y));
                to_rgba(color)
            })
        })
        .collect();
    log::info!("Rendered {}x{} in {:?}", width, height, start.elapsed());

    image::save_buffer(&output, &pixels, width, height, image::ColorType::Rgba8)
        .with_context(|| format!("saving {output}"))?;
    log::info!("Saved to {}", output);
    Ok(())
}

fn build_scene(config: Config) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(config);

    let white = scene.add_material(Material::diffuse(Energy::new(0.8, 0.8, 0.8, 1.0)));
    let red = scene.add_material(Material::diffuse(Energy::new(0.8, 0.1, 0.1, 1.0)));
    let green = scene.add_material(Material::diffuse(Energy::new(0.1, 0.7, 0.1, 1.0)));
    let mirror = scene.add_material(Material::diffuse(Energy::ONE).with_glossiness(0.8));
    let glass = scene.add_material(Material::diffuse(Energy::ONE).with_transmission(0.9, 1.5));
    let lamp = scene.add_material(Material::emitter(Energy::new(1.0, 0.95, 0.85, 1.0), 0.0));

    // Unit quad in the XZ plane facing +Y
    let quad = Mesh::new(
        vec![
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(-0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::new(0.5, 0.0, -0.5),
        ],
        vec![0, 1, 2, 0, 2, 3],
    );
    let wall = |translation: Vec3, rotation: Mat4| {
        Mat4::from_translation(translation) * rotation * Mat4::from_scale(Vec3::splat(4.0))
    };
    let half_pi = std::f32::consts::FRAC_PI_2;

    let walls = [
        ("floor", wall(Vec3::ZERO, Mat4::IDENTITY), white),
        ("ceiling", wall(Vec3::new(0.0, 4.0, 0.0), Mat4::from_rotation_x(2.0 * half_pi)), white),
        ("back", wall(Vec3::new(0.0, 2.0, -2.0), Mat4::from_rotation_x(half_pi)), white),
        ("left", wall(Vec3::new(-2.0, 2.0, 0.0), Mat4::from_rotation_z(-half_pi)), red),
        ("right", wall(Vec3::new(2.0, 2.0, 0.0), Mat4::from_rotation_z(half_pi)), green),
    ];
    for (name, matrix, material) in walls {
        scene.add_object(name, quad.to_triangles(matrix, material, false))?;
    }

    let lamp_matrix = Mat4::from_translation(Vec3::new(0.0, 3.99, 0.0))
        * Mat4::from_rotation_x(2.0 * half_pi)
        * Mat4::from_scale(Vec3::splat(0.8));
    scene.add_object("lamp", quad.to_triangles(lamp_matrix, lamp, false))?;

    let panel = |x: f32| {
        Mat4::from_translation(Vec3::new(x, 1.0, -0.5))
            * Mat4::from_rotation_x(half_pi)
            * Mat4::from_scale(Vec3::new(1.2, 1.0, 2.0))
    };
    scene.add_object("mirror", quad.to_triangles(panel(-0.9), mirror, false))?;
    scene.add_object("glass", quad.to_triangles(panel(0.9), glass, true))?;

    scene.add_light(Light::point(Vec3::new(0.0, 3.5, 0.5), Energy::ONE, 6.0));
    scene.add_observer(Observer::new(Vec3::new(0.0, 2.0, 5.5), Vec3::new(0.0, 1.8, 0.0), Vec3::Y));

    Ok(scene)
}

struct PinholeCamera {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    half_width: f32,
    half_height: f32,
    width: u32,
    height: u32,
}

impl PinholeCamera {
    fn new(observer: &Observer, width: u32, height: u32) -> Self {
        let forward = (observer.target - observer.position).normalize();
        let right = forward.cross(observer.up).normalize();
        let up = right.cross(forward);
        let half_height = (observer.fov.to_radians() / 2.0).tan();
        let half_width = half_height * width as f32 / height as f32;

        Self {
            origin: observer.position,
            forward,
            right,
            up,
            half_width,
            half_height,
            width,
            height,
        }
    }

    fn direction(&self, x: u32, y: u32) -> Vec3 {
        let u = ((x as f32 + 0.5) / self.width as f32) * 2.0 - 1.0;
        let v = 1.0 - ((y as f32 + 0.5) / self.height as f32) * 2.0;
        (self.forward + self.right * (u * self.half_width) + self.up * (v * self.half_height)).normalize()
    }
}

fn to_rgba(color: Energy) -> [u8; 4] {
    let c = lume_math::clamp_color(color);
    [(c.x * 255.0) as u8, (c.y * 255.0) as u8, (c.z * 255.0) as u8, 255]
}

//! Bloom Demo
//!
//! Renders a procedural HDR test scene (a dark field with a few bright
//! emitters), runs the bloom effect host over it, composites with a
//! Reinhard tone-map, and writes `glow.png` next to the working directory.
//!
//! Run with `cargo run --example glow`.

use glam::Vec4;

use afterglow::prelude::*;

/// Builds a dark HDR scene with bright emitters of varying size and color.
fn build_scene(resolution: Resolution) -> ColorBuffer {
    let mut scene = ColorBuffer::new(resolution);
    scene.fill(Vec4::new(0.02, 0.02, 0.03, 1.0));

    let emitters: [(u32, u32, u32, Vec4); 4] = [
        (96, 96, 3, Vec4::new(10.0, 8.0, 2.0, 1.0)),
        (300, 140, 2, Vec4::new(2.0, 6.0, 12.0, 1.0)),
        (200, 320, 5, Vec4::new(9.0, 2.0, 2.0, 1.0)),
        (400, 400, 1, Vec4::new(6.0, 6.0, 6.0, 1.0)),
    ];

    for (cx, cy, radius, color) in emitters {
        for y in cy.saturating_sub(radius)..=(cy + radius).min(resolution.height - 1) {
            for x in cx.saturating_sub(radius)..=(cx + radius).min(resolution.width - 1) {
                let dx = x as i64 - cx as i64;
                let dy = y as i64 - cy as i64;
                if dx * dx + dy * dy <= i64::from(radius * radius) {
                    scene.set_texel(x, y, color);
                }
            }
        }
    }
    scene
}

fn main() {
    env_logger::init();

    let resolution = Resolution::new(512, 512);
    let scene = build_scene(resolution);

    let settings = BloomSettings {
        iterations: 6,
        intensity: 0.8,
        threshold: 0.6,
        soft_knee: 0.7,
    };
    let mut host = EffectHost::new(settings, HostConfig::default());
    host.initialize();

    host.render_frame(&scene);
    let frame = host.composite(
        &scene,
        &DisplayParams {
            exposure: 1.2,
            tone_mapping: ToneMapping::Reinhard,
            ..DisplayParams::default()
        },
    );

    // Encode to 8-bit sRGB-ish output (simple gamma 2.2).
    let mut rgba = Vec::with_capacity(frame.resolution().area() * 4);
    for p in frame.pixels() {
        for c in [p.x, p.y, p.z] {
            let srgb = c.clamp(0.0, 1.0).powf(1.0 / 2.2);
            rgba.push((srgb * 255.0).round() as u8);
        }
        rgba.push(255);
    }

    let image = image::RgbaImage::from_raw(resolution.width, resolution.height, rgba)
        .expect("pixel count matches dimensions");
    image.save("glow.png").expect("failed to write glow.png");

    println!("=== Bloom Demo ===");
    println!("scene:      {resolution}");
    println!("iterations: {}", host.settings().iterations);
    println!(
        "pool:       {} buffers ({} outstanding)",
        host.pool().total_buffer_count(),
        host.pool().outstanding()
    );
    println!("wrote glow.png");

    host.teardown();
}

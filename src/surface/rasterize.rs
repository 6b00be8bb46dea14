use egui::epaint::{FontImage, Mesh, Vertex};
use egui::{Pos2, pos2};
use image::{Rgba, RgbaImage};

/// Software rasterizer for tessellated egui meshes.
///
/// Shapes and text are tessellated by epaint exactly as they would be for the
/// GPU; this fills the resulting triangles into a CPU-side RGBA buffer. The
/// font atlas is sampled for coverage; untextured shapes point at the atlas'
/// white texel so the same path handles both.
pub(crate) fn fill_mesh(target: &mut RgbaImage, mesh: &Mesh, atlas: &FontImage) {
    for tri in mesh.indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            mesh.vertices.get(tri[0] as usize),
            mesh.vertices.get(tri[1] as usize),
            mesh.vertices.get(tri[2] as usize),
        ) else {
            log::warn!("Mesh index out of range, skipping triangle {tri:?}");
            continue;
        };
        fill_triangle(target, a, b, c, atlas);
    }
}

fn edge(a: Pos2, b: Pos2, p: Pos2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn fill_triangle(target: &mut RgbaImage, a: &Vertex, b: &Vertex, c: &Vertex, atlas: &FontImage) {
    let area = edge(a.pos, b.pos, c.pos);
    if area.abs() < f32::EPSILON {
        return;
    }

    let (width, height) = target.dimensions();
    let min_x = a.pos.x.min(b.pos.x).min(c.pos.x).floor().max(0.0) as u32;
    let min_y = a.pos.y.min(b.pos.y).min(c.pos.y).floor().max(0.0) as u32;
    let max_x = (a.pos.x.max(b.pos.x).max(c.pos.x).ceil() as i64).clamp(0, width as i64) as u32;
    let max_y = (a.pos.y.max(b.pos.y).max(c.pos.y).ceil() as i64).clamp(0, height as i64) as u32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = pos2(x as f32 + 0.5, y as f32 + 0.5);
            // Normalized barycentric weights; all non-negative inside regardless of winding.
            let wa = edge(b.pos, c.pos, p) / area;
            let wb = edge(c.pos, a.pos, p) / area;
            let wc = edge(a.pos, b.pos, p) / area;
            if wa < 0.0 || wb < 0.0 || wc < 0.0 {
                continue;
            }

            let u = wa * a.uv.x + wb * b.uv.x + wc * c.uv.x;
            let v = wa * a.uv.y + wb * b.uv.y + wc * c.uv.y;
            let coverage = sample_coverage(atlas, u, v);
            if coverage <= 0.0 {
                continue;
            }

            let channel = |i: usize| {
                wa * a.color[i] as f32 + wb * b.color[i] as f32 + wc * c.color[i] as f32
            };
            let src = [channel(0), channel(1), channel(2), channel(3)].map(|ch| ch * coverage);
            blend_premultiplied(target.get_pixel_mut(x, y), src);
        }
    }
}

/// Nearest-texel lookup of the atlas coverage at normalized `(u, v)`
fn sample_coverage(atlas: &FontImage, u: f32, v: f32) -> f32 {
    let [w, h] = atlas.size;
    if w == 0 || h == 0 {
        return 1.0;
    }
    let tx = ((u * w as f32) as usize).min(w - 1);
    let ty = ((v * h as f32) as usize).min(h - 1);
    atlas.pixels.get(ty * w + tx).copied().unwrap_or(0.0)
}

/// Source-over with a premultiplied source in 0..=255 space
fn blend_premultiplied(dst: &mut Rgba<u8>, src: [f32; 4]) {
    let inv_alpha = 1.0 - (src[3] / 255.0).clamp(0.0, 1.0);
    for i in 0..3 {
        let out = src[i] + dst.0[i] as f32 * inv_alpha;
        dst.0[i] = out.round().clamp(0.0, 255.0) as u8;
    }
    let out_alpha = src[3] + dst.0[3] as f32 * inv_alpha;
    dst.0[3] = out_alpha.round().clamp(0.0, 255.0) as u8;
}

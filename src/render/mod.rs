//! Pinhole camera, Lambert shading and the parallel render loop
//!
//! The scene is explicit state passed by reference: the tree is read-only
//! during rendering and every pixel writes a disjoint cell, so rows are
//! shaded in parallel without synchronization.
//!
//! Author: Moroya Sakamoto

use crate::io::Image;
use crate::march::{trace, TraceMethod};
use crate::types::{BlobTree, Ray, TreeError};
use glam::DVec3;
use rayon::prelude::*;

/// Pinhole camera looking at the world origin
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Camera position; the view direction is `normalize(-origin)`
    pub origin: DVec3,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl Camera {
    /// Film aperture width, inches
    const APERTURE: f64 = 1.995;
    /// Focal length, millimeters
    const FOCAL: f64 = 35.0;

    /// Create a camera at `origin` for a `width` x `height` image
    pub fn new(origin: DVec3, width: u32, height: u32) -> Self {
        Camera {
            origin,
            width,
            height,
        }
    }

    /// Ray through pixel `(px, py)`, with `py` growing downward
    pub fn pixel_ray(&self, px: u32, py: u32) -> Ray {
        let view = (-self.origin).normalize();
        let horizontal = view.cross(DVec3::Z).normalize();
        let vertical = horizontal.cross(view).normalize();

        let w = f64::from(self.width);
        let h = f64::from(self.height);

        // Horizontal aperture angle, vertical matched to the image ratio
        let avh = 2.0 * (Self::APERTURE * 25.4 * 0.5 / Self::FOCAL).atan();
        let avv = 2.0 * ((avh / 2.0).tan() * h / w).atan();

        let v_len = (avv / 2.0).tan();
        let h_len = v_len * (w / h);

        // Pixel to [-1, 1]^2 screen coordinates, y up
        let x = (f64::from(px) - w / 2.0) / (w / 2.0);
        let y = (h / 2.0 - f64::from(py)) / (h / 2.0);

        let direction = (view + horizontal * (h_len * x) + vertical * (v_len * y)).normalize();
        Ray::new(self.origin, direction)
    }
}

/// Everything one render needs: the field, the camera and the light
#[derive(Debug, Clone)]
pub struct Scene {
    /// The implicit field
    pub tree: BlobTree,
    /// Pinhole camera
    pub camera: Camera,
    /// Directional sun light
    pub sun: DVec3,
}

/// Color and cost buffers produced by one render pass
#[derive(Debug)]
pub struct RenderOutput {
    /// Lambert-shaded color image
    pub color: Image,
    /// Per-pixel step count mapped to the green channel
    pub cost: Image,
}

/// Shade one pixel, returning its color and cost triples
fn pixel_color(scene: &Scene, method: TraceMethod, px: u32, py: u32) -> ([f64; 3], [f64; 3]) {
    let ray = scene.camera.pixel_ray(px, py);
    let result = trace(&scene.tree, &ray, method);

    let mut color = [0.0; 3];
    if result.hit {
        let position = ray.at(result.t);
        let normal = -scene.tree.gradient(position).normalize_or_zero();
        let lambert = normal.dot(scene.sun).max(0.1);
        color[0] = 255.0 * lambert;
    }

    let c = (f64::from(result.steps) / 512.0).min(1.0);
    (color, [0.0, c * 255.0, 0.0])
}

/// Render the scene with the selected marcher
///
/// Fails fast with [`TreeError::ZeroLipschitz`] when the field's global
/// bound is zero, since no safe step can be derived from it. Rows are
/// shaded in parallel; pixel order does not affect the output.
pub fn render(scene: &Scene, method: TraceMethod) -> Result<RenderOutput, TreeError> {
    if scene.tree.k() <= 0.0 {
        return Err(TreeError::ZeroLipschitz);
    }

    let width = scene.camera.width as usize;
    let mut color = Image::new(scene.camera.width, scene.camera.height);
    let mut cost = Image::new(scene.camera.width, scene.camera.height);

    color
        .pixels
        .par_chunks_mut(width)
        .zip(cost.pixels.par_chunks_mut(width))
        .enumerate()
        .for_each(|(py, (color_row, cost_row))| {
            for px in 0..width {
                let (c, s) = pixel_color(scene, method, px as u32, py as u32);
                color_row[px] = c;
                cost_row[px] = s;
            }
        });

    Ok(RenderOutput { color, cost })
}

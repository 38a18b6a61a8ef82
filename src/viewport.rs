use serde::Serialize;

use crate::config::ZoomConfig;
use crate::layout::ContentBounds;

/// Screen = layout * k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, point: (f32, f32)) -> (f32, f32) {
        (point.0 * self.k + self.x, point.1 * self.k + self.y)
    }

    pub fn invert(&self, point: (f32, f32)) -> (f32, f32) {
        ((point.0 - self.x) / self.k, (point.1 - self.y) / self.k)
    }

    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({:.4})", self.x, self.y, self.k)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformTransition {
    pub from: Transform,
    pub to: Transform,
    pub duration_ms: u32,
}

impl TransformTransition {
    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0
    }

    /// Transform at progress `t` (0..=1) with cubic in-out easing.
    pub fn sample(&self, t: f32) -> Transform {
        let t = ease_cubic_in_out(t.clamp(0.0, 1.0));
        Transform {
            x: lerp(self.from.x, self.to.x, t),
            y: lerp(self.from.y, self.to.y, t),
            k: lerp(self.from.k, self.to.k, t),
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelMode {
    #[default]
    Pixel,
    Line,
    Page,
}

/// Screen position of a node captured before a collapse/expand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenAnchor {
    pub screen: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct Viewport {
    width: f32,
    height: f32,
    transform: Transform,
    min_scale: f32,
    max_scale: f32,
    enabled: bool,
}

impl Viewport {
    pub fn new(width: f32, height: f32, zoom: &ZoomConfig) -> Self {
        let mut viewport = Self {
            width,
            height,
            transform: Transform::IDENTITY,
            min_scale: zoom.min_scale,
            max_scale: zoom.max_scale,
            enabled: zoom.enabled,
        };
        viewport.configure(zoom);
        viewport
    }

    /// Apply a (validated) zoom configuration. Disabling forces identity.
    pub fn configure(&mut self, zoom: &ZoomConfig) {
        self.min_scale = zoom.min_scale;
        self.max_scale = zoom.max_scale;
        self.enabled = zoom.enabled;
        if self.enabled {
            self.transform.k = self.clamp_scale(self.transform.k);
        } else {
            self.transform = Transform::IDENTITY;
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn clamp_scale(&self, k: f32) -> f32 {
        k.max(self.min_scale).min(self.max_scale)
    }

    fn transition_to(&mut self, to: Transform, duration_ms: u32) -> TransformTransition {
        let from = self.transform;
        self.transform = to;
        TransformTransition {
            from,
            to,
            duration_ms,
        }
    }

    pub fn fit_to_viewport(
        &mut self,
        bounds: &ContentBounds,
        duration_ms: u32,
    ) -> Option<TransformTransition> {
        if !self.enabled {
            return None;
        }
        let (content_w, content_h) = (bounds.width(), bounds.height());
        if content_w <= 0.0 || content_h <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let k = self.clamp_scale((self.width / content_w).min(self.height / content_h));
        let target = Transform {
            x: (self.width - content_w * k) / 2.0,
            y: (self.height - content_h * k) / 2.0,
            k,
        };
        Some(self.transition_to(target, duration_ms))
    }

    pub fn focus_on_node(
        &mut self,
        center: (f32, f32),
        scale: f32,
        duration_ms: u32,
    ) -> Option<TransformTransition> {
        if !self.enabled {
            return None;
        }
        let k = self.clamp_scale(scale);
        let target = Transform {
            x: self.width / 2.0 - center.0 * k,
            y: self.height / 2.0 - center.1 * k,
            k,
        };
        Some(self.transition_to(target, duration_ms))
    }

    pub fn reset(&mut self, bounds: &ContentBounds, duration_ms: u32) -> Option<TransformTransition> {
        self.fit_to_viewport(bounds, duration_ms)
    }

    pub fn capture_anchor(&self, absolute_center: (f32, f32)) -> ScreenAnchor {
        ScreenAnchor {
            screen: self.transform.apply(absolute_center),
        }
    }

    /// Re-solve the translation so the anchored node keeps its screen spot.
    pub fn restore_anchor(&mut self, anchor: ScreenAnchor, absolute_center: (f32, f32)) {
        if !self.enabled {
            return;
        }
        let k = self.transform.k;
        self.transform.x = anchor.screen.0 - absolute_center.0 * k;
        self.transform.y = anchor.screen.1 - absolute_center.1 * k;
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        if !self.enabled {
            return false;
        }
        self.transform.x += dx;
        self.transform.y += dy;
        true
    }

    /// Zoom by `factor` keeping the layout point under `pointer` fixed.
    pub fn zoom_at(&mut self, factor: f32, pointer: (f32, f32)) -> bool {
        if !self.enabled || !(factor > 0.0) {
            return false;
        }
        let k = self.clamp_scale(self.transform.k * factor);
        let anchor = self.transform.invert(pointer);
        self.transform = Transform {
            x: pointer.0 - anchor.0 * k,
            y: pointer.1 - anchor.1 * k,
            k,
        };
        true
    }

    pub fn wheel(&mut self, delta_y: f32, mode: WheelMode, pointer: (f32, f32)) -> bool {
        let unit = match mode {
            WheelMode::Pixel => 0.002,
            WheelMode::Line => 0.05,
            WheelMode::Page => 1.0,
        };
        self.zoom_at(2f32.powf(-delta_y * unit), pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(width: f32, height: f32) -> ContentBounds {
        ContentBounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: width,
            max_y: height,
            padding: 0.0,
            translate: (0.0, 0.0),
        }
    }

    fn viewport(width: f32, height: f32) -> Viewport {
        Viewport::new(width, height, &ZoomConfig::default())
    }

    #[test]
    fn fit_uses_smaller_ratio() {
        let mut vp = viewport(800.0, 600.0);
        let transition = vp.fit_to_viewport(&bounds(1600.0, 600.0), 0).unwrap();
        assert!(transition.is_instant());
        let t = vp.transform();
        assert!((t.k - 0.5).abs() < 1e-6);
        assert!((t.x - 0.0).abs() < 1e-3);
        assert!((t.y - 150.0).abs() < 1e-3);
    }

    #[test]
    fn fit_is_clamped_to_scale_range() {
        let mut vp = viewport(800.0, 600.0);
        vp.fit_to_viewport(&bounds(10.0, 10.0), 0);
        assert_eq!(vp.transform().k, ZoomConfig::default().max_scale);
        vp.fit_to_viewport(&bounds(1.0e6, 1.0e6), 0);
        assert_eq!(vp.transform().k, ZoomConfig::default().min_scale);
    }

    #[test]
    fn focus_centers_point() {
        let mut vp = viewport(800.0, 600.0);
        vp.focus_on_node((100.0, 50.0), 2.0, 300);
        let screen = vp.transform().apply((100.0, 50.0));
        assert!((screen.0 - 400.0).abs() < 1e-3);
        assert!((screen.1 - 300.0).abs() < 1e-3);
    }

    #[test]
    fn anchor_round_trip_keeps_screen_position() {
        let mut vp = viewport(800.0, 600.0);
        vp.zoom_at(1.7, (200.0, 120.0));
        vp.pan_by(-35.0, 12.0);
        let anchor = vp.capture_anchor((300.0, 400.0));
        vp.restore_anchor(anchor, (520.0, 380.0));
        let screen = vp.transform().apply((520.0, 380.0));
        assert!((screen.0 - anchor.screen.0).abs() < 1e-3);
        assert!((screen.1 - anchor.screen.1).abs() < 1e-3);
    }

    #[test]
    fn zoom_keeps_pointer_fixed() {
        let mut vp = viewport(800.0, 600.0);
        let before = vp.transform().invert((250.0, 100.0));
        assert!(vp.wheel(-120.0, WheelMode::Pixel, (250.0, 100.0)));
        let after = vp.transform().invert((250.0, 100.0));
        assert!(vp.transform().k > 1.0);
        assert!((before.0 - after.0).abs() < 1e-3 && (before.1 - after.1).abs() < 1e-3);
    }

    #[test]
    fn disabled_zoom_forces_identity_and_ignores_input() {
        let mut vp = viewport(800.0, 600.0);
        vp.pan_by(10.0, 10.0);
        let zoom = ZoomConfig {
            enabled: false,
            ..ZoomConfig::default()
        };
        vp.configure(&zoom);
        assert_eq!(vp.transform(), Transform::IDENTITY);
        assert!(!vp.pan_by(5.0, 5.0));
        assert!(!vp.wheel(-100.0, WheelMode::Line, (0.0, 0.0)));
        assert!(vp.fit_to_viewport(&bounds(100.0, 100.0), 0).is_none());
        assert_eq!(vp.transform(), Transform::IDENTITY);
    }

    #[test]
    fn transition_sampling_hits_endpoints() {
        let mut vp = viewport(800.0, 600.0);
        let transition = vp.focus_on_node((0.0, 0.0), 2.0, 500).unwrap();
        assert_eq!(transition.sample(0.0), transition.from);
        assert_eq!(transition.sample(1.0), transition.to);
        let mid = transition.sample(0.5);
        assert!((mid.k - 1.5).abs() < 1e-5);
    }
}

//! Animation state for the toggle switch and the loading cube.
//!
//! Each widget instance owns one of these structs and advances it with the
//! frame delta. Nothing here draws; callers turn the state into pixels (or,
//! in the CLI, into a spinner glyph).

/// RGBA color in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Linear interpolation with the blend factor clamped to `[0, 1]`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[inline]
fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
    ]
}

const COLOR_RATE: f32 = 8.0;
const KNOB_RATE: f32 = 10.0;

/// Geometry of a toggle switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleStyle {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl Default for ToggleStyle {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 14.0,
            radius: 5.0,
        }
    }
}

impl ToggleStyle {
    /// Knob center offset from the left edge for each state.
    pub fn knob_offset(&self, on: bool) -> f32 {
        if on {
            self.width - self.radius - 3.0
        } else {
            self.radius + 3.0
        }
    }
}

/// Eased colors and knob position of one toggle switch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleAnimation {
    pub style: ToggleStyle,
    pub background: Rgba,
    pub text: Rgba,
    pub knob: Rgba,
    pub knob_offset: f32,
}

impl Default for ToggleAnimation {
    fn default() -> Self {
        Self::new(ToggleStyle::default())
    }
}

impl ToggleAnimation {
    pub fn new(style: ToggleStyle) -> Self {
        Self {
            style,
            background: [0.2, 0.2, 0.2, 1.0],
            text: [1.0, 1.0, 1.0, 1.0],
            knob: [0.6, 0.6, 0.6, 1.0],
            knob_offset: 0.0,
        }
    }

    /// Advance by `dt` seconds toward the look of `on` (and `hovered`).
    pub fn update(&mut self, on: bool, hovered: bool, dt: f32) {
        let target_text = if on {
            [1.0, 1.0, 1.0, 1.0]
        } else if hovered {
            [0.9, 0.9, 0.9, 1.0]
        } else {
            [0.6, 0.6, 0.6, 1.0]
        };
        let target_background = if on {
            [0.2, 0.6, 0.3, 1.0]
        } else {
            [0.15, 0.15, 0.15, 1.0]
        };
        let target_knob = if on {
            [1.0, 1.0, 1.0, 1.0]
        } else {
            [0.5, 0.5, 0.5, 1.0]
        };

        self.text = lerp_rgba(self.text, target_text, dt * COLOR_RATE);
        self.background = lerp_rgba(self.background, target_background, dt * COLOR_RATE);
        self.knob = lerp_rgba(self.knob, target_knob, dt * COLOR_RATE);
        self.knob_offset = lerp(self.knob_offset, self.style.knob_offset(on), dt * KNOB_RATE);
    }
}

const SPIN_TARGET_SPEED: f32 = 68.0;
const SPIN_FLOOR_SPEED: f32 = 2.0;

/// Speed ramp and rotation of the loading cube.
///
/// The speed eases toward 68 until it reaches 95% of that, then eases back
/// toward 2 until it drops to 2.4, and repeats.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingSpinner {
    pub ramping_up: bool,
    pub speed: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
}

impl Default for LoadingSpinner {
    fn default() -> Self {
        Self {
            ramping_up: true,
            speed: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
        }
    }
}

impl LoadingSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dt: f32) {
        let t = dt * 3.0;
        if self.ramping_up {
            self.speed = lerp(self.speed, SPIN_TARGET_SPEED, t);
            if self.speed >= SPIN_TARGET_SPEED * 0.95 {
                self.ramping_up = false;
            }
        } else {
            self.speed = lerp(self.speed, SPIN_FLOOR_SPEED, t);
            if self.speed <= 2.4 {
                self.ramping_up = true;
            }
        }

        self.rotation_x += dt * 8.5 * self.speed;
        self.rotation_y -= dt * 8.0 * self.speed;
    }

    /// Cube scale; grows slightly with speed.
    pub fn scale(&self) -> f32 {
        1.0 + self.speed * 0.0012
    }

    /// Label alpha in `0..=255`.
    pub fn label_alpha(&self) -> u8 {
        (self.speed * 2.0 + 135.0).clamp(0.0, 255.0) as u8
    }

    /// Index into a list of `frames` spinner glyphs, following `rotation_x`.
    pub fn frame(&self, frames: usize) -> usize {
        if frames == 0 {
            return 0;
        }
        let turn = self.rotation_x.rem_euclid(360.0) / 360.0;
        ((turn * frames as f32) as usize).min(frames - 1)
    }
}

/// Vertex pairs forming the 12 cube edges.
pub const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

const CUBE_VERTICES: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

fn rotate_x(v: [f32; 3], degrees: f32) -> [f32; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [v[0], v[1] * cos - v[2] * sin, v[1] * sin + v[2] * cos]
}

fn rotate_y(v: [f32; 3], degrees: f32) -> [f32; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [v[0] * cos + v[2] * sin, v[1], -v[0] * sin + v[2] * cos]
}

/// Project the unit cube rotated by `rotation_x`/`rotation_y` degrees.
pub fn project_cube(
    center: [f32; 2],
    size: f32,
    perspective: f32,
    rotation_x: f32,
    rotation_y: f32,
    scale: f32,
) -> [[f32; 2]; 8] {
    let mut out = [[0.0; 2]; 8];
    for (dst, &v) in out.iter_mut().zip(CUBE_VERTICES.iter()) {
        let r = rotate_y(rotate_x(v, rotation_x), rotation_y);
        let r = [r[0] * scale, r[1] * scale, r[2] * scale];
        let z = r[2] * perspective + 3.0;
        *dst = [center[0] + r[0] * size / z, center[1] + r[1] * size / z];
    }
    out
}

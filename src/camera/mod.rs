/// First-person camera over an explicit orthonormal basis.
/// Movement and mouse look arrive once per frame as a `FrameInput`.
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::rendering::RenderConfig;

/// Per-frame input: four non-negative axis amounts plus the absolute
/// mouse position. The host accumulates raw deltas into `mouse`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
    pub mouse: Vec2,
}

/// Camera state. The basis is right-handed with +z pointing behind the
/// camera, so moving forward walks along -axis_z.
pub struct Camera {
    pub position: Vec3,
    pub axis_x: Vec3,
    pub axis_y: Vec3,
    pub axis_z: Vec3,

    pub move_speed: f32,
    pub rotation_speed: f32,

    matrix: Mat4,
    mouse: Vec2,
    dirty: bool,
}

impl Camera {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            axis_x: Vec3::X,
            axis_y: Vec3::Y,
            axis_z: Vec3::Z,
            move_speed: config.move_speed,
            rotation_speed: config.rotation_speed,
            matrix: Mat4::IDENTITY,
            mouse: Vec2::ZERO,
            // First frame must build the matrix even with no input.
            dirty: true,
        }
    }

    /// Apply one frame of input and rebuild the cached world-to-camera
    /// matrix if anything changed.
    pub fn update(&mut self, input: &FrameInput) {
        if input.left > 0.0 || input.right > 0.0 || input.up > 0.0 || input.down > 0.0 {
            self.dirty = true;
            self.position += self.move_speed
                * ((input.right - input.left) * self.axis_x
                    + (input.down - input.up) * self.axis_z);
        }
        if input.mouse != self.mouse {
            self.dirty = true;
            // Look direction is built from prior mouse minus input, which
            // inverts the motion relative to the pointer. Kept verbatim
            // from the original control scheme.
            let z = (self.mouse.x - input.mouse.x) * self.axis_x
                + (self.mouse.y - input.mouse.y) * self.axis_y
                + (100.0 / self.rotation_speed) * self.axis_z;
            let nz = z.normalize();
            let q = Quat::from_rotation_arc(self.axis_z, nz);
            self.axis_x = (q * self.axis_x).normalize();
            self.axis_y = (q * self.axis_y).normalize();
            self.axis_z = nz;
            self.mouse = input.mouse;
        }
        if self.dirty {
            self.dirty = false;
            self.matrix = self.rebuild_matrix();
        }
    }

    /// Cached world-to-camera transform. Rows are
    /// (axis_x, -axis_x.P), (axis_y, -axis_y.P), (axis_z, -axis_z.P):
    /// the inverse of the rigid camera-to-world transform.
    #[inline]
    pub fn world_to_camera(&self) -> Mat4 {
        self.matrix
    }

    fn rebuild_matrix(&self) -> Mat4 {
        let (ax, ay, az, p) = (self.axis_x, self.axis_y, self.axis_z, self.position);
        Mat4::from_cols(
            Vec4::new(ax.x, ay.x, az.x, 0.0),
            Vec4::new(ax.y, ay.y, az.y, 0.0),
            Vec4::new(ax.z, ay.z, az.z, 0.0),
            Vec4::new(-ax.dot(p), -ay.dot(p), -az.dot(p), 1.0),
        )
    }
}

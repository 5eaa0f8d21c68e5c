/// Fragment lighting and channel packing.
/// The light source is the camera itself (a headlight), so the view
/// vector doubles as the light vector in a Blinn half-vector term.
use glam::Vec3;

/// Lighting scalar for a fragment at camera-space position `point`
/// with (unnormalized) camera-space `normal`.
#[inline]
pub fn headlight(point: Vec3, normal: Vec3) -> f32 {
    let view = -point.normalize();
    let n = normal.normalize();
    let halfway = (view + n).normalize();
    halfway.dot(n)
}

/// Pack unit-range RGB into 0x00RRGGBB. Channels saturate on the way
/// to u8, so negative light or overshoot cannot wrap.
#[inline]
pub fn pack_unit_rgb(c: Vec3) -> u32 {
    let r = (c.x * 255.0) as u8;
    let g = (c.y * 255.0) as u8;
    let b = (c.z * 255.0) as u8;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Scale a packed 0x00RRGGBB texel by a light factor.
#[inline]
pub fn modulate(texel: u32, light: f32) -> u32 {
    let r = (((texel >> 16) & 0xFF) as f32 * light) as u8;
    let g = (((texel >> 8) & 0xFF) as f32 * light) as u8;
    let b = ((texel & 0xFF) as f32 * light) as u8;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headlight_is_full_when_normal_faces_camera() {
        // Fragment straight ahead, normal pointing back at the camera.
        let l = headlight(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert!((l - 1.0).abs() < 1e-6);
    }

    #[test]
    fn headlight_falls_off_with_grazing_normals() {
        let facing = headlight(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        let grazing = headlight(Vec3::new(0.0, 0.0, -2.0), Vec3::new(1.0, 0.0, 0.2));
        assert!(facing > grazing);
    }

    #[test]
    fn packing_saturates_instead_of_wrapping() {
        assert_eq!(pack_unit_rgb(Vec3::splat(2.0)), 0x00FFFFFF);
        assert_eq!(pack_unit_rgb(Vec3::splat(-1.0)), 0);
        assert_eq!(pack_unit_rgb(Vec3::new(1.0, 0.0, 0.5)), 0x00FF007F);
    }

    #[test]
    fn modulate_scales_each_channel() {
        assert_eq!(modulate(0x00FF8040, 0.5), 0x007F4020);
        assert_eq!(modulate(0x00FFFFFF, 2.0), 0x00FFFFFF);
        assert_eq!(modulate(0x00FFFFFF, -1.0), 0);
    }
}

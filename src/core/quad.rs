use super::render_pipeline::VertexLayout;

/// Two triangles covering clip space from (-1, -1) to (1, 1)
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [-1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

pub const QUAD_VERTEX_COUNT: u32 = QUAD_VERTICES.len() as u32;

/// Layout of the quad vertex buffer: one float32x2 position at location 0
pub fn quad_layout() -> VertexLayout {
    VertexLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        attributes: vec![wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_covers_clip_space() {
        assert_eq!(QUAD_VERTEX_COUNT, 6);
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(bytes.len(), 48);

        for corner in [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]] {
            assert!(QUAD_VERTICES.contains(&corner));
        }
    }

    #[test]
    fn test_quad_layout() {
        let layout = quad_layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x2);
    }
}

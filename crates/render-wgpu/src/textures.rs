//! Fixed pixel payloads uploaded at initialisation. No files are read.

/// Edge length of the voxel brick.
pub const BRICK_SIZE: u32 = 16;

/// 4x4 ordered-dither matrix, used to offset ray-march start positions per pixel.
#[rustfmt::skip]
const BAYER_4X4: [u8; 16] = [
      0, 128,  32, 160,
    192,  64, 224,  96,
     48, 176,  16, 144,
    240, 112, 208,  80,
];

/// Raw texels plus the shape they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub dimension: wgpu::TextureDimension,
    pub format: wgpu::TextureFormat,
    pub size: wgpu::Extent3d,
    pub texels: Vec<u8>,
}

impl TextureData {
    /// Bytes per texel for the formats used here.
    pub fn bytes_per_texel(&self) -> u32 {
        match self.format {
            wgpu::TextureFormat::Rgba8Unorm => 4,
            _ => 1,
        }
    }

    pub fn expected_len(&self) -> usize {
        (self.size.width * self.size.height * self.size.depth_or_array_layers
            * self.bytes_per_texel()) as usize
    }

    pub fn view_dimension(&self) -> wgpu::TextureViewDimension {
        match self.dimension {
            wgpu::TextureDimension::D1 => wgpu::TextureViewDimension::D1,
            wgpu::TextureDimension::D2 => wgpu::TextureViewDimension::D2,
            wgpu::TextureDimension::D3 => wgpu::TextureViewDimension::D3,
        }
    }
}

/// Built-in texture payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    /// 16^3 single-channel density brick: a soft sphere with carved cells.
    Brick,
    /// 4x4 ordered-dither tile.
    Jitter,
}

impl TextureSource {
    pub fn data(self) -> TextureData {
        match self {
            TextureSource::Brick => brick(),
            TextureSource::Jitter => TextureData {
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                size: wgpu::Extent3d {
                    width: 4,
                    height: 4,
                    depth_or_array_layers: 1,
                },
                texels: BAYER_4X4.to_vec(),
            },
        }
    }
}

fn brick() -> TextureData {
    let n = BRICK_SIZE;
    let center = (n as f32 - 1.0) / 2.0;
    let mut texels = Vec::with_capacity((n * n * n) as usize);
    // x varies fastest, then y, then z: the order write_texture expects.
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let d = ((x as f32 - center).powi(2)
                    + (y as f32 - center).powi(2)
                    + (z as f32 - center).powi(2))
                .sqrt();
                let mut density = ((7.0 - d) / 2.0).clamp(0.0, 1.0);
                if (x / 4 + y / 4 + z / 4) % 2 == 0 && d < 5.0 {
                    density *= 0.35;
                }
                texels.push((density * 255.0).round() as u8);
            }
        }
    }
    TextureData {
        dimension: wgpu::TextureDimension::D3,
        format: wgpu::TextureFormat::R8Unorm,
        size: wgpu::Extent3d {
            width: n,
            height: n,
            depth_or_array_layers: n,
        },
        texels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brick_has_one_byte_per_voxel() {
        let data = TextureSource::Brick.data();
        assert_eq!(data.texels.len(), data.expected_len());
        assert_eq!(data.texels.len(), 16 * 16 * 16);
        assert_eq!(data.view_dimension(), wgpu::TextureViewDimension::D3);
    }

    #[test]
    fn brick_is_empty_at_corners_and_dense_inside() {
        let data = TextureSource::Brick.data();
        let at = |x: usize, y: usize, z: usize| data.texels[x + 16 * (y + 16 * z)];
        assert_eq!(at(0, 0, 0), 0);
        assert_eq!(at(15, 15, 15), 0);
        assert_eq!(at(7, 7, 4), 255);
        // Carved cell near the center keeps 35% density.
        assert_eq!(at(8, 8, 8), 89);
    }

    #[test]
    fn brick_is_deterministic() {
        assert_eq!(TextureSource::Brick.data(), TextureSource::Brick.data());
    }

    #[test]
    fn jitter_is_a_permutation_of_sixteen_levels() {
        let data = TextureSource::Jitter.data();
        assert_eq!(data.texels.len(), data.expected_len());
        let mut sorted = data.texels.clone();
        sorted.sort();
        let levels: Vec<u8> = (0..16).map(|i| i * 16).collect();
        assert_eq!(sorted, levels);
    }
}

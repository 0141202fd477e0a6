use wgpu::{Buffer, BufferUsages, Device, Queue};

/// Storage buffer holding the packed CPU raster, plus its dimensions
pub struct SurfaceBuffers {
    /// One RGBA8 word per device pixel, row-major
    pub pixels: Buffer,
    /// Uniform buffer for present parameters
    pub params: Buffer,
    pub width: u32,
    pub height: u32,
}

/// Present parameters passed to the shader (16 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PresentParams {
    pub width: u32,
    pub height: u32,
    pub _padding: [u32; 2],
}

impl SurfaceBuffers {
    pub fn new(device: &Device, queue: &Queue, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixel_count = width as u64 * height as u64;

        let pixels = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pixel-buffer"),
            size: pixel_count * std::mem::size_of::<u32>() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("present-params-buffer"),
            size: std::mem::size_of::<PresentParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let buffers = Self {
            pixels,
            params,
            width,
            height,
        };
        buffers.write_params(queue);
        buffers
    }

    fn write_params(&self, queue: &Queue) {
        let params = PresentParams {
            width: self.width,
            height: self.height,
            _padding: [0, 0],
        };
        queue.write_buffer(&self.params, 0, bytemuck::bytes_of(&params));
    }

    /// Upload one frame; sizes that do not match the buffer are skipped
    pub fn upload(&self, queue: &Queue, packed: &[u32]) {
        if packed.len() != self.width as usize * self.height as usize {
            log::warn!(
                "Skipping upload: {} pixels for a {}x{} buffer",
                packed.len(),
                self.width,
                self.height
            );
            return;
        }
        queue.write_buffer(&self.pixels, 0, bytemuck::cast_slice(packed));
    }
}

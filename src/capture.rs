//! Screenshots of the playground.
//!
//! The surface texture is not readable on every backend, so a capture renders
//! the current shaders a second time into an offscreen `Rgba8UnormSrgb`
//! texture, copies it into a mappable buffer and hands the pixels to the
//! `image` crate. PNG encoding runs on a background thread.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};

use crate::dump::timestamp;
use crate::gpu::GpuContext;
use crate::hot_shader::HotPlaygroundPass;
use crate::push_constant::PushConstant;

/// Offscreen color format; PNG wants sRGB-encoded RGBA8.
pub const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const BYTES_PER_PIXEL: u32 = 4;

/// Tightly packed RGBA8 pixels of one captured frame.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Row pitch for a texture-to-buffer copy of the given width.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

/// Drops the per-row alignment padding from a mapped copy.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, padded_row: u32) -> Vec<u8> {
    let row = (width * BYTES_PER_PIXEL) as usize;
    data.chunks(padded_row as usize)
        .take(height as usize)
        .flat_map(|chunk| &chunk[..row])
        .copied()
        .collect()
}

/// Renders the current shaders with `pc` into an offscreen texture and reads it back.
pub fn capture_frame(
    gpu: &GpuContext,
    hot: &HotPlaygroundPass,
    pc: &PushConstant,
) -> Result<Screenshot> {
    let pass = hot
        .compile_for(gpu, CAPTURE_FORMAT)
        .context("failed to compile shaders for capture")?;

    let (width, height) = (gpu.width(), gpu.height());
    let padded_row = padded_bytes_per_row(width);
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Capture Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: CAPTURE_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Readback"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Capture Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.render(gpu, &mut render_pass, pc);
    }

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        size,
    );

    gpu.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    gpu.device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device lost while capturing")?;
    mapping_result(&rx)?;

    let pixels = {
        let data = slice.get_mapped_range();
        strip_row_padding(&data, width, height, padded_row)
    };
    buffer.unmap();

    Ok(Screenshot {
        width,
        height,
        pixels,
    })
}

/// Blocks until the `map_async` callback reports back.
fn mapping_result(rx: &mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>) -> Result<()> {
    rx.recv()
        .context("capture buffer mapping was dropped")?
        .context("failed to map capture buffer")
}

/// Writes `screenshot-<timestamp>.png` into `dir`.
pub fn save_png(shot: &Screenshot, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create screenshot folder {}", dir.display()))?;

    let path = dir.join(format!("screenshot-{}.png", timestamp()));
    let image = image::RgbaImage::from_raw(shot.width, shot.height, shot.pixels.clone())
        .context("screenshot buffer does not match its dimensions")?;
    image
        .save(&path)
        .with_context(|| format!("failed to encode {}", path.display()))?;

    Ok(path)
}

/// Encodes on a worker thread and logs the outcome.
pub fn save_in_background(shot: Screenshot, dir: PathBuf) -> JoinHandle<Option<PathBuf>> {
    std::thread::spawn(move || match save_png(&shot, &dir) {
        Ok(path) => {
            log::info!("saved screenshot {}", path.display());
            Some(path)
        }
        Err(e) => {
            log::error!("screenshot failed: {e:#}");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_align_to_copy_pitch() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
        assert_eq!(padded_bytes_per_row(1280), 5120);
    }

    #[test]
    fn padding_is_removed_per_row() {
        let (width, height) = (2, 3);
        let padded = padded_bytes_per_row(width) as usize;
        let mut data = vec![0xAAu8; padded * height as usize];
        for y in 0..height as usize {
            for x in 0..(width * 4) as usize {
                data[y * padded + x] = (y * 10 + x) as u8;
            }
        }

        let pixels = strip_row_padding(&data, width, height, padded as u32);

        assert_eq!(pixels.len(), 2 * 3 * 4);
        assert!(!pixels.contains(&0xAA));
        assert_eq!(&pixels[8..16], &[10, 11, 12, 13, 14, 15, 16, 17]);
    }

    #[test]
    fn mapping_waits_for_callback() {
        let (tx, rx) = mpsc::channel::<Result<(), wgpu::BufferAsyncError>>();
        let callback = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            tx.send(Ok(())).unwrap();
        });
        assert!(mapping_result(&rx).is_ok());
        callback.join().unwrap();
    }

    #[test]
    fn mapping_failures_are_reported() {
        let (tx, rx) = mpsc::channel();
        tx.send(Err(wgpu::BufferAsyncError)).unwrap();
        let err = mapping_result(&rx).unwrap_err();
        assert!(format!("{err:#}").contains("failed to map capture buffer"));

        let (tx, rx) = mpsc::channel::<Result<(), wgpu::BufferAsyncError>>();
        drop(tx);
        let err = mapping_result(&rx).unwrap_err();
        assert!(format!("{err:#}").contains("mapping was dropped"));
    }

    #[test]
    fn writes_png() {
        let dir = std::env::temp_dir().join(format!("trigon-shot-{}", std::process::id()));
        let shot = Screenshot {
            width: 2,
            height: 2,
            pixels: vec![255; 16],
        };

        let path = save_png(&shot, &dir).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1).0, [255, 255, 255, 255]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let dir = std::env::temp_dir().join(format!("trigon-shot-bad-{}", std::process::id()));
        let shot = Screenshot {
            width: 4,
            height: 4,
            pixels: vec![0; 3],
        };
        assert!(save_png(&shot, &dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

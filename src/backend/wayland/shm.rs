//! Shared memory buffers.

use std::fs::File;
use std::os::fd::AsFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use memmap2::MmapMut;
use wayland_client::protocol::wl_buffer::WlBuffer;
use wayland_client::protocol::wl_shm::{self, WlShm};
use wayland_client::protocol::wl_shm_pool::WlShmPool;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::QueueHandle;

use crate::session::State;

/// One `wl_buffer` backed by its own pool and memory mapping.
pub struct ShmBuffer {
    _file: File,
    mmap: MmapMut,
    pool: WlShmPool,
    buffer: WlBuffer,
    /// Set while the compositor holds the buffer, cleared on `release`.
    busy: Arc<AtomicBool>,
    width: u32,
    height: u32,
}

impl ShmBuffer {
    pub fn new(
        shm: &WlShm,
        qh: &QueueHandle<State>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let stride = width.checked_mul(4).context("buffer too wide")?;
        let size = stride
            .checked_mul(height)
            .and_then(|size| i32::try_from(size).ok())
            .context("buffer too large")?;

        let file = tempfile::tempfile().context("error creating shm file")?;
        file.set_len(size as u64).context("error resizing shm file")?;
        // SAFETY: the file is private to this buffer and never truncated while mapped.
        let mmap = unsafe { MmapMut::map_mut(&file) }.context("error mapping shm file")?;

        let busy = Arc::new(AtomicBool::new(false));
        let pool = shm.create_pool(file.as_fd(), size, qh, ());
        let buffer = pool.create_buffer(
            0,
            width as i32,
            height as i32,
            stride as i32,
            wl_shm::Format::Argb8888,
            qh,
            busy.clone(),
        );

        Ok(Self {
            _file: file,
            mmap,
            pool,
            buffer,
            busy,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.mmap[..]
    }

    /// Fills the whole buffer with one ARGB8888 pixel.
    pub fn fill(&mut self, pixel: u32) {
        let pixels: &mut [u32] = bytemuck::cast_slice_mut(&mut self.mmap[..]);
        pixels.fill(pixel);
    }

    /// Attaches the buffer to `surface` with full damage, without committing.
    pub fn attach_to(&self, surface: &WlSurface) {
        surface.attach(Some(&self.buffer), 0, 0);
        surface.damage_buffer(0, 0, self.width as i32, self.height as i32);
        self.busy.store(true, Ordering::Release);
    }
}

impl Drop for ShmBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
        self.pool.destroy();
    }
}

/// Two shm buffers drawn into alternately.
pub struct ShmDrawable {
    buffers: [ShmBuffer; 2],
    current: usize,
}

impl ShmDrawable {
    pub fn new(
        shm: &WlShm,
        qh: &QueueHandle<State>,
        (width, height): (u32, u32),
    ) -> anyhow::Result<Self> {
        Ok(Self {
            buffers: [
                ShmBuffer::new(shm, qh, width, height)?,
                ShmBuffer::new(shm, qh, width, height)?,
            ],
            current: 0,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.buffers[0].size()
    }

    /// Picks a buffer the compositor is not reading from, if there is one.
    pub fn make_current(&mut self) {
        if self.buffers[self.current].is_busy() {
            let other = 1 - self.current;
            if self.buffers[other].is_busy() {
                trace!("both buffers are busy, drawing over the current one");
            } else {
                self.current = other;
            }
        }
    }

    pub fn clear(&mut self, pixel: u32) {
        self.buffers[self.current].fill(pixel);
    }

    /// Presents the current buffer on `surface` and commits.
    pub fn swap_buffers(&mut self, surface: &WlSurface) {
        self.buffers[self.current].attach_to(surface);
        surface.commit();
        self.current = 1 - self.current;
    }
}

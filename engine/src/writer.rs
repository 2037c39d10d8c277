//! Persistent file writer
//!
//! Splits a file into fixed 1 MiB chunks and writes them sequentially at
//! increasing offsets, reporting progress after each chunk. Two write
//! paths share the same chunk plan: a sync-access-handle path for the
//! dedicated worker and a writable-stream path for the main thread.
//! There is no rollback; a failed save can leave a truncated entry.

use crate::error::EngineError;
use crate::opfs;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FileSystemReadWriteOptions, FileSystemSyncAccessHandle, FileSystemWritableFileStream};

/// Fixed chunk size, 1 MiB
pub const CHUNK_SIZE: u64 = 1024 * 1024;

/// One planned write: byte offset and length
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub len: u64,
}

impl Chunk {
    /// Bytes written once this chunk lands; the last chunk's value
    /// equals the total size
    pub fn written_after(&self) -> u64 {
        self.offset + self.len
    }
}

/// Partition `[0, total)` into `ceil(total / chunk_size)` contiguous
/// chunks with no gaps or overlaps; a zero-byte file yields no chunks
pub fn chunk_plan(total: u64, chunk_size: u64) -> Vec<Chunk> {
    assert!(chunk_size > 0, "chunk size must be positive");
    let mut chunks = Vec::with_capacity(total.div_ceil(chunk_size) as usize);
    let mut offset = 0;
    while offset < total {
        let len = chunk_size.min(total - offset);
        chunks.push(Chunk { offset, len });
        offset += len;
    }
    chunks
}

/// Worker-side save through a sync access handle
pub async fn save_with_sync_access<F>(
    file: &web_sys::File,
    mut progress: F,
) -> Result<(), EngineError>
where
    F: FnMut(f64, f64),
{
    let handle = opfs::file_handle(&file.name(), true).await?;
    let access: FileSystemSyncAccessHandle =
        JsFuture::from(handle.create_sync_access_handle()).await?.unchecked_into();
    let outcome = write_chunks_sync(&access, file, &mut progress).await;
    access.close();
    outcome
}

async fn write_chunks_sync<F>(
    access: &FileSystemSyncAccessHandle,
    file: &web_sys::File,
    progress: &mut F,
) -> Result<(), EngineError>
where
    F: FnMut(f64, f64),
{
    let total = file.size();
    for chunk in chunk_plan(total as u64, CHUNK_SIZE) {
        let bytes = read_slice(file, &chunk).await?;
        let options = FileSystemReadWriteOptions::new();
        options.set_at(chunk.offset as f64);
        access.write_with_buffer_source_and_options(bytes.unchecked_ref(), &options)?;
        progress(chunk.written_after() as f64, total);
    }
    access.flush()?;
    Ok(())
}

/// Main-thread save through a writable stream; writes land only once the
/// stream is closed
pub async fn save_with_writable_stream<F>(
    file: &web_sys::File,
    mut progress: F,
) -> Result<(), EngineError>
where
    F: FnMut(f64, f64),
{
    let total = file.size();
    let handle = opfs::file_handle(&file.name(), true).await?;
    let stream: FileSystemWritableFileStream =
        JsFuture::from(handle.create_writable()).await?.unchecked_into();
    for chunk in chunk_plan(total as u64, CHUNK_SIZE) {
        let bytes = read_slice(file, &chunk).await?;
        JsFuture::from(stream.seek_with_f64(chunk.offset as f64)?).await?;
        JsFuture::from(stream.write_with_buffer_source(bytes.unchecked_ref())?).await?;
        progress(chunk.written_after() as f64, total);
    }
    JsFuture::from(stream.close()).await?;
    Ok(())
}

async fn read_slice(file: &web_sys::File, chunk: &Chunk) -> Result<js_sys::Uint8Array, EngineError> {
    let blob = file.slice_with_f64_and_f64(chunk.offset as f64, chunk.written_after() as f64)?;
    let buffer = JsFuture::from(blob.array_buffer()).await?;
    Ok(js_sys::Uint8Array::new(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_contiguous(total: u64, plan: &[Chunk]) {
        let mut expected_offset = 0;
        for chunk in plan {
            assert_eq!(chunk.offset, expected_offset, "gap or overlap at {expected_offset}");
            assert!(chunk.len > 0);
            expected_offset += chunk.len;
        }
        assert_eq!(expected_offset, total, "plan does not cover the file");
    }

    #[test]
    fn plan_issues_ceil_of_size_over_chunk_writes() {
        for total in [0u64, 1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 10 * CHUNK_SIZE + 7] {
            let plan = chunk_plan(total, CHUNK_SIZE);
            assert_eq!(plan.len() as u64, total.div_ceil(CHUNK_SIZE));
            assert_contiguous(total, &plan);
        }
    }

    #[test]
    fn final_progress_equals_total() {
        let total = 3 * CHUNK_SIZE + 123;
        let plan = chunk_plan(total, CHUNK_SIZE);
        assert_eq!(plan.last().unwrap().written_after(), total);
    }

    #[test]
    fn progress_is_strictly_increasing() {
        let plan = chunk_plan(5 * CHUNK_SIZE + 1, CHUNK_SIZE);
        let reports: Vec<u64> = plan.iter().map(Chunk::written_after).collect();
        assert!(reports.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn zero_byte_file_plans_no_writes() {
        assert!(chunk_plan(0, CHUNK_SIZE).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_tail_chunk() {
        let plan = chunk_plan(4 * CHUNK_SIZE, CHUNK_SIZE);
        assert_eq!(plan.len(), 4);
        assert!(plan.iter().all(|c| c.len == CHUNK_SIZE));
    }
}

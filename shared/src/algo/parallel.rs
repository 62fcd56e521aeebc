//! Parallel processing utilities for image arrays
//!
//! Per-pixel image operations write each output sample independently, so the
//! output array is split into row chunks and each chunk is filled on its own
//! rayon worker.

use ndarray::{Array3, ArrayViewMut3, Axis};
use rayon::prelude::*;

/// Default number of rows handed to one worker
pub const DEFAULT_CHUNK_ROWS: usize = 16;

/// Process a (height, width, channel) array in parallel row chunks
///
/// # Arguments
/// * `array` - The array to process, rows first
/// * `chunk_size` - Optional number of rows per chunk. Defaults to [`DEFAULT_CHUNK_ROWS`] if None.
/// * `processor` - Closure receiving the index of the chunk's first row and the mutable chunk
///
/// # Returns
/// The processed array
pub fn process_rows_in_parallel<F>(
    mut array: Array3<f64>,
    chunk_size: Option<usize>,
    processor: F,
) -> Array3<f64>
where
    F: Fn(usize, &mut ArrayViewMut3<f64>) + Send + Sync,
{
    let chunk_size = chunk_size.unwrap_or(DEFAULT_CHUNK_ROWS).max(1);
    if array.is_empty() {
        return array;
    }

    array
        .axis_chunks_iter_mut(Axis(0), chunk_size)
        .into_par_iter()
        .enumerate()
        .for_each(|(chunk_idx, mut chunk)| {
            processor(chunk_idx * chunk_size, &mut chunk);
        });

    array
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_receive_absolute_index() {
        let array = Array3::zeros((37, 5, 3));
        let result = process_rows_in_parallel(array, Some(8), |y0, chunk| {
            for (dy, mut row) in chunk.axis_iter_mut(Axis(0)).enumerate() {
                row.fill((y0 + dy) as f64);
            }
        });

        for y in 0..37 {
            assert_eq!(result[[y, 0, 0]], y as f64);
            assert_eq!(result[[y, 4, 2]], y as f64);
        }
    }

    #[test]
    fn test_empty_array_is_untouched() {
        let array = Array3::zeros((0, 4, 3));
        let result = process_rows_in_parallel(array, None, |_, _| panic!("no rows to process"));
        assert_eq!(result.dim(), (0, 4, 3));
    }
}

//! Synthetic frame data for offline testing.

use std::sync::Arc;

use crate::driver::{CameraFrame, FrameHeader};

/// Nanoseconds between synthetic frames, roughly 9 Hz.
const FRAME_INTERVAL_NS: u64 = 111_111_111;

/// Create a synthetic ARGB8888 frame attributed to the default sim chip.
pub fn synthetic_frame(frame_number: u64, width: usize, height: usize) -> Arc<CameraFrame> {
    synthetic_frame_for_chip("SIM000", frame_number, width, height)
}

/// Create a synthetic ARGB8888 frame attributed to a specific chip.
///
/// The gradient varies per frame so consecutive frames are distinguishable.
pub fn synthetic_frame_for_chip(
    chip_id: &str,
    frame_number: u64,
    width: usize,
    height: usize,
) -> Arc<CameraFrame> {
    let stride = width * 4;
    let mut data = vec![0u8; stride * height];

    let base = (frame_number % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = y * stride + x * 4;
            data[idx] = 0xFF; // A
            data[idx + 1] = base.wrapping_add((x % 256) as u8); // R
            data[idx + 2] = base.wrapping_add((y % 256) as u8); // G
            data[idx + 3] = base.wrapping_add(((x + y) % 256) as u8); // B
        }
    }

    let header = FrameHeader {
        chip_id: chip_id.to_string(),
        timestamp_utc_ns: frame_number * FRAME_INTERVAL_NS,
        thermography_spot_value: 30.0 + (frame_number % 10) as f32 * 0.5,
    };

    Arc::new(CameraFrame::new(width, height, stride, header, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frame_geometry() {
        let frame = synthetic_frame(0, 150, 200);
        assert_eq!(frame.width(), 150);
        assert_eq!(frame.height(), 200);
        assert_eq!(frame.stride(), 600);
        assert_eq!(frame.data().len(), 600 * 200);
    }

    #[test]
    fn test_synthetic_frames_differ() {
        let a = synthetic_frame(0, 32, 32);
        let b = synthetic_frame(1, 32, 32);
        assert_ne!(a.data()[1], b.data()[1]);
        assert!(b.header().timestamp_utc_ns > a.header().timestamp_utc_ns);
    }
}

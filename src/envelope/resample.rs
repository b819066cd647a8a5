/// Resample a peak array to exactly `target_len` points, keeping the maximum
/// of each bucket so transients survive downsampling.
///
/// Bucket `i` covers `floor(i * len / target_len) .. floor((i + 1) * len / target_len)`,
/// widened to at least one source frame when upsampling. The waveform display
/// uses the same rule, so bucket indices map to time identically for both.
pub fn resample(data: &[f32], target_len: usize) -> Vec<f32> {
    if data.is_empty() || target_len == 0 {
        return Vec::new();
    }

    let len = data.len();
    (0..target_len)
        .map(|i| {
            // Integer form of floor(i * ratio), exact for any length
            let start = i * len / target_len;
            let end = ((i + 1) * len / target_len).max(start + 1).min(len);
            data[start..end].iter().copied().fold(0.0f32, f32::max)
        })
        .collect()
}

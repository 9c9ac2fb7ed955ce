use crate::matcher::Hypothesis;

/// An accepted symbol occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Start time of the frame it was found in
    pub timestamp_s: f32,
    pub symbol: char,
    pub confidence: f32,
}

/// Accept hypotheses in time order, dropping any that arrive less than
/// `min_gap_s` after the previously accepted one.
///
/// Rejected hypotheses do not move the reference point.
pub fn enforce_min_gap<I>(hypotheses: I, min_gap_s: f32) -> Vec<Detection>
where
    I: IntoIterator<Item = (f32, Hypothesis)>,
{
    let mut detections = Vec::new();
    let mut last_accepted: Option<f32> = None;

    for (timestamp_s, hypothesis) in hypotheses {
        if let Some(last) = last_accepted {
            if timestamp_s - last < min_gap_s {
                continue;
            }
        }
        detections.push(Detection {
            timestamp_s,
            symbol: hypothesis.symbol,
            confidence: hypothesis.confidence,
        });
        last_accepted = Some(timestamp_s);
    }

    detections
}

/// Drop detections whose confidence is below `cutoff_ratio × mean`, then
/// sort the survivors by timestamp.
///
/// The cutoff adapts to the population, so it needs every detection of the
/// recording before it can run.
pub fn filter_by_confidence(mut detections: Vec<Detection>, cutoff_ratio: f32) -> Vec<Detection> {
    if !detections.is_empty() {
        let mean = detections.iter().map(|d| d.confidence).sum::<f32>() / detections.len() as f32;
        let cutoff = mean * cutoff_ratio;
        detections.retain(|d| d.confidence >= cutoff);
    }
    detections.sort_by(|a, b| a.timestamp_s.total_cmp(&b.timestamp_s));
    detections
}

/// Concatenate detection symbols in order
pub fn assemble_message(detections: &[Detection]) -> String {
    detections.iter().map(|d| d.symbol).collect()
}
